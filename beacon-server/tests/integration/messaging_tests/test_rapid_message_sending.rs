use beacon_core::SignalMessage;

use crate::integration::{init_tracing, start_test_server};
use crate::utils::{TestClient, ice_json, wait_for_presence};

const MESSAGE_COUNT: usize = 100;

#[tokio::test]
async fn test_rapid_message_sending() {
    init_tracing();

    let server = start_test_server().await;

    let mut a = TestClient::connect(server.addr, "A").await.expect("A failed");
    wait_for_presence(&mut a, &["A"]).await.expect("A presence");
    let mut b = TestClient::connect(server.addr, "B").await.expect("B failed");
    wait_for_presence(&mut b, &["A", "B"]).await.expect("B presence");

    let sent: Vec<String> = (0..MESSAGE_COUNT)
        .map(|n| ice_json("A", "B", &format!("candidate:{n}")))
        .collect();
    for frame in &sent {
        a.send_text(frame).await.expect("Failed to send");
    }

    // Frames from one sender arrive in the order they were sent
    let mut received = Vec::with_capacity(MESSAGE_COUNT);
    while received.len() < MESSAGE_COUNT {
        let message = b.recv_message().await.expect("Missing frame");
        if let SignalMessage::Ice { .. } = message {
            received.push(message);
        }
    }

    let expected: Vec<SignalMessage> = sent
        .iter()
        .map(|raw| serde_json::from_str(raw).expect("valid frame"))
        .collect();
    assert_eq!(received, expected);

    a.close().await.expect("Failed to close A");
    b.close().await.expect("Failed to close B");
    server.stop().await;
}

use beacon_core::Frame;

/// Items produced by a connection reader.
#[derive(Debug)]
pub enum Inbound {
    Frame(Frame),
    Close,
}

mod test_rapid_message_sending;

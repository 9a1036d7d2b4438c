//! Codec Tests
//!
//! Tests for command encoding, key validation, value preparation and reply
//! line parsing.

use std::collections::BTreeMap;

use bytes::Bytes;
use mcpipe::protocol::{
    encode_command, prepare_store, validate_key, Command, CommandOptions, CommandType,
    ReplyLine, ReplyToken, Status, GET_REPLIES, MAX_KEY_LEN, STORE_REPLIES,
};
use mcpipe::{BincodeCodec, McError, Value, ValueCodec};

// =============================================================================
// Helper Functions
// =============================================================================

fn set_command(key: &str, data: &[u8], with_completion: bool) -> Command {
    Command::Set {
        key: key.as_bytes().to_vec(),
        data: Bytes::copy_from_slice(data),
        flags: 7,
        expire: 60,
        completion: if with_completion {
            Some(Box::new(|_| {}))
        } else {
            None
        },
    }
}

// =============================================================================
// Command Encoding Tests
// =============================================================================

#[test]
fn test_encode_set() {
    let encoded = encode_command(set_command("mykey", b"hello", true));

    assert_eq!(&encoded.wire[..], b"set mykey 7 60 5\r\nhello\r\n");
    let expectation = encoded.expectation.unwrap();
    assert_eq!(expectation.accepted, STORE_REPLIES);
    assert!(!expectation.is_bulk);
}

#[test]
fn test_encode_set_noreply() {
    let encoded = encode_command(set_command("mykey", b"hello", false));

    assert_eq!(&encoded.wire[..], b"set mykey 7 60 5 noreply\r\nhello\r\n");
    assert!(encoded.expectation.is_none());
}

#[test]
fn test_encode_set_binary_payload() {
    let data = b"line1\r\nEND\r\n\x00\xff";
    let encoded = encode_command(set_command("bin", data, true));

    let mut expected = format!("set bin 7 60 {}\r\n", data.len()).into_bytes();
    expected.extend_from_slice(data);
    expected.extend_from_slice(b"\r\n");
    assert_eq!(&encoded.wire[..], &expected[..]);
}

#[test]
fn test_encode_get() {
    let encoded = encode_command(Command::get("mykey", false, |_| {}));

    assert_eq!(&encoded.wire[..], b"get mykey\r\n");
    let expectation = encoded.expectation.unwrap();
    assert_eq!(expectation.accepted, GET_REPLIES);
    assert!(expectation.is_bulk);
}

#[test]
fn test_encode_delete() {
    let encoded = encode_command(Command::delete("gone", Some(Box::new(|_| {}))));
    assert_eq!(&encoded.wire[..], b"delete gone\r\n");
    assert!(encoded.expectation.is_some());

    let encoded = encode_command(Command::delete("gone", None));
    assert_eq!(&encoded.wire[..], b"delete gone noreply\r\n");
    assert!(encoded.expectation.is_none());
}

#[test]
fn test_encode_flush_all() {
    let encoded = encode_command(Command::flush_all(Some(Box::new(|_| {}))));
    assert_eq!(&encoded.wire[..], b"flush_all\r\n");
    assert!(encoded.expectation.is_some());

    let encoded = encode_command(Command::flush_all(None));
    assert_eq!(&encoded.wire[..], b"flush_all noreply\r\n");
    assert!(encoded.expectation.is_none());
}

#[test]
fn test_expects_reply_matches_noreply() {
    let commands = vec![
        set_command("a", b"1", true),
        set_command("a", b"1", false),
        Command::get("a", true, |_| {}),
        Command::delete("a", None),
        Command::delete("a", Some(Box::new(|_| {}))),
        Command::flush_all(None),
    ];

    for command in commands {
        let expects_reply = command.expects_reply();
        let encoded = encode_command(command);
        let noreply = encoded.wire.windows(8).any(|w| w == b" noreply");

        assert_eq!(expects_reply, !noreply);
        assert_eq!(expects_reply, encoded.expectation.is_some());
    }
}

#[test]
fn test_command_type() {
    assert_eq!(set_command("a", b"", true).command_type(), CommandType::Set);
    assert_eq!(
        Command::get("a", false, |_| {}).command_type(),
        CommandType::Get
    );
    assert_eq!(Command::delete("a", None).command_type(), CommandType::Delete);
    assert_eq!(Command::flush_all(None).command_type(), CommandType::FlushAll);
}

// =============================================================================
// Key Validation Tests
// =============================================================================

#[test]
fn test_validate_key_accepts_normal_keys() {
    assert!(validate_key(b"user:42").is_ok());
    assert!(validate_key(&vec![b'k'; MAX_KEY_LEN]).is_ok());
}

#[test]
fn test_validate_key_rejects_bad_keys() {
    let bad: Vec<Vec<u8>> = vec![
        b"".to_vec(),
        vec![b'k'; MAX_KEY_LEN + 1],
        b"has space".to_vec(),
        b"has\r\nnewline".to_vec(),
        b"tab\tkey".to_vec(),
        b"nul\x00".to_vec(),
    ];

    for key in bad {
        match validate_key(&key) {
            Err(McError::InvalidKey(_)) => {}
            other => panic!("Expected InvalidKey for {:?}, got {:?}", key, other),
        }
    }
}

// =============================================================================
// Value Preparation Tests
// =============================================================================

#[test]
fn test_prepare_store_raw_passes_bytes_through() {
    let data = prepare_store(
        Value::Bytes(b"a\r\nb".to_vec()),
        &CommandOptions::raw(),
        &BincodeCodec,
    )
    .unwrap();
    assert_eq!(&data[..], b"a\r\nb");

    let data = prepare_store(Value::from("text"), &CommandOptions::raw(), &BincodeCodec).unwrap();
    assert_eq!(&data[..], b"text");
}

#[test]
fn test_prepare_store_raw_rejects_structured_values() {
    let result = prepare_store(Value::Int(5), &CommandOptions::raw(), &BincodeCodec);

    match result {
        Err(McError::Serialization(_)) => {}
        other => panic!("Expected serialization error, got {:?}", other),
    }
}

#[test]
fn test_prepare_store_length_is_serialized_length() {
    let value = Value::from("hello");
    let data = prepare_store(value.clone(), &CommandOptions::default(), &BincodeCodec).unwrap();

    assert_ne!(data.len(), 5);
    assert_eq!(BincodeCodec.decode(&data).unwrap(), value);

    let encoded = encode_command(Command::Set {
        key: b"k".to_vec(),
        data: data.clone(),
        flags: 0,
        expire: 0,
        completion: None,
    });
    let header = format!("set k 0 0 {} noreply\r\n", data.len());
    assert!(encoded.wire.starts_with(header.as_bytes()));
}

#[test]
fn test_bincode_codec_structured_value() {
    let mut map = BTreeMap::new();
    map.insert("name".to_string(), Value::from("atlas"));
    map.insert("tags".to_string(), Value::List(vec![Value::Int(1), Value::Bool(true)]));
    let value = Value::Map(map);

    let bytes = BincodeCodec.encode(&value).unwrap();
    assert_eq!(BincodeCodec.decode(&bytes).unwrap(), value);
}

#[test]
fn test_bincode_codec_rejects_garbage() {
    match BincodeCodec.decode(&[0xff, 0xff, 0xff, 0xff, 0xff]) {
        Err(McError::Serialization(_)) => {}
        other => panic!("Expected serialization error, got {:?}", other),
    }
}

// =============================================================================
// Reply Line Tests
// =============================================================================

#[test]
fn test_reply_token_parse_ignores_case() {
    assert_eq!(
        ReplyToken::parse(b"STORED"),
        Some(ReplyToken::Status(Status::Stored))
    );
    assert_eq!(
        ReplyToken::parse(b"not_found"),
        Some(ReplyToken::Status(Status::NotFound))
    );
    assert_eq!(ReplyToken::parse(b"Value"), Some(ReplyToken::Value));
    assert_eq!(ReplyToken::parse(b"END"), Some(ReplyToken::End));
    assert_eq!(ReplyToken::parse(b"SERVER_ERROR"), None);
}

#[test]
fn test_reply_line_value_length() {
    let reply = ReplyLine::parse(b"VALUE mykey 3 1024");

    assert_eq!(reply.token, Some(ReplyToken::Value));
    assert_eq!(reply.params.len(), 3);
    assert_eq!(reply.value_length().unwrap(), 1024);
}

#[test]
fn test_reply_line_bad_value_length() {
    for line in [&b"VALUE k 0"[..], b"VALUE k 0 abc", b"VALUE k 0 -1"] {
        match ReplyLine::parse(line).value_length() {
            Err(McError::Protocol(_)) => {}
            other => panic!("Expected protocol error, got {:?}", other),
        }
    }
}

#[test]
fn test_status_success() {
    assert!(Status::Stored.is_success());
    assert!(Status::Deleted.is_success());
    assert!(Status::Ok.is_success());
    assert!(!Status::NotFound.is_success());
    assert!(!Status::NotStored.is_success());
    assert!(!Status::Exists.is_success());
}

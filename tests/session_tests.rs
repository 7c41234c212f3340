use serde_php::{
    parse_session, parse_session_reader, parse_session_with_options, render_session, Error, IdentityNumbering,
    ParseOptions, SessionVariables, Value, ValueKind,
};
use std::io::Cursor;

#[test]
fn test_typical_session() {
    let input = b"login_ok|b:1;nome|s:4:\"sica\";inteiro|i:34;cart|a:2:{i:0;s:3:\"tea\";i:1;s:6:\"coffee\";}";
    let session = parse_session(input).unwrap();
    assert_eq!(session.len(), 4);
    assert_eq!(session.get("login_ok"), Some(&Value::from(true)));
    assert_eq!(session.get("nome").and_then(Value::as_str), Some("sica"));
    assert_eq!(session.get("inteiro").and_then(Value::as_i64), Some(34));
    assert_eq!(session.get("cart").and_then(|c| c.get(1)).and_then(Value::as_str), Some("coffee"));
    assert_eq!(render_session(&session).unwrap(), input);
}

#[test]
fn test_empty_input() {
    let session = parse_session(b"").unwrap();
    assert!(session.is_empty());
    assert_eq!(render_session(&session).unwrap(), b"");
}

#[test]
fn test_value_may_contain_separator() {
    let session = parse_session(b"a|s:3:\"x|y\";b|N;").unwrap();
    assert_eq!(session.get("a").and_then(Value::as_str), Some("x|y"));
    assert!(session.get("b").unwrap().is_null());
}

#[test]
fn test_high_bytes_in_names() {
    let input = b"\x7fname\xff|i:1;";
    let session = parse_session(input).unwrap();
    let (name, _) = session.iter().next().unwrap();
    assert_eq!(name, b"\x7fname\xff");
    assert_eq!(render_session(&session).unwrap(), input);
}

#[test]
fn test_malformed_sessions() {
    for (input, offset) in [
        (&b"|i:1;"[..], 0),
        (b"a i:1;", 1),
        (b"a|i:1;b", 7),
        (b"a|x;", 2),
        (b"a|i:1", 5),
    ] {
        match parse_session(input) {
            Err(Error::Parse { offset: at, .. }) => {
                assert_eq!(at, offset, "{}", String::from_utf8_lossy(input))
            }
            other => panic!("expected parse error for {:?}, got {:?}", String::from_utf8_lossy(input), other),
        }
    }
}

#[test]
fn test_references_across_entries() {
    let session = parse_session(b"list|a:1:{i:0;s:1:\"x\";}alias|r:1;").unwrap();
    assert!(matches!(session.get("alias").map(Value::kind), Some(ValueKind::Recursion(1))));

    let options = ParseOptions::new().with_identity(IdentityNumbering::AllValues);
    let session = parse_session_with_options(b"list|a:1:{i:0;s:1:\"x\";}alias|R:2;", &options).unwrap();
    assert!(matches!(session.get("alias").map(Value::kind), Some(ValueKind::Reference(2))));
}

#[test]
fn test_reader_source() {
    let session = parse_session_reader(Cursor::new(b"a|i:1;b|d:0.5;".to_vec())).unwrap();
    assert_eq!(session.get("b").and_then(Value::as_f64), Some(0.5));
}

#[test]
fn test_build_and_render() {
    let mut session = SessionVariables::new();
    session.push("user_id", 42).unwrap();
    session.push("flash", Value::list(["saved"])).unwrap();
    assert_eq!(
        render_session(&session).unwrap(),
        b"user_id|i:42;flash|a:1:{i:0;s:5:\"saved\";}"
    );

    assert!(matches!(session.push("bad|name", 1), Err(Error::InvalidArgument(_))));
    assert!(matches!(session.push("", 1), Err(Error::InvalidArgument(_))));
    assert_eq!(session.len(), 2);
}

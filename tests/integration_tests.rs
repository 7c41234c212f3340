use serde::{Deserialize, Serialize};
use serde_php::{
    from_reader, from_slice, parse, parse_document, parse_or_null, parse_reader, parse_with_options, render,
    to_value, to_vec, Error, IdentityNumbering, Key, MemberName, ParseOptions, Value, ValueKind, Visibility,
};
use std::io::Cursor;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Product>,
    note: Option<String>,
}

fn assert_round_trip(input: &[u8]) {
    let value = parse(input).unwrap();
    assert_eq!(render(&value), input, "render of {}", String::from_utf8_lossy(input));
}

fn error_offset(input: &[u8]) -> usize {
    match parse(input) {
        Err(Error::Parse { offset, .. }) => offset,
        other => panic!("expected a parse error for {:?}, got {:?}", String::from_utf8_lossy(input), other),
    }
}

#[test]
fn test_scalars() {
    assert_eq!(parse(b"N;").unwrap(), Value::null());
    assert_eq!(parse(b"b:1;").unwrap(), Value::from(true));
    assert_eq!(parse(b"b:0;").unwrap(), Value::from(false));
    assert_eq!(parse(b"i:-42;").unwrap(), Value::from(-42));
    assert_eq!(parse(b"d:0.5;").unwrap(), Value::from(0.5));
    assert_eq!(parse(b"s:0:\"\";").unwrap(), Value::from(""));

    for input in [&b"N;"[..], b"b:1;", b"i:-42;", b"d:0.5;", b"s:5:\"a;b:c\";"] {
        assert_round_trip(input);
    }
}

#[test]
fn test_integer_forms() {
    assert_eq!(parse(b"i:007;").unwrap().as_i64(), Some(7));
    assert_eq!(parse(b"i:000;").unwrap().as_i64(), Some(0));
    assert_eq!(parse(b"i:+5;").unwrap().as_i64(), Some(5));
    assert_eq!(parse(b"i:-9223372036854775808;").unwrap().as_i64(), Some(i64::MIN));
    assert_eq!(error_offset(b"i:;"), 2);
    assert_eq!(error_offset(b"i:-;"), 3);
    assert_eq!(error_offset(b"i:9223372036854775808;"), 2);
}

#[test]
fn test_float_forms() {
    assert_eq!(parse(b"d:INF;").unwrap().as_f64(), Some(f64::INFINITY));
    assert_eq!(parse(b"d:-INF;").unwrap().as_f64(), Some(f64::NEG_INFINITY));
    assert!(parse(b"d:NAN;").unwrap().as_f64().unwrap().is_nan());
    assert_eq!(parse(b"d:1.5E+25;").unwrap().as_f64(), Some(1.5e25));

    for input in [&b"d:INF;"[..], b"d:-INF;", b"d:NAN;", b"d:1.5E+25;", b"d:-0;", b"d:0.1;"] {
        assert_round_trip(input);
    }
    assert_eq!(render(&Value::from(1.0 / 3.0)), b"d:0.3333333333333333;");
    assert!(parse(b"d:abc;").is_err());
}

#[test]
fn test_string_lengths_count_bytes() {
    let value = Value::from("é");
    assert_eq!(render(&value), "s:2:\"é\";".as_bytes());
    assert_eq!(parse("s:2:\"é\";".as_bytes()).unwrap(), value);
    assert!(parse("s:1:\"é\";".as_bytes()).is_err());
}

#[test]
fn test_string_may_contain_delimiters() {
    let value = parse(b"s:6:\"\";}\"{;\";").unwrap();
    assert_eq!(value.as_bytes(), Some(&b"\";}\"{;"[..]));
}

#[test]
fn test_escaped_string_normalizes() {
    let value = parse(b"S:3:\"\\61bc\";").unwrap();
    assert_eq!(value.as_str(), Some("abc"));
    assert_eq!(render(&value), b"s:3:\"abc\";");
    assert!(parse(b"S:1:\"\\zz\";").is_err());
}

#[test]
fn test_arrays() {
    let input = b"a:3:{i:0;s:1:\"a\";s:3:\"key\";b:1;i:-5;a:0:{}}";
    let value = parse(input).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries[0].key, Key::Int(0));
    assert_eq!(entries[1].key, Key::from("key"));
    assert_eq!(entries[2].key, Key::Int(-5));
    assert_round_trip(input);
}

#[test]
fn test_duplicate_keys_preserved() {
    let input = b"a:2:{i:0;i:1;i:0;i:2;}";
    let value = parse(input).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_round_trip(input);
}

#[test]
fn test_invalid_array_key() {
    assert_eq!(error_offset(b"a:1:{d:1.5;N;}"), 5);
    assert_eq!(error_offset(b"a:1:{N;N;}"), 5);
}

#[test]
fn test_count_mismatch_offsets() {
    // too few: fails at the closing brace
    assert_eq!(error_offset(b"a:2:{i:0;N;}"), 11);
    // too many: fails where the brace was expected
    assert_eq!(error_offset(b"a:1:{i:0;N;i:1;N;}"), 11);
    assert_eq!(error_offset(b"O:3:\"Foo\":2:{s:1:\"a\";N;}"), 23);
}

#[test]
fn test_trailing_data_rejected() {
    assert_eq!(error_offset(b"N;N;"), 2);
    assert_eq!(error_offset(b"i:1; "), 4);
}

#[test]
fn test_unknown_tag() {
    assert_eq!(error_offset(b"x:1;"), 0);
    assert_eq!(error_offset(b""), 0);
}

#[test]
fn test_error_context() {
    let err = parse(b"a:1:{i:0;s:3:\"abc\"X}").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("offset #18"), "{}", message);
    assert!(message.contains("abc\"[X]}"), "{}", message);
}

#[test]
fn test_private_member_round_trip() {
    let input = b"O:3:\"Foo\":1:{s:8:\"\0Foo\0bar\";i:1;}";
    let value = parse(input).unwrap();
    let member = &value.as_object().unwrap().members[0];
    assert_eq!(member.name.name, b"bar");
    assert_eq!(member.name.visibility, Visibility::Private(b"Foo".to_vec()));
    assert_round_trip(input);
}

#[test]
fn test_member_visibility() {
    let input = b"O:3:\"Foo\":3:{s:1:\"a\";N;s:4:\"\0*\0b\";N;s:6:\"\0Bar\0c\";N;}";
    let value = parse(input).unwrap();
    let names: Vec<&MemberName> = value.as_object().unwrap().members.iter().map(|m| &m.name).collect();
    assert_eq!(names[0], &MemberName::public("a"));
    assert_eq!(names[1], &MemberName::protected("b"));
    assert_eq!(names[2], &MemberName::private("Bar", "c"));
    assert_eq!(value.member("b"), Some(&Value::null()));
    assert_round_trip(input);
}

#[test]
fn test_object_member_name_must_be_string() {
    assert_eq!(error_offset(b"O:3:\"Foo\":1:{i:0;N;}"), 13);
}

#[test]
fn test_custom_object_is_opaque() {
    let input = b"C:11:\"ArrayObject\":21:{x:i:0;a:0:{};m:a:0:{}}";
    let value = parse(input).unwrap();
    let custom = value.as_custom().unwrap();
    assert_eq!(custom.class_name, b"ArrayObject");
    assert_eq!(custom.data, b"x:i:0;a:0:{};m:a:0:{}");
    assert_round_trip(input);
}

#[test]
fn test_cyclic_array_terminates() {
    let doc = parse_document(b"a:1:{i:0;r:1;}").unwrap();
    let entries = doc.root.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(matches!(entries[0].value.kind(), ValueKind::Recursion(1)));
    assert!(std::ptr::eq(doc.resolve(1).unwrap(), &doc.root));
    assert_round_trip(b"a:1:{i:0;r:1;}");
}

#[test]
fn test_back_references_resolve_backwards_only() {
    assert_eq!(error_offset(b"a:1:{i:0;r:2;}"), 11);
    assert_eq!(error_offset(b"r:1;"), 2);
    assert_eq!(error_offset(b"a:1:{i:0;R:0;}"), 11);
}

#[test]
fn test_identity_table_paths() {
    let doc = parse_document(b"a:2:{i:0;a:0:{}i:1;O:1:\"A\":1:{s:1:\"x\";a:0:{}}}").unwrap();
    let paths: Vec<&[usize]> = doc.identities().iter().map(|s| s.path.as_slice()).collect();
    assert_eq!(paths, vec![&[][..], &[0][..], &[1][..], &[1, 0][..]]);
    assert_eq!(doc.identities()[1].offset, 9);
    assert!(doc.resolve(4).unwrap().is_array());
    assert!(doc.resolve(5).is_none());
}

#[test]
fn test_all_values_numbering() {
    let input = b"a:2:{i:0;s:1:\"x\";i:1;R:2;}";
    assert!(parse(input).is_err());

    let options = ParseOptions::new().with_identity(IdentityNumbering::AllValues);
    let value = parse_with_options(input, &options).unwrap();
    assert!(value.validate_references(IdentityNumbering::AllValues).is_ok());
    assert!(value.validate_references(IdentityNumbering::Containers).is_err());
}

#[test]
fn test_max_depth() {
    let input = b"a:1:{i:0;a:1:{i:0;a:0:{}}}";
    assert!(parse(input).is_ok());
    let options = ParseOptions::new().with_max_depth(2);
    assert!(parse_with_options(input, &options).is_err());

    let deep = format!("{}{}", "a:1:{i:0;".repeat(600), "N;") + &"}".repeat(600);
    assert!(parse(deep.as_bytes()).is_err());
}

#[test]
fn test_parse_or_null() {
    assert_eq!(parse_or_null(b"i:3;"), Value::from(3));
    assert!(parse_or_null(b"i:3").is_null());
}

#[test]
fn test_parse_reader() {
    let value = parse_reader(Cursor::new(b"a:1:{i:0;s:3:\"abc\";}".to_vec())).unwrap();
    assert_eq!(value.get(0).and_then(Value::as_str), Some("abc"));
    assert!(parse_reader(Cursor::new(b"s:9:\"abc\";".to_vec())).is_err());
}

#[test]
fn test_round_trip_ignores_offsets() {
    let input = b"a:2:{i:0;O:8:\"stdClass\":1:{s:1:\"a\";d:1.5;}i:1;r:2;}";
    let value = parse(input).unwrap();
    let reparsed = parse(&render(&value)).unwrap();
    assert_eq!(value, reparsed);

    let mut built = value.clone();
    built.clear_offsets();
    assert_eq!(built, value);
    assert_eq!(built.offset(), None);
    assert_eq!(value.offset(), Some(0));
}

#[test]
fn test_struct_round_trip() {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        active: true,
        tags: vec!["admin".to_string(), "developer".to_string()],
    };

    let bytes = to_vec(&user).unwrap();
    let user_back: User = from_slice(&bytes).unwrap();
    assert_eq!(user, user_back);
}

#[test]
fn test_nested_struct() {
    let order = Order {
        order_id: 12345,
        customer: User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["vip".to_string()],
        },
        items: vec![
            Product {
                sku: "WIDGET-001".to_string(),
                price: 29.99,
                quantity: 2,
            },
            Product {
                sku: "GADGET-002".to_string(),
                price: 49.5,
                quantity: 1,
            },
        ],
        note: None,
    };

    let bytes = to_vec(&order).unwrap();
    assert!(bytes.starts_with(b"O:5:\"Order\":4:{"));
    let order_back: Order = from_reader(Cursor::new(bytes)).unwrap();
    assert_eq!(order, order_back);
}

#[test]
fn test_to_value_shapes() {
    let value = to_value(&vec![Some(1), None]).unwrap();
    assert_eq!(render(&value), b"a:2:{i:0;i:1;i:1;N;}");
}

#[test]
fn test_back_reference_not_deserializable() {
    let result: Result<Vec<Vec<i32>>, _> = from_slice(b"a:1:{i:0;r:1;}");
    assert!(result.is_err());
}

#[test]
fn test_value_serializes_through_serde_json() {
    let value = parse(b"a:2:{i:0;s:1:\"a\";s:1:\"k\";b:1;}").unwrap();
    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(json, r#"{"0":"a","k":true}"#);
}

//! Property-based tests for the core guarantees: rendered trees re-parse to the same
//! tree, parsing arbitrary bytes never panics, and replacement keeps documents valid.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_php::{
    from_slice, parse, parse_session, render, render_session, replace, to_vec, CustomObject, Entry, Key, Member,
    MemberName, Object, SessionVariables, Value, ValueKind,
};

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(value: &T) -> bool {
    match to_vec(value) {
        Ok(serialized) => match from_slice::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", String::from_utf8_lossy(&serialized));
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..24)
}

fn key() -> impl Strategy<Value = Key> {
    prop_oneof![any::<i64>().prop_map(Key::Int), bytes().prop_map(Key::String)]
}

fn member_name() -> impl Strategy<Value = MemberName> {
    let name = "[a-z_][a-z0-9_]{0,8}";
    prop_oneof![
        name.prop_map(|name| MemberName::public(name)),
        name.prop_map(|name| MemberName::protected(name)),
        ("[A-Z][A-Za-z]{0,8}", name).prop_map(|(class, name)| MemberName::private(class, name)),
    ]
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::null()),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_map(Value::from),
        bytes().prop_map(Value::from),
        ("[A-Z][A-Za-z]{0,8}", bytes()).prop_map(|(class, data)| Value::custom(class, data)),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec((key(), inner.clone()), 0..6).prop_map(|pairs| {
                Value::new(ValueKind::Array(pairs.into_iter().map(|(k, v)| Entry::new(k, v)).collect()))
            }),
            ("[A-Z][A-Za-z_]{0,10}", prop::collection::vec((member_name(), inner), 0..6)).prop_map(
                |(class, members)| {
                    Value::new(ValueKind::Object(Object {
                        class_name: class.into_bytes(),
                        members: members.into_iter().map(|(n, v)| Member::new(n, v)).collect(),
                    }))
                }
            ),
        ]
    })
}

proptest! {
    #[test]
    fn prop_render_then_parse(v in value()) {
        let rendered = render(&v);
        let parsed = parse(&rendered);
        prop_assert!(parsed.is_ok(), "{:?}", parsed);
        prop_assert_eq!(parsed.unwrap(), v);
    }

    #[test]
    fn prop_render_is_stable(v in value()) {
        let once = render(&v);
        let twice = render(&parse(&once).unwrap());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_custom_payload_untouched(data in bytes()) {
        let value = Value::custom("Blob", data.clone());
        let parsed = parse(&render(&value)).unwrap();
        prop_assert_eq!(parsed.as_custom(), Some(&CustomObject { class_name: b"Blob".to_vec(), data }));
    }

    #[test]
    fn prop_parse_never_panics(input in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = parse(&input);
        let _ = parse_session(&input);
    }

    #[test]
    fn prop_trailing_bytes_rejected(v in value(), extra in prop::collection::vec(any::<u8>(), 1..8)) {
        let mut rendered = render(&v);
        rendered.extend_from_slice(&extra);
        prop_assert!(parse(&rendered).is_err());
    }

    #[test]
    fn prop_replace_keeps_documents_valid(v in value(), needle in "[a-z]{1,3}", with in "[a-zé]{0,4}") {
        let mut rendered = render(&v);
        let count = replace(needle.as_str(), with.as_str(), &mut rendered);
        // embedded text that happens to look serialized may be rejected; nothing else may fail
        if let Ok(count) = count {
            let reparsed = parse(&rendered);
            prop_assert!(reparsed.is_ok(), "{:?}", reparsed);
            if count == 0 {
                prop_assert_eq!(rendered, render(&v));
            }
        }
    }

    #[test]
    fn prop_session_round_trip(entries in prop::collection::vec(("[A-Za-z_][A-Za-z0-9_]{0,8}", scalar()), 0..6)) {
        let mut session = SessionVariables::new();
        for (name, value) in entries {
            session.push(name, value).unwrap();
        }
        let rendered = render_session(&session).unwrap();
        prop_assert_eq!(parse_session(&rendered).unwrap(), session);
    }

    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&b));
    }

    #[test]
    fn prop_string(s in ".{0,16}") {
        prop_assert!(roundtrip(&s));
    }

    #[test]
    fn prop_vec_i32(v in prop::collection::vec(any::<i32>(), 0..20)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_option_i32(opt in proptest::option::of(any::<i32>())) {
        prop_assert!(roundtrip(&opt));
    }
}

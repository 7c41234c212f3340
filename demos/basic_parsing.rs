//! Parsing, inspecting and rendering serialized data.
//!
//! Run with: cargo run --example basic_parsing

use serde::{Deserialize, Serialize};
use serde_php::capability::{Formatter, JsonFormatter};
use serde_php::{from_slice, parse, parse_document, render, to_vec, Value, ValueKind, Visibility};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Rust data in and out
    let user = User {
        id: 42,
        name: "Alice Johnson".to_string(),
        email: "alice@example.com".to_string(),
    };
    let bytes = to_vec(&user)?;
    println!("Serialized:\n{}\n", String::from_utf8_lossy(&bytes));

    let user_back: User = from_slice(&bytes)?;
    assert_eq!(user, user_back);
    println!("✓ Round-trip successful\n");

    // An object with protected and private members
    let input = b"O:7:\"Account\":3:{s:5:\"owner\";s:5:\"alice\";s:10:\"\0*\0balance\";d:12.5;s:12:\"\0Account\0pin\";i:1234;}";
    let value = parse(input)?;
    if let Some(object) = value.as_object() {
        println!("class {}", String::from_utf8_lossy(&object.class_name));
        for member in &object.members {
            let visibility = match &member.name.visibility {
                Visibility::Public => "public".to_string(),
                Visibility::Protected => "protected".to_string(),
                Visibility::Private(class) => format!("private to {}", String::from_utf8_lossy(class)),
            };
            println!("  {} ({}) = {}", String::from_utf8_lossy(&member.name.name), visibility, member.value);
        }
    }
    assert_eq!(render(&value), input);
    println!("✓ Member visibility survives rendering\n");

    // Cycles resolve through the identity table
    let doc = parse_document(b"a:2:{s:4:\"name\";s:4:\"root\";s:4:\"self\";r:1;}")?;
    if let Some(ValueKind::Recursion(index)) = doc.root.get("self").map(Value::kind) {
        let target = doc.resolve(*index).ok_or("dangling back-reference")?;
        println!("\"self\" points at: {}", target);
    }

    // Any serde format can present a value
    println!("\nAs JSON:\n{}", JsonFormatter::pretty().format(&value)?);

    Ok(())
}

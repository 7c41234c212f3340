//! Reading and writing session data.
//!
//! Run with: cargo run --example sessions

use serde_php::{parse_session, render_session, replace, SessionVariables, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let raw = b"user_id|i:17;username|s:5:\"alice\";cart|a:2:{i:0;s:6:\"teapot\";i:1;s:4:\"mugs\";}";

    let mut session = parse_session(raw)?;
    for (name, value) in session.iter() {
        println!("{:>10} = {}", String::from_utf8_lossy(name), value);
    }

    let items = session
        .get("cart")
        .and_then(Value::as_array)
        .map_or(0, <[_]>::len);
    println!("\n{} item(s) in the cart", items);

    replace("teapot", "kettle", &mut session)?;
    println!("\nRewritten:\n{}", String::from_utf8_lossy(&render_session(&session)?));

    // Building one from scratch
    let mut fresh = SessionVariables::new();
    fresh.push("visits", 1)?;
    fresh.push("flash", Value::list(["Welcome back!"]))?;
    println!("\nNew session:\n{}", String::from_utf8_lossy(&render_session(&fresh)?));

    Ok(())
}

//! Rewriting serialized data in place.
//!
//! A typical job: a site moves to a new domain and every URL stored in the
//! database has to change, including the ones inside serialized option blobs
//! whose length fields would break under a plain text replace.
//!
//! Run with: cargo run --example search_replace

use serde_php::{parse, replace, replace_with_options, NodeKind, Phase, ReplaceOptions, Replacer};
use std::error::Error;
use std::ops::ControlFlow;

fn main() -> Result<(), Box<dyn Error>> {
    let mut row = b"a:3:{s:4:\"home\";s:23:\"http://old.example/home\";s:6:\"widget\";s:37:\"{\"link\":\"http://old.example/w\",\"n\":3}\";s:4:\"logo\";s:28:\"http://old.example/logo.webp\";}".to_vec();

    println!("Before:\n{}\n", String::from_utf8_lossy(&row));
    let count = replace("http://old.example", "https://www.new-example.org", &mut row)?;
    println!("After ({} replacements):\n{}\n", count, String::from_utf8_lossy(&row));
    parse(&row)?;
    println!("✓ Still a valid document\n");

    // Regex mode is picked automatically for delimited patterns
    let mut emails = vec!["alice@corp.test".to_string(), "bob@corp.test".to_string()];
    let count = replace("/^(\\w+)@corp\\.test$/", "$1@corp.example", &mut emails)?;
    println!("{} addresses rewritten: {:?}\n", count, emails);

    // Numbers are only touched when asked for
    let mut config = parse(b"a:2:{s:4:\"port\";i:8080;s:7:\"backlog\";i:80;}")?;
    let options = ReplaceOptions::default().with_process_int(true);
    let count = replace_with_options("80", "90", &mut config, options)?;
    println!("{} numeric replacements: {}\n", count, config);

    // Callbacks can watch the traversal and stop it
    let mut seen = 0;
    let mut list = vec!["x".to_string(); 5];
    let mut replacer = Replacer::new("x", "y", ReplaceOptions::default())?.on(NodeKind::String, |visit| {
        if visit.phase == Phase::Enter {
            seen += 1;
        }
        if seen >= 3 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    let count = replacer.apply(&mut list)?;
    println!("Stopped early after {} replacements: {:?}", count, list);

    Ok(())
}

//! # serde_php
//!
//! Parser, serializer and deep search-and-replace for the PHP `serialize()` format.
//!
//! ## What is in the box?
//!
//! - **Byte-exact grammar**: every tag (`N b i d s S a O C r R`) with its exact
//!   delimiters, byte-length fields and counts, errors reported at the failing offset
//! - **Faithful value model**: member visibility, opaque custom-object payloads and
//!   back-references (including cycles) survive a round trip
//! - **Sessions**: the `name|value` session store form
//! - **Search and replace**: deep, counted substitution that keeps every length field
//!   consistent, descending into serialized and JSON documents stored inside strings
//! - **Serde compatible**: move Rust data in and out via `#[derive(Serialize, Deserialize)]`
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! serde_php = "0.1"
//! ```
//!
//! ### Parsing and rendering
//!
//! ```rust
//! use serde_php::{parse, render, Value};
//!
//! let input = b"a:2:{i:0;s:5:\"hello\";s:3:\"pi\";d:3.14;}";
//! let value = parse(input).unwrap();
//!
//! assert_eq!(value.get(0).and_then(Value::as_str), Some("hello"));
//! assert_eq!(value.get("pi").and_then(Value::as_f64), Some(3.14));
//! assert_eq!(render(&value), input);
//! ```
//!
//! ### Working with Rust types
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_php::{from_slice, to_vec};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//! }
//!
//! let user = User { id: 7, name: "Alice".to_string() };
//! let bytes = to_vec(&user).unwrap();
//! assert_eq!(bytes, b"O:4:\"User\":2:{s:2:\"id\";i:7;s:4:\"name\";s:5:\"Alice\";}");
//!
//! let back: User = from_slice(&bytes).unwrap();
//! assert_eq!(back, user);
//! ```
//!
//! ### Search and replace
//!
//! ```rust
//! use serde_php::replace;
//!
//! // A serialized payload stored as a plain string, as databases tend to hold them
//! let mut row = b"a:1:{s:3:\"url\";s:19:\"http://old.example/\";}".to_vec();
//! let count = replace("old.example", "new.example.org", &mut row).unwrap();
//!
//! assert_eq!(count, 1);
//! assert_eq!(row, b"a:1:{s:3:\"url\";s:23:\"http://new.example.org/\";}");
//! ```
//!
//! ### Building values with php!
//!
//! ```rust
//! use serde_php::{php, render};
//!
//! let value = php!({ "name": "Alice", "tags": ["a", "b"] });
//! assert_eq!(
//!     render(&value),
//!     b"a:2:{s:4:\"name\";s:5:\"Alice\";s:4:\"tags\";a:2:{i:0;s:1:\"a\";i:1;s:1:\"b\";}}"
//! );
//! ```
//!
//! ## Resource limits
//!
//! Parsing is recursive. Back-references never re-descend, so cyclic graphs are
//! cheap, but deeply nested non-cyclic input is bounded by
//! [`ParseOptions::max_depth`] (512 by default).
//!
//! ## Demos
//!
//! See the `demos/` directory:
//!
//! - **`basic_parsing.rs`** - parsing, inspecting and rendering values
//! - **`search_replace.rs`** - rewriting serialized data in place
//! - **`sessions.rs`** - reading and writing session data
//!
//! Run any demo with: `cargo run --example <name>`

pub mod capability;
pub mod cursor;
pub mod de;
pub mod error;
pub mod grammar;
pub mod macros;
pub mod options;
pub mod replace;
pub mod ser;
pub mod session;
pub mod value;

pub use cursor::ByteCursor;
pub use de::{
    from_reader, from_slice, from_value, parse, parse_document, parse_document_with_options, parse_or_null,
    parse_reader, parse_with_options, Parser, ValueDeserializer,
};
pub use error::{Error, Result};
pub use options::{ByteMode, IdentityNumbering, MatchMode, ParseOptions, ReplaceOptions};
pub use replace::{NodeKind, Phase, Replaceable, Replacer, Terms, Visit};
pub use ser::{render, render_to_writer, render_with, to_value, to_vec, to_writer, Renderer, ValueSerializer};
pub use session::{parse_session, parse_session_reader, parse_session_with_options, render_session};
pub use value::{
    CustomObject, Document, Entry, IdentitySlot, Key, Member, MemberName, Object, SessionVariables, Value, ValueKind,
    Visibility,
};

/// Replaces `search` with `replacement` throughout `subject` using the default
/// [`ReplaceOptions`], returning the number of replacements.
///
/// # Examples
///
/// ```rust
/// use serde_php::replace;
///
/// let mut names = vec!["foo".to_string(), "food".to_string(), "bar".to_string()];
/// assert_eq!(replace("foo", "baz", &mut names).unwrap(), 2);
/// assert_eq!(names, ["baz", "bazd", "bar"]);
/// ```
///
/// # Errors
///
/// Returns an error if the replacer cannot be built, an embedded document fails to
/// parse, or a replaced number no longer parses.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn replace<T>(search: impl Into<Terms>, replacement: impl Into<Terms>, subject: &mut T) -> Result<usize>
where
    T: ?Sized + Replaceable,
{
    replace_with_options(search, replacement, subject, ReplaceOptions::default())
}

/// Like [`replace`] with explicit options.
///
/// ```rust
/// use serde_php::{parse, render, replace_with_options, ReplaceOptions};
///
/// let mut value = parse(b"a:1:{s:4:\"port\";i:8080;}").unwrap();
/// let options = ReplaceOptions::default().with_process_int(true);
/// assert_eq!(replace_with_options("8080", "9090", &mut value, options).unwrap(), 1);
/// assert_eq!(render(&value), b"a:1:{s:4:\"port\";i:9090;}");
/// ```
///
/// # Errors
///
/// See [`replace`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn replace_with_options<T>(
    search: impl Into<Terms>,
    replacement: impl Into<Terms>,
    subject: &mut T,
    options: ReplaceOptions,
) -> Result<usize>
where
    T: ?Sized + Replaceable,
{
    Replacer::new(search, replacement, options)?.apply(subject)
}

//! Wire grammar of the serialized format.
//!
//! This module documents the byte-level grammar implemented by the parser in
//! [`crate::de`] and the renderer in [`crate::ser`], and holds the tag constants
//! both of them share.
//!
//! # Values
//!
//! Every value starts with a one-byte type tag. Scalars end with `;`, containers
//! end with `}`. Length and count fields are decimal byte counts.
//!
//! | Type | Syntax | Example |
//! |------|--------|---------|
//! | Null | `N;` | `N;` |
//! | Bool | `b:` (`0`\|`1`) `;` | `b:1;` |
//! | Int | `i:` [sign] digits `;` | `i:-42;` |
//! | Float | `d:` token `;` | `d:0.5;`, `d:1.0E+25;`, `d:INF;`, `d:-INF;`, `d:NAN;` |
//! | String | `s:` len `:"` bytes `";` | `s:5:"hello";` |
//! | Array | `a:` count `:{` (key value)* `}` | `a:1:{i:0;s:1:"x";}` |
//! | Object | `O:` len `:"` class `":` count `:{` (name value)* `}` | `O:3:"Foo":1:{s:1:"a";N;}` |
//! | Custom object | `C:` len `:"` class `":` len `:{` bytes `}` | `C:3:"Foo":3:{abc}` |
//! | Recursion | `r:` index `;` | `r:1;` |
//! | Reference | `R:` index `;` | `R:2;` |
//!
//! ## Strings
//!
//! The length counts bytes, not characters: `"é"` encoded as UTF-8 is written
//! `s:2:"é";`. The content is copied verbatim, quotes included, so no escaping
//! takes place. A legacy `S:` form stores the content with `\xx` hex escapes; it is
//! accepted on input and read as an ordinary string, and never produced.
//!
//! ## Arrays
//!
//! Keys are ints or strings. Order is significant and duplicate keys are
//! preserved as written.
//!
//! ## Objects
//!
//! Member names are strings whose prefix encodes visibility:
//!
//! - `name`: public
//! - `\0*\0name`: protected
//! - `\0Class\0name`: private to `Class`
//!
//! ## Back-references
//!
//! `r:` and `R:` carry a 1-based index into the identity table, the registry of
//! values in the order they were opened. A container is registered before its
//! children are read, so `a:1:{i:0;r:1;}` is an array containing itself.
//!
//! # Sessions
//!
//! Session data is a bare concatenation of `name|value` entries without any
//! count or wrapper. Names use the bytes `[A-Za-z0-9_\x7f-\xff]`.
//!
//! ```text
//! user|s:5:"alice";visits|i:3;
//! ```

pub const TAG_NULL: u8 = b'N';
pub const TAG_BOOL: u8 = b'b';
pub const TAG_INT: u8 = b'i';
pub const TAG_FLOAT: u8 = b'd';
pub const TAG_STRING: u8 = b's';
pub const TAG_ESCAPED_STRING: u8 = b'S';
pub const TAG_ARRAY: u8 = b'a';
pub const TAG_OBJECT: u8 = b'O';
pub const TAG_CUSTOM: u8 = b'C';
pub const TAG_RECURSION: u8 = b'r';
pub const TAG_REFERENCE: u8 = b'R';

pub const DELIMITER: u8 = b':';
pub const TERMINATOR: u8 = b';';
pub const OPEN: u8 = b'{';
pub const CLOSE: u8 = b'}';
pub const QUOTE: u8 = b'"';
pub const SESSION_SEPARATOR: u8 = b'|';

pub const INF_TOKEN: &str = "INF";
pub const NEG_INF_TOKEN: &str = "-INF";
pub const NAN_TOKEN: &str = "NAN";

/// Every type tag the parser accepts.
pub const TAGS: &[u8] = b"NbidsSaOCrR";

/// Returns `true` for bytes allowed in a session variable name.
#[inline]
#[must_use]
pub const fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x7f
}

/// Returns `true` for a non-empty session variable name.
#[must_use]
pub fn is_identifier(name: &[u8]) -> bool {
    !name.is_empty() && name.iter().all(|&b| is_identifier_byte(b))
}

/// Cheap shape check: does `data` (already trimmed) start with a type tag and end
/// with that tag's terminator?
///
/// A positive answer is not a guarantee; the parser has the final say.
///
/// ```rust
/// use serde_php::grammar::looks_serialized;
///
/// assert!(looks_serialized(b"s:3:\"abc\";"));
/// assert!(looks_serialized(b"a:0:{}"));
/// assert!(!looks_serialized(b"hello world"));
/// assert!(!looks_serialized(b"Nope;"));
/// ```
#[must_use]
pub fn looks_serialized(data: &[u8]) -> bool {
    let (first, last) = match (data.first(), data.last()) {
        (Some(&f), Some(&l)) if data.len() >= 2 => (f, l),
        _ => return false,
    };
    match first {
        TAG_NULL => data == b"N;",
        TAG_STRING | TAG_ESCAPED_STRING => {
            data.len() >= 6
                && data[1] == DELIMITER
                && last == TERMINATOR
                && data[data.len() - 2] == QUOTE
                && data[2..].contains(&QUOTE)
        }
        TAG_ARRAY | TAG_OBJECT | TAG_CUSTOM => data[1] == DELIMITER && last == CLOSE,
        TAG_BOOL | TAG_INT | TAG_FLOAT | TAG_RECURSION | TAG_REFERENCE => {
            data[1] == DELIMITER && last == TERMINATOR
        }
        _ => false,
    }
}

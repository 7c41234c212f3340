//! Error types for parsing, rendering and replacing serialized data.
//!
//! ## Error Categories
//!
//! - **Parse errors**: a grammar violation at an exact byte offset, with a short
//!   excerpt of the input around that offset
//! - **Invalid arguments**: misuse of a public entry point (bad option names,
//!   uncompilable patterns, identifiers outside the session charset)
//! - **Invariant violations**: internal consistency failures; these indicate a bug
//! - **Embedded failures**: a nested document inside a string failed to parse during
//!   search-and-replace; the offending fragment is attached
//! - **Numeric conversion**: a replaced integer or float no longer reads as a number
//!
//! ## Examples
//!
//! ```rust
//! use serde_php::{parse, Error};
//!
//! let err = parse(b"i:12x;").unwrap_err();
//! assert_eq!(err.offset(), Some(4));
//! assert!(matches!(err, Error::Parse { .. }));
//! ```

use std::fmt;
use thiserror::Error;

/// Number of bytes shown on each side of the failing offset in a context window.
pub const CONTEXT_RADIUS: usize = 12;

/// Represents all possible errors of this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Grammar violation at a byte offset.
    #[error("Parse error at offset #{offset}: {message} (\"{context}\")")]
    Parse {
        offset: usize,
        message: String,
        context: String,
    },

    /// Misuse of a public entry point
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal consistency failure
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// IO error while reading a byte source
    #[error("IO error: {0}")]
    Io(String),

    /// A nested document inside a string could not be processed.
    #[error("{source} (in embedded fragment \"{fragment}\")")]
    Embedded {
        fragment: String,
        #[source]
        source: Box<Error>,
    },

    /// Replaced text could not be converted back to its numeric type.
    #[error("Cannot convert \"{text}\" back to {target} after replacement")]
    NumericConversion { text: String, target: &'static str },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a parse error at `offset` with a context excerpt taken from `input`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_php::Error;
    ///
    /// let err = Error::parse(b"a:1:{i:0;}", 9, "unexpected '}'");
    /// assert!(err.to_string().contains("[}]"));
    /// ```
    pub fn parse(input: &[u8], offset: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            offset,
            message: message.into(),
            context: context_window(input, 0, offset),
        }
    }

    /// Creates a parse error whose context excerpt was already built by the caller.
    pub fn parse_with_context(offset: usize, message: impl Into<String>, context: String) -> Self {
        Error::Parse {
            offset,
            message: message.into(),
            context,
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidArgument(msg.to_string())
    }

    /// Creates an invariant violation error.
    pub fn invariant<T: fmt::Display>(msg: T) -> Self {
        Error::InvariantViolation(msg.to_string())
    }

    /// Wraps an error raised while processing an embedded document.
    pub fn embedded(fragment: &[u8], source: Error) -> Self {
        Error::Embedded {
            fragment: String::from_utf8_lossy(fragment).into_owned(),
            source: Box::new(source),
        }
    }

    /// Creates a numeric back-conversion error.
    pub fn numeric_conversion(text: &[u8], target: &'static str) -> Self {
        Error::NumericConversion {
            text: String::from_utf8_lossy(text).into_owned(),
            target,
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the byte offset of a parse error, looking through embedded wrappers.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Parse { offset, .. } => Some(*offset),
            Error::Embedded { source, .. } => source.offset(),
            _ => None,
        }
    }
}

/// Builds the diagnostic excerpt around `offset`.
///
/// `window` holds input bytes starting at absolute offset `base`. The failing
/// byte is bracketed, bytes outside the radius are replaced by `...`, and an
/// offset past the end is marked with `<-- EOF`.
pub(crate) fn context_window(window: &[u8], base: usize, offset: usize) -> String {
    let rel = offset.saturating_sub(base).min(window.len());
    let start = rel.saturating_sub(CONTEXT_RADIUS);
    let end = (rel + 1 + CONTEXT_RADIUS).min(window.len());

    let mut out = String::new();
    if start > 0 || base > 0 {
        out.push_str("...");
    }
    push_escaped(&mut out, &window[start..rel]);
    match window.get(rel) {
        Some(&b) => {
            out.push('[');
            push_escaped(&mut out, &[b]);
            out.push(']');
            if rel + 1 < end {
                push_escaped(&mut out, &window[rel + 1..end]);
            }
            if end < window.len() {
                out.push_str("...");
            }
        }
        None => out.push_str("<-- EOF"),
    }
    out
}

fn push_escaped(out: &mut String, bytes: &[u8]) {
    for &b in bytes {
        match b {
            b'\0' => out.push_str("\\0"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! Session data: a flat sequence of `name|value` entries.
//!
//! ```rust
//! use serde_php::{parse_session, render_session};
//!
//! let input = b"user|s:5:\"alice\";visits|i:3;";
//! let session = parse_session(input).unwrap();
//! assert_eq!(session.get("visits").and_then(|v| v.as_i64()), Some(3));
//! assert_eq!(render_session(&session).unwrap(), input);
//! ```

use crate::de::Parser;
use crate::grammar::{is_identifier, is_identifier_byte, SESSION_SEPARATOR};
use crate::options::ParseOptions;
use crate::ser::Renderer;
use crate::value::SessionVariables;
use crate::{Error, Result};
use std::io::Read;

/// Parses session data. Empty input gives an empty set of variables.
///
/// All values share one identity table, so a back-reference in a later entry may
/// point into an earlier one.
///
/// # Errors
///
/// Returns [`Error::Parse`] for an empty or malformed name, a missing `|`, or a
/// malformed value.
pub fn parse_session(input: &[u8]) -> Result<SessionVariables> {
    parse_session_with_options(input, &ParseOptions::default())
}

pub fn parse_session_with_options(input: &[u8], options: &ParseOptions) -> Result<SessionVariables> {
    read_session(Parser::from_slice(input).with_options(options.clone()))
}

/// Parses session data from a byte stream.
pub fn parse_session_reader<R: Read>(reader: R) -> Result<SessionVariables> {
    read_session(Parser::new(reader))
}

fn read_session<R: Read>(mut parser: Parser<'_, R>) -> Result<SessionVariables> {
    let mut variables = SessionVariables::new();
    while !parser.at_end()? {
        let start = parser.position();
        let cursor = parser.cursor_mut();
        let name = cursor.read_while(is_identifier_byte)?;
        if name.is_empty() {
            return Err(cursor.error_at(start, "Expected a session variable name"));
        }
        let at = cursor.position();
        match cursor.peek()? {
            Some(SESSION_SEPARATOR) => cursor.advance(1)?,
            _ => {
                return Err(cursor.error_at(
                    at,
                    format!("Expected '|' after session variable \"{}\"", String::from_utf8_lossy(&name)),
                ))
            }
        }
        let value = parser.parse_value_at(variables.len())?;
        variables.push_parsed(name, value);
    }
    Ok(variables)
}

/// Renders session data.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] when a name is empty or uses bytes outside
/// `[A-Za-z0-9_\x7f-\xff]`.
pub fn render_session(variables: &SessionVariables) -> Result<Vec<u8>> {
    let mut renderer = Renderer::new();
    for (name, value) in variables.iter() {
        if !is_identifier(name) {
            return Err(Error::invalid_argument(format!(
                "invalid session variable name \"{}\"",
                String::from_utf8_lossy(name)
            )));
        }
        renderer.write_raw(name);
        renderer.write_raw(&[SESSION_SEPARATOR]);
        renderer.write_value(value);
    }
    Ok(renderer.into_inner())
}

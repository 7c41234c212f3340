//! Configuration for parsing and for search-and-replace.
//!
//! - [`ParseOptions`]: nesting limit and identity numbering for the parser
//! - [`ReplaceOptions`]: what a search-and-replace pass touches and how it matches
//!
//! ## Examples
//!
//! ```rust
//! use serde_php::{ByteMode, MatchMode, ParseOptions, ReplaceOptions};
//!
//! let parse = ParseOptions::new().with_max_depth(64);
//! assert_eq!(parse.max_depth, 64);
//!
//! let replace = ReplaceOptions::new()
//!     .with_match_mode(MatchMode::Regex)
//!     .with_byte_mode(ByteMode::MultiByte)
//!     .with_process_array_keys(true);
//! assert!(replace.process_array_keys);
//!
//! // Unknown option names are rejected up front
//! assert!(ReplaceOptions::from_flag_names(["process_string", "process_everything"]).is_err());
//! ```

use crate::grammar::{TAG_ARRAY, TAG_CUSTOM, TAG_OBJECT, TAG_REFERENCE};
use crate::value::ValueKind;
use crate::{Error, Result};
use serde::Deserialize;

/// Default nesting limit for [`ParseOptions`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Which values receive a slot in the identity table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityNumbering {
    /// Arrays, objects and custom objects only.
    #[default]
    Containers,
    /// Every value except array keys, member names and `R:` aliases, the way the
    /// runtime's own serializer counts.
    AllValues,
}

impl IdentityNumbering {
    /// Does a value of this kind open a slot?
    #[inline]
    #[must_use]
    pub fn registers(self, kind: &ValueKind) -> bool {
        self.registers_tag(kind.tag())
    }

    /// Does a value starting with this type tag open a slot?
    #[inline]
    #[must_use]
    pub fn registers_tag(self, tag: u8) -> bool {
        match self {
            IdentityNumbering::Containers => matches!(tag, TAG_ARRAY | TAG_OBJECT | TAG_CUSTOM),
            IdentityNumbering::AllValues => tag != TAG_REFERENCE,
        }
    }
}

/// Parser configuration.
///
/// `max_depth` bounds container nesting. Back-references never recurse, so cyclic
/// graphs are unaffected; the limit exists for deeply nested non-cyclic input,
/// which would otherwise be bounded only by the call stack.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    pub max_depth: usize,
    pub identity: IdentityNumbering,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            identity: IdentityNumbering::default(),
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_identity(mut self, identity: IdentityNumbering) -> Self {
        self.identity = identity;
        self
    }
}

/// How search terms are matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Regex if every search term compiles as a delimited pattern, literal otherwise.
    #[default]
    Auto,
    Literal,
    Regex,
}

/// Unit of matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteMode {
    /// Multi-byte when the pattern engine supports it.
    Auto,
    /// Bytes. A literal term may match part of a UTF-8 character.
    #[default]
    SingleByte,
    /// UTF-8 characters. Regex `.` consumes a whole character and literal
    /// matches never start or end inside one.
    MultiByte,
}

/// Search-and-replace configuration.
///
/// The defaults process strings and array values, resolve the match mode
/// automatically and match byte-wise.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplaceOptions {
    pub process_array_keys: bool,
    pub process_array_values: bool,
    pub process_string: bool,
    pub process_int: bool,
    pub process_float: bool,
    /// Class names, object member names and the keys of parsed arrays.
    pub process_name: bool,
    pub match_mode: MatchMode,
    pub byte_mode: ByteMode,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        ReplaceOptions {
            process_array_keys: false,
            process_array_values: true,
            process_string: true,
            process_int: false,
            process_float: false,
            process_name: false,
            match_mode: MatchMode::Auto,
            byte_mode: ByteMode::SingleByte,
        }
    }
}

impl ReplaceOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with nothing switched on and both modes automatic.
    #[must_use]
    pub fn none() -> Self {
        ReplaceOptions {
            process_array_keys: false,
            process_array_values: false,
            process_string: false,
            process_int: false,
            process_float: false,
            process_name: false,
            match_mode: MatchMode::Auto,
            byte_mode: ByteMode::Auto,
        }
    }

    /// Builds options from option names, starting from [`ReplaceOptions::none`].
    ///
    /// Recognized names: `process_array_keys`, `process_array_values`,
    /// `process_string`, `process_int`, `process_float`, `process_numeric`,
    /// `process_name`, `literal`, `regex`, `single_byte`, `multi_byte`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an unknown name or for two names that
    /// select different modes.
    pub fn from_flag_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = ReplaceOptions::none();
        for name in names {
            let name = name.as_ref();
            match name {
                "process_array_keys" => options.process_array_keys = true,
                "process_array_values" => options.process_array_values = true,
                "process_string" => options.process_string = true,
                "process_int" => options.process_int = true,
                "process_float" => options.process_float = true,
                "process_numeric" => {
                    options.process_int = true;
                    options.process_float = true;
                }
                "process_name" => options.process_name = true,
                "literal" => options.match_mode = pick(options.match_mode, MatchMode::Literal, MatchMode::Auto, name)?,
                "regex" => options.match_mode = pick(options.match_mode, MatchMode::Regex, MatchMode::Auto, name)?,
                "single_byte" => {
                    options.byte_mode = pick(options.byte_mode, ByteMode::SingleByte, ByteMode::Auto, name)?
                }
                "multi_byte" => options.byte_mode = pick(options.byte_mode, ByteMode::MultiByte, ByteMode::Auto, name)?,
                other => {
                    return Err(Error::invalid_argument(format!(
                        "unknown replace option \"{}\"",
                        other
                    )))
                }
            }
        }
        Ok(options)
    }

    /// Parses options from a JSON object; unknown fields are rejected.
    ///
    /// ```rust
    /// use serde_php::{MatchMode, ReplaceOptions};
    ///
    /// let options = ReplaceOptions::from_json(r#"{"process_int": true, "match_mode": "literal"}"#).unwrap();
    /// assert!(options.process_int);
    /// assert_eq!(options.match_mode, MatchMode::Literal);
    /// assert!(ReplaceOptions::from_json(r#"{"colour": "red"}"#).is_err());
    /// ```
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(Error::invalid_argument)
    }

    #[must_use]
    pub fn with_process_array_keys(mut self, on: bool) -> Self {
        self.process_array_keys = on;
        self
    }

    #[must_use]
    pub fn with_process_array_values(mut self, on: bool) -> Self {
        self.process_array_values = on;
        self
    }

    #[must_use]
    pub fn with_process_string(mut self, on: bool) -> Self {
        self.process_string = on;
        self
    }

    #[must_use]
    pub fn with_process_int(mut self, on: bool) -> Self {
        self.process_int = on;
        self
    }

    #[must_use]
    pub fn with_process_float(mut self, on: bool) -> Self {
        self.process_float = on;
        self
    }

    #[must_use]
    pub fn with_process_name(mut self, on: bool) -> Self {
        self.process_name = on;
        self
    }

    #[must_use]
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    #[must_use]
    pub fn with_byte_mode(mut self, mode: ByteMode) -> Self {
        self.byte_mode = mode;
        self
    }
}

fn pick<T: PartialEq + Copy + std::fmt::Debug>(current: T, wanted: T, auto: T, name: &str) -> Result<T> {
    if current == auto || current == wanted {
        Ok(wanted)
    } else {
        Err(Error::invalid_argument(format!(
            "replace option \"{}\" conflicts with {:?}",
            name, current
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_defaults() {
        let options = ReplaceOptions::default();
        assert!(options.process_string);
        assert!(options.process_array_values);
        assert!(!options.process_array_keys);
        assert!(!options.process_int);
        assert_eq!(options.match_mode, MatchMode::Auto);
        assert_eq!(options.byte_mode, ByteMode::SingleByte);
    }

    #[test]
    fn test_from_flag_names() {
        let options =
            ReplaceOptions::from_flag_names(["process_numeric", "regex", "multi_byte"]).unwrap();
        assert!(options.process_int && options.process_float);
        assert!(!options.process_string);
        assert_eq!(options.match_mode, MatchMode::Regex);
        assert_eq!(options.byte_mode, ByteMode::MultiByte);
    }

    #[test]
    fn test_from_flag_names_rejects_conflicts() {
        let err = ReplaceOptions::from_flag_names(["literal", "regex"]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_from_flag_names_rejects_unknown() {
        let err = ReplaceOptions::from_flag_names(["process_strings"]).unwrap_err();
        assert!(err.to_string().contains("process_strings"));
    }

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new()
            .with_max_depth(3)
            .with_identity(IdentityNumbering::AllValues);
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.identity, IdentityNumbering::AllValues);
        assert_eq!(ParseOptions::default().max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_identity_numbering() {
        assert!(IdentityNumbering::Containers.registers(&ValueKind::Array(vec![])));
        assert!(!IdentityNumbering::Containers.registers(&ValueKind::Int(1)));
        assert!(IdentityNumbering::AllValues.registers(&ValueKind::Int(1)));
        assert!(!IdentityNumbering::AllValues.registers(&ValueKind::Reference(1)));
    }
}

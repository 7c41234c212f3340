//! Pluggable capabilities the core depends on.
//!
//! Parsing, rendering and search-and-replace need a few services that are not
//! part of the format itself. Each one is a trait with a default implementation:
//!
//! | Trait | Default | Used for |
//! |-------|---------|----------|
//! | [`FloatCodec`] | [`StandardFloatCodec`] | `d:` tokens, float replacement |
//! | [`PatternEngine`] | [`RegexEngine`] | regex search terms |
//! | [`DocumentCodec`] | [`JsonCodec`] | JSON documents embedded in strings |
//! | [`Formatter`] | [`JsonFormatter`] | presenting a value tree as text |
//!
//! [`Capabilities`] bundles the first three for [`crate::Replacer`].

use crate::grammar::{INF_TOKEN, NAN_TOKEN, NEG_INF_TOKEN};
use crate::{Error, Result, Value};
use regex::bytes::{Captures, Regex, RegexBuilder};

/// Converts floats to and from their `d:` token text.
pub trait FloatCodec {
    /// Renders a float; must produce `INF`, `-INF` and `NAN` for the special values
    /// and enough digits to read back the same number.
    fn format(&self, value: f64) -> String;

    /// Reads a token back, `None` when the text is not a float token.
    fn parse(&self, token: &str) -> Option<f64>;
}

/// Shortest round-trip decimal formatting, switching to `1.5E+25` notation for
/// very large and very small magnitudes.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardFloatCodec;

impl FloatCodec for StandardFloatCodec {
    fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return NAN_TOKEN.to_string();
        }
        if value.is_infinite() {
            return if value > 0.0 { INF_TOKEN } else { NEG_INF_TOKEN }.to_string();
        }
        if value == 0.0 {
            return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
        }

        let sci = format!("{:e}", value);
        let (mantissa, exponent) = match sci.split_once('e') {
            Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
            None => return format!("{}", value),
        };
        let decimal_point = exponent + 1;
        if (-3..=15).contains(&decimal_point) {
            return format!("{}", value);
        }
        let mantissa = if mantissa.contains('.') {
            mantissa.to_string()
        } else {
            format!("{}.0", mantissa)
        };
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}E{}{}", mantissa, sign, exponent.abs())
    }

    fn parse(&self, token: &str) -> Option<f64> {
        match token {
            INF_TOKEN => return Some(f64::INFINITY),
            NEG_INF_TOKEN => return Some(f64::NEG_INFINITY),
            NAN_TOKEN => return Some(f64::NAN),
            _ => {}
        }
        let well_formed = !token.is_empty()
            && token
                .bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
            && token.bytes().any(|b| b.is_ascii_digit());
        if !well_formed {
            return None;
        }
        token.parse::<f64>().ok()
    }
}

/// A compiled search pattern.
pub trait Pattern {
    /// Replaces every match in `subject`; returns the new text and the match count.
    fn replace_all(&self, subject: &[u8], replacement: &[u8]) -> (Vec<u8>, usize);
}

/// Compiles regex search terms.
pub trait PatternEngine {
    /// Compiles `pattern`; `multibyte` selects codepoint-wise matching.
    fn compile(&self, pattern: &[u8], multibyte: bool) -> Result<Box<dyn Pattern>>;

    /// Whether codepoint-wise matching is available.
    fn supports_multibyte(&self) -> bool {
        true
    }

    /// Does `pattern` compile?
    fn is_valid(&self, pattern: &[u8]) -> bool {
        self.compile(pattern, false).is_ok()
    }
}

/// Delimited-pattern front end over the `regex` crate.
///
/// Patterns are written `/body/flags`. The delimiter is the first byte and may be
/// any non-alphanumeric, non-backslash, non-whitespace byte; `(`, `[`, `{` and `<`
/// close with their partner. Supported flags: `i m s x U u A D`.
///
/// ```rust
/// use serde_php::capability::{PatternEngine, RegexEngine};
///
/// let engine = RegexEngine;
/// assert!(engine.is_valid(b"/fo+/i"));
/// assert!(engine.is_valid(b"#a|b#"));
/// assert!(!engine.is_valid(b"foo"));
///
/// let pattern = engine.compile(b"/(\\w+)@example/", false).unwrap();
/// let (out, count) = pattern.replace_all(b"bob@example, amy@example", b"$1@test");
/// assert_eq!(out, b"bob@test, amy@test");
/// assert_eq!(count, 2);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RegexEngine;

struct CompiledRegex(Regex);

impl Pattern for CompiledRegex {
    fn replace_all(&self, subject: &[u8], replacement: &[u8]) -> (Vec<u8>, usize) {
        let template = translate_replacement(replacement);
        let mut out = Vec::with_capacity(subject.len());
        let mut last = 0;
        let mut count = 0;
        for caps in self.0.captures_iter(subject) {
            let Some(whole) = caps.get(0) else { continue };
            out.extend_from_slice(&subject[last..whole.start()]);
            expand(&caps, &template, &mut out);
            last = whole.end();
            count += 1;
        }
        out.extend_from_slice(&subject[last..]);
        (out, count)
    }
}

fn expand(caps: &Captures<'_>, template: &[u8], out: &mut Vec<u8>) {
    caps.expand(template, out);
}

impl PatternEngine for RegexEngine {
    fn compile(&self, pattern: &[u8], multibyte: bool) -> Result<Box<dyn Pattern>> {
        let (body, flags) = split_delimited(pattern).ok_or_else(|| {
            Error::invalid_argument(format!(
                "\"{}\" is not a delimited pattern",
                String::from_utf8_lossy(pattern)
            ))
        })?;
        let body = std::str::from_utf8(body)
            .map_err(|_| Error::invalid_argument("pattern body is not UTF-8"))?;

        let mut anchored = false;
        let mut builder_flags = (false, false, false, false, false, multibyte);
        for &flag in flags {
            match flag {
                b'i' => builder_flags.0 = true,
                b'm' => builder_flags.1 = true,
                b's' => builder_flags.2 = true,
                b'x' => builder_flags.3 = true,
                b'U' => builder_flags.4 = true,
                b'u' => builder_flags.5 = true,
                b'A' => anchored = true,
                // `$` already matches only at the very end without `m`
                b'D' => {}
                b'\n' | b'\r' | b' ' => {}
                other => {
                    return Err(Error::invalid_argument(format!(
                        "unknown pattern flag '{}'",
                        other as char
                    )))
                }
            }
        }

        let source = if anchored {
            format!(r"\A(?:{})", body)
        } else {
            body.to_string()
        };
        let (ci, multi_line, dot_nl, extended, swap_greed, unicode) = builder_flags;
        let regex = RegexBuilder::new(&source)
            .case_insensitive(ci)
            .multi_line(multi_line)
            .dot_matches_new_line(dot_nl)
            .ignore_whitespace(extended)
            .swap_greed(swap_greed)
            .unicode(unicode)
            .build()
            .map_err(|e| Error::invalid_argument(format!("invalid pattern: {}", e)))?;
        Ok(Box::new(CompiledRegex(regex)))
    }
}

/// Splits `/body/flags`, `None` if `pattern` is not delimited.
fn split_delimited(pattern: &[u8]) -> Option<(&[u8], &[u8])> {
    let (&open, rest) = pattern.split_first()?;
    if open.is_ascii_alphanumeric() || open == b'\\' || open.is_ascii_whitespace() || open >= 0x80 {
        return None;
    }
    let close = match open {
        b'(' => b')',
        b'[' => b']',
        b'{' => b'}',
        b'<' => b'>',
        other => other,
    };
    let end = rest.iter().rposition(|&b| b == close)?;
    Some((&rest[..end], &rest[end + 1..]))
}

/// Rewrites `$1`, `\1`, `${1}` and `${name}` group references into the `regex`
/// crate's `${..}` syntax; every other `$` is literal.
fn translate_replacement(replacement: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(replacement.len() + 8);
    let mut i = 0;
    while i < replacement.len() {
        let b = replacement[i];
        let next = replacement.get(i + 1).copied();
        match (b, next) {
            (b'$' | b'\\', Some(d)) if d.is_ascii_digit() => {
                let mut j = i + 1;
                while j < replacement.len() && j < i + 3 && replacement[j].is_ascii_digit() {
                    j += 1;
                }
                out.extend_from_slice(b"${");
                out.extend_from_slice(&replacement[i + 1..j]);
                out.push(b'}');
                i = j;
            }
            (b'$', Some(b'{')) => {
                match replacement[i..].iter().position(|&c| c == b'}') {
                    Some(end) if end > 2 && is_group_name(&replacement[i + 2..i + end]) => {
                        out.extend_from_slice(&replacement[i..=i + end]);
                        i += end + 1;
                    }
                    _ => {
                        out.extend_from_slice(b"$$");
                        i += 1;
                    }
                }
            }
            (b'$', _) => {
                out.extend_from_slice(b"$$");
                i += 1;
            }
            _ => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

// A group number, or a name the `regex` crate accepts inside `${..}`.
fn is_group_name(name: &[u8]) -> bool {
    name.iter().all(u8::is_ascii_digit)
        || (!name[0].is_ascii_digit() && name.iter().all(|&c| c.is_ascii_alphanumeric() || c == b'_'))
}

/// Decodes and encodes hierarchical text documents embedded in strings.
pub trait DocumentCodec {
    /// Decodes `text` when it is an array or object document, `None` otherwise.
    fn decode(&self, text: &[u8]) -> Option<serde_json::Value>;

    fn encode(&self, document: &serde_json::Value) -> Result<Vec<u8>>;
}

/// JSON via `serde_json`, keeping object key order.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl DocumentCodec for JsonCodec {
    fn decode(&self, text: &[u8]) -> Option<serde_json::Value> {
        let first = text.iter().find(|b| !b.is_ascii_whitespace())?;
        if *first != b'{' && *first != b'[' {
            return None;
        }
        serde_json::from_slice::<serde_json::Value>(text)
            .ok()
            .filter(|v| v.is_array() || v.is_object())
    }

    fn encode(&self, document: &serde_json::Value) -> Result<Vec<u8>> {
        serde_json::to_vec(document).map_err(Error::custom)
    }
}

/// Presents a value tree as text. Output formats live outside the core.
pub trait Formatter {
    fn format(&self, value: &Value) -> Result<String>;
}

/// Pretty-printed JSON through the [`serde::Serialize`] impl of [`Value`].
///
/// ```rust
/// use serde_php::capability::{Formatter, JsonFormatter};
/// use serde_php::parse;
///
/// let value = parse(b"a:2:{i:0;s:1:\"a\";i:1;b:1;}").unwrap();
/// let text = JsonFormatter::compact().format(&value).unwrap();
/// assert_eq!(text, r#"["a",true]"#);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    #[must_use]
    pub fn pretty() -> Self {
        JsonFormatter { pretty: true }
    }

    #[must_use]
    pub fn compact() -> Self {
        JsonFormatter { pretty: false }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        JsonFormatter::pretty()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, value: &Value) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        text.map_err(Error::custom)
    }
}

/// The capability set used by search-and-replace.
pub struct Capabilities {
    pub floats: Box<dyn FloatCodec>,
    pub patterns: Box<dyn PatternEngine>,
    pub documents: Box<dyn DocumentCodec>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            floats: Box::new(StandardFloatCodec),
            patterns: Box::new(RegexEngine),
            documents: Box::new(JsonCodec),
        }
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_format() {
        let codec = StandardFloatCodec;
        assert_eq!(codec.format(1.0), "1");
        assert_eq!(codec.format(0.1), "0.1");
        assert_eq!(codec.format(-2.5), "-2.5");
        assert_eq!(codec.format(0.0001), "0.0001");
        assert_eq!(codec.format(0.00001), "1.0E-5");
        assert_eq!(codec.format(1.5e25), "1.5E+25");
        assert_eq!(codec.format(f64::INFINITY), "INF");
        assert_eq!(codec.format(f64::NEG_INFINITY), "-INF");
        assert_eq!(codec.format(f64::NAN), "NAN");
        assert_eq!(codec.format(-0.0), "-0");
    }

    #[test]
    fn test_float_round_trip() {
        let codec = StandardFloatCodec;
        for value in [0.1, 1.0 / 3.0, 1e300, -1e-300, 123456789.125, f64::MAX, f64::MIN_POSITIVE] {
            assert_eq!(codec.parse(&codec.format(value)), Some(value));
        }
    }

    #[test]
    fn test_float_parse_rejects_words() {
        let codec = StandardFloatCodec;
        assert_eq!(codec.parse("inf"), None);
        assert_eq!(codec.parse("12abc"), None);
        assert_eq!(codec.parse(""), None);
        assert_eq!(codec.parse("-INF"), Some(f64::NEG_INFINITY));
        assert_eq!(codec.parse(".5"), Some(0.5));
        assert_eq!(codec.parse("1.0E+25"), Some(1e25));
    }

    #[test]
    fn test_split_delimited() {
        assert_eq!(split_delimited(b"/ab/i"), Some((&b"ab"[..], &b"i"[..])));
        assert_eq!(split_delimited(b"{a}b}x"), Some((&b"a}b"[..], &b"x"[..])));
        assert_eq!(split_delimited(b"abc"), None);
        assert_eq!(split_delimited(b"/unterminated"), None);
    }

    #[test]
    fn test_translate_replacement() {
        assert_eq!(translate_replacement(b"$1x"), b"${1}x");
        assert_eq!(translate_replacement(b"\\2"), b"${2}");
        assert_eq!(translate_replacement(b"${1}0"), b"${1}0");
        assert_eq!(translate_replacement(b"cost $"), b"cost $$");
        assert_eq!(translate_replacement(b"$name"), b"$$name");
        assert_eq!(translate_replacement(b"[${word}]"), b"[${word}]");
        assert_eq!(translate_replacement(b"${a-b}"), b"$${a-b}");
        assert_eq!(translate_replacement(b"${}"), b"$${}");
    }

    #[test]
    fn test_regex_flags() {
        let engine = RegexEngine;
        let pattern = engine.compile(b"/FOO/i", false).unwrap();
        assert_eq!(pattern.replace_all(b"foo Foo", b"x"), (b"x x".to_vec(), 2));

        let anchored = engine.compile(b"/a/A", false).unwrap();
        assert_eq!(anchored.replace_all(b"aba", b"x"), (b"xba".to_vec(), 1));

        assert!(engine.compile(b"/a/q", false).is_err());
        assert!(engine.compile(b"/(/", false).is_err());
    }

    #[test]
    fn test_regex_byte_modes() {
        let engine = RegexEngine;
        let subject = "é".as_bytes();
        let single = engine.compile(b"/./", false).unwrap();
        assert_eq!(single.replace_all(subject, b"x").1, 2);
        let multi = engine.compile(b"/./", true).unwrap();
        assert_eq!(multi.replace_all(subject, b"x").1, 1);
    }

    #[test]
    fn test_json_codec_only_decodes_composites() {
        let codec = JsonCodec;
        assert!(codec.decode(b"{\"a\":1}").is_some());
        assert!(codec.decode(b" [1,2]").is_some());
        assert!(codec.decode(b"\"text\"").is_none());
        assert!(codec.decode(b"42").is_none());
        assert!(codec.decode(b"{broken").is_none());
    }

    #[test]
    fn test_json_codec_keeps_key_order() {
        let codec = JsonCodec;
        let doc = codec.decode(b"{\"z\":1,\"a\":2}").unwrap();
        assert_eq!(codec.encode(&doc).unwrap(), b"{\"z\":1,\"a\":2}");
    }
}

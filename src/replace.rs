//! Deep search-and-replace.
//!
//! A [`Replacer`] walks a subject depth-first and rewrites the text it finds,
//! keeping every length field consistent. Subjects are anything implementing
//! [`Replaceable`]: parsed [`Value`] trees, session data, `serde_json` documents,
//! and plain Rust strings, numbers and collections.
//!
//! Strings are handled in priority order:
//!
//! 1. text that is itself a serialized document is parsed, replaced structurally
//!    and rendered back, only when something changed
//! 2. text that decodes as a non-empty JSON array or object is replaced inside the
//!    decoded document and re-encoded on change
//! 3. anything else is replaced as text
//!
//! ```rust
//! use serde_php::{parse, render, ReplaceOptions, Replacer};
//!
//! let mut value = parse(b"a:1:{i:0;s:6:\"foobaz\";}").unwrap();
//! let mut replacer = Replacer::new("foo", "X", ReplaceOptions::default()).unwrap();
//! assert_eq!(replacer.apply(&mut value).unwrap(), 1);
//! assert_eq!(render(&value), b"a:1:{i:0;s:4:\"Xbaz\";}");
//! ```

use crate::capability::{Capabilities, Pattern};
use crate::de::Parser;
use crate::grammar::{is_identifier, looks_serialized};
use crate::options::{ByteMode, MatchMode, ParseOptions, ReplaceOptions};
use crate::ser::render_with;
use crate::value::{CustomObject, Entry, Key, Object, SessionVariables, Value, ValueKind};
use crate::{Error, Result};
use indexmap::IndexMap;
use memchr::memmem::Finder;
use std::collections::HashMap;
use std::ops::ControlFlow;

/// Search terms or replacements: one string or several.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Terms(Vec<Vec<u8>>);

impl Terms {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Terms {
    fn from(term: &str) -> Self {
        Terms(vec![term.as_bytes().to_vec()])
    }
}

impl From<String> for Terms {
    fn from(term: String) -> Self {
        Terms(vec![term.into_bytes()])
    }
}

impl From<&[u8]> for Terms {
    fn from(term: &[u8]) -> Self {
        Terms(vec![term.to_vec()])
    }
}

impl From<Vec<u8>> for Terms {
    fn from(term: Vec<u8>) -> Self {
        Terms(vec![term])
    }
}

impl From<&[&str]> for Terms {
    fn from(terms: &[&str]) -> Self {
        Terms(terms.iter().map(|t| t.as_bytes().to_vec()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Terms {
    fn from(terms: [&str; N]) -> Self {
        Terms::from(&terms[..])
    }
}

impl From<Vec<&str>> for Terms {
    fn from(terms: Vec<&str>) -> Self {
        Terms::from(terms.as_slice())
    }
}

impl From<Vec<String>> for Terms {
    fn from(terms: Vec<String>) -> Self {
        Terms(terms.into_iter().map(String::into_bytes).collect())
    }
}

/// What kind of node a callback is looking at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    /// Arrays, sequences and maps.
    Array,
    Object,
    CustomObject,
    /// `r:` and `R:`
    BackReference,
    Session,
}

impl NodeKind {
    fn of(kind: &ValueKind) -> Self {
        match kind {
            ValueKind::Null => NodeKind::Null,
            ValueKind::Bool(_) => NodeKind::Bool,
            ValueKind::Int(_) => NodeKind::Int,
            ValueKind::Float(_) => NodeKind::Float,
            ValueKind::String(_) => NodeKind::String,
            ValueKind::Array(_) => NodeKind::Array,
            ValueKind::Object(_) => NodeKind::Object,
            ValueKind::CustomObject(_) => NodeKind::CustomObject,
            ValueKind::Recursion(_) | ValueKind::Reference(_) => NodeKind::BackReference,
        }
    }

    fn of_json(value: &serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Json::Null => NodeKind::Null,
            Json::Bool(_) => NodeKind::Bool,
            Json::Number(n) if n.is_f64() => NodeKind::Float,
            Json::Number(_) => NodeKind::Int,
            Json::String(_) => NodeKind::String,
            Json::Array(_) | Json::Object(_) => NodeKind::Array,
        }
    }
}

/// Before or after a node's processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Enter,
    Leave,
}

/// What a callback is told about the current node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visit {
    pub kind: NodeKind,
    pub phase: Phase,
    /// Replacements made so far.
    pub count: usize,
}

type Callback<'a> = Box<dyn FnMut(&Visit) -> ControlFlow<()> + 'a>;

enum Matcher {
    /// `whole_chars` rejects matches that start or end inside a UTF-8 sequence.
    Literal { finder: Finder<'static>, whole_chars: bool },
    Regex(Box<dyn Pattern>),
}

impl Matcher {
    fn replace_all(&self, subject: &[u8], replacement: &[u8]) -> (Vec<u8>, usize) {
        match self {
            Matcher::Literal { finder, whole_chars } => {
                let needle = finder.needle().len();
                let mut out = Vec::new();
                let mut last = 0;
                let mut from = 0;
                let mut count = 0;
                while let Some(found) = finder.find(&subject[from..]) {
                    let start = from + found;
                    let end = start + needle;
                    if *whole_chars && !(is_char_boundary(subject, start) && is_char_boundary(subject, end)) {
                        from = start + 1;
                        continue;
                    }
                    if count == 0 {
                        out.reserve(subject.len());
                    }
                    out.extend_from_slice(&subject[last..start]);
                    out.extend_from_slice(replacement);
                    last = end;
                    from = end;
                    count += 1;
                }
                if count > 0 {
                    out.extend_from_slice(&subject[last..]);
                }
                (out, count)
            }
            Matcher::Regex(pattern) => pattern.replace_all(subject, replacement),
        }
    }
}

/// A configured search-and-replace pass.
///
/// Match and byte modes left on `Auto` are resolved when the replacer is built:
/// regex mode is chosen when every search term compiles as a delimited pattern
/// (`/fo+/i`), literal mode otherwise.
///
/// Callbacks run when a node is entered and when it is left. Returning
/// [`ControlFlow::Break`] stops the rest of the traversal; replacements already
/// made stay in place.
///
/// ```rust
/// use serde_php::{MatchMode, NodeKind, Phase, ReplaceOptions, Replacer};
/// use std::ops::ControlFlow;
///
/// let replacer = Replacer::new("/a+/", "b", ReplaceOptions::default()).unwrap();
/// assert_eq!(replacer.options().match_mode, MatchMode::Regex);
///
/// let mut seen = 0;
/// let mut list = vec!["aa".to_string(), "xa".to_string(), "ya".to_string()];
/// let mut replacer = Replacer::new("a", "b", ReplaceOptions::default())
///     .unwrap()
///     .on(NodeKind::String, |visit| {
///         if visit.phase == Phase::Enter {
///             seen += 1;
///         }
///         if seen > 2 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
///     });
/// assert_eq!(replacer.apply(&mut list).unwrap(), 3);
/// assert!(replacer.is_stopped());
/// assert_eq!(list, ["bb", "xb", "ya"]);
/// ```
pub struct Replacer<'a> {
    matchers: Vec<(Matcher, Vec<u8>)>,
    options: ReplaceOptions,
    parse_options: ParseOptions,
    capabilities: Capabilities,
    callbacks: HashMap<NodeKind, Callback<'a>>,
    fallback: Option<Callback<'a>>,
    count: usize,
    stopped: bool,
}

impl<'a> Replacer<'a> {
    /// Builds a replacer with the default capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when there are no search terms, when regex
    /// mode is forced and a term does not compile, or when multi-byte matching is
    /// forced and the pattern engine lacks it.
    pub fn new(search: impl Into<Terms>, replace: impl Into<Terms>, options: ReplaceOptions) -> Result<Self> {
        Replacer::with_capabilities(search, replace, options, Capabilities::default())
    }

    pub fn with_capabilities(
        search: impl Into<Terms>,
        replace: impl Into<Terms>,
        mut options: ReplaceOptions,
        capabilities: Capabilities,
    ) -> Result<Self> {
        let search = search.into();
        let replace = replace.into();
        if search.is_empty() {
            return Err(Error::invalid_argument("at least one search term is required"));
        }

        let regex = match options.match_mode {
            MatchMode::Regex => true,
            MatchMode::Literal => false,
            MatchMode::Auto => search.0.iter().all(|term| capabilities.patterns.is_valid(term)),
        };
        let multibyte = match options.byte_mode {
            ByteMode::SingleByte => false,
            ByteMode::MultiByte if !capabilities.patterns.supports_multibyte() => {
                return Err(Error::invalid_argument(
                    "multi-byte matching is not supported by the pattern engine",
                ))
            }
            ByteMode::MultiByte => true,
            ByteMode::Auto => capabilities.patterns.supports_multibyte(),
        };
        tracing::debug!(regex, multibyte, terms = search.len(), "resolved replace modes");
        options.match_mode = if regex { MatchMode::Regex } else { MatchMode::Literal };
        options.byte_mode = if multibyte {
            ByteMode::MultiByte
        } else {
            ByteMode::SingleByte
        };

        let mut matchers = Vec::with_capacity(search.len());
        for (term, replacement) in pair_terms(search, replace) {
            let matcher = if regex {
                Matcher::Regex(capabilities.patterns.compile(&term, multibyte)?)
            } else if term.is_empty() {
                continue;
            } else {
                Matcher::Literal {
                    finder: Finder::new(&term).into_owned(),
                    whole_chars: multibyte,
                }
            };
            matchers.push((matcher, replacement));
        }

        Ok(Replacer {
            matchers,
            options,
            parse_options: ParseOptions::default(),
            capabilities,
            callbacks: HashMap::new(),
            fallback: None,
            count: 0,
            stopped: false,
        })
    }

    /// Options for documents found inside strings.
    ///
    /// Data written by the runtime itself may alias scalars with `R:`; those
    /// documents need [`IdentityNumbering::AllValues`](crate::IdentityNumbering::AllValues).
    #[must_use]
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Registers a callback for one node kind.
    #[must_use]
    pub fn on(mut self, kind: NodeKind, callback: impl FnMut(&Visit) -> ControlFlow<()> + 'a) -> Self {
        self.callbacks.insert(kind, Box::new(callback));
        self
    }

    /// Registers a callback for every kind without a callback of its own.
    #[must_use]
    pub fn on_any(mut self, callback: impl FnMut(&Visit) -> ControlFlow<()> + 'a) -> Self {
        self.fallback = Some(Box::new(callback));
        self
    }

    /// Options with both modes resolved.
    #[must_use]
    pub fn options(&self) -> &ReplaceOptions {
        &self.options
    }

    /// Total replacements made by this replacer.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether a callback stopped the traversal.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Clears the running count and the stop flag.
    pub fn reset(&mut self) {
        self.count = 0;
        self.stopped = false;
    }

    /// Replaces in place and returns the number of replacements made in `subject`.
    pub fn apply<T: Replaceable + ?Sized>(&mut self, subject: &mut T) -> Result<usize> {
        subject.replace_in(self)
    }

    fn notify(&mut self, kind: NodeKind, phase: Phase) -> bool {
        let visit = Visit {
            kind,
            phase,
            count: self.count,
        };
        let callback = match self.callbacks.get_mut(&kind) {
            Some(callback) => Some(callback),
            None => self.fallback.as_mut(),
        };
        if let Some(callback) = callback {
            if callback(&visit).is_break() {
                self.stopped = true;
                return false;
            }
        }
        true
    }

    // Runs `body` between the enter and leave callbacks.
    fn node(&mut self, kind: NodeKind, body: impl FnOnce(&mut Self) -> Result<usize>) -> Result<usize> {
        if self.stopped || !self.notify(kind, Phase::Enter) {
            return Ok(0);
        }
        let n = body(self)?;
        if !self.stopped {
            self.notify(kind, Phase::Leave);
        }
        Ok(n)
    }

    // Plain text replacement over every term in order. Returns the new text when
    // anything matched.
    fn replace_text(&mut self, text: &[u8]) -> (Option<Vec<u8>>, usize) {
        let mut current: Option<Vec<u8>> = None;
        let mut total = 0;
        for (matcher, replacement) in &self.matchers {
            let subject = current.as_deref().unwrap_or(text);
            let (out, n) = matcher.replace_all(subject, replacement);
            if n > 0 {
                current = Some(out);
                total += n;
            }
        }
        self.count += total;
        (current, total)
    }

    fn replace_plain(&mut self, text: &mut Vec<u8>) -> usize {
        let (new, n) = self.replace_text(text);
        if let Some(new) = new {
            *text = new;
        }
        n
    }

    // String content: embedded document, then JSON, then text.
    fn replace_bytes(&mut self, text: &mut Vec<u8>) -> Result<usize> {
        let start = text.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(text.len());
        let end = text
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(start, |i| i + 1);
        let trimmed = &text[start..end];

        if looks_serialized(trimmed) {
            tracing::trace!(len = trimmed.len(), "replacing inside embedded serialized document");
            let mut root = self.parse_embedded(trimmed).map_err(|e| Error::embedded(trimmed, e))?;
            let n = self.visit_value(&mut root)?;
            if n > 0 {
                let mut out = text[..start].to_vec();
                out.extend(render_with(&root, self.capabilities.floats.as_ref()));
                out.extend_from_slice(&text[end..]);
                *text = out;
            }
            return Ok(n);
        }

        if let Some(mut document) = self.capabilities.documents.decode(text) {
            let empty = match &document {
                serde_json::Value::Array(items) => items.is_empty(),
                serde_json::Value::Object(map) => map.is_empty(),
                _ => true,
            };
            if empty {
                return Ok(0);
            }
            tracing::trace!(len = text.len(), "replacing inside embedded JSON document");
            let n = self.visit_json(&mut document)?;
            if n > 0 {
                *text = self.capabilities.documents.encode(&document)?;
            }
            return Ok(n);
        }

        Ok(self.replace_plain(text))
    }

    fn parse_embedded(&self, text: &[u8]) -> Result<Value> {
        let mut parser = Parser::from_slice(text)
            .with_options(self.parse_options.clone())
            .with_float_codec(self.capabilities.floats.as_ref());
        let root = parser.parse_value()?;
        parser.finish()?;
        Ok(root)
    }

    fn replace_utf8(&mut self, text: &mut String) -> Result<usize> {
        let mut bytes = text.as_bytes().to_vec();
        let n = self.replace_bytes(&mut bytes)?;
        if n > 0 {
            *text = String::from_utf8(bytes)
                .map_err(|_| Error::custom("replacement produced invalid UTF-8 in a text value"))?;
        }
        Ok(n)
    }

    fn int(&mut self, value: &mut i64) -> Result<usize> {
        if !self.options.process_int {
            return Ok(0);
        }
        let (new, n) = self.replace_text(value.to_string().as_bytes());
        if let Some(new) = new {
            *value = parse_int(&new)?;
        }
        Ok(n)
    }

    fn float(&mut self, value: &mut f64) -> Result<usize> {
        if !self.options.process_float {
            return Ok(0);
        }
        let text = self.capabilities.floats.format(*value);
        let (new, n) = self.replace_text(text.as_bytes());
        if let Some(new) = new {
            *value = std::str::from_utf8(&new)
                .ok()
                .and_then(|s| self.capabilities.floats.parse(s))
                .ok_or_else(|| Error::numeric_conversion(&new, "float"))?;
        }
        Ok(n)
    }

    fn name(&mut self, name: &mut Vec<u8>) -> usize {
        if self.options.process_name {
            self.replace_plain(name)
        } else {
            0
        }
    }

    fn visit_value(&mut self, value: &mut Value) -> Result<usize> {
        let kind = NodeKind::of(value.kind());
        self.node(kind, |r| match value.payload_mut() {
            ValueKind::Null | ValueKind::Bool(_) | ValueKind::Recursion(_) | ValueKind::Reference(_) => Ok(0),
            ValueKind::Int(i) => r.int(i),
            ValueKind::Float(f) => r.float(f),
            ValueKind::String(s) if r.options.process_string => r.replace_bytes(s),
            ValueKind::String(_) => Ok(0),
            ValueKind::Array(entries) => r.entries(entries),
            ValueKind::Object(object) => r.object(object),
            ValueKind::CustomObject(CustomObject { class_name, .. }) => Ok(r.name(class_name)),
        })
    }

    // Entry keys are element names too, so either flag opens them.
    fn entries(&mut self, entries: &mut [Entry]) -> Result<usize> {
        let keys = self.options.process_array_keys || self.options.process_name;
        let values = self.options.process_array_values;
        let mut total = 0;
        for entry in entries {
            if values {
                total += self.visit_value(&mut entry.value)?;
            }
            if keys {
                total += self.visit_key(&mut entry.key)?;
            }
        }
        Ok(total)
    }

    fn object(&mut self, object: &mut Object) -> Result<usize> {
        let mut total = self.name(&mut object.class_name);
        for member in &mut object.members {
            total += self.name(&mut member.name.name);
            total += self.visit_value(&mut member.value)?;
        }
        Ok(total)
    }

    fn visit_key(&mut self, key: &mut Key) -> Result<usize> {
        let (kind, mut text) = match key {
            Key::Int(i) => (NodeKind::Int, i.to_string().into_bytes()),
            Key::String(s) => (NodeKind::String, s.clone()),
        };
        let n = self.node(kind, |r| match kind {
            NodeKind::Int if r.options.process_int => Ok(r.replace_plain(&mut text)),
            NodeKind::String if r.options.process_string => r.replace_bytes(&mut text),
            _ => Ok(0),
        })?;
        if n > 0 {
            *key = key_from_text(text);
        }
        Ok(n)
    }

    fn visit_json(&mut self, value: &mut serde_json::Value) -> Result<usize> {
        use serde_json::Value as Json;
        let kind = NodeKind::of_json(value);
        self.node(kind, |r| match value {
            Json::Null | Json::Bool(_) => Ok(0),
            Json::Number(number) => r.json_number(number),
            Json::String(s) if r.options.process_string => r.replace_utf8(s),
            Json::String(_) => Ok(0),
            Json::Array(items) => {
                if !r.options.process_array_values {
                    return Ok(0);
                }
                let mut total = 0;
                for item in items {
                    total += r.visit_json(item)?;
                }
                Ok(total)
            }
            Json::Object(map) => {
                let mut total = 0;
                if r.options.process_array_values {
                    for item in map.values_mut() {
                        total += r.visit_json(item)?;
                    }
                }
                if r.options.process_array_keys {
                    let keys: Vec<String> = map.keys().cloned().collect();
                    let (renamed, n) = r.rename_keys(keys)?;
                    if let Some(renamed) = renamed {
                        let old = std::mem::take(map);
                        map.extend(renamed.into_iter().zip(old.into_iter().map(|(_, v)| v)));
                    }
                    total += n;
                }
                Ok(total)
            }
        })
    }

    fn json_number(&mut self, number: &mut serde_json::Number) -> Result<usize> {
        if number.is_f64() {
            let mut f = number.as_f64().unwrap_or(f64::NAN);
            let n = self.float(&mut f)?;
            if n > 0 {
                *number = serde_json::Number::from_f64(f)
                    .ok_or_else(|| Error::numeric_conversion(f.to_string().as_bytes(), "JSON number"))?;
            }
            return Ok(n);
        }
        if !self.options.process_int {
            return Ok(0);
        }
        let (new, n) = self.replace_text(number.to_string().as_bytes());
        if let Some(new) = new {
            let text = std::str::from_utf8(&new).map_err(|_| Error::numeric_conversion(&new, "int"))?;
            *number = text
                .parse::<i64>()
                .map(serde_json::Number::from)
                .or_else(|_| text.parse::<u64>().map(serde_json::Number::from))
                .map_err(|_| Error::numeric_conversion(&new, "int"))?;
        }
        Ok(n)
    }

    // Replaces map keys as strings. Returns the full new key list when any changed.
    // Keys that collide after renaming collapse into one entry: the first key's
    // position with the last key's value.
    fn rename_keys(&mut self, keys: Vec<String>) -> Result<(Option<Vec<String>>, usize)> {
        let mut total = 0;
        let mut renamed = Vec::with_capacity(keys.len());
        for mut key in keys {
            total += self.node(NodeKind::String, |r| {
                if r.options.process_string {
                    r.replace_utf8(&mut key)
                } else {
                    Ok(0)
                }
            })?;
            renamed.push(key);
        }
        Ok(((total > 0).then_some(renamed), total))
    }
}

impl std::fmt::Debug for Replacer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replacer")
            .field("terms", &self.matchers.len())
            .field("options", &self.options)
            .field("parse_options", &self.parse_options)
            .field("count", &self.count)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

// A single replacement applies to every term; a short list is padded with "".
fn pair_terms(search: Terms, replace: Terms) -> Vec<(Vec<u8>, Vec<u8>)> {
    let broadcast = if replace.len() == 1 { replace.0.first().cloned() } else { None };
    search
        .0
        .into_iter()
        .enumerate()
        .map(|(i, term)| {
            let replacement = match &broadcast {
                Some(r) => r.clone(),
                None => replace.0.get(i).cloned().unwrap_or_default(),
            };
            (term, replacement)
        })
        .collect()
}

// True at either end of the subject and before any byte that does not continue a
// multi-byte sequence.
fn is_char_boundary(subject: &[u8], at: usize) -> bool {
    subject.get(at).map_or(true, |&b| (b as i8) >= -0x40)
}

fn parse_int(text: &[u8]) -> Result<i64> {
    std::str::from_utf8(text)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| Error::numeric_conversion(text, "int"))
}

// Canonical decimal integers become int keys, everything else stays a string key.
fn key_from_text(text: Vec<u8>) -> Key {
    let canonical = match text.as_slice() {
        b"0" => true,
        [b'-', first, rest @ ..] | [first, rest @ ..] if first.is_ascii_digit() => {
            *first != b'0' && rest.iter().all(u8::is_ascii_digit)
        }
        _ => false,
    };
    if canonical {
        if let Ok(i) = parse_int(&text) {
            return Key::Int(i);
        }
    }
    Key::String(text)
}

/// Something search-and-replace can walk.
pub trait Replaceable {
    /// Replaces in place, returning the number of replacements made.
    fn replace_in(&mut self, replacer: &mut Replacer<'_>) -> Result<usize>;
}

impl Replaceable for Value {
    fn replace_in(&mut self, replacer: &mut Replacer<'_>) -> Result<usize> {
        let n = replacer.visit_value(self)?;
        if n > 0 {
            self.clear_offsets();
        }
        Ok(n)
    }
}

impl Replaceable for SessionVariables {
    fn replace_in(&mut self, replacer: &mut Replacer<'_>) -> Result<usize> {
        replacer.node(NodeKind::Session, |r| {
            let mut total = 0;
            for (name, value) in self.entries_mut() {
                let renamed = r.name(name);
                if renamed > 0 && !is_identifier(name) {
                    return Err(Error::invalid_argument(format!(
                        "replacement produced invalid session variable name \"{}\"",
                        String::from_utf8_lossy(name)
                    )));
                }
                total += renamed + value.replace_in(r)?;
            }
            Ok(total)
        })
    }
}

impl Replaceable for serde_json::Value {
    fn replace_in(&mut self, replacer: &mut Replacer<'_>) -> Result<usize> {
        replacer.visit_json(self)
    }
}

impl Replaceable for String {
    fn replace_in(&mut self, replacer: &mut Replacer<'_>) -> Result<usize> {
        replacer.node(NodeKind::String, |r| {
            if r.options.process_string {
                r.replace_utf8(self)
            } else {
                Ok(0)
            }
        })
    }
}

impl Replaceable for Vec<u8> {
    fn replace_in(&mut self, replacer: &mut Replacer<'_>) -> Result<usize> {
        replacer.node(NodeKind::String, |r| {
            if r.options.process_string {
                r.replace_bytes(self)
            } else {
                Ok(0)
            }
        })
    }
}

impl Replaceable for i64 {
    fn replace_in(&mut self, replacer: &mut Replacer<'_>) -> Result<usize> {
        replacer.node(NodeKind::Int, |r| r.int(self))
    }
}

impl Replaceable for f64 {
    fn replace_in(&mut self, replacer: &mut Replacer<'_>) -> Result<usize> {
        replacer.node(NodeKind::Float, |r| r.float(self))
    }
}

impl Replaceable for bool {
    fn replace_in(&mut self, replacer: &mut Replacer<'_>) -> Result<usize> {
        replacer.node(NodeKind::Bool, |_| Ok(0))
    }
}

impl<T: Replaceable> Replaceable for Option<T> {
    fn replace_in(&mut self, replacer: &mut Replacer<'_>) -> Result<usize> {
        match self {
            Some(inner) => inner.replace_in(replacer),
            None => replacer.node(NodeKind::Null, |_| Ok(0)),
        }
    }
}

impl<T: Replaceable> Replaceable for Vec<T> {
    fn replace_in(&mut self, replacer: &mut Replacer<'_>) -> Result<usize> {
        replacer.node(NodeKind::Array, |r| {
            if !r.options.process_array_values {
                return Ok(0);
            }
            let mut total = 0;
            for item in self.iter_mut() {
                total += item.replace_in(r)?;
            }
            Ok(total)
        })
    }
}

impl<T: Replaceable> Replaceable for IndexMap<String, T> {
    fn replace_in(&mut self, replacer: &mut Replacer<'_>) -> Result<usize> {
        replacer.node(NodeKind::Array, |r| {
            let mut total = 0;
            if r.options.process_array_values {
                for item in self.values_mut() {
                    total += item.replace_in(r)?;
                }
            }
            if r.options.process_array_keys {
                let keys: Vec<String> = self.keys().cloned().collect();
                let (renamed, n) = r.rename_keys(keys)?;
                if let Some(renamed) = renamed {
                    let old = std::mem::take(self);
                    self.extend(renamed.into_iter().zip(old.into_values()));
                }
                total += n;
            }
            Ok(total)
        })
    }
}

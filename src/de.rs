//! Parsing serialized bytes.
//!
//! This module provides the recursive-descent [`Parser`] that turns serialized
//! bytes into a [`Value`] tree, and the serde [`Deserializer`](serde::Deserializer)
//! that reads Rust data back out of a parsed tree.
//!
//! ## Overview
//!
//! - **Single pass**: the parser reads forward through a [`ByteCursor`], peeking at
//!   most one byte before committing
//! - **Exact diagnostics**: every grammar violation reports the offset of the byte
//!   that broke the rule, with a short excerpt of the input
//! - **Identity table**: containers are registered before their children, so
//!   `r:`/`R:` back-references resolve without re-descending into cycles
//! - **Streaming**: any [`io::Read`] source can be parsed with bounded buffering
//!
//! ## Usage
//!
//! ```rust
//! use serde_php::{parse, ValueKind};
//!
//! let value = parse(b"a:1:{i:0;r:1;}").unwrap();
//! let entries = value.as_array().unwrap();
//! assert!(matches!(entries[0].value.kind(), ValueKind::Recursion(1)));
//!
//! let err = parse(b"a:2:{i:0;N;}").unwrap_err();
//! assert_eq!(err.offset(), Some(11));
//! ```

use crate::capability::{FloatCodec, StandardFloatCodec};
use crate::cursor::ByteCursor;
use crate::grammar::{
    CLOSE, DELIMITER, OPEN, QUOTE, TAG_ARRAY, TAG_BOOL, TAG_CUSTOM, TAG_ESCAPED_STRING, TAG_FLOAT,
    TAG_INT, TAG_NULL, TAG_OBJECT, TAG_RECURSION, TAG_REFERENCE, TAG_STRING, TERMINATOR,
};
use crate::options::ParseOptions;
use crate::value::{
    is_list, CustomObject, Document, Entry, IdentitySlot, Key, Member, MemberName, Object, Value,
    ValueKind,
};
use crate::{Error, Result};
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;
use std::io::{self, Read};

static STANDARD_FLOATS: StandardFloatCodec = StandardFloatCodec;

/// Recursive-descent parser over a [`ByteCursor`].
///
/// One parser may read several consecutive values (session data does this); they
/// all share the same identity table.
pub struct Parser<'f, R> {
    cursor: ByteCursor<R>,
    options: ParseOptions,
    floats: &'f dyn FloatCodec,
    identities: Vec<IdentitySlot>,
    // child indices from the current root to the value being parsed
    path: Vec<usize>,
    depth: usize,
}

impl<'a> Parser<'static, &'a [u8]> {
    #[must_use]
    pub fn from_slice(input: &'a [u8]) -> Self {
        Parser::new(input)
    }
}

impl<R: Read> Parser<'static, R> {
    pub fn new(source: R) -> Self {
        Parser {
            cursor: ByteCursor::new(source),
            options: ParseOptions::default(),
            floats: &STANDARD_FLOATS,
            identities: Vec::new(),
            path: Vec::new(),
            depth: 0,
        }
    }
}

impl<'f, R: Read> Parser<'f, R> {
    #[must_use]
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the codec used to read `d:` tokens.
    pub fn with_float_codec<'g>(self, floats: &'g dyn FloatCodec) -> Parser<'g, R> {
        Parser {
            cursor: self.cursor,
            options: self.options,
            floats,
            identities: self.identities,
            path: self.path,
            depth: self.depth,
        }
    }

    /// Offset of the next unread byte.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn at_end(&mut self) -> Result<bool> {
        self.cursor.at_end()
    }

    /// The identity table built so far.
    #[must_use]
    pub fn identities(&self) -> &[IdentitySlot] {
        &self.identities
    }

    pub(crate) fn cursor_mut(&mut self) -> &mut ByteCursor<R> {
        &mut self.cursor
    }

    /// Parses one complete value.
    pub fn parse_value(&mut self) -> Result<Value> {
        self.value()
    }

    /// Parses one value that is the `index`-th entry of a flat top-level sequence.
    ///
    /// Identity paths of values registered under it start with `index`.
    pub(crate) fn parse_value_at(&mut self, index: usize) -> Result<Value> {
        self.path.push(index);
        let value = self.value();
        self.path.pop();
        value
    }

    /// Fails unless the input is exhausted, then hands back the identity table.
    pub fn finish(mut self) -> Result<Vec<IdentitySlot>> {
        if !self.cursor.at_end()? {
            let at = self.cursor.position();
            return Err(self.cursor.error_at(at, "Unexpected trailing data after value"));
        }
        Ok(self.identities)
    }

    fn value(&mut self) -> Result<Value> {
        let offset = self.cursor.position();
        let tag = match self.cursor.peek()? {
            Some(tag) => tag,
            None => return Err(self.cursor.error_at(offset, "Unexpected end of input, expected a value")),
        };

        if self.options.identity.registers_tag(tag) {
            self.identities.push(IdentitySlot {
                offset,
                path: self.path.clone(),
            });
        }

        match tag {
            TAG_NULL => {
                self.cursor.advance(1)?;
                self.expect(TERMINATOR)?;
                Ok(Value::at(ValueKind::Null, offset))
            }
            TAG_BOOL => {
                self.header(tag)?;
                let at = self.cursor.position();
                let b = match self.cursor.peek()? {
                    Some(b'0') => false,
                    Some(b'1') => true,
                    _ => return Err(self.cursor.error_at(at, "Expected boolean '0' or '1'")),
                };
                self.cursor.advance(1)?;
                self.expect(TERMINATOR)?;
                Ok(Value::at(ValueKind::Bool(b), offset))
            }
            TAG_INT => {
                self.header(tag)?;
                let i = self.integer()?;
                self.expect(TERMINATOR)?;
                Ok(Value::at(ValueKind::Int(i), offset))
            }
            TAG_FLOAT => {
                self.header(tag)?;
                let f = self.float()?;
                self.expect(TERMINATOR)?;
                Ok(Value::at(ValueKind::Float(f), offset))
            }
            TAG_STRING | TAG_ESCAPED_STRING => {
                let s = self.string_body(tag)?;
                Ok(Value::at(ValueKind::String(s), offset))
            }
            TAG_ARRAY => self.nested(offset, |p| {
                p.header(TAG_ARRAY)?;
                let entries = p.entries()?;
                Ok(ValueKind::Array(entries))
            }),
            TAG_OBJECT => self.nested(offset, |p| {
                p.header(TAG_OBJECT)?;
                let class_name = p.class_name()?;
                let members = p.members()?;
                Ok(ValueKind::Object(Object { class_name, members }))
            }),
            TAG_CUSTOM => self.nested(offset, |p| {
                p.header(TAG_CUSTOM)?;
                let class_name = p.class_name()?;
                let len = p.length()?;
                p.expect(DELIMITER)?;
                p.expect(OPEN)?;
                let data = p.cursor.read(len)?;
                p.expect(CLOSE)?;
                Ok(ValueKind::CustomObject(CustomObject { class_name, data }))
            }),
            TAG_RECURSION | TAG_REFERENCE => {
                self.header(tag)?;
                let index = self.back_reference()?;
                self.expect(TERMINATOR)?;
                let kind = if tag == TAG_RECURSION {
                    ValueKind::Recursion(index)
                } else {
                    ValueKind::Reference(index)
                };
                Ok(Value::at(kind, offset))
            }
            other => Err(self.cursor.error_at(
                offset,
                format!("Unknown type tag '{}'", printable(other)),
            )),
        }
    }

    // Depth-limited container parse.
    fn nested(&mut self, offset: usize, body: impl FnOnce(&mut Self) -> Result<ValueKind>) -> Result<Value> {
        if self.depth >= self.options.max_depth {
            return Err(self.cursor.error_at(
                offset,
                format!("Nesting exceeds the maximum depth of {}", self.options.max_depth),
            ));
        }
        self.depth += 1;
        let kind = body(self);
        self.depth -= 1;
        Ok(Value::at(kind?, offset))
    }

    // Consumes `tag` and the following ':'.
    fn header(&mut self, tag: u8) -> Result<()> {
        self.expect(tag)?;
        self.expect(DELIMITER)
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        let at = self.cursor.position();
        match self.cursor.peek()? {
            Some(b) if b == expected => self.cursor.advance(1),
            Some(b) => Err(self.cursor.error_at(
                at,
                format!("Expected '{}' but found '{}'", printable(expected), printable(b)),
            )),
            None => Err(self.cursor.error_at(
                at,
                format!("Unexpected end of input, expected '{}'", printable(expected)),
            )),
        }
    }

    fn digits(&mut self, what: &str) -> Result<(usize, Vec<u8>)> {
        let at = self.cursor.position();
        let digits = self.cursor.read_while(|b| b.is_ascii_digit())?;
        if digits.is_empty() {
            return Err(self.cursor.error_at(at, format!("Expected digits for {}", what)));
        }
        Ok((at, digits))
    }

    // Length and count fields.
    fn length(&mut self) -> Result<usize> {
        let (at, digits) = self.digits("length")?;
        ascii(&digits)
            .parse::<usize>()
            .map_err(|_| self.cursor.error_at(at, "Length field out of range"))
    }

    fn integer(&mut self) -> Result<i64> {
        let at = self.cursor.position();
        let mut text = Vec::new();
        if let Some(sign @ (b'+' | b'-')) = self.cursor.peek()? {
            self.cursor.advance(1)?;
            text.push(sign);
        }
        let (_, digits) = self.digits("integer")?;
        text.extend_from_slice(&digits);
        ascii(&text)
            .parse::<i64>()
            .map_err(|_| self.cursor.error_at(at, format!("Integer {} out of range", ascii(&text))))
    }

    fn float(&mut self) -> Result<f64> {
        let at = self.cursor.position();
        let token = self
            .cursor
            .read_while(|b| b.is_ascii_digit() || b"+-.eEINFA".contains(&b))?;
        if token.is_empty() {
            return Err(self.cursor.error_at(at, "Expected a float token"));
        }
        let text = ascii(&token);
        self.floats
            .parse(text)
            .ok_or_else(|| self.cursor.error_at(at, format!("Invalid float token \"{}\"", text)))
    }

    fn back_reference(&mut self) -> Result<usize> {
        let (at, digits) = self.digits("back-reference index")?;
        let index = ascii(&digits).parse::<usize>().unwrap_or(usize::MAX);
        if index == 0 || index > self.identities.len() {
            return Err(self.cursor.error_at(
                at,
                format!(
                    "Back-reference {} does not resolve ({} identity slot(s) so far)",
                    ascii(&digits),
                    self.identities.len()
                ),
            ));
        }
        Ok(index)
    }

    // `s:len:"bytes";` or the escaped `S:` form, tag included.
    fn string_body(&mut self, tag: u8) -> Result<Vec<u8>> {
        self.header(tag)?;
        let len = self.length()?;
        self.expect(DELIMITER)?;
        self.expect(QUOTE)?;
        let bytes = if tag == TAG_ESCAPED_STRING {
            self.escaped(len)?
        } else {
            self.cursor.read(len)?
        };
        self.expect(QUOTE)?;
        self.expect(TERMINATOR)?;
        Ok(bytes)
    }

    // `len` decoded bytes, `\xx` escapes counting as one.
    fn escaped(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(len);
        while out.len() < len {
            let at = self.cursor.position();
            let b = self.cursor.read_byte()?;
            if b != b'\\' {
                out.push(b);
                continue;
            }
            let hex = self.cursor.read(2)?;
            let decoded = std::str::from_utf8(&hex)
                .ok()
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| self.cursor.error_at(at, "Invalid \\xx escape in escaped string"))?;
            out.push(decoded);
        }
        Ok(out)
    }

    // `len:"name":`
    fn class_name(&mut self) -> Result<Vec<u8>> {
        let len = self.length()?;
        self.expect(DELIMITER)?;
        self.expect(QUOTE)?;
        let name = self.cursor.read(len)?;
        self.expect(QUOTE)?;
        self.expect(DELIMITER)?;
        Ok(name)
    }

    fn key(&mut self) -> Result<Key> {
        let at = self.cursor.position();
        match self.cursor.peek()? {
            Some(TAG_INT) => {
                self.header(TAG_INT)?;
                let i = self.integer()?;
                self.expect(TERMINATOR)?;
                Ok(Key::Int(i))
            }
            Some(tag @ (TAG_STRING | TAG_ESCAPED_STRING)) => Ok(Key::String(self.string_body(tag)?)),
            Some(other) => Err(self.cursor.error_at(
                at,
                format!("Array key must be int or string, found tag '{}'", printable(other)),
            )),
            None => Err(self.cursor.error_at(at, "Unexpected end of input, expected an array key")),
        }
    }

    // `count:{` pairs `}`; `item` reads one pair.
    fn counted<T>(&mut self, what: &str, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.length()?;
        self.expect(DELIMITER)?;
        self.expect(OPEN)?;
        let mut items = Vec::with_capacity(count.min(1024));
        for index in 0..count {
            let at = self.cursor.position();
            if self.cursor.peek()? == Some(CLOSE) {
                return Err(self.cursor.error_at(
                    at,
                    format!("{} declares {} element(s) but only {} found", what, count, index),
                ));
            }
            self.path.push(index);
            let parsed = item(self);
            self.path.pop();
            items.push(parsed?);
        }
        let at = self.cursor.position();
        match self.cursor.peek()? {
            Some(CLOSE) => self.cursor.advance(1)?,
            Some(_) => {
                return Err(self.cursor.error_at(
                    at,
                    format!("{} declares {} element(s) but has more", what, count),
                ))
            }
            None => return Err(self.cursor.error_at(at, "Unexpected end of input, expected '}'")),
        }
        Ok(items)
    }

    fn entries(&mut self) -> Result<Vec<Entry>> {
        self.counted("Array", |p| {
            let key = p.key()?;
            let value = p.value()?;
            Ok(Entry { key, value })
        })
    }

    fn members(&mut self) -> Result<Vec<Member>> {
        self.counted("Object", |p| {
            let at = p.cursor.position();
            let raw = match p.cursor.peek()? {
                Some(tag @ (TAG_STRING | TAG_ESCAPED_STRING)) => p.string_body(tag)?,
                _ => return Err(p.cursor.error_at(at, "Object member name must be a string")),
            };
            let value = p.value()?;
            Ok(Member {
                name: MemberName::from_raw(&raw),
                value,
            })
        })
    }
}

fn ascii(bytes: &[u8]) -> &str {
    // callers only pass bytes filtered to ASCII
    std::str::from_utf8(bytes).unwrap_or_default()
}

fn printable(b: u8) -> String {
    match b {
        0x20..=0x7e => (b as char).to_string(),
        _ => format!("\\x{:02x}", b),
    }
}

/// Parses a complete document.
///
/// # Errors
///
/// Returns [`Error::Parse`] for any grammar violation, including bytes left over
/// after the top-level value.
///
/// # Examples
///
/// ```rust
/// use serde_php::parse;
///
/// let value = parse(b"s:5:\"hello\";").unwrap();
/// assert_eq!(value.as_str(), Some("hello"));
/// assert!(parse(b"N;N;").is_err());
/// ```
pub fn parse(input: &[u8]) -> Result<Value> {
    parse_with_options(input, &ParseOptions::default())
}

pub fn parse_with_options(input: &[u8], options: &ParseOptions) -> Result<Value> {
    parse_document_with_options(input, options).map(Document::into_value)
}

/// Parses a complete document and keeps its identity table.
pub fn parse_document(input: &[u8]) -> Result<Document> {
    parse_document_with_options(input, &ParseOptions::default())
}

pub fn parse_document_with_options(input: &[u8], options: &ParseOptions) -> Result<Document> {
    read_document(Parser::from_slice(input).with_options(options.clone()))
}

/// Parses a complete document from a byte stream.
///
/// ```rust
/// use serde_php::parse_reader;
/// use std::io::Cursor;
///
/// let value = parse_reader(Cursor::new(b"i:7;".to_vec())).unwrap();
/// assert_eq!(value.as_i64(), Some(7));
/// ```
pub fn parse_reader<R: io::Read>(reader: R) -> Result<Value> {
    read_document(Parser::new(reader)).map(Document::into_value)
}

fn read_document<R: Read>(mut parser: Parser<'_, R>) -> Result<Document> {
    let root = parser.parse_value()?;
    let identities = parser.finish()?;
    Ok(Document { root, identities })
}

/// Parses a document, returning a null value instead of an error.
///
/// The failure is reported as a `tracing` warning.
///
/// ```rust
/// use serde_php::parse_or_null;
///
/// assert!(parse_or_null(b"i:1").is_null());
/// assert_eq!(parse_or_null(b"i:1;").as_i64(), Some(1));
/// ```
#[must_use]
pub fn parse_or_null(input: &[u8]) -> Value {
    match parse(input) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(offset = err.offset(), error = %err, "failed to parse serialized data");
            Value::null()
        }
    }
}

/// Deserializes Rust data from a parsed [`Value`].
///
/// Arrays keyed `0..n` are visited as sequences, other arrays and objects as maps.
/// Back-references cannot be represented and are rejected.
///
/// ```rust
/// use serde::Deserialize;
/// use serde_php::{from_value, parse};
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// let value = parse(b"O:5:\"Point\":2:{s:1:\"x\";i:1;s:1:\"y\";i:2;}").unwrap();
/// let point: Point = from_value(value).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
pub fn from_value<T: de::DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(ValueDeserializer::new(value))
}

/// Parses a document and deserializes Rust data from it.
pub fn from_slice<T: de::DeserializeOwned>(input: &[u8]) -> Result<T> {
    from_value(parse(input)?)
}

/// Parses a document from a reader and deserializes Rust data from it.
pub fn from_reader<R: io::Read, T: de::DeserializeOwned>(reader: R) -> Result<T> {
    from_value(parse_reader(reader)?)
}

/// serde [`Deserializer`](de::Deserializer) over an owned [`Value`].
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

fn visit_bytes<'de, V: de::Visitor<'de>>(bytes: Vec<u8>, visitor: V) -> Result<V::Value> {
    match String::from_utf8(bytes) {
        Ok(s) => visitor.visit_string(s),
        Err(e) => visitor.visit_byte_buf(e.into_bytes()),
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value.into_kind() {
            ValueKind::Null => visitor.visit_unit(),
            ValueKind::Bool(b) => visitor.visit_bool(b),
            ValueKind::Int(i) => visitor.visit_i64(i),
            ValueKind::Float(f) => visitor.visit_f64(f),
            ValueKind::String(s) => visit_bytes(s, visitor),
            ValueKind::Array(entries) => {
                if is_list(&entries) {
                    let values: Vec<Value> = entries.into_iter().map(|e| e.value).collect();
                    visitor.visit_seq(SeqDeserializer::new(values))
                } else {
                    let pairs = entries.into_iter().map(|e| (Value::from(e.key), e.value)).collect();
                    visitor.visit_map(MapDeserializer::new(pairs))
                }
            }
            ValueKind::Object(object) => {
                let pairs = object
                    .members
                    .into_iter()
                    .map(|m| (Value::from(m.name.name), m.value))
                    .collect();
                visitor.visit_map(MapDeserializer::new(pairs))
            }
            ValueKind::CustomObject(custom) => {
                let pairs = vec![
                    (Value::from("class"), Value::from(custom.class_name)),
                    (Value::from("data"), Value::from(custom.data)),
                ];
                visitor.visit_map(MapDeserializer::new(pairs))
            }
            ValueKind::Recursion(i) | ValueKind::Reference(i) => Err(Error::custom(format!(
                "back-reference {} cannot be deserialized",
                i
            ))),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.value.is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value.into_kind() {
            ValueKind::String(variant) => {
                let variant = String::from_utf8(variant).map_err(Error::custom)?;
                visitor.visit_enum(variant.into_deserializer())
            }
            ValueKind::Array(mut entries) if entries.len() == 1 => {
                let Entry { key, value } = entries.remove(0);
                match key {
                    Key::String(variant) => {
                        let variant = String::from_utf8(variant).map_err(Error::custom)?;
                        visitor.visit_enum(EnumDeserializer { variant, value })
                    }
                    Key::Int(_) => Err(Error::custom("Expected a string enum variant key")),
                }
            }
            other => Err(Error::custom(format!("Expected enum, found {}", other.type_name()))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(values: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: values.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: std::vec::IntoIter<(Value, Value)>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(pairs: Vec<(Value, Value)>) -> Self {
        MapDeserializer {
            iter: pairs.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(KeyDeserializer(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::invariant("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

// Integer keys also satisfy string-keyed maps and struct fields.
struct KeyDeserializer(Value);

impl<'de> de::Deserializer<'de> for KeyDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_any(ValueDeserializer::new(self.0), visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.0.into_kind() {
            ValueKind::Int(i) => visitor.visit_string(i.to_string()),
            other => de::Deserializer::deserialize_any(ValueDeserializer::new(Value::new(other)), visitor),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum ignored_any
    }
}

struct EnumDeserializer {
    variant: String,
    value: Value,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(de::value::StringDeserializer::<Error>::new(self.variant))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Value,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        if self.value.is_null() {
            Ok(())
        } else {
            Err(Error::custom("Expected unit variant"))
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(ValueDeserializer::new(self.value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_any(ValueDeserializer::new(self.value), visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_any(ValueDeserializer::new(self.value), visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::IdentityNumbering;
    use crate::value::Visibility;

    #[test]
    fn test_scalars() {
        assert!(parse(b"N;").unwrap().is_null());
        assert_eq!(parse(b"b:1;").unwrap().as_bool(), Some(true));
        assert_eq!(parse(b"i:-42;").unwrap().as_i64(), Some(-42));
        assert_eq!(parse(b"i:+7;").unwrap().as_i64(), Some(7));
        assert_eq!(parse(b"d:0.5;").unwrap().as_f64(), Some(0.5));
        assert_eq!(parse(b"s:0:\"\";").unwrap().as_bytes(), Some(&b""[..]));
    }

    #[test]
    fn test_leading_zeros_collapse() {
        assert_eq!(parse(b"i:007;").unwrap().as_i64(), Some(7));
        assert_eq!(parse(b"i:000;").unwrap().as_i64(), Some(0));
        assert!(parse(b"i:;").is_err());
        assert!(parse(b"i:-;").is_err());
    }

    #[test]
    fn test_integer_out_of_range() {
        assert_eq!(parse(b"i:9223372036854775807;").unwrap().as_i64(), Some(i64::MAX));
        let err = parse(b"i:9223372036854775808;").unwrap_err();
        assert_eq!(err.offset(), Some(2));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_special_floats() {
        assert_eq!(parse(b"d:INF;").unwrap().as_f64(), Some(f64::INFINITY));
        assert_eq!(parse(b"d:-INF;").unwrap().as_f64(), Some(f64::NEG_INFINITY));
        assert!(parse(b"d:NAN;").unwrap().as_f64().unwrap().is_nan());
        assert_eq!(parse(b"d:1.0E+25;").unwrap().as_f64(), Some(1e25));
        assert!(parse(b"d:abc;").is_err());
    }

    #[test]
    fn test_bool_rejects_other_digits() {
        let err = parse(b"b:2;").unwrap_err();
        assert_eq!(err.offset(), Some(2));
    }

    #[test]
    fn test_null_has_no_delimiter() {
        let err = parse(b"N:;").unwrap_err();
        assert_eq!(err.offset(), Some(1));
    }

    #[test]
    fn test_string_counts_bytes() {
        let value = parse("s:2:\"é\";".as_bytes()).unwrap();
        assert_eq!(value.as_str(), Some("é"));
        let err = parse("s:1:\"é\";".as_bytes()).unwrap_err();
        assert_eq!(err.offset(), Some(6));
    }

    #[test]
    fn test_string_keeps_quotes_and_binary() {
        let value = parse(b"s:5:\"a\"b\0;\";").unwrap();
        assert_eq!(value.as_bytes(), Some(&b"a\"b\0;"[..]));
    }

    #[test]
    fn test_escaped_string() {
        let value = parse(b"S:3:\"a\\00b\";").unwrap();
        assert_eq!(value.as_bytes(), Some(&b"a\0b"[..]));
        assert!(parse(b"S:1:\"\\zz\";").is_err());
    }

    #[test]
    fn test_array_keys_and_duplicates() {
        let value = parse(b"a:3:{i:0;s:1:\"a\";s:1:\"k\";b:0;i:0;N;}").unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].key, Key::String(b"k".to_vec()));
        assert_eq!(entries[2].key, Key::Int(0));
    }

    #[test]
    fn test_array_key_must_be_int_or_string() {
        let err = parse(b"a:1:{b:1;N;}").unwrap_err();
        assert_eq!(err.offset(), Some(5));
    }

    #[test]
    fn test_count_mismatch_offsets() {
        // too few: the closing brace shows up where element 2 should start
        assert_eq!(parse(b"a:2:{i:0;N;}").unwrap_err().offset(), Some(11));
        // too many: the brace is missing where it should close
        assert_eq!(parse(b"a:1:{i:0;N;i:1;N;}").unwrap_err().offset(), Some(11));
    }

    #[test]
    fn test_object_members() {
        let value = parse(b"O:3:\"Foo\":2:{s:1:\"a\";i:1;s:8:\"\0Foo\0bar\";N;}").unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.class_name, b"Foo");
        assert_eq!(object.members[1].name.name, b"bar");
        assert_eq!(object.members[1].name.visibility, Visibility::Private(b"Foo".to_vec()));
    }

    #[test]
    fn test_object_member_name_must_be_string() {
        let err = parse(b"O:3:\"Foo\":1:{i:0;N;}").unwrap_err();
        assert_eq!(err.offset(), Some(13));
    }

    #[test]
    fn test_custom_object_is_opaque() {
        let value = parse(b"C:3:\"Foo\":5:{a:1:{}").unwrap();
        let custom = value.as_custom().unwrap();
        assert_eq!(custom.class_name, b"Foo");
        assert_eq!(custom.data, b"a:1:{");
    }

    #[test]
    fn test_self_recursion() {
        let doc = parse_document(b"a:1:{i:0;r:1;}").unwrap();
        let entries = doc.root.as_array().unwrap();
        assert!(matches!(entries[0].value.kind(), ValueKind::Recursion(1)));
        assert_eq!(doc.identities().len(), 1);
        assert_eq!(doc.resolve(1), Some(&doc.root));
    }

    #[test]
    fn test_forward_reference_rejected() {
        let err = parse(b"a:1:{i:0;r:2;}").unwrap_err();
        assert_eq!(err.offset(), Some(11));
        assert!(parse(b"r:0;").is_err());
        assert!(parse(b"R:1;").is_err());
    }

    #[test]
    fn test_all_values_numbering() {
        let input = b"a:2:{i:0;i:5;i:1;R:2;}";
        assert!(parse(input).is_err());
        let options = ParseOptions::new().with_identity(IdentityNumbering::AllValues);
        let doc = parse_document_with_options(input, &options).unwrap();
        assert_eq!(doc.resolve(2).and_then(Value::as_i64), Some(5));
    }

    #[test]
    fn test_identity_paths() {
        let doc = parse_document(b"a:2:{i:0;N;i:1;a:0:{}}").unwrap();
        assert_eq!(doc.identities()[1].path, vec![1]);
        assert_eq!(doc.identities()[1].offset, 15);
    }

    #[test]
    fn test_trailing_bytes() {
        let err = parse(b"N; ").unwrap_err();
        assert_eq!(err.offset(), Some(2));
    }

    #[test]
    fn test_unknown_tag() {
        let err = parse(b"x:1;").unwrap_err();
        assert_eq!(err.offset(), Some(0));
        assert!(parse(b"").is_err());
    }

    #[test]
    fn test_max_depth() {
        let options = ParseOptions::new().with_max_depth(2);
        assert!(parse_with_options(b"a:1:{i:0;a:0:{}}", &options).is_ok());
        let err = parse_with_options(b"a:1:{i:0;a:1:{i:0;a:0:{}}}", &options).unwrap_err();
        assert_eq!(err.offset(), Some(18));
    }

    #[test]
    fn test_offsets_recorded() {
        let value = parse(b"a:1:{i:0;s:1:\"x\";}").unwrap();
        assert_eq!(value.offset(), Some(0));
        assert_eq!(value.as_array().unwrap()[0].value.offset(), Some(9));
    }

    #[test]
    fn test_parse_or_null() {
        assert!(parse_or_null(b"garbage").is_null());
        assert_eq!(parse_or_null(b"b:0;").as_bool(), Some(false));
    }

    #[test]
    fn test_from_value_collections() {
        let list: Vec<i64> = from_slice(b"a:2:{i:0;i:1;i:1;i:2;}").unwrap();
        assert_eq!(list, vec![1, 2]);

        let map: std::collections::BTreeMap<String, bool> =
            from_slice(b"a:2:{i:5;b:1;s:1:\"k\";b:0;}").unwrap();
        assert_eq!(map.get("5"), Some(&true));
        assert_eq!(map.get("k"), Some(&false));

        let none: Option<i32> = from_slice(b"N;").unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_from_value_rejects_back_references() {
        let result: Result<Vec<Vec<i32>>> = from_slice(b"a:1:{i:0;r:1;}");
        assert!(result.is_err());
    }

    #[test]
    fn test_map_value_without_key_is_invariant_violation() {
        use serde::de::MapAccess;
        let mut access = MapDeserializer::new(vec![]);
        let result = access.next_value::<i32>();
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }
}

//! In-memory representation of serialized data.
//!
//! This module provides [`Value`], the parsed form of one serialized document, and
//! the payload types it is built from.
//!
//! ## Core Types
//!
//! - [`Value`]: a [`ValueKind`] plus the byte offset it was parsed from
//! - [`Key`]: an array key, integer or byte string
//! - [`Object`] / [`Member`] / [`MemberName`]: class instances with visibility-encoded member names
//! - [`CustomObject`]: an opaque payload tagged with a class name
//! - [`Document`]: a root value together with its identity table
//! - [`SessionVariables`]: the top-level form of session data
//!
//! Strings are byte strings: lengths in the wire format count bytes, and nothing
//! requires the content to be UTF-8.
//!
//! ## Creating Values
//!
//! ```rust
//! use serde_php::{php, Value, ValueKind};
//!
//! let number = Value::from(42);
//! let text = Value::from("hello");
//! let list = php!([1, 2, "three"]);
//!
//! assert!(number.is_int());
//! assert_eq!(text.as_str(), Some("hello"));
//! assert_eq!(list.as_array().map(|a| a.len()), Some(3));
//! ```
//!
//! ## Offsets
//!
//! Values produced by the parser remember the offset of their type tag. The offset
//! describes the source document only; [`Value::clear_offsets`] drops it after a
//! mutation, and rendering never looks at it.

use crate::grammar;
use crate::options::IdentityNumbering;
use crate::{Error, Result};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// A parsed value and the byte offset of its type tag, when it came from a parse.
///
/// Equality compares structure only; offsets are ignored.
#[derive(Clone, Debug, Default)]
pub struct Value {
    kind: ValueKind,
    offset: Option<usize>,
}

/// The tagged union of everything the format can express.
#[derive(Clone, Debug, Default)]
pub enum ValueKind {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Vec<u8>),
    Array(Vec<Entry>),
    Object(Object),
    CustomObject(CustomObject),
    /// Back-reference re-using a container's identity (`r:`).
    Recursion(usize),
    /// Back-reference aliasing a previously identified value (`R:`).
    Reference(usize),
}

/// An array key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    String(Vec<u8>),
}

/// One `(key, value)` pair of an array. Duplicate keys are kept as they are.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub key: Key,
    pub value: Value,
}

/// A class instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    pub class_name: Vec<u8>,
    pub members: Vec<Member>,
}

/// A named object member.
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    pub name: MemberName,
    pub value: Value,
}

/// Member visibility as encoded in the member name prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    /// `\0*\0name`
    Protected,
    /// `\0Class\0name`, carrying the declaring class.
    Private(Vec<u8>),
}

/// A member name split into its logical name and visibility.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberName {
    pub name: Vec<u8>,
    pub visibility: Visibility,
}

/// An opaque payload produced by a class's own serialization hook.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomObject {
    pub class_name: Vec<u8>,
    pub data: Vec<u8>,
}

impl MemberName {
    /// A public member name.
    pub fn public(name: impl Into<Vec<u8>>) -> Self {
        MemberName {
            name: name.into(),
            visibility: Visibility::Public,
        }
    }

    pub fn protected(name: impl Into<Vec<u8>>) -> Self {
        MemberName {
            name: name.into(),
            visibility: Visibility::Protected,
        }
    }

    pub fn private(class: impl Into<Vec<u8>>, name: impl Into<Vec<u8>>) -> Self {
        MemberName {
            name: name.into(),
            visibility: Visibility::Private(class.into()),
        }
    }

    /// Decodes the raw wire name.
    ///
    /// A NUL-prefixed name without a closing NUL is kept verbatim as public, so
    /// [`MemberName::to_raw`] always restores the original bytes.
    ///
    /// ```rust
    /// use serde_php::{MemberName, Visibility};
    ///
    /// let name = MemberName::from_raw(b"\0Foo\0bar");
    /// assert_eq!(name.name, b"bar");
    /// assert_eq!(name.visibility, Visibility::Private(b"Foo".to_vec()));
    /// assert_eq!(name.to_raw(), b"\0Foo\0bar");
    /// ```
    #[must_use]
    pub fn from_raw(raw: &[u8]) -> Self {
        if let Some(rest) = raw.strip_prefix(b"\0") {
            if let Some(end) = rest.iter().position(|&b| b == 0) {
                let owner = &rest[..end];
                let name = rest[end + 1..].to_vec();
                let visibility = if owner == b"*" {
                    Visibility::Protected
                } else {
                    Visibility::Private(owner.to_vec())
                };
                return MemberName { name, visibility };
            }
        }
        MemberName::public(raw)
    }

    /// Encodes the name with its visibility prefix.
    #[must_use]
    pub fn to_raw(&self) -> Vec<u8> {
        let mut raw = Vec::with_capacity(self.name.len() + 3);
        match &self.visibility {
            Visibility::Public => {}
            Visibility::Protected => raw.extend_from_slice(b"\0*\0"),
            Visibility::Private(class) => {
                raw.push(0);
                raw.extend_from_slice(class);
                raw.push(0);
            }
        }
        raw.extend_from_slice(&self.name);
        raw
    }
}

impl Key {
    /// The key as text, the way it reads inside a document.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Key::Int(i) => i.to_string().into_bytes(),
            Key::String(s) => s.clone(),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::String(value.as_bytes().to_vec())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::String(value.into_bytes())
    }
}

impl From<&[u8]> for Key {
    fn from(value: &[u8]) -> Self {
        Key::String(value.to_vec())
    }
}

impl TryFrom<Value> for Key {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value.kind {
            ValueKind::Int(i) => Ok(Key::Int(i)),
            ValueKind::String(s) => Ok(Key::String(s)),
            other => Err(Error::invalid_argument(format!(
                "{} cannot be used as an array key",
                other.type_name()
            ))),
        }
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Int(i) => Value::new(ValueKind::Int(i)),
            Key::String(s) => Value::new(ValueKind::String(s)),
        }
    }
}

impl Entry {
    pub fn new(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Entry {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Member {
    pub fn new(name: MemberName, value: impl Into<Value>) -> Self {
        Member {
            name,
            value: value.into(),
        }
    }
}

impl Object {
    pub fn new(class_name: impl Into<Vec<u8>>) -> Self {
        Object {
            class_name: class_name.into(),
            members: Vec::new(),
        }
    }

    /// Appends a member and returns the object, for chaining.
    #[must_use]
    pub fn with_member(mut self, name: MemberName, value: impl Into<Value>) -> Self {
        self.members.push(Member::new(name, value));
        self
    }

    /// First member whose logical name is `name`, whatever its visibility.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members
            .iter()
            .find(|m| m.name.name == name.as_bytes())
            .map(|m| &m.value)
    }
}

impl ValueKind {
    /// Human-readable name of the variant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool(_) => "bool",
            ValueKind::Int(_) => "int",
            ValueKind::Float(_) => "float",
            ValueKind::String(_) => "string",
            ValueKind::Array(_) => "array",
            ValueKind::Object(_) => "object",
            ValueKind::CustomObject(_) => "custom object",
            ValueKind::Recursion(_) => "recursion",
            ValueKind::Reference(_) => "reference",
        }
    }

    /// Wire tag of the variant.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            ValueKind::Null => grammar::TAG_NULL,
            ValueKind::Bool(_) => grammar::TAG_BOOL,
            ValueKind::Int(_) => grammar::TAG_INT,
            ValueKind::Float(_) => grammar::TAG_FLOAT,
            ValueKind::String(_) => grammar::TAG_STRING,
            ValueKind::Array(_) => grammar::TAG_ARRAY,
            ValueKind::Object(_) => grammar::TAG_OBJECT,
            ValueKind::CustomObject(_) => grammar::TAG_CUSTOM,
            ValueKind::Recursion(_) => grammar::TAG_RECURSION,
            ValueKind::Reference(_) => grammar::TAG_REFERENCE,
        }
    }

    /// Array, object and custom object open an identity of their own.
    #[inline]
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(
            self,
            ValueKind::Array(_) | ValueKind::Object(_) | ValueKind::CustomObject(_)
        )
    }
}

impl PartialEq for ValueKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueKind::Null, ValueKind::Null) => true,
            (ValueKind::Bool(a), ValueKind::Bool(b)) => a == b,
            (ValueKind::Int(a), ValueKind::Int(b)) => a == b,
            // NAN round-trips as NAN
            (ValueKind::Float(a), ValueKind::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (ValueKind::String(a), ValueKind::String(b)) => a == b,
            (ValueKind::Array(a), ValueKind::Array(b)) => a == b,
            (ValueKind::Object(a), ValueKind::Object(b)) => a == b,
            (ValueKind::CustomObject(a), ValueKind::CustomObject(b)) => a == b,
            (ValueKind::Recursion(a), ValueKind::Recursion(b)) => a == b,
            (ValueKind::Reference(a), ValueKind::Reference(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Value {
    /// Wraps a kind without offset information.
    #[inline]
    #[must_use]
    pub const fn new(kind: ValueKind) -> Self {
        Value { kind, offset: None }
    }

    pub(crate) const fn at(kind: ValueKind, offset: usize) -> Self {
        Value {
            kind,
            offset: Some(offset),
        }
    }

    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Value::new(ValueKind::Null)
    }

    /// An array with keys `0..n`.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let entries = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Entry::new(Key::Int(i as i64), v))
            .collect();
        Value::new(ValueKind::Array(entries))
    }

    /// An array built from key/value pairs, in order.
    pub fn array<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        Value::new(ValueKind::Array(
            pairs.into_iter().map(|(k, v)| Entry::new(k, v)).collect(),
        ))
    }

    #[must_use]
    pub fn custom(class_name: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        Value::new(ValueKind::CustomObject(CustomObject {
            class_name: class_name.into(),
            data: data.into(),
        }))
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Mutable access to the payload. Drops this value's offset.
    pub fn kind_mut(&mut self) -> &mut ValueKind {
        self.offset = None;
        &mut self.kind
    }

    // Offset-preserving access for passes that clear offsets themselves.
    pub(crate) fn payload_mut(&mut self) -> &mut ValueKind {
        &mut self.kind
    }

    #[must_use]
    pub fn into_kind(self) -> ValueKind {
        self.kind
    }

    /// Byte offset of the type tag in the parsed source, if any.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Drops offset information from this value and everything below it.
    pub fn clear_offsets(&mut self) {
        self.offset = None;
        match &mut self.kind {
            ValueKind::Array(entries) => entries.iter_mut().for_each(|e| e.value.clear_offsets()),
            ValueKind::Object(object) => object
                .members
                .iter_mut()
                .for_each(|m| m.value.clear_offsets()),
            _ => {}
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self.kind, ValueKind::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self.kind, ValueKind::Int(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self.kind, ValueKind::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self.kind, ValueKind::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self.kind, ValueKind::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self.kind, ValueKind::Object(_))
    }

    /// Returns `true` for `r:` and `R:` values.
    #[inline]
    #[must_use]
    pub const fn is_back_reference(&self) -> bool {
        matches!(self.kind, ValueKind::Recursion(_) | ValueKind::Reference(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ValueKind::Bool(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self.kind {
            ValueKind::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Float payload; integers widen.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self.kind {
            ValueKind::Float(f) => Some(f),
            ValueKind::Int(i) => Some(i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            ValueKind::String(s) => Some(s),
            _ => None,
        }
    }

    /// String payload, when it is valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Entry]> {
        match &self.kind {
            ValueKind::Array(entries) => Some(entries),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match &self.kind {
            ValueKind::Object(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_custom(&self) -> Option<&CustomObject> {
        match &self.kind {
            ValueKind::CustomObject(custom) => Some(custom),
            _ => None,
        }
    }

    /// First array entry under `key`.
    ///
    /// ```rust
    /// use serde_php::php;
    ///
    /// let value = php!({"name": "Alice", "age": 30});
    /// assert_eq!(value.get("name").and_then(|v| v.as_str()), Some("Alice"));
    /// assert!(value.get(7).is_none());
    /// ```
    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        let key = key.into();
        self.as_array()?
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }

    /// Object member by logical name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Value> {
        self.as_object()?.get(name)
    }

    /// Checks that every back-reference points at an identity slot opened before it,
    /// walking the tree in render order.
    ///
    /// ```rust
    /// use serde_php::{parse, IdentityNumbering};
    ///
    /// let value = parse(b"a:1:{i:0;r:1;}").unwrap();
    /// assert!(value.validate_references(IdentityNumbering::Containers).is_ok());
    /// ```
    pub fn validate_references(&self, numbering: IdentityNumbering) -> Result<()> {
        let mut slots = 0;
        validate_walk(self, numbering, &mut slots)
    }
}

fn validate_walk(value: &Value, numbering: IdentityNumbering, slots: &mut usize) -> Result<()> {
    if numbering.registers(&value.kind) {
        *slots += 1;
    }
    match &value.kind {
        ValueKind::Recursion(index) | ValueKind::Reference(index) => {
            if *index == 0 || *index > *slots {
                return Err(Error::invalid_argument(format!(
                    "back-reference {} does not resolve ({} identity slot(s) precede it)",
                    index, slots
                )));
            }
            Ok(())
        }
        ValueKind::Array(entries) => entries
            .iter()
            .try_for_each(|e| validate_walk(&e.value, numbering, slots)),
        ValueKind::Object(object) => object
            .members
            .iter()
            .try_for_each(|m| validate_walk(&m.value, numbering, slots)),
        _ => Ok(()),
    }
}

/// One registered value of the identity table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentitySlot {
    /// Offset of the value's type tag.
    pub offset: usize,
    /// Child indices from the root: array entry or object member positions.
    pub path: Vec<usize>,
}

/// A parsed document: the root value plus the identity table built while parsing it.
#[derive(Clone, Debug)]
pub struct Document {
    pub root: Value,
    pub(crate) identities: Vec<IdentitySlot>,
}

impl Document {
    #[must_use]
    pub fn identities(&self) -> &[IdentitySlot] {
        &self.identities
    }

    /// The value a 1-based back-reference index denotes.
    ///
    /// ```rust
    /// use serde_php::parse_document;
    ///
    /// let doc = parse_document(b"a:1:{i:0;r:1;}").unwrap();
    /// let target = doc.resolve(1).unwrap();
    /// assert!(target.is_array());
    /// ```
    #[must_use]
    pub fn resolve(&self, index: usize) -> Option<&Value> {
        let slot = self.identities.get(index.checked_sub(1)?)?;
        slot.path.iter().try_fold(&self.root, |node, &i| match &node.kind {
            ValueKind::Array(entries) => entries.get(i).map(|e| &e.value),
            ValueKind::Object(object) => object.members.get(i).map(|m| &m.value),
            _ => None,
        })
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.root
    }
}

/// Top-level session data: `name|value` pairs in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionVariables {
    entries: Vec<(Vec<u8>, Value)>,
}

impl SessionVariables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variable, rejecting names outside the identifier charset.
    pub fn push(&mut self, name: impl Into<Vec<u8>>, value: impl Into<Value>) -> Result<()> {
        let name = name.into();
        if !grammar::is_identifier(&name) {
            return Err(Error::invalid_argument(format!(
                "invalid session variable name \"{}\"",
                String::from_utf8_lossy(&name)
            )));
        }
        self.entries.push((name, value.into()));
        Ok(())
    }

    pub(crate) fn push_parsed(&mut self, name: Vec<u8>, value: Value) {
        self.entries.push((name, value));
    }

    /// First variable called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name.as_bytes())
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_slice(), v))
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<(Vec<u8>, Value)> {
        &mut self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = crate::ser::render(self);
        write!(f, "{}", String::from_utf8_lossy(&rendered))
    }
}

// Serialize into the serde data model so any serde format can present a Value.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.kind {
            ValueKind::Null => serializer.serialize_unit(),
            ValueKind::Bool(b) => serializer.serialize_bool(*b),
            ValueKind::Int(i) => serializer.serialize_i64(*i),
            ValueKind::Float(f) => serializer.serialize_f64(*f),
            ValueKind::String(s) => serialize_bytes(s, serializer),
            ValueKind::Array(entries) => {
                if is_list(entries) {
                    let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                    for entry in entries {
                        seq.serialize_element(&entry.value)?;
                    }
                    seq.end()
                } else {
                    let mut map = serializer.serialize_map(Some(entries.len()))?;
                    for entry in entries {
                        match &entry.key {
                            Key::Int(i) => map.serialize_key(i)?,
                            Key::String(s) => map.serialize_key(&BytesRef(s))?,
                        }
                        map.serialize_value(&entry.value)?;
                    }
                    map.end()
                }
            }
            ValueKind::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.members.len()))?;
                for member in &object.members {
                    map.serialize_entry(&BytesRef(&member.name.name), &member.value)?;
                }
                map.end()
            }
            ValueKind::CustomObject(custom) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("class", &BytesRef(&custom.class_name))?;
                map.serialize_entry("data", &BytesRef(&custom.data))?;
                map.end()
            }
            ValueKind::Recursion(i) | ValueKind::Reference(i) => Err(serde::ser::Error::custom(
                format!("back-reference {} has no standalone representation", i),
            )),
        }
    }
}

struct BytesRef<'a>(&'a [u8]);

impl Serialize for BytesRef<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_bytes(self.0, serializer)
    }
}

fn serialize_bytes<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match std::str::from_utf8(bytes) {
        Ok(s) => serializer.serialize_str(s),
        Err(_) => serializer.serialize_bytes(bytes),
    }
}

/// Keys are exactly `0, 1, 2, ...` in order.
pub(crate) fn is_list(entries: &[Entry]) -> bool {
    entries
        .iter()
        .enumerate()
        .all(|(i, e)| e.key == Key::Int(i as i64))
}

impl From<ValueKind> for Value {
    fn from(kind: ValueKind) -> Self {
        Value::new(kind)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::new(ValueKind::Bool(value))
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::new(ValueKind::Int(value as i64))
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::new(ValueKind::Int(value as i64))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::new(ValueKind::Int(value as i64))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::new(ValueKind::Int(value))
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::new(ValueKind::Int(value as i64))
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::new(ValueKind::Int(value as i64))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::new(ValueKind::Int(value as i64))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::new(ValueKind::Float(value as f64))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::new(ValueKind::Float(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::new(ValueKind::String(value.as_bytes().to_vec()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::new(ValueKind::String(value.into_bytes()))
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::new(ValueKind::String(value.to_vec()))
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::new(ValueKind::String(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::list(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::new(ValueKind::Object(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Value::null, Into::into)
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| Error::custom(format!("expected int, found {}", value.kind.type_name())))
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| Error::custom(format!("expected float, found {}", value.kind.type_name())))
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| Error::custom(format!("expected bool, found {}", value.kind.type_name())))
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value.kind {
            ValueKind::String(bytes) => {
                String::from_utf8(bytes).map_err(|e| Error::custom(format!("string is not UTF-8: {}", e)))
            }
            other => Err(Error::custom(format!(
                "expected string, found {}",
                other.type_name()
            ))),
        }
    }
}

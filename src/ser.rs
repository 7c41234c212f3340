//! Rendering values to serialized bytes.
//!
//! This module provides the renderer that turns a [`Value`] tree back into the wire
//! format, and the serde [`ValueSerializer`] that builds a [`Value`] from any
//! `Serialize` type.
//!
//! ## Overview
//!
//! - **Byte-exact lengths**: string and class-name lengths count the bytes emitted,
//!   never characters
//! - **Opaque payloads**: custom object data is written back unchanged
//! - **Offsets ignored**: parse offsets never influence output
//! - **Indices as given**: `r:`/`R:` indices are written verbatim; see
//!   [`Value::validate_references`] to check them first
//!
//! ## Usage
//!
//! ```rust
//! use serde_php::{render, to_vec, Value};
//! use serde::Serialize;
//!
//! assert_eq!(render(&Value::from("é")), "s:2:\"é\";".as_bytes());
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let bytes = to_vec(&Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(bytes, b"O:5:\"Point\":2:{s:1:\"x\";i:1;s:1:\"y\";i:2;}");
//! ```

use crate::capability::{FloatCodec, StandardFloatCodec};
use crate::grammar::{
    CLOSE, DELIMITER, OPEN, QUOTE, TAG_ARRAY, TAG_BOOL, TAG_CUSTOM, TAG_FLOAT, TAG_INT, TAG_NULL,
    TAG_OBJECT, TAG_RECURSION, TAG_REFERENCE, TAG_STRING, TERMINATOR,
};
use crate::value::{Entry, Key, Member, MemberName, Object, Value, ValueKind};
use crate::{Error, Result};
use serde::{ser, Serialize};
use std::io;

/// Writes [`Value`] trees in the wire format.
pub struct Renderer<'f> {
    output: Vec<u8>,
    floats: &'f dyn FloatCodec,
}

impl Renderer<'static> {
    #[must_use]
    pub fn new() -> Self {
        Renderer::with_float_codec(&StandardFloatCodec)
    }
}

impl Default for Renderer<'static> {
    fn default() -> Self {
        Renderer::new()
    }
}

impl<'f> Renderer<'f> {
    pub fn with_float_codec(floats: &'f dyn FloatCodec) -> Self {
        Renderer {
            output: Vec::with_capacity(256),
            floats,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.output
    }

    /// Appends one value.
    pub fn write_value(&mut self, value: &Value) {
        match value.kind() {
            ValueKind::Null => {
                self.output.push(TAG_NULL);
                self.output.push(TERMINATOR);
            }
            ValueKind::Bool(b) => self.scalar(TAG_BOOL, if *b { "1" } else { "0" }),
            ValueKind::Int(i) => self.scalar(TAG_INT, &i.to_string()),
            ValueKind::Float(f) => {
                let token = self.floats.format(*f);
                self.scalar(TAG_FLOAT, &token);
            }
            ValueKind::String(s) => self.string(s),
            ValueKind::Array(entries) => {
                self.header(TAG_ARRAY);
                self.count(entries.len());
                for entry in entries {
                    self.key(&entry.key);
                    self.write_value(&entry.value);
                }
                self.output.push(CLOSE);
            }
            ValueKind::Object(object) => {
                self.header(TAG_OBJECT);
                self.class_name(&object.class_name);
                self.count(object.members.len());
                for member in &object.members {
                    self.string(&member.name.to_raw());
                    self.write_value(&member.value);
                }
                self.output.push(CLOSE);
            }
            ValueKind::CustomObject(custom) => {
                self.header(TAG_CUSTOM);
                self.class_name(&custom.class_name);
                self.count(custom.data.len());
                self.output.extend_from_slice(&custom.data);
                self.output.push(CLOSE);
            }
            ValueKind::Recursion(index) => self.scalar(TAG_RECURSION, &index.to_string()),
            ValueKind::Reference(index) => self.scalar(TAG_REFERENCE, &index.to_string()),
        }
    }

    pub(crate) fn write_raw(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }

    fn header(&mut self, tag: u8) {
        self.output.push(tag);
        self.output.push(DELIMITER);
    }

    fn scalar(&mut self, tag: u8, text: &str) {
        self.header(tag);
        self.output.extend_from_slice(text.as_bytes());
        self.output.push(TERMINATOR);
    }

    // `n:{`
    fn count(&mut self, n: usize) {
        self.output.extend_from_slice(n.to_string().as_bytes());
        self.output.push(DELIMITER);
        self.output.push(OPEN);
    }

    fn quoted(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes.len().to_string().as_bytes());
        self.output.push(DELIMITER);
        self.output.push(QUOTE);
        self.output.extend_from_slice(bytes);
        self.output.push(QUOTE);
    }

    fn string(&mut self, bytes: &[u8]) {
        self.header(TAG_STRING);
        self.quoted(bytes);
        self.output.push(TERMINATOR);
    }

    fn class_name(&mut self, name: &[u8]) {
        self.quoted(name);
        self.output.push(DELIMITER);
    }

    fn key(&mut self, key: &Key) {
        match key {
            Key::Int(i) => self.scalar(TAG_INT, &i.to_string()),
            Key::String(s) => self.string(s),
        }
    }
}

/// Renders a value with the standard float codec.
///
/// ```rust
/// use serde_php::{parse, render};
///
/// let input = b"a:2:{i:0;d:0.5;s:1:\"k\";O:3:\"Foo\":0:{}}";
/// assert_eq!(render(&parse(input).unwrap()), input);
/// ```
#[must_use]
pub fn render(value: &Value) -> Vec<u8> {
    let mut renderer = Renderer::new();
    renderer.write_value(value);
    renderer.into_inner()
}

/// Renders a value with a caller-supplied float codec.
#[must_use]
pub fn render_with(value: &Value, floats: &dyn FloatCodec) -> Vec<u8> {
    let mut renderer = Renderer::with_float_codec(floats);
    renderer.write_value(value);
    renderer.into_inner()
}

/// Renders a value into an I/O stream.
pub fn render_to_writer<W: io::Write>(mut writer: W, value: &Value) -> Result<()> {
    writer.write_all(&render(value))?;
    Ok(())
}

/// Serializes Rust data into the wire format.
///
/// Structs become objects named after the struct, sequences and maps become
/// arrays, and `None`/unit become null.
///
/// ```rust
/// use serde_php::to_vec;
///
/// assert_eq!(to_vec(&vec![true, false]).unwrap(), b"a:2:{i:0;b:1;i:1;b:0;}");
/// assert_eq!(to_vec(&Option::<i32>::None).unwrap(), b"N;");
/// ```
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    Ok(render(&to_value(value)?))
}

pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    render_to_writer(writer, &to_value(value)?)
}

/// Converts Rust data into a [`Value`] tree.
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// serde [`Serializer`](ser::Serializer) producing [`Value`] trees.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
    // set for tuple variants: wrap as `{variant: [..]}`
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    entries: Vec<Entry>,
    current_key: Option<Key>,
    variant: Option<&'static str>,
}

pub struct SerializeObject {
    object: Object,
}

fn wrap_variant(variant: &'static str, value: Value) -> Value {
    Value::new(ValueKind::Array(vec![Entry::new(variant, value)]))
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeObject;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        i64::try_from(v)
            .map(Value::from)
            .map_err(|_| Error::custom(format!("integer {} does not fit a signed 64-bit int", v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::from(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::null())
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::null())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::null())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::from(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(wrap_variant(variant, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeObject> {
        let mut object = Object::new(name);
        object.members.reserve(len);
        Ok(SerializeObject { object })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(variant)))
    }
}

impl SerializeVec {
    fn new(len: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(len),
            variant,
        }
    }

    fn finish(self) -> Value {
        let list = Value::list(self.vec);
        match self.variant {
            Some(variant) => wrap_variant(variant, list),
            None => list,
        }
    }
}

impl SerializeMap {
    fn new(variant: Option<&'static str>) -> Self {
        SerializeMap {
            entries: Vec::new(),
            current_key: None,
            variant,
        }
    }

    fn finish(self) -> Value {
        let map = Value::new(ValueKind::Array(self.entries));
        match self.variant {
            Some(variant) => wrap_variant(variant, map),
            None => map,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(Key::try_from(to_value(key)?)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::invariant("serialize_value called before serialize_key"))?;
        self.entries.push(Entry {
            key,
            value: to_value(value)?,
        });
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entries.push(Entry::new(key, to_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeObject {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.object.members.push(Member {
            name: MemberName::public(key),
            value: to_value(value)?,
        });
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::from(self.object))
    }
}

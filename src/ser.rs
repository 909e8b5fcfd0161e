//! TOON encoding.
//!
//! [`encode`](crate::encode) walks a [`Value`] tree and picks the most
//! compact wire form for every sequence it meets:
//!
//! - **Tabular**: homogeneous mappings become one `key[N]{fields}:` header
//!   plus delimiter-separated rows
//! - **Inline**: primitive sequences go on the header line, `key[N]: a,b,c`
//! - **Expanded**: everything else falls back to `- ` items
//!
//! Scalars render canonically: shortest decimal digits, no exponents, `-0`
//! as `0`, non-finite numbers as `null`, and strings quoted only when an
//! unquoted form would change meaning on the way back in.
//!
//! The typed layer ([`to_string`](crate::to_string),
//! [`to_value`](crate::to_value)) serializes through the finished `Value`
//! tree and never reaches into the text encoder.

use crate::de::is_valid_unquoted_key;
use crate::error::{Error, Result};
use crate::number::is_numeric_like;
use crate::options::EncodeOptions;
use crate::value::{Number, Value};
use crate::Map;
use serde::ser::{self, Serialize};

/// Renders `value` as TOON text with no terminal newline.
pub(crate) fn encode_value(value: &Value, options: &EncodeOptions) -> String {
    let mut encoder = Encoder {
        out: String::with_capacity(256),
        options,
    };
    encoder.emit_root(value);
    encoder.out
}

struct Encoder<'o> {
    out: String,
    options: &'o EncodeOptions,
}

impl Encoder<'_> {
    fn emit_root(&mut self, value: &Value) {
        match value {
            Value::Object(map) => self.emit_mapping(map, 0),
            Value::Array(arr) => self.emit_sequence_after_key(arr, 0),
            primitive => {
                let text = self.scalar(primitive);
                self.out.push_str(&text);
            }
        }
    }

    /// Opens a fresh line at `level`. The very first line of the document
    /// gets no leading newline, so the output never ends with one either.
    fn start_line(&mut self, level: usize) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        for _ in 0..level * self.options.indent {
            self.out.push(' ');
        }
    }

    fn emit_mapping(&mut self, map: &Map, level: usize) {
        for (key, value) in map.iter() {
            self.start_line(level);
            self.push_key(key);
            match value {
                Value::Array(arr) => self.emit_sequence_after_key(arr, level),
                Value::Object(nested) => {
                    self.out.push(':');
                    self.emit_mapping(nested, level + 1);
                }
                primitive => {
                    self.out.push_str(": ");
                    let text = self.scalar(primitive);
                    self.out.push_str(&text);
                }
            }
        }
    }

    /// Emits the `[N]...` header and body for a sequence. The key (if any)
    /// is already on the current line.
    fn emit_sequence_after_key(&mut self, arr: &[Value], level: usize) {
        let delim = self.options.delimiter.as_char();
        self.push_bracket(arr.len());

        if let Some(fields) = tabular_fields(arr) {
            self.out.push('{');
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    self.out.push(delim);
                }
                self.push_key(field.as_str());
            }
            self.out.push_str("}:");
            for item in arr {
                self.start_line(level + 1);
                if let Value::Object(row) = item {
                    for (i, field) in fields.iter().enumerate() {
                        if i > 0 {
                            self.out.push(delim);
                        }
                        if let Some(cell) = row.get(field.as_str()) {
                            let text = self.scalar(cell);
                            self.out.push_str(&text);
                        }
                    }
                }
            }
        } else if arr.iter().all(Value::is_primitive) {
            self.out.push(':');
            if !arr.is_empty() {
                self.out.push(' ');
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        self.out.push(delim);
                    }
                    let text = self.scalar(item);
                    self.out.push_str(&text);
                }
            }
        } else {
            self.out.push(':');
            for item in arr {
                self.start_line(level + 1);
                self.out.push_str("- ");
                match item {
                    Value::Array(inner) => self.emit_sequence_after_key(inner, level + 1),
                    Value::Object(obj) => self.emit_mapping_as_item(obj, level + 1),
                    primitive => {
                        let text = self.scalar(primitive);
                        self.out.push_str(&text);
                    }
                }
            }
        }
    }

    /// A mapping as a list item: first pair rides the hyphen line, the rest
    /// align one level deeper.
    fn emit_mapping_as_item(&mut self, map: &Map, item_level: usize) {
        if map.is_empty() {
            // No inline form for an empty mapping; a bare hyphen marks it.
            self.out.pop();
            return;
        }
        let mut first = true;
        for (key, value) in map.iter() {
            if first {
                first = false;
            } else {
                self.start_line(item_level + 1);
            }
            self.push_key(key);
            match value {
                Value::Array(arr) => self.emit_sequence_after_key(arr, item_level + 1),
                Value::Object(nested) => {
                    self.out.push(':');
                    self.emit_mapping(nested, item_level + 2);
                }
                primitive => {
                    self.out.push_str(": ");
                    let text = self.scalar(primitive);
                    self.out.push_str(&text);
                }
            }
        }
    }

    fn push_bracket(&mut self, len: usize) {
        self.out.push('[');
        if self.options.length_marker {
            self.out.push('#');
        }
        self.out.push_str(&len.to_string());
        self.out.push_str(self.options.delimiter.bracket_suffix());
        self.out.push(']');
    }

    fn push_key(&mut self, key: &str) {
        if is_valid_unquoted_key(key) {
            self.out.push_str(key);
        } else {
            let quoted = quote_and_escape(key);
            self.out.push_str(&quoted);
        }
    }

    /// Canonical single-token rendering of a primitive.
    fn scalar(&self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => {
                if needs_quotes(s) {
                    quote_and_escape(s)
                } else {
                    s.clone()
                }
            }
            // Collections never reach scalar position.
            _ => String::new(),
        }
    }
}

/// A sequence is tabular when every element is a mapping with the same keys
/// in the same order as the first, and every cell is a primitive.
fn tabular_fields(arr: &[Value]) -> Option<Vec<&String>> {
    let first = arr.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }
    let fields: Vec<&String> = first.keys().collect();
    for item in arr {
        let obj = item.as_object()?;
        if obj.len() != fields.len() {
            return None;
        }
        for (i, (key, value)) in obj.iter().enumerate() {
            if key != fields[i] || !value.is_primitive() {
                return None;
            }
        }
    }
    Some(fields)
}

/// A string must be quoted when the bare token would decode as something
/// else: a reserved literal, a number, a structural character, or trimmed
/// whitespace.
fn needs_quotes(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return true;
    };
    let last = s.chars().next_back().unwrap_or(first);
    first.is_whitespace()
        || last.is_whitespace()
        || first == '-'
        || first == '#'
        || matches!(s, "true" | "false" | "null" | "~")
        || is_numeric_like(s)
        || s.chars().any(|c| {
            matches!(
                c,
                ':' | '"' | '\\' | '[' | ']' | '{' | '}' | '\t' | '|' | ',' | '\n' | '\r'
            )
        })
}

fn quote_and_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Typed adapter: T -> Value via serde.
// ---------------------------------------------------------------------------

/// Serializer whose output is a [`Value`] tree.
pub(crate) struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Number(Number::Integer(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        self.serialize_f64(v as f64)
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Number(Number::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
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
        let mut map = Map::new();
        map.insert(variant.to_string(), value.serialize(ValueSerializer)?);
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeVec {
            elements: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            elements: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeMap {
            entries: Map::new(),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(None)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            entries: Map::new(),
        })
    }
}

pub(crate) struct SerializeVec {
    elements: Vec<Value>,
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.elements.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(self.elements))
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
        ser::SerializeSeq::end(self)
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
        ser::SerializeSeq::end(self)
    }
}

pub(crate) struct SerializeTupleVariant {
    variant: &'static str,
    elements: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.elements.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut map = Map::new();
        map.insert(self.variant.to_string(), Value::Array(self.elements));
        Ok(Value::Object(map))
    }
}

pub(crate) struct SerializeMap {
    entries: Map,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match key.serialize(ValueSerializer)? {
            Value::String(s) => {
                self.next_key = Some(s);
                Ok(())
            }
            _ => Err(Error::custom("map keys must be strings")),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::custom("map value without a key"))?;
        self.entries.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.entries))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entries
            .insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.entries))
    }
}

pub(crate) struct SerializeStructVariant {
    variant: &'static str,
    entries: Map,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entries
            .insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut map = Map::new();
        map.insert(self.variant.to_string(), Value::Object(self.entries));
        Ok(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use crate::{encode, encode_with_options, toon, Delimiter, EncodeOptions};

    #[test]
    fn empty_object_is_empty_document() {
        assert_eq!(encode(&toon!({})), "");
    }

    #[test]
    fn simple_object() {
        let value = toon!({"name": "Alice", "age": 30});
        assert_eq!(encode(&value), "name: Alice\nage: 30");
    }

    #[test]
    fn nested_object() {
        let value = toon!({"user": {"name": "Bob", "id": 123}});
        assert_eq!(encode(&value), "user:\n  name: Bob\n  id: 123");
    }

    #[test]
    fn primitive_array_is_inline() {
        let value = toon!({"tags": ["admin", "user", "dev"]});
        assert_eq!(encode(&value), "tags[3]: admin,user,dev");
    }

    #[test]
    fn empty_array() {
        assert_eq!(encode(&toon!({"items": []})), "items[0]:");
    }

    #[test]
    fn homogeneous_objects_are_tabular() {
        let value = toon!({"users": [
            {"id": 1, "name": "Alice", "active": true},
            {"id": 2, "name": "Bob", "active": false}
        ]});
        assert_eq!(
            encode(&value),
            "users[2]{id,name,active}:\n  1,Alice,true\n  2,Bob,false"
        );
    }

    #[test]
    fn mixed_array_is_expanded() {
        let value = toon!({"items": [1, "text", true]});
        assert_eq!(encode(&value), "items[3]:\n  - 1\n  - text\n  - true");
    }

    #[test]
    fn ragged_objects_fall_back_to_list() {
        let value = toon!({"items": [{"id": 1}, {"id": 2, "name": "B"}]});
        assert_eq!(
            encode(&value),
            "items[2]:\n  - id: 1\n  - id: 2\n    name: B"
        );
    }

    #[test]
    fn nested_arrays_in_list_items() {
        let value = toon!({"matrix": [[1, 2], [3, 4]]});
        assert_eq!(encode(&value), "matrix[2]:\n  - [2]: 1,2\n  - [2]: 3,4");
    }

    #[test]
    fn root_array_has_no_key() {
        let value = toon!([{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]);
        assert_eq!(encode(&value), "[2]{id,name}:\n  1,A\n  2,B");
    }

    #[test]
    fn root_primitive() {
        assert_eq!(encode(&toon!(42)), "42");
        assert_eq!(encode(&toon!("hello world")), "hello world");
    }

    #[test]
    fn strings_needing_quotes() {
        assert_eq!(
            encode(&toon!({"url": "http://example.com:8080"})),
            "url: \"http://example.com:8080\""
        );
        assert_eq!(
            encode(&toon!({"values": ["true", "false", "null"]})),
            "values[3]: \"true\",\"false\",\"null\""
        );
        assert_eq!(
            encode(&toon!({"items": ["-", "-test"]})),
            "items[2]: \"-\",\"-test\""
        );
        assert_eq!(encode(&toon!({"id": "05"})), "id: \"05\"");
        assert_eq!(encode(&toon!({"num": "42"})), "num: \"42\"");
    }

    #[test]
    fn quoted_string_in_comma_cell() {
        let value = toon!({"tags": ["a,b", "c"]});
        assert_eq!(encode(&value), "tags[2]: \"a,b\",c");
    }

    #[test]
    fn escape_sequences() {
        let value = toon!({"text": "Line1\nLine2\tTab"});
        assert_eq!(encode(&value), "text: \"Line1\\nLine2\\tTab\"");
    }

    #[test]
    fn invalid_keys_are_quoted() {
        let value = toon!({"order id": 7, "2nd": 1});
        assert_eq!(encode(&value), "\"order id\": 7\n\"2nd\": 1");
    }

    #[test]
    fn non_finite_floats_become_null() {
        let value = toon!({
            "ok": 42,
            "nan": (f64::NAN),
            "inf": (f64::INFINITY),
            "ninf": (f64::NEG_INFINITY)
        });
        assert_eq!(encode(&value), "ok: 42\nnan: null\ninf: null\nninf: null");
    }

    #[test]
    fn canonical_number_formatting() {
        let value = toon!({
            "a": (1.5000_f64),
            "b": (1e-3),
            "c": (0.000001),
            "d": (-0.0)
        });
        assert_eq!(encode(&value), "a: 1.5\nb: 0.001\nc: 0.000001\nd: 0");
    }

    #[test]
    fn tab_delimiter() {
        let value = toon!({"items": [{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]});
        let options = EncodeOptions::new().with_delimiter(Delimiter::Tab);
        assert_eq!(
            encode_with_options(&value, &options),
            "items[2\t]{id\tname}:\n  1\tA\n  2\tB"
        );
    }

    #[test]
    fn pipe_delimiter() {
        let value = toon!({"tags": ["a", "b", "c"]});
        let options = EncodeOptions::new().with_delimiter(Delimiter::Pipe);
        assert_eq!(encode_with_options(&value, &options), "tags[3|]: a|b|c");
    }

    #[test]
    fn length_marker() {
        let value = toon!({"tags": ["x", "y"]});
        let options = EncodeOptions::new().with_length_marker(true);
        assert_eq!(encode_with_options(&value, &options), "tags[#2]: x,y");
    }

    #[test]
    fn custom_indent() {
        let value = toon!({"a": {"b": 1}});
        let options = EncodeOptions::new().with_indent(4);
        assert_eq!(encode_with_options(&value, &options), "a:\n    b: 1");
    }

    #[test]
    fn output_hygiene() {
        let value = toon!({
            "user": {"name": "Ann", "tags": ["a", "b"]},
            "rows": [{"x": 1}, {"x": 2}]
        });
        let text = encode(&value);
        assert!(!text.ends_with('\n'));
        for line in text.lines() {
            assert!(!line.ends_with(' '), "trailing space in {line:?}");
            let spaces = line.len() - line.trim_start_matches(' ').len();
            assert_eq!(spaces % 2, 0, "odd indent in {line:?}");
        }
    }

    #[test]
    fn deep_nesting() {
        let value = toon!({"a": {"b": {"c": "value"}}});
        assert_eq!(encode(&value), "a:\n  b:\n    c: value");
    }

    #[test]
    fn empty_nested_object_renders_bare_key() {
        let value = toon!({"config": {}});
        assert_eq!(encode(&value), "config:");
    }

    #[test]
    fn null_alias_string_is_quoted() {
        // A literal "~" string must not decode back as null.
        assert_eq!(encode(&toon!({"v": "~"})), "v: \"~\"");
    }

    #[test]
    fn to_value_builds_trees() {
        use serde::Serialize;

        #[derive(Serialize)]
        struct Point {
            x: i32,
            y: i32,
        }

        let value = crate::to_value(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(value, toon!({"x": 1, "y": 2}));
    }

    #[test]
    fn map_keys_must_be_strings() {
        use std::collections::BTreeMap;

        let map: BTreeMap<i32, i32> = [(1, 2)].into_iter().collect();
        assert!(crate::to_value(&map).is_err());
    }

    #[test]
    fn sequence_kinds_by_content() {
        // Strings vs numbers mixed still count as primitives, so inline.
        let value = toon!({"mixed": [1, "two"]});
        assert_eq!(encode(&value), "mixed[2]: 1,two");

        // Null in the mix stays inline too.
        let value = toon!({"sparse": [1, null, 3]});
        assert_eq!(encode(&value), "sparse[3]: 1,null,3");
    }
}

//! # toon
//!
//! A codec for the TOON (Token-Oriented Object Notation) format.
//!
//! ## What is TOON?
//!
//! TOON is a compact, line-oriented, indentation-structured data format
//! designed to carry structured data into Large Language Model prompts with
//! as few tokens as possible. It expresses the same value universe as JSON —
//! nested mappings, ordered sequences, strings, numbers, booleans, null —
//! but drops the braces, encodes homogeneous object arrays as a single
//! header plus delimited rows, and inlines short primitive arrays.
//!
//! ```text
//! users[2]{id,name,role}:
//!   1,Alice,admin
//!   2,Bob,user
//! ```
//!
//! ## Decoding and encoding values
//!
//! The core operations work on the dynamic [`Value`] tree:
//!
//! ```rust
//! let value = toon::decode("users[2]{id,name}:\n  1,Alice\n  2,Bob").unwrap();
//! let text = toon::encode(&value);
//! assert_eq!(text, "users[2]{id,name}:\n  1,Alice\n  2,Bob");
//! ```
//!
//! Decoding is strict by default: declared lengths are enforced, indentation
//! must line up, and blank lines inside tables are rejected. Pass
//! [`DecodeOptions::lenient`] to get a best-effort parse instead.
//!
//! ## Typed data with serde
//!
//! Rust types flow through the same codec via serde:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User { id: 123, name: "Alice".to_string(), active: true };
//!
//! let text = toon::to_string(&user).unwrap();
//! assert_eq!(text, "id: 123\nname: Alice\nactive: true");
//!
//! let back: User = toon::from_str(&text).unwrap();
//! assert_eq!(user, back);
//! ```
//!
//! Arrays of homogeneous structs get the tabular treatment automatically:
//!
//! ```rust
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Product {
//!     sku: String,
//!     price: f64,
//! }
//!
//! let products = vec![
//!     Product { sku: "A1".to_string(), price: 9.99 },
//!     Product { sku: "B2".to_string(), price: 14.5 },
//! ];
//! let text = toon::to_string(&products).unwrap();
//! assert_eq!(text, "[2]{sku,price}:\n  A1,9.99\n  B2,14.5");
//! ```
//!
//! ## Building values inline
//!
//! ```rust
//! use toon::toon;
//!
//! let data = toon!({
//!     "name": "Alice",
//!     "tags": ["rust", "serde"]
//! });
//! assert_eq!(toon::encode(&data), "name: Alice\ntags[2]: rust,serde");
//! ```

mod de;
pub mod error;
mod macros;
pub mod map;
mod number;
pub mod options;
mod scan;
mod ser;
pub mod value;

pub use error::{Error, Result};
pub use map::Map;
pub use options::{DecodeOptions, Delimiter, EncodeOptions};
pub use value::{Number, Value};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Parses TOON text into a [`Value`] with default (strict) options.
///
/// `\r\n` and bare `\r` line endings are normalized to `\n` internally.
///
/// # Examples
///
/// ```rust
/// let value = toon::decode("name: Alice\nage: 30").unwrap();
/// assert_eq!(value.as_object().unwrap().get("age").unwrap().as_i64(), Some(30));
/// ```
///
/// # Errors
///
/// Returns an error when the input is malformed; in strict mode this
/// includes count mismatches, stray indentation, and blank lines inside
/// tables.
pub fn decode(input: &str) -> Result<Value> {
    decode_with_options(input, &DecodeOptions::default())
}

/// Parses TOON text into a [`Value`] with the given options.
///
/// # Examples
///
/// ```rust
/// use toon::DecodeOptions;
///
/// // Lenient mode tolerates a wrong declared length.
/// let value = toon::decode_with_options("tags[9]: a,b", &DecodeOptions::lenient()).unwrap();
/// assert_eq!(value.as_object().unwrap().get("tags").unwrap().as_array().unwrap().len(), 2);
/// ```
///
/// # Errors
///
/// Returns an error when the input is malformed under the given policy.
pub fn decode_with_options(input: &str, options: &DecodeOptions) -> Result<Value> {
    de::decode_str(input, options)
}

/// Renders a [`Value`] as TOON text with default options.
///
/// The output carries no terminal newline. Encoding a `Value` cannot fail.
///
/// # Examples
///
/// ```rust
/// use toon::toon;
///
/// let text = toon::encode(&toon!({"ok": true}));
/// assert_eq!(text, "ok: true");
/// ```
#[must_use]
pub fn encode(value: &Value) -> String {
    encode_with_options(value, &EncodeOptions::default())
}

/// Renders a [`Value`] as TOON text with the given options.
///
/// # Examples
///
/// ```rust
/// use toon::{toon, Delimiter, EncodeOptions};
///
/// let options = EncodeOptions::new()
///     .with_delimiter(Delimiter::Pipe)
///     .with_length_marker(true);
/// let text = toon::encode_with_options(&toon!({"tags": ["a", "b"]}), &options);
/// assert_eq!(text, "tags[#2|]: a|b");
/// ```
#[must_use]
pub fn encode_with_options(value: &Value, options: &EncodeOptions) -> String {
    ser::encode_value(value, options)
}

/// Deserializes an instance of `T` from TOON text.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = toon::from_str("x: 1\ny: 2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid TOON or does not match `T`.
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_str_with_options(s, &DecodeOptions::default())
}

/// Deserializes an instance of `T` from TOON text with the given options.
///
/// # Errors
///
/// Returns an error if the input is not valid TOON or does not match `T`.
pub fn from_str_with_options<T>(s: &str, options: &DecodeOptions) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(decode_with_options(s, options)?)
}

/// Deserializes an instance of `T` from TOON bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not UTF-8, not valid TOON, or do not
/// match `T`.
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(Error::custom)?;
    from_str(s)
}

/// Deserializes an instance of `T` from an I/O stream of TOON text.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = toon::from_reader(Cursor::new(b"x: 1\ny: 2")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the text does not decode into `T`.
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e))?;
    from_str(&string)
}

/// Deserializes an instance of `T` from an already-parsed [`Value`].
///
/// # Examples
///
/// ```rust
/// use toon::toon;
///
/// let pair: (i32, i32) = toon::from_value(toon!([1, 2])).unwrap();
/// assert_eq!(pair, (1, 2));
/// ```
///
/// # Errors
///
/// Returns an error if the value does not match `T`.
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(value)
}

/// Serializes `value` to a TOON string with default options.
///
/// # Errors
///
/// Returns an error if `value` cannot be represented (e.g. a map with
/// non-string keys).
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &EncodeOptions::default())
}

/// Serializes `value` to a TOON string with the given options.
///
/// # Examples
///
/// ```rust
/// use toon::{Delimiter, EncodeOptions};
///
/// let options = EncodeOptions::new().with_delimiter(Delimiter::Tab);
/// let text = toon::to_string_with_options(&vec![1, 2, 3], &options).unwrap();
/// assert_eq!(text, "[3\t]: 1\t2\t3");
/// ```
///
/// # Errors
///
/// Returns an error if `value` cannot be represented.
pub fn to_string_with_options<T>(value: &T, options: &EncodeOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Ok(encode_with_options(&to_value(value)?, options))
}

/// Serializes `value` as TOON text into a writer.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string(value)?;
    writer.write_all(text.as_bytes()).map_err(|e| Error::io(&e))
}

/// Converts any `T: Serialize` into a [`Value`] tree.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = toon::to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is_object());
/// ```
///
/// # Errors
///
/// Returns an error if `value` cannot be represented.
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ser::ValueSerializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
    }

    fn sample_user() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
        }
    }

    #[test]
    fn typed_round_trip() {
        let user = sample_user();
        let text = to_string(&user).unwrap();
        assert_eq!(
            text,
            "id: 123\nname: Alice\nactive: true\ntags[2]: admin,user"
        );
        let back: User = from_str(&text).unwrap();
        assert_eq!(user, back);
    }

    #[test]
    fn value_round_trip() {
        let value = decode("a: 1\nb:\n  c: x").unwrap();
        let text = encode(&value);
        assert_eq!(decode(&text).unwrap(), value);
    }

    #[test]
    fn reader_and_writer() {
        let user = sample_user();
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &user).unwrap();
        let back: User = from_reader(std::io::Cursor::new(buffer)).unwrap();
        assert_eq!(user, back);
    }

    #[test]
    fn slice_entry_point() {
        let user: User = from_slice(b"id: 1\nname: B\nactive: false\ntags[0]:").unwrap();
        assert_eq!(user.id, 1);
        assert!(user.tags.is_empty());
    }
}

//! TOON decoding.
//!
//! [`decode`](crate::decode) parses TOON text into a [`Value`] tree. The
//! parser is line-oriented: the scanner classifies every line once, then the
//! block parser walks the lines with a cursor, dispatching on what each line
//! looks like — array header, key-value pair, table row, list item.
//!
//! Strictness is a policy switch, not a separate parser: the same code path
//! either promotes advisories (blank lines inside tables, count mismatches,
//! stray indentation) to errors or quietly tolerates them.
//!
//! The typed layer ([`from_str`](crate::from_str),
//! [`from_value`](crate::from_value)) deserializes through the finished
//! `Value` tree and never reaches into the text parser.

use crate::error::{Error, Result};
use crate::number::{classify_numeric, NumericKind};
use crate::options::{DecodeOptions, Delimiter};
use crate::scan::{first_unquoted, normalize_newlines, split_quote_aware, Line, Scanner};
use crate::value::{Number, Value};
use crate::Map;
use num_bigint::BigInt;
use serde::de::value::{MapAccessDeserializer, MapDeserializer, SeqDeserializer};
use serde::de::{IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;

/// Parses a whole document into a [`Value`].
pub(crate) fn decode_str(input: &str, options: &DecodeOptions) -> Result<Value> {
    let text = normalize_newlines(input);
    let mut parser = Parser {
        scanner: Scanner::new(&text, options)?,
        options,
    };
    parser.parse_document()
}

/// A recognized array header: `key?[#?N<d>?]{fields}?: inline?`.
#[derive(Debug)]
struct Header<'a> {
    key: Option<String>,
    length: usize,
    length_marker: bool,
    delimiter: Delimiter,
    fields: Option<Vec<String>>,
    inline: Option<&'a str>,
    depth: usize,
    line: usize,
    raw: &'a str,
}

struct Parser<'a, 'o> {
    scanner: Scanner<'a>,
    options: &'o DecodeOptions,
}

impl<'a> Parser<'a, '_> {
    fn strict(&self) -> bool {
        self.options.strict
    }

    fn parse_document(&mut self) -> Result<Value> {
        enum RootForm<'a> {
            Empty,
            Array(Header<'a>),
            Primitive(Line<'a>),
            Mapping,
        }

        // Root-form detection looks at the significant depth-0 lines without
        // consuming anything. The header borrows from the input text, not
        // from the scanner, so it survives into the parse below.
        let form = {
            let mut first: Option<&Line<'a>> = None;
            let mut significant_at_root = 0usize;
            let mut offset = 0usize;
            while let Some(line) = self.scanner.peek_at(offset) {
                if !line.blank && !line.is_comment() && line.depth == 0 {
                    significant_at_root += 1;
                    if first.is_none() {
                        first = Some(line);
                    }
                }
                offset += 1;
            }
            match first {
                None => RootForm::Empty,
                Some(line) => match parse_header(line)? {
                    Some(header) if header.key.is_none() => RootForm::Array(header),
                    Some(_) => RootForm::Mapping,
                    None if significant_at_root == 1
                        && first_unquoted(line.content, ':').is_none() =>
                    {
                        RootForm::Primitive(line.clone())
                    }
                    None => RootForm::Mapping,
                },
            }
        };

        if self.options.debug {
            let name = match &form {
                RootForm::Empty => "empty",
                RootForm::Array(_) => "array",
                RootForm::Primitive(_) => "primitive",
                RootForm::Mapping => "mapping",
            };
            tracing::trace!(form = name, "detected root form");
        }

        let value = match form {
            RootForm::Empty => Value::Object(Map::new()),
            RootForm::Mapping => self.parse_mapping(0)?,
            RootForm::Primitive(line) => {
                self.advance_to_line(line.num)?;
                self.scanner.advance();
                self.parse_primitive(line.content, line.num, line.raw)?
            }
            RootForm::Array(header) => {
                self.advance_to_line(header.line)?;
                self.scanner.advance();
                self.parse_array_body(&header)?
            }
        };

        // Anything left over is not part of the root value.
        self.skip_insignificant();
        if let Some(line) = self.scanner.peek() {
            if self.strict() {
                return Err(Error::parse(
                    line.num,
                    "Trailing content after root value",
                    line.raw,
                ));
            }
        }
        Ok(value)
    }

    /// Skips blank and comment lines.
    fn skip_insignificant(&mut self) {
        while let Some(line) = self.scanner.peek() {
            if line.blank || line.is_comment() {
                self.scanner.advance();
            } else {
                break;
            }
        }
    }

    /// Moves the cursor to the line numbered `target`, skipping blanks and
    /// comments. Other intervening lines are stray indentation.
    fn advance_to_line(&mut self, target: usize) -> Result<()> {
        while let Some(line) = self.scanner.peek() {
            if line.num == target {
                return Ok(());
            }
            if line.blank || line.is_comment() {
                self.scanner.advance();
                continue;
            }
            if self.strict() {
                return Err(Error::parse(line.num, "Unexpected indentation", line.raw));
            }
            self.scanner.advance();
        }
        Ok(())
    }

    /// Next non-blank, non-comment line without consuming anything.
    fn peek_significant(&self) -> Option<&Line<'a>> {
        let mut offset = 0usize;
        while let Some(line) = self.scanner.peek_at(offset) {
            if line.blank || line.is_comment() {
                offset += 1;
            } else {
                return Some(line);
            }
        }
        None
    }

    /// Next non-blank line without consuming anything. Comments are not
    /// skipped: inside tables and lists a `#` line is data.
    fn peek_past_blanks(&self) -> Option<&Line<'a>> {
        let mut offset = 0usize;
        while let Some(line) = self.scanner.peek_at(offset) {
            if line.blank {
                offset += 1;
            } else {
                return Some(line);
            }
        }
        None
    }

    /// Parses a mapping whose keys sit at `base` depth.
    fn parse_mapping(&mut self, base: usize) -> Result<Value> {
        let mut map = Map::new();
        loop {
            let Some(line) = self.scanner.peek() else { break };
            if line.blank || line.is_comment() {
                self.scanner.advance();
                continue;
            }
            if line.depth < base {
                break;
            }
            if line.depth > base {
                if self.strict() {
                    return Err(Error::parse(line.num, "Unexpected indentation", line.raw));
                }
                self.scanner.advance();
                continue;
            }

            let line = line.clone();

            // Anonymous null-keyed sentinel.
            if let Some(rest) = line.content.strip_prefix("-:") {
                self.scanner.advance();
                let value = self.parse_primitive(rest.trim(), line.num, line.raw)?;
                map.insert(String::new(), value);
                continue;
            }

            if let Some(header) = parse_header(&line)? {
                let Some(key) = header.key.clone() else {
                    return Err(Error::parse(
                        line.num,
                        "Header at object level must have a key",
                        line.raw,
                    ));
                };
                self.scanner.advance();
                let value = self.parse_array_body(&header)?;
                map.insert(key, value);
                continue;
            }

            if let Some(colon) = first_unquoted(line.content, ':') {
                self.scanner.advance();
                let key = self.decode_key(line.content[..colon].trim(), line.num, line.raw)?;
                let rhs = line.content[colon + 1..].trim();
                let value = if rhs.is_empty() {
                    match self.peek_significant() {
                        Some(next) if next.depth > base => self.parse_mapping(base + 1)?,
                        _ => Value::Object(Map::new()),
                    }
                } else {
                    self.parse_primitive(rhs, line.num, line.raw)?
                };
                map.insert(key, value);
                continue;
            }

            // No handler accepts this line; the mapping ends here.
            break;
        }
        Ok(Value::Object(map))
    }

    fn parse_array_body(&mut self, header: &Header<'a>) -> Result<Value> {
        if self.options.debug {
            tracing::trace!(
                key = header.key.as_deref().unwrap_or(""),
                length = header.length,
                marker = header.length_marker,
                tabular = header.fields.is_some(),
                "array header"
            );
        }
        if let Some(fields) = &header.fields {
            self.parse_tabular(header, fields)
        } else if let Some(tail) = header.inline {
            self.parse_inline(header, tail)
        } else {
            self.parse_expanded(header)
        }
    }

    fn parse_inline(&mut self, header: &Header<'a>, tail: &str) -> Result<Value> {
        let parts = split_quote_aware(tail, header.delimiter.as_char());
        if self.strict() && parts.len() != header.length {
            return Err(Error::parse(
                header.line,
                format!(
                    "Inline array length mismatch: expected {}, got {}",
                    header.length,
                    parts.len()
                ),
                header.raw,
            ));
        }
        let mut items = Vec::with_capacity(parts.len());
        for part in parts {
            items.push(self.parse_primitive(part.trim(), header.line, header.raw)?);
        }
        Ok(Value::Array(items))
    }

    fn parse_tabular(&mut self, header: &Header<'a>, fields: &[String]) -> Result<Value> {
        let row_depth = header.depth + 1;
        let delim = header.delimiter.as_char();
        let mut rows: Vec<Value> = Vec::new();

        loop {
            let Some(line) = self.scanner.peek() else { break };
            if line.blank {
                if self.strict() && !rows.is_empty() {
                    if let Some(next) = self.peek_past_blanks() {
                        if next.depth == row_depth && is_table_row(next.content, delim) {
                            return Err(Error::parse(
                                line.num,
                                "Blank line inside tabular rows is not allowed",
                                line.raw,
                            ));
                        }
                    }
                }
                self.scanner.advance();
                continue;
            }
            if line.depth < row_depth {
                break;
            }
            if line.depth > row_depth {
                if self.strict() {
                    return Err(Error::parse(line.num, "Unexpected indentation", line.raw));
                }
                self.scanner.advance();
                continue;
            }
            if !is_table_row(line.content, delim) {
                // A `key:` line at row depth belongs to an enclosing scope.
                break;
            }

            let line = line.clone();
            self.scanner.advance();
            if self.strict() && rows.len() == header.length {
                return Err(Error::parse(line.num, "Too many tabular rows", line.raw));
            }

            let cells = split_quote_aware(line.content, delim);
            if self.strict() && cells.len() != fields.len() {
                return Err(Error::parse(
                    line.num,
                    format!(
                        "Tabular row width mismatch: expected {}, got {}",
                        fields.len(),
                        cells.len()
                    ),
                    line.raw,
                ));
            }

            let mut row = Map::with_capacity(fields.len());
            for (i, field) in fields.iter().enumerate() {
                let value = match cells.get(i) {
                    Some(cell) => self.parse_primitive(cell.trim(), line.num, line.raw)?,
                    None => Value::Null,
                };
                row.insert(field.clone(), value);
            }
            rows.push(Value::Object(row));
        }

        if self.strict() && rows.len() != header.length {
            return Err(Error::parse(
                header.line,
                format!("Expected {} rows, got {}", header.length, rows.len()),
                header.raw,
            ));
        }
        if self.options.debug {
            tracing::trace!(rows = rows.len(), "tabular array parsed");
        }
        Ok(Value::Array(rows))
    }

    fn parse_expanded(&mut self, header: &Header<'a>) -> Result<Value> {
        let item_depth = header.depth + 1;
        let mut items: Vec<Value> = Vec::new();

        loop {
            let Some(line) = self.scanner.peek() else { break };
            if line.blank {
                if self.strict() && !items.is_empty() {
                    if let Some(next) = self.peek_past_blanks() {
                        if next.depth == item_depth && next.content.starts_with("- ") {
                            return Err(Error::parse(
                                line.num,
                                "Blank line inside list items is not allowed",
                                line.raw,
                            ));
                        }
                    }
                }
                self.scanner.advance();
                continue;
            }
            if line.depth < item_depth {
                break;
            }
            if line.depth > item_depth {
                if self.strict() {
                    return Err(Error::parse(line.num, "Unexpected indentation", line.raw));
                }
                self.scanner.advance();
                continue;
            }

            let line = line.clone();
            let Some(body) = line.content.strip_prefix("- ") else {
                if self.strict() {
                    return Err(Error::parse(
                        line.num,
                        "Expected list item starting with '-'",
                        line.raw,
                    ));
                }
                self.scanner.advance();
                continue;
            };
            self.scanner.advance();

            let looks_structured = body.starts_with('[')
                || body.starts_with('{')
                || first_unquoted(body, ':').is_some();
            if looks_structured {
                if self.strict() {
                    return Err(Error::parse(
                        line.num,
                        "List item maps are not supported in strict mode",
                        line.raw,
                    ));
                }
                items.push(self.parse_lenient_item(body, item_depth, &line)?);
            } else {
                items.push(self.parse_primitive(body, line.num, line.raw)?);
            }
        }

        if self.strict() && items.len() != header.length {
            return Err(Error::parse(
                header.line,
                format!(
                    "List array item count mismatch: expected {}, got {}",
                    header.length,
                    items.len()
                ),
                header.raw,
            ));
        }
        Ok(Value::Array(items))
    }

    /// Lenient fallback for a structured list item: a single-key mapping, with
    /// the key kept verbatim when it would not decode.
    fn parse_lenient_item(
        &mut self,
        body: &str,
        item_depth: usize,
        line: &Line<'a>,
    ) -> Result<Value> {
        let Some(colon) = first_unquoted(body, ':') else {
            return self.parse_primitive(body, line.num, line.raw);
        };
        let key_tok = body[..colon].trim();
        let key = self
            .decode_key(key_tok, line.num, line.raw)
            .unwrap_or_else(|_| key_tok.to_string());
        let rhs = body[colon + 1..].trim();
        let value = if rhs.is_empty() {
            match self.peek_significant() {
                Some(next) if next.depth > item_depth => self.parse_mapping(item_depth + 1)?,
                _ => Value::Object(Map::new()),
            }
        } else {
            self.parse_primitive(rhs, line.num, line.raw)?
        };
        let mut map = Map::new();
        map.insert(key, value);
        Ok(Value::Object(map))
    }

    /// Converts a single trimmed token into a scalar value.
    fn parse_primitive(&self, token: &str, line_num: usize, raw: &str) -> Result<Value> {
        if token.is_empty() {
            return Ok(Value::String(String::new()));
        }
        if token.starts_with('"') {
            return unescape_quoted(token, line_num, raw).map(Value::String);
        }
        match token {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            // `~` is a decode-only alias; the encoder always writes `null`.
            "null" | "~" => return Ok(Value::Null),
            _ => {}
        }
        match classify_numeric(token) {
            Some(NumericKind::Integer) => {
                let number = match token.parse::<i64>() {
                    Ok(i) => Number::Integer(i),
                    // Wider than i64: keep the literal lossless.
                    Err(_) => token
                        .parse::<BigInt>()
                        .map(Number::from)
                        .map_err(|_| Error::parse(line_num, "Invalid number literal", raw))?,
                };
                Ok(Value::Number(number))
            }
            Some(NumericKind::Float) => {
                let parsed = token
                    .parse::<f64>()
                    .map_err(|_| Error::parse(line_num, "Invalid number literal", raw))?;
                let parsed = if parsed == 0.0 { 0.0 } else { parsed };
                Ok(Value::Number(Number::Float(parsed)))
            }
            None => Ok(Value::String(token.to_string())),
        }
    }

    /// Decodes a key token: quoted string or `[A-Za-z_][A-Za-z0-9_.]*`.
    fn decode_key(&self, token: &str, line_num: usize, raw: &str) -> Result<String> {
        if token.starts_with('"') {
            return unescape_quoted(token, line_num, raw);
        }
        if is_valid_unquoted_key(token) {
            Ok(token.to_string())
        } else {
            Err(Error::parse(
                line_num,
                format!("Invalid unquoted key: {token:?}"),
                raw,
            ))
        }
    }
}

/// True for a line that reads as a table row rather than a nested key: any
/// unquoted `:` must come after the first unquoted delimiter.
fn is_table_row(content: &str, delim: char) -> bool {
    match first_unquoted(content, ':') {
        None => true,
        Some(colon) => matches!(first_unquoted(content, delim), Some(d) if d < colon),
    }
}

pub(crate) fn is_valid_unquoted_key(token: &str) -> bool {
    let mut bytes = token.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
}

/// Recognizes an array header on `line`.
///
/// `Ok(None)` means the line clearly is not a header (no `[...]` in its left
/// part); a header-shaped but malformed line is an error.
fn parse_header<'a>(line: &Line<'a>) -> Result<Option<Header<'a>>> {
    let content = line.content;
    let Some(colon) = first_unquoted(content, ':') else {
        // `users[3]` without a colon is header-shaped, not a plain value.
        if !content.starts_with('-')
            && first_unquoted(content, '[').is_some()
            && first_unquoted(content, ']').is_some()
        {
            return Err(Error::parse(line.num, "Missing colon in header", line.raw));
        }
        return Ok(None);
    };
    let left = &content[..colon];

    let bracket_start = if left.starts_with('"') {
        match quoted_end(left) {
            Some(end) => end + 1,
            None => return Ok(None),
        }
    } else {
        match left.find('[') {
            Some(i) => i,
            None => return Ok(None),
        }
    };
    if !left[bracket_start..].starts_with('[') {
        return Ok(None);
    }

    let key_tok = &left[..bracket_start];
    let Some(bracket_len) = left[bracket_start..].find(']') else {
        return Err(Error::parse(
            line.num,
            "Invalid array header (missing closing bracket)",
            line.raw,
        ));
    };
    let bracket_end = bracket_start + bracket_len;
    let mut body = &left[bracket_start + 1..bracket_end];

    let length_marker = if let Some(rest) = body.strip_prefix('#') {
        body = rest;
        true
    } else {
        false
    };
    let delimiter = if let Some(rest) = body.strip_suffix('\t') {
        body = rest;
        Delimiter::Tab
    } else if let Some(rest) = body.strip_suffix('|') {
        body = rest;
        Delimiter::Pipe
    } else {
        Delimiter::Comma
    };
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::parse(line.num, "Invalid array length", line.raw));
    }
    let length: usize = body
        .parse()
        .map_err(|_| Error::parse(line.num, "Invalid array length", line.raw))?;

    let after_bracket = &left[bracket_end + 1..];
    let fields = if after_bracket.is_empty() {
        None
    } else if let Some(inner) = after_bracket
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    {
        if inner.is_empty() {
            return Err(Error::parse(
                line.num,
                "Missing fields in tabular header",
                line.raw,
            ));
        }
        let mut fields = Vec::new();
        for tok in split_quote_aware(inner, delimiter.as_char()) {
            let tok = tok.trim();
            if tok.starts_with('"') {
                fields.push(unescape_quoted(tok, line.num, line.raw)?);
            } else if is_valid_unquoted_key(tok) {
                fields.push(tok.to_string());
            } else {
                return Err(Error::parse(
                    line.num,
                    format!("Invalid header fields segment: bad field {tok:?}"),
                    line.raw,
                ));
            }
        }
        Some(fields)
    } else {
        return Err(Error::parse(
            line.num,
            "Invalid header fields segment",
            line.raw,
        ));
    };

    let tail = content[colon + 1..].trim();
    let inline = if tail.is_empty() {
        None
    } else if fields.is_some() {
        return Err(Error::parse(
            line.num,
            "Unexpected inline values after tabular header",
            line.raw,
        ));
    } else {
        Some(tail)
    };

    let key = if key_tok.is_empty() {
        None
    } else if key_tok.starts_with('"') {
        Some(unescape_quoted(key_tok, line.num, line.raw)?)
    } else if is_valid_unquoted_key(key_tok) {
        Some(key_tok.to_string())
    } else {
        return Err(Error::parse(
            line.num,
            format!("Invalid unquoted key: {key_tok:?}"),
            line.raw,
        ));
    };

    Ok(Some(Header {
        key,
        length,
        length_marker,
        delimiter,
        fields,
        inline,
        depth: line.depth,
        line: line.num,
        raw: line.raw,
    }))
}

/// Byte index of the closing quote of a token starting with `"`.
fn quoted_end(s: &str) -> Option<usize> {
    let mut escape = false;
    for (i, c) in s.char_indices().skip(1) {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '\\' => escape = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

/// Decodes a quoted token using exactly the five escapes
/// `\\ \" \n \r \t`.
fn unescape_quoted(token: &str, line_num: usize, raw: &str) -> Result<String> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token[1..].chars();
    loop {
        match chars.next() {
            None => return Err(Error::parse(line_num, "Unterminated string", raw)),
            Some('"') => {
                if chars.next().is_some() {
                    return Err(Error::parse(line_num, "Invalid quoted string", raw));
                }
                return Ok(out);
            }
            Some('\\') => match chars.next() {
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some(other) => {
                    return Err(Error::parse(
                        line_num,
                        format!("Invalid escape sequence: \\{other}"),
                        raw,
                    ))
                }
                None => return Err(Error::parse(line_num, "Unterminated escape", raw)),
            },
            Some(c) => out.push(c),
        }
    }
}

// ---------------------------------------------------------------------------
// Typed adapter: Value -> T via serde.
// ---------------------------------------------------------------------------

impl<'de> IntoDeserializer<'de, Error> for Value {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

impl<'de> serde::Deserializer<'de> for Value {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(Number::Integer(i)) => visitor.visit_i64(i),
            Value::Number(Number::Big(b)) => {
                use num_traits::ToPrimitive;
                match (b.to_i64(), b.to_u64()) {
                    (Some(i), _) => visitor.visit_i64(i),
                    (None, Some(u)) => visitor.visit_u64(u),
                    (None, None) => visitor.visit_string(b.to_string()),
                }
            }
            Value::Number(Number::Float(f)) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr.into_iter())),
            Value::Object(map) => visitor.visit_map(MapDeserializer::new(map.into_iter())),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(other),
        }
    }

    // Large integer literals widen to big integers on decode; a float target
    // still wants them as a double.
    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Number(n) => visitor.visit_f64(n.as_f64()),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_f64(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
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
        V: Visitor<'de>,
    {
        match self {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Object(map) => {
                visitor.visit_enum(MapAccessDeserializer::new(MapDeserializer::new(
                    map.into_iter(),
                )))
            }
            other => Err(Error::custom(format!(
                "expected an enum representation, found {other:?}"
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

//! Configuration options for the TOON codec.
//!
//! This module provides the types that customize decoding and encoding:
//!
//! - [`DecodeOptions`]: strictness, indentation width, and diagnostic tracing
//! - [`EncodeOptions`]: indentation width, delimiter, and the length marker
//! - [`Delimiter`]: the separator used in arrays and tables (comma, tab, pipe)
//!
//! ## Examples
//!
//! ```rust
//! use toon::{DecodeOptions, EncodeOptions, Delimiter};
//!
//! // Tolerate sloppy input instead of failing on it
//! let decode = DecodeOptions::lenient();
//! assert!(!decode.strict);
//!
//! // Pipe-delimited tables with `[#N]` length markers
//! let encode = EncodeOptions::new()
//!     .with_delimiter(Delimiter::Pipe)
//!     .with_length_marker(true);
//! assert_eq!(encode.delimiter.as_char(), '|');
//! ```

/// Delimiter choice for TOON arrays and tables.
///
/// - **Comma**: default, most compact
/// - **Tab**: TSV-like output
/// - **Pipe**: readable, markdown-table-like
///
/// # Examples
///
/// ```rust
/// use toon::Delimiter;
///
/// assert_eq!(Delimiter::Comma.as_str(), ",");
/// assert_eq!(Delimiter::Tab.as_str(), "\t");
/// assert_eq!(Delimiter::Pipe.as_str(), "|");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Pipe,
}

impl Delimiter {
    /// Returns the delimiter as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Delimiter::Comma => ",",
            Delimiter::Tab => "\t",
            Delimiter::Pipe => "|",
        }
    }

    /// Returns the delimiter as a character.
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    /// The marker written after the length inside `[...]` headers.
    ///
    /// Comma is the default delimiter and is left implicit; tab and pipe are
    /// spelled out (`[3\t]`, `[3|]`).
    #[must_use]
    pub(crate) const fn bracket_suffix(&self) -> &'static str {
        match self {
            Delimiter::Comma => "",
            Delimiter::Tab => "\t",
            Delimiter::Pipe => "|",
        }
    }
}

/// Configuration for [`decode`](crate::decode).
///
/// # Examples
///
/// ```rust
/// use toon::DecodeOptions;
///
/// let strict = DecodeOptions::new();
/// assert!(strict.strict);
///
/// let relaxed = DecodeOptions::new().with_strict(false).with_indent(4);
/// assert_eq!(relaxed.indent, 4);
/// ```
#[derive(Clone, Debug)]
pub struct DecodeOptions {
    /// Spaces per indentation level. Default: 2.
    pub indent: usize,
    /// When true (the default), structural advisories — blank lines inside
    /// tables, count mismatches, misaligned indentation, tabs in indentation,
    /// trailing spaces — are promoted to errors.
    pub strict: bool,
    /// When true, the decoder emits `tracing` events describing its progress.
    pub debug: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            indent: 2,
            strict: true,
            debug: false,
        }
    }
}

impl DecodeOptions {
    /// Creates default (strict) options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates lenient options: advisories are tolerated and the decoder
    /// returns a best-effort value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon::DecodeOptions;
    ///
    /// let options = DecodeOptions::lenient();
    /// assert!(!options.strict);
    /// ```
    #[must_use]
    pub fn lenient() -> Self {
        DecodeOptions {
            strict: false,
            ..Default::default()
        }
    }

    /// Sets the number of spaces per indentation level.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Enables or disables strict mode.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enables or disables diagnostic trace events.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Configuration for [`encode`](crate::encode).
///
/// # Examples
///
/// ```rust
/// use toon::{EncodeOptions, Delimiter};
///
/// let options = EncodeOptions::new()
///     .with_indent(4)
///     .with_delimiter(Delimiter::Tab)
///     .with_length_marker(true);
/// assert!(options.length_marker);
/// ```
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Spaces per indentation level. Default: 2.
    pub indent: usize,
    /// Delimiter used in inline arrays, tabular headers, and rows.
    pub delimiter: Delimiter,
    /// When true, array headers carry the `#` marker: `[#3]` instead of `[3]`.
    pub length_marker: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            indent: 2,
            delimiter: Delimiter::default(),
            length_marker: false,
        }
    }
}

impl EncodeOptions {
    /// Creates default options (comma delimiter, 2-space indent, no marker).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of spaces per indentation level.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the delimiter for arrays and tables.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Enables or disables the `#` length marker in array headers.
    #[must_use]
    pub fn with_length_marker(mut self, length_marker: bool) -> Self {
        self.length_marker = length_marker;
        self
    }
}

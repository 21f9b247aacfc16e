//! CSV reader configuration.
//!
//! [`CsvReaderConfiguration`] is deserializable from configuration files;
//! every field is optional there and falls back to the constants below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::encoding::{self, FieldDecoder};
use crate::error::{ReaderError, ReaderResult};

pub const DEFAULT_DELIMITER: char = ',';
pub const DEFAULT_ENCLOSURE: char = '"';
pub const DEFAULT_ESCAPE: char = '\\';
pub const DEFAULT_HAS_HEADER: bool = true;

/// Parser dialect flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CsvFlags {
    /// Trim whitespace around every field (header included).
    pub trim: bool,
    /// A doubled enclosure inside a quoted field is a literal enclosure.
    pub double_quote: bool,
    /// Lines starting with this character are ignored.
    pub comment: Option<char>,
}

impl Default for CsvFlags {
    fn default() -> Self {
        Self {
            trim: false,
            double_quote: true,
            comment: None,
        }
    }
}

/// Everything a [`super::csv::CsvReader`] needs to open and window a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CsvReaderConfiguration {
    /// Path of the delimited file.
    pub file_name: PathBuf,
    pub delimiter: char,
    pub enclosure: char,
    /// `None` disables backslash-style escapes.
    pub escape: Option<char>,
    pub flags: CsvFlags,
    /// First physical row holds the column names.
    pub has_header: bool,
    /// Number of data rows to skip after the header.
    pub offset: Option<usize>,
    /// Maximum number of data sets to yield after the offset.
    pub limit: Option<usize>,
    /// Character encoding label of the source. `None` detects it.
    pub encoding: Option<String>,
}

impl Default for CsvReaderConfiguration {
    fn default() -> Self {
        Self {
            file_name: PathBuf::new(),
            delimiter: DEFAULT_DELIMITER,
            enclosure: DEFAULT_ENCLOSURE,
            escape: Some(DEFAULT_ESCAPE),
            flags: CsvFlags::default(),
            has_header: DEFAULT_HAS_HEADER,
            offset: None,
            limit: None,
            encoding: None,
        }
    }
}

impl CsvReaderConfiguration {
    /// Default configuration for `file_name`.
    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_enclosure(mut self, enclosure: char) -> Self {
        self.enclosure = enclosure;
        self
    }

    pub fn with_escape(mut self, escape: Option<char>) -> Self {
        self.escape = escape;
        self
    }

    pub fn with_flags(mut self, flags: CsvFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_offset(mut self, offset: Option<usize>) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_encoding(mut self, encoding: Option<&str>) -> Self {
        self.encoding = encoding.map(String::from);
        self
    }

    /// Check that every control character fits the byte-oriented parser.
    pub fn validate(&self) -> ReaderResult<()> {
        ascii_byte("delimiter", self.delimiter)?;
        ascii_byte("enclosure", self.enclosure)?;
        if let Some(escape) = self.escape {
            ascii_byte("escape", escape)?;
        }
        if let Some(comment) = self.flags.comment {
            ascii_byte("comment", comment)?;
        }
        self.field_decoder()?;
        if self.delimiter == self.enclosure {
            return Err(ReaderError::InvalidConfiguration(format!(
                "delimiter and enclosure are both '{}'",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// Parser builder for this dialect. Width checks are left to the reader.
    pub(crate) fn reader_builder(&self) -> ReaderResult<csv::ReaderBuilder> {
        self.validate()?;

        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(ascii_byte("delimiter", self.delimiter)?)
            .quote(ascii_byte("enclosure", self.enclosure)?)
            .double_quote(self.flags.double_quote)
            .trim(if self.flags.trim { csv::Trim::All } else { csv::Trim::None });

        if let Some(escape) = self.escape {
            builder.escape(Some(ascii_byte("escape", escape)?));
        }
        if let Some(comment) = self.flags.comment {
            builder.comment(Some(ascii_byte("comment", comment)?));
        }
        Ok(builder)
    }

    /// Decoder for the configured encoding, or `None` when it must be detected.
    pub(crate) fn field_decoder(&self) -> ReaderResult<Option<FieldDecoder>> {
        match &self.encoding {
            Some(label) => encoding::resolve(label)
                .map(|e| Some(FieldDecoder::configured(e)))
                .ok_or_else(|| ReaderError::InvalidConfiguration(format!("unknown encoding \"{}\"", label))),
            None => Ok(None),
        }
    }
}

fn ascii_byte(name: &str, c: char) -> ReaderResult<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(ReaderError::InvalidConfiguration(format!(
            "{} '{}' is not a single-byte ASCII character",
            name, c
        )))
    }
}

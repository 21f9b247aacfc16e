//! Source character encodings.
//!
//! Fields are parsed as raw bytes and decoded afterwards, so a Latin-1 or
//! Windows-1252 export imports instead of failing on its first accented
//! character.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use std::io::{self, Read, Seek, SeekFrom};

/// Bytes inspected when guessing the encoding of a source.
pub const DETECTION_SAMPLE_LEN: usize = 64 * 1024;

/// Look up an encoding by its WHATWG label (`utf-8`, `latin1`, `cp1252`, ...).
pub fn resolve(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Guess the encoding of a byte sample with chardet.
///
/// Valid UTF-8 (ASCII included) is always taken as UTF-8. A sample cut in the
/// middle of a multi-byte sequence still counts as valid.
pub fn detect(sample: &[u8]) -> &'static Encoding {
    match std::str::from_utf8(sample) {
        Ok(_) => return UTF_8,
        Err(e) if e.error_len().is_none() => return UTF_8,
        Err(_) => {}
    }

    let (charset, _, _) = chardet::detect(sample);
    match resolve(chardet::charset2encoding(&charset)) {
        Some(encoding) if encoding != UTF_8 => encoding,
        _ => WINDOWS_1252,
    }
}

/// Read up to [`DETECTION_SAMPLE_LEN`] bytes, then seek back to the start.
pub fn sample<R: Read + Seek>(source: &mut R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(DETECTION_SAMPLE_LEN);
    source.by_ref().take(DETECTION_SAMPLE_LEN as u64).read_to_end(&mut buf)?;
    source.seek(SeekFrom::Start(0))?;
    Ok(buf)
}

/// Turns raw field bytes into text.
#[derive(Debug, Clone, Copy)]
pub struct FieldDecoder {
    encoding: &'static Encoding,
    /// Used for fields that are not valid in `encoding`, when set.
    fallback: Option<&'static Encoding>,
}

impl Default for FieldDecoder {
    fn default() -> Self {
        Self::detected(UTF_8)
    }
}

impl FieldDecoder {
    /// Decoder for an encoding named in the configuration. Malformed
    /// sequences become U+FFFD.
    pub fn configured(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            fallback: None,
        }
    }

    /// Decoder for a guessed encoding. A source detected as UTF-8 may still
    /// carry the odd Windows-1252 row further down than the sample reached.
    pub fn detected(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            fallback: (encoding == UTF_8).then_some(WINDOWS_1252),
        }
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        if let Some(fallback) = self.fallback {
            if let Some(text) = self.encoding.decode_without_bom_handling_and_without_replacement(bytes) {
                return text;
            }
            return fallback.decode_without_bom_handling(bytes).0;
        }
        self.encoding.decode_without_bom_handling(bytes).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_resolve_labels() {
        assert_eq!(resolve("utf-8"), Some(UTF_8));
        assert_eq!(resolve(" CP1252 "), Some(WINDOWS_1252));
        assert_eq!(resolve("latin1"), Some(WINDOWS_1252));
        assert_eq!(resolve("klingon"), None);
    }

    #[test]
    fn test_detect_utf8() {
        assert_eq!(detect(b"name,city\nAda,London\n"), UTF_8);
        assert_eq!(detect("Zürich".as_bytes()), UTF_8);
        // Truncated two-byte sequence at the end of the sample
        assert_eq!(detect(&"Zü".as_bytes()[..2]), UTF_8);
    }

    #[test]
    fn test_detect_single_byte_source() {
        let encoding = detect(b"name,city\nJos\xe9,Z\xfcrich\nFran\xe7ois,Li\xe8ge\n");
        assert_ne!(encoding, UTF_8);
        assert_eq!(FieldDecoder::detected(encoding).decode(b"Jos\xe9").chars().count(), 4);
    }

    #[test]
    fn test_detected_utf8_falls_back_per_field() {
        let decoder = FieldDecoder::detected(UTF_8);
        assert_eq!(decoder.decode("Zürich".as_bytes()), "Zürich");
        assert_eq!(decoder.decode(b"Z\xfcrich"), "Zürich");
    }

    #[test]
    fn test_configured_encoding_replaces_malformed() {
        let utf8 = FieldDecoder::configured(UTF_8);
        assert_eq!(utf8.decode(b"Jos\xe9"), "Jos\u{FFFD}");

        let latin = FieldDecoder::configured(WINDOWS_1252);
        assert_eq!(latin.decode(b"Jos\xe9"), "José");
    }

    #[test]
    fn test_sample_rewinds_source() {
        let mut source = Cursor::new(b"abc".to_vec());
        assert_eq!(sample(&mut source).unwrap(), b"abc");
        assert_eq!(source.position(), 0);
    }
}

// Encoding + delimiter detection for price list files
//
// Encoding is guessed from the first SNIFF_LEN bytes: BOM first, then a UTF-8
// validity check, then chardet's statistical guess. The delimiter comes from
// the first decoded line only.

use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Bytes inspected when guessing the encoding
pub const SNIFF_LEN: usize = 10_000;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("no known encoding for detected charset '{label}'")]
    UnknownEncoding { label: String },

    #[error("file is not valid {encoding} text")]
    Decode { encoding: &'static str },
}

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Semicolon,
}

impl Delimiter {
    pub fn as_byte(&self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte() as char)
    }
}

/// How to read one file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileFormat {
    pub encoding: &'static Encoding,
    pub delimiter: Delimiter,
}

/// File contents decoded to UTF-8 plus the format used
#[derive(Debug, Clone)]
pub struct DecodedFile {
    pub text: String,
    pub format: FileFormat,
}

// ============================================================================
// PURE DETECTION
// ============================================================================

/// Guess the text encoding of a file from its leading bytes.
pub fn sniff_encoding(prefix: &[u8]) -> Result<&'static Encoding, DetectError> {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(prefix) {
        return Ok(encoding);
    }

    if is_utf8_prefix(prefix) {
        return Ok(UTF_8);
    }

    let (charset, confidence, _language) = chardet::detect(&prefix.to_vec());
    debug!(charset = %charset, confidence, "chardet guess");

    let label = chardet::charset2encoding(&charset);
    Encoding::for_label(label.as_bytes()).ok_or_else(|| DetectError::UnknownEncoding {
        label: charset.clone(),
    })
}

/// Semicolon only when the line has a semicolon and no comma.
pub fn detect_delimiter(first_line: &str) -> Delimiter {
    if first_line.contains(';') && !first_line.contains(',') {
        Delimiter::Semicolon
    } else {
        Delimiter::Comma
    }
}

/// Encoding and delimiter from the leading bytes of a file.
/// The prefix may end mid-line or mid-character; only the first line matters.
pub fn detect_format(prefix: &[u8]) -> Result<FileFormat, DetectError> {
    let encoding = sniff_encoding(prefix)?;
    let (sample, _, _) = encoding.decode(prefix);
    let first_line = sample.lines().next().unwrap_or("");

    Ok(FileFormat {
        encoding,
        delimiter: detect_delimiter(first_line),
    })
}

/// Strict decode: malformed sequences are an error, a leading BOM is dropped.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> Result<String, DetectError> {
    let body = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        _ => bytes,
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
        .ok_or(DetectError::Decode {
            encoding: encoding.name(),
        })
}

/// Valid UTF-8, allowing a multi-byte sequence cut off at the end of the prefix.
fn is_utf8_prefix(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

// ============================================================================
// FILE ACCESS
// ============================================================================

/// Read a file, detect its format from the first SNIFF_LEN bytes and decode it.
pub fn read_price_file(path: &Path) -> Result<DecodedFile, DetectError> {
    let bytes = std::fs::read(path)?;
    let prefix = &bytes[..bytes.len().min(SNIFF_LEN)];

    let format = detect_format(prefix)?;
    let text = decode(&bytes, format.encoding)?;

    debug!(
        file = %path.display(),
        encoding = format.encoding.name(),
        delimiter = %format.delimiter,
        "detected file format"
    );

    Ok(DecodedFile { text, format })
}

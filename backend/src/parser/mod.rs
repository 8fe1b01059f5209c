//! Minimal CSV parser for the RKI hospitalization export.
//!
//! Splits on newlines and on a single delimiter character. There is no
//! quoting or escaping: a field containing the delimiter shifts every later
//! column of that row. Values are zipped to the header positionally and the
//! longer side is truncated.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{SourceError, SourceResult};

/// One CSV data row, keyed by header name.
pub type RawRecord = HashMap<String, String>;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed records
    pub records: Vec<RawRecord>,
    /// Detected or used encoding
    pub encoding: String,
    /// Delimiter used
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

/// Parse CSV text into records.
///
/// The first line is the header. Every line is trimmed before splitting, and
/// blank lines are skipped.
///
/// # Example
/// ```
/// use hospit::parse_csv;
///
/// let rows = parse_csv("Bundesland,Datum\nBayern,2021-11-20", ',');
///
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0]["Bundesland"], "Bayern");
/// ```
pub fn parse_csv(text: &str, delimiter: char) -> Vec<RawRecord> {
    let (headers, rows) = split_rows(text, delimiter);

    rows.map(|values| {
        headers
            .iter()
            .zip(values)
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect()
    })
    .collect()
}

/// Header names of a CSV text (empty for empty input).
pub fn parse_headers(text: &str, delimiter: char) -> Vec<String> {
    split_rows(text, delimiter)
        .0
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn split_rows(
    text: &str,
    delimiter: char,
) -> (Vec<&str>, impl Iterator<Item = std::str::Split<'_, char>>) {
    let mut lines = text.split('\n').map(str::trim).filter(|l| !l.is_empty());

    let headers = lines
        .next()
        .map(|line| line.split(delimiter).collect::<Vec<_>>())
        .unwrap_or_default();

    (headers, lines.map(move |line| line.split(delimiter)))
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> SourceResult<String> {
    let codec = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => encoding_rs::UTF_8,
        // Browsers treat latin-1 as windows-1252, and so does encoding_rs
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252
        }
        other => encoding_rs::Encoding::for_label(other.as_bytes())
            .ok_or_else(|| SourceError::Encoding(format!("unsupported encoding '{other}'")))?,
    };

    // Invalid sequences become U+FFFD rather than failing the whole file.
    let (text, _, _) = codec.decode(bytes);
    Ok(text.into_owned())
}

/// Parse CSV bytes, detecting the encoding.
pub fn parse_bytes(bytes: &[u8], delimiter: char) -> SourceResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;

    Ok(parse_string_with_metadata(&content, delimiter, encoding))
}

/// Parse a CSV file from disk, detecting the encoding.
pub fn parse_csv_file<P: AsRef<Path>>(path: P, delimiter: char) -> SourceResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, delimiter)
}

/// Parse CSV text and return metadata alongside the records.
pub fn parse_string_with_metadata(content: &str, delimiter: char, encoding: String) -> ParseResult {
    ParseResult {
        records: parse_csv(content, delimiter),
        encoding,
        delimiter,
        headers: parse_headers(content, delimiter),
    }
}

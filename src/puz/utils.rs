//! Text encoding and table-format helpers shared by the codec and the
//! extension views.

use std::borrow::Cow;
use std::collections::BTreeMap;

use encoding_rs::Encoding;

use super::types::error::{PuzError, Result};

/// Decodes `bytes` strictly; malformed input is an error rather than U+FFFD.
pub fn decode_text(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| {
            PuzError::Encoding(format!(
                "{} bytes are not valid {}",
                bytes.len(),
                encoding.name()
            ))
        })
}

/// Encodes `text`, failing on characters the encoding cannot represent.
pub fn encode_text<'a>(text: &'a str, encoding: &'static Encoding) -> Result<Cow<'a, [u8]>> {
    let (bytes, _, had_unmappable) = encoding.encode(text);
    if had_unmappable {
        return Err(PuzError::Encoding(format!(
            "{:?} cannot be represented in {}",
            text,
            encoding.name()
        )));
    }
    Ok(bytes)
}

/// Parses the `idx:text;idx:text;` table format used by rebus extensions.
///
/// Entries without a `:` are skipped. Indices may be padded with spaces.
pub fn parse_table(text: &str) -> Result<BTreeMap<u8, String>> {
    text.split(';')
        .filter_map(|entry| entry.split_once(':'))
        .map(|(key, value)| {
            let key = key.trim().parse::<u8>().map_err(|e| {
                PuzError::InvalidFormat(format!("Invalid table index {:?}: {}", key, e))
            })?;
            Ok((key, value.to_string()))
        })
        .collect()
}

/// Formats a table as `idx:text;` entries, always ending with `;`.
pub fn format_table(table: &BTreeMap<u8, String>) -> String {
    table
        .iter()
        .map(|(key, value)| format!("{}:{};", key, value))
        .collect()
}

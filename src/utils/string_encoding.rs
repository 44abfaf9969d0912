// src/utils/string_encoding.rs

/// Decode a null-padded, fixed-capacity string field.
///
/// Everything from the first NUL onwards is padding. Invalid UTF-8 is
/// replaced rather than rejected; names come from acquisition software and
/// are often Latin-1.
pub fn decode_fixed_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

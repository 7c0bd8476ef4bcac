use crate::foundation::{Hash32, UrnaError};

pub fn decode_hex(s: &str) -> Result<Vec<u8>, UrnaError> {
    hex::decode(s).map_err(|e| e.into())
}

/// Parses a 32-byte value from hex, tolerating an optional `0x` prefix and surrounding whitespace.
pub fn parse_hex_32bytes(s: &str) -> Result<Hash32, UrnaError> {
    let trimmed = s.trim();
    let stripped = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")).unwrap_or(trimmed);
    let bytes = decode_hex(stripped)?;
    bytes.as_slice().try_into().map_err(|_| UrnaError::EncodingError(format!("expected 32 bytes, got {}", bytes.len())))
}

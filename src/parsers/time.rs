use memchr::memchr;

use crate::error::FormatError;

/// Parse `M:SS.s` into total seconds.
///
/// Each part must be a run of ASCII digits. Parts are not range-checked, so
/// `"0:75.0"` is 75 seconds and `"1:00.15"` is 61.5.
pub fn parse_time(text: &str) -> Result<f64, FormatError> {
    let bytes = text.as_bytes();

    let colon = memchr(b':', bytes).ok_or_else(|| FormatError::new(text, "missing ':' separator"))?;
    let (minutes, rest) = (&bytes[..colon], &bytes[colon + 1..]);
    if memchr(b':', rest).is_some() {
        return Err(FormatError::new(text, "more than one ':' separator"));
    }

    let dot = memchr(b'.', rest).ok_or_else(|| FormatError::new(text, "missing '.' separator"))?;
    let (seconds, tenths) = (&rest[..dot], &rest[dot + 1..]);
    if memchr(b'.', tenths).is_some() {
        return Err(FormatError::new(text, "more than one '.' separator"));
    }

    let minutes = parse_digits(text, minutes)?;
    let seconds = parse_digits(text, seconds)?;
    let tenths = parse_digits(text, tenths)?;

    let whole = minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(|| FormatError::new(text, "value out of range"))?;
    Ok(whole as f64 + tenths as f64 / 10.0)
}

#[inline]
fn parse_digits(text: &str, part: &[u8]) -> Result<u64, FormatError> {
    if part.is_empty() {
        return Err(FormatError::new(text, "empty component"));
    }
    let mut acc = 0u64;
    for &b in part {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return Err(FormatError::new(text, "component is not an integer"));
        }
        acc = acc
            .checked_mul(10)
            .and_then(|a| a.checked_add(d as u64))
            .ok_or_else(|| FormatError::new(text, "value out of range"))?;
    }
    Ok(acc)
}

//! Two-digit hex representation of a normalized channel value.
//!
//! A value `v` in [0, 1] is shown as `round(255 * v)` in uppercase hex,
//! zero padded to two digits. Decoding accepts either case and yields
//! `byte / 255`.

use crate::error::HexError;

/// Quantize a normalized value to a byte. Out-of-range input is clamped and
/// NaN maps to 0.
pub fn to_byte(value: f64) -> u8 {
  (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn encode(value: f64) -> String {
  format!("{:02X}", to_byte(value))
}

/// Parse exactly two hex digits (surrounding whitespace ignored).
pub fn decode_byte(text: &str) -> Result<u8, HexError> {
  let text = text.trim();
  if text.is_empty() {
    return Err(HexError::Empty);
  }
  let len = text.chars().count();
  if len != 2 {
    return Err(HexError::InvalidLength(len));
  }
  // from_str_radix would take a leading '+'
  if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
    return Err(HexError::InvalidDigit(text.to_string()));
  }
  u8::from_str_radix(text, 16).map_err(|_| HexError::InvalidDigit(text.to_string()))
}

pub fn decode(text: &str) -> Result<f64, HexError> {
  decode_byte(text).map(|byte| f64::from(byte) / 255.0)
}

/// Decode, substituting `fallback` for malformed text.
pub fn decode_or(text: &str, fallback: f64) -> f64 {
  decode(text).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encodes_reference_points() {
    assert_eq!(encode(0.0), "00");
    assert_eq!(encode(1.0), "FF");
    assert_eq!(encode(0.5), "80");
    assert_eq!(encode(10.0 / 255.0), "0A");
  }

  #[test]
  fn encode_clamps() {
    assert_eq!(encode(-0.3), "00");
    assert_eq!(encode(1.7), "FF");
    assert_eq!(encode(f64::NAN), "00");
  }

  #[test]
  fn decodes_either_case() {
    assert_eq!(decode("FF"), Ok(1.0));
    assert_eq!(decode("ff"), Ok(1.0));
    assert_eq!(decode(" 00 "), Ok(0.0));
    assert_eq!(decode_byte("7f"), Ok(0x7F));
  }

  #[test]
  fn rejects_malformed_text() {
    assert_eq!(decode(""), Err(HexError::Empty));
    assert_eq!(decode("1"), Err(HexError::InvalidLength(1)));
    assert_eq!(decode("100"), Err(HexError::InvalidLength(3)));
    assert_eq!(decode("ZZ"), Err(HexError::InvalidDigit("ZZ".into())));
    assert_eq!(decode("+F"), Err(HexError::InvalidDigit("+F".into())));
  }

  #[test]
  fn decode_or_falls_back() {
    assert_eq!(decode_or("ZZ", 0.0), 0.0);
    assert_eq!(decode_or("1", 0.25), 0.25);
    assert_eq!(decode_or("FF", 0.0), 1.0);
  }

  quickcheck::quickcheck! {
      fn hex_round_trips(byte: u8) -> bool {
          let text = format!("{byte:02X}");
          decode(&text).map(encode).as_deref() == Ok(text.as_str())
      }

      fn encoded_value_stays_within_one_step(raw: u32) -> bool {
          let value = f64::from(raw) / f64::from(u32::MAX);
          match decode(&encode(value)) {
              Ok(decoded) => (decoded - value).abs() <= 0.5 / 255.0 + 1e-12,
              Err(_) => false,
          }
      }
  }
}

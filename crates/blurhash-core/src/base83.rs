//! Base83 symbol packing used by the BlurHash format.
//!
//! Integers are written most-significant digit first over a fixed
//! 83-character alphabet. The alphabet avoids characters that need escaping
//! in HTML attributes and CSS, so a hash can be embedded as-is.

use crate::error::BlurhashError;

/// The 83-character alphabet used by BlurHash base83 encoding.
pub(crate) const ALPHABET: &[u8; 83] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz#$%*+,-.:;=?@[]^_{|}~";

/// Lookup table mapping ASCII byte values to their base83 digit value.
/// Invalid characters map to `255`.
const fn build_decode_lut() -> [u8; 128] {
    let mut lut = [255u8; 128];
    let mut i = 0;
    while i < 83 {
        lut[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    lut
}

static DECODE_LUT: [u8; 128] = build_decode_lut();

/// Decode a base83 string into an integer.
///
/// # Errors
///
/// Returns [`BlurhashError::InvalidBase83Character`] if the string contains
/// a character not in the alphabet, and [`BlurhashError::InvalidArgument`]
/// if the value does not fit in a `u64`.
///
/// # Examples
///
/// ```
/// use blurhash_core::base83::decode;
/// assert_eq!(decode("0").unwrap(), 0);
/// assert_eq!(decode("~").unwrap(), 82);
/// ```
pub fn decode(base83_str: &str) -> Result<u64, BlurhashError> {
    base83_str.chars().try_fold(0u64, |value, ch| {
        let digit = digit_of(ch)?;
        value
            .checked_mul(83)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| {
                BlurhashError::InvalidArgument(format!(
                    "base83 value overflow decoding {base83_str:?}"
                ))
            })
    })
}

fn digit_of(ch: char) -> Result<u64, BlurhashError> {
    if !ch.is_ascii() {
        return Err(BlurhashError::InvalidBase83Character(ch));
    }
    match DECODE_LUT[ch as usize] {
        255 => Err(BlurhashError::InvalidBase83Character(ch)),
        digit => Ok(digit as u64),
    }
}

/// Encode an integer into a base83 string of exactly `length` symbols.
///
/// # Errors
///
/// Returns [`BlurhashError::InvalidArgument`] if `length` is zero or the
/// value cannot be represented in `length` symbols (`value >= 83^length`).
///
/// # Examples
///
/// ```
/// use blurhash_core::base83::encode;
/// assert_eq!(encode(0, 1).unwrap(), "0");
/// assert_eq!(encode(82, 1).unwrap(), "~");
/// assert_eq!(encode(83, 2).unwrap(), "10");
/// ```
pub fn encode(value: u64, length: usize) -> Result<String, BlurhashError> {
    if length == 0 {
        return Err(BlurhashError::InvalidArgument(
            "base83 length must be at least 1".to_string(),
        ));
    }
    // 83^length is the first value that does NOT fit; anything past u64 always fits.
    let fits = u32::try_from(length)
        .ok()
        .and_then(|len| 83u64.checked_pow(len))
        .map_or(true, |limit| value < limit);
    if !fits {
        return Err(BlurhashError::InvalidArgument(format!(
            "value {value} is too large for {length} base83 digits"
        )));
    }

    let mut result = vec![b'0'; length];
    let mut remaining = value;
    for slot in result.iter_mut().rev() {
        *slot = ALPHABET[(remaining % 83) as usize];
        remaining /= 83;
    }
    Ok(result.into_iter().map(char::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_single_chars() {
        assert_eq!(decode("0").unwrap(), 0);
        assert_eq!(decode("1").unwrap(), 1);
        assert_eq!(decode("~").unwrap(), 82);
    }

    #[test]
    fn test_encode_single_chars() {
        assert_eq!(encode(0, 1).unwrap(), "0");
        assert_eq!(encode(1, 1).unwrap(), "1");
        assert_eq!(encode(82, 1).unwrap(), "~");
    }

    #[test]
    fn test_encode_with_padding() {
        assert_eq!(encode(0, 4).unwrap(), "0000");
        assert_eq!(encode(1, 4).unwrap(), "0001");
    }

    #[test]
    fn test_decode_multi_char() {
        // "10" in base83 = 1*83 + 0 = 83
        assert_eq!(decode("10").unwrap(), 83);
        assert_eq!(decode("00").unwrap(), 0);
    }

    #[test]
    fn test_decode_invalid_char() {
        assert_eq!(decode(" "), Err(BlurhashError::InvalidBase83Character(' ')));
        assert_eq!(decode("a!"), Err(BlurhashError::InvalidBase83Character('!')));
        assert_eq!(decode("é"), Err(BlurhashError::InvalidBase83Character('é')));
    }

    #[test]
    fn test_decode_overflow() {
        let long = "~".repeat(20);
        assert!(matches!(
            decode(&long),
            Err(BlurhashError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_encode_value_too_large() {
        assert!(encode(83, 1).is_err());
        assert!(encode(83 * 83, 2).is_err());
        assert!(encode(83 * 83 - 1, 2).is_ok());
    }

    #[test]
    fn test_encode_zero_length() {
        assert!(matches!(
            encode(0, 0),
            Err(BlurhashError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_alphabet_completeness() {
        for (i, &ch) in ALPHABET.iter().enumerate() {
            let s = String::from(ch as char);
            assert_eq!(decode(&s).unwrap(), i as u64);
        }
    }

    proptest! {
        #[test]
        fn roundtrip_within_length(length in 1usize..=6, seed in any::<u64>()) {
            let limit = 83u64.pow(length as u32);
            let value = seed % limit;
            let encoded = encode(value, length).unwrap();
            prop_assert_eq!(encoded.len(), length);
            prop_assert_eq!(decode(&encoded).unwrap(), value);
        }
    }
}

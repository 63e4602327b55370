//! Text to bits and back, eight bits per character, most significant bit first.

use crate::cs::ecc::{Bits, Result, Word};
use crate::cs::error::Error;
use bitvec::prelude::*;

/// Bits per character
pub const CHAR_BITS: usize = 8;

/// Converts text to bits. Only characters up to U+00FF fit in eight bits.
///
/// # Examples
///
/// ```rust
/// use bitvec::prelude::*;
/// use channel_codes::cs::ecc::message::text_to_bits;
///
/// assert_eq!(text_to_bits("A").unwrap(), bitvec![u8, Msb0; 0, 1, 0, 0, 0, 0, 0, 1]);
/// ```
pub fn text_to_bits(text: &str) -> Result<Word> {
    let mut bits = Word::with_capacity(text.len() * CHAR_BITS);
    for ch in text.chars() {
        let byte = u8::try_from(ch).map_err(|_| {
            Error::InvalidInput(format!(
                "Character {:?} does not fit in {} bits",
                ch, CHAR_BITS
            ))
        })?;
        bits.extend_from_bitslice(byte.view_bits::<Msb0>());
    }
    Ok(bits)
}

/// Converts bits back to text, one character per eight bits
pub fn bits_to_text(bits: &Bits) -> Result<String> {
    if bits.len() % CHAR_BITS != 0 {
        return Err(Error::DimensionMismatch {
            expected: bits.len().div_ceil(CHAR_BITS) * CHAR_BITS,
            actual: bits.len(),
        });
    }

    Ok(bits
        .chunks(CHAR_BITS)
        .map(|chunk| char::from(chunk.load_be::<u8>()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let bits = text_to_bits("Hi!").unwrap();
        assert_eq!(bits.len(), 24);
        assert_eq!(&bits[..8], bits![u8, Msb0; 0, 1, 0, 0, 1, 0, 0, 0]);
        assert_eq!(bits_to_text(&bits).unwrap(), "Hi!");
    }

    #[test]
    fn test_latin1() {
        let bits = text_to_bits("é").unwrap();
        assert_eq!(bits, bitvec![u8, Msb0; 1, 1, 1, 0, 1, 0, 0, 1]);
        assert_eq!(bits_to_text(&bits).unwrap(), "é");
    }

    #[test]
    fn test_empty() {
        assert!(text_to_bits("").unwrap().is_empty());
        assert_eq!(bits_to_text(Word::new().as_bitslice()).unwrap(), "");
    }

    #[test]
    fn test_rejects_wide_characters() {
        assert!(matches!(text_to_bits("€"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_partial_character() {
        assert!(matches!(
            bits_to_text(bits![u8, Msb0; 0, 1, 0, 0, 0, 0, 1]),
            Err(Error::DimensionMismatch {
                expected: 8,
                actual: 7
            })
        ));
    }
}

//! Extended (modified) Hamming code.
//!
//! Appends one overall-parity bit to a Hamming codeword. The check matrix gains one row and one
//! column: the new row holds, for every column, the bit that makes the column's weight odd. The
//! extra redundant bit therefore equals the parity of the whole base codeword, and every column
//! of the extended matrix has odd weight.
//!
//! Decoding uses that property. A single error produces an odd-weight syndrome, which names the
//! column to flip. Two errors cancel in the overall-parity check but not in the Hamming checks,
//! producing a non-zero even-weight syndrome; the decoder reports those as
//! [`DecodeOutcome::UncorrectablePattern`] instead of flipping a third bit.

use crate::cs::ecc::gf2::BitMatrix;
use crate::cs::ecc::hamming::{self, syndrome_decode, HammingCode};
use crate::cs::ecc::{BlockCode, Bits, DecodeOutcome, Decoded, Result, Word};
use crate::cs::error::Error;
use std::fmt::{Display, Formatter};

/// Extends an r x n check matrix to (r + 1) x (n + 1).
///
/// The existing rows are copied, the new column starts at zero and the new row is filled with
/// `1 XOR (column weight mod 2)`.
pub fn extend_check_matrix(check_matrix: &BitMatrix) -> BitMatrix {
    let rows = check_matrix.row_count();
    let columns = check_matrix.column_count();
    let mut extended = BitMatrix::zeros(rows + 1, columns + 1);

    for (i, row) in check_matrix.rows().enumerate() {
        extended.row_mut(i)[..columns].copy_from_bitslice(row);
    }

    for column in 0..=columns {
        let weight = (0..rows).filter(|&row| extended.get(row, column)).count();
        extended.set(rows, column, weight % 2 == 0);
    }

    log::trace!("extended check matrix:\n{}", extended);
    extended
}

/// Hamming code with an extra overall-parity bit (SEC-DED)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedHammingCode {
    base: HammingCode,
    check_matrix: BitMatrix,
}

impl ExtendedHammingCode {
    /// Extends a Hamming code with `information_bits` information bits and
    /// `redundant_bits` base redundant bits
    pub fn new(information_bits: usize, redundant_bits: usize) -> Result<Self> {
        Ok(Self::from_base(HammingCode::new(information_bits, redundant_bits)?))
    }

    pub fn from_base(base: HammingCode) -> Self {
        let check_matrix = extend_check_matrix(base.check_matrix());
        ExtendedHammingCode { base, check_matrix }
    }

    /// Creates an extended (8,4) Hamming code
    pub fn extended_8_4() -> Self {
        Self::from_base(HammingCode::standard_7_4())
    }

    pub fn base(&self) -> &HammingCode {
        &self.base
    }

    pub fn check_matrix(&self) -> &BitMatrix {
        &self.check_matrix
    }

    /// Number of redundant bits, the overall-parity bit included
    pub fn redundant_bits(&self) -> usize {
        self.base.redundant_bits() + 1
    }

    /// Computes the syndrome of a received codeword against the extended matrix
    pub fn syndrome(&self, received: &Bits) -> Result<Word> {
        Error::check_len(self.codeword_len(), received.len())?;
        Ok(syndrome_decode(&self.check_matrix, received)?.syndrome)
    }

    /// Corrects a received codeword and returns it whole, redundancy included
    pub fn correct(&self, received: &Bits) -> Result<(Word, DecodeOutcome)> {
        Error::check_len(self.codeword_len(), received.len())?;

        let decoding = syndrome_decode(&self.check_matrix, received)?;
        let weight = decoding.syndrome.count_ones();

        if weight == 0 {
            return Ok((decoding.recovered, DecodeOutcome::NoErrorDetected));
        }

        if weight % 2 == 0 {
            log::warn!("{}: double error detected", self);
            return Ok((received.to_bitvec(), DecodeOutcome::UncorrectablePattern));
        }

        match decoding.error_position {
            Some(position) => {
                log::debug!("{}: corrected bit {}", self, position);
                Ok((decoding.recovered, DecodeOutcome::Corrected))
            }
            None => {
                log::warn!("{}: odd syndrome matches no column", self);
                Ok((received.to_bitvec(), DecodeOutcome::UncorrectablePattern))
            }
        }
    }
}

impl BlockCode for ExtendedHammingCode {
    fn information_len(&self) -> usize {
        self.base.information_bits()
    }

    fn codeword_len(&self) -> usize {
        self.base.total_bits() + 1
    }

    fn encode(&self, word: &Bits) -> Result<Word> {
        Error::check_len(self.information_len(), word.len())?;
        hamming::encode(&self.check_matrix, word)
    }

    fn decode(&self, codeword: &Bits) -> Result<Decoded> {
        let (mut recovered, outcome) = self.correct(codeword)?;
        recovered.truncate(self.information_len());
        Ok(Decoded::new(recovered, outcome))
    }
}

impl Display for ExtendedHammingCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ExtendedHamming({},{})",
            self.codeword_len(),
            self.information_len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitvec::prelude::*;

    fn flip(word: &Bits, positions: &[usize]) -> Word {
        let mut flipped = word.to_bitvec();
        for &position in positions {
            let bit = !flipped[position];
            flipped.set(position, bit);
        }
        flipped
    }

    #[test]
    fn test_extend_check_matrix() {
        let base = HammingCode::standard_7_4();
        let extended = extend_check_matrix(base.check_matrix());

        assert_eq!(extended.row_count(), 4);
        assert_eq!(extended.column_count(), 8);
        assert_eq!(
            extended.to_string(),
            "11011000\n10110100\n01110010\n11100001\n"
        );

        for column in 0..extended.column_count() {
            assert_eq!(extended.column(column).count_ones() % 2, 1);
        }
    }

    #[test]
    fn test_parity_bit_is_overall_parity() {
        let code = ExtendedHammingCode::extended_8_4();
        assert_eq!(code.redundant_bits(), 4);
        assert_eq!(code.to_string(), "ExtendedHamming(8,4)");

        for value in 0..16usize {
            let word: Word = (0..4).map(|i| (value >> (3 - i)) & 1 == 1).collect();
            let encoded = code.encode(&word).unwrap();
            let base = code.base().encode(&word).unwrap();

            assert_eq!(encoded[..7], base[..]);
            assert_eq!(encoded.count_ones() % 2, 0);
        }
    }

    #[test]
    fn test_single_errors_corrected() {
        let code = ExtendedHammingCode::new(11, 4).unwrap();
        let word = bitvec![u8, Msb0; 1, 0, 1, 1, 0, 0, 1, 0, 1, 1, 1];
        let encoded = code.encode(&word).unwrap();

        let decoded = code.decode(&encoded).unwrap();
        assert_eq!(decoded.outcome, DecodeOutcome::NoErrorDetected);

        for position in 0..code.codeword_len() {
            let decoded = code.decode(&flip(&encoded, &[position])).unwrap();
            assert_eq!(decoded.word, word);
            assert_eq!(decoded.outcome, DecodeOutcome::Corrected);
        }
    }

    #[test]
    fn test_double_errors_detected() {
        let code = ExtendedHammingCode::extended_8_4();
        let word = bitvec![u8, Msb0; 1, 0, 1, 1];
        let encoded = code.encode(&word).unwrap();

        for first in 0..code.codeword_len() {
            for second in first + 1..code.codeword_len() {
                let received = flip(&encoded, &[first, second]);
                let decoded = code.decode(&received).unwrap();
                assert_eq!(decoded.outcome, DecodeOutcome::UncorrectablePattern);
                assert_eq!(decoded.word, received[..4].to_bitvec());
                assert_eq!(code.syndrome(&received).unwrap().count_ones() % 2, 0);
            }
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let code = ExtendedHammingCode::extended_8_4();
        assert!(matches!(
            code.decode(bits![u8, Msb0; 1, 0, 1, 1, 0, 1, 0]),
            Err(Error::DimensionMismatch {
                expected: 8,
                actual: 7
            })
        ));
        assert!(ExtendedHammingCode::new(5, 3).is_err());
    }
}

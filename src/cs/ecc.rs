//! Error correction code implementations.
//!
//! This module provides binary block codes that add redundancy to a message so
//! that bit errors introduced in transit can be detected and, within stated
//! limits, corrected without retransmission:
//! - Hamming codes
//! - Extended (modified) Hamming codes with double-error detection
//! - Cyclic (polynomial) codes
//! - Iterative two-dimensional parity codes
//! - Block interleaving on top of any of the above
//!
//! # Error Correction Algorithms
//!
//! Every code works over GF(2): addition is XOR, multiplication is AND. A
//! decoder recomputes the redundancy of what it received, derives a syndrome,
//! maps the syndrome to a recovery pattern and XORs it in. What happened on the
//! channel is reported as a [`DecodeOutcome`]; only malformed inputs produce an
//! [`Error`](crate::cs::error::Error).
//!
//! Each code corrects at most one bit per codeword. Heavier damage may be
//! silently miscorrected; that is a property of the codes, not something the
//! decoders try to paper over.
//!
//! # Examples
//!
//! ```rust
//! use bitvec::prelude::*;
//! use channel_codes::cs::ecc::{BlockCode, DecodeOutcome};
//! use channel_codes::cs::ecc::hamming::HammingCode;
//!
//! let hamming = HammingCode::standard_7_4();
//! let message = bitvec![u8, Msb0; 1, 0, 1, 1];
//!
//! let mut codeword = hamming.encode(&message).unwrap();
//! let flipped = !codeword[2];
//! codeword.set(2, flipped);
//!
//! let decoded = hamming.decode(&codeword).unwrap();
//! assert_eq!(decoded.word, message);
//! assert_eq!(decoded.outcome, DecodeOutcome::Corrected);
//! ```

use bitvec::prelude::*;

pub use crate::cs::error::Result;

/// An owned sequence of bits. Index 0 is transmitted first and, read as a
/// polynomial, is the highest-degree coefficient.
pub type Word = BitVec<u8, Msb0>;

/// A borrowed sequence of bits
pub type Bits = BitSlice<u8, Msb0>;

/// What a decoder concluded about a received codeword.
///
/// Variants are ordered by severity, so the outcome of several blocks is the
/// maximum of the individual outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DecodeOutcome {
    /// The syndrome was zero
    NoErrorDetected,
    /// A single-bit error was located and flipped back
    Corrected,
    /// The syndrome describes a pattern the code cannot correct; the word is
    /// returned as received
    UncorrectablePattern,
    /// The received parity is inconsistent in a way only a resend can fix
    RequestRetransmission,
}

impl DecodeOutcome {
    /// Whether the decoded word can be handed on without further action
    pub fn is_trusted(self) -> bool {
        matches!(self, DecodeOutcome::NoErrorDetected | DecodeOutcome::Corrected)
    }
}

/// The information word recovered by a decoder together with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub word: Word,
    pub outcome: DecodeOutcome,
}

impl Decoded {
    pub fn new(word: Word, outcome: DecodeOutcome) -> Self {
        Decoded { word, outcome }
    }
}

/// Trait for fixed-size binary block codes
pub trait BlockCode: Send + Sync {
    /// Number of information bits per codeword (k)
    fn information_len(&self) -> usize;

    /// Total number of bits per codeword (n)
    fn codeword_len(&self) -> usize;

    /// Number of redundant bits per codeword (n - k)
    fn redundancy_len(&self) -> usize {
        self.codeword_len() - self.information_len()
    }

    /// Encode exactly `information_len()` bits into a codeword
    fn encode(&self, word: &Bits) -> Result<Word>;

    /// Decode exactly `codeword_len()` bits, correcting what the code allows
    fn decode(&self, codeword: &Bits) -> Result<Decoded>;
}

/// GF(2) vector, matrix and polynomial primitives
pub mod gf2;
pub use gf2::{poly_degree, poly_offset, poly_remainder, row_sum, BitMatrix};

/// Hamming codes
pub mod hamming;
pub use hamming::{build_check_matrix, HammingCode};

/// Extended Hamming codes with an overall-parity row
pub mod extended_hamming;
pub use extended_hamming::{extend_check_matrix, ExtendedHammingCode};

/// Cyclic (polynomial) codes
pub mod cyclic;
pub use cyclic::{build_generating_matrix, CyclicCode};

/// Iterative two-dimensional parity codes
pub mod iterative;
pub use iterative::{IterativeCode, ParityGrid};

/// Block interleaving
pub mod interleaving;
pub use interleaving::{deinterleave, interleave, BlockInterleaver};

/// Conversion between text and bit words
pub mod message;
pub use message::{bits_to_text, text_to_bits};

/// Split a codeword into its information segment
pub fn information_part(codeword: &Bits, information_len: usize) -> &Bits {
    &codeword[..information_len.min(codeword.len())]
}

/// Split a codeword into its redundant segment
pub fn redundant_part(codeword: &Bits, information_len: usize) -> &Bits {
    &codeword[information_len.min(codeword.len())..]
}

/// Render a codeword as `0`/`1` digits with a `|` between information and
/// redundancy, e.g. `1011|010`
pub fn format_codeword(codeword: &Bits, information_len: usize) -> String {
    let mut out = String::with_capacity(codeword.len() + 1);
    for (i, bit) in codeword.iter().by_vals().enumerate() {
        if i == information_len {
            out.push('|');
        }
        out.push(if bit { '1' } else { '0' });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_severity() {
        assert!(DecodeOutcome::NoErrorDetected < DecodeOutcome::Corrected);
        assert!(DecodeOutcome::Corrected < DecodeOutcome::UncorrectablePattern);
        assert!(DecodeOutcome::UncorrectablePattern < DecodeOutcome::RequestRetransmission);

        let worst = [DecodeOutcome::Corrected, DecodeOutcome::NoErrorDetected]
            .into_iter()
            .max()
            .unwrap();
        assert_eq!(worst, DecodeOutcome::Corrected);
    }

    #[test]
    fn test_outcome_trust() {
        assert!(DecodeOutcome::NoErrorDetected.is_trusted());
        assert!(DecodeOutcome::Corrected.is_trusted());
        assert!(!DecodeOutcome::UncorrectablePattern.is_trusted());
        assert!(!DecodeOutcome::RequestRetransmission.is_trusted());
    }

    #[test]
    fn test_codeword_parts() {
        let codeword = bitvec![u8, Msb0; 1, 0, 1, 1, 0, 1, 0];
        assert_eq!(information_part(&codeword, 4), bits![u8, Msb0; 1, 0, 1, 1]);
        assert_eq!(redundant_part(&codeword, 4), bits![u8, Msb0; 0, 1, 0]);
        assert_eq!(format_codeword(&codeword, 4), "1011|010");
    }

    #[test]
    fn test_format_without_redundancy() {
        let word = bitvec![u8, Msb0; 1, 1, 0];
        assert_eq!(format_codeword(&word, 3), "110");
    }
}

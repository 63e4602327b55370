//! Hamming error correction code implementation.
//!
//! Hamming codes are a family of linear error-correcting codes developed by Richard Hamming in
//! 1950. They correct any single-bit error in a codeword. The most common variant is the (7,4)
//! Hamming code, which encodes 4 information bits into 7 bits by adding 3 redundant bits.
//!
//! This implementation is systematic: a codeword is the information word followed by its
//! redundancy. The redundancy is defined by an r x n check matrix whose row i lists the
//! information positions covered by redundant bit i. Column j of the check matrix is the
//! signature a single error at position j leaves in the syndrome, so every column is non-zero
//! and all columns are distinct.
//!
//! With two or more errors in one codeword the syndrome can still match some column, in which
//! case the decoder flips the wrong bit. That is the code's limit, not a decoder bug; use
//! [`ExtendedHammingCode`](crate::cs::ecc::extended_hamming::ExtendedHammingCode) to detect
//! double errors.
//!
//! # Applications
//!
//! - Computer memory (ECC RAM)
//! - Satellite communications
//! - Burst-tolerant transmission when combined with interleaving

use crate::cs::ecc::gf2::{row_sum, BitMatrix};
use crate::cs::ecc::{BlockCode, Bits, DecodeOutcome, Decoded, Result, Word};
use crate::cs::error::Error;
use bitvec::prelude::*;
use std::fmt::{Display, Formatter};

/// Represents a Hamming code configuration.
/// A Hamming(n,k) code encodes k information bits with r = n - k redundant bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HammingCode {
    /// Number of information bits per block
    information_bits: usize,
    /// Number of redundant bits per block
    redundant_bits: usize,
    /// r x n check matrix
    check_matrix: BitMatrix,
}

impl HammingCode {
    /// Creates a new Hamming code configuration.
    ///
    /// # Arguments
    ///
    /// * `information_bits` - Number of information bits in each block (k)
    /// * `redundant_bits` - Number of redundant bits in each block (r)
    ///
    /// # Returns
    ///
    /// A new `HammingCode` instance, or an error if r redundant bits cannot give every
    /// position of the codeword a distinct signature
    pub fn new(information_bits: usize, redundant_bits: usize) -> Result<Self> {
        let check_matrix = build_check_matrix(information_bits, redundant_bits)?;

        Ok(HammingCode {
            information_bits,
            redundant_bits,
            check_matrix,
        })
    }

    /// Creates a Hamming code with the fewest redundant bits able to protect
    /// `information_bits`
    pub fn for_information_bits(information_bits: usize) -> Result<Self> {
        if information_bits == 0 {
            return Err(Error::invalid_input("Information bits must be positive"));
        }

        // Smallest r with 2^r - r - 1 >= k
        let mut redundant_bits = 2;
        while max_information_bits(redundant_bits) < information_bits {
            redundant_bits += 1;
        }

        Self::new(information_bits, redundant_bits)
    }

    /// Creates a standard (7,4) Hamming code
    pub fn standard_7_4() -> Self {
        HammingCode {
            information_bits: 4,
            redundant_bits: 3,
            check_matrix: fill_check_matrix(4, 3),
        }
    }

    pub fn information_bits(&self) -> usize {
        self.information_bits
    }

    pub fn redundant_bits(&self) -> usize {
        self.redundant_bits
    }

    /// Gets the total code word length (information bits + redundant bits)
    pub fn total_bits(&self) -> usize {
        self.information_bits + self.redundant_bits
    }

    pub fn check_matrix(&self) -> &BitMatrix {
        &self.check_matrix
    }

    /// Computes the syndrome of a received codeword
    pub fn syndrome(&self, received: &Bits) -> Result<Word> {
        Error::check_len(self.total_bits(), received.len())?;

        let (information, redundancy) = received.split_at(self.information_bits);
        let calculated = calculate_redundancy(&self.check_matrix, information)?;
        syndrome(redundancy, &calculated)
    }

    /// Corrects a received codeword and returns it whole, redundancy included
    pub fn correct(&self, received: &Bits) -> Result<(Word, DecodeOutcome)> {
        Error::check_len(self.total_bits(), received.len())?;

        let decoding = syndrome_decode(&self.check_matrix, received)?;
        let outcome = match (decoding.syndrome.any(), decoding.error_position) {
            (false, _) => DecodeOutcome::NoErrorDetected,
            (true, Some(position)) => {
                log::debug!("{}: corrected bit {}", self, position);
                DecodeOutcome::Corrected
            }
            (true, None) => {
                log::warn!(
                    "{}: syndrome {} matches no column",
                    self,
                    crate::cs::ecc::format_codeword(&decoding.syndrome, decoding.syndrome.len())
                );
                DecodeOutcome::UncorrectablePattern
            }
        };

        Ok((decoding.recovered, outcome))
    }
}

impl BlockCode for HammingCode {
    fn information_len(&self) -> usize {
        self.information_bits
    }

    fn codeword_len(&self) -> usize {
        self.total_bits()
    }

    fn encode(&self, word: &Bits) -> Result<Word> {
        Error::check_len(self.information_bits, word.len())?;
        encode(&self.check_matrix, word)
    }

    fn decode(&self, codeword: &Bits) -> Result<Decoded> {
        let (mut recovered, outcome) = self.correct(codeword)?;
        recovered.truncate(self.information_bits);
        Ok(Decoded::new(recovered, outcome))
    }
}

impl Display for HammingCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hamming({},{})", self.total_bits(), self.information_bits)
    }
}

/// Largest number of information bits that `redundant_bits` redundant bits can protect:
/// 2^r - r - 1
pub fn max_information_bits(redundant_bits: usize) -> usize {
    if redundant_bits >= usize::BITS as usize {
        return usize::MAX;
    }
    (1usize << redundant_bits).saturating_sub(redundant_bits + 1)
}

/// Builds the r x n check matrix of a Hamming code.
///
/// Codeword positions are numbered from 1 and the power-of-two positions are reserved for the
/// redundant bits. The remaining positions are handed to the information bits in order, and
/// redundant bit i covers an information bit when bit i of its position is set. Row i walks the
/// positions in alternating blocks of 2^i, skipping one block and covering the next. The column
/// of redundant bit i is the unit vector e_i.
pub fn build_check_matrix(information_bits: usize, redundant_bits: usize) -> Result<BitMatrix> {
    if information_bits == 0 {
        return Err(Error::invalid_input("Information bits must be positive"));
    }

    if redundant_bits >= usize::BITS as usize {
        return Err(Error::InvalidInput(format!(
            "Too many redundant bits: {}",
            redundant_bits
        )));
    }

    let max_bits = max_information_bits(redundant_bits);
    if information_bits > max_bits {
        return Err(Error::InvalidInput(format!(
            "{} redundant bits protect at most {} information bits, got {}",
            redundant_bits, max_bits, information_bits
        )));
    }

    Ok(fill_check_matrix(information_bits, redundant_bits))
}

fn fill_check_matrix(information_bits: usize, redundant_bits: usize) -> BitMatrix {
    let mut matrix = BitMatrix::zeros(redundant_bits, information_bits + redundant_bits);

    for row in 0..redundant_bits {
        let block = 1usize << row;
        let mut skipping = false;
        let mut column = 0;
        let mut position = 0usize;

        while column < information_bits {
            if position % block == 0 {
                skipping = !skipping;
            }

            if position != 0 && !position.is_power_of_two() {
                if !skipping {
                    matrix.set(row, column, true);
                }
                column += 1;
            }
            position += 1;
        }

        matrix.set(row, information_bits + row, true);
    }

    log::trace!(
        "Hamming({},{}) check matrix:\n{}",
        information_bits + redundant_bits,
        information_bits,
        matrix
    );
    matrix
}

/// Computes redundant bit i as the XOR of the information bits selected by row i of the
/// check matrix
pub fn calculate_redundancy(check_matrix: &BitMatrix, information: &Bits) -> Result<Word> {
    Error::check_len(
        check_matrix.column_count(),
        information.len() + check_matrix.row_count(),
    )?;

    Ok(check_matrix
        .rows()
        .map(|row| information.iter_ones().filter(|&j| row[j]).count() % 2 == 1)
        .collect())
}

/// Encodes an information word: the codeword is the word followed by its redundancy
pub fn encode(check_matrix: &BitMatrix, word: &Bits) -> Result<Word> {
    let redundancy = calculate_redundancy(check_matrix, word)?;

    let mut codeword = word.to_bitvec();
    codeword.extend_from_bitslice(&redundancy);
    Ok(codeword)
}

/// Received redundancy XOR recomputed redundancy
pub fn syndrome(received_redundancy: &Bits, calculated_redundancy: &Bits) -> Result<Word> {
    let mut syndrome = received_redundancy.to_bitvec();
    row_sum(&mut syndrome, calculated_redundancy)?;
    Ok(syndrome)
}

/// Finds the codeword position whose check-matrix column equals the syndrome
pub fn locate_error(check_matrix: &BitMatrix, syndrome: &Bits) -> Result<Option<usize>> {
    Error::check_len(check_matrix.row_count(), syndrome.len())?;
    if syndrome.not_any() {
        return Ok(None);
    }

    Ok((0..check_matrix.column_count())
        .find(|&column| check_matrix.column_matches(column, syndrome)))
}

/// Builds the error pattern for a syndrome: a single 1 at the located position, or all zeros
/// when the syndrome matches no column
pub fn recovery_vector(check_matrix: &BitMatrix, syndrome: &Bits) -> Result<Word> {
    let mut recovery = bitvec![u8, Msb0; 0; check_matrix.column_count()];
    if let Some(position) = locate_error(check_matrix, syndrome)? {
        recovery.set(position, true);
    }
    Ok(recovery)
}

/// Received word XOR recovery vector
pub fn recover(received: &Bits, recovery: &Bits) -> Result<Word> {
    let mut recovered = received.to_bitvec();
    row_sum(&mut recovered, recovery)?;
    Ok(recovered)
}

/// Intermediate state of syndrome decoding against a check matrix
pub(crate) struct SyndromeDecoding {
    pub syndrome: Word,
    pub error_position: Option<usize>,
    pub recovered: Word,
}

/// Runs syndrome decoding of a full codeword against any systematic check matrix
pub(crate) fn syndrome_decode(
    check_matrix: &BitMatrix,
    received: &Bits,
) -> Result<SyndromeDecoding> {
    Error::check_len(check_matrix.column_count(), received.len())?;

    let information_bits = check_matrix.column_count() - check_matrix.row_count();
    let (information, redundancy) = received.split_at(information_bits);
    let calculated = calculate_redundancy(check_matrix, information)?;
    let syndrome = syndrome(redundancy, &calculated)?;
    let recovery = recovery_vector(check_matrix, &syndrome)?;
    let recovered = recover(received, &recovery)?;

    Ok(SyndromeDecoding {
        error_position: recovery.first_one(),
        syndrome,
        recovered,
    })
}

/// Creates a standard (7,4) Hamming code
pub fn create_hamming_7_4() -> HammingCode {
    HammingCode::standard_7_4()
}

/// Creates a Hamming code with custom parameters
pub fn create_hamming(information_bits: usize, redundant_bits: usize) -> Result<HammingCode> {
    HammingCode::new(information_bits, redundant_bits)
}

/// Encodes 4 information bits using the standard (7,4) Hamming code
pub fn hamming_encode(word: &Bits) -> Result<Word> {
    create_hamming_7_4().encode(word)
}

/// Decodes a 7-bit codeword using the standard (7,4) Hamming code
pub fn hamming_decode(codeword: &Bits) -> Result<Decoded> {
    create_hamming_7_4().decode(codeword)
}

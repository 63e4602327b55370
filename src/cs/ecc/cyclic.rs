//! Cyclic (polynomial) code implementation.
//!
//! Cyclic codes treat a word as a binary polynomial and use modulo-2 division by a generator
//! polynomial g(x) of degree n - k, the same construction CRCs are built on. Encoding is
//! systematic: the message m(x) is shifted by n - k places and the remainder of
//! x^(n-k) * m(x) / g(x) is appended as redundancy, so every codeword is a multiple of g(x).
//!
//! # How Decoding Works
//!
//! The remainder of a received word divided by g(x) is its syndrome; it is zero for every valid
//! codeword. The syndrome of a single error depends only on the error's position, so a table of
//! single-error syndromes locates it. The table is the redundant half of the systematic
//! generating matrix: row i is the codeword of the i-th unit information word, so its redundancy
//! is exactly the syndrome of an error at position i. Errors inside the redundancy leave a
//! weight-one syndrome pointing straight at the bit.
//!
//! Whether every single error gets a distinct syndrome depends on g(x); a primitive polynomial
//! of degree m guarantees it for any n up to 2^m - 1.
//!
//! # Examples
//!
//! ```
//! use bitvec::prelude::*;
//! use channel_codes::cs::ecc::BlockCode;
//! use channel_codes::cs::ecc::cyclic::CyclicCode;
//!
//! let code = CyclicCode::standard_7_4();
//! let codeword = code.encode(bits![u8, Msb0; 1, 0, 0, 0]).unwrap();
//! assert_eq!(codeword, bitvec![u8, Msb0; 1, 0, 0, 0, 1, 0, 1]);
//! ```

use crate::cs::ecc::gf2::{poly_degree, poly_remainder, row_sum, BitMatrix};
use crate::cs::ecc::{BlockCode, Bits, DecodeOutcome, Decoded, Result, Word};
use crate::cs::error::Error;
use bitvec::prelude::*;
use std::fmt::{Display, Formatter};

/// Cyclic code defined by its generator polynomial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicCode {
    /// Number of information bits (k)
    information_bits: usize,
    /// Codeword length (n)
    codeword_bits: usize,
    /// Generator polynomial, highest degree first, of degree n - k
    generator: Word,
    /// Systematic k x n generating matrix
    generating_matrix: BitMatrix,
}

impl CyclicCode {
    /// Create a new cyclic code
    ///
    /// # Arguments
    ///
    /// * `information_bits` - Number of information bits per codeword (k)
    /// * `codeword_bits` - Codeword length (n)
    /// * `generator` - Generator polynomial of degree n - k, highest degree first
    pub fn new(information_bits: usize, codeword_bits: usize, generator: &Bits) -> Result<Self> {
        let generating_matrix =
            build_generating_matrix(information_bits, codeword_bits, generator)?;

        Ok(CyclicCode {
            information_bits,
            codeword_bits,
            generator: generator.to_bitvec(),
            generating_matrix,
        })
    }

    /// Create the (7,4) cyclic code generated by x^3 + x + 1
    pub fn standard_7_4() -> Self {
        let generator = bitvec![u8, Msb0; 1, 0, 1, 1];
        let mut generating_matrix = shifted_generator_rows(4, 7, &generator);
        reduce_to_systematic(&mut generating_matrix);

        CyclicCode {
            information_bits: 4,
            codeword_bits: 7,
            generator,
            generating_matrix,
        }
    }

    pub fn generator(&self) -> &Bits {
        &self.generator
    }

    pub fn generating_matrix(&self) -> &BitMatrix {
        &self.generating_matrix
    }

    /// Remainder of a received codeword divided by the generator
    pub fn syndrome(&self, received: &Bits) -> Result<Word> {
        Error::check_len(self.codeword_bits, received.len())?;
        calculate_syndrome(received, &self.generator)
    }

    /// Corrects a received codeword and returns it whole, redundancy included
    pub fn correct(&self, received: &Bits) -> Result<(Word, DecodeOutcome)> {
        let syndrome = self.syndrome(received)?;

        if syndrome.not_any() {
            return Ok((received.to_bitvec(), DecodeOutcome::NoErrorDetected));
        }

        match locate_error(&self.generating_matrix, &syndrome, self.information_bits)? {
            Some(position) => {
                log::debug!("{}: corrected bit {}", self, position);
                let mut recovery = bitvec![u8, Msb0; 0; self.codeword_bits];
                recovery.set(position, true);
                Ok((recover_message(received, &recovery)?, DecodeOutcome::Corrected))
            }
            None => {
                log::warn!("{}: syndrome matches no single-error pattern", self);
                Ok((received.to_bitvec(), DecodeOutcome::UncorrectablePattern))
            }
        }
    }
}

impl BlockCode for CyclicCode {
    fn information_len(&self) -> usize {
        self.information_bits
    }

    fn codeword_len(&self) -> usize {
        self.codeword_bits
    }

    fn encode(&self, word: &Bits) -> Result<Word> {
        encode(self.information_bits, self.codeword_bits, word, &self.generator)
    }

    fn decode(&self, codeword: &Bits) -> Result<Decoded> {
        let (mut recovered, outcome) = self.correct(codeword)?;
        recovered.truncate(self.information_bits);
        Ok(Decoded::new(recovered, outcome))
    }
}

impl Display for CyclicCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cyclic({},{}) g={}",
            self.codeword_bits,
            self.information_bits,
            crate::cs::ecc::format_codeword(&self.generator, self.generator.len())
        )
    }
}

fn validate_parameters(
    information_bits: usize,
    codeword_bits: usize,
    generator: &Bits,
) -> Result<()> {
    if information_bits == 0 {
        return Err(Error::invalid_input("Information bits must be positive"));
    }

    if codeword_bits <= information_bits {
        return Err(Error::InvalidInput(format!(
            "Codeword length ({}) must exceed information bits ({})",
            codeword_bits, information_bits
        )));
    }

    Error::check_len(codeword_bits - information_bits + 1, generator.len())?;

    if !generator[0] {
        return Err(Error::invalid_input(
            "Generator polynomial must have a leading coefficient of 1",
        ));
    }

    Ok(())
}

/// Encodes a message: the remainder of x^(n-k) * m(x) / g(x), aligned to n - k bits, is
/// appended to the message
pub fn encode(
    information_bits: usize,
    codeword_bits: usize,
    message: &Bits,
    generator: &Bits,
) -> Result<Word> {
    validate_parameters(information_bits, codeword_bits, generator)?;
    Error::check_len(information_bits, message.len())?;

    let mut dividend = message.to_bitvec();
    dividend.resize(codeword_bits, false);
    let remainder = poly_remainder(&dividend, generator)?;

    let mut codeword = message.to_bitvec();
    codeword.extend_from_bitslice(&remainder[information_bits..]);
    Ok(codeword)
}

fn shifted_generator_rows(
    information_bits: usize,
    codeword_bits: usize,
    generator: &Bits,
) -> BitMatrix {
    let mut matrix = BitMatrix::zeros(information_bits, codeword_bits);
    for i in 0..information_bits {
        matrix.row_mut(i)[i..i + generator.len()].copy_from_bitslice(generator);
    }
    matrix
}

/// Clears every information column except the diagonal by XORing later rows upward. Row j only
/// has ones from column j on, so walking j upward never disturbs an already cleared column.
fn reduce_to_systematic(matrix: &mut BitMatrix) {
    let rows = matrix.row_count();
    for i in 0..rows {
        for j in i + 1..rows {
            if matrix.get(i, j) {
                let source = matrix.row(j).to_bitvec();
                for column in source.iter_ones() {
                    let bit = matrix.get(i, column);
                    matrix.set(i, column, !bit);
                }
            }
        }
    }
}

/// Builds the systematic k x n generating matrix.
///
/// Row i starts as the generator shifted right by i places; rows are then combined until the
/// information columns form the identity. Row i is then the codeword of the i-th unit
/// information word.
pub fn build_generating_matrix(
    information_bits: usize,
    codeword_bits: usize,
    generator: &Bits,
) -> Result<BitMatrix> {
    validate_parameters(information_bits, codeword_bits, generator)?;

    let mut matrix = shifted_generator_rows(information_bits, codeword_bits, generator);
    reduce_to_systematic(&mut matrix);

    log::trace!(
        "cyclic ({},{}) generating matrix:\n{}",
        codeword_bits,
        information_bits,
        matrix
    );
    Ok(matrix)
}

/// Divides a received codeword by the generator; the last deg(g) bits of the remainder are
/// the syndrome
pub fn calculate_syndrome(codeword: &Bits, generator: &Bits) -> Result<Word> {
    let degree = poly_degree(generator);
    if codeword.len() < degree {
        return Err(Error::DimensionMismatch {
            expected: degree,
            actual: codeword.len(),
        });
    }

    let remainder = poly_remainder(codeword, generator)?;
    Ok(remainder[codeword.len() - degree..].to_bitvec())
}

/// Finds the position of a single error from its syndrome.
///
/// A generating-matrix row whose redundant segment equals the syndrome names an information
/// bit; a weight-one syndrome names a redundant bit.
pub fn locate_error(
    generating_matrix: &BitMatrix,
    syndrome: &Bits,
    information_bits: usize,
) -> Result<Option<usize>> {
    Error::check_len(generating_matrix.row_count(), information_bits)?;
    Error::check_len(
        generating_matrix.column_count().saturating_sub(information_bits),
        syndrome.len(),
    )?;

    if syndrome.not_any() {
        return Ok(None);
    }

    if let Some(row) = generating_matrix
        .rows()
        .position(|row| row[information_bits..] == *syndrome)
    {
        return Ok(Some(row));
    }

    if syndrome.count_ones() == 1 {
        return Ok(syndrome.first_one().map(|bit| information_bits + bit));
    }

    Ok(None)
}

/// Error pattern for a syndrome: a single 1 at the located position, or all zeros when the
/// syndrome describes no single error
pub fn recovery_vector(
    generating_matrix: &BitMatrix,
    syndrome: &Bits,
    information_bits: usize,
) -> Result<Word> {
    let mut recovery = bitvec![u8, Msb0; 0; generating_matrix.column_count()];
    if let Some(position) = locate_error(generating_matrix, syndrome, information_bits)? {
        recovery.set(position, true);
    }
    Ok(recovery)
}

/// Codeword XOR recovery vector
pub fn recover_message(codeword: &Bits, recovery: &Bits) -> Result<Word> {
    let mut recovered = codeword.to_bitvec();
    row_sum(&mut recovered, recovery)?;
    Ok(recovered)
}

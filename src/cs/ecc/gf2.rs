//! GF(2) vector, matrix and polynomial primitives.
//!
//! All arithmetic is modulo 2: addition is XOR and multiplication is AND.
//! Polynomials are stored highest degree first, so `1011` is x^3 + x + 1.
//! By convention the all-zero polynomial has degree 0.

use crate::cs::ecc::{Bits, Result, Word};
use crate::cs::error::Error;
use bitvec::prelude::*;
use std::fmt::{Display, Formatter};

/// XOR `source` into `target` in place.
///
/// Rejects vectors of different lengths and leaves `target` untouched.
pub fn row_sum(target: &mut Bits, source: &Bits) -> Result<()> {
    Error::check_len(target.len(), source.len())?;

    for (mut bit, other) in target.iter_mut().zip(source.iter().by_vals()) {
        *bit ^= other;
    }

    Ok(())
}

/// Degree of a polynomial: `len - 1 - index of the first 1`, or 0 when the
/// polynomial is zero
pub fn poly_degree(poly: &Bits) -> usize {
    poly.first_one().map_or(0, |offset| poly.len() - 1 - offset)
}

/// Number of zeros before the leading 1, or `len - 1` for the zero polynomial
pub fn poly_offset(poly: &Bits) -> usize {
    poly.first_one().unwrap_or(poly.len().saturating_sub(1))
}

/// Remainder of polynomial long division over GF(2).
///
/// The divisor is aligned under the leading 1 of the remaining polynomial and
/// XORed in until the remainder's degree drops below the divisor's. The result
/// has the dividend's length, so the significant bits sit at its tail.
pub fn poly_remainder(dividend: &Bits, divisor: &Bits) -> Result<Word> {
    let divisor_offset = divisor
        .first_one()
        .ok_or_else(|| Error::invalid_input("Divisor polynomial must be non-zero"))?;
    let divisor = &divisor[divisor_offset..];
    let divisor_degree = divisor.len() - 1;

    let mut remainder = dividend.to_bitvec();
    while let Some(offset) = remainder.first_one() {
        if remainder.len() - 1 - offset < divisor_degree {
            break;
        }

        log::trace!(
            "poly division: {} - {} at offset {}",
            render(&remainder),
            render(divisor),
            offset
        );
        row_sum(&mut remainder[offset..offset + divisor.len()], divisor)?;
    }

    Ok(remainder)
}

fn render(bits: &Bits) -> String {
    bits.iter()
        .by_vals()
        .map(|bit| if bit { '1' } else { '0' })
        .collect()
}

/// A dense binary matrix stored as equally long rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    rows: Vec<Word>,
    columns: usize,
}

impl BitMatrix {
    /// Creates an all-zero matrix
    pub fn zeros(rows: usize, columns: usize) -> Self {
        BitMatrix {
            rows: vec![bitvec![u8, Msb0; 0; columns]; rows],
            columns,
        }
    }

    /// Creates a `size` x `size` identity matrix
    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::zeros(size, size);
        for i in 0..size {
            matrix.set(i, i, true);
        }
        matrix
    }

    /// Builds a matrix from rows, rejecting ragged input
    pub fn from_rows(rows: Vec<Word>) -> Result<Self> {
        let columns = rows.first().map_or(0, |row| row.len());
        for row in &rows {
            Error::check_len(columns, row.len())?;
        }

        Ok(BitMatrix { rows, columns })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> bool {
        self.rows[row][column]
    }

    pub fn set(&mut self, row: usize, column: usize, value: bool) {
        self.rows[row].set(column, value);
    }

    pub fn row(&self, row: usize) -> &Bits {
        &self.rows[row]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut Bits {
        &mut self.rows[row]
    }

    pub fn rows(&self) -> impl Iterator<Item = &Bits> {
        self.rows.iter().map(|row| row.as_bitslice())
    }

    /// Rows as owned words, in order
    pub fn as_rows(&self) -> &[Word] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Word> {
        self.rows
    }

    /// Copies out a column read top to bottom
    pub fn column(&self, column: usize) -> Word {
        self.rows.iter().map(|row| row[column]).collect()
    }

    /// Whether column `column` equals `signature`
    pub fn column_matches(&self, column: usize, signature: &Bits) -> bool {
        signature.len() == self.rows.len()
            && self
                .rows
                .iter()
                .zip(signature.iter().by_vals())
                .all(|(row, bit)| row[column] == bit)
    }

    /// Row `target` ^= row `source`
    pub fn xor_rows(&mut self, target: usize, source: usize) -> Result<()> {
        let source_row = self.rows[source].clone();
        row_sum(&mut self.rows[target], &source_row)
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        self.rows.swap(a, b);
    }

    /// Sorts rows lexicographically with 0 before 1
    pub fn sort_rows(&mut self) {
        self.rows.sort_by(|a, b| a.iter().by_vals().cmp(b.iter().by_vals()));
    }

    pub fn transpose(&self) -> BitMatrix {
        let rows = (0..self.columns).map(|column| self.column(column)).collect();
        BitMatrix {
            rows,
            columns: self.rows.len(),
        }
    }

    /// Copies the columns in `start..end` of every row
    ///
    /// # Panics
    ///
    /// Panics unless `start <= end <= column_count()`, like slice indexing.
    pub fn sub_matrix(&self, start: usize, end: usize) -> BitMatrix {
        assert!(
            start <= end && end <= self.columns,
            "column range {}..{} out of bounds for {} columns",
            start,
            end,
            self.columns
        );

        BitMatrix {
            rows: self
                .rows
                .iter()
                .map(|row| row[start..end].to_bitvec())
                .collect(),
            columns: end - start,
        }
    }

    /// Multiplies the row vector `word` by this matrix
    pub fn left_multiply(&self, word: &Bits) -> Result<Word> {
        Error::check_len(self.rows.len(), word.len())?;

        let mut result = bitvec![u8, Msb0; 0; self.columns];
        for i in word.iter_ones() {
            row_sum(&mut result, &self.rows[i])?;
        }
        Ok(result)
    }
}

impl Display for BitMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}", render(row))?;
        }
        Ok(())
    }
}

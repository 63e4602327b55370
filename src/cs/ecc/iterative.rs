//! Iterative (two-dimensional parity) code.
//!
//! The message fills a rows x columns grid row by row. An extra column holds each row's parity,
//! an extra row holds each column's parity, and the corner holds the parity of the parities.
//! A single flipped data cell shows up as exactly one inconsistent row and one inconsistent
//! column, which intersect at the cell.
//!
//! The transmitted form unrolls the grid as: data (row-major), row parities, column parities,
//! corner.
//!
//! The last syndrome bit compares the parity of every received cell except the corner with the
//! recomputed corner. It is set when a parity bit itself was hit, or more generally whenever
//! the row and column checks cannot describe a single data error; the decoder then asks for a
//! retransmission. Two errors in one row or one column are not always caught by it, which is
//! inherent to two-dimensional parity.

use crate::cs::ecc::gf2::{row_sum, BitMatrix};
use crate::cs::ecc::{format_codeword, BlockCode, Bits, DecodeOutcome, Decoded, Result, Word};
use crate::cs::error::Error;
use bitvec::prelude::*;
use std::fmt::{Display, Formatter};

/// Data grid surrounded by its row parities, column parities and corner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityGrid {
    /// (rows + 1) x (columns + 1) cells
    cells: BitMatrix,
    rows: usize,
    columns: usize,
}

impl ParityGrid {
    /// Places `message` row-major into a rows x columns grid and computes its parities
    pub fn build(message: &Bits, rows: usize, columns: usize) -> Result<Self> {
        validate_dimensions(rows, columns)?;
        Error::check_len(rows * columns, message.len())?;

        let mut grid = ParityGrid {
            cells: BitMatrix::zeros(rows + 1, columns + 1),
            rows,
            columns,
        };

        for index in message.iter_ones() {
            let (row, column) = (index / columns, index % columns);
            grid.cells.set(row, column, true);
            grid.toggle(row, columns);
            grid.toggle(rows, column);
        }

        let corner = grid.total_parity();
        grid.cells.set(rows, columns, corner);

        Ok(grid)
    }

    /// Rebuilds a grid from its transmitted form without recomputing anything
    pub fn from_transmission(sequence: &Bits, rows: usize, columns: usize) -> Result<Self> {
        validate_dimensions(rows, columns)?;
        Error::check_len(transmission_len(rows, columns), sequence.len())?;

        let mut cells = BitMatrix::zeros(rows + 1, columns + 1);
        let (data, redundancy) = sequence.split_at(rows * columns);

        for row in 0..rows {
            cells.row_mut(row)[..columns]
                .copy_from_bitslice(&data[row * columns..(row + 1) * columns]);
            cells.set(row, columns, redundancy[row]);
        }
        for column in 0..columns {
            cells.set(rows, column, redundancy[rows + column]);
        }
        cells.set(rows, columns, redundancy[rows + columns]);

        Ok(ParityGrid {
            cells,
            rows,
            columns,
        })
    }

    pub fn cells(&self) -> &BitMatrix {
        &self.cells
    }

    pub fn row_parity(&self, row: usize) -> bool {
        self.cells.get(row, self.columns)
    }

    pub fn column_parity(&self, column: usize) -> bool {
        self.cells.get(self.rows, column)
    }

    /// The parity of the parities
    pub fn corner(&self) -> bool {
        self.cells.get(self.rows, self.columns)
    }

    /// The data cells, row-major
    pub fn data(&self) -> Word {
        let mut data = Word::with_capacity(self.rows * self.columns);
        for row in self.cells.rows().take(self.rows) {
            data.extend_from_bitslice(&row[..self.columns]);
        }
        data
    }

    /// Row parities, then column parities, then the corner
    pub fn redundancy(&self) -> Word {
        let mut redundancy = Word::with_capacity(self.rows + self.columns + 1);
        redundancy.extend((0..self.rows).map(|row| self.row_parity(row)));
        redundancy.extend((0..self.columns).map(|column| self.column_parity(column)));
        redundancy.push(self.corner());
        redundancy
    }

    /// Data followed by redundancy
    pub fn to_transmission(&self) -> Word {
        let mut sequence = self.data();
        sequence.extend_from_bitslice(&self.redundancy());
        sequence
    }

    /// Parity of every cell except the corner
    fn total_parity(&self) -> bool {
        let ones: usize = self.cells.rows().map(|row| row.count_ones()).sum();
        (ones - usize::from(self.corner())) % 2 == 1
    }

    fn toggle(&mut self, row: usize, column: usize) {
        let bit = self.cells.get(row, column);
        self.cells.set(row, column, !bit);
    }
}

impl Display for ParityGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, row) in self.cells.rows().enumerate() {
            if i == self.rows {
                writeln!(f, "{}", "-".repeat(self.columns + 2))?;
            }
            writeln!(f, "{}", format_codeword(row, self.columns))?;
        }
        Ok(())
    }
}

fn validate_dimensions(rows: usize, columns: usize) -> Result<()> {
    if rows == 0 || columns == 0 {
        return Err(Error::InvalidInput(format!(
            "Grid dimensions must be positive, got {}x{}",
            rows, columns
        )));
    }
    Ok(())
}

/// Number of transmitted bits for a rows x columns grid
pub fn transmission_len(rows: usize, columns: usize) -> usize {
    rows * columns + rows + columns + 1
}

/// Places `message` into a grid and computes its parities
pub fn build_matrix(message: &Bits, rows: usize, columns: usize) -> Result<ParityGrid> {
    ParityGrid::build(message, rows, columns)
}

/// Received redundancy XOR the redundancy recomputed from the received data, with the last bit
/// replaced by the corner consistency check
pub fn calculate_syndrome(received: &Bits, rows: usize, columns: usize) -> Result<Word> {
    let received_grid = ParityGrid::from_transmission(received, rows, columns)?;
    let calculated = ParityGrid::build(&received[..rows * columns], rows, columns)?;

    let mut syndrome = received_grid.redundancy();
    row_sum(&mut syndrome, &calculated.redundancy())?;

    let last = syndrome.len() - 1;
    syndrome.set(last, received_grid.total_parity() ^ calculated.corner());
    Ok(syndrome)
}

/// Finds the data cell a syndrome points at: exactly one inconsistent row and one inconsistent
/// column, with the corner check satisfied
pub fn locate_error(
    syndrome: &Bits,
    rows: usize,
    columns: usize,
) -> Result<Option<(usize, usize)>> {
    Error::check_len(rows + columns + 1, syndrome.len())?;
    if syndrome[rows + columns] {
        return Ok(None);
    }

    let mut row_flags = syndrome[..rows].iter_ones();
    let mut column_flags = syndrome[rows..rows + columns].iter_ones();

    match (
        row_flags.next(),
        row_flags.next(),
        column_flags.next(),
        column_flags.next(),
    ) {
        (Some(row), None, Some(column), None) => Ok(Some((row, column))),
        _ => Ok(None),
    }
}

/// Error pattern over the data cells, or `None` when the corner check demands a retransmission
pub fn recovery_vector(syndrome: &Bits, rows: usize, columns: usize) -> Result<Option<Word>> {
    Error::check_len(rows + columns + 1, syndrome.len())?;
    if syndrome[rows + columns] {
        return Ok(None);
    }

    let mut recovery = bitvec![u8, Msb0; 0; rows * columns];
    if let Some((row, column)) = locate_error(syndrome, rows, columns)? {
        recovery.set(row * columns + column, true);
    }
    Ok(Some(recovery))
}

/// Two-dimensional parity code over a rows x columns grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterativeCode {
    rows: usize,
    columns: usize,
}

impl IterativeCode {
    pub fn new(rows: usize, columns: usize) -> Result<Self> {
        validate_dimensions(rows, columns)?;
        Ok(IterativeCode { rows, columns })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Builds the parity grid of a message
    pub fn build_grid(&self, message: &Bits) -> Result<ParityGrid> {
        ParityGrid::build(message, self.rows, self.columns)
    }

    pub fn syndrome(&self, received: &Bits) -> Result<Word> {
        calculate_syndrome(received, self.rows, self.columns)
    }
}

impl BlockCode for IterativeCode {
    fn information_len(&self) -> usize {
        self.rows * self.columns
    }

    fn codeword_len(&self) -> usize {
        transmission_len(self.rows, self.columns)
    }

    fn encode(&self, word: &Bits) -> Result<Word> {
        Ok(self.build_grid(word)?.to_transmission())
    }

    fn decode(&self, codeword: &Bits) -> Result<Decoded> {
        let syndrome = self.syndrome(codeword)?;
        let mut data = codeword[..self.information_len()].to_bitvec();

        let recovery = match recovery_vector(&syndrome, self.rows, self.columns)? {
            Some(recovery) => recovery,
            None => {
                log::warn!("{}: corner check failed, retransmission needed", self);
                return Ok(Decoded::new(data, DecodeOutcome::RequestRetransmission));
            }
        };

        if syndrome.not_any() {
            return Ok(Decoded::new(data, DecodeOutcome::NoErrorDetected));
        }

        if recovery.not_any() {
            log::warn!("{}: syndrome does not point at a single cell", self);
            return Ok(Decoded::new(data, DecodeOutcome::UncorrectablePattern));
        }

        log::debug!("{}: corrected cell {:?}", self, recovery.first_one());
        row_sum(&mut data, &recovery)?;
        Ok(Decoded::new(data, DecodeOutcome::Corrected))
    }
}

impl Display for IterativeCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Iterative({}x{})", self.rows, self.columns)
    }
}

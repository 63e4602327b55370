//! Block interleaving.
//!
//! A message is cut into blocks of `k` bits (the last one zero-padded), each block is encoded
//! with a [`BlockCode`], and the resulting B x n codeword matrix is transmitted column by
//! column. A burst of at most B consecutive channel errors then lands in B different codewords,
//! one bit each, which a single-error-correcting code can undo.
//!
//! With the `parallel` feature enabled, blocks are encoded and decoded on the rayon thread pool.

use crate::cs::ecc::gf2::BitMatrix;
use crate::cs::ecc::hamming::HammingCode;
use crate::cs::ecc::{BlockCode, Bits, DecodeOutcome, Decoded, Result, Word};
use crate::cs::error::Error;

/// Cuts `message` into rows of `block_len` bits, zero-padding the last row
pub fn split_blocks(message: &Bits, block_len: usize) -> Result<BitMatrix> {
    if block_len == 0 {
        return Err(Error::invalid_input("Block length must be positive"));
    }

    let blocks = message.len().div_ceil(block_len);
    let mut matrix = BitMatrix::zeros(blocks, block_len);
    for (i, chunk) in message.chunks(block_len).enumerate() {
        matrix.row_mut(i)[..chunk.len()].copy_from_bitslice(chunk);
    }
    Ok(matrix)
}

/// Concatenates blocks in order
pub fn join_blocks<'a>(blocks: impl IntoIterator<Item = &'a Bits>) -> Word {
    let mut sequence = Word::new();
    for block in blocks {
        sequence.extend_from_bitslice(block);
    }
    sequence
}

/// Reads a matrix column by column: bit j of row i lands at position `j * rows + i`
pub fn interleave(matrix: &BitMatrix) -> Word {
    let mut sequence = Word::with_capacity(matrix.row_count() * matrix.column_count());
    for column in 0..matrix.column_count() {
        sequence.extend(matrix.rows().map(|row| row[column]));
    }
    sequence
}

/// Inverse of [`interleave`] for rows of `codeword_len` bits
pub fn deinterleave(sequence: &Bits, codeword_len: usize) -> Result<BitMatrix> {
    if codeword_len == 0 {
        return Err(Error::invalid_input("Codeword length must be positive"));
    }
    if sequence.len() % codeword_len != 0 {
        return Err(Error::DimensionMismatch {
            expected: sequence.len().div_ceil(codeword_len) * codeword_len,
            actual: sequence.len(),
        });
    }

    let blocks = sequence.len() / codeword_len;
    let mut matrix = BitMatrix::zeros(blocks, codeword_len);
    for index in sequence.iter_ones() {
        matrix.set(index % blocks, index / blocks, true);
    }
    Ok(matrix)
}

fn map_blocks<T, F>(blocks: &[Word], f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&Bits) -> Result<T> + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        blocks.par_iter().map(|block| f(block.as_bitslice())).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        blocks.iter().map(|block| f(block.as_bitslice())).collect()
    }
}

/// Burst-error protection around a single-error-correcting block code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInterleaver<C = HammingCode> {
    code: C,
}

impl BlockInterleaver<HammingCode> {
    /// Interleaves a Hamming code with `information_bits` information bits and
    /// `redundant_bits` redundant bits
    pub fn hamming(information_bits: usize, redundant_bits: usize) -> Result<Self> {
        Ok(BlockInterleaver::new(HammingCode::new(information_bits, redundant_bits)?))
    }
}

impl<C: BlockCode> BlockInterleaver<C> {
    pub fn new(code: C) -> Self {
        BlockInterleaver { code }
    }

    pub fn code(&self) -> &C {
        &self.code
    }

    /// Number of codewords (B) a message of `message_len` bits occupies
    pub fn block_count(&self, message_len: usize) -> usize {
        message_len.div_ceil(self.code.information_len())
    }

    /// Encodes every block of the message; one codeword per row
    pub fn encode_blocks(&self, message: &Bits) -> Result<BitMatrix> {
        let blocks = split_blocks(message, self.code.information_len())?;
        let codewords = map_blocks(blocks.as_rows(), |block| self.code.encode(block))?;

        if codewords.is_empty() {
            return Ok(BitMatrix::zeros(0, self.code.codeword_len()));
        }
        BitMatrix::from_rows(codewords)
    }

    /// Encodes the message and interleaves the codewords for transmission
    pub fn encode(&self, message: &Bits) -> Result<Word> {
        let codewords = self.encode_blocks(message)?;
        log::debug!(
            "interleaving {} codewords of {} bits",
            codewords.row_count(),
            codewords.column_count()
        );
        Ok(interleave(&codewords))
    }

    /// Deinterleaves and decodes each codeword on its own
    pub fn decode_blocks(&self, received: &Bits) -> Result<Vec<Decoded>> {
        let codewords = deinterleave(received, self.code.codeword_len())?;
        map_blocks(codewords.as_rows(), |codeword| self.code.decode(codeword))
    }

    /// Decodes a transmission into the padded message and the worst outcome across blocks
    pub fn decode(&self, received: &Bits) -> Result<Decoded> {
        let blocks = self.decode_blocks(received)?;

        let outcome = blocks
            .iter()
            .map(|block| block.outcome)
            .max()
            .unwrap_or(DecodeOutcome::NoErrorDetected);
        let message = join_blocks(blocks.iter().map(|block| block.word.as_bitslice()));

        match outcome {
            DecodeOutcome::NoErrorDetected => {}
            DecodeOutcome::Corrected => {
                let corrected = blocks
                    .iter()
                    .filter(|block| block.outcome == DecodeOutcome::Corrected)
                    .count();
                log::debug!("corrected {} of {} blocks", corrected, blocks.len());
            }
            _ => {
                let untrusted = blocks
                    .iter()
                    .filter(|block| !block.outcome.is_trusted())
                    .count();
                log::warn!(
                    "{} of {} blocks could not be corrected ({:?})",
                    untrusted,
                    blocks.len(),
                    outcome
                );
            }
        }

        Ok(Decoded::new(message, outcome))
    }

    /// Like [`decode`](Self::decode), with the padding of the last block removed
    pub fn decode_message(&self, received: &Bits, message_len: usize) -> Result<Decoded> {
        let mut decoded = self.decode(received)?;
        if message_len > decoded.word.len() {
            return Err(Error::DimensionMismatch {
                expected: message_len,
                actual: decoded.word.len(),
            });
        }
        decoded.word.truncate(message_len);
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cs::ecc::cyclic::CyclicCode;
    use crate::cs::ecc::extended_hamming::ExtendedHammingCode;
    use crate::cs::ecc::message::{bits_to_text, text_to_bits};
    use bitvec::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn flip_range(word: &Bits, start: usize, len: usize) -> Word {
        let mut flipped = word.to_bitvec();
        for position in start..start + len {
            let bit = !flipped[position];
            flipped.set(position, bit);
        }
        flipped
    }

    fn sample_message() -> Word {
        // 32 bits, 8 blocks of a (7,4) code
        bitvec![u8, Msb0;
            1, 0, 1, 1, 0, 0, 1, 0,
            1, 1, 1, 0, 0, 0, 0, 1,
            0, 1, 0, 1, 1, 1, 0, 0,
            1, 0, 0, 1, 0, 1, 1, 0]
    }

    #[test]
    fn test_interleave_layout() {
        let matrix = BitMatrix::from_rows(vec![
            bitvec![u8, Msb0; 1, 1, 0],
            bitvec![u8, Msb0; 0, 0, 1],
        ])
        .unwrap();

        let sequence = interleave(&matrix);
        assert_eq!(sequence, bitvec![u8, Msb0; 1, 0, 1, 0, 0, 1]);
        assert_eq!(deinterleave(&sequence, 3).unwrap(), matrix);
    }

    #[test]
    fn test_deinterleave_bad_length() {
        assert!(matches!(
            deinterleave(bits![u8, Msb0; 1, 0, 1, 1, 0], 3),
            Err(Error::DimensionMismatch {
                expected: 6,
                actual: 5
            })
        ));
        assert!(matches!(
            deinterleave(bits![u8, Msb0; 1], 0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_split_blocks_pads() {
        let blocks = split_blocks(bits![u8, Msb0; 1, 1, 0, 1, 1], 4).unwrap();
        assert_eq!(blocks.to_string(), "1101\n1000\n");
        assert_eq!(join_blocks(blocks.rows()), bitvec![u8, Msb0; 1, 1, 0, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_round_trip() {
        let interleaver = BlockInterleaver::hamming(4, 3).unwrap();
        let message = sample_message();

        let encoded = interleaver.encode(&message).unwrap();
        assert_eq!(encoded.len(), 56);
        assert_eq!(interleaver.block_count(message.len()), 8);

        let decoded = interleaver.decode(&encoded).unwrap();
        assert_eq!(decoded, Decoded::new(message, DecodeOutcome::NoErrorDetected));
    }

    #[test]
    fn test_burst_up_to_block_count_corrected() {
        let interleaver = BlockInterleaver::hamming(4, 3).unwrap();
        let message = sample_message();
        let encoded = interleaver.encode(&message).unwrap();
        let blocks = interleaver.block_count(message.len());

        for len in 1..=blocks {
            for start in 0..=encoded.len() - len {
                let decoded = interleaver.decode(&flip_range(&encoded, start, len)).unwrap();
                assert_eq!(decoded.word, message, "burst of {} at {}", len, start);
                assert_eq!(decoded.outcome, DecodeOutcome::Corrected);
            }
        }
    }

    #[test]
    fn test_longer_burst_miscorrected() {
        let interleaver = BlockInterleaver::hamming(4, 3).unwrap();
        let message = sample_message();
        let encoded = interleaver.encode(&message).unwrap();

        // Block 0 takes two errors, which a perfect code silently turns into a third
        let received = flip_range(&encoded, 0, 9);
        let decoded = interleaver.decode(&received).unwrap();
        assert_ne!(decoded.word, message);
        assert_eq!(decoded.outcome, DecodeOutcome::Corrected);

        let blocks = interleaver.decode_blocks(&received).unwrap();
        assert_ne!(blocks[0].word, message[..4].to_bitvec());
        assert_eq!(blocks[1].word, message[4..8].to_bitvec());
    }

    #[test]
    fn test_extended_code_reports_double_errors() {
        let interleaver = BlockInterleaver::new(ExtendedHammingCode::extended_8_4());
        let message = sample_message();
        let encoded = interleaver.encode(&message).unwrap();

        let decoded = interleaver.decode(&flip_range(&encoded, 0, 9)).unwrap();
        assert_eq!(decoded.outcome, DecodeOutcome::UncorrectablePattern);
        assert!(!decoded.outcome.is_trusted());
    }

    #[test]
    fn test_cyclic_code_random_bursts() {
        let interleaver = BlockInterleaver::new(CyclicCode::standard_7_4());
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            let message_len = rng.gen_range(1..64);
            let message: Word = (0..message_len).map(|_| rng.gen_bool(0.5)).collect();
            let encoded = interleaver.encode(&message).unwrap();

            let blocks = interleaver.block_count(message_len);
            let len = rng.gen_range(1..=blocks);
            let start = rng.gen_range(0..=encoded.len() - len);

            let decoded = interleaver
                .decode_message(&flip_range(&encoded, start, len), message_len)
                .unwrap();
            assert_eq!(decoded.word, message);
            assert_eq!(decoded.outcome, DecodeOutcome::Corrected);
        }
    }

    #[test]
    fn test_text_message() {
        let interleaver = BlockInterleaver::hamming(11, 4).unwrap();
        let message = text_to_bits("Hello").unwrap();

        let encoded = interleaver.encode(&message).unwrap();
        let received = flip_range(&encoded, 3, 4);
        let decoded = interleaver.decode_message(&received, message.len()).unwrap();

        assert_eq!(bits_to_text(&decoded.word).unwrap(), "Hello");
        assert!(interleaver.decode_message(&received, encoded.len()).is_err());
    }

    #[test]
    fn test_empty_message() {
        let interleaver = BlockInterleaver::hamming(4, 3).unwrap();
        let encoded = interleaver.encode(Word::new().as_bitslice()).unwrap();
        assert!(encoded.is_empty());

        let decoded = interleaver.decode(&encoded).unwrap();
        assert!(decoded.word.is_empty());
        assert_eq!(decoded.outcome, DecodeOutcome::NoErrorDetected);
    }
}

//! Memory matrix
//!
//! A flat, row-major buffer of `rows * cols` blocks of [`BLOCK_LEN_WORDS`]
//! words. Blocks are reached only through [`Matrix::offset`]; the buffer
//! length is checked once when the view is built, and every row index the
//! algorithm produces is masked below `rows`.
//!
//! The same buffer first stages the padded input (words
//! `[0, PaddedInput::footprint_words())`) and then stores rows. The staging
//! view borrows the matrix mutably, so rows cannot be touched while it lives.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::padding::PaddedInput;
use crate::params::{BLOCK_LEN_WORDS, Params, SAFE_BLOCK_LEN_WORDS};
use crate::sponge::Block;

/// Row store over a caller-supplied word buffer.
pub struct Matrix<'a> {
    words: &'a mut [u64],
    rows: usize,
    cols: usize,
    row_words: usize,
}

impl<'a> Matrix<'a> {
    /// Build a view for `params`, failing with
    /// [`Error::AllocationFailed`] if `words` is too short.
    ///
    /// Words past the required length are never touched.
    pub fn new(words: &'a mut [u64], params: &Params) -> Result<Self> {
        let required = params.validate()?;
        if words.len() < required {
            return Err(Error::AllocationFailed {
                required,
                actual: words.len(),
            });
        }
        Ok(Self {
            words: &mut words[..required],
            rows: params.rows,
            cols: params.cols,
            row_words: params.row_words(),
        })
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total words in the view
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Word offset of block `(row, col)`
    #[inline(always)]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.row_words + col * BLOCK_LEN_WORDS
    }

    #[inline(always)]
    pub fn block(&self, row: usize, col: usize) -> &[u64] {
        let at = self.offset(row, col);
        &self.words[at..at + BLOCK_LEN_WORDS]
    }

    /// Copy of block `(row, col)`
    #[inline(always)]
    pub fn read_block(&self, row: usize, col: usize) -> Block {
        let mut out = [0u64; BLOCK_LEN_WORDS];
        out.copy_from_slice(self.block(row, col));
        out
    }

    #[inline(always)]
    pub fn write_block(&mut self, row: usize, col: usize, block: &Block) {
        let at = self.offset(row, col);
        self.words[at..at + BLOCK_LEN_WORDS].copy_from_slice(block);
    }

    #[inline(always)]
    pub fn xor_block(&mut self, row: usize, col: usize, block: &Block) {
        let at = self.offset(row, col);
        for (w, b) in self.words[at..at + BLOCK_LEN_WORDS].iter_mut().zip(block) {
            *w ^= *b;
        }
    }

    /// Stage `input` at the start of the matrix.
    ///
    /// The caller must have checked `input.check_fits(self.len())`.
    pub fn stage<'m>(&'m mut self, input: &PaddedInput<'_>) -> StagedInput<'m> {
        input.write(self.words);
        StagedInput {
            words: &self.words[..input.footprint_words()],
            blocks: input.block_count(),
            stride: input.stride(),
        }
    }
}

/// The staged input region, alive only until absorption is done.
pub struct StagedInput<'m> {
    words: &'m [u64],
    blocks: usize,
    stride: usize,
}

impl<'m> StagedInput<'m> {
    /// Input blocks in absorption order
    pub fn blocks(&self) -> impl Iterator<Item = &'m [u64]> + '_ {
        let words = self.words;
        (0..self.blocks).map(move |i| {
            let at = i * self.stride;
            &words[at..at + SAFE_BLOCK_LEN_WORDS]
        })
    }
}

/// Heap matrix sized for one parameter set, wiped on drop.
pub struct MatrixBuf {
    words: Vec<u64>,
}

impl MatrixBuf {
    /// Allocate a zeroed matrix for `params`.
    pub fn new(params: &Params) -> Result<Self> {
        let words = params.validate()?;
        Ok(Self {
            words: vec![0u64; words],
        })
    }

    pub fn as_mut_words(&mut self) -> &mut [u64] {
        &mut self.words
    }
}

impl Drop for MatrixBuf {
    fn drop(&mut self) {
        self.words.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParamError;

    #[cfg(not(feature = "std"))]
    use alloc::vec;

    #[test]
    fn test_offsets_are_row_major() {
        let params = Params::new(1, 4, 3);
        let mut words = vec![0u64; params.matrix_words().unwrap()];
        let matrix = Matrix::new(&mut words, &params).unwrap();
        assert_eq!(matrix.offset(0, 0), 0);
        assert_eq!(matrix.offset(0, 2), 24);
        assert_eq!(matrix.offset(1, 0), 36);
        assert_eq!(matrix.offset(3, 2), 3 * 36 + 24);
        assert_eq!(matrix.offset(3, 2) + BLOCK_LEN_WORDS, matrix.len());
    }

    #[test]
    fn test_undersized_buffer() {
        let params = Params::new(1, 4, 4);
        let mut words = vec![0u64; params.matrix_words().unwrap() - 1];
        assert_eq!(
            Matrix::new(&mut words, &params).err(),
            Some(Error::AllocationFailed {
                required: 192,
                actual: 191
            })
        );

        let mut empty: [u64; 0] = [];
        assert!(matches!(
            Matrix::new(&mut empty, &params),
            Err(Error::AllocationFailed { actual: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_params_reported_before_size() {
        let params = Params::new(1, 5, 4);
        let mut empty: [u64; 0] = [];
        assert_eq!(
            Matrix::new(&mut empty, &params).err(),
            Some(ParamError::RowsNotPowerOfTwo(5).into())
        );
    }

    #[test]
    fn test_oversized_buffer_is_truncated() {
        let params = Params::new(1, 4, 1);
        let mut words = vec![7u64; 100];
        let matrix = Matrix::new(&mut words, &params).unwrap();
        assert_eq!(matrix.len(), 48);
    }

    #[test]
    fn test_block_io() {
        let params = Params::new(1, 4, 2);
        let mut words = vec![0u64; params.matrix_words().unwrap()];
        let mut matrix = Matrix::new(&mut words, &params).unwrap();

        let block = [3u64; BLOCK_LEN_WORDS];
        matrix.write_block(2, 1, &block);
        matrix.xor_block(2, 1, &[1u64; BLOCK_LEN_WORDS]);
        assert_eq!(matrix.read_block(2, 1), [2u64; BLOCK_LEN_WORDS]);
        assert_eq!(matrix.read_block(2, 0), [0u64; BLOCK_LEN_WORDS]);
        drop(matrix);
        assert_eq!(words[2 * 24 + 12], 2);
    }

    #[test]
    fn test_staged_blocks_follow_stride() {
        use crate::params::InputStride;

        let params = Params::new(1, 8, 8).with_input_stride(InputStride::Legacy);
        let mut words = vec![0u64; params.matrix_words().unwrap()];
        let mut matrix = Matrix::new(&mut words, &params).unwrap();
        let password = [0x11u8; 100];
        let input = PaddedInput::new(&password, b"", 32, &params);
        assert_eq!(input.block_count(), 3);

        let staged = matrix.stage(&input);
        let starts: Vec<u64> = staged.blocks().map(|b| b[0]).collect();
        assert_eq!(starts, vec![0x1111111111111111, 0, 0]);
    }

    #[test]
    fn test_matrix_buf() {
        let mut buf = MatrixBuf::new(&Params::LYRA2REV2).unwrap();
        assert_eq!(buf.as_mut_words().len(), 192);
        assert!(MatrixBuf::new(&Params::new(1, 6, 4)).is_err());
    }
}

//! Lyra2 algorithm constants and cost parameters
//!
//! The sponge geometry is fixed by the algorithm family; only the cost
//! parameters (`time_cost`, `rows`, `cols`) vary between networks.

use crate::error::{Error, ParamError};

/// Number of 64-bit words in the sponge state
pub const STATE_WORDS: usize = 16;

/// Words per matrix block (bitrate used for row duplexing)
pub const BLOCK_LEN_WORDS: usize = 12;

/// Bytes per matrix block
pub const BLOCK_LEN_BYTES: usize = BLOCK_LEN_WORDS * 8;

/// Words per padded input block (bitrate used while absorbing the input)
pub const SAFE_BLOCK_LEN_WORDS: usize = 8;

/// Bytes per padded input block
pub const SAFE_BLOCK_LEN_BYTES: usize = SAFE_BLOCK_LEN_WORDS * 8;

/// Word distance between input blocks under [`InputStride::Legacy`]
pub const LEGACY_STRIDE_WORDS: usize = SAFE_BLOCK_LEN_BYTES;

/// Rounds of the permutation used for input absorption, wrap-up and squeeze
pub const FULL_ROUNDS: usize = 12;

/// Rounds of the permutation used while filling and wandering the matrix
pub const REDUCED_ROUNDS: usize = 1;

/// Smallest accepted row count
pub const MIN_ROWS: usize = 4;

/// Number of u64 parameters appended to password and salt
pub const BASIL_WORDS: usize = 6;

/// Layout of the padded input blocks as read by the absorb loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InputStride {
    /// Consecutive 8-word blocks.
    #[default]
    Packed,
    /// Blocks read 64 words apart, as the first-generation Lyra2RE miners
    /// did for every column count other than 4. Only the first input block
    /// carries staged bytes once the input exceeds 64 bytes.
    Legacy,
}

impl InputStride {
    /// Distance in words between the start of consecutive input blocks
    #[inline]
    pub const fn words(self) -> usize {
        match self {
            InputStride::Packed => SAFE_BLOCK_LEN_WORDS,
            InputStride::Legacy => LEGACY_STRIDE_WORDS,
        }
    }
}

/// Cost parameters of one Lyra2 invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Params {
    /// Number of wandering passes over the matrix
    pub time_cost: u64,
    /// Matrix rows, a power of two no smaller than [`MIN_ROWS`]
    pub rows: usize,
    /// Blocks per row
    pub cols: usize,
    /// Input block layout
    #[cfg_attr(feature = "serde", serde(default))]
    pub input_stride: InputStride,
}

impl Params {
    /// Lyra2REv2 (t = 1, 4 x 4 matrix)
    pub const LYRA2REV2: Params = Params::new(1, 4, 4);

    /// Lyra2RE (t = 1, 8 x 8 matrix, legacy input stride)
    pub const LYRA2RE: Params = Params {
        time_cost: 1,
        rows: 8,
        cols: 8,
        input_stride: InputStride::Legacy,
    };

    /// Parameters with the packed input stride.
    pub const fn new(time_cost: u64, rows: usize, cols: usize) -> Self {
        Self {
            time_cost,
            rows,
            cols,
            input_stride: InputStride::Packed,
        }
    }

    pub const fn with_input_stride(mut self, input_stride: InputStride) -> Self {
        self.input_stride = input_stride;
        self
    }

    /// Words in one matrix row
    #[inline]
    pub const fn row_words(&self) -> usize {
        self.cols * BLOCK_LEN_WORDS
    }

    /// Exact matrix size in words: `rows * cols * BLOCK_LEN_WORDS`.
    ///
    /// Returns `None` if the product overflows.
    pub fn matrix_words(&self) -> Option<usize> {
        self.rows
            .checked_mul(self.cols)?
            .checked_mul(BLOCK_LEN_WORDS)
    }

    /// Exact matrix size in bytes: `rows * cols * BLOCK_LEN_BYTES`.
    pub fn matrix_bytes(&self) -> Option<usize> {
        self.matrix_words()?.checked_mul(8)
    }

    /// Check the cost parameters, returning the matrix size in words.
    pub fn validate(&self) -> Result<usize, Error> {
        if self.time_cost == 0 {
            return Err(ParamError::ZeroTimeCost.into());
        }
        if self.cols == 0 {
            return Err(ParamError::ZeroColumns.into());
        }
        if self.rows < MIN_ROWS {
            return Err(ParamError::TooFewRows(self.rows).into());
        }
        if !self.rows.is_power_of_two() {
            return Err(ParamError::RowsNotPowerOfTwo(self.rows).into());
        }
        self.matrix_words().ok_or_else(|| {
            ParamError::MatrixTooLarge {
                rows: self.rows,
                cols: self.cols,
            }
            .into()
        })
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::LYRA2REV2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_size_formula() {
        let params = Params::new(1, 16, 4);
        assert_eq!(params.row_words(), 48);
        assert_eq!(params.matrix_words(), Some(16 * 4 * 12));
        assert_eq!(params.matrix_bytes(), Some(16 * 4 * 96));
        assert_eq!(params.validate(), Ok(16 * 4 * 12));
    }

    #[test]
    fn test_presets() {
        assert_eq!(Params::default(), Params::LYRA2REV2);
        assert_eq!(Params::LYRA2REV2.matrix_bytes(), Some(1536));
        assert_eq!(Params::LYRA2RE.matrix_bytes(), Some(6144));
        assert_eq!(Params::LYRA2RE.input_stride.words(), 64);
        assert!(Params::LYRA2REV2.validate().is_ok());
        assert!(Params::LYRA2RE.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_power_of_two_rows() {
        for rows in [5, 6, 12, 100] {
            assert_eq!(
                Params::new(1, rows, 4).validate(),
                Err(Error::InvalidParameter(ParamError::RowsNotPowerOfTwo(rows)))
            );
        }
    }

    #[test]
    fn test_rejects_degenerate_costs() {
        assert_eq!(
            Params::new(1, 2, 4).validate(),
            Err(ParamError::TooFewRows(2).into())
        );
        assert_eq!(
            Params::new(0, 4, 4).validate(),
            Err(ParamError::ZeroTimeCost.into())
        );
        assert_eq!(
            Params::new(1, 4, 0).validate(),
            Err(ParamError::ZeroColumns.into())
        );
        assert_eq!(
            Params::new(1, 1 << 40, usize::MAX / 2).validate(),
            Err(ParamError::MatrixTooLarge {
                rows: 1 << 40,
                cols: usize::MAX / 2
            }
            .into())
        );
    }
}

//! Error types for Lyra2 invocations
//!
//! Every check runs before the sponge is created, so a failed call leaves
//! the output buffer and the matrix untouched.

/// Why a parameter set was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    /// Row indices are reduced with a bitmask, which needs a power of two.
    #[error("row count {0} is not a power of two")]
    RowsNotPowerOfTwo(usize),

    #[error("row count {0} is below the minimum of {min}", min = crate::params::MIN_ROWS)]
    TooFewRows(usize),

    #[error("column count must be positive")]
    ZeroColumns,

    #[error("time cost must be positive")]
    ZeroTimeCost,

    #[error("output length must be positive")]
    EmptyOutput,

    /// `rows * cols * BLOCK_LEN_WORDS` does not fit in `usize`.
    #[error("matrix of {rows} x {cols} blocks overflows the address space")]
    MatrixTooLarge { rows: usize, cols: usize },

    /// Password and salt do not fit in the staging region of the matrix.
    #[error("padded input needs {required} words, matrix has {available}")]
    InputTooLong { required: usize, available: usize },
}

/// Errors returned by [`compute`](crate::compute) and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ParamError),

    /// The caller-supplied matrix is shorter than the parameters require.
    #[error("matrix holds {actual} words, {required} required")]
    AllocationFailed { required: usize, actual: usize },
}

pub type Result<T> = core::result::Result<T, Error>;

//! Lyra2 core: setup, wandering and wrap-up over the memory matrix
//!
//! One invocation runs strictly in sequence:
//!
//! 1. Stage `pad(password || salt || params)` in the matrix and absorb it
//!    with the full permutation.
//! 2. Setup: squeeze row 0, duplex row 1 from row 0, then fill the rest
//!    while feeding back into a revisited row chosen from a doubling window.
//! 3. Wandering: `time_cost` passes, each visiting every row once, mixing in
//!    a row picked from the sponge's first state word.
//! 4. Wrap-up: absorb the first block of the last picked row, squeeze the
//!    output.
//!
//! Nothing is shared between invocations; concurrent callers each need
//! their own matrix.

use log::{debug, trace};

use crate::error::{ParamError, Result};
use crate::matrix::{Matrix, MatrixBuf};
use crate::padding::PaddedInput;
use crate::params::{BLOCK_LEN_WORDS, Params};
use crate::sponge::{Block, Sponge, rotate_words};

/// Compute Lyra2 over a caller-supplied matrix.
///
/// `output.len()` is the requested output length. `matrix` must hold at
/// least [`Params::matrix_words`] words; its previous contents do not
/// affect the result. On error neither buffer is modified.
pub fn compute(
    output: &mut [u8],
    matrix: &mut [u64],
    password: &[u8],
    salt: &[u8],
    params: &Params,
) -> Result<()> {
    run(output, matrix, password, salt, params).inspect_err(|err| {
        debug!("lyra2 rejected {:?}: {}", params, err);
    })
}

fn run(
    output: &mut [u8],
    matrix: &mut [u64],
    password: &[u8],
    salt: &[u8],
    params: &Params,
) -> Result<()> {
    params.validate()?;
    if output.is_empty() {
        return Err(ParamError::EmptyOutput.into());
    }
    let mut matrix = Matrix::new(matrix, params)?;
    let input = PaddedInput::new(password, salt, output.len(), params);
    input.check_fits(matrix.len())?;

    let mut sponge = Sponge::new();
    {
        let staged = matrix.stage(&input);
        for block in staged.blocks() {
            sponge.absorb_input_block(block);
        }
    }
    trace!("lyra2: absorbed {} input blocks", input.block_count());

    let prev = setup(&mut sponge, &mut matrix);
    trace!("lyra2: setup filled {} rows", matrix.rows());

    let rowa = wander(&mut sponge, &mut matrix, prev, params.time_cost);
    trace!("lyra2: wandering finished on row {}", rowa);

    sponge.absorb_block(matrix.block(rowa, 0));
    sponge.squeeze(output);
    Ok(())
}

/// Fill every row of the matrix. Returns the last row written.
fn setup(sponge: &mut Sponge, matrix: &mut Matrix<'_>) -> usize {
    let cols = matrix.cols();

    // Row 0 is squeezed straight from the absorbed state, last column first.
    for col in (0..cols).rev() {
        let block = sponge.squeeze_reduced();
        matrix.write_block(0, col, &block);
    }

    // M[1][C-1-i] = M[0][i] ^ duplex(M[0][i])
    for col in 0..cols {
        let input = matrix.read_block(0, col);
        let rand = sponge.duplex_reduced(&input);
        matrix.write_block(1, cols - 1 - col, &xor_words(&input, &rand));
    }

    for (row, rowa) in SetupSchedule::new(matrix.rows()) {
        duplex_row_setup(sponge, matrix, row - 1, rowa, row);
    }

    matrix.rows() - 1
}

/// `(row, rowa)` pairs filled by the setup phase after rows 0 and 1.
///
/// `rowa` walks a window of already written rows; when it wraps to 0 the
/// window doubles and the step alternates between `window - 1` and
/// `window + 1`.
struct SetupSchedule {
    rows: usize,
    row: usize,
    rowa: usize,
    step: usize,
    window: usize,
    gap: isize,
}

impl SetupSchedule {
    fn new(rows: usize) -> Self {
        Self {
            rows,
            row: 2,
            rowa: 0,
            step: 1,
            window: 2,
            gap: 1,
        }
    }
}

impl Iterator for SetupSchedule {
    type Item = (usize, usize);

    #[inline]
    fn next(&mut self) -> Option<(usize, usize)> {
        if self.row >= self.rows {
            return None;
        }
        let visit = (self.row, self.rowa);

        self.rowa = (self.rowa + self.step) & (self.window - 1);
        self.row += 1;

        // Window exhausted: double it and flip the step modifier.
        if self.rowa == 0 {
            self.step = self.window.wrapping_add_signed(self.gap);
            self.window *= 2;
            self.gap = -self.gap;
        }
        Some(visit)
    }
}

/// Setup duplexing: `M[row]` gets the new row in reverse column order and
/// `M[rowa]` absorbs a word-rotated copy of the sponge output.
#[inline(always)]
fn duplex_row_setup(
    sponge: &mut Sponge,
    matrix: &mut Matrix<'_>,
    prev: usize,
    rowa: usize,
    row: usize,
) {
    let cols = matrix.cols();
    for col in 0..cols {
        let input = matrix.read_block(prev, col);
        let revisited = matrix.read_block(rowa, col);
        let rand = sponge.duplex_reduced(&add_words(&input, &revisited));

        matrix.write_block(row, cols - 1 - col, &xor_words(&input, &rand));
        matrix.xor_block(rowa, col, &rotate_words(&rand));
    }
}

/// Run the wandering passes. Returns the last pseudorandomly picked row.
fn wander(sponge: &mut Sponge, matrix: &mut Matrix<'_>, mut prev: usize, time_cost: u64) -> usize {
    let rows = matrix.rows();
    let mask = rows - 1;
    let mut row: usize = 0;
    let mut rowa: usize = 0;

    for tau in 1..=time_cost {
        // Odd passes stride by about half the matrix, even passes walk back.
        // Both steps are odd, so each pass visits every row before wrapping to 0.
        let step = if tau % 2 == 0 {
            usize::MAX
        } else {
            rows / 2 - 1
        };

        loop {
            rowa = (sponge.lead_word() & mask as u64) as usize;
            duplex_row(sponge, matrix, prev, rowa, row);

            prev = row;
            row = row.wrapping_add(step) & mask;
            if row == 0 {
                break;
            }
        }
    }

    rowa
}

/// Wandering duplexing: `M[row] ^= rand`, then `M[rowa] ^= rotW(rand)`.
/// When `row == rowa` both updates land on the same block.
#[inline(always)]
fn duplex_row(sponge: &mut Sponge, matrix: &mut Matrix<'_>, prev: usize, rowa: usize, row: usize) {
    for col in 0..matrix.cols() {
        let input = matrix.read_block(prev, col);
        let picked = matrix.read_block(rowa, col);
        let rand = sponge.duplex_reduced(&add_words(&input, &picked));

        matrix.xor_block(row, col, &rand);
        matrix.xor_block(rowa, col, &rotate_words(&rand));
    }
}

#[inline(always)]
fn add_words(a: &Block, b: &Block) -> Block {
    let mut out = [0u64; BLOCK_LEN_WORDS];
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = x.wrapping_add(*y);
    }
    out
}

#[inline(always)]
fn xor_words(a: &Block, b: &Block) -> Block {
    let mut out = [0u64; BLOCK_LEN_WORDS];
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = x ^ y;
    }
    out
}

/// Reusable Lyra2 context
///
/// Owns a matrix sized for one parameter set, so repeated hashing (e.g.
/// over nonce candidates) allocates once. One context serves one thread.
pub struct Lyra2 {
    params: Params,
    matrix: MatrixBuf,
}

impl Lyra2 {
    /// Allocate a context for `params`.
    pub fn new(params: Params) -> Result<Self> {
        let matrix = MatrixBuf::new(&params)?;
        Ok(Self { params, matrix })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Hash into `output`, whose length is the requested output length.
    pub fn hash_into(&mut self, output: &mut [u8], password: &[u8], salt: &[u8]) -> Result<()> {
        compute(output, self.matrix.as_mut_words(), password, salt, &self.params)
    }

    /// Hash to a fixed-size array.
    pub fn hash<const N: usize>(&mut self, password: &[u8], salt: &[u8]) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.hash_into(&mut out, password, salt)?;
        Ok(out)
    }
}

/// Lyra2REv2 over `input`, used as both password and salt.
///
/// Allocates a fresh matrix per call; prefer a [`Lyra2`] context in loops.
pub fn lyra2rev2(input: &[u8]) -> Result<[u8; 32]> {
    Lyra2::new(Params::LYRA2REV2)?.hash(input, input)
}

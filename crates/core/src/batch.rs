//! Parallel evaluation of independent invocations
//!
//! A single Lyra2 call is sequential. Separate calls share nothing, so a
//! batch is spread over the rayon pool with one [`Lyra2`] context (and
//! therefore one matrix) per worker.

use rayon::prelude::*;

use crate::error::Result;
use crate::lyra2::Lyra2;
use crate::params::Params;

/// Hash every candidate with `password = salt = candidate`.
///
/// Results are returned in input order.
pub fn hash_batch(params: &Params, output_len: usize, candidates: &[&[u8]]) -> Result<Vec<Vec<u8>>> {
    // Reject bad parameters once instead of once per worker.
    params.validate()?;

    candidates
        .par_iter()
        .map_init(
            || Lyra2::new(*params),
            |ctx, candidate| -> Result<Vec<u8>> {
                let ctx = ctx.as_mut().map_err(|err| *err)?;
                let mut out = vec![0u8; output_len];
                ctx.hash_into(&mut out, candidate, candidate)?;
                Ok(out)
            },
        )
        .collect()
}

/// Hash `(password, salt)` pairs, results in input order.
pub fn hash_batch_salted(
    params: &Params,
    output_len: usize,
    pairs: &[(&[u8], &[u8])],
) -> Result<Vec<Vec<u8>>> {
    params.validate()?;

    pairs
        .par_iter()
        .map_init(
            || Lyra2::new(*params),
            |ctx, (password, salt)| -> Result<Vec<u8>> {
                let ctx = ctx.as_mut().map_err(|err| *err)?;
                let mut out = vec![0u8; output_len];
                ctx.hash_into(&mut out, password, salt)?;
                Ok(out)
            },
        )
        .collect()
}

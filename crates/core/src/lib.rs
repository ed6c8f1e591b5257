//! # Lyra2 Core Algorithm
//!
//! Memory-hard sponge hash used as the proof-of-work function of the
//! Lyra2RE family of coins.
//!
//! ## Construction
//!
//! - 16-word sponge over a BLAKE2b round function (no message words)
//! - Full 12-round permutation for input absorption and output
//! - Single reduced round while filling and wandering the matrix
//! - Matrix of `rows x cols` blocks of 12 words, supplied by the caller or
//!   owned by a reusable [`Lyra2`] context
//!
//! ## Presets
//!
//! - [`Params::LYRA2REV2`]: t = 1, 4 x 4 matrix (6 KiB)
//! - [`Params::LYRA2RE`]: t = 1, 8 x 8 matrix with the legacy input stride
//!
//! ## Example
//!
//! ```rust
//! use lyra2_core::{Lyra2, Params, compute, lyra2rev2};
//!
//! // Proof-of-work: the 80-byte header is both password and salt
//! let header = [0u8; 80];
//! let pow = lyra2rev2(&header).unwrap();
//!
//! // Reusable context (allocates the matrix once)
//! let mut ctx = Lyra2::new(Params::new(1, 16, 4)).unwrap();
//! let key: [u8; 64] = ctx.hash(b"password", b"salt").unwrap();
//!
//! // Caller-owned matrix
//! let params = Params::LYRA2REV2;
//! let mut matrix = vec![0u64; params.matrix_words().unwrap()];
//! let mut out = [0u8; 32];
//! compute(&mut out, &mut matrix, &header, &header, &params).unwrap();
//! assert_eq!(out, pow);
//! # let _ = key;
//! ```
//!
//! ## no_std Support
//!
//! This crate supports `no_std` environments with the `alloc` crate:
//!
//! ```toml
//! [dependencies]
//! lyra2-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

mod error;
mod lyra2;
mod matrix;
mod padding;
mod params;
mod sponge;

#[cfg(feature = "parallel")]
mod batch;

#[cfg(feature = "std")]
mod ffi;

pub use error::{Error, ParamError, Result};
pub use lyra2::{Lyra2, compute, lyra2rev2};
pub use params::*;

#[cfg(feature = "parallel")]
pub use batch::{hash_batch, hash_batch_salted};

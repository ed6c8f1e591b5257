//! Lyra2 Miner Library
//!
//! Proof-of-work hashing for the Lyra2RE family and the caller side of
//! mining: share targets and nonce scanning.
//!
//! # Example
//!
//! ```rust
//! use lyra2::scan::{HEADER_NONCE_OFFSET, ScanControl, Work, scan_range};
//! use lyra2::{Lyra2, Params, Target};
//!
//! let work = Work::new(vec![0u8; 80], HEADER_NONCE_OFFSET, Target::from_difficulty_bits(2)).unwrap();
//! let mut ctx = Lyra2::new(Params::LYRA2REV2).unwrap();
//! let control = ScanControl::new();
//!
//! if let Some(share) = scan_range(&mut ctx, &work, 0..=1000, &control).unwrap() {
//!     println!("nonce {} -> {}", share.nonce, hex::encode(share.hash));
//! }
//! ```

// Re-export the core algorithm
pub use lyra2_core as algorithm;

pub mod scan;
pub mod target;

// Convenience re-exports
pub use algorithm::{compute, lyra2rev2, Lyra2, Params};
pub use target::Target;

//! Nonce scanning
//!
//! The caller side of the proof-of-work: write each candidate nonce into the
//! header, hash it with `password = salt = header` and compare against the
//! share target. Every worker owns its own [`Lyra2`] context; the only
//! shared state is the [`ScanControl`] counters.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

use log::{debug, info};
use serde::Serialize;

use crate::algorithm::{self, Lyra2, Params};
use crate::target::Target;

/// Nonce offset in an 80-byte block header
pub const HEADER_NONCE_OFFSET: usize = 76;

/// Nonces left unscanned at the end of each thread's slice
pub const RANGE_MARGIN: u32 = 0x20;

/// Errors from the scan loop
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("hash failed: {0}")]
    Hash(#[from] algorithm::Error),

    #[error("nonce at offset {offset} does not fit in a {len}-byte header")]
    NonceOutOfBounds { offset: usize, len: usize },

    #[error("thread count must be positive")]
    NoThreads,

    #[error("scan worker panicked")]
    WorkerPanicked,
}

/// Nonce slice for worker `thread` of `threads`.
///
/// Slices start at `(0xffffffff / threads) * thread` and stop
/// [`RANGE_MARGIN`] short of the next slice; the last one runs to
/// `u32::MAX`. A `thread` outside `0..threads` gets an empty range.
pub fn nonce_range(thread: usize, threads: usize) -> RangeInclusive<u32> {
    let threads = threads.max(1) as u64;
    let id = thread as u64;
    if id >= threads {
        return 1..=0;
    }

    let max = u64::from(u32::MAX);
    let chunk = max / threads;
    let start = chunk * id;
    let end = if id + 1 == threads {
        max
    } else {
        (chunk * (id + 1))
            .saturating_sub(u64::from(RANGE_MARGIN))
            .max(start)
    };
    // Both bounds are at most `max`.
    start as u32..=end as u32
}

/// A header to scan and the target its hash must meet.
#[derive(Debug, Clone)]
pub struct Work {
    header: Vec<u8>,
    nonce_offset: usize,
    target: Target,
}

impl Work {
    /// The nonce is a little-endian u32 at `nonce_offset`.
    pub fn new(header: Vec<u8>, nonce_offset: usize, target: Target) -> Result<Self, ScanError> {
        if nonce_offset.checked_add(4).is_none_or(|end| end > header.len()) {
            return Err(ScanError::NonceOutOfBounds {
                offset: nonce_offset,
                len: header.len(),
            });
        }
        Ok(Self {
            header,
            nonce_offset,
            target,
        })
    }

    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Write `nonce` into `header`, a copy of [`Work::header`].
    #[inline]
    pub fn put_nonce(&self, header: &mut [u8], nonce: u32) {
        header[self.nonce_offset..self.nonce_offset + 4].copy_from_slice(&nonce.to_le_bytes());
    }
}

/// A nonce whose hash meets the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Share {
    pub nonce: u32,
    pub hash: [u8; 32],
}

/// Stop flag and hash counter shared by the workers of one scan.
#[derive(Debug, Default)]
pub struct ScanControl {
    stop: AtomicBool,
    hashes: AtomicU64,
}

impl ScanControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every worker to return after its current hash.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Hashes computed so far
    pub fn hashes(&self) -> u64 {
        self.hashes.load(Ordering::Relaxed)
    }
}

/// Scan configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    pub params: Params,
    pub threads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            params: Params::LYRA2REV2,
            threads: 1,
        }
    }
}

/// Hash every nonce in `range` until one meets the target, the range runs
/// out or `control` is stopped.
pub fn scan_range(
    ctx: &mut Lyra2,
    work: &Work,
    range: RangeInclusive<u32>,
    control: &ScanControl,
) -> Result<Option<Share>, ScanError> {
    let mut header = work.header.clone();
    let mut hash = [0u8; 32];

    for nonce in range {
        if control.is_stopped() {
            debug!("scan stopped before nonce {:#010x}", nonce);
            return Ok(None);
        }

        work.put_nonce(&mut header, nonce);
        ctx.hash_into(&mut hash, &header, &header)?;
        control.hashes.fetch_add(1, Ordering::Relaxed);

        if work.target.is_met_by(&hash) {
            info!("share found at nonce {:#010x}", nonce);
            return Ok(Some(Share { nonce, hash }));
        }
    }

    Ok(None)
}

/// Scan the whole nonce space with `config.threads` workers.
///
/// The first share found stops the other workers through `control`. When
/// several workers finish with a share, the lowest thread index wins.
pub fn scan_parallel(
    work: &Work,
    config: &ScanConfig,
    control: &ScanControl,
) -> Result<Option<Share>, ScanError> {
    if config.threads == 0 {
        return Err(ScanError::NoThreads);
    }
    info!(
        "scanning with {} threads, target {}",
        config.threads, work.target
    );

    let results: Vec<Result<Option<Share>, ScanError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..config.threads)
            .map(|thread_id| {
                let range = nonce_range(thread_id, config.threads);
                scope.spawn(move || -> Result<Option<Share>, ScanError> {
                    let mut ctx = Lyra2::new(config.params)?;
                    debug!(
                        "worker {} scanning {:#010x}..={:#010x}",
                        thread_id,
                        range.start(),
                        range.end()
                    );
                    let found = scan_range(&mut ctx, work, range, control)?;
                    if found.is_some() {
                        control.stop();
                    }
                    Ok(found)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(Err(ScanError::WorkerPanicked)))
            .collect()
    });

    let mut share = None;
    for result in results {
        match result? {
            Some(found) if share.is_none() => share = Some(found),
            _ => {}
        }
    }
    Ok(share)
}

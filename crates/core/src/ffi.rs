//! C FFI bindings for native miners and mobile platforms
//!
//! Every function returns a status code: [`LYRA2_OK`],
//! [`LYRA2_INVALID_PARAMETER`] or [`LYRA2_ALLOCATION_FAILED`].

use core::slice;

use crate::error::Error;
use crate::lyra2::{Lyra2, compute};
use crate::params::Params;

pub const LYRA2_OK: i32 = 0;
pub const LYRA2_INVALID_PARAMETER: i32 = -1;
pub const LYRA2_ALLOCATION_FAILED: i32 = -2;

fn status(result: Result<(), Error>) -> i32 {
    match result {
        Ok(()) => LYRA2_OK,
        Err(Error::InvalidParameter(_)) => LYRA2_INVALID_PARAMETER,
        Err(Error::AllocationFailed { .. }) => LYRA2_ALLOCATION_FAILED,
    }
}

/// Borrow `len` bytes at `ptr`, treating a null pointer with zero length as
/// an empty slice.
unsafe fn bytes<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if ptr.is_null() {
        return if len == 0 { Some(&[]) } else { None };
    }
    Some(unsafe { slice::from_raw_parts(ptr, len) })
}

/// Opaque hasher handle for FFI
pub struct Lyra2Hasher {
    inner: Lyra2,
}

/// Size in bytes of the scratch matrix for the given costs, or 0 if the
/// parameters are invalid.
#[unsafe(no_mangle)]
pub extern "C" fn lyra2_matrix_bytes(time_cost: u64, rows: u64, cols: u64) -> u64 {
    let params = Params::new(time_cost, rows as usize, cols as usize);
    match params.validate() {
        Ok(_) => params.matrix_bytes().map_or(0, |b| b as u64),
        Err(_) => 0,
    }
}

/// Compute Lyra2 with a caller-owned scratch buffer.
///
/// - scratch: 8-byte aligned, at least `lyra2_matrix_bytes(...)` bytes
/// - output: `output_len` bytes, written only on success
#[unsafe(no_mangle)]
pub extern "C" fn lyra2_compute(
    output: *mut u8,
    output_len: usize,
    scratch: *mut u8,
    scratch_len: usize,
    password: *const u8,
    password_len: usize,
    salt: *const u8,
    salt_len: usize,
    time_cost: u64,
    rows: u64,
    cols: u64,
) -> i32 {
    let params = Params::new(time_cost, rows as usize, cols as usize);
    if let Err(err) = params.validate() {
        return status(Err(err));
    }
    if output.is_null() || output_len == 0 {
        return LYRA2_INVALID_PARAMETER;
    }
    if scratch.is_null() || scratch.align_offset(align_of::<u64>()) != 0 {
        return LYRA2_ALLOCATION_FAILED;
    }

    unsafe {
        let (Some(password), Some(salt)) = (bytes(password, password_len), bytes(salt, salt_len))
        else {
            return LYRA2_INVALID_PARAMETER;
        };
        let matrix = slice::from_raw_parts_mut(scratch as *mut u64, scratch_len / 8);
        let output = slice::from_raw_parts_mut(output, output_len);
        status(compute(output, matrix, password, salt, &params))
    }
}

/// Create a new hasher instance owning its matrix.
/// Returns null if the parameters are invalid; free with `lyra2_free`.
#[unsafe(no_mangle)]
pub extern "C" fn lyra2_new(time_cost: u64, rows: u64, cols: u64) -> *mut Lyra2Hasher {
    match Lyra2::new(Params::new(time_cost, rows as usize, cols as usize)) {
        Ok(inner) => Box::into_raw(Box::new(Lyra2Hasher { inner })),
        Err(_) => core::ptr::null_mut(),
    }
}

/// Free a hasher instance
#[unsafe(no_mangle)]
pub extern "C" fn lyra2_free(hasher: *mut Lyra2Hasher) {
    if !hasher.is_null() {
        unsafe {
            let _ = Box::from_raw(hasher);
        }
    }
}

/// Hash with a hasher from `lyra2_new`.
#[unsafe(no_mangle)]
pub extern "C" fn lyra2_hash(
    hasher: *mut Lyra2Hasher,
    password: *const u8,
    password_len: usize,
    salt: *const u8,
    salt_len: usize,
    output: *mut u8,
    output_len: usize,
) -> i32 {
    if hasher.is_null() {
        return LYRA2_ALLOCATION_FAILED;
    }
    if output.is_null() || output_len == 0 {
        return LYRA2_INVALID_PARAMETER;
    }

    unsafe {
        let (Some(password), Some(salt)) = (bytes(password, password_len), bytes(salt, salt_len))
        else {
            return LYRA2_INVALID_PARAMETER;
        };
        let hasher = &mut *hasher;
        let output = slice::from_raw_parts_mut(output, output_len);
        status(hasher.inner.hash_into(output, password, salt))
    }
}

/// Benchmark: compute N Lyra2REv2 hashes over 80-byte headers and return
/// total microseconds.
#[unsafe(no_mangle)]
pub extern "C" fn lyra2_benchmark(iterations: u32) -> u64 {
    use std::time::Instant;

    let Ok(mut ctx) = Lyra2::new(Params::LYRA2REV2) else {
        return 0;
    };
    let mut header = [0u8; 80];
    let mut out = [0u8; 32];

    let start = Instant::now();
    for i in 0..iterations {
        header[76..80].copy_from_slice(&i.to_le_bytes());
        let _ = ctx.hash_into(&mut out, &header, &header);
    }
    let elapsed = start.elapsed();

    elapsed.as_micros() as u64
}

/// Get hash rate (hashes per second) from a benchmark run
#[unsafe(no_mangle)]
pub extern "C" fn lyra2_hashrate(iterations: u32, microseconds: u64) -> f64 {
    if microseconds == 0 {
        return 0.0;
    }
    (iterations as f64) / (microseconds as f64 / 1_000_000.0)
}

//! Padded input builder
//!
//! Layout, in bytes, starting at word 0 of the matrix:
//!
//! ```text
//! password || salt || output_len || password_len || salt_len
//!          || time_cost || rows || cols || 0x80 || 0x00 ... (0x01 xored into the last byte)
//! ```
//!
//! Integers are u64 little-endian and the region is a whole number of
//! 64-byte blocks. Bytes are packed into matrix words little-endian, so the
//! staged words are identical on every host.

use crate::error::{Error, ParamError};
use crate::params::{BASIL_WORDS, InputStride, Params, SAFE_BLOCK_LEN_BYTES, SAFE_BLOCK_LEN_WORDS};

/// Password, salt and cost parameters waiting to be staged in the matrix.
#[derive(Debug, Clone, Copy)]
pub struct PaddedInput<'a> {
    password: &'a [u8],
    salt: &'a [u8],
    output_len: usize,
    params: &'a Params,
}

impl<'a> PaddedInput<'a> {
    pub fn new(password: &'a [u8], salt: &'a [u8], output_len: usize, params: &'a Params) -> Self {
        Self {
            password,
            salt,
            output_len,
            params,
        }
    }

    /// Number of 64-byte blocks fed to the sponge
    pub fn block_count(&self) -> usize {
        (self.password.len() + self.salt.len() + BASIL_WORDS * 8) / SAFE_BLOCK_LEN_BYTES + 1
    }

    /// Words holding staged bytes
    pub fn staged_words(&self) -> usize {
        self.block_count() * SAFE_BLOCK_LEN_WORDS
    }

    /// Input stride of the absorb loop, in words
    pub fn stride(&self) -> usize {
        self.params.input_stride.words()
    }

    /// Words touched by staging and absorption.
    ///
    /// Under the legacy stride the absorbed blocks reach past the staged
    /// bytes; those words are zeroed during staging.
    pub fn footprint_words(&self) -> usize {
        let absorbed = (self.block_count() - 1) * self.stride() + SAFE_BLOCK_LEN_WORDS;
        match self.params.input_stride {
            InputStride::Packed => self.staged_words(),
            InputStride::Legacy => absorbed.max(self.staged_words()),
        }
    }

    /// Fail if the input does not fit in a matrix of `available` words.
    pub fn check_fits(&self, available: usize) -> Result<(), Error> {
        let required = self.footprint_words();
        if required > available {
            return Err(ParamError::InputTooLong {
                required,
                available,
            }
            .into());
        }
        Ok(())
    }

    /// Write the padded input into `words[..footprint_words()]`.
    ///
    /// The caller must have called [`check_fits`](Self::check_fits).
    pub fn write(&self, words: &mut [u64]) {
        let footprint = &mut words[..self.footprint_words()];
        footprint.fill(0);

        let basil = [
            self.output_len as u64,
            self.password.len() as u64,
            self.salt.len() as u64,
            self.params.time_cost,
            self.params.rows as u64,
            self.params.cols as u64,
        ];

        let mut writer = ByteWriter::new(footprint);
        writer.put(self.password);
        writer.put(self.salt);
        for value in basil {
            writer.put(&value.to_le_bytes());
        }
        writer.put(&[0x80]);

        writer.xor_byte(self.staged_words() * 8 - 1, 0x01);
    }
}

/// Little-endian byte cursor over a zeroed word buffer
struct ByteWriter<'w> {
    words: &'w mut [u64],
    pos: usize,
}

impl<'w> ByteWriter<'w> {
    fn new(words: &'w mut [u64]) -> Self {
        Self { words, pos: 0 }
    }

    fn put(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.xor_byte(self.pos, b);
            self.pos += 1;
        }
    }

    #[inline]
    fn xor_byte(&mut self, pos: usize, b: u8) {
        self.words[pos / 8] ^= (b as u64) << (8 * (pos % 8));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "std"))]
    use alloc::{vec, vec::Vec};

    fn to_bytes(words: &[u64]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn test_block_count() {
        let params = Params::LYRA2REV2;
        // 8 + 4 + 48 = 60 bytes: one block with room for 0x80
        assert_eq!(PaddedInput::new(b"password", b"salt", 32, &params).block_count(), 1);
        // 16 + 0 + 48 = 64 bytes: the 0x80 byte spills into a second block
        assert_eq!(PaddedInput::new(&[0u8; 16], b"", 32, &params).block_count(), 2);
        // Lyra2REv2 usage: 32-byte password and salt
        assert_eq!(PaddedInput::new(&[0u8; 32], &[0u8; 32], 32, &params).block_count(), 2);
    }

    #[test]
    fn test_layout() {
        let params = Params::new(3, 16, 4);
        let input = PaddedInput::new(b"password", b"salt", 32, &params);
        let mut words = vec![u64::MAX; params.matrix_words().unwrap()];
        input.write(&mut words);

        let bytes = to_bytes(&words[..input.staged_words()]);
        assert_eq!(bytes.len(), 64);
        assert_eq!(&bytes[..8], b"password");
        assert_eq!(&bytes[8..12], b"salt");
        assert_eq!(&bytes[12..20], &32u64.to_le_bytes());
        assert_eq!(&bytes[20..28], &8u64.to_le_bytes());
        assert_eq!(&bytes[28..36], &4u64.to_le_bytes());
        assert_eq!(&bytes[36..44], &3u64.to_le_bytes());
        assert_eq!(&bytes[44..52], &16u64.to_le_bytes());
        assert_eq!(&bytes[52..60], &4u64.to_le_bytes());
        assert_eq!(bytes[60], 0x80);
        assert_eq!(&bytes[61..63], &[0, 0]);
        assert_eq!(bytes[63], 0x01);

        // Words past the staged region are left alone.
        assert_eq!(words[input.staged_words()], u64::MAX);
    }

    #[test]
    fn test_marker_bytes_can_share_the_last_byte() {
        // 15 + 0 + 48 = 63, so 0x80 lands on the final byte of the block.
        let params = Params::LYRA2REV2;
        let password = [0xAAu8; 15];
        let input = PaddedInput::new(&password, b"", 1, &params);
        assert_eq!(input.block_count(), 1);

        let mut words = vec![0u64; params.matrix_words().unwrap()];
        input.write(&mut words);
        let bytes = to_bytes(&words[..8]);
        assert_eq!(bytes[63], 0x81);
    }

    #[test]
    fn test_legacy_footprint_zeroes_stride_gaps() {
        let params = Params::LYRA2RE;
        let input = PaddedInput::new(&[1u8; 32], &[2u8; 32], 32, &params);
        assert_eq!(input.block_count(), 2);
        assert_eq!(input.staged_words(), 16);
        assert_eq!(input.footprint_words(), 64 + 8);

        let mut words = vec![u64::MAX; params.matrix_words().unwrap()];
        input.write(&mut words);
        assert!(words[16..72].iter().all(|&w| w == 0));
        assert_eq!(words[72], u64::MAX);
    }

    #[test]
    fn test_input_too_long() {
        let params = Params::LYRA2REV2;
        let available = params.matrix_words().unwrap();
        let password = [0u8; 2000];
        let input = PaddedInput::new(&password, b"salt", 32, &params);
        assert_eq!(
            input.check_fits(available),
            Err(Error::InvalidParameter(ParamError::InputTooLong {
                required: input.footprint_words(),
                available,
            }))
        );

        let fits = PaddedInput::new(&[0u8; 32], &[0u8; 32], 32, &params);
        assert!(fits.check_fits(available).is_ok());
    }
}

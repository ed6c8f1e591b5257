//! Sponge primitives for Lyra2
//!
//! The permutation is the BLAKE2b round function with the message words
//! removed. Input absorption, the wrap-up absorb and the output squeeze use
//! [`FULL_ROUNDS`]; row filling and wandering use [`REDUCED_ROUNDS`].

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::params::{
    BLOCK_LEN_BYTES, BLOCK_LEN_WORDS, FULL_ROUNDS, REDUCED_ROUNDS, SAFE_BLOCK_LEN_WORDS,
    STATE_WORDS,
};

/// BLAKE2b initialization vector, loaded into the capacity half of the state
const BLAKE2B_IV: [u64; 8] = [
    0x6a09e667f3bcc908,
    0xbb67ae8584caa73b,
    0x3c6ef372fe94f82b,
    0xa54ff53a5f1d36f1,
    0x510e527fade682d1,
    0x9b05688c2b3e6c1f,
    0x1f83d9abfb41bd6b,
    0x5be0cd19137e2179,
];

/// A matrix block as seen through the bitrate
pub type Block = [u64; BLOCK_LEN_WORDS];

/// 16-word duplex sponge state, wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Sponge {
    state: [u64; STATE_WORDS],
}

impl Sponge {
    /// Fresh state: zero bitrate, BLAKE2b IV in words 8..16.
    pub fn new() -> Self {
        let mut state = [0u64; STATE_WORDS];
        state[8..].copy_from_slice(&BLAKE2B_IV);
        Self { state }
    }

    /// First state word, used by the wandering phase to pick `rowa`
    #[inline(always)]
    pub fn lead_word(&self) -> u64 {
        self.state[0]
    }

    /// XOR one 8-word padded input block into the state, then run the full
    /// permutation.
    #[inline]
    pub fn absorb_input_block(&mut self, block: &[u64]) {
        debug_assert_eq!(block.len(), SAFE_BLOCK_LEN_WORDS);
        for (s, w) in self.state[..SAFE_BLOCK_LEN_WORDS].iter_mut().zip(block) {
            *s ^= *w;
        }
        permute_full(&mut self.state);
    }

    /// XOR one 12-word matrix block into the state, then run the full
    /// permutation. Used once, on the last wandered row.
    #[inline]
    pub fn absorb_block(&mut self, block: &[u64]) {
        debug_assert_eq!(block.len(), BLOCK_LEN_WORDS);
        for (s, w) in self.state[..BLOCK_LEN_WORDS].iter_mut().zip(block) {
            *s ^= *w;
        }
        permute_full(&mut self.state);
    }

    /// Read the bitrate, then advance the state with the reduced permutation.
    #[inline(always)]
    pub fn squeeze_reduced(&mut self) -> Block {
        let mut out = [0u64; BLOCK_LEN_WORDS];
        out.copy_from_slice(&self.state[..BLOCK_LEN_WORDS]);
        permute_reduced(&mut self.state);
        out
    }

    /// XOR `input` into the bitrate, run the reduced permutation and return
    /// the new bitrate.
    #[inline(always)]
    pub fn duplex_reduced(&mut self, input: &Block) -> Block {
        for (s, w) in self.state[..BLOCK_LEN_WORDS].iter_mut().zip(input) {
            *s ^= *w;
        }
        permute_reduced(&mut self.state);
        let mut out = [0u64; BLOCK_LEN_WORDS];
        out.copy_from_slice(&self.state[..BLOCK_LEN_WORDS]);
        out
    }

    /// Fill `out` from the bitrate, little-endian, applying the full
    /// permutation after every complete block.
    pub fn squeeze(&mut self, out: &mut [u8]) {
        let mut chunks = out.chunks_exact_mut(BLOCK_LEN_BYTES);
        for chunk in &mut chunks {
            write_words_le(chunk, &self.state[..BLOCK_LEN_WORDS]);
            permute_full(&mut self.state);
        }
        let rest = chunks.into_remainder();
        write_words_le(rest, &self.state[..BLOCK_LEN_WORDS]);
    }
}

impl Default for Sponge {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `words` into `out` as little-endian bytes, truncated to `out.len()`.
#[inline]
fn write_words_le(out: &mut [u8], words: &[u64]) {
    for (bytes, word) in out.chunks_mut(8).zip(words) {
        let le = word.to_le_bytes();
        bytes.copy_from_slice(&le[..bytes.len()]);
    }
}

/// Rotate a block right by one word: `out[0] = b[11]`, `out[j] = b[j - 1]`.
#[inline(always)]
pub fn rotate_words(block: &Block) -> Block {
    let mut out = [0u64; BLOCK_LEN_WORDS];
    out[0] = block[BLOCK_LEN_WORDS - 1];
    out[1..].copy_from_slice(&block[..BLOCK_LEN_WORDS - 1]);
    out
}

#[inline(always)]
fn permute_full(v: &mut [u64; STATE_WORDS]) {
    for _ in 0..FULL_ROUNDS {
        round(v);
    }
}

#[inline(always)]
fn permute_reduced(v: &mut [u64; STATE_WORDS]) {
    for _ in 0..REDUCED_ROUNDS {
        round(v);
    }
}

/// One BLAKE2b round: four column mixes, then four diagonal mixes
#[inline(always)]
fn round(v: &mut [u64; STATE_WORDS]) {
    g(v, 0, 4, 8, 12);
    g(v, 1, 5, 9, 13);
    g(v, 2, 6, 10, 14);
    g(v, 3, 7, 11, 15);

    g(v, 0, 5, 10, 15);
    g(v, 1, 6, 11, 12);
    g(v, 2, 7, 8, 13);
    g(v, 3, 4, 9, 14);
}

/// BLAKE2b G mixing function without message words
#[inline(always)]
fn g(v: &mut [u64; STATE_WORDS], a: usize, b: usize, c: usize, d: usize) {
    v[a] = v[a].wrapping_add(v[b]);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);
    v[a] = v[a].wrapping_add(v[b]);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let sponge = Sponge::new();
        assert_eq!(&sponge.state[..8], &[0u64; 8]);
        assert_eq!(&sponge.state[8..], &BLAKE2B_IV);
        assert_eq!(sponge.lead_word(), 0);
    }

    #[test]
    fn test_reduced_and_full_permutations_differ() {
        let mut full = Sponge::new();
        let mut reduced = Sponge::new();
        permute_full(&mut full.state);
        permute_reduced(&mut reduced.state);
        assert_ne!(full.state, reduced.state);
        assert_ne!(full.state, Sponge::new().state);
    }

    #[test]
    fn test_g_on_zero_state_is_fixed_point() {
        // G on an all-zero state stays zero; the IV is what breaks symmetry.
        let mut v = [0u64; STATE_WORDS];
        round(&mut v);
        assert_eq!(v, [0u64; STATE_WORDS]);
    }

    #[test]
    fn test_duplex_returns_new_bitrate() {
        let mut sponge = Sponge::new();
        let input = [7u64; BLOCK_LEN_WORDS];
        let rand = sponge.duplex_reduced(&input);
        assert_eq!(&rand[..], &sponge.state[..BLOCK_LEN_WORDS]);

        let mut manual = Sponge::new();
        for w in &mut manual.state[..BLOCK_LEN_WORDS] {
            *w ^= 7;
        }
        permute_reduced(&mut manual.state);
        assert_eq!(manual.state, sponge.state);
    }

    #[test]
    fn test_squeeze_reduced_reads_before_permuting() {
        let mut sponge = Sponge::new();
        let before = sponge.state;
        let block = sponge.squeeze_reduced();
        assert_eq!(&block[..], &before[..BLOCK_LEN_WORDS]);
        assert_ne!(sponge.state, before);
    }

    #[test]
    fn test_rotate_words() {
        let mut block = [0u64; BLOCK_LEN_WORDS];
        for (i, w) in block.iter_mut().enumerate() {
            *w = i as u64;
        }
        let rotated = rotate_words(&block);
        assert_eq!(rotated[0], 11);
        assert_eq!(rotated[1], 0);
        assert_eq!(rotated[11], 10);
    }

    #[test]
    fn test_squeeze_spans_blocks() {
        let mut a = Sponge::new();
        a.absorb_block(&[1u64; BLOCK_LEN_WORDS]);
        let mut b = a.clone();

        let mut short = [0u8; 40];
        a.squeeze(&mut short);
        let mut long = [0u8; 2 * BLOCK_LEN_BYTES + 5];
        b.squeeze(&mut long);

        // Prefix agrees, and the second block is not a repeat of the first.
        assert_eq!(&short[..], &long[..40]);
        assert_ne!(&long[..BLOCK_LEN_BYTES], &long[BLOCK_LEN_BYTES..2 * BLOCK_LEN_BYTES]);
    }

    #[test]
    fn test_squeeze_is_little_endian() {
        let mut sponge = Sponge::new();
        sponge.state[0] = 0x0807060504030201;
        let mut out = [0u8; 8];
        sponge.squeeze(&mut out);
        assert_eq!(out, [1, 2, 3, 4, 5, 6, 7, 8]);
    }
}

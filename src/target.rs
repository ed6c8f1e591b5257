//! Share targets
//!
//! A [`Target`] reads the hash as a 256-bit little-endian number (last byte
//! most significant) and accepts it when `hash <= target`, the way Lyra2RE
//! pools and daemons compare shares. Difficulty bits count leading zeros
//! from that most significant byte.

use std::cmp::Ordering;
use std::fmt;

/// Reasons a compact `nbits` value cannot become a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("compact target {0:#010x} has the sign bit set")]
    Negative(u32),

    #[error("compact target {0:#010x} does not fit in 256 bits")]
    Overflow(u32),
}

/// 256-bit share target, stored little-endian.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    bytes: [u8; 32],
}

impl Target {
    /// Accepts every hash.
    pub const MAX: Target = Target { bytes: [0xff; 32] };

    pub const fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    pub const fn to_le_bytes(&self) -> [u8; 32] {
        self.bytes
    }

    /// `2^(256 - bits) - 1`: the top `bits` bits of the hash must be zero.
    pub fn from_difficulty_bits(bits: u32) -> Self {
        let mut bytes = [0xffu8; 32];
        for bit in 0..bits.min(256) as usize {
            let pos = 255 - bit;
            bytes[pos / 8] &= !(1u8 << (pos % 8));
        }
        Self { bytes }
    }

    /// Decode the compact `nbits` form: `mantissa * 256^(exponent - 3)`.
    pub fn from_compact(nbits: u32) -> Result<Self, TargetError> {
        let exponent = (nbits >> 24) as usize;
        let mut mantissa = nbits & 0x007f_ffff;
        if mantissa != 0 && nbits & 0x0080_0000 != 0 {
            return Err(TargetError::Negative(nbits));
        }

        let mut bytes = [0u8; 32];
        if exponent <= 3 {
            mantissa >>= 8 * (3 - exponent);
            bytes[..3].copy_from_slice(&mantissa.to_le_bytes()[..3]);
            return Ok(Self { bytes });
        }

        for (i, b) in mantissa.to_le_bytes()[..3].iter().enumerate() {
            let at = exponent - 3 + i;
            if *b == 0 {
                continue;
            }
            if at >= bytes.len() {
                return Err(TargetError::Overflow(nbits));
            }
            bytes[at] = *b;
        }
        Ok(Self { bytes })
    }

    /// `true` if `hash`, read little-endian, does not exceed the target.
    pub fn is_met_by(&self, hash: &[u8; 32]) -> bool {
        compare_le(hash, &self.bytes) != Ordering::Greater
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::MAX
    }
}

/// Compare two little-endian 256-bit numbers, most significant byte first.
fn compare_le(a: &[u8; 32], b: &[u8; 32]) -> Ordering {
    a.iter().rev().cmp(b.iter().rev())
}

/// Big-endian hex, the way targets are usually printed.
impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut be = self.bytes;
        be.reverse();
        f.write_str(&hex::encode(be))
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_bits_target() {
        let target = Target::from_difficulty_bits(8);
        let bytes = target.to_le_bytes();
        assert_eq!(bytes[31], 0x00);
        assert!(bytes[..31].iter().all(|&b| b == 0xff));

        let mut hash = [0xffu8; 32];
        hash[31] = 0x00;
        assert!(target.is_met_by(&hash));
        hash[31] = 0x01;
        assert!(!target.is_met_by(&hash));

        // Zero bits are counted from the last byte, not the first.
        let mut first_byte_zero = [0xffu8; 32];
        first_byte_zero[0] = 0x00;
        assert!(!target.is_met_by(&first_byte_zero));

        assert_eq!(Target::from_difficulty_bits(0), Target::MAX);
        assert_eq!(Target::from_difficulty_bits(300).to_le_bytes(), [0u8; 32]);
        assert_eq!(Target::from_difficulty_bits(12).to_le_bytes()[30], 0x0f);
    }

    #[test]
    fn test_compact_target() {
        // Bitcoin difficulty-1 target
        let target = Target::from_compact(0x1d00ffff).unwrap();
        assert_eq!(
            target.to_string(),
            "00000000ffff0000000000000000000000000000000000000000000000000000"
        );

        let small = Target::from_compact(0x03123456).unwrap().to_le_bytes();
        assert_eq!(&small[..4], &[0x56, 0x34, 0x12, 0x00]);

        let shifted = Target::from_compact(0x01123456).unwrap().to_le_bytes();
        assert_eq!(&shifted[..2], &[0x12, 0x00]);

        assert_eq!(Target::from_compact(0x04923456), Err(TargetError::Negative(0x04923456)));
        assert_eq!(Target::from_compact(0x23000001), Err(TargetError::Overflow(0x23000001)));
        assert!(Target::from_compact(0x2100ffff).is_ok());
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let target = Target::from_compact(0x1d00ffff).unwrap();
        let at = target.to_le_bytes();
        assert!(target.is_met_by(&at));

        let mut above = at;
        above[0] = 0x01;
        assert!(!target.is_met_by(&above));

        let mut below = at;
        below[26] = 0xfe;
        below[0] = 0xff;
        assert!(target.is_met_by(&below));
    }
}

//! Packed bit storage and chunk extraction.
//!
//! Bits are addressed globally: byte `idx >> 3`, and within the byte the
//! least-significant bit first (`1 << (idx & 7)`). The hash reduction's
//! known-answer vectors depend on this exact ordering.

/// Returns the number of bits needed to represent values in `[0, radix)`,
/// i.e. the unique `n` with `2^(n-1) < radix <= 2^n`.
pub fn ceil_log2(radix: u32) -> u32 {
    let mut y = radix;
    let mut n = 0;
    while (y >> 1) > 0 {
        y >>= 1;
        n += 1;
    }
    if n < 32 && (1u32 << n) != radix {
        n += 1;
    }
    n
}

/// Sets the bit at global index `idx`.
#[inline]
pub fn set_bit(bytes: &mut [u8], idx: usize) {
    bytes[idx >> 3] |= 1 << (idx & 7);
}

/// Clears the bit at global index `idx`.
#[inline]
pub fn unset_bit(bytes: &mut [u8], idx: usize) {
    bytes[idx >> 3] &= !(1 << (idx & 7));
}

/// Reads the bit at global index `idx`.
#[inline]
pub fn get_bit(bytes: &[u8], idx: usize) -> bool {
    bytes[idx >> 3] & (1 << (idx & 7)) != 0
}

/// Reads the `i`-th `k`-bit chunk, starting at bit `i * k`, composing bits
/// most-significant-first.
pub fn get_chunk(bytes: &[u8], k: usize, i: usize) -> u32 {
    let mut chunk = 0u32;
    for j in 0..k {
        chunk = (chunk << 1) | get_bit(bytes, i * k + j) as u32;
    }
    chunk
}

/// A fixed-length packed bit buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitVec {
    bytes: Vec<u8>,
    nbits: usize,
}

impl BitVec {
    /// Returns a zeroed bit vector holding `nbits` bits.
    pub fn new(nbits: usize) -> Self {
        Self {
            bytes: vec![0; nbits.div_ceil(8)],
            nbits,
        }
    }

    #[inline]
    pub fn set(&mut self, idx: usize) {
        set_bit(&mut self.bytes, idx);
    }

    #[inline]
    pub fn unset(&mut self, idx: usize) {
        unset_bit(&mut self.bytes, idx);
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        get_bit(&self.bytes, idx)
    }

    /// Number of bits held.
    pub fn len(&self) -> usize {
        self.nbits
    }

    pub fn is_empty(&self) -> bool {
        self.nbits == 0
    }

    /// Clears every bit.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Underlying byte storage.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceil_log2() {
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(3), 2);
        assert_eq!(ceil_log2(700), 10);
        assert_eq!(ceil_log2(1024), 10);
        assert_eq!(ceil_log2(1025), 11);
        assert_eq!(ceil_log2(30000), 15);
    }

    #[test]
    fn test_set_get_unset_bit() {
        let mut bytes = [0u8; 8];
        for idx in [0, 1, 7, 8, 13, 63] {
            set_bit(&mut bytes, idx);
            assert!(get_bit(&bytes, idx));

            // Neighbors are unaffected.
            for other in 0..64 {
                if other != idx {
                    assert!(!get_bit(&bytes, other), "bit {other} set along with {idx}");
                }
            }

            unset_bit(&mut bytes, idx);
            assert!(!get_bit(&bytes, idx));
            assert_eq!(bytes, [0u8; 8]);
        }
    }

    #[test]
    fn test_get_chunk_alternating() {
        // Alternating all-ones / all-zeros 10-bit chunks over a digest-sized
        // buffer, written and read through the same bit order.
        let k = 10;
        let mut bytes = [0u8; 64];
        let chunks = bytes.len() * 8 / k;
        for i in (0..chunks).step_by(2) {
            for j in 0..k {
                set_bit(&mut bytes, i * k + j);
            }
        }
        for i in 0..chunks {
            let want = if i % 2 == 0 { (1 << k) - 1 } else { 0 };
            assert_eq!(get_chunk(&bytes, k, i), want, "chunk {i}");
        }
    }

    #[test]
    fn test_bitvec() {
        let mut bits = BitVec::new(1000);
        assert_eq!(bits.len(), 1000);
        assert_eq!(bits.as_bytes().len(), 125);

        bits.set(0);
        bits.set(999);
        assert!(bits.get(0));
        assert!(bits.get(999));
        assert!(!bits.get(500));

        bits.unset(0);
        assert!(!bits.get(0));

        bits.clear();
        assert!(!bits.get(999));
        assert!(bits.as_bytes().iter().all(|&b| b == 0));
    }
}

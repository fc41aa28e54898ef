//! Bloom filter using the double hashing scheme of Kirsch and Mitzenmacher
//! ("Less hashing, same performance"): two base reductions simulate
//! `hash_ct` independent hash functions via `h1 + j * h2 mod m`.

use rand::Rng;

use crate::bits::BitVec;
use crate::error::Error;
use crate::hash::{RangeHasher, tweak};

/// A salted Bloom filter over `filter_bits` bits.
///
/// Insert/query only; there is no removal. The hasher passed to
/// [`insert`](BloomFilter::insert) and [`contains`](BloomFilter::contains)
/// must have radix equal to the filter's bit length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BloomFilter {
    bits: BitVec,
    salt: Vec<u8>,
    hash_ct: usize,
}

impl BloomFilter {
    /// Returns a zeroed filter of `filter_bits` bits with a zeroed salt of
    /// `salt_bytes` bytes and `hash_ct` probe positions per item.
    pub fn new(filter_bits: usize, salt_bytes: usize, hash_ct: usize) -> Self {
        Self {
            bits: BitVec::new(filter_bits),
            salt: vec![0; salt_bytes],
            hash_ct,
        }
    }

    /// Installs `salt` and zeroes the filter bits.
    pub fn reset(&mut self, salt: &[u8]) {
        self.salt.clear();
        self.salt.extend_from_slice(salt);
        self.bits.clear();
    }

    /// Generates a fresh random salt and zeroes the filter bits.
    pub fn reset_random_salt(&mut self) {
        rand::thread_rng().fill(&mut self.salt[..]);
        self.bits.clear();
    }

    /// Inserts `item` by setting its `hash_ct` probe bits.
    pub fn insert(&mut self, hasher: &mut RangeHasher, item: &[u8]) -> Result<(), Error> {
        let (h1, h2) = self.base_hashes(hasher, item)?;
        let m = self.bits.len() as u64;
        for j in 0..self.hash_ct as u64 {
            self.bits.set(((h1 + j * h2) % m) as usize);
        }
        Ok(())
    }

    /// Reports whether `item` is likely in the filter: true iff every probe
    /// bit is set. Never false for an inserted item; false positives occur
    /// with the usual `(1 - e^(-kn/m))^k` probability.
    pub fn contains(&self, hasher: &mut RangeHasher, item: &[u8]) -> Result<bool, Error> {
        let (h1, h2) = self.base_hashes(hasher, item)?;
        let m = self.bits.len() as u64;
        Ok((0..self.hash_ct as u64).all(|j| self.bits.get(((h1 + j * h2) % m) as usize)))
    }

    /// Filter length in bits (`m`).
    pub fn filter_bits(&self) -> usize {
        self.bits.len()
    }

    /// Number of probe positions per item (`k`).
    pub fn hash_ct(&self) -> usize {
        self.hash_ct
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Underlying filter bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_bytes()
    }

    fn base_hashes(&self, hasher: &mut RangeHasher, item: &[u8]) -> Result<(u64, u64), Error> {
        if self.bits.len() != hasher.radix() as usize {
            return Err(Error::ParamsMismatch);
        }
        let h1 = hasher.reduce(item, &tweak(&self.salt, 1))? as u64;
        let h2 = hasher.reduce(item, &tweak(&self.salt, 2))? as u64;
        Ok((h1, h2))
    }
}

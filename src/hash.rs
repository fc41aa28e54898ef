//! Range-limited hashing over SHA-512 and HMAC-SHA-512.
//!
//! A [`RangeHasher`] maps `(input, tweak)` to a uniform integer in
//! `[0, radix)` by rejection sampling over fixed-size chunks of a single
//! 64-byte digest of `tweak || input`. The digest engine is either unkeyed
//! (SHA-512) or keyed (HMAC-SHA-512 under a 16-byte key).

use std::fmt;

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::{Digest, Sha512};

use crate::bits::{ceil_log2, get_chunk};
use crate::error::Error;

/// Digest width in bits.
pub const DIGEST_BITS: usize = 512;
/// Digest width in bytes.
pub const DIGEST_BYTES: usize = DIGEST_BITS / 8;
/// Key length for the keyed (HMAC) engine.
pub const HMAC_KEY_BYTES: usize = 16;

type HmacSha512 = Hmac<Sha512>;

/// Digest engine variant, selected at construction.
#[derive(Clone)]
enum Engine {
    Unkeyed,
    /// Keyed engine; cloned per computation so the key is absorbed once.
    Keyed(HmacSha512),
}

/// Maps arbitrary input to a uniform value in `[0, radix)`.
///
/// `digest` and `reduce` take `&mut self`: the context buffers the
/// last-computed digest and is not reentrant. Clone it (or create one per
/// thread) for concurrent queries against a shared filter or dictionary.
#[derive(Clone)]
pub struct RangeHasher {
    radix: u32,
    chunk_bits: usize,
    chunks: usize,
    engine: Engine,
    digest: [u8; DIGEST_BYTES],
}

fn compute_params(radix: u32) -> Result<(usize, usize), Error> {
    let k = ceil_log2(radix) as usize;
    if radix < 2 || k < 1 || k > DIGEST_BITS {
        return Err(Error::BadParams);
    }
    Ok((k, DIGEST_BITS / k))
}

impl RangeHasher {
    /// Returns an unkeyed (SHA-512) hasher over `[0, radix)`.
    pub fn unkeyed(radix: u32) -> Result<Self, Error> {
        let (chunk_bits, chunks) = compute_params(radix)?;
        Ok(Self {
            radix,
            chunk_bits,
            chunks,
            engine: Engine::Unkeyed,
            digest: [0; DIGEST_BYTES],
        })
    }

    /// Returns a keyed (HMAC-SHA-512) hasher over `[0, radix)`.
    pub fn keyed(radix: u32, key: &[u8; HMAC_KEY_BYTES]) -> Result<Self, Error> {
        let (chunk_bits, chunks) = compute_params(radix)?;
        let mac = HmacSha512::new_from_slice(key).map_err(|_| Error::BadParams)?;
        Ok(Self {
            radix,
            chunk_bits,
            chunks,
            engine: Engine::Keyed(mac),
            digest: [0; DIGEST_BYTES],
        })
    }

    /// Returns a keyed hasher under a freshly generated random key.
    pub fn keyed_random(radix: u32) -> Result<Self, Error> {
        let mut key = [0u8; HMAC_KEY_BYTES];
        rand::thread_rng().fill(&mut key[..]);
        Self::keyed(radix, &key)
    }

    /// The output range.
    pub fn radix(&self) -> u32 {
        self.radix
    }

    /// Bits per digest chunk, `ceil(log2(radix))`.
    pub fn chunk_bits(&self) -> usize {
        self.chunk_bits
    }

    /// Chunks scanned per reduction, `DIGEST_BITS / chunk_bits`.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn is_keyed(&self) -> bool {
        matches!(self.engine, Engine::Keyed(_))
    }

    /// Computes the full 64-byte digest of `tweak || input` and returns it.
    ///
    /// The digest stays buffered in the context until the next computation.
    pub fn digest(&mut self, input: &[u8], tweak: &[u8]) -> &[u8; DIGEST_BYTES] {
        match &self.engine {
            Engine::Unkeyed => {
                let mut sha = Sha512::new();
                sha.update(tweak);
                sha.update(input);
                self.digest.copy_from_slice(&sha.finalize());
            }
            Engine::Keyed(mac) => {
                let mut mac = mac.clone();
                mac.update(tweak);
                mac.update(input);
                self.digest.copy_from_slice(&mac.finalize().into_bytes());
            }
        }
        &self.digest
    }

    /// Maps `tweak || input` to a value in `[0, radix)`.
    ///
    /// Scans every chunk of the digest in index order and keeps the last one
    /// below the radix; earlier in-range candidates are overwritten. The
    /// last-match-wins rule is load-bearing: a first-match policy would
    /// change every hash output. Fails with [`Error::NoUniformValue`] if no
    /// chunk is in range.
    pub fn reduce(&mut self, input: &[u8], tweak: &[u8]) -> Result<u32, Error> {
        self.digest(input, tweak);
        let mut out = None;
        for i in 0..self.chunks {
            let y = get_chunk(&self.digest, self.chunk_bits, i);
            if y < self.radix {
                out = Some(y);
            }
        }
        out.ok_or(Error::NoUniformValue)
    }
}

impl fmt::Debug for RangeHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeHasher")
            .field("radix", &self.radix)
            .field("chunk_bits", &self.chunk_bits)
            .field("chunks", &self.chunks)
            .field("keyed", &self.is_keyed())
            .finish_non_exhaustive()
    }
}

/// Builds the `salt || tag` tweak distinguishing the derived hash calls of
/// one operation.
pub(crate) fn tweak(salt: &[u8], tag: u8) -> Vec<u8> {
    let mut t = Vec::with_capacity(salt.len() + 1);
    t.extend_from_slice(salt);
    t.push(tag);
    t
}

//! bloomier — compact probabilistic data structures over a range-limited
//! keyed hash.
//!
//! - [`RangeHasher`]: maps arbitrary input to a uniform integer in
//!   `[0, radix)` by rejection sampling over SHA-512 / HMAC-SHA-512 digest
//!   chunks.
//! - [`BloomFilter`]: set membership via Kirsch-Mitzenmacher double hashing.
//!   No false negatives; tunable false-positive rate.
//! - [`Dict`] / [`CompressedDict`]: a Bloomier static key→value dictionary
//!   built over a random acyclic graph. Keys and values are fixed at
//!   construction; lookups are O(1), or O(log n) in the compressed form.
//!
//! ```
//! use bloomier::{Dict, RangeHasher, compute_table_length};
//!
//! let keys = ["This", "is", "cool!"];
//! let values = ["secret", "stuff", ""];
//!
//! let table_length = compute_table_length(keys.len());
//! let mut hasher = RangeHasher::keyed_random(table_length as u32)?;
//! let mut dict = Dict::new(table_length, 6, 2, 8)?;
//! dict.create(&mut hasher, &keys, &values)?;
//!
//! assert_eq!(dict.get(&mut hasher, b"This")?, b"secret");
//! assert!(dict.get(&mut hasher, b"hella").is_err());
//! # Ok::<(), bloomier::Error>(())
//! ```

mod bits;
mod bloom;
mod dict;
mod error;
mod graph;
mod hash;

pub use bits::{BitVec, ceil_log2};
pub use bloom::BloomFilter;
pub use dict::{CompressedDict, Dict, DictParams, compute_table_length};
pub use error::Error;
pub use hash::{DIGEST_BITS, DIGEST_BYTES, HMAC_KEY_BYTES, RangeHasher};

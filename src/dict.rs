//! Bloomier static dictionary, after Charles and Chellapilla ("Bloomier
//! Filters: A second look").
//!
//! Construction hashes every key to a pair of table rows, forming an
//! undirected graph over the rows. Salts are redrawn until that graph is
//! simple and acyclic, then XOR-combined row values are assigned so that for
//! every key's edge `(x, y)`:
//!
//! ```text
//! row(x) ^ row(y) == digest(key, salt || 3)[..row_bytes] ^ (value || PAD_BYTE || 0...)
//! ```
//!
//! A query recomputes the mask, XORs the two rows against it, and checks the
//! tag region and padding. The key set is fixed at construction; there is no
//! insert or delete afterwards.

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::graph::Graph;
use crate::hash::{DIGEST_BYTES, RangeHasher, tweak};

/// Sentinel byte marking the end of a value within a fixed-width row.
const PAD_BYTE: u8 = 0x70;

/// Table rows per stored item. With this much slack the random graph is
/// acyclic with high probability, so construction rarely retries.
const NODE_CT_FACTOR: f64 = 2.09;

/// Fresh salts tried before construction gives up.
const MAX_CREATE_ATTEMPTS: u32 = 1000;

// Tweak tags deriving the three hash calls per key from one salt.
const TAG_ROW_X: u8 = 1;
const TAG_ROW_Y: u8 = 2;
const TAG_MASK: u8 = 3;

/// Returns the optimal table length for `item_ct` items,
/// `ceil(item_ct * 2.09)`.
pub fn compute_table_length(item_ct: usize) -> usize {
    (item_ct as f64 * NODE_CT_FACTOR).ceil() as usize
}

/// Dictionary shape parameters plus the construction salt.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DictParams {
    table_length: usize,
    max_value_bytes: usize,
    tag_bytes: usize,
    /// `max_value_bytes + tag_bytes + 1`; the extra byte holds the pad.
    row_bytes: usize,
    salt: Vec<u8>,
}

impl DictParams {
    pub fn table_length(&self) -> usize {
        self.table_length
    }

    pub fn max_value_bytes(&self) -> usize {
        self.max_value_bytes
    }

    pub fn tag_bytes(&self) -> usize {
        self.tag_bytes
    }

    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Maps `key` to its pair of table rows.
    pub fn compute_rows(
        &self,
        hasher: &mut RangeHasher,
        key: &[u8],
    ) -> Result<(usize, usize), Error> {
        let x = hasher.reduce(key, &tweak(&self.salt, TAG_ROW_X))? as usize;
        let y = hasher.reduce(key, &tweak(&self.salt, TAG_ROW_Y))? as usize;
        Ok((x, y))
    }

    /// Recovers the value for `key` from its two rows.
    fn compute_value(
        &self,
        hasher: &mut RangeHasher,
        key: &[u8],
        xrow: &[u8],
        yrow: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let mut buf = *hasher.digest(key, &tweak(&self.salt, TAG_MASK));
        for j in 0..self.row_bytes {
            buf[j] ^= xrow[j] ^ yrow[j];
        }

        // For a member key the tag region cancels to zero.
        if buf[self.max_value_bytes + 1..self.row_bytes]
            .iter()
            .any(|&b| b != 0)
        {
            return Err(Error::BadKey);
        }

        // The last non-zero byte at or before max_value_bytes is the pad.
        let mut last = self.max_value_bytes;
        while last > 0 && buf[last] == 0 {
            last -= 1;
        }
        if buf[last] != PAD_BYTE {
            return Err(Error::BadPadding);
        }
        Ok(buf[..last].to_vec())
    }

    fn check_radix(&self, hasher: &RangeHasher) -> Result<(), Error> {
        if hasher.radix() as usize != self.table_length {
            return Err(Error::ParamsMismatch);
        }
        Ok(())
    }
}

/// A static key/value store with O(1) lookups.
///
/// Keys are arbitrary byte strings; values are at most `max_value_bytes`
/// long; keys must be unique. Built once by [`create`](Dict::create); the
/// table is safe for concurrent shared reads afterwards, with one
/// [`RangeHasher`] per reader.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dict {
    params: DictParams,
    /// Flat row-major buffer, `table_length * row_bytes` bytes.
    table: Vec<u8>,
}

impl Dict {
    /// Returns an empty dictionary of `table_length` rows.
    ///
    /// Fails with [`Error::BadParams`] if a row
    /// (`max_value_bytes + tag_bytes + 1` bytes) would not fit in a digest.
    pub fn new(
        table_length: usize,
        max_value_bytes: usize,
        tag_bytes: usize,
        salt_bytes: usize,
    ) -> Result<Self, Error> {
        let row_bytes = max_value_bytes + tag_bytes + 1;
        if row_bytes > DIGEST_BYTES {
            return Err(Error::BadParams);
        }
        Ok(Self {
            params: DictParams {
                table_length,
                max_value_bytes,
                tag_bytes,
                row_bytes,
                salt: vec![0; salt_bytes],
            },
            table: vec![0; table_length * row_bytes],
        })
    }

    pub fn params(&self) -> &DictParams {
        &self.params
    }

    /// Builds the table from parallel slices of unique keys and their
    /// values. The hasher's radix must equal the table length.
    ///
    /// Draws fresh salts until the key graph is simple and acyclic, then
    /// assigns rows in two passes per tree of the resulting forest. Fails
    /// with [`Error::ConstructionFailed`] if no salt works within the retry
    /// budget, [`Error::TooManyItems`] or [`Error::LongValue`] on invalid
    /// input (both checked before any state is touched).
    pub fn create<K, V>(
        &mut self,
        hasher: &mut RangeHasher,
        keys: &[K],
        values: &[V],
    ) -> Result<(), Error>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        assert_eq!(keys.len(), values.len(), "one value per key");
        self.params.check_radix(hasher)?;
        if keys.len() >= self.params.table_length {
            return Err(Error::TooManyItems);
        }
        if values
            .iter()
            .any(|v| v.as_ref().len() > self.params.max_value_bytes)
        {
            return Err(Error::LongValue);
        }

        self.table.fill(0);
        let graph = self.random_acyclic_graph(hasher, keys)?;

        // Row assignment state: 0 untouched, 1 after the value pass, 2 after
        // the propagation pass.
        let mut mark = vec![0u8; self.params.table_length];
        for root in 0..graph.node_ct() {
            if mark[root] == 0 {
                self.assign_component(hasher, &graph, &mut mark, root, keys, values);
                self.propagate_component(&graph, &mut mark, root);
            }
        }
        Ok(())
    }

    /// Looks up `key`, returning its exact original value.
    ///
    /// [`Error::BadKey`] means the key was not stored (a false match slips
    /// through with probability at most `2^(-8 * tag_bytes)`);
    /// [`Error::BadPadding`] means a malformed or corrupted row.
    pub fn get(&self, hasher: &mut RangeHasher, key: &[u8]) -> Result<Vec<u8>, Error> {
        self.params.check_radix(hasher)?;
        let (x, y) = self.params.compute_rows(hasher, key)?;
        let rb = self.params.row_bytes;
        let xrow = &self.table[x * rb..(x + 1) * rb];
        let yrow = &self.table[y * rb..(y + 1) * rb];
        self.params.compute_value(hasher, key, xrow, yrow)
    }

    /// Returns a space-reduced read-only copy: all-zero rows are dropped and
    /// queries locate rows by binary search instead of direct indexing.
    pub fn compress(&self) -> CompressedDict {
        let rb = self.params.row_bytes;
        let mut table = Vec::new();
        let mut idx = Vec::new();
        for x in 0..self.params.table_length {
            let row = &self.table[x * rb..(x + 1) * rb];
            if row.iter().any(|&b| b != 0) {
                table.extend_from_slice(row);
                idx.push(x as u32);
            }
        }
        // Trailing all-zero sentinel row; absent row indices resolve here.
        table.resize(table.len() + rb, 0);
        CompressedDict {
            params: self.params.clone(),
            table,
            idx,
        }
    }

    /// Retries salt draws until the key graph is simple and acyclic.
    fn random_acyclic_graph<K: AsRef<[u8]>>(
        &mut self,
        hasher: &mut RangeHasher,
        keys: &[K],
    ) -> Result<Graph, Error> {
        let mut rng = rand::thread_rng();
        for _ in 0..MAX_CREATE_ATTEMPTS {
            rng.fill(&mut self.params.salt[..]);
            let Ok(mut graph) = self.generate_graph(hasher, keys) else {
                continue;
            };
            if graph.verify_simple_and_acyclic().is_ok() {
                return Ok(graph);
            }
        }
        Err(Error::ConstructionFailed)
    }

    /// Builds the key graph for the current salt: one edge `(x, y)` labeled
    /// `j` per key `j`.
    fn generate_graph<K: AsRef<[u8]>>(
        &self,
        hasher: &mut RangeHasher,
        keys: &[K],
    ) -> Result<Graph, Error> {
        let mut graph = Graph::new(self.params.table_length);
        for (j, key) in keys.iter().enumerate() {
            let (x, y) = self.params.compute_rows(hasher, key.as_ref())?;
            graph.add_edge(x, y, j as u32)?;
        }
        Ok(graph)
    }

    /// First pass over one tree, rooted at `root`: install each child row as
    /// its edge's keyed mask XOR the padded value, folding every row into
    /// the root's accumulator.
    fn assign_component<K, V>(
        &mut self,
        hasher: &mut RangeHasher,
        graph: &Graph,
        mark: &mut [u8],
        root: usize,
        keys: &[K],
        values: &[V],
    ) where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let rb = self.params.row_bytes;
        let mask_tweak = tweak(&self.params.salt, TAG_MASK);
        let mut stack = vec![(root, 0usize)];
        mark[root] = 1;

        while let Some((x, cursor)) = stack.pop() {
            let adj = graph.adj(x);
            if cursor >= adj.len() {
                continue;
            }
            stack.push((x, cursor + 1));

            let (y, e) = adj[cursor];
            let (y, e) = (y as usize, e as usize);
            if mark[y] == 1 {
                continue;
            }
            mark[y] = 1;

            let mut row = [0u8; DIGEST_BYTES];
            row[..rb].copy_from_slice(&hasher.digest(keys[e].as_ref(), &mask_tweak)[..rb]);
            let value = values[e].as_ref();
            for (j, &b) in value.iter().enumerate() {
                row[j] ^= b;
            }
            row[value.len()] ^= PAD_BYTE;

            let yoff = y * rb;
            self.table[yoff..yoff + rb].copy_from_slice(&row[..rb]);
            let poff = root * rb;
            for j in 0..rb {
                self.table[poff + j] ^= row[j];
            }

            stack.push((y, 0));
        }
    }

    /// Second pass over the same tree: push each finalized row down to its
    /// children, fixing up every edge's XOR relation.
    fn propagate_component(&mut self, graph: &Graph, mark: &mut [u8], root: usize) {
        let rb = self.params.row_bytes;
        let mut stack = vec![(root, 0usize)];
        mark[root] = 2;

        while let Some((x, cursor)) = stack.pop() {
            let adj = graph.adj(x);
            if cursor >= adj.len() {
                continue;
            }
            stack.push((x, cursor + 1));

            let y = adj[cursor].0 as usize;
            if mark[y] == 2 {
                continue;
            }
            mark[y] = 2;

            let (xoff, yoff) = (x * rb, y * rb);
            for j in 0..rb {
                self.table[yoff + j] ^= self.table[xoff + j];
            }

            stack.push((y, 0));
        }
    }
}

#[cfg(feature = "serde")]
impl Dict {
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Read-only compressed view of a built [`Dict`].
///
/// Only non-zero rows are retained; `idx` maps each compressed position back
/// to its original row index, and lookups pay O(log item_ct) binary searches
/// for the space saved.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedDict {
    params: DictParams,
    /// Retained rows plus one trailing all-zero sentinel row.
    table: Vec<u8>,
    /// Strictly increasing original row index per retained row.
    idx: Vec<u32>,
}

impl CompressedDict {
    pub fn params(&self) -> &DictParams {
        &self.params
    }

    /// Number of retained (non-zero) rows.
    pub fn compressed_table_length(&self) -> usize {
        self.idx.len()
    }

    /// Resolves an original row index to its compressed position, or to the
    /// sentinel row (which is all-zero and fails the tag check downstream)
    /// if the row was dropped.
    pub fn lookup_index(&self, x: usize) -> usize {
        match self.idx.binary_search(&(x as u32)) {
            Ok(pos) => pos,
            Err(_) => self.idx.len(),
        }
    }

    /// Looks up `key`; byte-identical results to the source dictionary.
    pub fn get(&self, hasher: &mut RangeHasher, key: &[u8]) -> Result<Vec<u8>, Error> {
        self.params.check_radix(hasher)?;
        let (x, y) = self.params.compute_rows(hasher, key)?;
        let rb = self.params.row_bytes;
        let (xi, yi) = (self.lookup_index(x), self.lookup_index(y));
        let xrow = &self.table[xi * rb..(xi + 1) * rb];
        let yrow = &self.table[yi * rb..(yi + 1) * rb];
        self.params.compute_value(hasher, key, xrow, yrow)
    }
}

#[cfg(feature = "serde")]
impl CompressedDict {
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(bincode::deserialize(bytes)?)
    }
}

use crate::hash::{HashValueT, ValueT};
use crate::utils::hashing::HashFunction;
use crate::utils::pair::Pair;
use crate::utils::{hash_bit, mask};
use thiserror::Error;

/// Pairs a bucket holds before it has to split.
pub const BUCKET_ENTRIES: usize = 4;

/**
Fixed capacity list of pairs, the unit of splitting and of fine grained locking.

Every key in the bucket agrees with `original_index` on its low `local_depth`
hash bits. `original_index` is the smallest directory slot that can reference
the bucket; it is assigned once and never changes, which makes it a stable id.
*/
#[derive(Debug, Clone)]
pub struct Bucket {
    pairs: Vec<Pair>,
    local_depth: u8,
    original_index: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BucketError {
    #[error("The bucket is full")]
    BucketFull,
}

impl Bucket {
    pub fn new(local_depth: u8, original_index: u32) -> Self {
        Bucket {
            pairs: Vec::with_capacity(BUCKET_ENTRIES),
            local_depth,
            original_index,
        }
    }
    pub fn local_depth(&self) -> u8 {
        self.local_depth
    }
    pub fn original_index(&self) -> u32 {
        self.original_index
    }
    pub fn entry_count(&self) -> usize {
        self.pairs.len()
    }
    pub fn is_full(&self) -> bool {
        self.pairs.len() == BUCKET_ENTRIES
    }
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }
    /**
    True if a key hashing to `hash` belongs in this bucket at its current depth.
    Fails once the bucket has been split and the hash moved to the image side.
    */
    pub fn routes(&self, hash: HashValueT) -> bool {
        hash & mask(self.local_depth) == self.original_index
    }
    pub fn find(&self, key: &[u8]) -> Option<usize> {
        self.pairs.iter().position(|pair| pair.key == key)
    }
    pub fn get(&self, key: &[u8]) -> Option<&ValueT> {
        self.find(key).map(|slot| &self.pairs[slot].value)
    }
    /// Appends after the last occupied entry. Does not check for duplicates.
    pub fn insert_next(&mut self, pair: Pair) -> Result<(), BucketError> {
        if self.is_full() {
            return Err(BucketError::BucketFull);
        }
        self.pairs.push(pair);
        Ok(())
    }
    /// Overwrites the value in place. Returns false if the key is absent.
    pub fn update(&mut self, key: &[u8], value: &[u8]) -> bool {
        match self.find(key) {
            Some(slot) => {
                let stored = &mut self.pairs[slot].value;
                stored.clear();
                stored.extend_from_slice(value);
                true
            }
            None => false,
        }
    }
    /// Moves the last occupied entry into the freed slot, so order is not kept.
    pub fn remove(&mut self, key: &[u8]) -> Option<Pair> {
        let slot = self.find(key)?;
        Some(self.pairs.swap_remove(slot))
    }
    /**
    Increments the local depth and moves every pair whose newly significant
    hash bit is set into a fresh image bucket, which is returned.
    The image's original index is `original_index + 2^(local_depth - 1)`.
    */
    pub fn split<H: HashFunction + ?Sized>(&mut self, hash: &H) -> Bucket {
        self.local_depth += 1;
        let bit = self.local_depth - 1;
        let mut image = Bucket::new(self.local_depth, self.original_index | (1 << bit));
        let (stay, moved): (Vec<Pair>, Vec<Pair>) = self
            .pairs
            .drain(..)
            .partition(|pair| !hash_bit(hash.get_hash(&pair.key), bit));
        self.pairs = stay;
        image.pairs = moved;
        self.pairs.reserve(BUCKET_ENTRIES - self.pairs.len());
        image.pairs.reserve(BUCKET_ENTRIES - image.pairs.len());
        image
    }
}

pub mod bucket;
mod directory;
#[cfg(test)]
mod proptests;
mod scan;
mod split;

pub use scan::{ScanMerger, ScanOrder};

use crate::config::{IndexConfig, ParkingLotLatch};
use crate::extendable_hashing::bucket::{Bucket, BucketError, BUCKET_ENTRIES};
use crate::extendable_hashing::directory::Directory;
use crate::extendable_hashing::split::{feasible_depth, split_chain};
use crate::hash::{HashIndex, HashValueT, KeyT, ValueT};
use crate::push_ops::PushOp;
use crate::utils::hashing::HashFunction;
use crate::utils::mask;
use crate::utils::pair::Pair;
use log::debug;
use parking_lot::lock_api::{RawRwLock, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("keys collide on every hash bit (hash {hash:#010x}, local depth {depth})")]
    OverflowBucket { hash: HashValueT, depth: u8 },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error(transparent)]
    Bucket(#[from] BucketError),
}

/**
Concurrent extendible hashing index.

Keys are routed by the low `global_depth` bits of their hash to a directory
slot, and from there to a bucket of [`BUCKET_ENTRIES`] pairs. A full bucket
splits on its own; the directory doubles only when a split needs more bits
than the directory currently uses.

Locking is two tiered. The directory sits behind a reader/writer latch `R`
and every bucket has its own. Point operations and splits that fit in the
current directory hold the directory shared and lock only the bucket they
touch. An insert that needs the directory to grow drops everything and starts
over with the directory held exclusively.
*/
pub struct ExtendibleHashIndex<H, R = ParkingLotLatch> {
    hash: H,
    dir: RwLock<R, Directory<R>>,
    len: AtomicUsize,
}

/// One row per directory slot, as seen by [`ExtendibleHashIndex::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub slot: usize,
    pub original_index: u32,
    pub local_depth: u8,
    pub keys: Vec<KeyT>,
}

impl SlotSnapshot {
    pub fn entry_count(&self) -> usize {
        self.keys.len()
    }

    /// True for the one slot of an alias range that owns the bucket.
    pub fn is_owner(&self) -> bool {
        self.slot == self.original_index as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySnapshot {
    pub global_depth: u8,
    pub slots: Vec<SlotSnapshot>,
}

impl<H: HashFunction> ExtendibleHashIndex<H, ParkingLotLatch> {
    pub fn new(hash: H, initial_global_depth: u8) -> Result<Self, IndexError> {
        Self::with_config(hash, IndexConfig::new(initial_global_depth))
    }
}

impl<H: HashFunction, R: RawRwLock> ExtendibleHashIndex<H, R> {
    pub fn with_config(hash: H, config: IndexConfig) -> Result<Self, IndexError> {
        config.validate()?;
        Ok(ExtendibleHashIndex {
            hash,
            dir: RwLock::new(Directory::new(config.initial_global_depth)),
            len: AtomicUsize::new(0),
        })
    }

    pub fn global_depth(&self) -> u8 {
        self.dir.read().global_depth()
    }

    pub fn directory_size(&self) -> usize {
        self.dir.read().size()
    }

    pub fn bucket_entries(&self) -> usize {
        BUCKET_ENTRIES
    }

    /**
    Copies the directory shape and the keys of every bucket.
    Taken with the directory held exclusively, so no split is half published.
    */
    pub fn snapshot(&self) -> DirectorySnapshot {
        let dir = self.dir.write();
        let slots = (0..dir.size())
            .map(|slot| {
                let bucket = dir.latch(dir.bucket_id(slot)).read();
                SlotSnapshot {
                    slot,
                    original_index: bucket.original_index(),
                    local_depth: bucket.local_depth(),
                    keys: bucket.pairs().iter().map(|pair| pair.key.clone()).collect(),
                }
            })
            .collect();
        DirectorySnapshot {
            global_depth: dir.global_depth(),
            slots,
        }
    }

    /// Slow path of insert, for splits that need a deeper directory.
    fn insert_exclusive(&self, key: &[u8], value: &[u8], hash: HashValueT) -> Result<(), IndexError> {
        let mut dir = self.dir.write();
        let bucket = dir.bucket_mut(hash);
        // the bucket may have changed while the directory was released
        if bucket.find(key).is_some() {
            return Ok(());
        }
        if !bucket.is_full() {
            bucket.insert_next(Pair::new(key, value))?;
            self.len.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }
        feasible_depth(&self.hash, bucket, hash)?;
        let images = split_chain(&self.hash, bucket, Pair::new(key, value), hash)?;
        log_split(bucket, &images);
        let required = images
            .iter()
            .map(Bucket::local_depth)
            .fold(bucket.local_depth(), u8::max);
        if required > dir.global_depth() {
            dir.grow(required);
        }
        for image in images {
            dir.publish(image);
        }
        self.len.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn scan(&self, start_key: &[u8], end_key: Option<&[u8]>, order: ScanOrder, op: &mut dyn PushOp) {
        let mut merger = ScanMerger::new(start_key, end_key, order);
        {
            let dir = self.dir.read();
            for latch in dir.buckets() {
                merger.collect(&latch.read());
            }
        }
        merger.drain(op);
    }
}

fn log_split(bucket: &Bucket, images: &[Bucket]) {
    debug!(
        "split bucket {} to local depth {}, new buckets {:?}",
        bucket.original_index(),
        bucket.local_depth(),
        images.iter().map(Bucket::original_index).collect::<Vec<_>>()
    );
}

impl<H: HashFunction, R: RawRwLock> HashIndex for ExtendibleHashIndex<H, R> {
    fn get(&self, key: &[u8]) -> Option<ValueT> {
        let hash = self.hash.get_hash(key);
        let dir = self.dir.read();
        let bucket = dir.read_bucket(hash);
        bucket.get(key).cloned()
    }

    fn insert(&self, key: &[u8], value: &[u8]) -> Result<(), IndexError> {
        let hash = self.hash.get_hash(key);
        {
            let dir = self.dir.read();
            let mut bucket = dir.write_bucket(hash);
            if bucket.find(key).is_some() {
                return Ok(());
            }
            if !bucket.is_full() {
                bucket.insert_next(Pair::new(key, value))?;
                self.len.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            let depth = feasible_depth(&self.hash, &bucket, hash)?;
            if depth <= dir.global_depth() {
                let images = split_chain(&self.hash, &mut bucket, Pair::new(key, value), hash)?;
                log_split(&bucket, &images);
                // the split bucket stays locked until every image is reachable
                for image in images {
                    dir.publish(image);
                }
                self.len.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            debug!(
                "bucket {} needs local depth {} above global depth {}, retrying exclusively",
                bucket.original_index(),
                depth,
                dir.global_depth()
            );
        }
        self.insert_exclusive(key, value, hash)
    }

    fn update(&self, key: &[u8], value: &[u8]) {
        let hash = self.hash.get_hash(key);
        let dir = self.dir.read();
        let mut bucket = dir.write_bucket(hash);
        bucket.update(key, value);
    }

    fn remove(&self, key: &[u8]) {
        let hash = self.hash.get_hash(key);
        let dir = self.dir.read();
        let mut bucket = dir.write_bucket(hash);
        if bucket.remove(key).is_some() {
            self.len.fetch_sub(1, Ordering::Relaxed);
        }
    }

    fn range_scan(&self, start_key: &[u8], end_key: Option<&[u8]>, op: &mut dyn PushOp) {
        self.scan(start_key, end_key, ScanOrder::Ascending, op);
    }

    fn reverse_range_scan(&self, start_key: &[u8], end_key: Option<&[u8]>, op: &mut dyn PushOp) {
        self.scan(start_key, end_key, ScanOrder::Descending, op);
    }

    fn size(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }
}

impl DirectorySnapshot {
    /// Entries across all buckets, each bucket counted once.
    pub fn entry_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|row| row.is_owner())
            .map(SlotSnapshot::entry_count)
            .sum()
    }

    /**
    Checks the structural invariants of the directory:
    - there are `2^global_depth` slots and no bucket is deeper than the directory,
    - every slot agrees with its bucket's original index on the low `local_depth` bits,
    - a bucket of depth `d` is referenced by exactly `2^(global_depth - d)` slots,
    - every stored key hashes into the bucket holding it.

    Returns a description of the first violation found.
    */
    pub fn check_invariants<H: HashFunction + ?Sized>(&self, hash: &H) -> Result<(), String> {
        let expected_slots = 1usize << self.global_depth;
        if self.slots.len() != expected_slots {
            return Err(format!(
                "{} slots for global depth {}, expected {}",
                self.slots.len(),
                self.global_depth,
                expected_slots
            ));
        }
        let mut aliases: HashMap<u32, usize> = HashMap::new();
        for row in &self.slots {
            if row.local_depth > self.global_depth {
                return Err(format!(
                    "slot {}: local depth {} exceeds global depth {}",
                    row.slot, row.local_depth, self.global_depth
                ));
            }
            let low = mask(row.local_depth);
            if row.slot as u32 & low != row.original_index {
                return Err(format!(
                    "slot {} references bucket {} of local depth {}",
                    row.slot, row.original_index, row.local_depth
                ));
            }
            if let Some(key) = row.keys.iter().find(|key| hash.get_hash(key) & low != row.original_index) {
                return Err(format!(
                    "key {:?} does not hash into bucket {}",
                    String::from_utf8_lossy(key),
                    row.original_index
                ));
            }
            *aliases.entry(row.original_index).or_default() += 1;
        }
        for row in self.slots.iter().filter(|row| row.is_owner()) {
            let expected = 1usize << (self.global_depth - row.local_depth);
            let found = aliases[&row.original_index];
            if found != expected {
                return Err(format!(
                    "bucket {} of local depth {} is referenced by {} slots, expected {}",
                    row.original_index, row.local_depth, found, expected
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for DirectorySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "global depth {}", self.global_depth)?;
        writeln!(f, "{:>6} {:>8} {:>6} {:>8}  keys", "slot", "bucket", "depth", "entries")?;
        for row in &self.slots {
            let keys: Vec<_> = row.keys.iter().map(|key| String::from_utf8_lossy(key)).collect();
            writeln!(
                f,
                "{:>6} {:>8} {:>6} {:>8}  {}",
                row.slot,
                row.original_index,
                row.local_depth,
                row.entry_count(),
                keys.join(" ")
            )?;
        }
        Ok(())
    }
}

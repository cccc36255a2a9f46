use crate::extendable_hashing::bucket::Bucket;
use crate::hash::HashValueT;
use crate::utils::mask;
use log::{info, trace};
use parking_lot::lock_api::{RawRwLock, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

pub(crate) type BucketLatch<R> = RwLock<R, Bucket>;

/**
Slot array plus the arena owning every bucket.

A bucket's id is its original index, so the arena has exactly one cell per
slot and every cell is filled at most once: buckets are never merged, and only
the split that first raises some bucket past depth `d` creates the bucket with
original index `o + 2^(d-1)`. Slots store ids, which lets a split repoint them
while other threads hold the directory shared.

Dropping the directory drops the arena, so every bucket is freed exactly once
no matter how many slots alias it.
*/
pub struct Directory<R> {
    global_depth: u8,
    slots: Vec<AtomicU32>,
    buckets: Vec<OnceLock<BucketLatch<R>>>,
}

impl<R: RawRwLock> Directory<R> {
    pub fn new(global_depth: u8) -> Self {
        let size = 1usize << global_depth;
        let slots = (0..size).map(|slot| AtomicU32::new(slot as u32)).collect();
        let buckets = (0..size)
            .map(|slot| OnceLock::from(RwLock::new(Bucket::new(global_depth, slot as u32))))
            .collect();
        Directory {
            global_depth,
            slots,
            buckets,
        }
    }

    pub fn global_depth(&self) -> u8 {
        self.global_depth
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_index(&self, hash: HashValueT) -> usize {
        (hash & mask(self.global_depth)) as usize
    }

    pub fn bucket_id(&self, slot: usize) -> u32 {
        self.slots[slot].load(Ordering::Acquire)
    }

    pub fn latch(&self, id: u32) -> &BucketLatch<R> {
        self.buckets[id as usize]
            .get()
            .expect("directory slot references an unpublished bucket")
    }

    /// Every published bucket, once each, in ascending id order.
    pub fn buckets(&self) -> impl Iterator<Item = &BucketLatch<R>> {
        self.buckets.iter().filter_map(OnceLock::get)
    }

    /**
    Shared access to the bucket responsible for `hash`.
    The slot is re-read if the bucket was split between reading the slot and
    acquiring the bucket latch.
    */
    pub fn read_bucket(&self, hash: HashValueT) -> RwLockReadGuard<'_, R, Bucket> {
        loop {
            let id = self.bucket_id(self.slot_index(hash));
            let guard = self.latch(id).read();
            if guard.routes(hash) {
                return guard;
            }
            trace!("bucket {} was split under us, rereading slot", id);
        }
    }

    /// Exclusive counterpart of [`Directory::read_bucket`].
    pub fn write_bucket(&self, hash: HashValueT) -> RwLockWriteGuard<'_, R, Bucket> {
        loop {
            let id = self.bucket_id(self.slot_index(hash));
            let guard = self.latch(id).write();
            if guard.routes(hash) {
                return guard;
            }
            trace!("bucket {} was split under us, rereading slot", id);
        }
    }

    /// With the directory held exclusively no split can race us, and the
    /// bucket latches are bypassed.
    pub fn bucket_mut(&mut self, hash: HashValueT) -> &mut Bucket {
        let id = self.slots[self.slot_index(hash)].load(Ordering::Relaxed);
        let bucket = self.buckets[id as usize]
            .get_mut()
            .expect("directory slot references an unpublished bucket")
            .get_mut();
        debug_assert!(bucket.routes(hash));
        bucket
    }

    /**
    Makes a freshly split image bucket reachable: stores it in the arena, then
    points every slot of its alias range at it. The range is
    `original_index, original_index + 2^local_depth, ...` up to the directory size.

    Callers publishing under a shared directory must still hold the latch of
    the bucket the image was split from, so readers that raced the split
    reread their slot only after it has been repointed.
    */
    pub fn publish(&self, image: Bucket) {
        let id = image.original_index();
        let step = 1usize << image.local_depth();
        let fresh = self.buckets[id as usize].set(RwLock::new(image)).is_ok();
        assert!(fresh, "bucket {} published twice", id);
        for slot in (id as usize..self.slots.len()).step_by(step) {
            self.slots[slot].store(id, Ordering::Release);
        }
    }

    /// Doubles the slot array until it is addressed by `new_depth` bits. New
    /// slots alias the bucket of the slot they were copied from.
    pub fn grow(&mut self, new_depth: u8) {
        let old_depth = self.global_depth;
        while self.global_depth < new_depth {
            let old_size = self.slots.len();
            for slot in 0..old_size {
                let id = self.slots[slot].load(Ordering::Relaxed);
                self.slots.push(AtomicU32::new(id));
            }
            self.buckets.resize_with(old_size * 2, OnceLock::new);
            self.global_depth += 1;
        }
        info!(
            "directory grew from global depth {} to {} ({} slots)",
            old_depth,
            self.global_depth,
            self.slots.len()
        );
    }
}

use crate::extendable_hashing::bucket::Bucket;
use crate::push_ops::PushOp;
use crate::utils::pair::Pair;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    Ascending,
    Descending,
}

enum Queue {
    Ascending(BinaryHeap<Reverse<Pair>>),
    Descending(BinaryHeap<Pair>),
}

impl Queue {
    fn push(&mut self, pair: Pair) {
        match self {
            Queue::Ascending(heap) => heap.push(Reverse(pair)),
            Queue::Descending(heap) => heap.push(pair),
        }
    }
    fn pop(&mut self) -> Option<Pair> {
        match self {
            Queue::Ascending(heap) => heap.pop().map(|Reverse(pair)| pair),
            Queue::Descending(heap) => heap.pop(),
        }
    }
    fn len(&self) -> usize {
        match self {
            Queue::Ascending(heap) => heap.len(),
            Queue::Descending(heap) => heap.len(),
        }
    }
}

/**
Turns an unordered sweep over buckets into a key ordered stream.

Buckets are fed in with [`ScanMerger::collect`]; pairs inside the key range
are copied into a priority queue, which [`ScanMerger::drain`] empties into a
push operator. Hash order carries no key locality, so every scan pays for a
sweep of the whole index regardless of the range width.
*/
pub struct ScanMerger<'a> {
    start_key: &'a [u8],
    end_key: Option<&'a [u8]>,
    queue: Queue,
}

impl<'a> ScanMerger<'a> {
    pub fn new(start_key: &'a [u8], end_key: Option<&'a [u8]>, order: ScanOrder) -> Self {
        let queue = match order {
            ScanOrder::Ascending => Queue::Ascending(BinaryHeap::new()),
            ScanOrder::Descending => Queue::Descending(BinaryHeap::new()),
        };
        ScanMerger {
            start_key,
            end_key,
            queue,
        }
    }

    pub fn in_range(&self, key: &[u8]) -> bool {
        key >= self.start_key && self.end_key.map_or(true, |end| key <= end)
    }

    pub fn collect(&mut self, bucket: &Bucket) {
        for pair in bucket.pairs() {
            if self.in_range(&pair.key) {
                self.queue.push(pair.clone());
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /**
    Pushes the collected pairs in order until `op` returns false, and returns
    how many were delivered. A key seen twice is delivered once: a pair moved
    by a split racing the sweep can be copied out of both buckets.
    */
    pub fn drain(mut self, op: &mut dyn PushOp) -> usize {
        let mut delivered = 0;
        let mut last_key: Option<Vec<u8>> = None;
        while let Some(pair) = self.queue.pop() {
            if last_key.as_ref() == Some(&pair.key) {
                continue;
            }
            if !op.invoke(&pair.key, &pair.value) {
                break;
            }
            delivered += 1;
            last_key = Some(pair.key);
        }
        delivered
    }
}

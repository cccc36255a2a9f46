use crate::hash::{KeyT, ValueT};

/// A stored entry. Pairs order by key bytes first, which is the order scans
/// deliver them in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Pair {
    pub key: KeyT,
    pub value: ValueT,
}

impl Pair {
    pub fn new(key: &[u8], value: &[u8]) -> Self {
        Pair {
            key: key.to_vec(),
            value: value.to_vec(),
        }
    }
}

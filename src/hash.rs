use crate::extendable_hashing::IndexError;
use crate::push_ops::PushOp;

pub type KeyT = Vec<u8>;
pub type ValueT = Vec<u8>;
pub type HashValueT = u32;

/// Point and range operations every index backend offers to its callers.
///
/// Scans may be expensive for hash based backends, since they have no key
/// ordering to exploit.
pub trait HashIndex {
    fn get(&self, key: &[u8]) -> Option<ValueT>;
    /// Re-inserting an existing key leaves the stored value untouched.
    fn insert(&self, key: &[u8], value: &[u8]) -> Result<(), IndexError>;
    /// Does nothing when the key is absent.
    fn update(&self, key: &[u8], value: &[u8]);
    /// Does nothing when the key is absent.
    fn remove(&self, key: &[u8]);
    /// Pushes every entry in `[start_key, end_key]` in ascending key order,
    /// stopping as soon as `op` returns false. A missing `end_key` means no
    /// upper bound.
    fn range_scan(&self, start_key: &[u8], end_key: Option<&[u8]>, op: &mut dyn PushOp);
    /// Same entries as [`HashIndex::range_scan`], in descending key order.
    fn reverse_range_scan(&self, start_key: &[u8], end_key: Option<&[u8]>, op: &mut dyn PushOp);
    fn size(&self) -> usize;
}

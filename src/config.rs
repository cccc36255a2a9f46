use crate::extendable_hashing::IndexError;

/** Width of the hash values the directory is addressed with. */
pub const HASH_BITS: u32 = 32;

/** Global depth used when the caller does not pick one. */
pub const DEFAULT_INITIAL_GLOBAL_DEPTH: u8 = 2;

/// Reader/writer latch backed by `parking_lot`; blocks in the OS when contended.
pub type ParkingLotLatch = parking_lot::RawRwLock;

/// Reader/writer latch that spins instead of parking.
pub type SpinLatch = spin::RwLock<()>;

/// Construction parameters of an [`ExtendibleHashIndex`](crate::ExtendibleHashIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// The directory starts with `2^initial_global_depth` slots, each with its
    /// own empty bucket.
    pub initial_global_depth: u8,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            initial_global_depth: DEFAULT_INITIAL_GLOBAL_DEPTH,
        }
    }
}

impl IndexConfig {
    pub fn new(initial_global_depth: u8) -> Self {
        IndexConfig {
            initial_global_depth,
        }
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        let depth = self.initial_global_depth as u32;
        if depth > HASH_BITS {
            return Err(IndexError::InvalidConfiguration(format!(
                "initial global depth {} exceeds the {} bit hash width",
                depth, HASH_BITS
            )));
        }
        let addressable = 1usize
            .checked_shl(depth)
            .and_then(|slots| slots.checked_mul(std::mem::size_of::<u32>()))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !addressable {
            return Err(IndexError::InvalidConfiguration(format!(
                "a directory of 2^{} slots is not addressable",
                depth
            )));
        }
        Ok(())
    }
}

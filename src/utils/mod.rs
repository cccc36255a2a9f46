pub mod hashing;
pub mod logger;
pub mod pair;

use crate::config::HASH_BITS;
use crate::hash::HashValueT;

/**
Mask selecting the low `depth` bits of a hash.
mask(0) == 0, mask(3) == 0b111, mask(32) == u32::MAX
*/
pub fn mask(depth: u8) -> HashValueT {
    if depth as u32 >= HASH_BITS {
        HashValueT::MAX
    } else {
        (1 << depth) - 1
    }
}

/// Bit `bit` of `hash`, counted from the least significant bit.
pub fn hash_bit(hash: HashValueT, bit: u8) -> bool {
    (hash >> bit) & 1 == 1
}

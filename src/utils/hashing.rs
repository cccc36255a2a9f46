use crate::hash::HashValueT;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::sync::Arc;

/// Maps a key to the fixed width hash the directory is addressed with.
///
/// Implementations must be deterministic for a given instance: the index
/// rehashes stored keys while splitting and relies on getting the same value.
pub trait HashFunction: Send + Sync {
    fn get_hash(&self, key: &[u8]) -> HashValueT;
}

impl<H: HashFunction + ?Sized> HashFunction for &H {
    fn get_hash(&self, key: &[u8]) -> HashValueT {
        (**self).get_hash(key)
    }
}

impl<H: HashFunction + ?Sized> HashFunction for Arc<H> {
    fn get_hash(&self, key: &[u8]) -> HashValueT {
        (**self).get_hash(key)
    }
}

/**
Interprets the key as a decimal number and reduces it modulo `MOD`.
Keys that do not start with a number hash to their length, so "abc" -> 3.
Useful when a test needs to decide exactly which slot a key lands in.
*/
#[derive(Debug, Default, Clone, Copy)]
pub struct ModHash<const MOD: u32>;

impl<const MOD: u32> ModHash<MOD> {
    pub fn new() -> Self {
        ModHash
    }
}

impl<const MOD: u32> HashFunction for ModHash<MOD> {
    fn get_hash(&self, key: &[u8]) -> HashValueT {
        let mut ukey = atoi(key) as u32;
        if ukey == 0 && key != b"0" {
            ukey = key.len() as u32;
        }
        ukey % MOD
    }
}

// Leading whitespace, an optional sign, then digits; stops at the first non digit.
fn atoi(key: &[u8]) -> i32 {
    let mut rest = key;
    while let [b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c, tail @ ..] = rest {
        rest = tail;
    }
    let negative = match rest {
        [b'-', tail @ ..] => {
            rest = tail;
            true
        }
        [b'+', tail @ ..] => {
            rest = tail;
            false
        }
        _ => false,
    };
    let mut value: i32 = 0;
    for &byte in rest.iter().take_while(|b| b.is_ascii_digit()) {
        value = value.wrapping_mul(10).wrapping_add((byte - b'0') as i32);
    }
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// MurmurHash3, x86 32 bit variant.
#[derive(Debug, Clone, Copy)]
pub struct MurmurHash32 {
    seed: u32,
}

impl MurmurHash32 {
    /// Seeds the hash with a random odd value.
    pub fn new() -> Self {
        Self::with_seed(rand::random::<u32>() | 1)
    }
    pub fn with_seed(seed: u32) -> Self {
        MurmurHash32 { seed }
    }
}

impl Default for MurmurHash32 {
    fn default() -> Self {
        Self::new()
    }
}

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

impl HashFunction for MurmurHash32 {
    fn get_hash(&self, key: &[u8]) -> HashValueT {
        let mut h1 = self.seed;
        let mut blocks = key.chunks_exact(4);
        for block in &mut blocks {
            let mut k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
            k1 = k1.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2);
            h1 ^= k1;
            h1 = h1.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
        }

        let tail = blocks.remainder();
        if !tail.is_empty() {
            let mut k1: u32 = 0;
            for (i, &byte) in tail.iter().enumerate() {
                k1 ^= (byte as u32) << (8 * i);
            }
            k1 = k1.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2);
            h1 ^= k1;
        }

        h1 ^= key.len() as u32;
        fmix32(h1)
    }
}

/**
Multiply-shift hashing of the first eight key bytes, read little endian.
Bytes past the eighth do not contribute, so it is only suited to short keys.
*/
#[derive(Debug, Clone, Copy)]
pub struct MultShiftHash {
    seed: u64,
}

impl MultShiftHash {
    pub fn new() -> Self {
        Self::with_seed(rand::random::<u64>())
    }
    pub fn with_seed(seed: u64) -> Self {
        MultShiftHash { seed: seed | 1 }
    }
}

impl Default for MultShiftHash {
    fn default() -> Self {
        Self::new()
    }
}

impl HashFunction for MultShiftHash {
    fn get_hash(&self, key: &[u8]) -> HashValueT {
        let mut buf = [0u8; 8];
        let len = key.len().min(8);
        buf[..len].copy_from_slice(&key[..len]);
        let ukey = u64::from_le_bytes(buf);
        (self.seed.wrapping_mul(ukey) >> 32) as u32
    }
}

/// The standard library hasher folded down to 32 bits.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdHash;

impl HashFunction for StdHash {
    fn get_hash(&self, key: &[u8]) -> HashValueT {
        let h = calculate_hash(key);
        (h ^ (h >> 32)) as u32
    }
}

pub fn calculate_hash(key: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(key);
    hasher.finish()
}

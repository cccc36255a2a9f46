//! Concurrent in-memory key/value index built on extendible hashing.
//!
//! ```
//! use r_ehash::{ExtendibleHashIndex, HashIndex, MurmurHash32, VectorPushOp};
//!
//! let index = ExtendibleHashIndex::new(MurmurHash32::with_seed(17), 2).unwrap();
//! index.insert(b"apple", b"red").unwrap();
//! index.insert(b"banana", b"yellow").unwrap();
//! assert_eq!(index.get(b"apple"), Some(b"red".to_vec()));
//!
//! let mut values = VectorPushOp::new();
//! index.range_scan(b"a", None, &mut values);
//! assert_eq!(values.get(), &[b"red".to_vec(), b"yellow".to_vec()]);
//! ```

pub mod config;
pub mod extendable_hashing;
pub mod hash;
pub mod push_ops;
pub mod utils;

pub use config::{IndexConfig, ParkingLotLatch, SpinLatch};
pub use extendable_hashing::{DirectorySnapshot, ExtendibleHashIndex, IndexError, SlotSnapshot};
pub use hash::{HashIndex, HashValueT, KeyT, ValueT};
pub use push_ops::{ConcatPushOp, LimitOp, PushOp, VectorPushOp};
pub use utils::hashing::{HashFunction, ModHash, MultShiftHash, MurmurHash32, StdHash};

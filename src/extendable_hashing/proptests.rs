use super::*;

use crate::utils::hashing::MurmurHash32;
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, Vec<u8>),
    Update(Vec<u8>, Vec<u8>),
    Remove(Vec<u8>),
    Get(Vec<u8>),
    Scan(Vec<u8>, Option<Vec<u8>>),
    ReverseScan(Vec<u8>, Option<Vec<u8>>),
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // a narrow alphabet keeps re-inserts and removes of live keys frequent
    prop::collection::vec(b'a'..=b'f', 0..=4)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let value = prop::collection::vec(any::<u8>(), 0..=8);
    let op = prop_oneof![
        40 => (key.clone(), value.clone()).prop_map(|(k, v)| Op::Insert(k, v)),
        15 => (key.clone(), value).prop_map(|(k, v)| Op::Update(k, v)),
        20 => key.clone().prop_map(Op::Remove),
        15 => key.clone().prop_map(Op::Get),
        5 => (key.clone(), prop::option::of(key.clone())).prop_map(|(s, e)| Op::Scan(s, e)),
        5 => (key.clone(), prop::option::of(key)).prop_map(|(s, e)| Op::ReverseScan(s, e)),
    ];
    prop::collection::vec(op, 0..=1000)
}

fn reference_range(m: &BTreeMap<Vec<u8>, Vec<u8>>, start: &[u8], end: Option<&[u8]>) -> Vec<(Vec<u8>, Vec<u8>)> {
    m.iter()
        .filter(|(k, _)| k.as_slice() >= start && end.map_or(true, |end| k.as_slice() <= end))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn index_range(
    t: &ExtendibleHashIndex<MurmurHash32>,
    start: &[u8],
    end: Option<&[u8]>,
    reverse: bool,
) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut out = vec![];
    let mut collect = |k: &[u8], v: &[u8]| {
        out.push((k.to_vec(), v.to_vec()));
        true
    };
    if reverse {
        t.reverse_range_scan(start, end, &mut collect);
    } else {
        t.range_scan(start, end, &mut collect);
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(seed in any::<u32>(), depth in 0u8..=3, ops in ops_strategy()) {
        let hash = MurmurHash32::with_seed(seed);
        let t = ExtendibleHashIndex::new(hash, depth).unwrap();
        let mut m: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    t.insert(&key, &value).unwrap();
                    m.entry(key).or_insert(value);
                }
                Op::Update(key, value) => {
                    t.update(&key, &value);
                    if let Some(stored) = m.get_mut(&key) {
                        *stored = value;
                    }
                }
                Op::Remove(key) => {
                    t.remove(&key);
                    m.remove(&key);
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key).cloned());
                }
                Op::Scan(start, end) => {
                    let expected = reference_range(&m, &start, end.as_deref());
                    prop_assert_eq!(index_range(&t, &start, end.as_deref(), false), expected);
                }
                Op::ReverseScan(start, end) => {
                    let mut expected = reference_range(&m, &start, end.as_deref());
                    expected.reverse();
                    prop_assert_eq!(index_range(&t, &start, end.as_deref(), true), expected);
                }
            }
            prop_assert_eq!(t.size(), m.len());
        }

        let snapshot = t.snapshot();
        prop_assert_eq!(snapshot.check_invariants(&hash), Ok(()));
        prop_assert_eq!(snapshot.entry_count(), m.len());
        prop_assert_eq!(index_range(&t, b"", None, false), reference_range(&m, b"", None));
    }
}

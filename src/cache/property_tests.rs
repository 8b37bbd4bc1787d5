//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the LRU store against a simple reference model.

use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::cache::{ByteSize, LruStore};

// == Strategies ==
/// Small key space so that operations hit existing keys often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,3}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,24}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Add { key: String, value: String },
    Get { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Add { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
    ]
}

// == Reference Model ==
/// Recency list with the least recently used entry at the front.
struct Model {
    entries: VecDeque<(String, String)>,
    max_bytes: usize,
    evicted: Vec<String>,
}

impl Model {
    fn new(max_bytes: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_bytes,
            evicted: Vec::new(),
        }
    }

    fn nbytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.byte_size()).sum()
    }

    fn get(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        let entry = self.entries.remove(pos)?;
        let value = entry.1.clone();
        self.entries.push_back(entry);
        Some(value)
    }

    fn add(&mut self, key: String, value: String) {
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries.remove(pos);
        }
        self.entries.push_back((key, value));
        while self.max_bytes != 0 && self.nbytes() > self.max_bytes {
            match self.entries.pop_front() {
                Some((k, _)) => self.evicted.push(k),
                None => break,
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Resident size never exceeds the capacity once an add returns, and the
    // running total always matches the sum over resident entries.
    #[test]
    fn prop_capacity_enforcement(
        max_bytes in 1usize..64,
        ops in prop::collection::vec(cache_op_strategy(), 1..100)
    ) {
        let mut store = LruStore::new(max_bytes);
        let mut model = Model::new(max_bytes);

        for op in ops {
            match op {
                CacheOp::Add { key, value } => {
                    store.add(key.clone(), value.clone());
                    model.add(key, value);
                }
                CacheOp::Get { key } => {
                    let _ = store.get(&key);
                    let _ = model.get(&key);
                }
            }
            prop_assert!(store.nbytes() <= max_bytes, "{} > {}", store.nbytes(), max_bytes);
            prop_assert_eq!(store.nbytes(), model.nbytes());
            prop_assert_eq!(store.len(), model.entries.len());
        }
    }

    // The store evicts exactly the entries the recency model evicts, in order,
    // and lookups agree with the model.
    #[test]
    fn prop_eviction_matches_recency_model(
        max_bytes in 0usize..48,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = evicted.clone();
        let mut store = LruStore::with_evict_hook(max_bytes, move |key: &str, _: &String| {
            sink.lock().unwrap().push(key.to_string());
        });
        let mut model = Model::new(max_bytes);

        for op in ops {
            match op {
                CacheOp::Add { key, value } => {
                    store.add(key.clone(), value.clone());
                    model.add(key, value);
                }
                CacheOp::Get { key } => {
                    let got = store.get(&key).cloned();
                    let expected = model.get(&key);
                    prop_assert_eq!(got, expected, "lookup mismatch for {}", key);
                }
            }
            prop_assert_eq!(&*evicted.lock().unwrap(), &model.evicted);
        }
    }

    // A value that fits is readable right after it was added.
    #[test]
    fn prop_roundtrip_when_fits(key in key_strategy(), value in value_strategy()) {
        let mut store = LruStore::new(key.len() + value.len());

        store.add(key.clone(), value.clone());

        prop_assert_eq!(store.get(&key), Some(&value));
    }

    // Reading the oldest entry makes the second oldest the next victim.
    #[test]
    fn prop_get_bumps_recency(count in 3usize..10) {
        // Fixed-size entries: "kNN" + "v" = 4 bytes each
        let keys: Vec<String> = (0..count).map(|i| format!("k{:02}", i)).collect();
        let mut store = LruStore::new(count * 4);
        for key in &keys {
            store.add(key.clone(), "v".to_string());
        }

        prop_assert!(store.get(&keys[0]).is_some());
        store.add("new".to_string(), "v".to_string());

        prop_assert!(store.get(&keys[0]).is_some(), "accessed key was evicted");
        prop_assert!(store.get(&keys[1]).is_none(), "second oldest key survived");
    }
}

use std::collections::HashMap;

use memo_loader::{hash_arg, Arg, KeyTrie, LruQueue};
use proptest::prelude::*;

fn arg_path(keys: &[i64]) -> Vec<Arg> {
	keys.iter().map(|k| Arg::Int(*k)).collect()
}

/// Strategy for a small record with distinct field names.
fn record_fields() -> impl Strategy<Value = Vec<(String, Arg)>> {
	prop::collection::btree_map("[a-z]{1,4}", -100i64..100, 1..6).prop_map(|map| {
		map.into_iter().map(|(k, v)| (k, Arg::Int(v))).collect()
	})
}

proptest! {
	#[test]
	fn test_trie_matches_flat_map(
		entries in prop::collection::vec((prop::collection::vec(-5i64..5, 3), 0u32..1000), 1..40),
		removals in prop::collection::vec(prop::collection::vec(-5i64..5, 3), 0..20),
	) {
		let mut trie = KeyTrie::new();
		let mut model: HashMap<Vec<i64>, u32> = HashMap::new();

		for (path, value) in &entries {
			trie.insert(&arg_path(path), *value);
			model.insert(path.clone(), *value);
		}
		for path in &removals {
			prop_assert_eq!(trie.remove(&arg_path(path)), model.remove(path));
		}

		prop_assert_eq!(trie.len(), model.len());
		for (path, value) in &model {
			prop_assert_eq!(trie.get(&arg_path(path)), Some(value));
		}
	}

	#[test]
	fn test_queue_never_exceeds_capacity(
		capacity in 2usize..8,
		accesses in prop::collection::vec(0u8..12, 1..60),
	) {
		let mut queue = LruQueue::new(capacity);
		for key in accesses {
			queue.enqueue(key);
			prop_assert!(queue.len() <= capacity);
		}
	}

	#[test]
	fn test_queue_eviction_matches_reference_lru(
		capacity in 2usize..6,
		accesses in prop::collection::vec(0u8..10, 1..50),
	) {
		// Reference model: most-recent-first vector.
		let mut queue = LruQueue::new(capacity);
		let mut model: Vec<u8> = Vec::new();

		for key in accesses {
			let evicted = queue.enqueue(key);
			let expected = match model.iter().position(|k| *k == key) {
				Some(index) => {
					let tracked = model.remove(index);
					model.insert(0, tracked);
					None
				}
				None => {
					model.insert(0, key);
					if model.len() > capacity { model.pop() } else { None }
				}
			};
			prop_assert_eq!(evicted, expected);
		}
	}

	#[test]
	fn test_hash_is_invariant_under_field_order(fields in record_fields()) {
		let forward = Arg::Record(fields.clone());
		let mut reversed_fields = fields;
		reversed_fields.reverse();
		let reversed = Arg::Record(reversed_fields);

		prop_assert_eq!(hash_arg(&forward), hash_arg(&reversed));
	}

	#[test]
	fn test_hash_separates_distinct_records(
		fields in record_fields(),
		extra_value in -100i64..100,
	) {
		let base = Arg::Record(fields.clone());
		let mut extended_fields = fields;
		// A field name longer than the strategy generates, so it is new.
		extended_fields.push(("extrafield".to_string(), Arg::Int(extra_value)));
		let extended = Arg::Record(extended_fields);

		prop_assert_ne!(hash_arg(&base), hash_arg(&extended));
	}

	#[test]
	fn test_hash_is_deterministic(fields in record_fields(), items in prop::collection::vec(-50i64..50, 0..6)) {
		let record = Arg::Record(fields);
		let seq = Arg::Seq(items.into_iter().map(Arg::Int).collect());

		prop_assert_eq!(hash_arg(&record), hash_arg(&record.clone()));
		prop_assert_eq!(hash_arg(&seq), hash_arg(&seq.clone()));
	}
}

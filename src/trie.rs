use std::collections::HashMap;

use crate::value::Arg;

/// Nested-map cache addressed by an ordered tuple of keys.
///
/// Every stored path has the same length (the loader's arity); traversal
/// descends one map level per key. The empty path addresses the root leaf,
/// which is how arity-0 loaders are keyed.
///
/// Not thread-safe on its own; the loader wraps it in a mutex.
pub struct KeyTrie<T> {
	root: Node<T>,
	len: usize,
}

struct Node<T> {
	leaf: Option<T>,
	children: HashMap<Arg, Node<T>>,
}

impl<T> Node<T> {
	fn new() -> Self {
		Self {
			leaf: None,
			children: HashMap::new(),
		}
	}
}

impl<T> KeyTrie<T> {
	pub fn new() -> Self {
		Self {
			root: Node::new(),
			len: 0,
		}
	}

	/// Store a value at the given path, creating intermediate levels as
	/// needed. Returns the previous value if the path was occupied.
	pub fn insert(&mut self, path: &[Arg], value: T) -> Option<T> {
		let mut node = &mut self.root;
		for key in path {
			node = node.children.entry(key.clone()).or_insert_with(Node::new);
		}
		let old = node.leaf.replace(value);
		if old.is_none() {
			self.len += 1;
		}
		old
	}

	/// Look up the value at a path. A missing intermediate level simply
	/// reports absent.
	pub fn get(&self, path: &[Arg]) -> Option<&T> {
		let mut node = &self.root;
		for key in path {
			node = node.children.get(key)?;
		}
		node.leaf.as_ref()
	}

	pub fn get_mut(&mut self, path: &[Arg]) -> Option<&mut T> {
		let mut node = &mut self.root;
		for key in path {
			node = node.children.get_mut(key)?;
		}
		node.leaf.as_mut()
	}

	pub fn contains(&self, path: &[Arg]) -> bool {
		self.get(path).is_some()
	}

	/// Remove the value at a path, pruning any intermediate level left with
	/// zero children so no empty branches persist.
	pub fn remove(&mut self, path: &[Arg]) -> Option<T> {
		let removed = Self::remove_at(&mut self.root, path);
		if removed.is_some() {
			self.len -= 1;
		}
		removed
	}

	fn remove_at(node: &mut Node<T>, path: &[Arg]) -> Option<T> {
		let Some((key, rest)) = path.split_first() else {
			return node.leaf.take();
		};
		let child = node.children.get_mut(key)?;
		let removed = Self::remove_at(child, rest);
		if child.leaf.is_none() && child.children.is_empty() {
			node.children.remove(key);
		}
		removed
	}

	/// Number of stored leaves.
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}
}

impl<T> Default for KeyTrie<T> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn path(keys: &[i64]) -> Vec<Arg> {
		keys.iter().map(|k| Arg::Int(*k)).collect()
	}

	#[test]
	fn test_insert_and_get() {
		let mut trie = KeyTrie::new();
		trie.insert(&path(&[1, 2, 3]), "a");
		trie.insert(&path(&[1, 2, 4]), "b");

		assert_eq!(trie.get(&path(&[1, 2, 3])), Some(&"a"));
		assert_eq!(trie.get(&path(&[1, 2, 4])), Some(&"b"));
		assert_eq!(trie.get(&path(&[1, 2, 5])), None);
		assert_eq!(trie.len(), 2);
	}

	#[test]
	fn test_missing_intermediate_level_is_absent() {
		let trie: KeyTrie<&str> = KeyTrie::new();
		assert_eq!(trie.get(&path(&[9, 9, 9])), None);
		assert!(!trie.contains(&path(&[9])));
	}

	#[test]
	fn test_insert_replaces_existing_leaf() {
		let mut trie = KeyTrie::new();
		assert_eq!(trie.insert(&path(&[1]), "a"), None);
		assert_eq!(trie.insert(&path(&[1]), "b"), Some("a"));
		assert_eq!(trie.get(&path(&[1])), Some(&"b"));
		assert_eq!(trie.len(), 1);
	}

	#[test]
	fn test_remove_prunes_empty_branches() {
		let mut trie = KeyTrie::new();
		trie.insert(&path(&[1, 2, 3]), "a");
		trie.insert(&path(&[1, 5, 6]), "b");

		assert_eq!(trie.remove(&path(&[1, 2, 3])), Some("a"));
		// The [1, 2] branch is gone, but [1, 5, 6] survives.
		assert_eq!(trie.get(&path(&[1, 5, 6])), Some(&"b"));
		assert_eq!(trie.len(), 1);

		assert_eq!(trie.remove(&path(&[1, 5, 6])), Some("b"));
		assert!(trie.is_empty());
		assert!(trie.root.children.is_empty());
	}

	#[test]
	fn test_remove_missing_path_is_none() {
		let mut trie = KeyTrie::new();
		trie.insert(&path(&[1, 2]), "a");
		assert_eq!(trie.remove(&path(&[1, 3])), None);
		assert_eq!(trie.remove(&path(&[7, 8])), None);
		assert_eq!(trie.len(), 1);
	}

	#[test]
	fn test_empty_path_addresses_root_leaf() {
		let mut trie = KeyTrie::new();
		assert_eq!(trie.get(&[]), None);
		trie.insert(&[], "root");
		assert_eq!(trie.get(&[]), Some(&"root"));
		assert_eq!(trie.remove(&[]), Some("root"));
		assert!(trie.is_empty());
	}
}

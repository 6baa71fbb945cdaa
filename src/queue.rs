use std::collections::VecDeque;

/// Equality comparer used to match an incoming key against tracked keys.
pub type Comparer<K> = Box<dyn Fn(&K, &K) -> bool + Send>;

/// Bounded recency-ordered queue over opaque keys.
///
/// Most-recent sits at the front. Re-enqueuing a tracked key moves it to the
/// front without growing the queue; enqueuing a new key at capacity evicts
/// the least-recent and hands its key back to the caller. The queue never
/// touches the cache itself — the owning loader applies the eviction signal.
pub struct LruQueue<K> {
	entries: VecDeque<K>,
	capacity: usize,
	comparer: Comparer<K>,
}

impl<K: PartialEq> LruQueue<K> {
	/// Queue with deep equality (`==`) as the comparer.
	pub fn new(capacity: usize) -> Self {
		Self::with_comparer(capacity, Box::new(|a: &K, b: &K| a == b))
	}
}

impl<K> LruQueue<K> {
	pub fn with_comparer(capacity: usize, comparer: Comparer<K>) -> Self {
		Self {
			entries: VecDeque::with_capacity(capacity),
			capacity,
			comparer,
		}
	}

	/// Record an access to `key`.
	///
	/// Returns the evicted least-recent key when tracking `key` pushed the
	/// queue over capacity, `None` otherwise. Eviction is unconditional by
	/// recency order; there is no special case for a victim enqueued in the
	/// same call.
	pub fn enqueue(&mut self, key: K) -> Option<K> {
		match self.entries.iter().position(|tracked| (self.comparer)(tracked, &key)) {
			// Already most-recent.
			Some(0) => None,
			Some(index) => {
				// Move-to-front keeps the tracked key; size is unchanged.
				let tracked = self.entries.remove(index).unwrap_or(key);
				self.entries.push_front(tracked);
				None
			}
			None => {
				self.entries.push_front(key);
				if self.entries.len() > self.capacity {
					self.entries.pop_back()
				} else {
					None
				}
			}
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

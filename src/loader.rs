use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use log::{debug, trace};
use parking_lot::Mutex;
use tokio::task::AbortHandle;

use crate::error::LoadError;
use crate::hash::hash_arg;
use crate::queue::LruQueue;
use crate::trie::KeyTrie;
use crate::value::Arg;

/// The deduplicated result of a load: a shared future every concurrent
/// caller for the same key-tuple clones. `Shared::ptr_eq` is the observable
/// cache identity.
pub type LoadFuture<V> = Shared<BoxFuture<'static, Result<Arc<V>, LoadError>>>;

/// The wrapped computation, called with the padded argument tuple.
pub type LoadFn<V> = Arc<dyn Fn(Vec<Arg>) -> BoxFuture<'static, Result<V, LoadError>> + Send + Sync>;

/// Hook fired on every invalidation with the original argument tuple.
pub type DeleteHook = Arc<dyn Fn(&[Arg]) + Send + Sync>;

#[derive(Clone)]
pub(crate) struct Config {
	pub arity: usize,
	pub ttl: Option<Duration>,
	pub rolling: bool,
	pub auto_refresh: Option<Duration>,
	pub hash: bool,
	pub max: Option<usize>,
	pub curry: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			arity: 0,
			ttl: None,
			rolling: false,
			auto_refresh: None,
			hash: false,
			max: None,
			curry: false,
		}
	}
}

/// One cached key-tuple: the shared result plus everything invalidation and
/// refresh need later.
struct Entry<V> {
	future: LoadFuture<V>,
	/// Original padded argument tuple, for delete hooks and auto-refresh.
	args: Vec<Arg>,
	/// Identity across replacements; late settlements for an older
	/// generation are no-ops.
	generation: u64,
	ttl_timer: Option<AbortHandle>,
	refresh_timer: Option<AbortHandle>,
}

struct State<V> {
	cache: KeyTrie<Entry<V>>,
	queue: Option<LruQueue<Vec<Arg>>>,
}

struct Inner<V> {
	f: LoadFn<V>,
	config: Config,
	state: Mutex<State<V>>,
	hooks: Mutex<Vec<DeleteHook>>,
	generations: AtomicU64,
}

/// Memoizing wrapper around an async function.
///
/// Results are cached per argument tuple. A call whose tuple is already
/// pending or cached returns the identical shared future; the wrapped
/// function runs at most once per tuple until the entry is invalidated by
/// explicit [`delete`](Loader::delete), TTL expiry, LRU eviction, or a
/// failed computation (failures are never cached).
///
/// Cheap to clone; clones share the same cache. Timer options (`ttl`,
/// `auto_refresh`) spawn tokio tasks, so calls must run inside a tokio
/// runtime when those are configured.
///
/// # Example
///
/// ```
/// use memo_loader::{args, Loader};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let loader = Loader::new(2, |args| async move {
///     // expensive lookup keyed by both arguments
///     Ok(format!("{:?}", args))
/// });
///
/// let a = loader.invoke(args![1, "x"]);
/// let b = loader.invoke(args![1, "x"]);
/// assert!(a.ptr_eq(&b)); // deduplicated
/// # let _ = a.await;
/// # }
/// ```
pub struct Loader<V> {
	inner: Arc<Inner<V>>,
}

impl<V> std::fmt::Debug for Loader<V> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Loader").finish_non_exhaustive()
	}
}

// Manual impl so clones do not require `V: Clone`.
impl<V> Clone for Loader<V> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<V: Send + Sync + 'static> Loader<V> {
	/// Loader with no options: unbounded, no TTL, no hashing.
	pub fn new<F, Fut>(arity: usize, f: F) -> Self
	where
		F: Fn(Vec<Arg>) -> Fut + Send + Sync + 'static,
		Fut: std::future::Future<Output = Result<V, LoadError>> + Send + 'static,
	{
		let config = Config {
			arity,
			..Config::default()
		};
		Self::from_parts(Arc::new(move |args| f(args).boxed()), config, Vec::new())
	}

	pub(crate) fn from_parts(f: LoadFn<V>, config: Config, hooks: Vec<DeleteHook>) -> Self {
		let queue = config.max.map(LruQueue::new);
		Self {
			inner: Arc::new(Inner {
				f,
				config,
				state: Mutex::new(State {
					cache: KeyTrie::new(),
					queue,
				}),
				hooks: Mutex::new(hooks),
				generations: AtomicU64::new(0),
			}),
		}
	}

	/// Declared parameter count of the wrapped function.
	pub fn arity(&self) -> usize {
		self.inner.config.arity
	}

	/// Load the result for an argument tuple.
	///
	/// Extra arguments beyond the arity are ignored; missing trailing
	/// arguments are padded with [`Arg::Absent`], so a short call and an
	/// explicitly-padded call share one cache entry.
	pub fn invoke(&self, args: Vec<Arg>) -> LoadFuture<V> {
		let fn_args = self.inner.pad(args);
		let keys = self.inner.derive_keys(&fn_args);
		self.inner.load(keys, fn_args)
	}

	/// Curry-aware call. With `curry` enabled and fewer than `arity`
	/// arguments, returns a [`Partial`] that accumulates the rest; the
	/// computation and cache lookup happen only once the full tuple is
	/// assembled, so every split point collides with the direct call.
	pub fn call(&self, args: Vec<Arg>) -> Applied<V> {
		if self.inner.config.curry && args.len() < self.inner.config.arity {
			Applied::Partial(Partial {
				loader: self.clone(),
				accumulated: args,
			})
		} else {
			Applied::Loaded(self.invoke(args))
		}
	}

	/// Invalidate the entry for an argument tuple: cancel its timers,
	/// remove it, and fire delete hooks with the original arguments.
	/// Returns whether an entry existed.
	pub fn delete(&self, args: Vec<Arg>) -> bool {
		let fn_args = self.inner.pad(args);
		let keys = self.inner.derive_keys(&fn_args);
		let removed = {
			let mut state = self.inner.state.lock();
			Inner::remove_entry(&mut state, &keys)
		};
		let existed = removed.is_some();
		if existed {
			trace!("deleted entry for {:?}", keys);
		}
		self.inner.fire_hooks(removed);
		existed
	}

	/// Register a delete hook. Hooks accumulate and all fire in
	/// registration order on every invalidation, receiving the original
	/// argument tuple.
	pub fn on_delete(&self, hook: impl Fn(&[Arg]) + Send + Sync + 'static) -> &Self {
		self.inner.hooks.lock().push(Arc::new(hook));
		self
	}

	/// Whether an entry (pending or settled) exists for the tuple.
	/// Does not touch LRU recency.
	pub fn contains(&self, args: Vec<Arg>) -> bool {
		let fn_args = self.inner.pad(args);
		let keys = self.inner.derive_keys(&fn_args);
		self.inner.state.lock().cache.contains(&keys)
	}

	/// Number of cached key-tuples.
	pub fn len(&self) -> usize {
		self.inner.state.lock().cache.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<V: Send + Sync + 'static> Inner<V> {
	/// Truncate extra arguments and pad missing trailing ones with the
	/// canonical absent marker.
	fn pad(&self, mut args: Vec<Arg>) -> Vec<Arg> {
		args.truncate(self.config.arity);
		args.resize(self.config.arity, Arg::Absent);
		args
	}

	fn derive_keys(&self, fn_args: &[Arg]) -> Vec<Arg> {
		if self.config.hash {
			fn_args.iter().map(hash_arg).collect()
		} else {
			fn_args.to_vec()
		}
	}

	fn load(self: &Arc<Self>, keys: Vec<Arg>, fn_args: Vec<Arg>) -> LoadFuture<V> {
		let mut victim_args = None;
		let mut state = self.state.lock();

		if let Some(queue) = state.queue.as_mut() {
			if let Some(victim) = queue.enqueue(keys.clone()) {
				debug!("lru overflow, evicting {:?}", victim);
				victim_args = Self::remove_entry(&mut state, &victim);
			}
		}

		if let Some(entry) = state.cache.get(&keys) {
			let future = entry.future.clone();
			let generation = entry.generation;
			// Rolling mode resets the expiry countdown to full duration
			// on every hit.
			if self.config.rolling {
				if let Some(ttl) = self.config.ttl {
					let fresh = self.spawn_ttl(keys.clone(), generation, ttl);
					if let Some(entry) = state.cache.get_mut(&keys) {
						if let Some(old) = entry.ttl_timer.replace(fresh) {
							old.abort();
						}
					}
				}
			}
			drop(state);
			self.fire_hooks(victim_args);
			return future;
		}

		// Store the pending result before anyone can poll it, so every
		// concurrent same-tuple caller clones this one shared future.
		let generation = self.generations.fetch_add(1, Ordering::Relaxed);
		let raw = (self.f)(fn_args.clone());
		let weak = Arc::downgrade(self);
		let reject_keys = keys.clone();
		let future: LoadFuture<V> = async move {
			match raw.await {
				Ok(value) => Ok(Arc::new(value)),
				Err(err) => {
					// A failure is never retained; the next call retries.
					if let Some(inner) = weak.upgrade() {
						inner.invalidate_if_current(&reject_keys, generation);
					}
					Err(err)
				}
			}
		}
		.boxed()
		.shared();

		let mut entry = Entry {
			future: future.clone(),
			args: fn_args,
			generation,
			ttl_timer: None,
			refresh_timer: None,
		};
		if let Some(ttl) = self.config.ttl {
			entry.ttl_timer = Some(self.spawn_ttl(keys.clone(), generation, ttl));
		}
		if let Some(period) = self.config.auto_refresh {
			entry.refresh_timer = Some(self.spawn_refresh(keys.clone(), generation, period));
		}
		state.cache.insert(&keys, entry);

		drop(state);
		self.fire_hooks(victim_args);
		future
	}

	/// One-shot expiry timer. The generation check makes a fire against a
	/// replaced entry a no-op.
	fn spawn_ttl(self: &Arc<Self>, keys: Vec<Arg>, generation: u64, ttl: Duration) -> AbortHandle {
		let weak = Arc::downgrade(self);
		tokio::spawn(async move {
			tokio::time::sleep(ttl).await;
			if let Some(inner) = weak.upgrade() {
				trace!("ttl expired for {:?}", keys);
				inner.invalidate_if_current(&keys, generation);
			}
		})
		.abort_handle()
	}

	/// Recurring background recomputation. Success replaces the stored
	/// result in place without disturbing LRU or TTL state; failure
	/// invalidates and does not re-arm; a deleted entry stops the task.
	fn spawn_refresh(
		self: &Arc<Self>,
		keys: Vec<Arg>,
		generation: u64,
		period: Duration,
	) -> AbortHandle {
		let weak = Arc::downgrade(self);
		tokio::spawn(async move {
			loop {
				tokio::time::sleep(period).await;
				let Some(inner) = weak.upgrade() else { break };

				let fn_args = {
					let state = inner.state.lock();
					match state.cache.get(&keys) {
						Some(entry) if entry.generation == generation => Some(entry.args.clone()),
						_ => None,
					}
				};
				let Some(fn_args) = fn_args else { break };

				match (inner.f)(fn_args).await {
					Ok(value) => {
						let mut state = inner.state.lock();
						match state.cache.get_mut(&keys) {
							Some(entry) if entry.generation == generation => {
								trace!("auto-refresh replaced {:?}", keys);
								entry.future =
									futures::future::ready(Ok(Arc::new(value))).boxed().shared();
							}
							// Entry replaced mid-recompute; discard the result.
							_ => break,
						}
					}
					Err(err) => {
						debug!("auto-refresh failed for {:?}: {}", keys, err);
						inner.invalidate_if_current(&keys, generation);
						break;
					}
				}
			}
		})
		.abort_handle()
	}

	/// Invalidate only if the entry at `keys` is still the given
	/// generation. Guards late settlements against newer entries.
	fn invalidate_if_current(&self, keys: &[Arg], generation: u64) {
		let removed = {
			let mut state = self.state.lock();
			match state.cache.get(keys) {
				Some(entry) if entry.generation == generation => {
					Self::remove_entry(&mut state, keys)
				}
				_ => None,
			}
		};
		self.fire_hooks(removed);
	}

	/// Remove an entry and cancel its timers. Returns the original
	/// argument tuple for the delete hooks.
	fn remove_entry(state: &mut State<V>, keys: &[Arg]) -> Option<Vec<Arg>> {
		let entry = state.cache.remove(keys)?;
		if let Some(timer) = entry.ttl_timer {
			timer.abort();
		}
		if let Some(timer) = entry.refresh_timer {
			timer.abort();
		}
		Some(entry.args)
	}

	/// Hooks fire outside the state lock so they may re-enter the loader.
	fn fire_hooks(&self, args: Option<Vec<Arg>>) {
		let Some(args) = args else { return };
		let hooks: Vec<DeleteHook> = self.hooks.lock().clone();
		for hook in hooks {
			hook(&args);
		}
	}
}

/// Result of a curry-aware [`Loader::call`].
pub enum Applied<V> {
	/// Accumulated arguments have not reached the arity yet.
	Partial(Partial<V>),
	/// The full tuple was assembled and loaded.
	Loaded(LoadFuture<V>),
}

impl<V> Applied<V> {
	pub fn loaded(self) -> Option<LoadFuture<V>> {
		match self {
			Applied::Loaded(future) => Some(future),
			Applied::Partial(_) => None,
		}
	}

	pub fn partial(self) -> Option<Partial<V>> {
		match self {
			Applied::Partial(partial) => Some(partial),
			Applied::Loaded(_) => None,
		}
	}
}

/// A partially-applied call accumulating arguments toward the loader's
/// arity. Clone it to complete the same prefix several ways; the cache key
/// depends only on the final full tuple.
pub struct Partial<V> {
	loader: Loader<V>,
	accumulated: Vec<Arg>,
}

impl<V> Clone for Partial<V> {
	fn clone(&self) -> Self {
		Self {
			loader: self.loader.clone(),
			accumulated: self.accumulated.clone(),
		}
	}
}

impl<V: Send + Sync + 'static> Partial<V> {
	pub fn call(mut self, args: Vec<Arg>) -> Applied<V> {
		self.accumulated.extend(args);
		self.loader.call(self.accumulated)
	}

	/// Arguments supplied so far.
	pub fn supplied(&self) -> usize {
		self.accumulated.len()
	}
}

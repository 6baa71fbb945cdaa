use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use crate::error::{ConfigError, LoadError};
use crate::loader::{Config, DeleteHook, LoadFn, Loader};
use crate::value::Arg;

/// Builder for configuring a [`Loader`].
///
/// Validation is fail-fast: [`build`](LoaderBuilder::build) rejects an
/// invalid combination before any loader state exists.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use memo_loader::LoaderBuilder;
///
/// let loader = LoaderBuilder::new(1, |args| async move { Ok(args.len()) })
///     .ttl(Duration::from_secs(30))
///     .rolling(true)
///     .max(128)
///     .hash(true)
///     .build()
///     .unwrap();
/// # let _ = loader;
/// ```
pub struct LoaderBuilder<V> {
	f: LoadFn<V>,
	config: Config,
	hooks: Vec<DeleteHook>,
}

impl<V: Send + Sync + 'static> LoaderBuilder<V> {
	/// Start from the wrapped async function and its declared parameter
	/// count. Calls with more arguments are truncated to `arity`; calls
	/// with fewer are padded with [`Arg::Absent`].
	pub fn new<F, Fut>(arity: usize, f: F) -> Self
	where
		F: Fn(Vec<Arg>) -> Fut + Send + Sync + 'static,
		Fut: std::future::Future<Output = Result<V, LoadError>> + Send + 'static,
	{
		Self {
			f: Arc::new(move |args| f(args).boxed()),
			config: Config {
				arity,
				..Config::default()
			},
			hooks: Vec::new(),
		}
	}

	/// Entries expire this long after creation.
	///
	/// Omit the setter to disable expiry; a zero duration is rejected at
	/// build time rather than treated as "no TTL".
	pub fn ttl(mut self, ttl: Duration) -> Self {
		self.config.ttl = Some(ttl);
		self
	}

	/// Reset the TTL countdown to full duration on every cache hit.
	/// Requires [`ttl`](LoaderBuilder::ttl).
	pub fn rolling(mut self, rolling: bool) -> Self {
		self.config.rolling = rolling;
		self
	}

	/// Recompute still-cached entries in the background at this interval,
	/// replacing the stored result in place. A failed recomputation
	/// invalidates the entry and stops refreshing it. Omit the setter to
	/// disable refreshing; a zero period is rejected at build time.
	pub fn auto_refresh(mut self, period: Duration) -> Self {
		self.config.auto_refresh = Some(period);
		self
	}

	/// Canonicalize composite arguments so structurally-equal values share
	/// a cache entry regardless of field declaration order.
	pub fn hash(mut self, hash: bool) -> Self {
		self.config.hash = hash;
		self
	}

	/// Bound the cache to `max` key-tuples with LRU eviction. Must be at
	/// least 2.
	pub fn max(mut self, max: usize) -> Self {
		self.config.max = Some(max);
		self
	}

	/// Allow partial application through [`Loader::call`].
	pub fn curry(mut self, curry: bool) -> Self {
		self.config.curry = curry;
		self
	}

	/// Register a delete hook at construction. Repeatable; hooks fire in
	/// registration order on every invalidation.
	pub fn on_delete(mut self, hook: impl Fn(&[Arg]) + Send + Sync + 'static) -> Self {
		self.hooks.push(Arc::new(hook));
		self
	}

	/// Validate the configuration and construct the loader.
	pub fn build(self) -> Result<Loader<V>, ConfigError> {
		if let Some(max) = self.config.max {
			if max < 2 {
				return Err(ConfigError::MaxTooSmall(max));
			}
		}
		if self.config.rolling && self.config.ttl.is_none() {
			return Err(ConfigError::RollingWithoutTtl);
		}
		if self.config.ttl == Some(Duration::ZERO) {
			return Err(ConfigError::ZeroTtl);
		}
		if self.config.auto_refresh == Some(Duration::ZERO) {
			return Err(ConfigError::ZeroRefresh);
		}
		Ok(Loader::from_parts(self.f, self.config, self.hooks))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn noop(_args: Vec<Arg>) -> futures::future::Ready<Result<u32, LoadError>> {
		futures::future::ready(Ok(0))
	}

	#[test]
	fn test_builder_defaults() {
		let loader = LoaderBuilder::new(2, noop).build().unwrap();
		assert_eq!(loader.arity(), 2);
		assert!(loader.is_empty());
	}

	#[test]
	fn test_max_below_two_is_rejected() {
		let err = LoaderBuilder::new(1, noop).max(1).build().unwrap_err();
		assert_eq!(err, ConfigError::MaxTooSmall(1));

		let err = LoaderBuilder::new(1, noop).max(0).build().unwrap_err();
		assert_eq!(err, ConfigError::MaxTooSmall(0));
	}

	#[test]
	fn test_max_of_two_is_accepted() {
		assert!(LoaderBuilder::new(1, noop).max(2).build().is_ok());
	}

	#[test]
	fn test_rolling_without_ttl_is_rejected() {
		let err = LoaderBuilder::new(1, noop).rolling(true).build().unwrap_err();
		assert_eq!(err, ConfigError::RollingWithoutTtl);
	}

	#[test]
	fn test_zero_durations_are_rejected() {
		let err = LoaderBuilder::new(1, noop).ttl(Duration::ZERO).build().unwrap_err();
		assert_eq!(err, ConfigError::ZeroTtl);

		let err = LoaderBuilder::new(1, noop)
			.auto_refresh(Duration::ZERO)
			.build()
			.unwrap_err();
		assert_eq!(err, ConfigError::ZeroRefresh);
	}
}

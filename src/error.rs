use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Invalid loader configuration, reported synchronously by
/// [`LoaderBuilder::build`](crate::LoaderBuilder::build). Construction does
/// not proceed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
	/// `max` bounds the cache and must track at least two keys.
	#[error("max must be greater than 1, got {0}")]
	MaxTooSmall(usize),
	/// `rolling` resets the TTL countdown on hit, so it needs a TTL.
	#[error("rolling requires a ttl")]
	RollingWithoutTtl,
	/// `ttl` of zero would expire entries before any caller sees them.
	#[error("ttl must be non-zero")]
	ZeroTtl,
	/// `auto_refresh` of zero would recompute in a busy loop.
	#[error("auto_refresh must be non-zero")]
	ZeroRefresh,
}

/// The wrapped computation failed.
///
/// Clones share the underlying cause, which is exposed through
/// [`std::error::Error::source`], so the error can flow through a shared
/// future to every deduplicated caller. The failed entry is invalidated as a
/// side effect; the next call for the same key-tuple recomputes instead of
/// replaying this error.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct LoadError(#[source] Arc<dyn std::error::Error + Send + Sync>);

impl LoadError {
	pub fn new<E>(cause: E) -> Self
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		Self(Arc::new(cause))
	}

	/// Build from a bare message.
	pub fn msg(message: impl Into<String>) -> Self {
		Self(Arc::new(Message(message.into())))
	}
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl std::error::Error for Message {}

//! # Memo Loader
//!
//! A memoizing async-call cache: wrap an async function and results are
//! cached per argument tuple, with:
//! - **Concurrent-call deduplication** (one computation per key-tuple;
//!   failures are never cached)
//! - **TTL expiry**, optionally **rolling** (reset on every hit)
//! - **Bounded LRU eviction** over key-tuples
//! - **Structural-equality hashing** for composite arguments
//! - **Auto-refresh** background recomputation
//! - **Delete hooks** fired on every invalidation
//! - **Curried partial application**
//!
//! ## Quick Start
//!
//! ```rust
//! use memo_loader::{args, Arg, Loader};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! // Wrap a 2-argument async function.
//! let loader = Loader::new(2, |args| async move {
//!     let (a, b) = (args[0].clone(), args[1].clone());
//!     match (a, b) {
//!         (Arg::Int(x), Arg::Int(y)) => Ok(x * y),
//!         _ => Ok(0),
//!     }
//! });
//!
//! let first = loader.invoke(args![5, 6]);
//! let again = loader.invoke(args![5, 6]);
//!
//! // Both calls observe the identical shared future.
//! assert!(first.ptr_eq(&again));
//! assert_eq!(*first.await.unwrap(), 30);
//! # }
//! ```
//!
//! ## Configured loaders
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use memo_loader::LoaderBuilder;
//!
//! let loader = LoaderBuilder::new(1, fetch_user)
//!     .ttl(Duration::from_secs(60))
//!     .rolling(true)
//!     .max(1024)
//!     .hash(true)
//!     .on_delete(|args| println!("invalidated {args:?}"))
//!     .build()?;
//! ```
//!
//! The loader is `Send + Sync` and cheap to clone; clones share the cache.
//! Timer options spawn tokio tasks, so configure `ttl`/`auto_refresh` only
//! when calls run inside a tokio runtime.

mod builder;
mod error;
mod hash;
mod loader;
mod queue;
mod trie;
mod value;

pub use builder::LoaderBuilder;
pub use error::{ConfigError, LoadError};
pub use hash::hash_arg;
pub use loader::{Applied, DeleteHook, LoadFn, LoadFuture, Loader, Partial};
pub use queue::LruQueue;
pub use trie::KeyTrie;
pub use value::Arg;

/// Build a `Vec<Arg>` from anything convertible into [`Arg`].
///
/// ```
/// use memo_loader::{args, Arg};
///
/// let tuple = args![1, "user", true, Arg::Absent];
/// assert_eq!(tuple.len(), 4);
/// ```
#[macro_export]
macro_rules! args {
	() => {
		::std::vec::Vec::<$crate::Arg>::new()
	};
	($($arg:expr),+ $(,)?) => {
		::std::vec![$($crate::Arg::from($arg)),+]
	};
}

//! Content-addressed build cache
//!
//! Three independent domains accelerate the image build: the
//! compiled-dependency cache, the package-manager cache, and the build-layer
//! cache. Keys are derived from lock-file content, so a stale entry can only
//! collide with equivalent inputs. Caching is a performance optimization,
//! never correctness-bearing: every domain may start empty.

pub mod key;
pub mod store;

pub use key::{compute_key, compute_keys, CacheDomain, CacheKey, DomainKey, KeySource};
pub use store::{CacheEntry, CacheStore, Restored};

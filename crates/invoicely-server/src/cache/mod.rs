//! Response caching.
//!
//! [`MemoryCache`] is the only backend. It sits behind the response cache
//! middleware; the internal admin routes read its stats and clear it.

pub mod key;
pub mod memory;
pub mod r#trait;

pub use key::CacheKey;
pub use memory::MemoryCache;
pub use r#trait::{Cache, CacheError, CacheExt, CacheResult, CacheStats};

//! Response cache for completed AI tasks
//!
//! Content-addressed, TTL-bounded storage of prior responses. Entries expire
//! lazily on read and the store evicts the oldest insertion when full.

pub mod key;
pub mod manager;
pub mod policy;
pub mod types;


pub use key::{CacheKey, hash_context};
pub use manager::ResponseCache;
pub use policy::CachePolicy;
pub use types::{CacheEntry, CacheStats};

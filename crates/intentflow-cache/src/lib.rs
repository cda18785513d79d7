//! intentflow cache layer
//!
//! The optimization layer every pipeline stage reads and writes through.
//!
//! # Core Pieces
//!
//! - **TtlCache**: bounded key/value store with per-entry expiration, a
//!   background sweep and evict-on-read
//! - **Key generation**: deterministic fingerprints of (category, input)
//!   pairs so identical requests reuse prior results
//!
//! # Architecture
//!
//! ```text
//! (category, input) → canonical JSON → blake3 → CacheKey
//!                                                  ↓
//!                     TtlCache<CacheKey, V>  ← set/get/sweep
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use intentflow_cache::{generate_key, TtlCache};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = TtlCache::new(1_000, Duration::from_secs(60));
//! let key = generate_key("roi-analysis", &serde_json::json!({ "ops": 3 }))?;
//!
//! cache.set(key.clone(), 42u32, Duration::from_secs(300));
//! assert_eq!(cache.get(&key), Some(42));
//! # Ok(())
//! # }
//! ```
//!
//! Nothing in this crate returns an error that should abort a caller: a
//! failed lookup or a failed key derivation simply means "not cached".

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod key;
pub mod ttl;

pub use error::KeyError;
pub use key::{canonical_json, generate_key, CacheKey};
pub use ttl::{CacheStats, TtlCache};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the cache layer
    pub use crate::key::{generate_key, CacheKey};
    pub use crate::ttl::{CacheStats, TtlCache};
}

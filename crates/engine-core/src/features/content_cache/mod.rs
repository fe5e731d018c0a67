//! Content cache (spec §4.A): memoizes expensive analyses keyed on content
//! hash rather than path, so identical content is deduplicated across paths
//! and survives renames.

mod store;

pub use store::{CacheStats, ContentCache, EvictReason};

//! Ephemeral storage (Redis).
//!
//! Risk events live entirely in Redis; the relational store never sees them.
//! All access goes through the [`CacheStore`] trait so the aggregation
//! engine and handlers can be tested against mocks.
//!
//! ## Redis Key Patterns
//!
//! ```text
//! {email}:{epochSeconds} → {score}:{sourceTag}:{opaqueId}   (risk event, TTL)
//! ```
//!
//! Events are partitioned into their own logical Redis DB index. The index
//! is fixed per adapter instance at construction; nothing mutates the
//! namespace of a live connection.

mod cache;

pub use cache::{CacheStore, RedisCacheStore};

#[cfg(test)]
pub use cache::MockCacheStore;

/// Logical Redis DB index holding risk events.
pub const RISK_EVENTS_NAMESPACE: i64 = 6;

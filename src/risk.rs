//! At-risk score aggregation over the cache store.
//!
//! Each risk event is one Redis key/value pair (see [`crate::codec`]). A
//! user's total score is never stored: it is recomputed on every call by
//! scanning `{email}:*` and summing the leading score segment of every
//! value. Concurrent create/delete calls for one email are not serialized,
//! so two in-flight requests can observe a stale sum; the total is
//! eventually accurate because the next call recomputes it from scratch.
//!
//! Event resolution ([`RiskService::get_event_score`]) is three-tiered:
//! direct key lookup, a retry at `timestamp / 1000` for callers holding a
//! millisecond-resolution timestamp, and a linear scan of the user's
//! events for an embedded Message-ID token.

use std::sync::Arc;

use thiserror::Error;

use crate::codec::{self, EventKey, EventValue};
use crate::stores::CacheStore;

/// Closed error set surfaced to the API layer. `NotFound` maps to a client
/// error there; everything else renders as a generic server error.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("risk event not found")]
    NotFound,
    #[error("timestamp is not numeric")]
    InvalidTimestamp,
    #[error("stored event value has a non-numeric score segment")]
    InvalidScore,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// A resolved risk event: the key it was found under, the stored value
/// verbatim, and the parsed score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventScore {
    pub key: String,
    pub value: String,
    pub score: i64,
}

/// Stateless aggregation engine; all state lives in the cache store.
#[derive(Clone)]
pub struct RiskService {
    cache: Arc<dyn CacheStore>,
    default_ttl_secs: u64,
}

impl RiskService {
    pub fn new(cache: Arc<dyn CacheStore>, default_ttl_secs: u64) -> Self {
        Self {
            cache,
            default_ttl_secs,
        }
    }

    /// Records a risk event with the default TTL and returns the user's
    /// recomputed total score. An existing event under the same key is
    /// overwritten (a changed score is recorded as delete + recreate by
    /// callers, but the store itself is last-write-wins).
    pub async fn create_event(
        &self,
        key: &EventKey,
        value: &EventValue,
    ) -> Result<i64, RiskError> {
        tracing::info!(key = %key, "recording risk event");
        self.cache
            .set_with_ttl(&key.to_string(), &value.to_string(), self.default_ttl_secs)
            .await?;

        self.total_score(&key.email).await
    }

    /// Removes a risk event and returns the user's recomputed total score.
    ///
    /// The existence pre-check gives callers an explicit "nothing to
    /// delete" signal instead of a score change that silently did nothing.
    pub async fn delete_event(&self, key: &EventKey) -> Result<i64, RiskError> {
        let encoded = key.to_string();
        if !self.cache.exists(&encoded).await? {
            tracing::warn!(key = %encoded, "cannot unassign score, none assigned");
            return Err(RiskError::NotFound);
        }

        self.cache.delete(&encoded).await?;

        self.total_score(&key.email).await
    }

    /// Sums the scores of every cached event for an email.
    ///
    /// A non-numeric leading segment indicates corrupted data and fails the
    /// whole sum rather than contributing zero. A key deleted between the
    /// scan and its fetch also fails the call (see DESIGN.md).
    pub async fn total_score(&self, email: &str) -> Result<i64, RiskError> {
        let keys = self.cache.keys_by_prefix(&format!("{email}:*")).await?;

        let mut total = 0i64;
        for key in keys {
            let value = self.cache.get(&key).await?.ok_or(RiskError::NotFound)?;
            total += codec::score_segment(&value).ok_or(RiskError::InvalidScore)?;
        }

        Ok(total)
    }

    /// Resets the TTL of every cached event for an email.
    ///
    /// Not transactional: a failure partway leaves earlier keys extended.
    /// That partial state only ever lengthens a key's life, so it is an
    /// observable but harmless side effect.
    pub async fn extend_ttl(&self, email: &str, ttl_secs: u64) -> Result<(), RiskError> {
        let keys = self.cache.keys_by_prefix(&format!("{email}:*")).await?;

        for key in keys {
            self.cache.set_ttl(&key, ttl_secs).await?;
        }

        Ok(())
    }

    /// Resolves a single risk event by timestamp, with two fallbacks.
    ///
    /// Upstream clocks record timestamps at both second and millisecond
    /// resolution, so a miss on the exact key retries at
    /// `timestamp / 1000`. Some callers only hold a Message-ID correlation
    /// token; when the resolved value is empty and `mid` looks like a
    /// Message-ID header (leading `<`), the user's events are scanned for
    /// a value embedding it and the first match is adopted.
    pub async fn get_event_score(
        &self,
        email: &str,
        timestamp: &str,
        mid: &str,
    ) -> Result<EventScore, RiskError> {
        let mut key = format!("{email}:{timestamp}");

        if !self.cache.exists(&key).await? {
            let millis: i64 = timestamp
                .parse()
                .map_err(|_| RiskError::InvalidTimestamp)?;
            key = format!("{email}:{}", millis / 1000);
        }

        let mut value = self.cache.get(&key).await?.ok_or(RiskError::NotFound)?;

        if value.is_empty() && mid.starts_with('<') {
            for candidate in self.cache.keys_by_prefix(&format!("{email}:*")).await? {
                let stored = self
                    .cache
                    .get(&candidate)
                    .await?
                    .ok_or(RiskError::NotFound)?;
                if stored.contains(mid) {
                    tracing::info!(key = %candidate, "resolved risk event by message-id scan");
                    key = candidate;
                    value = stored;
                    break;
                }
            }
        }

        let score = codec::score_segment(&value).ok_or(RiskError::InvalidScore)?;

        Ok(EventScore { key, value, score })
    }
}

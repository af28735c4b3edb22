//! Encoding of risk events as cache key/value strings.
//!
//! A risk event is stored as a single Redis key/value pair:
//!
//! ```text
//! <email>:<epochSeconds>  →  <score>:<sourceTag>:<opaqueId>
//! ```
//!
//! The encoding has no escaping, so subfields must not contain `:`. That
//! invariant is enforced here, at construction time, rather than trusted
//! at every split site. Aggregation code that reads back stored values
//! uses [`score_segment`], which only interprets the leading segment and
//! leaves the identifying metadata opaque.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("key must be <email>:<timestamp>, separated by a single colon")]
    KeyShape,
    #[error("key email segment is not a valid email address")]
    KeyEmail,
    #[error("key timestamp segment must be a non-negative integer")]
    KeyTimestamp,
    #[error("value must be <score>:<source>:<id>, separated by two colons")]
    ValueShape,
    #[error("value score segment must be an integer")]
    ValueScore,
    #[error("subfields must not contain ':'")]
    EmbeddedColon,
}

/// Addresses one risk event: the user it belongs to and when it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventKey {
    pub email: String,
    pub timestamp: u64,
}

impl EventKey {
    /// Builds a key, rejecting emails that would corrupt the encoding.
    pub fn new(email: &str, timestamp: u64) -> Result<Self, CodecError> {
        if email.contains(':') {
            return Err(CodecError::EmbeddedColon);
        }
        if !is_email_shaped(email) {
            return Err(CodecError::KeyEmail);
        }
        Ok(Self {
            email: email.to_string(),
            timestamp,
        })
    }
}

impl FromStr for EventKey {
    type Err = CodecError;

    fn from_str(raw: &str) -> Result<Self, CodecError> {
        let mut parts = raw.split(':');
        let (Some(email), Some(ts), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(CodecError::KeyShape);
        };
        if !is_email_shaped(email) {
            return Err(CodecError::KeyEmail);
        }
        let timestamp = ts.parse().map_err(|_| CodecError::KeyTimestamp)?;
        Ok(Self {
            email: email.to_string(),
            timestamp,
        })
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.email, self.timestamp)
    }
}

/// The payload of one risk event: a score plus identifying metadata.
///
/// `source` is a category tag (which detector produced the signal) and
/// `correlation_id` an opaque token such as an email Message-ID, used by
/// the substring-scan fallback in event resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventValue {
    pub score: i64,
    pub source: String,
    pub correlation_id: String,
}

impl EventValue {
    pub fn new(score: i64, source: &str, correlation_id: &str) -> Result<Self, CodecError> {
        if source.contains(':') || correlation_id.contains(':') {
            return Err(CodecError::EmbeddedColon);
        }
        Ok(Self {
            score,
            source: source.to_string(),
            correlation_id: correlation_id.to_string(),
        })
    }
}

impl FromStr for EventValue {
    type Err = CodecError;

    fn from_str(raw: &str) -> Result<Self, CodecError> {
        let mut parts = raw.split(':');
        let (Some(score), Some(source), Some(id), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(CodecError::ValueShape);
        };
        let score = score.parse().map_err(|_| CodecError::ValueScore)?;
        Ok(Self {
            score,
            source: source.to_string(),
            correlation_id: id.to_string(),
        })
    }
}

impl fmt::Display for EventValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.score, self.source, self.correlation_id)
    }
}

/// Extracts the leading colon-delimited segment of a stored value as an
/// integer score. Returns `None` when it does not parse, which the
/// aggregation paths treat as data corruption and fail loudly on.
pub fn score_segment(raw: &str) -> Option<i64> {
    raw.split(':').next()?.parse().ok()
}

/// Structural email check: one `@` with non-empty local part and domain.
/// Full address validation happens at the API boundary; this only guards
/// the encoding against values that could never be an address.
fn is_email_shaped(s: &str) -> bool {
    let mut halves = s.split('@');
    matches!(
        (halves.next(), halves.next(), halves.next()),
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_round_trips() {
        let key: EventKey = "sam@school.edu:1684323604".parse().unwrap();
        assert_eq!(key.email, "sam@school.edu");
        assert_eq!(key.timestamp, 1684323604);
        assert_eq!(key.to_string(), "sam@school.edu:1684323604");
    }

    #[test]
    fn key_rejects_wrong_colon_count() {
        assert_eq!(
            "sam@school.edu".parse::<EventKey>(),
            Err(CodecError::KeyShape)
        );
        assert_eq!(
            "sam@school.edu:123:456".parse::<EventKey>(),
            Err(CodecError::KeyShape)
        );
    }

    #[test]
    fn key_rejects_non_email_first_segment() {
        assert_eq!(
            "not-an-email:1684323604".parse::<EventKey>(),
            Err(CodecError::KeyEmail)
        );
        assert_eq!("@school.edu:1".parse::<EventKey>(), Err(CodecError::KeyEmail));
    }

    #[test]
    fn key_rejects_non_numeric_and_negative_timestamps() {
        assert_eq!(
            "sam@school.edu:16fs54".parse::<EventKey>(),
            Err(CodecError::KeyTimestamp)
        );
        assert_eq!(
            "sam@school.edu:-5".parse::<EventKey>(),
            Err(CodecError::KeyTimestamp)
        );
    }

    #[test]
    fn key_construction_rejects_colon_in_email() {
        assert_eq!(
            EventKey::new("sam:evil@school.edu", 1).unwrap_err(),
            CodecError::EmbeddedColon
        );
    }

    #[test]
    fn value_round_trips() {
        let value: EventValue = "46:scan:<msg-id-123>".parse().unwrap();
        assert_eq!(value.score, 46);
        assert_eq!(value.source, "scan");
        assert_eq!(value.correlation_id, "<msg-id-123>");
        assert_eq!(value.to_string(), "46:scan:<msg-id-123>");
    }

    #[test]
    fn value_rejects_wrong_segment_count() {
        assert_eq!("46:scan".parse::<EventValue>(), Err(CodecError::ValueShape));
        assert_eq!(
            "46:scan:id:extra".parse::<EventValue>(),
            Err(CodecError::ValueShape)
        );
    }

    #[test]
    fn value_rejects_non_numeric_score() {
        assert_eq!(
            "dede:scan:id".parse::<EventValue>(),
            Err(CodecError::ValueScore)
        );
    }

    #[test]
    fn value_construction_rejects_embedded_colons() {
        assert_eq!(
            EventValue::new(46, "sc:an", "id").unwrap_err(),
            CodecError::EmbeddedColon
        );
        assert_eq!(
            EventValue::new(46, "scan", "<a:b>").unwrap_err(),
            CodecError::EmbeddedColon
        );
    }

    #[test]
    fn negative_scores_are_representable() {
        let value: EventValue = "-12:manual:adjustment".parse().unwrap();
        assert_eq!(value.score, -12);
    }

    #[test]
    fn score_segment_reads_leading_integer() {
        assert_eq!(score_segment("45:scan:1dc13ds5c1651"), Some(45));
        assert_eq!(score_segment("45"), Some(45));
        assert_eq!(score_segment(""), None);
        assert_eq!(score_segment("dede:scan:x"), None);
    }
}

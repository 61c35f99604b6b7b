//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Timestamp, ValidationError};

/// Stable identifier of an authenticated user, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a message in the visible transcript.
///
/// Never sent over the wire; it exists so that follow-up triggers can remember
/// which message they already fired for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a new random MessageId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a history record.
///
/// The remote store keys records by the epoch milliseconds at which the
/// client created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryRecordId(i64);

impl HistoryRecordId {
    /// Creates an id from epoch milliseconds.
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the epoch milliseconds.
    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Interprets the id as the creation timestamp.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        Timestamp::from_millis(self.0)
    }
}

impl fmt::Display for HistoryRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HistoryRecordId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("history_record_id", e.to_string()))
    }
}

/// Hands out strictly increasing record ids based on the wall clock.
///
/// Two records created within the same millisecond still get distinct ids.
#[derive(Debug, Clone, Default)]
pub struct RecordIdGenerator {
    last: i64,
}

impl RecordIdGenerator {
    /// Creates a generator with no ids issued yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id for the given moment.
    pub fn next_at(&mut self, now: Timestamp) -> HistoryRecordId {
        let candidate = now.as_millis().max(self.last + 1);
        self.last = candidate;
        HistoryRecordId(candidate)
    }

    /// Returns the next id for the current moment.
    pub fn next(&mut self) -> HistoryRecordId {
        self.next_at(Timestamp::now())
    }
}

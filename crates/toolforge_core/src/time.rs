//! Time types for toolforge.
//!
//! Timestamps are wall-clock UTC instants. They are metadata only: they
//! stamp execution contexts and response envelopes and never drive logic.

use chrono::{DateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Wall clock timestamp in UTC
///
/// Held at millisecond precision and serialized as an RFC 3339 string,
/// e.g. `2024-05-01T12:30:00.250Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Get current timestamp
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(3))
    }

    /// Create from milliseconds since the Unix epoch
    ///
    /// Returns `None` when the value is outside chrono's representable range.
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Milliseconds since the Unix epoch
    #[must_use]
    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Underlying chrono value
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// RFC 3339 representation with millisecond precision
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Whole milliseconds elapsed since an earlier timestamp, saturating at zero
    #[must_use]
    pub fn millis_since(&self, earlier: &Timestamp) -> u64 {
        let delta = self.as_millis().saturating_sub(earlier.as_millis());
        u64::try_from(delta).unwrap_or(0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.trunc_subsecs(3))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

//! # Temporal Types — Millisecond Timestamps
//!
//! Defines `Timestamp`, a count of milliseconds since the Unix epoch.
//!
//! ## Invariant
//!
//! Timestamps are non-negative. The representation is `u64`, so a negative
//! value cannot be constructed or deserialized, and every arithmetic helper
//! is checked and reports [`CoreError::InvalidTimestamp`] instead of
//! wrapping.
//!
//! ## Serde
//!
//! Serializes as a bare JSON integer (`123456`), the same shape used by the
//! credential encoding for `timestamp`, `tStart` and `tEnd`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::field::FieldElement;

/// Milliseconds since 1970-01-01T00:00:00Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The current wall-clock time.
    pub fn now() -> Self {
        // Clocks set before 1970 clamp to the epoch.
        let millis = Utc::now().timestamp_millis().max(0);
        Self(u64::try_from(millis).unwrap_or_default())
    }

    /// Create from a millisecond count.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Create from a signed millisecond count, rejecting negatives.
    pub fn try_from_millis(millis: i64) -> Result<Self, CoreError> {
        u64::try_from(millis)
            .map(Self)
            .map_err(|_| CoreError::InvalidTimestamp(format!("timestamp must be non-negative, got {millis}")))
    }

    /// The millisecond count.
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Field encoding used for circuit inputs: the millisecond count.
    pub fn to_field(&self) -> FieldElement {
        FieldElement::from_u64(self.0)
    }

    /// Shift by a signed number of milliseconds.
    pub fn checked_add_millis(&self, millis: i64) -> Result<Self, CoreError> {
        let shifted = if millis >= 0 {
            self.0.checked_add(millis.unsigned_abs())
        } else {
            self.0.checked_sub(millis.unsigned_abs())
        };
        shifted.map(Self).ok_or_else(|| {
            CoreError::InvalidTimestamp(format!("{} shifted by {millis} ms is out of range", self.0))
        })
    }

    /// Milliseconds elapsed from `earlier` to `self`.
    pub fn checked_duration_since(&self, earlier: Timestamp) -> Result<u64, CoreError> {
        self.0.checked_sub(earlier.0).ok_or_else(|| {
            CoreError::InvalidTimestamp(format!("{} is before {}", self.0, earlier.0))
        })
    }

    /// Scale the millisecond count.
    pub fn checked_mul(&self, factor: u64) -> Result<Self, CoreError> {
        self.0
            .checked_mul(factor)
            .map(Self)
            .ok_or_else(|| CoreError::InvalidTimestamp(format!("{} * {factor} overflows", self.0)))
    }

    /// `YYYY-MM-DD HH:mm:ss` in UTC.
    pub fn to_human_readable(&self) -> String {
        let millis = i64::try_from(self.0).unwrap_or(i64::MAX);
        match DateTime::<Utc>::from_timestamp_millis(millis) {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format!("{}ms", self.0),
        }
    }
}

impl From<u64> for Timestamp {
    fn from(millis: u64) -> Self {
        Self(millis)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

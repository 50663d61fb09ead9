//! Typed payload schemas shared by the clients, the poller and the renderer
//!
//! Every response from the identity and analytics services is parsed into one
//! of these types at the HTTP boundary; nothing past the egress layer touches
//! raw JSON.

use crate::{Error, Result};
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Opaque bearer token proving an authenticated session.
///
/// `Debug` is redacted so the token can flow through `tracing` fields without
/// leaking into logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building `Authorization` headers and persisting
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Which end of a [`DateRange`] an edit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateBound {
    Start,
    End,
}

impl FromStr for DateBound {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "start" => Ok(DateBound::Start),
            "end" => Ok(DateBound::End),
            other => Err(Error::InvalidDate(format!(
                "unknown bound '{}', expected 'start' or 'end'",
                other
            ))),
        }
    }
}

/// Inclusive calendar-date range scoping the date-range query.
///
/// `start <= end` is not enforced: an inverted range is sent to the service
/// as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Number of days covered by the default range, counted back from today
pub const DEFAULT_RANGE_DAYS: i64 = 7;

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `[today - 7 days, today]`
    pub fn default_for(today: NaiveDate) -> Self {
        Self {
            start: today - Duration::days(DEFAULT_RANGE_DAYS),
            end: today,
        }
    }

    /// Default range anchored on the local calendar date
    pub fn last_week() -> Self {
        Self::default_for(Local::now().date_naive())
    }

    /// Copy of this range with exactly one bound replaced
    pub fn with_bound(self, bound: DateBound, value: NaiveDate) -> Self {
        match bound {
            DateBound::Start => Self { start: value, ..self },
            DateBound::End => Self { end: value, ..self },
        }
    }

    /// Start of the first day, in the service's timestamp format
    pub fn start_timestamp(&self) -> String {
        format!("{}T00:00:00", self.start.format("%Y-%m-%d"))
    }

    /// Last second of the final day, in the service's timestamp format
    pub fn end_timestamp(&self) -> String {
        format!("{}T23:59:59", self.end.format("%Y-%m-%d"))
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// Parse an ISO 8601 calendar date (`YYYY-MM-DD`)
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidDate(format!("'{}': {}", value, e)))
}

/// `GET /analytics/summary`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_users: u64,
    pub active_users_24h: u64,
    pub total_events: u64,
    /// Per-type counts the service includes alongside the totals
    #[serde(default)]
    pub event_type_counts: BTreeMap<String, u64>,
}

/// One entry of `GET /analytics/events/by-type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeCount {
    pub event_type: String,
    pub count: u64,
}

/// `GET /analytics/events/date-range`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeAggregate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub total_events: u64,
    pub unique_users: u64,
    /// Keyed by event type; a `BTreeMap` keeps iteration order stable
    #[serde(default)]
    pub event_breakdown: BTreeMap<String, u64>,
}

/// `GET /users/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One entry of `GET /analytics/events`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub user_id: i64,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: String,
}

/// Query parameters for `GET /analytics/events`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

fn default_true() -> bool {
    true
}

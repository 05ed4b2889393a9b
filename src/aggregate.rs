//! Rate aggregation
//!
//! Reduces a classified event stream to the tables the chart layer renders:
//! send/reply counts with derived response rates, grouped by template or
//! display name and optionally by calendar day or calendar week.
//!
//! Grouping is deterministic; output order is not part of the contract (the
//! presentation layer sorts by rate, volume, or date as each chart needs).

use crate::classify::UNKNOWN_TEMPLATE;
use crate::types::{ClassifiedEvent, EventCategory, EventType};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Grouping key for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    /// Group by the extracted template identifier
    Template,
    /// Group by the friendly display name
    DisplayName,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Template => "template",
            GroupBy::DisplayName => "display_name",
        }
    }
}

/// Optional calendar bucketing for time-series tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBucket {
    /// One row per calendar day
    Day,
    /// One row per calendar week, keyed by the Monday of the week
    Week,
}

/// Aggregation knobs.
///
/// `clip_over_100` exists because the source data guarantees nothing about
/// one-reply-per-send. It only affects time-bucketed tables, where a short
/// bucket can pair last week's sends with this week's replies; whole-range
/// tables always keep their rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateOptions {
    /// Drop time-bucketed rows with `response_rate > 100`
    pub clip_over_100: bool,
}

/// One row of the send/reply rate table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateRow {
    /// Template or display name, depending on [`GroupBy`]
    pub group_key: String,
    /// Bucket start date when time-bucketed, `None` for the whole range
    pub bucket: Option<NaiveDate>,
    /// Events with `type == send`
    pub sent: u64,
    /// Events with `category == reply`
    pub replied: u64,
    /// `100 * replied / sent`; 0 when `sent == 0`; may exceed 100
    pub response_rate: f64,
}

/// Per-type event counts for one group, behind the stacked bar chart.
#[derive(Debug, Clone, Serialize)]
pub struct BreakdownRow {
    pub group_key: String,
    /// Count per fine-grained event type, keyed by `EventType::as_str()`
    pub counts: HashMap<String, u64>,
}

/// Response rate as a percentage, defined as 0 when there are no sends.
///
/// Total on all inputs; never NaN or infinite.
pub fn response_rate(sent: u64, replied: u64) -> f64 {
    if sent == 0 {
        0.0
    } else {
        replied as f64 / sent as f64 * 100.0
    }
}

fn group_key(event: &ClassifiedEvent, group_by: GroupBy) -> &str {
    match group_by {
        GroupBy::Template => &event.template,
        GroupBy::DisplayName => &event.display_name,
    }
}

fn bucket_date(ts: &DateTime<Utc>, bucket: TimeBucket) -> NaiveDate {
    let date = ts.date_naive();
    match bucket {
        TimeBucket::Day => date,
        TimeBucket::Week => date - Duration::days(date.weekday().num_days_from_monday() as i64),
    }
}

/// Aggregate classified events into rate rows.
///
/// `sent` counts `type == send`, `replied` counts `category == reply` (the
/// category already folds every response-like type together). Events still
/// carrying the unknown-template sentinel never contribute a row.
pub fn aggregate(
    events: &[ClassifiedEvent],
    group_by: GroupBy,
    time_bucket: Option<TimeBucket>,
    options: &AggregateOptions,
) -> Vec<RateRow> {
    let mut counts: BTreeMap<(String, Option<NaiveDate>), (u64, u64)> = BTreeMap::new();

    for event in events {
        if event.template == UNKNOWN_TEMPLATE {
            continue;
        }
        let key = (
            group_key(event, group_by).to_string(),
            time_bucket.map(|b| bucket_date(&event.created_at, b)),
        );
        let entry = counts.entry(key).or_default();
        if event.event_type == EventType::Send {
            entry.0 += 1;
        }
        if event.category == EventCategory::Reply {
            entry.1 += 1;
        }
    }

    counts
        .into_iter()
        .map(|((group_key, bucket), (sent, replied))| RateRow {
            group_key,
            bucket,
            sent,
            replied,
            response_rate: response_rate(sent, replied),
        })
        .filter(|row| {
            time_bucket.is_none() || !options.clip_over_100 || row.response_rate <= 100.0
        })
        .collect()
}

/// Count events per fine-grained type for each group.
pub fn type_breakdown(events: &[ClassifiedEvent], group_by: GroupBy) -> Vec<BreakdownRow> {
    let mut groups: BTreeMap<String, HashMap<String, u64>> = BTreeMap::new();

    for event in events {
        if event.template == UNKNOWN_TEMPLATE {
            continue;
        }
        let counts = groups
            .entry(group_key(event, group_by).to_string())
            .or_default();
        *counts.entry(event.event_type.as_str().to_string()).or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|(group_key, counts)| BreakdownRow { group_key, counts })
        .collect()
}

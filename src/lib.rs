//! # fupboard-core
//!
//! Classification and rate-aggregation core for the follow-up campaign
//! dashboard.
//!
//! This library provides:
//! - An event-name classifier mapping raw names to a `(template, type,
//!   category)` triple via an ordered, extensible pattern taxonomy
//! - Alias normalization for legacy event names and friendly display labels
//! - Date/time/selection filtering of the raw event stream
//! - Aggregation into send/reply rate tables, whole-range or time-bucketed
//!
//! ## Architecture
//!
//! One synchronous pass per refresh:
//!
//! ```text
//! raw events ─► normalize ─► filter ─► classify ─► aggregate ─► RateRow tables
//! ```
//!
//! Fetching the raw stream from the document store, the chart rendering, and
//! the refresh scheduling are collaborators outside this crate; it consumes a
//! `Vec<RawEvent>` and produces immutable tables.
//!
//! ## Example
//!
//! ```rust
//! use fupboard_core::{Pipeline, RawEvent, ReportQuery};
//! use chrono::Utc;
//!
//! let pipeline = Pipeline::from_config(&Default::default()).expect("valid built-ins");
//! let events = vec![RawEvent::new("robo_outbound_neg1_envio", Utc::now())];
//! let report = pipeline.refresh(events, &ReportQuery::default());
//! for row in &report.rates {
//!     println!("{}: {:.1}%", row.group_key, row.response_rate);
//! }
//! ```

// Re-export commonly used items at the crate root
pub use aggregate::{
    aggregate, response_rate, type_breakdown, AggregateOptions, BreakdownRow, GroupBy, RateRow,
    TimeBucket,
};
pub use classify::{Classification, Classifier, TemplatePattern, UNKNOWN_TEMPLATE};
pub use config::Config;
pub use error::{Error, Result};
pub use filter::{EventFilter, RangeQuery, TemplateSelection};
pub use normalize::AliasNormalizer;
pub use report::{Pipeline, Report, ReportQuery};
pub use types::{ClassifiedEvent, EventCategory, EventType, RawEvent};

// Public modules
pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod normalize;
pub mod report;
pub mod types;

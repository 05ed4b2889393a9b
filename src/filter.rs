//! Range and selection filtering
//!
//! Restricts the event stream before classification (date/time window and
//! structural relevance gate) and the classified stream after it (template
//! allow-list). The split exists because template names are only known
//! post-classification. The gate runs on canonical names; the alias pre-pass
//! has already rewritten legacy labels by the time events reach it.

use crate::error::{Error, Result};
use crate::types::RawEvent;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Unresolved placeholder marker in templated event names that were never
/// substituted. Such names must never reach the classifier.
const PLACEHOLDER_MARKER: char = '{';

/// Separator expected in every canonical event name.
const NAME_SEPARATOR: char = '_';

/// Caller-supplied date/time window for one refresh.
///
/// Both windows are inclusive on both bounds. The date window compares only
/// the calendar-date component, the time window only the wall-clock
/// component (independent of date). A time window with `start > end` does
/// NOT wrap past midnight: it selects nothing.
#[derive(Debug, Clone, Default)]
pub struct RangeQuery {
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub time_range: Option<(NaiveTime, NaiveTime)>,
}

impl RangeQuery {
    fn contains(&self, ts: &DateTime<Utc>) -> bool {
        if let Some((start, end)) = self.date_range {
            let date = ts.date_naive();
            if date < start || date > end {
                return false;
            }
        }
        if let Some((start, end)) = self.time_range {
            // No midnight wraparound: an inverted window is empty.
            if start > end {
                return false;
            }
            let time = ts.time();
            if time < start || time > end {
                return false;
            }
        }
        true
    }
}

/// Pre-classification filter: range window plus structural relevance gate.
#[derive(Debug)]
pub struct EventFilter {
    markers: Vec<String>,
    exclusions: Vec<Regex>,
}

impl EventFilter {
    /// Filter with the given relevance markers (case-insensitive substrings)
    /// and no exclusion patterns.
    ///
    /// An empty marker list disables the relevance check; the separator and
    /// placeholder checks always apply.
    pub fn new(relevance_markers: impl IntoIterator<Item = String>) -> Self {
        Self {
            markers: relevance_markers
                .into_iter()
                .map(|m| m.to_lowercase())
                .collect(),
            exclusions: Vec::new(),
        }
    }

    /// Filter with relevance markers plus exclusion patterns.
    ///
    /// Exclusions are case-insensitive regexes; a name matching any of them
    /// is dropped regardless of the relevance markers. They express denylist
    /// entries like retired campaign prefixes or operator-handoff noise.
    pub fn with_exclusions(
        relevance_markers: impl IntoIterator<Item = String>,
        exclude_markers: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let mut filter = Self::new(relevance_markers);
        for pattern in exclude_markers {
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| Error::Pattern {
                    name: pattern.clone(),
                    source,
                })?;
            filter.exclusions.push(regex);
        }
        Ok(filter)
    }

    /// Structural relevance gate: coarse, name-only, pre-classification.
    ///
    /// Drops names without the canonical separator, names containing an
    /// unresolved placeholder, names matching an exclusion pattern, and names
    /// matching none of the configured campaign markers.
    pub fn is_relevant(&self, event_name: &str) -> bool {
        if !event_name.contains(NAME_SEPARATOR) {
            return false;
        }
        if event_name.contains(PLACEHOLDER_MARKER) {
            return false;
        }
        if self.exclusions.iter().any(|re| re.is_match(event_name)) {
            return false;
        }
        if self.markers.is_empty() {
            return true;
        }
        let lower = event_name.to_lowercase();
        self.markers.iter().any(|marker| lower.contains(marker))
    }

    /// Apply the range window and the structural gate to a raw stream.
    pub fn apply(&self, events: Vec<RawEvent>, range: &RangeQuery) -> Vec<RawEvent> {
        let total = events.len();
        let retained: Vec<RawEvent> = events
            .into_iter()
            .filter(|ev| range.contains(&ev.created_at) && self.is_relevant(&ev.event_name))
            .collect();
        tracing::debug!(
            total,
            retained = retained.len(),
            dropped = total - retained.len(),
            "Filtered raw events"
        );
        retained
    }
}

/// Caller-supplied template allow-list, applied post-classification.
///
/// The UI sends either an explicit set of display names or the "all"
/// sentinel; an empty selection also means everything.
#[derive(Debug, Clone, Default)]
pub enum TemplateSelection {
    /// Pass everything through unfiltered
    #[default]
    All,
    /// Keep only events whose display name is in the set
    Only(HashSet<String>),
}

impl TemplateSelection {
    /// Build a selection from the UI's multi-select widget values.
    ///
    /// The sentinels "Todos" and "all" (any case) and the empty selection all
    /// mean [`TemplateSelection::All`].
    pub fn from_selected<I, S>(selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HashSet::new();
        for value in selected {
            let value = value.as_ref().trim().to_lowercase();
            if value == "todos" || value == "all" {
                return TemplateSelection::All;
            }
            if !value.is_empty() {
                set.insert(value);
            }
        }
        if set.is_empty() {
            TemplateSelection::All
        } else {
            TemplateSelection::Only(set)
        }
    }

    /// Whether a display name (or template) passes the selection.
    pub fn allows(&self, name: &str) -> bool {
        match self {
            TemplateSelection::All => true,
            TemplateSelection::Only(set) => set.contains(&name.to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(name: &str, ts: &str) -> RawEvent {
        RawEvent::new(
            name,
            DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc),
        )
    }

    fn open_filter() -> EventFilter {
        EventFilter::new(vec![])
    }

    #[test]
    fn test_date_window_is_inclusive_on_both_bounds() {
        let range = RangeQuery {
            date_range: Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            )),
            time_range: None,
        };
        let events = vec![
            event("tpl_a_envio", "2024-01-01T00:00:00Z"),
            event("tpl_b_envio", "2024-01-07T23:59:59Z"),
            event("tpl_c_envio", "2024-01-08T00:00:00Z"),
        ];
        let kept = open_filter().apply(events, &range);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|e| e.event_name != "tpl_c_envio"));
    }

    #[test]
    fn test_time_window_compares_wall_clock_only() {
        let range = RangeQuery {
            date_range: None,
            time_range: Some((
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            )),
        };
        let events = vec![
            event("tpl_a_envio", "2024-01-01T09:00:00Z"),
            event("tpl_b_envio", "2024-06-15T18:00:00Z"),
            event("tpl_c_envio", "2024-01-01T08:59:59Z"),
        ];
        let kept = open_filter().apply(events, &range);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_inverted_time_window_selects_nothing() {
        let range = RangeQuery {
            date_range: None,
            time_range: Some((
                NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            )),
        };
        let events = vec![
            event("tpl_a_envio", "2024-01-01T23:00:00Z"),
            event("tpl_b_envio", "2024-01-01T05:00:00Z"),
        ];
        assert!(open_filter().apply(events, &range).is_empty());
    }

    #[test]
    fn test_structural_gate_drops_placeholders_and_separatorless_names() {
        let filter = open_filter();
        assert!(!filter.is_relevant("{unresolved_placeholder}_envio"));
        assert!(!filter.is_relevant("plainname"));
        assert!(filter.is_relevant("tpl_neg1_envio_v1"));
    }

    #[test]
    fn test_relevance_markers_gate_by_substring() {
        let filter = EventFilter::new(vec!["outbound".to_string(), "ativação".to_string()]);
        assert!(filter.is_relevant("[OUTBOUND] robo_neg1_envio"));
        assert!(filter.is_relevant("robo_ativação_neg1_envio"));
        assert!(!filter.is_relevant("robo_interno_neg1_envio"));
    }

    #[test]
    fn test_exclusion_patterns_drop_matching_names() {
        let filter = EventFilter::with_exclusions(
            vec!["outbound".to_string()],
            vec![
                r"\[OUTBOUND\] FLUXO LEAD".to_string(),
                r"excedeu tentativas.*?atendimento humano".to_string(),
            ],
        )
        .unwrap();
        // Exclusion wins even when a relevance marker matches.
        assert!(!filter.is_relevant("[OUTBOUND] FLUXO LEAD_robo_neg1_envio"));
        assert!(!filter.is_relevant("robo_outbound_excedeu tentativas, atendimento humano"));
        assert!(filter.is_relevant("[OUTBOUND] robo_neg1_envio"));
    }

    #[test]
    fn test_invalid_exclusion_pattern_is_reported() {
        let err = EventFilter::with_exclusions(vec![], vec!["[unclosed".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("[unclosed"));
    }

    #[test]
    fn test_selection_sentinels_mean_all() {
        assert!(matches!(
            TemplateSelection::from_selected(["Todos"]),
            TemplateSelection::All
        ));
        assert!(matches!(
            TemplateSelection::from_selected(["ALL"]),
            TemplateSelection::All
        ));
        assert!(matches!(
            TemplateSelection::from_selected(Vec::<String>::new()),
            TemplateSelection::All
        ));
        // A sentinel anywhere in the selection wins.
        assert!(matches!(
            TemplateSelection::from_selected(["FUP 1", "Todos"]),
            TemplateSelection::All
        ));
    }

    #[test]
    fn test_explicit_selection_is_case_insensitive() {
        let selection = TemplateSelection::from_selected(["FUP 1", "neg1"]);
        assert!(selection.allows("fup 1"));
        assert!(selection.allows("NEG1"));
        assert!(!selection.allows("fup 2"));
    }

    #[test]
    fn test_events_pass_when_no_window_is_set() {
        let range = RangeQuery::default();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert!(range.contains(&ts));
    }
}

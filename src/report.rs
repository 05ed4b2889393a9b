//! One-shot refresh pipeline
//!
//! Orchestrates one synchronous pass over the raw event stream:
//!
//! ```text
//! raw events
//!   └─► canonical alias pre-pass         (normalize)
//!        └─► range window + structural gate (filter)
//!             └─► classification         (classify, unknown templates dropped)
//!                  └─► display pass + template allow-list
//!                       └─► rate tables  (aggregate)
//! ```
//!
//! The alias pre-pass runs first so legacy labels ("FUP 2 resposta") are
//! judged by their canonical names; the structural gate would otherwise drop
//! them for lacking the canonical separator before they could be rewritten.
//!
//! Each refresh recomputes everything from the full raw stream and produces
//! an immutable [`Report`]; there is no shared mutable state between
//! invocations and no partial-result merging. An empty input stream is a
//! valid case producing empty tables, not a fault.

use crate::aggregate::{
    aggregate, type_breakdown, AggregateOptions, BreakdownRow, GroupBy, RateRow, TimeBucket,
};
use crate::classify::{Classifier, TemplatePattern, UNKNOWN_TEMPLATE};
use crate::config::Config;
use crate::error::Result;
use crate::filter::{EventFilter, RangeQuery, TemplateSelection};
use crate::normalize::AliasNormalizer;
use crate::types::{ClassifiedEvent, RawEvent};

/// Everything the UI widgets supply for one refresh.
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    /// Date and time-of-day windows
    pub range: RangeQuery,
    /// Template allow-list (display names or the "all" sentinel)
    pub selection: TemplateSelection,
}

/// The aggregated tables one refresh hands to the chart layer.
#[derive(Debug, Clone)]
pub struct Report {
    /// Whole-range send/reply rates per display name
    pub rates: Vec<RateRow>,
    /// Per-type counts per display name (stacked bar chart)
    pub breakdown: Vec<BreakdownRow>,
    /// Weekly send/reply rates per display name (time-series chart)
    pub weekly: Vec<RateRow>,
}

/// The classification-and-aggregation core, assembled once and read-only
/// thereafter.
pub struct Pipeline {
    filter: EventFilter,
    normalizer: AliasNormalizer,
    classifier: Classifier,
    options: AggregateOptions,
}

impl Pipeline {
    pub fn new(
        filter: EventFilter,
        normalizer: AliasNormalizer,
        classifier: Classifier,
        options: AggregateOptions,
    ) -> Self {
        Self {
            filter,
            normalizer,
            classifier,
            options,
        }
    }

    /// Assemble the pipeline from configuration: built-in patterns and alias
    /// tables plus the configured extensions.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut classifier = Classifier::new()?;
        for entry in &config.classifier.patterns {
            classifier.push_pattern(TemplatePattern::new(&entry.name, &entry.pattern)?);
        }

        let mut normalizer = AliasNormalizer::new();
        normalizer.extend_canonical(
            config
                .aliases
                .canonical
                .iter()
                .map(|e| (e.from.clone(), e.to.clone())),
        );
        normalizer.extend_display(
            config
                .aliases
                .display
                .iter()
                .map(|e| (e.from.clone(), e.to.clone())),
        );

        let filter = EventFilter::with_exclusions(
            config.filter.relevance_markers.iter().cloned(),
            config.filter.exclude_markers.iter().cloned(),
        )?;

        Ok(Self::new(
            filter,
            normalizer,
            classifier,
            AggregateOptions {
                clip_over_100: config.aggregate.clip_over_100,
            },
        ))
    }

    /// Run the normalize/filter/classify stages for one refresh.
    ///
    /// The canonical alias pre-pass rewrites every name before the structural
    /// gate so legacy labels survive the separator check. Unknown-template
    /// events are dropped here; they carry no reporting value. The selection
    /// is matched against display names because those are what the UI's
    /// multi-select shows.
    pub fn classify_events(
        &self,
        events: Vec<RawEvent>,
        query: &ReportQuery,
    ) -> Vec<ClassifiedEvent> {
        let total = events.len();
        let canonical: Vec<RawEvent> = events
            .into_iter()
            .map(|mut event| {
                event.event_name = self.normalizer.canonicalize(&event.event_name);
                event
            })
            .collect();
        let retained = self.filter.apply(canonical, &query.range);
        let filtered = retained.len();

        let mut unknown = 0usize;
        let mut deselected = 0usize;
        let mut classified = Vec::with_capacity(filtered);

        for event in retained {
            let result = self.classifier.classify(&event.event_name);
            if result.template == UNKNOWN_TEMPLATE {
                unknown += 1;
                continue;
            }
            let display_name = self.normalizer.display_name(&event.event_name, &result.template);
            if !query.selection.allows(&display_name) {
                deselected += 1;
                continue;
            }
            classified.push(ClassifiedEvent {
                event_name: event.event_name,
                created_at: event.created_at,
                template: result.template,
                event_type: result.event_type,
                category: result.category,
                display_name,
            });
        }

        tracing::debug!(
            total,
            filtered,
            unknown,
            deselected,
            classified = classified.len(),
            "Classified event stream"
        );

        classified
    }

    /// One full refresh: classify the stream and build the report tables.
    pub fn refresh(&self, events: Vec<RawEvent>, query: &ReportQuery) -> Report {
        let classified = self.classify_events(events, query);

        let report = Report {
            rates: aggregate(&classified, GroupBy::DisplayName, None, &self.options),
            breakdown: type_breakdown(&classified, GroupBy::DisplayName),
            weekly: aggregate(
                &classified,
                GroupBy::DisplayName,
                Some(TimeBucket::Week),
                &self.options,
            ),
        };

        tracing::info!(
            events = classified.len(),
            rate_rows = report.rates.len(),
            weekly_rows = report.weekly.len(),
            "Refresh complete"
        );

        report
    }
}

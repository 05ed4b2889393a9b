//! Event-name classifier
//!
//! Maps a raw event-name string to a `(template, type, category)` triple.
//! Classification is pure and case-insensitive; it has two independent halves:
//!
//! - **Template extraction** walks an ordered list of named regex patterns and
//!   takes the first match. The matched substring, lower-cased, becomes the
//!   template; when nothing matches the sentinel [`UNKNOWN_TEMPLATE`] is used.
//!   The list is explicitly ordered rather than a single alternation so that
//!   precedence between overlapping families is visible and testable, and so
//!   new campaign templates can be appended without touching existing entries.
//!
//! - **Type inference** scans the lower-cased name for keyword groups in a
//!   fixed priority order; the first group with a hit wins. Keywords are plain
//!   substrings, not tokens, so overlapping groups (a name containing both
//!   "saber mais" and "resposta") are resolved purely by the priority table.
//!
//! The built-in pattern list and keyword table follow the naming convention of
//! the campaign robot (`robo_..._neg1_envio_v1` and friends). New templates
//! appear as campaigns launch, so both halves accept extension at
//! construction time.

use crate::error::{Error, Result};
use crate::types::{EventCategory, EventType};
use regex::{Regex, RegexBuilder};

/// Sentinel template for event names that match no pattern.
///
/// Events carrying this template are dropped before aggregation; they have no
/// reporting value.
pub const UNKNOWN_TEMPLATE: &str = "unknown";

/// Keyword groups for type inference, highest priority first.
///
/// First group with a substring hit wins. Keywords are matched literally
/// against the lower-cased event name (the dots in `tel.invalido` and
/// `fora.contexto` are literal characters from the robot's naming scheme).
const KEYWORD_GROUPS: &[(&[&str], EventType)] = &[
    (&["envio"], EventType::Send),
    (&["bloquear", "bloqueio"], EventType::Block),
    (&["tel.invalido", "tel_invalido"], EventType::InvalidPhone),
    (&["pessoa errada"], EventType::WrongPerson),
    (&["fora.contexto", "out.contexto", "texto"], EventType::OffTopic),
    (&["saber.mais", "saber mais"], EventType::AskMoreInfo),
    (&["perda", "sem interação"], EventType::NoInteraction),
    (&["resposta"], EventType::Reply),
];

/// One named template family: an identifier plus the regex that recognizes it.
#[derive(Debug, Clone)]
pub struct TemplatePattern {
    name: String,
    regex: Regex,
}

impl TemplatePattern {
    /// Compile a pattern. The regex is built case-insensitively.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| Error::Pattern {
                name: name.clone(),
                source,
            })?;
        Ok(Self { name, regex })
    }

    /// Identifier of this template family.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Output of one classification: the derived triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Matched template substring, lower-cased, or [`UNKNOWN_TEMPLATE`]
    pub template: String,
    /// Fine-grained type from the keyword table
    pub event_type: EventType,
    /// Coarse category derived from the type
    pub category: EventCategory,
}

/// Classifies event names into `(template, type, category)`.
///
/// Holds the ordered pattern list; construction is the only fallible step,
/// classification itself never fails.
pub struct Classifier {
    patterns: Vec<TemplatePattern>,
}

impl Classifier {
    /// Classifier with the built-in template families.
    pub fn new() -> Result<Self> {
        Ok(Self::with_patterns(Self::default_patterns()?))
    }

    /// Classifier with an explicit ordered pattern list.
    pub fn with_patterns(patterns: Vec<TemplatePattern>) -> Self {
        Self { patterns }
    }

    /// The built-in template families, in priority order.
    pub fn default_patterns() -> Result<Vec<TemplatePattern>> {
        [
            ("opt_in_ativo", r"opt_in_ativo(?:_30min_v\d+)?"),
            ("fup_15_min", r"fup_15_min_v\d+"),
            ("fup_ativo", r"fup[123]_ativo"),
            ("fup2h", r"fup2h"),
            ("fup30min", r"fup30min"),
            ("optinnegv01", r"optinnegv01"),
            ("neg", r"neg[123]"),
            ("despedida_ativo", r"despedida_ativo"),
            ("perda_sem_interacao", r"perda_sem interação"),
            ("disparo_novo", r"disparo_novo_\d+"),
            ("proposta", r"proposta"),
        ]
        .into_iter()
        .map(|(name, pattern)| TemplatePattern::new(name, pattern))
        .collect()
    }

    /// Append a template family at the lowest priority.
    ///
    /// New campaigns extend the taxonomy here; existing entries and their
    /// precedence are untouched.
    pub fn push_pattern(&mut self, pattern: TemplatePattern) {
        tracing::debug!(pattern = pattern.name(), "Registered template pattern");
        self.patterns.push(pattern);
    }

    /// Identifiers of the registered template families, in priority order.
    pub fn pattern_names(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.name()).collect()
    }

    /// Classify one event name. Pure; the input is not mutated.
    pub fn classify(&self, event_name: &str) -> Classification {
        let template = self.extract_template(event_name);
        let event_type = infer_type(event_name);
        Classification {
            template,
            event_type,
            category: event_type.category(),
        }
    }

    /// First matching pattern wins; the matched substring is lower-cased.
    fn extract_template(&self, event_name: &str) -> String {
        for pattern in &self.patterns {
            if let Some(found) = pattern.regex.find(event_name) {
                return found.as_str().to_lowercase();
            }
        }
        UNKNOWN_TEMPLATE.to_string()
    }
}

/// Keyword-table type inference; first priority group with a hit wins.
fn infer_type(event_name: &str) -> EventType {
    let lower = event_name.to_lowercase();
    for (keywords, event_type) in KEYWORD_GROUPS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return *event_type;
        }
    }
    EventType::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new().expect("built-in patterns compile")
    }

    #[test]
    fn test_send_event_full_triple() {
        let c = classifier().classify("robo_outbound_0fup1_ativo_Envio");
        assert_eq!(c.template, "fup1_ativo");
        assert_eq!(c.event_type, EventType::Send);
        assert_eq!(c.category, EventCategory::Send);
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        let c = classifier();
        let lower = c.classify("robo_outbound_0fup1_ativo_envio");
        let shouty = c.classify("ROBO_OUTBOUND_0FUP1_ATIVO_ENVIO");
        assert_eq!(lower, shouty);
        assert_eq!(shouty.template, "fup1_ativo");
    }

    #[test]
    fn test_matched_substring_is_stored_lowercased() {
        let c = classifier().classify("robo_DESPEDIDA_ATIVO_Resposta");
        assert_eq!(c.template, "despedida_ativo");
    }

    #[test]
    fn test_unmatched_name_yields_unknown_template() {
        let c = classifier().classify("completely_unrelated_event");
        assert_eq!(c.template, UNKNOWN_TEMPLATE);
        assert_eq!(c.event_type, EventType::Unknown);
        assert_eq!(c.category, EventCategory::Unknown);
    }

    #[test]
    fn test_timed_followup_variant_extends_base_template() {
        let c = classifier();
        assert_eq!(
            c.classify("robo_0opt_in_ativo_30min_v0_Envio").template,
            "opt_in_ativo_30min_v0"
        );
        assert_eq!(c.classify("robo_0_opt_in_ativo_Envio").template, "opt_in_ativo");
        assert_eq!(c.classify("robo_fup_15_min_v2_Envio").template, "fup_15_min_v2");
        assert_eq!(c.classify("robo_disparo_novo_3_Envio").template, "disparo_novo_3");
    }

    // Priority tests: keyword overlap is resolved only by table order.

    #[test]
    fn test_envio_outranks_every_reply_keyword() {
        let c = classifier().classify("neg1_envio_resposta_saber mais");
        assert_eq!(c.event_type, EventType::Send);
    }

    #[test]
    fn test_saber_mais_outranks_resposta() {
        let c = classifier().classify("neg1_Resposta_Saber mais");
        assert_eq!(c.event_type, EventType::AskMoreInfo);
        assert_eq!(c.category, EventCategory::Reply);
    }

    #[test]
    fn test_bloqueio_outranks_resposta() {
        let c = classifier().classify("neg2_Resposta_Bloqueio");
        assert_eq!(c.event_type, EventType::Block);
        assert_eq!(c.category, EventCategory::Reply);
    }

    #[test]
    fn test_texto_counts_as_off_topic() {
        let c = classifier().classify("opt_in_ativo_Resposta_Texto");
        assert_eq!(c.event_type, EventType::OffTopic);
    }

    #[test]
    fn test_invalid_phone_and_wrong_person_are_distinct_types() {
        let c = classifier();
        assert_eq!(
            c.classify("neg1_Resposta_Tel.Invalido").event_type,
            EventType::InvalidPhone
        );
        assert_eq!(
            c.classify("neg1_Resposta_Pessoa Errada").event_type,
            EventType::WrongPerson
        );
    }

    #[test]
    fn test_no_interaction_keywords() {
        let c = classifier();
        assert_eq!(
            c.classify("neg3_perda_sem interação").event_type,
            EventType::NoInteraction
        );
        assert_eq!(
            c.classify("neg3_perda_sem interação").category,
            EventCategory::NoInteraction
        );
    }

    #[test]
    fn test_pattern_priority_order_not_match_position() {
        // "neg1" appears earlier in the string than "proposta", but an
        // earlier-listed family still wins over a later one; within the
        // default list "neg" is listed before "proposta".
        let c = classifier().classify("proposta_para_neg1_envio");
        assert_eq!(c.template, "neg1");
    }

    #[test]
    fn test_appended_pattern_is_lowest_priority() {
        let mut c = classifier();
        c.push_pattern(TemplatePattern::new("neg_v2", r"neg4").unwrap());
        assert_eq!(c.classify("robo_neg4_envio").template, "neg4");
        // Existing precedence is untouched.
        assert_eq!(c.classify("robo_neg1_envio").template, "neg1");
        assert_eq!(c.pattern_names().last(), Some(&"neg_v2"));
    }

    #[test]
    fn test_invalid_pattern_is_a_config_error() {
        let err = TemplatePattern::new("broken", r"neg[").unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_classify_is_idempotent() {
        let c = classifier();
        let name = "robo_outbound_neg2_Resposta_Saber mais";
        let first = c.classify(name);
        let second = c.classify(name);
        assert_eq!(first, second);
    }
}

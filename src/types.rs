//! Core domain types for fupboard
//!
//! These types model one pass over the campaign event stream: raw documents
//! come in from the document store, classification derives a template, a
//! fine-grained type, and a coarse category, and the aggregator reduces the
//! classified stream to rate tables.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Template** | Canonical identifier of a campaign message step, extracted from an event name |
//! | **Send** | An outbound dispatch of a campaign message |
//! | **Reply** | Any inbound response, regardless of its fine-grained type |
//! | **Display name** | Human-friendly label substituted for a template in reporting |
//!
//! Event names are Portuguese-keyed (`envio`, `resposta`, ...) because that is
//! what the campaign robot emits; the derived types use English identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Raw events
// ============================================

/// A raw event document from the `events` collection.
///
/// The core only reads `event_name` and `created_at`; every other field of
/// the source document is preserved untouched in `extra` so nothing is lost
/// between fetch and reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event name as emitted by the campaign robot
    pub event_name: String,
    /// When the event was recorded
    pub created_at: DateTime<Utc>,
    /// Opaque source fields, carried along verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawEvent {
    /// Build an event carrying only the fields the core reads.
    pub fn new(event_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            event_name: event_name.into(),
            created_at,
            extra: serde_json::Map::new(),
        }
    }

    /// Deserialize an event from a document-store JSON value.
    pub fn from_document(doc: serde_json::Value) -> crate::error::Result<Self> {
        Ok(serde_json::from_value(doc)?)
    }
}

// ============================================
// Event types
// ============================================

/// Fine-grained type of a campaign event, inferred from keywords in the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Outbound dispatch ("envio")
    Send,
    /// Lead asked to stop receiving messages ("bloquear"/"bloqueio")
    Block,
    /// Phone number is invalid ("tel.invalido")
    InvalidPhone,
    /// Reached the wrong person ("pessoa errada")
    WrongPerson,
    /// Reply outside the campaign context ("fora.contexto"/"texto")
    OffTopic,
    /// Lead wants more information ("saber mais")
    AskMoreInfo,
    /// Lead went silent ("perda"/"sem interação")
    NoInteraction,
    /// Generic inbound reply ("resposta")
    Reply,
    /// No keyword matched
    Unknown,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Send => "send",
            EventType::Block => "block",
            EventType::InvalidPhone => "invalid_phone",
            EventType::WrongPerson => "wrong_person",
            EventType::OffTopic => "off_topic",
            EventType::AskMoreInfo => "ask_more_info",
            EventType::NoInteraction => "no_interaction",
            EventType::Reply => "reply",
            EventType::Unknown => "unknown",
        }
    }

    /// Coarsen this type into its reporting category.
    ///
    /// Every response-like type collapses into [`EventCategory::Reply`]; the
    /// response rate is computed from the category, so a block or an off-topic
    /// text counts as a response just like a plain reply.
    pub fn category(&self) -> EventCategory {
        match self {
            EventType::Send => EventCategory::Send,
            EventType::Block
            | EventType::InvalidPhone
            | EventType::WrongPerson
            | EventType::OffTopic
            | EventType::AskMoreInfo
            | EventType::Reply => EventCategory::Reply,
            EventType::NoInteraction => EventCategory::NoInteraction,
            EventType::Unknown => EventCategory::Unknown,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "send" => Ok(EventType::Send),
            "block" => Ok(EventType::Block),
            "invalid_phone" => Ok(EventType::InvalidPhone),
            "wrong_person" => Ok(EventType::WrongPerson),
            "off_topic" => Ok(EventType::OffTopic),
            "ask_more_info" => Ok(EventType::AskMoreInfo),
            "no_interaction" => Ok(EventType::NoInteraction),
            "reply" => Ok(EventType::Reply),
            "unknown" => Ok(EventType::Unknown),
            _ => Err(format!("unknown event type: {}", s)),
        }
    }
}

/// Coarse reporting bucket derived from [`EventType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Send,
    Reply,
    NoInteraction,
    Unknown,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Send => "send",
            EventCategory::Reply => "reply",
            EventCategory::NoInteraction => "no_interaction",
            EventCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// Classified events
// ============================================

/// A raw event plus the fields derived by one classification pass.
///
/// Transient: recomputed from the raw stream on every refresh, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedEvent {
    /// Event name after the canonical alias pre-pass
    pub event_name: String,
    /// When the event was recorded
    pub created_at: DateTime<Utc>,
    /// Extracted campaign template, lower-cased; `"unknown"` when no pattern matched
    pub template: String,
    /// Fine-grained event type
    pub event_type: EventType,
    /// Coarse reporting category (pure function of `event_type`)
    pub category: EventCategory,
    /// Friendly label for reporting; falls back to `template`
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_is_pure_function_of_type() {
        assert_eq!(EventType::Send.category(), EventCategory::Send);
        assert_eq!(EventType::Block.category(), EventCategory::Reply);
        assert_eq!(EventType::InvalidPhone.category(), EventCategory::Reply);
        assert_eq!(EventType::WrongPerson.category(), EventCategory::Reply);
        assert_eq!(EventType::OffTopic.category(), EventCategory::Reply);
        assert_eq!(EventType::AskMoreInfo.category(), EventCategory::Reply);
        assert_eq!(EventType::Reply.category(), EventCategory::Reply);
        assert_eq!(
            EventType::NoInteraction.category(),
            EventCategory::NoInteraction
        );
        assert_eq!(EventType::Unknown.category(), EventCategory::Unknown);
    }

    #[test]
    fn test_event_type_round_trip() {
        for event_type in [
            EventType::Send,
            EventType::Block,
            EventType::InvalidPhone,
            EventType::WrongPerson,
            EventType::OffTopic,
            EventType::AskMoreInfo,
            EventType::NoInteraction,
            EventType::Reply,
            EventType::Unknown,
        ] {
            let parsed: EventType = event_type.as_str().parse().unwrap();
            assert_eq!(parsed, event_type);
        }
        assert!("nonsense".parse::<EventType>().is_err());
    }

    #[test]
    fn test_raw_event_from_document_preserves_extra_fields() {
        let event = RawEvent::from_document(json!({
            "event_name": "robo_outbound_neg1_envio",
            "created_at": "2024-03-05T14:30:00Z",
            "lead_id": "abc-123",
            "channel": "whatsapp"
        }))
        .unwrap();

        assert_eq!(event.event_name, "robo_outbound_neg1_envio");
        assert_eq!(event.extra.get("lead_id"), Some(&json!("abc-123")));
        assert_eq!(event.extra.get("channel"), Some(&json!("whatsapp")));
    }

    #[test]
    fn test_raw_event_from_document_missing_name_is_an_error() {
        let result = RawEvent::from_document(json!({
            "created_at": "2024-03-05T14:30:00Z"
        }));
        assert!(result.is_err());
    }
}

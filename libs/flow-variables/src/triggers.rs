//! Trigger cards
//!
//! Every result-producing action fires one trigger card so other flows can
//! react to the new value. Card selection goes through the [`TriggerKind`]
//! table instead of building method names at runtime.

use flow_calc::{format_token, TokenValue};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Mutex;

use crate::error::{FlowError, Result};

/// Trigger cards fired by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Duration,
    Comparison,
    Calculation,
    Number,
    Text,
    Currency,
}

/// Trigger kind to host card id
const TRIGGER_CARDS: &[(TriggerKind, &str)] = &[
    (TriggerKind::Duration, "trigger_DURATION"),
    (TriggerKind::Comparison, "trigger_COMPARISON"),
    (TriggerKind::Calculation, "trigger_CALCULATION"),
    (TriggerKind::Number, "trigger_NUMBER"),
    (TriggerKind::Text, "trigger_TEXT"),
    (TriggerKind::Currency, "trigger_CURRENCY"),
];

impl TriggerKind {
    pub fn all() -> impl Iterator<Item = TriggerKind> {
        TRIGGER_CARDS.iter().map(|(kind, _)| *kind)
    }

    pub fn card_id(&self) -> &'static str {
        TRIGGER_CARDS
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, id)| *id)
            .unwrap_or_default()
    }

    pub fn from_card_id(card_id: &str) -> Option<Self> {
        TRIGGER_CARDS
            .iter()
            .find(|(_, id)| *id == card_id)
            .map(|(kind, _)| *kind)
    }
}

/// State passed to a fired trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub variable: String,
    pub token: String,
    pub value: TokenValue,
}

/// Whether a trigger configured for `arg_variable` should run for `event`
///
/// The card argument matches the event's variable (by name or token id) or
/// the localized "all" entry.
pub fn trigger_matches(arg_variable: &str, event: &TriggerEvent, all_label: &str) -> bool {
    arg_variable == all_label
        || arg_variable == event.variable
        || format_token(arg_variable) == format_token(&event.variable)
        || arg_variable == event.token
}

/// Host side of trigger firing
pub trait TriggerSink: Send + Sync {
    fn fire(&self, kind: TriggerKind, event: &TriggerEvent)
        -> impl Future<Output = Result<()>> + Send;
}

/// Trigger sink that drops every event
pub struct NullTriggerSink;

impl TriggerSink for NullTriggerSink {
    async fn fire(&self, _kind: TriggerKind, _event: &TriggerEvent) -> Result<()> {
        Ok(())
    }
}

/// Trigger sink that records fired events
#[derive(Default)]
pub struct RecordingTriggerSink {
    fired: Mutex<Vec<(TriggerKind, TriggerEvent)>>,
}

impl RecordingTriggerSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fired(&self) -> Vec<(TriggerKind, TriggerEvent)> {
        self.fired
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl TriggerSink for RecordingTriggerSink {
    fn fire(
        &self,
        kind: TriggerKind,
        event: &TriggerEvent,
    ) -> impl Future<Output = Result<()>> + Send {
        let result = self
            .fired
            .lock()
            .map(|mut events| events.push((kind, event.clone())))
            .map_err(|e| FlowError::Trigger(format!("Mutex poisoned: {}", e)));
        async move { result }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    fn event() -> TriggerEvent {
        TriggerEvent {
            variable: "Washer".to_string(),
            token: "washer-duration".to_string(),
            value: TokenValue::from("1 hour"),
        }
    }

    #[test]
    fn test_card_lookup_roundtrip() {
        for kind in TriggerKind::all() {
            assert_eq!(TriggerKind::from_card_id(kind.card_id()), Some(kind));
        }
        assert_eq!(TriggerKind::Comparison.card_id(), "trigger_COMPARISON");
        assert_eq!(TriggerKind::from_card_id("trigger_UNKNOWN"), None);
    }

    #[test]
    fn test_trigger_matches() {
        assert!(trigger_matches("All", &event(), "All"));
        assert!(trigger_matches("Washer", &event(), "All"));
        assert!(trigger_matches("washer", &event(), "All"));
        assert!(trigger_matches("washer-duration", &event(), "All"));
        assert!(!trigger_matches("Dryer", &event(), "All"));
    }

    #[tokio::test]
    async fn test_recording_sink() {
        let sink = RecordingTriggerSink::new();
        sink.fire(TriggerKind::Duration, &event()).await.unwrap();
        let fired = sink.fired();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].0, TriggerKind::Duration);
    }
}

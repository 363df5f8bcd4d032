//! Persisted app settings
//!
//! The settings blob changed shape across releases:
//!
//! | Shape | Fields |
//! |-------|--------|
//! | v1 | `CONVERSIONS: [{name, date}]`, `TOTALS: [{name, duration}]` |
//! | v2 | `COMPARISONS: [{name, date?, comparison?}]`, `TOTALS`, `VARIABLES` |
//! | v3 | `DURATIONS`, `COMPARISONS`, `TOTALS`, `VARIABLES`, `ZONES` |
//! | current | `version`, `variables`, `states`, `totals` |
//!
//! [`migrate`] turns any of them into [`AppSettings`] once at load time; the
//! rest of the crate only ever sees the current shape.

use crate::error::{FlowError, Result};
use chrono::{DateTime, TimeZone, Utc};
use flow_calc::{format_token, parse_instant, FlowValue, TokenKind, TokenSpec, TokenValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Key of the settings blob in the host store
pub const SETTINGS_KEY: &str = "com.flow.utilities.settings";

/// Current settings version
pub const SETTINGS_VERSION: u32 = 4;

/// Canonical settings record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub version: u32,

    /// User-defined variable names
    #[serde(default)]
    pub variables: Vec<String>,

    /// Running timers and recorded baselines
    #[serde(default)]
    pub states: Vec<VariableState>,

    /// Last published token value per token
    #[serde(default)]
    pub totals: Vec<TotalRecord>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            variables: Vec::new(),
            states: Vec::new(),
            totals: Vec::new(),
        }
    }
}

/// Per-variable pending state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableState {
    pub name: String,

    /// Start instant of a running duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// Recorded comparison baseline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
}

impl VariableState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: None,
            baseline: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.started_at.is_none() && self.baseline.is_none()
    }
}

/// A published token and the variable it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalRecord {
    pub variable: String,
    pub token: String,
    pub title: String,
    pub kind: TokenKind,
    pub value: TokenValue,
}

impl TotalRecord {
    pub fn from_spec(variable: impl Into<String>, spec: &TokenSpec) -> Self {
        Self {
            variable: variable.into(),
            token: spec.id.clone(),
            title: spec.title.clone(),
            kind: spec.kind,
            value: spec.value.clone(),
        }
    }

    pub fn to_spec(&self) -> TokenSpec {
        TokenSpec {
            id: self.token.clone(),
            title: self.title.clone(),
            kind: self.kind,
            value: self.value.clone(),
        }
    }
}

impl AppSettings {
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    pub fn state(&self, name: &str) -> Option<&VariableState> {
        self.states.iter().find(|s| s.name == name)
    }

    /// State for `name`, created when missing
    pub fn state_mut(&mut self, name: &str) -> &mut VariableState {
        let index = match self.states.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.states.push(VariableState::new(name));
                self.states.len() - 1
            },
        };
        &mut self.states[index]
    }

    /// Drop states that no longer hold anything
    pub fn prune_states(&mut self) {
        self.states.retain(|s| !s.is_empty());
    }

    pub fn total(&self, token: &str) -> Option<&TotalRecord> {
        self.totals.iter().find(|t| t.token == token)
    }

    pub fn totals_for<'a>(&'a self, variable: &'a str) -> impl Iterator<Item = &'a TotalRecord> {
        self.totals.iter().filter(move |t| t.variable == variable)
    }

    /// Insert or replace the record for the same token
    pub fn upsert_total(&mut self, record: TotalRecord) {
        match self.totals.iter_mut().find(|t| t.token == record.token) {
            Some(existing) => *existing = record,
            None => self.totals.push(record),
        }
    }

    /// Remove a variable with its state and totals
    pub fn remove_variable(&mut self, name: &str) -> bool {
        let before = self.variables.len() + self.states.len() + self.totals.len();
        self.variables.retain(|v| v != name);
        self.states.retain(|s| s.name != name);
        self.totals.retain(|t| t.variable != name);
        before != self.variables.len() + self.states.len() + self.totals.len()
    }

    fn add_variable_name(&mut self, name: &str) {
        if !name.is_empty() && !self.has_variable(name) {
            self.variables.push(name.to_string());
        }
    }
}

// ============================================================================
// Legacy shapes
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct LegacySettings {
    #[serde(rename = "CONVERSIONS", default)]
    conversions: Vec<LegacyEntry>,

    #[serde(rename = "DURATIONS", default)]
    durations: Vec<LegacyEntry>,

    #[serde(rename = "COMPARISONS", default)]
    comparisons: Vec<LegacyEntry>,

    #[serde(rename = "TOTALS", default)]
    totals: Vec<LegacyTotal>,

    #[serde(rename = "VARIABLES", default)]
    variables: Vec<LegacyVariable>,
}

#[derive(Debug, Deserialize)]
struct LegacyEntry {
    name: String,
    #[serde(default, alias = "dateStart")]
    date: Option<Value>,
    #[serde(default)]
    comparison: Option<FlowValue>,
}

#[derive(Debug, Deserialize)]
struct LegacyTotal {
    name: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    duration: Option<Value>,
    #[serde(default)]
    comparison: Option<Value>,
    #[serde(default)]
    value: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyVariable {
    Name(String),
    Object { name: String },
}

impl LegacyVariable {
    fn into_name(self) -> String {
        match self {
            LegacyVariable::Name(name) | LegacyVariable::Object { name } => name,
        }
    }
}

/// Convert a stored settings blob of any known shape into [`AppSettings`]
///
/// `null` (no settings stored yet) yields the default record.
pub fn migrate(raw: Value) -> Result<AppSettings> {
    if raw.is_null() {
        return Ok(AppSettings::default());
    }
    if !raw.is_object() {
        return Err(FlowError::migration(format!(
            "Settings must be an object, got {}",
            raw
        )));
    }

    if raw.get("version").is_some() {
        let mut settings: AppSettings = serde_json::from_value(raw)
            .map_err(|e| FlowError::migration(format!("Invalid settings: {}", e)))?;
        settings.version = SETTINGS_VERSION;
        return Ok(settings);
    }

    let legacy: LegacySettings = serde_json::from_value(raw)
        .map_err(|e| FlowError::migration(format!("Invalid legacy settings: {}", e)))?;
    Ok(migrate_legacy(legacy))
}

/// Whether `raw` is in a shape other than the current one
pub fn needs_migration(raw: &Value) -> bool {
    !matches!(raw.get("version").and_then(Value::as_u64), Some(v) if v == SETTINGS_VERSION as u64)
}

fn migrate_legacy(legacy: LegacySettings) -> AppSettings {
    let mut settings = AppSettings::default();

    for name in legacy.variables.into_iter().map(LegacyVariable::into_name) {
        settings.add_variable_name(&name);
    }

    let entries = legacy
        .conversions
        .into_iter()
        .chain(legacy.durations)
        .chain(legacy.comparisons);

    for entry in entries {
        settings.add_variable_name(&entry.name);

        let started_at = entry.date.as_ref().and_then(|d| legacy_instant(&entry.name, d));
        let baseline = entry
            .comparison
            .as_ref()
            .map(FlowValue::parse_float)
            .filter(|v| v.is_finite());

        let state = settings.state_mut(&entry.name);
        if started_at.is_some() {
            state.started_at = started_at;
        }
        if baseline.is_some() {
            state.baseline = baseline;
        }
    }

    for total in legacy.totals {
        settings.add_variable_name(&total.name);

        let value = total
            .value
            .or(total.duration)
            .or(total.comparison)
            .and_then(legacy_token_value)
            .unwrap_or_else(|| TokenValue::empty(TokenKind::String));
        let token = total.token.unwrap_or_else(|| format_token(&total.name));

        settings.upsert_total(TotalRecord {
            variable: total.name.clone(),
            token,
            title: total.name,
            kind: value.kind(),
            value,
        });
    }

    settings.prune_states();

    debug!(
        variables = settings.variables.len(),
        states = settings.states.len(),
        totals = settings.totals.len(),
        "Migrated legacy settings"
    );

    settings
}

fn legacy_instant(name: &str, raw: &Value) -> Option<DateTime<Utc>> {
    let parsed = match raw {
        Value::String(s) => parse_instant(s).ok(),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    };
    if parsed.is_none() {
        warn!(variable = name, raw = %raw, "Dropping unreadable start instant");
    }
    parsed
}

fn legacy_token_value(raw: Value) -> Option<TokenValue> {
    match raw {
        Value::Bool(b) => Some(TokenValue::Boolean(b)),
        Value::Number(n) => n.as_f64().map(TokenValue::Number),
        Value::String(s) => Some(TokenValue::String(s)),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_gives_default() {
        let settings = migrate(Value::Null).unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_migrate_v1_conversions() {
        let raw = json!({
            "CONVERSIONS": [{"name": "Washer", "date": "2021-10-05T00:00:00.000Z"}],
            "TOTALS": [{"name": "Dryer", "duration": "1 hour 2 minutes"}]
        });

        let settings = migrate(raw).unwrap();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.variables, vec!["Washer", "Dryer"]);

        let washer = settings.state("Washer").unwrap();
        assert_eq!(washer.started_at.unwrap().timestamp(), 1_633_392_000);

        let dryer = settings.total("dryer").unwrap();
        assert_eq!(dryer.value, TokenValue::from("1 hour 2 minutes"));
        assert_eq!(dryer.kind, TokenKind::String);
    }

    #[test]
    fn test_migrate_v2_comparisons() {
        let raw = json!({
            "COMPARISONS": [
                {"name": "Meter", "comparison": "1523.7"},
                {"name": "Oven", "dateStart": 1633392000000i64}
            ],
            "TOTALS": [{"name": "Meter", "token": "meter-comparison", "comparison": 12.5}],
            "VARIABLES": ["Meter", "Oven"]
        });

        let settings = migrate(raw).unwrap();
        assert_eq!(settings.variables, vec!["Meter", "Oven"]);
        assert_eq!(settings.state("Meter").unwrap().baseline, Some(1523.7));
        assert!(settings.state("Oven").unwrap().started_at.is_some());

        let total = settings.total("meter-comparison").unwrap();
        assert_eq!(total.value, TokenValue::Number(12.5));
        assert_eq!(total.kind, TokenKind::Number);
    }

    #[test]
    fn test_migrate_v3_drops_zones() {
        let raw = json!({
            "DURATIONS": [{"name": "Heater", "date": "garbage"}],
            "COMPARISONS": [],
            "TOTALS": [],
            "VARIABLES": [{"name": "Heater"}],
            "ZONES": [{"id": "z1", "name": "Kitchen"}]
        });

        let settings = migrate(raw).unwrap();
        assert_eq!(settings.variables, vec!["Heater"]);
        // Unreadable start dropped, empty state pruned
        assert!(settings.state("Heater").is_none());
    }

    #[test]
    fn test_current_shape_roundtrip() {
        let mut settings = AppSettings::default();
        settings.variables.push("Washer".to_string());
        settings.state_mut("Washer").baseline = Some(3.0);

        let raw = serde_json::to_value(&settings).unwrap();
        assert!(!needs_migration(&raw));
        assert_eq!(migrate(raw).unwrap(), settings);
    }

    #[test]
    fn test_needs_migration() {
        assert!(needs_migration(&json!({"TOTALS": []})));
        assert!(needs_migration(&Value::Null));
        assert!(needs_migration(&json!({"version": 1})));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(migrate(json!([1, 2])), Err(FlowError::Migration(_))));
    }

    #[test]
    fn test_remove_variable() {
        let mut settings = AppSettings::default();
        settings.variables.push("Washer".to_string());
        settings.state_mut("Washer").baseline = Some(1.0);
        settings.upsert_total(TotalRecord::from_spec(
            "Washer",
            &TokenSpec::new("Washer comparison", 2.0),
        ));

        assert!(settings.remove_variable("Washer"));
        assert!(settings.variables.is_empty());
        assert!(settings.states.is_empty());
        assert!(settings.totals.is_empty());
        assert!(!settings.remove_variable("Washer"));
    }
}

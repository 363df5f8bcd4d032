//! Flow Dispatcher - run flow card actions against variable state
//!
//! Each action:
//! 1. Reads the variable's pending state from the loaded settings
//! 2. Runs the matching `flow_calc` helper
//! 3. Persists the updated settings
//! 4. Publishes the result token and fires the matching trigger card

use chrono::{DateTime, Utc};
use flow_calc::{
    calculate_duration, checked_evaluate, compare, elapsed_seconds, evaluate, format_currency,
    format_token, replace_all, round_number, transform, Catalog, DurationFormat, DurationOutput, FlowValue,
    Localizer, TokenSpec, TokenValue,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{FlowError, Result};
use crate::settings::{self, AppSettings, TotalRecord, SETTINGS_KEY};
use crate::store::SettingsStore;
use crate::tokens::{TokenRegistry, TokenSink};
use crate::triggers::{TriggerEvent, TriggerKind, TriggerSink};

/// Dispatcher options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherOptions {
    /// Language for unit words, token titles and currency layout
    pub language: String,

    /// Reject unknown operators and division by zero
    pub strict_arithmetic: bool,

    /// Key of the settings blob in the store
    pub settings_key: String,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            strict_arithmetic: false,
            settings_key: SETTINGS_KEY.to_string(),
        }
    }
}

/// Token slots a variable can publish into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSlot {
    Duration,
    DurationSeconds,
    Comparison,
    Calculation,
    Number,
    Text,
    Currency,
}

impl TokenSlot {
    /// Language-independent identifier suffix
    pub fn suffix(&self) -> &'static str {
        match self {
            TokenSlot::Duration => "duration",
            TokenSlot::DurationSeconds => "duration_seconds",
            TokenSlot::Comparison => "comparison",
            TokenSlot::Calculation => "calculation",
            TokenSlot::Number => "number",
            TokenSlot::Text => "text",
            TokenSlot::Currency => "currency",
        }
    }

    /// Trigger card fired when the slot changes
    ///
    /// The seconds token is published alongside the duration text, only the
    /// text fires the duration card.
    pub fn trigger(&self) -> Option<TriggerKind> {
        match self {
            TokenSlot::Duration => Some(TriggerKind::Duration),
            TokenSlot::DurationSeconds => None,
            TokenSlot::Comparison => Some(TriggerKind::Comparison),
            TokenSlot::Calculation => Some(TriggerKind::Calculation),
            TokenSlot::Number => Some(TriggerKind::Number),
            TokenSlot::Text => Some(TriggerKind::Text),
            TokenSlot::Currency => Some(TriggerKind::Currency),
        }
    }
}

/// Flow card actions, tagged by `action`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FlowAction {
    StartDuration {
        variable: String,
    },
    EndDuration {
        variable: String,
    },
    StartComparison {
        variable: String,
        value: FlowValue,
    },
    EndComparison {
        variable: String,
        value: FlowValue,
    },
    SetCurrency {
        variable: String,
        value: FlowValue,
        currency: String,
    },
    Calculation {
        variable: String,
        operator: String,
        value1: FlowValue,
        value2: FlowValue,
    },
    ConvertNumber {
        variable: String,
        number: FlowValue,
        decimals: u32,
    },
    ConvertText {
        variable: String,
        kind: String,
        text: String,
    },
    ReplaceString {
        variable: String,
        needle: String,
        replacement: String,
        input: String,
    },
    CreateBooleanTag {
        input: String,
    },
    CreateNumberTag {
        number: FlowValue,
        #[serde(default)]
        decimals: Option<u32>,
    },
    CreateCurrencyTag {
        number: FlowValue,
        currency: String,
    },
}

impl FlowAction {
    /// Host card id of the action
    pub fn card_id(&self) -> &'static str {
        match self {
            FlowAction::StartDuration { .. } => "action_START_DURATION",
            FlowAction::EndDuration { .. } => "action_END_DURATION",
            FlowAction::StartComparison { .. } => "action_START_COMPARE",
            FlowAction::EndComparison { .. } => "action_END_COMPARE",
            FlowAction::SetCurrency { .. } => "action_SET_CURRENCY",
            FlowAction::Calculation { .. } => "action_CALCULATION",
            FlowAction::ConvertNumber { .. } => "action_CONVERT_NUMBER",
            FlowAction::ConvertText { .. } => "action_CONVERT_TEXT",
            FlowAction::ReplaceString { .. } => "action_REPLACE_STRING",
            FlowAction::CreateBooleanTag { .. } => "action_CREATE_BOOLEAN_TAG",
            FlowAction::CreateNumberTag { .. } => "action_CREATE_NUMBER_TAG",
            FlowAction::CreateCurrencyTag { .. } => "action_CREATE_NUM-CURR_TAG",
        }
    }
}

/// Result of an ended duration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DurationResult {
    pub text: String,
    pub seconds: u64,
}

/// Flow dispatcher
pub struct FlowDispatcher<St: SettingsStore, Tk: TokenSink, Tr: TriggerSink> {
    store: Arc<St>,
    tokens: TokenRegistry<Tk>,
    triggers: Arc<Tr>,
    catalog: Catalog,
    options: DispatcherOptions,
    settings: AppSettings,
}

impl<St: SettingsStore, Tk: TokenSink, Tr: TriggerSink> FlowDispatcher<St, Tk, Tr> {
    /// Load and migrate settings, then re-register every stored token
    pub async fn load(
        store: Arc<St>,
        token_sink: Arc<Tk>,
        triggers: Arc<Tr>,
        options: DispatcherOptions,
    ) -> Result<Self> {
        let raw = store.load(&options.settings_key).await?.unwrap_or(Value::Null);
        let migrate_needed = settings::needs_migration(&raw);
        let settings = settings::migrate(raw)?;

        let mut dispatcher = Self {
            store,
            tokens: TokenRegistry::new(token_sink),
            triggers,
            catalog: Catalog::for_language(&options.language),
            options,
            settings,
        };

        if migrate_needed {
            info!(key = %dispatcher.options.settings_key, "Writing migrated settings");
            dispatcher.persist().await?;
        }

        let stored: Vec<TokenSpec> = dispatcher
            .settings
            .totals
            .iter()
            .map(TotalRecord::to_spec)
            .collect();
        for spec in &stored {
            dispatcher.tokens.publish(spec).await?;
        }

        info!(
            variables = dispatcher.settings.variables.len(),
            tokens = dispatcher.tokens.len(),
            language = dispatcher.catalog.language(),
            "Flow dispatcher loaded"
        );

        Ok(dispatcher)
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn options(&self) -> &DispatcherOptions {
        &self.options
    }

    /// Run an action by value
    pub async fn dispatch(&mut self, action: FlowAction, now: DateTime<Utc>) -> Result<Vec<TokenSpec>> {
        debug!(card = action.card_id(), "dispatch");

        match action {
            FlowAction::StartDuration { variable } => {
                self.start_duration(&variable, now).await?;
                Ok(vec![])
            },
            FlowAction::EndDuration { variable } => {
                self.end_duration(&variable, now).await?;
                Ok(self.tokens_of(&variable, &[TokenSlot::Duration, TokenSlot::DurationSeconds]))
            },
            FlowAction::StartComparison { variable, value } => {
                self.start_comparison(&variable, &value).await?;
                Ok(vec![])
            },
            FlowAction::EndComparison { variable, value } => {
                self.end_comparison(&variable, &value).await?;
                Ok(self.tokens_of(&variable, &[TokenSlot::Comparison]))
            },
            FlowAction::SetCurrency {
                variable,
                value,
                currency,
            } => {
                self.set_currency(&variable, &value, &currency).await?;
                Ok(self.tokens_of(&variable, &[TokenSlot::Currency]))
            },
            FlowAction::Calculation {
                variable,
                operator,
                value1,
                value2,
            } => {
                self.calculation(&variable, &operator, &value1, &value2)
                    .await?;
                Ok(self.tokens_of(&variable, &[TokenSlot::Calculation]))
            },
            FlowAction::ConvertNumber {
                variable,
                number,
                decimals,
            } => {
                self.convert_number(&variable, &number, decimals).await?;
                Ok(self.tokens_of(&variable, &[TokenSlot::Number]))
            },
            FlowAction::ConvertText {
                variable,
                kind,
                text,
            } => {
                self.convert_text(&variable, &kind, &text).await?;
                Ok(self.tokens_of(&variable, &[TokenSlot::Text]))
            },
            FlowAction::ReplaceString {
                variable,
                needle,
                replacement,
                input,
            } => {
                self.replace_string(&variable, &needle, &replacement, &input)
                    .await?;
                Ok(self.tokens_of(&variable, &[TokenSlot::Text]))
            },
            FlowAction::CreateBooleanTag { input } => Ok(vec![TokenSpec::keyed(
                "booleanVal",
                create_boolean_tag(&input),
            )]),
            FlowAction::CreateNumberTag { number, decimals } => Ok(vec![TokenSpec::keyed(
                "numberVal",
                create_number_tag(&number, decimals),
            )]),
            FlowAction::CreateCurrencyTag { number, currency } => Ok(vec![TokenSpec::keyed(
                "currencyOutcome",
                self.create_currency_tag(&number, &currency)?,
            )]),
        }
    }

    // ========================================================================
    // Durations
    // ========================================================================

    /// Start (or restart) the timer of `variable`
    pub async fn start_duration(&mut self, variable: &str, now: DateTime<Utc>) -> Result<()> {
        self.settings.state_mut(variable).started_at = Some(now);
        self.persist().await?;

        // Register the token up front so flows can reference it before the first result
        let spec = self.token_spec(variable, TokenSlot::Duration, String::new().into());
        self.tokens.register(&spec).await?;

        info!(variable, started_at = %now, "Duration started");
        Ok(())
    }

    /// Stop the timer of `variable` and publish the elapsed time
    pub async fn end_duration(&mut self, variable: &str, now: DateTime<Utc>) -> Result<DurationResult> {
        let started_at = self
            .settings
            .state(variable)
            .and_then(|s| s.started_at)
            .ok_or_else(|| FlowError::missing_state(variable, "duration"))?;

        let text = match calculate_duration(started_at, now, &self.catalog, DurationFormat::Text) {
            DurationOutput::Text(text) => text,
            DurationOutput::Seconds(s) => s.to_string(),
        };
        let seconds = elapsed_seconds(started_at, now);

        self.settings.state_mut(variable).started_at = None;
        self.settings.prune_states();

        self.record(variable, TokenSlot::Duration, text.clone().into())
            .await?;
        self.record(variable, TokenSlot::DurationSeconds, seconds.into())
            .await?;

        info!(variable, seconds, duration = %text, "Duration ended");
        Ok(DurationResult { text, seconds })
    }

    // ========================================================================
    // Comparisons
    // ========================================================================

    /// Record the comparison baseline of `variable`
    pub async fn start_comparison(&mut self, variable: &str, value: &FlowValue) -> Result<f64> {
        let baseline = finite_input(value, value.parse_float())?;
        self.settings.state_mut(variable).baseline = Some(baseline);
        self.persist().await?;

        info!(variable, baseline, "Comparison started");
        Ok(baseline)
    }

    /// Compare `value` against the recorded baseline and publish the delta
    pub async fn end_comparison(&mut self, variable: &str, value: &FlowValue) -> Result<f64> {
        let baseline = self
            .settings
            .state(variable)
            .and_then(|s| s.baseline)
            .ok_or_else(|| FlowError::missing_state(variable, "comparison"))?;
        let current = finite_input(value, value.parse_float())?;

        let delta = compare(baseline, current);

        self.settings.state_mut(variable).baseline = None;
        self.settings.prune_states();
        self.record(variable, TokenSlot::Comparison, delta.into())
            .await?;

        info!(variable, baseline, current, delta, "Comparison ended");
        Ok(delta)
    }

    // ========================================================================
    // Stateless calculations published into a variable
    // ========================================================================

    /// Format `value` as money in `currency`
    pub async fn set_currency(
        &mut self,
        variable: &str,
        value: &FlowValue,
        currency: &str,
    ) -> Result<String> {
        let formatted = self.create_currency_tag(value, currency)?;
        self.record(variable, TokenSlot::Currency, formatted.clone().into())
            .await?;
        Ok(formatted)
    }

    /// Apply `operator` to two values
    pub async fn calculation(
        &mut self,
        variable: &str,
        operator: &str,
        value1: &FlowValue,
        value2: &FlowValue,
    ) -> Result<f64> {
        let a = finite_input(value1, value1.to_number())?;
        let b = finite_input(value2, value2.to_number())?;

        let result = if self.options.strict_arithmetic {
            checked_evaluate(operator, a, b)?
        } else {
            evaluate(operator, a, b)
        };

        if !result.is_finite() {
            warn!(variable, operator, a, b, "Calculation produced a non-finite result");
            return Err(FlowError::NonFiniteResult(result));
        }

        self.record(variable, TokenSlot::Calculation, result.into())
            .await?;
        debug!(variable, operator, a, b, result, "Calculation");
        Ok(result)
    }

    /// Round `number` to `decimals` places
    pub async fn convert_number(
        &mut self,
        variable: &str,
        number: &FlowValue,
        decimals: u32,
    ) -> Result<f64> {
        let rounded = finite_input(number, round_number(number, decimals))?;
        self.record(variable, TokenSlot::Number, rounded.into())
            .await?;
        Ok(rounded)
    }

    /// Apply a named text transform
    pub async fn convert_text(&mut self, variable: &str, kind: &str, text: &str) -> Result<String> {
        let converted = transform(kind, text);
        self.record(variable, TokenSlot::Text, converted.clone().into())
            .await?;
        Ok(converted)
    }

    /// Replace every `needle` in `input`
    pub async fn replace_string(
        &mut self,
        variable: &str,
        needle: &str,
        replacement: &str,
        input: &str,
    ) -> Result<String> {
        let replaced = replace_all(input, needle, replacement);
        self.record(variable, TokenSlot::Text, replaced.clone().into())
            .await?;
        Ok(replaced)
    }

    /// Currency string for the currency tag card, nothing is stored
    pub fn create_currency_tag(&self, number: &FlowValue, currency: &str) -> Result<String> {
        let amount = finite_input(number, number.to_number())?;
        let locale = self.catalog.translate("helpers.locale");
        Ok(format_currency(amount, currency, &locale)?)
    }

    // ========================================================================
    // Conditions
    // ========================================================================

    /// Whether `variable` has published any result
    pub fn has_value(&self, variable: &str) -> bool {
        self.settings.totals_for(variable).next().is_some()
    }

    /// Whether `variable` has a running timer
    pub fn is_running(&self, variable: &str) -> bool {
        self.settings
            .state(variable)
            .is_some_and(|s| s.started_at.is_some())
    }

    // ========================================================================
    // Variable management
    // ========================================================================

    /// Add a user variable, returns the stored name
    pub async fn add_variable(&mut self, name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(FlowError::InvalidVariable(name.to_string()));
        }

        let name = capitalize(trimmed);
        // Token ids are derived from the name, so names that format alike would share tokens
        let token_id = format_token(&name);
        if let Some(existing) = self
            .settings
            .variables
            .iter()
            .find(|v| format_token(v) == token_id)
        {
            debug!(variable = %name, existing = %existing, "Variable name taken");
            return Err(FlowError::DuplicateVariable(name));
        }

        self.settings.variables.push(name.clone());
        self.persist().await?;
        info!(variable = %name, "Variable added");
        Ok(name)
    }

    /// Remove a variable with its state and stored results
    pub async fn remove_variable(&mut self, name: &str) -> Result<bool> {
        let removed = self.settings.remove_variable(name);
        if removed {
            self.persist().await?;
            info!(variable = name, "Variable removed");
        }
        Ok(removed)
    }

    /// Remove every variable
    pub async fn clear(&mut self) -> Result<()> {
        self.settings = AppSettings::default();
        self.persist().await?;
        info!("All variables cleared");
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn token_spec(&self, variable: &str, slot: TokenSlot, value: TokenValue) -> TokenSpec {
        let title = format!(
            "{} {}",
            variable,
            self.catalog.translate(&format!("tokens.{}", slot.suffix()))
        );
        TokenSpec::with_id(&format!("{}-{}", variable, slot.suffix()), title, value)
    }

    fn tokens_of(&self, variable: &str, slots: &[TokenSlot]) -> Vec<TokenSpec> {
        slots
            .iter()
            .filter_map(|slot| {
                let id = self.token_spec(variable, *slot, String::new().into()).id;
                self.settings.total(&id).map(TotalRecord::to_spec)
            })
            .collect()
    }

    /// Store a result, persist, publish its token and fire its trigger if any
    async fn record(
        &mut self,
        variable: &str,
        slot: TokenSlot,
        value: TokenValue,
    ) -> Result<()> {
        let spec = self.token_spec(variable, slot, value);

        self.settings
            .upsert_total(TotalRecord::from_spec(variable, &spec));
        self.persist().await?;
        self.tokens.publish(&spec).await?;

        if let Some(kind) = slot.trigger() {
            let event = TriggerEvent {
                variable: variable.to_string(),
                token: spec.id.clone(),
                value: spec.value.clone(),
            };
            self.triggers.fire(kind, &event).await?;
        }

        debug!(variable, token = %spec.id, value = %spec.value, "Result recorded");
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        let raw = serde_json::to_value(&self.settings)?;
        self.store.save(&self.options.settings_key, &raw).await
    }
}

/// Output of the boolean tag card: `"yes"` is true, anything else false
pub fn create_boolean_tag(input: &str) -> bool {
    input == "yes"
}

/// Output of the number tag card, rounded only when decimals are given
pub fn create_number_tag(number: &FlowValue, decimals: Option<u32>) -> f64 {
    match decimals {
        Some(d) if d > 0 => round_number(number, d),
        _ => number.to_number(),
    }
}

/// Upper-case the first character, keep the rest as typed
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn finite_input(raw: &FlowValue, parsed: f64) -> Result<f64> {
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(FlowError::InvalidNumber(raw.to_string()))
    }
}

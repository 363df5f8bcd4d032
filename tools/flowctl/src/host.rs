//! Host side of the dispatcher for the command line
//!
//! Settings live in a JSON file holding one blob per key, tokens are kept in
//! memory for the duration of a command and fired triggers are printed.

use colored::*;
use flow_calc::{TokenSpec, TokenValue};
use flow_variables::{FlowError, SettingsStore, TokenSink, TriggerEvent, TriggerKind, TriggerSink};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

type FlowResult<T> = flow_variables::Result<T>;

/// Settings store backed by a JSON object file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> FlowResult<Map<String, Value>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(FlowError::store(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            },
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str(&content)? {
            Value::Object(map) => Ok(map),
            other => Err(FlowError::store(format!(
                "{} must hold a JSON object, found {}",
                self.path.display(),
                kind_name(&other)
            ))),
        }
    }
}

impl SettingsStore for JsonFileStore {
    async fn load(&self, key: &str) -> FlowResult<Option<Value>> {
        let mut all = self.read_all().await?;
        Ok(all.remove(key))
    }

    async fn save(&self, key: &str, value: &Value) -> FlowResult<()> {
        let mut all = self.read_all().await?;
        all.insert(key.to_string(), value.clone());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FlowError::store(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(&Value::Object(all))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| FlowError::store(format!("Failed to write {}: {}", self.path.display(), e)))?;

        debug!(path = %self.path.display(), key, "Settings saved");
        Ok(())
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Token sink that only logs, tokens exist for a single command
pub struct LogTokenSink;

impl TokenSink for LogTokenSink {
    async fn create_token(&self, spec: &TokenSpec) -> FlowResult<()> {
        debug!(token = %spec.id, title = %spec.title, kind = %spec.kind, "create token");
        Ok(())
    }

    async fn set_value(&self, id: &str, value: &TokenValue) -> FlowResult<()> {
        debug!(token = id, value = %value, "set token");
        Ok(())
    }
}

/// Trigger sink printing each fired card
pub struct PrintTriggerSink;

impl TriggerSink for PrintTriggerSink {
    async fn fire(&self, kind: TriggerKind, event: &TriggerEvent) -> FlowResult<()> {
        println!(
            "  {} {} {} = {}",
            "trigger".bright_magenta(),
            kind.card_id(),
            event.token.bright_white(),
            event.value
        );
        Ok(())
    }
}

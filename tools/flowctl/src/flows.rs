//! Flow action commands run against the settings file

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use colored::*;
use flow_calc::{parse_instant, TokenSpec};
use flow_variables::{
    settings, DispatcherOptions, FlowAction, FlowDispatcher, SettingsStore, SETTINGS_KEY,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::host::{JsonFileStore, LogTokenSink, PrintTriggerSink};

type Dispatcher = FlowDispatcher<JsonFileStore, LogTokenSink, PrintTriggerSink>;

#[derive(Subcommand)]
pub enum VarCommands {
    /// List variables with their state and published values
    List,

    /// Add a variable
    Add {
        /// Variable name
        name: String,
    },

    /// Remove a variable with its state and values
    Remove {
        /// Variable name
        name: String,
    },

    /// Remove every variable
    Clear,
}

async fn open(settings_path: &Path, options: DispatcherOptions) -> Result<Dispatcher> {
    FlowDispatcher::load(
        Arc::new(JsonFileStore::new(settings_path)),
        Arc::new(LogTokenSink),
        Arc::new(PrintTriggerSink),
        options,
    )
    .await
    .with_context(|| format!("Failed to load settings from {}", settings_path.display()))
}

/// Parse one action object or an array of them
///
/// `@path` reads the JSON from a file.
pub fn parse_actions(source: &str) -> Result<Vec<FlowAction>> {
    let text = match source.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read actions from {}", path))?,
        None => source.to_string(),
    };

    let raw: Value = serde_json::from_str(&text).context("Actions must be JSON")?;
    let actions = match raw {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<FlowAction>, _>>()?,
        other => vec![serde_json::from_value(other)?],
    };

    if actions.is_empty() {
        bail!("No actions given");
    }
    Ok(actions)
}

/// Run flow actions in order, stopping at the first failure
pub async fn run(
    settings_path: &Path,
    options: DispatcherOptions,
    source: &str,
    now: Option<&str>,
) -> Result<()> {
    let actions = parse_actions(source)?;
    let now: DateTime<Utc> = match now {
        Some(now) => parse_instant(now).context("Invalid --now instant")?,
        None => Utc::now(),
    };

    let mut flows = open(settings_path, options).await?;
    for action in actions {
        let card = action.card_id();
        println!("{} {}", "▶".bright_cyan(), card.bold());

        let specs = flows
            .dispatch(action, now)
            .await
            .with_context(|| format!("{} failed", card))?;
        print_tokens(&specs);
    }
    Ok(())
}

fn print_tokens(specs: &[TokenSpec]) {
    for spec in specs {
        println!(
            "  {} {} ({}) = {}",
            "token".bright_green(),
            spec.id.bright_white(),
            spec.kind,
            spec.value
        );
    }
}

/// Migrate the stored settings blob to the current shape
pub async fn migrate(settings_path: &Path, dry_run: bool) -> Result<()> {
    let store = JsonFileStore::new(settings_path);
    let raw = match store.load(SETTINGS_KEY).await? {
        Some(raw) => raw,
        None => {
            println!("{} No settings stored in {}", "INFO".bright_cyan(), settings_path.display());
            return Ok(());
        },
    };

    if !settings::needs_migration(&raw) {
        println!("{} Settings already current", "OK".bright_green());
        return Ok(());
    }

    let migrated = settings::migrate(raw)?;
    let value = serde_json::to_value(&migrated)?;

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    store.save(SETTINGS_KEY, &value).await?;
    info!(path = %store.path().display(), "Settings migrated");
    println!(
        "{} Migrated: {} variables, {} pending states, {} stored values",
        "OK".bright_green(),
        migrated.variables.len(),
        migrated.states.len(),
        migrated.totals.len()
    );
    Ok(())
}

pub async fn handle_var_command(
    cmd: VarCommands,
    settings_path: &Path,
    options: DispatcherOptions,
) -> Result<()> {
    let mut flows = open(settings_path, options).await?;

    match cmd {
        VarCommands::List => {
            let settings = flows.settings();
            if settings.variables.is_empty() {
                println!("No variables");
            }
            for name in &settings.variables {
                let running = if flows.is_running(name) {
                    " (running)".yellow().to_string()
                } else {
                    String::new()
                };
                println!("{}{}", name.bold(), running);
                for total in settings.totals_for(name) {
                    println!("  {} = {}", total.token, total.value);
                }
            }
        },
        VarCommands::Add { name } => {
            let stored = flows.add_variable(&name).await?;
            println!("{} Added {}", "OK".bright_green(), stored.bold());
        },
        VarCommands::Remove { name } => {
            if flows.remove_variable(&name).await? {
                println!("{} Removed {}", "OK".bright_green(), name.bold());
            } else {
                bail!("Unknown variable: {}", name);
            }
        },
        VarCommands::Clear => {
            flows.clear().await?;
            println!("{} All variables removed", "OK".bright_green());
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_single_and_array() {
        let actions = parse_actions(r#"{"action": "start_duration", "variable": "Washer"}"#).unwrap();
        assert_eq!(
            actions,
            vec![FlowAction::StartDuration {
                variable: "Washer".to_string()
            }]
        );

        let actions = parse_actions(
            r#"[{"action": "start_duration", "variable": "Washer"},
                {"action": "end_duration", "variable": "Washer"}]"#,
        )
        .unwrap();
        assert_eq!(actions.len(), 2);

        assert!(parse_actions("[]").is_err());
        assert!(parse_actions(r#"{"action": "explode"}"#).is_err());
    }

    #[tokio::test]
    async fn test_run_persists_between_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        run(
            &path,
            DispatcherOptions::default(),
            r#"{"action": "start_duration", "variable": "Washer"}"#,
            Some("2024-03-01T08:00:00Z"),
        )
        .await
        .unwrap();
        run(
            &path,
            DispatcherOptions::default(),
            r#"{"action": "end_duration", "variable": "Washer"}"#,
            Some("2024-03-01T09:02:00Z"),
        )
        .await
        .unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let totals = raw[SETTINGS_KEY]["totals"].as_array().unwrap();
        assert_eq!(totals[0]["value"], json!("1 hour 2 minutes"));
        assert_eq!(totals[1]["value"], json!(3720.0));
    }

    #[tokio::test]
    async fn test_migrate_rewrites_legacy_blob() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut root = serde_json::Map::new();
        root.insert(
            SETTINGS_KEY.to_string(),
            json!({"VARIABLES": ["Meter"], "TOTALS": []}),
        );
        std::fs::write(&path, Value::Object(root).to_string()).unwrap();

        migrate(&path, false).await.unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[SETTINGS_KEY]["version"], json!(4));
        assert_eq!(raw[SETTINGS_KEY]["variables"], json!(["Meter"]));
    }
}

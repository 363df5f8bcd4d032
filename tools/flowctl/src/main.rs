//! flowctl - Flow Utilities command line
//!
//! Runs the calculators directly and executes flow card actions against a
//! JSON settings file, so flows can be tried without an automation host.

mod calc;
mod flows;
mod host;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use common::config::{self, FlowConfig};
use common::config_loader::{get_config_value, get_string_config};
use common::logging::{self, LogConfig};
use flow_calc::{Catalog, DurationFormat};
use flow_variables::DispatcherOptions;
use std::path::PathBuf;

use crate::flows::VarCommands;

#[derive(Parser)]
#[command(name = "flowctl")]
#[command(about = "Flow Utilities - calculators and flow actions from the command line")]
#[command(long_about = "Flow Utilities - calculators and flow actions from the command line

Calculators:
  duration    Elapsed time between two instants
  compare     Difference between a baseline and a new value
  calc        Apply + - * / to two values
  round       Round a value to a number of decimals
  text        Change the case of a text
  replace     Replace every occurrence of a text
  token-id    Token identifier for a title
  currency    Format an amount as money

Flows:
  run         Run flow actions against the settings file
  vars        Manage variables
  migrate     Migrate an old settings file

Examples:
  flowctl duration 2024-03-01T08:00:00Z 2024-03-02T09:01:01Z
  flowctl calc 7 / 2
  flowctl text titleCase \"the QUICK fox\"
  flowctl run '{\"action\": \"start_duration\", \"variable\": \"Washer\"}'")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Settings file (default: FLOW_SETTINGS or the configured path)
    #[arg(short = 's', long = "settings", global = true)]
    settings: Option<PathBuf>,

    /// Language for units, token titles and currency layout
    #[arg(short = 'l', long, global = true)]
    language: Option<String>,

    /// Reject unknown operators and division by zero
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Elapsed time between two instants
    Duration {
        /// Start instant (RFC 3339, YYYY-MM-DD or epoch milliseconds)
        start: String,

        /// End instant, now when omitted
        end: Option<String>,

        /// Print whole seconds instead of text
        #[arg(long)]
        seconds: bool,
    },

    /// Difference between a baseline and a new value, 2 decimals
    Compare {
        #[arg(allow_hyphen_values = true)]
        baseline: String,

        #[arg(allow_hyphen_values = true)]
        current: String,
    },

    /// Apply an operator to two values, 4 decimals
    Calc {
        #[arg(allow_hyphen_values = true)]
        a: String,

        /// One of + - * /
        #[arg(allow_hyphen_values = true)]
        operator: String,

        #[arg(allow_hyphen_values = true)]
        b: String,
    },

    /// Round a value to a number of decimals
    Round {
        #[arg(allow_hyphen_values = true)]
        value: String,

        #[arg(default_value = "0")]
        decimals: u32,
    },

    /// Change the case of a text
    Text {
        /// lowercase, uppercase, capitalizeFirstLetter or titleCase
        kind: String,

        text: String,
    },

    /// Replace every occurrence of a text
    Replace {
        input: String,

        needle: String,

        replacement: String,
    },

    /// Token identifier for a title
    #[command(name = "token-id")]
    TokenId { title: String },

    /// Format an amount as money
    Currency {
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// ISO 4217 code, e.g. EUR
        code: String,

        /// Locale tag, e.g. nl-NL (default: the language's locale)
        #[arg(long)]
        locale: Option<String>,
    },

    /// Run flow actions, given as JSON or @file
    Run {
        actions: String,

        /// Instant the actions run at (default: now)
        #[arg(long)]
        now: Option<String>,
    },

    /// Manage variables
    #[command(subcommand)]
    Vars(VarCommands),

    /// Migrate an old settings file to the current shape
    Migrate {
        /// Print the migrated settings instead of writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the effective configuration, or write it to a file
    Config {
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config: FlowConfig =
        config::load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    config.language = get_string_config(cli.language.clone(), "FLOW_LANGUAGE", config.language);
    config.strict_arithmetic |= cli.strict;
    config.settings_path = get_config_value(
        cli.settings.clone(),
        "FLOW_SETTINGS",
        config.settings_path.clone(),
    );

    let mut log_config = LogConfig::from_logging_config("flowctl", &config.logging);
    if cli.verbose {
        log_config.level = "debug".to_string();
    }
    log_config.ansi = !cli.no_color;
    logging::init_with_config(log_config)?;

    let catalog = Catalog::for_language(&config.language);
    let options = DispatcherOptions {
        language: config.language.clone(),
        strict_arithmetic: config.strict_arithmetic,
        ..Default::default()
    };

    match cli.command {
        Commands::Duration {
            start,
            end,
            seconds,
        } => {
            let format = if seconds {
                DurationFormat::Seconds
            } else {
                config.duration_format
            };
            calc::duration(&catalog, &start, end.as_deref(), format)
        },
        Commands::Compare { baseline, current } => calc::compare(&baseline, &current),
        Commands::Calc { a, operator, b } => {
            calc::calc(&a, &operator, &b, config.strict_arithmetic)
        },
        Commands::Round { value, decimals } => calc::round(&value, decimals),
        Commands::Text { kind, text } => calc::text(&kind, &text),
        Commands::Replace {
            input,
            needle,
            replacement,
        } => calc::replace(&input, &needle, &replacement),
        Commands::TokenId { title } => calc::token_id(&title),
        Commands::Currency {
            amount,
            code,
            locale,
        } => calc::currency(&catalog, &amount, &code, locale.as_deref()),
        Commands::Run { actions, now } => {
            flows::run(&config.settings_path, options, &actions, now.as_deref()).await
        },
        Commands::Vars(cmd) => flows::handle_var_command(cmd, &config.settings_path, options).await,
        Commands::Migrate { dry_run } => flows::migrate(&config.settings_path, dry_run).await,
        Commands::Config { write } => match write {
            Some(path) => {
                config::save_config_to_file(&config, &path)?;
                println!("{} Configuration written to {}", "OK".bright_green(), path.display());
                Ok(())
            },
            None => {
                println!("{}", serde_json::to_string_pretty(&config)?);
                Ok(())
            },
        },
    }
}

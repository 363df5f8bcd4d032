//! flow-variables - Variable engine for Flow Utilities
//!
//! Wires the pure `flow_calc` helpers to the automation host:
//!
//! - **settings**: canonical settings record and one-shot legacy migration
//! - **store**: where the settings blob lives ([`SettingsStore`])
//! - **tokens**: at-most-once token creation ([`TokenRegistry`])
//! - **triggers**: trigger card lookup and firing ([`TriggerSink`])
//! - **dispatcher**: flow card actions and conditions ([`FlowDispatcher`])
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::{Duration, Utc};
//! use flow_variables::{
//!     DispatcherOptions, FlowDispatcher, MemorySettingsStore, MemoryTokenSink, NullTriggerSink,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> flow_variables::Result<()> {
//! let mut flows = FlowDispatcher::load(
//!     Arc::new(MemorySettingsStore::new()),
//!     Arc::new(MemoryTokenSink::new()),
//!     Arc::new(NullTriggerSink),
//!     DispatcherOptions::default(),
//! )
//! .await?;
//!
//! let start = Utc::now();
//! flows.start_duration("Washer", start).await?;
//! let result = flows
//!     .end_duration("Washer", start + Duration::seconds(3_720))
//!     .await?;
//! assert_eq!(result.text, "1 hour 2 minutes");
//! # Ok(())
//! # }
//! ```

pub mod dispatcher;
pub mod error;
pub mod settings;
pub mod store;
pub mod tokens;
pub mod triggers;

pub use dispatcher::{
    create_boolean_tag, create_number_tag, DispatcherOptions, DurationResult, FlowAction,
    FlowDispatcher, TokenSlot,
};
pub use error::{FlowError, Result};
pub use settings::{migrate, AppSettings, TotalRecord, VariableState, SETTINGS_KEY};
pub use store::{MemorySettingsStore, SettingsStore};
pub use tokens::{MemoryTokenSink, TokenRegistry, TokenSink};
pub use triggers::{
    trigger_matches, NullTriggerSink, RecordingTriggerSink, TriggerEvent, TriggerKind, TriggerSink,
};

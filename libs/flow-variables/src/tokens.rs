//! Token publishing
//!
//! [`TokenRegistry`] owns the map of tokens already created on the host, so
//! each identifier is created at most once and later publishes only update the
//! value.

use flow_calc::{TokenKind, TokenSpec, TokenValue};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{FlowError, Result};

/// Host side of token publishing
pub trait TokenSink: Send + Sync {
    /// Create a token on the host
    fn create_token(&self, spec: &TokenSpec) -> impl Future<Output = Result<()>> + Send;

    /// Update the value of a created token
    fn set_value(&self, id: &str, value: &TokenValue) -> impl Future<Output = Result<()>> + Send;
}

/// Explicit registry of created tokens
pub struct TokenRegistry<T: TokenSink> {
    sink: Arc<T>,
    registered: HashMap<String, TokenKind>,
}

impl<T: TokenSink> TokenRegistry<T> {
    pub fn new(sink: Arc<T>) -> Self {
        Self {
            sink,
            registered: HashMap::new(),
        }
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.registered.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Create the token if it does not exist yet
    ///
    /// Returns `true` when the token was created by this call. Re-registering
    /// an existing token with the same kind is a no-op.
    pub async fn register(&mut self, spec: &TokenSpec) -> Result<bool> {
        if let Some(kind) = self.registered.get(&spec.id) {
            if *kind != spec.kind {
                return Err(FlowError::TokenKindMismatch {
                    id: spec.id.clone(),
                    registered: kind.to_string(),
                    requested: spec.kind.to_string(),
                });
            }
            return Ok(false);
        }

        self.sink.create_token(spec).await?;
        self.registered.insert(spec.id.clone(), spec.kind);
        debug!(token = %spec.id, kind = %spec.kind, "Token created");
        Ok(true)
    }

    /// Register if needed, then set the value
    pub async fn publish(&mut self, spec: &TokenSpec) -> Result<()> {
        self.register(spec).await?;
        self.sink.set_value(&spec.id, &spec.value).await?;
        debug!(token = %spec.id, value = %spec.value, "Token value set");
        Ok(())
    }
}

/// In-memory token sink for testing and embedding
#[derive(Default)]
pub struct MemoryTokenSink {
    tokens: RwLock<HashMap<String, TokenSpec>>,
    creations: RwLock<usize>,
}

impl MemoryTokenSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a token
    pub async fn value(&self, id: &str) -> Option<TokenValue> {
        self.tokens.read().await.get(id).map(|t| t.value.clone())
    }

    /// Current token by identifier
    pub async fn token(&self, id: &str) -> Option<TokenSpec> {
        self.tokens.read().await.get(id).cloned()
    }

    /// Number of `create_token` calls received
    pub async fn creations(&self) -> usize {
        *self.creations.read().await
    }
}

impl TokenSink for MemoryTokenSink {
    fn create_token(&self, spec: &TokenSpec) -> impl Future<Output = Result<()>> + Send {
        let spec = spec.clone();
        async move {
            let mut tokens = self.tokens.write().await;
            if tokens.contains_key(&spec.id) {
                return Err(FlowError::Token(format!("Token already exists: {}", spec.id)));
            }
            tokens.insert(spec.id.clone(), spec);
            *self.creations.write().await += 1;
            Ok(())
        }
    }

    fn set_value(&self, id: &str, value: &TokenValue) -> impl Future<Output = Result<()>> + Send {
        let id = id.to_string();
        let value = value.clone();
        async move {
            let mut tokens = self.tokens.write().await;
            match tokens.get_mut(&id) {
                Some(token) => {
                    token.value = value;
                    Ok(())
                },
                None => Err(FlowError::Token(format!("Unknown token: {}", id))),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_at_most_once() {
        let sink = Arc::new(MemoryTokenSink::new());
        let mut registry = TokenRegistry::new(sink.clone());

        let spec = TokenSpec::new("Washer duration", "");
        assert!(registry.register(&spec).await.unwrap());
        assert!(!registry.register(&spec).await.unwrap());
        assert_eq!(sink.creations().await, 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_publish_updates_value() {
        let sink = Arc::new(MemoryTokenSink::new());
        let mut registry = TokenRegistry::new(sink.clone());

        registry
            .publish(&TokenSpec::new("Meter", 1.5))
            .await
            .unwrap();
        registry
            .publish(&TokenSpec::new("Meter", 2.5))
            .await
            .unwrap();

        assert_eq!(sink.value("meter").await, Some(TokenValue::Number(2.5)));
        assert_eq!(sink.creations().await, 1);
    }

    #[tokio::test]
    async fn test_kind_mismatch_rejected() {
        let sink = Arc::new(MemoryTokenSink::new());
        let mut registry = TokenRegistry::new(sink);

        registry.publish(&TokenSpec::new("Meter", 1.5)).await.unwrap();
        let err = registry
            .publish(&TokenSpec::new("Meter", "text"))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::TokenKindMismatch { .. }));
    }

    #[tokio::test]
    async fn test_sink_rejects_unknown_token() {
        let sink = MemoryTokenSink::new();
        let err = sink.set_value("nope", &TokenValue::from(1.0)).await.unwrap_err();
        assert!(matches!(err, FlowError::Token(_)));
    }
}

//! Credential provider
//!
//! The client never owns the bearer credential; it asks a provider before
//! each authenticated attempt and tells it to tear the session down when
//! the server rejects the token.

use crate::utils::error::ApiResult;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Access/refresh token pair held by a provider
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Supplies and refreshes the bearer credential
///
/// Implementations wrap whatever session storage the embedding app uses.
/// `refresh_if_needed` runs before every authenticated send, so a provider
/// that refreshes eagerly here never has a live request race an expiring
/// token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current bearer token, if a session exists
    async fn bearer_token(&self) -> Option<String>;

    /// Refresh the credential when it is close to expiry
    async fn refresh_if_needed(&self) -> ApiResult<()>;

    /// Tear down the local session after the server rejects the credential
    async fn clear_session(&self);
}

/// In-memory provider for tests and simple embedders
#[derive(Debug, Default)]
pub struct MemoryTokenProvider {
    tokens: RwLock<Option<TokenPair>>,
}

impl MemoryTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self {
            tokens: RwLock::new(Some(TokenPair {
                access_token: access_token.into(),
                refresh_token: None,
            })),
        }
    }

    /// Replace the stored pair, e.g. after a login call
    pub async fn set_tokens(&self, pair: TokenPair) {
        *self.tokens.write().await = Some(pair);
    }

    pub async fn has_session(&self) -> bool {
        self.tokens.read().await.is_some()
    }
}

#[async_trait]
impl TokenProvider for MemoryTokenProvider {
    async fn bearer_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|pair| pair.access_token.clone())
    }

    async fn refresh_if_needed(&self) -> ApiResult<()> {
        // Nothing to do; the in-memory pair has no expiry metadata
        Ok(())
    }

    async fn clear_session(&self) {
        *self.tokens.write().await = None;
    }
}

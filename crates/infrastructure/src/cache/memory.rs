//! Process-local token cache.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cloudhost_application::ports::{TokenCache, TokenCacheError};
use cloudhost_domain::Token;
use tokio::sync::RwLock;

/// Token cache held in memory, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenCache {
    tokens: Arc<RwLock<HashMap<String, Token>>>,
}

impl InMemoryTokenCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    /// Removes the token stored for `key`.
    pub async fn remove(&self, key: &str) -> Option<Token> {
        self.tokens.write().await.remove(key)
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn load(&self, key: &str) -> Result<Option<Token>, TokenCacheError> {
        Ok(self.tokens.read().await.get(key).cloned())
    }

    async fn store(&self, key: &str, token: &Token) -> Result<(), TokenCacheError> {
        self.tokens
            .write()
            .await
            .insert(key.to_string(), token.clone());
        Ok(())
    }
}

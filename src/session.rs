//! Auth-session state for the current user: token plus user profile.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by the request pipeline on every outgoing call and by the navigation
//! guard on every route change. Written on login, cleared on logout and on
//! authentication expiry. Nothing else touches the underlying keys.
//!
//! DESIGN
//! ======
//! The store is a thin typed view over an injected `KeyValueStore`; it holds no
//! state of its own, so clones share one session.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::storage::{KeyValueStore, MemoryStorage};

/// Storage key for the raw token.
pub const TOKEN_KEY: &str = "auth_token";
/// Storage key for the JSON-encoded user profile.
pub const USER_KEY: &str = "auth_user";

// =============================================================================
// USER PROFILE
// =============================================================================

/// Profile of the signed-in user. Only `role` feeds authorization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Server-assigned identifier. Numeric ids are kept as their decimal string.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// Authorization tier compared against route allow-lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Display fields the core does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    #[must_use]
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self { id: id.into(), role: Some(role.into()), extra: Map::new() }
    }

    /// Attach an uninterpreted display field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Point-in-time view of the session, read in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Role of the current user, if any.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.user.as_ref()?.role.as_deref()
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Typed access to the persisted session.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Store backed by a fresh `MemoryStorage`.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Persist token and user together.
    pub fn set_session(&self, token: &str, user: &UserProfile) {
        let user_json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "user profile serialization failed; session unchanged");
                return;
            }
        };
        self.storage.set_all(&[(USER_KEY, &user_json), (TOKEN_KEY, token)]);
        tracing::debug!(user_id = %user.id, role = ?user.role, "session stored");
    }

    /// Current token. An empty stored value counts as no token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Current user. Unparseable stored data reads as no user.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        let raw = self.storage.get(USER_KEY)?;
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str::<Option<UserProfile>>(&raw) {
            Ok(user) => user,
            Err(e) => {
                tracing::debug!(error = %e, "stored user profile unreadable");
                None
            }
        }
    }

    /// Remove token and user. Safe to call on an empty session.
    pub fn clear_session(&self) {
        self.storage.remove_all(&[TOKEN_KEY, USER_KEY]);
    }

    /// Token presence only; freshness is the server's call.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot { token: self.token(), user: self.user() }
    }
}

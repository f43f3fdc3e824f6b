//! Signed-in identity used to scope every store operation.
//!
//! Sign-in itself happens elsewhere; this module only carries the resulting
//! user id and bearer token and fails fast when nobody is signed in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::IdentityConfig;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub id_token: String,
    pub user: AuthUser,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("id_token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Signed-in/out state shared by the storage clients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(AuthSession),
}

impl AuthState {
    /// Build a signed-in state for `user_id` with the given bearer token.
    pub fn signed_in(user_id: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self::SignedIn(AuthSession {
            id_token: id_token.into(),
            user: AuthUser {
                id: user_id.into(),
                email: None,
            },
        })
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    /// Current session, or [`Error::AuthRequired`] when signed out.
    pub fn require_session(&self) -> Result<&AuthSession> {
        match self {
            Self::SignedIn(session) if !session.user.id.trim().is_empty() => Ok(session),
            _ => Err(Error::AuthRequired),
        }
    }

    /// Stable id of the signed-in user, or [`Error::AuthRequired`].
    pub fn require_user(&self) -> Result<&str> {
        self.require_session()
            .map(|session| session.user.id.as_str())
    }
}

impl From<Option<IdentityConfig>> for AuthState {
    fn from(identity: Option<IdentityConfig>) -> Self {
        identity.map_or(Self::SignedOut, |identity| {
            Self::signed_in(identity.user_id, identity.id_token)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_out_requires_auth() {
        let state = AuthState::SignedOut;
        assert!(!state.is_signed_in());
        assert!(matches!(state.require_user(), Err(Error::AuthRequired)));
    }

    #[test]
    fn blank_user_id_is_treated_as_signed_out() {
        let state = AuthState::signed_in("  ", "token");
        assert!(matches!(state.require_user(), Err(Error::AuthRequired)));
    }

    #[test]
    fn signed_in_exposes_user_id() {
        let state = AuthState::signed_in("uid-42", "token");
        assert_eq!(state.require_user().unwrap(), "uid-42");
    }

    #[test]
    fn session_debug_redacts_token() {
        let state = AuthState::signed_in("uid-42", "secret-id-token");
        let rendered = format!("{state:?}");
        assert!(!rendered.contains("secret-id-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn identity_config_converts_to_signed_in() {
        let state = AuthState::from(Some(IdentityConfig {
            user_id: "uid".to_string(),
            id_token: "token".to_string(),
        }));
        assert!(state.is_signed_in());
        assert_eq!(AuthState::from(None), AuthState::SignedOut);
    }
}

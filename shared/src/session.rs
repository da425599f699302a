//! Session gate
//!
//! The login state is an explicit value handed to whoever needs it, and
//! [`Session::require`] is the only check.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Authentication required")]
    NotAuthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    authenticated: bool,
}

impl Session {
    pub fn authenticated() -> Self {
        Self { authenticated: true }
    }

    pub fn anonymous() -> Self {
        Self { authenticated: false }
    }

    /// Authenticated when a non-blank token is present
    pub fn from_token(token: Option<&str>) -> Self {
        Self {
            authenticated: token.is_some_and(|t| !t.trim().is_empty()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn require(&self) -> Result<(), SessionError> {
        if self.authenticated {
            Ok(())
        } else {
            tracing::debug!("Rejected unauthenticated session");
            Err(SessionError::NotAuthenticated)
        }
    }
}

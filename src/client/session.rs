//! Client-side session: the bearer token and who it belongs to

use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::domain::User;

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    identity: Option<User>,
}

/// Shared by the API client and the views as `Arc<Session>`
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session that already holds a token, identity unknown
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.begin(token, None);
        session
    }

    pub fn begin(&self, token: impl Into<String>, identity: Option<User>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.token = Some(token.into());
        state.identity = identity;
        debug!("Session started");
    }

    /// Forget the token and identity
    pub fn end(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.token = None;
        state.identity = None;
        debug!("Session ended");
    }

    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    pub fn identity(&self) -> Option<User> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .identity
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

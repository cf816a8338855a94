use crate::models::User;

/// Externally visible session state, derived from the live credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(User),
    /// A refresh is in flight; the current credential is still usable.
    Refreshing(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Authenticated(user) | SessionState::Refreshing(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

/// Session-scoped state that must be wiped when the session ends.
pub trait SessionListener: Send + Sync {
    /// Called synchronously after the credential has been cleared.
    fn session_cleared(&self);
}

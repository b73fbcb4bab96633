//! Session state.

use crate::storage::{PersistedSession, SessionStorage};
use expohub_client::{Role, UserIdentity};
use expohub_core::{DateTime, Utc};

/// Where the user is in the login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// No token and no OTP outstanding.
    Anonymous,
    /// An OTP was sent and awaits verification.
    OtpPending,
    /// A token is held.
    Authenticated,
}

/// Client-side session.
///
/// Authentication is derived from the token, so there is no separate flag
/// that could disagree with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Identity of the signed-in user.
    pub user: Option<UserIdentity>,
    /// Bearer token.
    pub token: Option<String>,
    /// Refresh token.
    pub refresh_token: Option<String>,
    /// An operation is in flight.
    pub loading: bool,
    /// Message from the last failed operation.
    pub error: Option<String>,
    /// An OTP has been sent and not yet consumed.
    pub otp_sent: bool,
    /// When the current token was obtained in this process.
    pub signed_in_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Seed the session from persisted storage.
    ///
    /// A storage that cannot be read yields an anonymous session.
    #[must_use]
    pub fn restore<S: SessionStorage>(storage: &S) -> Self {
        match PersistedSession::load(storage) {
            Ok(persisted) => Self {
                user: persisted.user,
                token: persisted.token,
                refresh_token: persisted.refresh_token,
                ..Self::default()
            },
            Err(error) => {
                tracing::warn!(%error, "Starting with an anonymous session");
                Self::default()
            },
        }
    }

    /// Whether a token is held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Current phase of the login flow.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        if self.token.is_some() {
            SessionPhase::Authenticated
        } else if self.otp_sent {
            SessionPhase::OtpPending
        } else {
            SessionPhase::Anonymous
        }
    }

    /// Role of the signed-in user, `None` when anonymous.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        if !self.is_authenticated() {
            return None;
        }
        Some(self.user.as_ref().map_or(Role::Unset, |user| user.role))
    }

    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, error: String) {
        self.loading = false;
        self.error = Some(error);
    }

    pub(crate) fn sign_out(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, keys};

    #[test]
    fn test_phase_follows_token_and_otp() {
        let mut state = SessionState::default();
        assert_eq!(state.phase(), SessionPhase::Anonymous);
        assert_eq!(state.role(), None);

        state.otp_sent = true;
        assert_eq!(state.phase(), SessionPhase::OtpPending);

        state.token = Some("t".to_string());
        assert_eq!(state.phase(), SessionPhase::Authenticated);
        assert!(state.is_authenticated());
        assert_eq!(state.role(), Some(Role::Unset));
    }

    #[test]
    fn test_restore_counts_token_without_user() {
        let storage = MemoryStorage::new();
        storage.set(keys::ACCESS_TOKEN, "a1").unwrap();
        storage.set(keys::USER, "garbage").unwrap();

        let state = SessionState::restore(&storage);
        assert!(state.is_authenticated());
        assert_eq!(state.user, None);
        assert!(!state.loading);
        assert!(!state.otp_sent);
    }

    #[test]
    fn test_restore_empty_storage_is_anonymous() {
        let state = SessionState::restore(&MemoryStorage::new());
        assert_eq!(state, SessionState::default());
    }
}

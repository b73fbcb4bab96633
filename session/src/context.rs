//! Session context.
//!
//! The one session instance an application owns. Views receive it
//! explicitly; nothing reaches for a global.

use crate::actions::SessionAction;
use crate::environment::SessionEnvironment;
use crate::reducer::SessionReducer;
use crate::routing::{Route, landing_route};
use crate::state::SessionState;
use crate::storage::SessionStorage;
use expohub_client::{AuthApi, Role};
use expohub_core::environment::Clock;
use expohub_runtime::Store;
use expohub_runtime::error::StoreError;
use std::sync::Arc;
use tokio::sync::broadcast;

type SessionStore<A, S> =
    Store<SessionState, SessionAction, SessionEnvironment<A, S>, SessionReducer<A, S>>;

/// Owns the session store and exposes one awaitable method per operation.
///
/// Each method dispatches its action, waits for the effects it started
/// (including the fed-back result) and returns the settled state.
pub struct SessionContext<A, S>
where
    A: AuthApi + 'static,
    S: SessionStorage,
{
    store: SessionStore<A, S>,
}

impl<A, S> SessionContext<A, S>
where
    A: AuthApi + 'static,
    S: SessionStorage,
{
    /// Create a context seeded from persisted storage.
    #[must_use]
    pub fn new(api: Arc<A>, storage: S) -> Self {
        Self::with_environment(SessionEnvironment::new(api, storage))
    }

    /// Create a context with a custom clock.
    #[must_use]
    pub fn with_clock(api: Arc<A>, storage: S, clock: Arc<dyn Clock>) -> Self {
        Self::with_environment(SessionEnvironment::new(api, storage).with_clock(clock))
    }

    fn with_environment(environment: SessionEnvironment<A, S>) -> Self {
        let initial = SessionState::restore(&environment.storage);
        tracing::debug!(
            authenticated = initial.is_authenticated(),
            "Session restored"
        );
        Self {
            store: Store::new(initial, SessionReducer::new(), environment),
        }
    }

    /// Storage backing this session.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.store.environment().storage
    }

    /// Read-only copy of the current state.
    pub async fn snapshot(&self) -> SessionState {
        self.store.state(Clone::clone).await
    }

    /// Where the current session should land.
    pub async fn next_route(&self) -> Route {
        self.store.state(landing_route).await
    }

    /// Result actions as they are fed back.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionAction> {
        self.store.subscribe_actions()
    }

    /// Dispatch an action and wait for it to settle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`SessionContext::shutdown`].
    pub async fn dispatch(&self, action: SessionAction) -> Result<SessionState, StoreError> {
        let mut handle = self.store.send(action).await?;
        handle.wait().await;
        Ok(self.snapshot().await)
    }

    /// Request an OTP for `phone_number`.
    ///
    /// # Errors
    ///
    /// Only fails if the context is shutting down; backend errors land in
    /// [`SessionState::error`].
    pub async fn send_otp(&self, phone_number: &str) -> Result<SessionState, StoreError> {
        self.dispatch(SessionAction::SendOtp {
            phone_number: phone_number.to_string(),
        })
        .await
    }

    /// Verify an OTP.
    ///
    /// # Errors
    ///
    /// Only fails if the context is shutting down.
    pub async fn verify_otp(
        &self,
        phone_number: &str,
        otp: &str,
    ) -> Result<SessionState, StoreError> {
        self.dispatch(SessionAction::VerifyOtp {
            phone_number: phone_number.to_string(),
            otp: otp.to_string(),
        })
        .await
    }

    /// Admin login.
    ///
    /// # Errors
    ///
    /// Only fails if the context is shutting down.
    pub async fn login_admin(&self, email: &str, password: &str) -> Result<SessionState, StoreError> {
        self.dispatch(SessionAction::LoginAdmin {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
    }

    /// Google login with a provider access token.
    ///
    /// # Errors
    ///
    /// Only fails if the context is shutting down.
    pub async fn login_with_google(&self, access_token: &str) -> Result<SessionState, StoreError> {
        self.dispatch(SessionAction::LoginWithGoogle {
            access_token: access_token.to_string(),
        })
        .await
    }

    /// Confirm the user's role.
    ///
    /// # Errors
    ///
    /// Only fails if the context is shutting down.
    pub async fn select_role(&self, role: Role) -> Result<SessionState, StoreError> {
        self.dispatch(SessionAction::SelectRole { role }).await
    }

    /// Abandon an outstanding OTP.
    ///
    /// # Errors
    ///
    /// Only fails if the context is shutting down.
    pub async fn cancel_otp(&self) -> Result<SessionState, StoreError> {
        self.dispatch(SessionAction::CancelOtp).await
    }

    /// End the session and clear persisted storage.
    ///
    /// # Errors
    ///
    /// Only fails if the context is shutting down.
    pub async fn logout(&self) -> Result<SessionState, StoreError> {
        self.dispatch(SessionAction::Logout).await
    }

    /// Clear the last error.
    ///
    /// # Errors
    ///
    /// Only fails if the context is shutting down.
    pub async fn reset_error(&self) -> Result<SessionState, StoreError> {
        self.dispatch(SessionAction::ResetError).await
    }

    /// Stop accepting actions and wait for in-flight effects.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects are still running
    /// after `timeout`.
    pub async fn shutdown(&self, timeout: std::time::Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }
}

impl<A, S> Clone for SessionContext<A, S>
where
    A: AuthApi + 'static,
    S: SessionStorage,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<A, S> std::fmt::Debug for SessionContext<A, S>
where
    A: AuthApi + 'static,
    S: SessionStorage,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext").finish_non_exhaustive()
    }
}

//! Session reducer.
//!
//! # Flow
//!
//! 1. A command sets `loading` and clears `error` (pending)
//! 2. The returned effect calls the backend
//! 3. On success the effect persists the session, then feeds back the
//!    fulfilled action; a storage failure is reported as the rejected action
//! 4. The result action clears `loading` and applies its fields
//!
//! `Logout`, `CancelOtp` and `ResetError` are synchronous.

use crate::actions::{LoginMethod, SessionAction};
use crate::environment::SessionEnvironment;
use crate::state::SessionState;
use crate::storage::{PersistedSession, SessionStorage};
use expohub_client::{ApiError, AuthApi, AuthResponse};
use expohub_core::effect::Effect;
use expohub_core::reducer::Reducer;
use expohub_core::{SmallVec, async_effect, smallvec};
use std::marker::PhantomData;
use std::sync::Arc;

/// Session reducer.
pub struct SessionReducer<A, S> {
    _phantom: PhantomData<fn() -> (A, S)>,
}

impl<A, S> SessionReducer<A, S> {
    /// Create a new session reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<A, S> Default for SessionReducer<A, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, S> Clone for SessionReducer<A, S> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<A, S> std::fmt::Debug for SessionReducer<A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionReducer")
    }
}

/// Turn a login result into the action fed back to the reducer, persisting
/// the session first.
fn settle_login<S: SessionStorage>(
    storage: &S,
    method: LoginMethod,
    result: Result<AuthResponse, ApiError>,
) -> SessionAction {
    let auth = match result {
        Ok(auth) => auth,
        Err(error) => {
            tracing::info!(?method, %error, "Login rejected");
            return SessionAction::LoginFailed {
                method,
                error: error.to_string(),
            };
        },
    };

    match PersistedSession::save(storage, &auth) {
        Ok(()) => SessionAction::LoginSucceeded { method, auth },
        Err(error) => {
            tracing::error!(?method, %error, "Could not persist session");
            SessionAction::LoginFailed {
                method,
                error: error.to_string(),
            }
        },
    }
}

impl<A, S> Reducer for SessionReducer<A, S>
where
    A: AuthApi + 'static,
    S: SessionStorage,
{
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment<A, S>;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // OTP
            // ═══════════════════════════════════════════════════════════════
            SessionAction::SendOtp { phone_number } => {
                state.begin();
                let api = Arc::clone(&env.api);

                smallvec![async_effect! {
                    match api.send_otp(&phone_number).await {
                        Ok(()) => Some(SessionAction::OtpSent),
                        Err(error) => Some(SessionAction::OtpSendFailed {
                            error: error.to_string(),
                        }),
                    }
                }]
            },

            SessionAction::OtpSent => {
                state.loading = false;
                state.otp_sent = true;
                smallvec![Effect::None]
            },

            SessionAction::OtpSendFailed { error } => {
                state.fail(error);
                smallvec![Effect::None]
            },

            SessionAction::VerifyOtp { phone_number, otp } => {
                state.begin();
                let api = Arc::clone(&env.api);
                let storage = env.storage.clone();

                smallvec![async_effect! {
                    let result = api.verify_otp(&phone_number, &otp).await;
                    Some(settle_login(&storage, LoginMethod::Otp, result))
                }]
            },

            SessionAction::CancelOtp => {
                state.otp_sent = false;
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Other login paths
            // ═══════════════════════════════════════════════════════════════
            SessionAction::LoginAdmin { email, password } => {
                state.begin();
                let api = Arc::clone(&env.api);
                let storage = env.storage.clone();

                smallvec![async_effect! {
                    let result = api.login_admin(&email, &password).await;
                    Some(settle_login(&storage, LoginMethod::Admin, result))
                }]
            },

            SessionAction::LoginWithGoogle { access_token } => {
                state.begin();
                let api = Arc::clone(&env.api);
                let storage = env.storage.clone();

                smallvec![async_effect! {
                    let result = api.login_google(&access_token).await;
                    Some(settle_login(&storage, LoginMethod::Google, result))
                }]
            },

            SessionAction::LoginSucceeded { method, auth } => {
                tracing::info!(?method, role = %auth.user.role, "Signed in");
                state.loading = false;
                state.token = Some(auth.access);
                state.refresh_token = Some(auth.refresh).filter(|r| !r.is_empty());
                state.user = Some(auth.user);
                state.signed_in_at = Some(env.clock.now());
                if method == LoginMethod::Otp {
                    state.otp_sent = false;
                }
                smallvec![Effect::None]
            },

            SessionAction::LoginFailed { error, .. } => {
                state.fail(error);
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Role selection
            // ═══════════════════════════════════════════════════════════════
            SessionAction::SelectRole { role } => {
                state.begin();
                let api = Arc::clone(&env.api);
                let storage = env.storage.clone();

                smallvec![async_effect! {
                    let mut user = match api.update_role(role).await {
                        Ok(user) => user,
                        Err(error) => {
                            return Some(SessionAction::RoleSelectionFailed {
                                error: error.to_string(),
                            });
                        },
                    };
                    // The choice is made; a backend that omits the flag
                    // must not send the user back to role selection.
                    user.role_selected = Some(true);
                    match PersistedSession::save_user(&storage, &user) {
                        Ok(()) => Some(SessionAction::RoleSelected { user }),
                        Err(error) => Some(SessionAction::RoleSelectionFailed {
                            error: error.to_string(),
                        }),
                    }
                }]
            },

            SessionAction::RoleSelected { user } => {
                tracing::info!(role = %user.role, "Role selected");
                state.loading = false;
                state.user = Some(user);
                smallvec![Effect::None]
            },

            SessionAction::RoleSelectionFailed { error } => {
                state.fail(error);
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Logout / errors
            // ═══════════════════════════════════════════════════════════════
            SessionAction::Logout => {
                state.sign_out();
                let storage = env.storage.clone();

                smallvec![async_effect! {
                    if let Err(error) = PersistedSession::clear(&storage) {
                        tracing::warn!(%error, "Could not clear persisted session");
                    }
                    None
                }]
            },

            SessionAction::ResetError => {
                state.error = None;
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use expohub_client::{Role, UserIdentity};
    use expohub_core::environment::Clock;
    use expohub_testing::{ReducerTest, assertions, test_clock};
    use std::future::Future;

    /// Never called: these tests only reduce result actions by hand.
    struct UnusedApi;

    impl AuthApi for UnusedApi {
        fn send_otp(&self, _: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
            async { Err(ApiError::Request("unused".to_string())) }
        }
        fn verify_otp(
            &self,
            _: &str,
            _: &str,
        ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
            async { Err(ApiError::Request("unused".to_string())) }
        }
        fn login_admin(
            &self,
            _: &str,
            _: &str,
        ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
            async { Err(ApiError::Request("unused".to_string())) }
        }
        fn login_google(
            &self,
            _: &str,
        ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
            async { Err(ApiError::Request("unused".to_string())) }
        }
        fn update_role(
            &self,
            _: Role,
        ) -> impl Future<Output = Result<UserIdentity, ApiError>> + Send {
            async { Err(ApiError::Request("unused".to_string())) }
        }
    }

    type TestReducer = SessionReducer<UnusedApi, MemoryStorage>;

    fn env() -> SessionEnvironment<UnusedApi, MemoryStorage> {
        SessionEnvironment::new(Arc::new(UnusedApi), MemoryStorage::new())
            .with_clock(Arc::new(test_clock()))
    }

    fn visitor_auth() -> AuthResponse {
        AuthResponse {
            user: UserIdentity {
                id: Some(4),
                role: Role::Visitor,
                phone_number: Some("+911234567890".to_string()),
                ..UserIdentity::default()
            },
            access: "access-1".to_string(),
            refresh: "refresh-1".to_string(),
        }
    }

    #[test]
    fn test_send_otp_is_pending() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(SessionState {
                error: Some("old".to_string()),
                ..SessionState::default()
            })
            .when_action(SessionAction::SendOtp {
                phone_number: "+911234567890".to_string(),
            })
            .then_state(|state| {
                assert!(state.loading);
                assert_eq!(state.error, None);
                assert!(!state.otp_sent);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_otp_sent_sets_flag() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(SessionState::default())
            .when_actions([
                SessionAction::SendOtp {
                    phone_number: "+911234567890".to_string(),
                },
                SessionAction::OtpSent,
            ])
            .then_state(|state| {
                assert!(!state.loading);
                assert!(state.otp_sent);
                assert_eq!(state.phase(), crate::SessionPhase::OtpPending);
            })
            .run();
    }

    #[test]
    fn test_wrong_code_keeps_otp_pending() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(SessionState {
                otp_sent: true,
                ..SessionState::default()
            })
            .when_actions([
                SessionAction::VerifyOtp {
                    phone_number: "+911234567890".to_string(),
                    otp: "000000".to_string(),
                },
                SessionAction::LoginFailed {
                    method: LoginMethod::Otp,
                    error: "Invalid OTP".to_string(),
                },
            ])
            .then_state(|state| {
                assert!(!state.loading);
                assert!(state.otp_sent);
                assert!(!state.is_authenticated());
                assert_eq!(state.error.as_deref(), Some("Invalid OTP"));
            })
            .run();
    }

    #[test]
    fn test_otp_login_consumes_otp() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(SessionState {
                otp_sent: true,
                loading: true,
                ..SessionState::default()
            })
            .when_action(SessionAction::LoginSucceeded {
                method: LoginMethod::Otp,
                auth: visitor_auth(),
            })
            .then_state(|state| {
                assert!(state.is_authenticated());
                assert!(!state.otp_sent);
                assert!(!state.loading);
                assert_eq!(state.token.as_deref(), Some("access-1"));
                assert_eq!(state.refresh_token.as_deref(), Some("refresh-1"));
                assert_eq!(state.signed_in_at, Some(test_clock().now()));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_logout_clears_everything() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(SessionState {
                user: Some(visitor_auth().user),
                token: Some("access-1".to_string()),
                refresh_token: Some("refresh-1".to_string()),
                error: Some("stale".to_string()),
                ..SessionState::default()
            })
            .when_action(SessionAction::Logout)
            .then_state(|state| {
                assert_eq!(*state, SessionState::default());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_cancel_otp() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(SessionState {
                otp_sent: true,
                ..SessionState::default()
            })
            .when_action(SessionAction::CancelOtp)
            .then_state(|state| assert_eq!(state.phase(), crate::SessionPhase::Anonymous))
            .run();
    }

    #[test]
    fn test_role_selected_replaces_user() {
        let mut exhibitor = visitor_auth().user;
        exhibitor.role = Role::Exhibitor;
        exhibitor.role_selected = Some(true);

        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(SessionState {
                user: Some(visitor_auth().user),
                token: Some("access-1".to_string()),
                ..SessionState::default()
            })
            .when_actions([
                SessionAction::SelectRole {
                    role: Role::Exhibitor,
                },
                SessionAction::RoleSelected {
                    user: exhibitor.clone(),
                },
            ])
            .then_state(move |state| {
                assert!(!state.loading);
                assert_eq!(state.user.as_ref(), Some(&exhibitor));
            })
            .run();
    }

    #[test]
    fn test_settle_login_persists_before_success() {
        let storage = MemoryStorage::new();
        let action = settle_login(&storage, LoginMethod::Admin, Ok(visitor_auth()));
        assert!(matches!(action, SessionAction::LoginSucceeded { .. }));

        let persisted = PersistedSession::load(&storage).unwrap();
        assert_eq!(persisted.token.as_deref(), Some("access-1"));
    }

    #[test]
    fn test_settle_login_error_leaves_storage_alone() {
        let storage = MemoryStorage::new();
        let action = settle_login(
            &storage,
            LoginMethod::Google,
            Err(ApiError::Status {
                status: 400,
                message: "Invalid token".to_string(),
            }),
        );
        assert_eq!(
            action,
            SessionAction::LoginFailed {
                method: LoginMethod::Google,
                error: "Invalid token".to_string()
            }
        );
        assert!(storage.is_empty());
    }
}

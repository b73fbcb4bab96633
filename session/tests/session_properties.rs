//! Property tests for session invariants that must hold from any state.

#![allow(clippy::unwrap_used)]

use expohub_client::{ApiError, AuthApi, AuthResponse, Role, UserIdentity};
use expohub_core::reducer::Reducer;
use expohub_session::{
    MemoryStorage, Route, RouteGuard, SessionAction, SessionEnvironment, SessionReducer,
    SessionState,
};
use proptest::prelude::*;
use std::future::Future;
use std::sync::Arc;

struct OfflineApi;

fn offline<T>() -> impl Future<Output = Result<T, ApiError>> + Send {
    async { Err(ApiError::Request("offline".to_string())) }
}

impl AuthApi for OfflineApi {
    fn send_otp(&self, _: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
        offline()
    }
    fn verify_otp(
        &self,
        _: &str,
        _: &str,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
        offline()
    }
    fn login_admin(
        &self,
        _: &str,
        _: &str,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
        offline()
    }
    fn login_google(&self, _: &str) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
        offline()
    }
    fn update_role(&self, _: Role) -> impl Future<Output = Result<UserIdentity, ApiError>> + Send {
        offline()
    }
}

fn role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Admin),
        Just(Role::Exhibitor),
        Just(Role::Visitor),
        Just(Role::Unset),
    ]
}

fn user() -> impl Strategy<Value = UserIdentity> {
    (role(), proptest::option::of(any::<bool>()), proptest::option::of(1_i64..1000)).prop_map(
        |(role, role_selected, id)| UserIdentity {
            id,
            role,
            role_selected,
            ..UserIdentity::default()
        },
    )
}

fn session_state() -> impl Strategy<Value = SessionState> {
    (
        proptest::option::of(user()),
        proptest::option::of("[a-z0-9]{1,16}"),
        proptest::option::of("[a-z0-9]{1,16}"),
        any::<bool>(),
        proptest::option::of("[ -~]{0,24}"),
        any::<bool>(),
    )
        .prop_map(
            |(user, token, refresh_token, loading, error, otp_sent)| SessionState {
                user,
                token,
                refresh_token,
                loading,
                error,
                otp_sent,
                signed_in_at: None,
            },
        )
}

fn reduce(state: &mut SessionState, action: SessionAction) {
    let env = SessionEnvironment::new(Arc::new(OfflineApi), MemoryStorage::new());
    let _effects = SessionReducer::<OfflineApi, MemoryStorage>::new().reduce(state, action, &env);
}

proptest! {
    #[test]
    fn reset_error_touches_only_error(initial in session_state()) {
        let mut state = initial.clone();
        reduce(&mut state, SessionAction::ResetError);

        prop_assert_eq!(state.is_authenticated(), initial.is_authenticated());
        prop_assert_eq!(state.loading, initial.loading);
        prop_assert_eq!(state.otp_sent, initial.otp_sent);
        prop_assert_eq!(state.user, initial.user);
        prop_assert_eq!(state.error, None);
    }

    #[test]
    fn logout_always_signs_out(initial in session_state()) {
        let mut state = initial;
        reduce(&mut state, SessionAction::Logout);

        prop_assert!(!state.is_authenticated());
        prop_assert!(!state.loading);
        prop_assert_eq!(RouteGuard::resolve(&state, Route::Dashboard), Route::Login);
        prop_assert_eq!(state.user, None);
        prop_assert_eq!(state.refresh_token, None);
    }

    #[test]
    fn pending_phase_clears_error(initial in session_state(), phone in "\\+[0-9]{6,12}") {
        let mut state = initial.clone();
        reduce(&mut state, SessionAction::SendOtp { phone_number: phone });

        prop_assert!(state.loading);
        prop_assert_eq!(state.error, None);
        prop_assert_eq!(state.token, initial.token);
    }

    #[test]
    fn guard_never_shows_protected_routes_anonymously(
        initial in session_state(),
        index in 0..Route::ALL.len(),
    ) {
        let mut state = initial;
        state.token = None;
        let route = Route::ALL[index];
        let shown = RouteGuard::resolve(&state, route);

        prop_assert!(shown.is_public());
    }
}

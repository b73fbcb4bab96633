//! Session actions.

use expohub_client::{AuthResponse, Role, UserIdentity};

/// Which login path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginMethod {
    /// Phone number plus one-time password.
    Otp,
    /// Admin email and password.
    Admin,
    /// Google OAuth token exchange.
    Google,
}

/// Session action.
///
/// Commands carry user intent; the remaining variants are the fulfilled and
/// rejected results fed back by effects. Every asynchronous command moves the
/// session through pending (`loading`), then exactly one result.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Commands
    // ═══════════════════════════════════════════════════════════════════════
    /// Ask the backend to send an OTP. No local validation.
    SendOtp {
        /// Phone number in the backend's expected format.
        phone_number: String,
    },

    /// Verify an OTP. Accepted in any phase.
    VerifyOtp {
        /// Phone number the OTP was sent to.
        phone_number: String,
        /// Code the user entered.
        otp: String,
    },

    /// Admin login.
    LoginAdmin {
        /// Admin email.
        email: String,
        /// Admin password.
        password: String,
    },

    /// Exchange an OAuth provider access token for a session.
    LoginWithGoogle {
        /// Provider access token.
        access_token: String,
    },

    /// Confirm the role of the signed-in user.
    SelectRole {
        /// Chosen role.
        role: Role,
    },

    /// Abandon an outstanding OTP and return to phone entry.
    CancelOtp,

    /// End the session. Always succeeds.
    Logout,

    /// Clear the last error.
    ResetError,

    // ═══════════════════════════════════════════════════════════════════════
    // Results
    // ═══════════════════════════════════════════════════════════════════════
    /// OTP was sent.
    OtpSent,

    /// OTP could not be sent.
    OtpSendFailed {
        /// Backend or transport message.
        error: String,
    },

    /// Login succeeded and the session was persisted.
    LoginSucceeded {
        /// Login path.
        method: LoginMethod,
        /// Identity and tokens.
        auth: AuthResponse,
    },

    /// Login failed (including a failure to persist the session).
    LoginFailed {
        /// Login path.
        method: LoginMethod,
        /// Backend, transport or storage message.
        error: String,
    },

    /// Role update succeeded and the new identity was persisted.
    RoleSelected {
        /// Identity with the new role.
        user: UserIdentity,
    },

    /// Role update failed.
    RoleSelectionFailed {
        /// Backend, transport or storage message.
        error: String,
    },
}

impl SessionAction {
    /// Whether this action ends an asynchronous command.
    #[must_use]
    pub const fn is_result(&self) -> bool {
        matches!(
            self,
            Self::OtpSent
                | Self::OtpSendFailed { .. }
                | Self::LoginSucceeded { .. }
                | Self::LoginFailed { .. }
                | Self::RoleSelected { .. }
                | Self::RoleSelectionFailed { .. }
        )
    }
}

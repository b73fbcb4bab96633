//! Routes, the post-login routing policy and the route guard.

use crate::state::SessionState;
use expohub_client::{Role, UserIdentity};
use std::fmt;

/// A navigable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Phone/OTP and Google login.
    Login,
    /// Admin email/password login.
    AdminLogin,
    /// First-login role choice.
    RoleSelection,
    /// Role-specific landing page.
    Dashboard,
    /// Admin exhibition management.
    Management,
    /// Admin QR ticket scanner.
    Scanner,
    /// Exhibitor applications and properties.
    ExhibitorPanel,
    /// Visitor registrations and tickets.
    VisitorPanel,
}

impl Route {
    /// Every route.
    pub const ALL: [Self; 8] = [
        Self::Login,
        Self::AdminLogin,
        Self::RoleSelection,
        Self::Dashboard,
        Self::Management,
        Self::Scanner,
        Self::ExhibitorPanel,
        Self::VisitorPanel,
    ];

    /// URL path of the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::AdminLogin => "/admin/login",
            Self::RoleSelection => "/select-role",
            Self::Dashboard => "/dashboard",
            Self::Management => "/admin",
            Self::Scanner => "/admin/scan",
            Self::ExhibitorPanel => "/exhibitor",
            Self::VisitorPanel => "/visitor",
        }
    }

    /// Resolve a path. Trailing slashes are ignored and `/` maps to the
    /// dashboard.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Some(Self::Dashboard);
        }
        let normalized = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        Self::ALL.into_iter().find(|route| route.path() == normalized)
    }

    /// Reachable without a session.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::AdminLogin)
    }

    /// Role a user must hold to open the route, if any.
    #[must_use]
    pub const fn required_role(self) -> Option<Role> {
        match self {
            Self::Management | Self::Scanner => Some(Role::Admin),
            Self::ExhibitorPanel => Some(Role::Exhibitor),
            Self::VisitorPanel => Some(Role::Visitor),
            Self::Login | Self::AdminLogin | Self::RoleSelection | Self::Dashboard => None,
        }
    }

    /// Panel the dashboard shows for a role.
    #[must_use]
    pub const fn panel_for(role: Role) -> Option<Self> {
        match role {
            Role::Admin => Some(Self::Management),
            Role::Exhibitor => Some(Self::ExhibitorPanel),
            Role::Visitor => Some(Self::VisitorPanel),
            Role::Unset => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Where to send a user after any successful authentication.
///
/// Admins go to management. A user with no role goes to role selection, and
/// so does a visitor unless `role_selected` is explicitly `true`: `VISITOR`
/// is the role every OTP sign-up starts with. Everyone else lands on the
/// dashboard.
#[must_use]
pub fn next_route_for(user: &UserIdentity) -> Route {
    match user.role {
        Role::Admin => Route::Management,
        Role::Unset => Route::RoleSelection,
        Role::Visitor if user.role_selected != Some(true) => Route::RoleSelection,
        Role::Visitor | Role::Exhibitor => Route::Dashboard,
    }
}

/// Landing route for a session: login when anonymous, otherwise
/// [`next_route_for`] the current identity.
#[must_use]
pub fn landing_route(state: &SessionState) -> Route {
    if !state.is_authenticated() {
        return Route::Login;
    }
    state
        .user
        .as_ref()
        .map_or(Route::RoleSelection, next_route_for)
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the requested route.
    Allow,
    /// Show this route instead.
    Redirect(Route),
}

/// Gate in front of every route.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    /// Most redirects [`RouteGuard::resolve`] follows.
    const MAX_HOPS: usize = 4;

    /// Decide whether `route` may be shown for `state`.
    #[must_use]
    pub fn check(state: &SessionState, route: Route) -> GuardDecision {
        if route.is_public() {
            return if state.is_authenticated() {
                GuardDecision::Redirect(landing_route(state))
            } else {
                GuardDecision::Allow
            };
        }

        if !state.is_authenticated() {
            return GuardDecision::Redirect(Route::Login);
        }

        match route.required_role() {
            Some(required) if state.role() != Some(required) => {
                let landing = landing_route(state);
                if landing == route {
                    GuardDecision::Allow
                } else {
                    GuardDecision::Redirect(landing)
                }
            },
            _ => GuardDecision::Allow,
        }
    }

    /// Follow redirects until a route is allowed.
    #[must_use]
    pub fn resolve(state: &SessionState, route: Route) -> Route {
        let mut current = route;
        for _ in 0..Self::MAX_HOPS {
            match Self::check(state, current) {
                GuardDecision::Allow => return current,
                GuardDecision::Redirect(next) => current = next,
            }
        }
        tracing::warn!(requested = %route, reached = %current, "Guard redirect loop");
        current
    }
}

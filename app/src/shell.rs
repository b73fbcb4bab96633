//! Route resolution for the command-line shell.

use expohub_session::{Route, RouteGuard, SessionState, landing_route};
use std::fmt;
use thiserror::Error;

/// Navigation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// The path names no known view.
    #[error("No view at {0}")]
    UnknownRoute(String),
}

/// Result of navigating to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    /// Route the path resolved to.
    pub requested: Route,
    /// Route the guard let through.
    pub shown: Route,
    /// Role panel rendered inside the dashboard, if any.
    pub panel: Option<Route>,
}

impl Navigation {
    /// Whether the guard redirected away from the requested route.
    #[must_use]
    pub fn redirected(&self) -> bool {
        self.requested != self.shown
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.redirected() {
            write!(f, "{} -> {}", self.requested, self.shown)?;
        } else {
            write!(f, "{}", self.shown)?;
        }
        if let Some(panel) = self.panel {
            write!(f, " ({panel})")?;
        }
        Ok(())
    }
}

/// Maps paths to the views a session may see.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shell;

impl Shell {
    /// Navigate to `path` with the given session.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::UnknownRoute`] if the path names no view.
    pub fn navigate(state: &SessionState, path: &str) -> Result<Navigation, ShellError> {
        let requested =
            Route::from_path(path).ok_or_else(|| ShellError::UnknownRoute(path.to_string()))?;
        Ok(Self::open(state, requested))
    }

    /// Open `requested` through the guard.
    #[must_use]
    pub fn open(state: &SessionState, requested: Route) -> Navigation {
        let shown = RouteGuard::resolve(state, requested);
        let panel = match shown {
            Route::Dashboard => state.role().and_then(Route::panel_for),
            _ => None,
        };
        tracing::debug!(%requested, %shown, "Navigated");
        Navigation {
            requested,
            shown,
            panel,
        }
    }

    /// Where the session should start.
    #[must_use]
    pub fn landing(state: &SessionState) -> Navigation {
        Self::open(state, landing_route(state))
    }
}

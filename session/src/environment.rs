//! Session environment.

use crate::storage::SessionStorage;
use expohub_client::AuthApi;
use expohub_core::environment::{Clock, SystemClock};
use std::sync::Arc;

/// Dependencies of the session reducer.
///
/// # Type Parameters
///
/// - `A`: Authentication API
/// - `S`: Session storage
pub struct SessionEnvironment<A, S> {
    /// Authentication API.
    pub api: Arc<A>,
    /// Durable session storage.
    pub storage: S,
    /// Time source for sign-in timestamps.
    pub clock: Arc<dyn Clock>,
}

impl<A: AuthApi, S: SessionStorage> SessionEnvironment<A, S> {
    /// Create an environment using the system clock.
    #[must_use]
    pub fn new(api: Arc<A>, storage: S) -> Self {
        Self {
            api,
            storage,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl<A, S: Clone> Clone for SessionEnvironment<A, S> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            storage: self.storage.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

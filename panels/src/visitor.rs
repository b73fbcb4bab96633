//! Visitor panel: registrations and QR tickets.

use crate::error::PanelError;
use crate::prompt::Prompt;
use expohub_client::{ApiClient, Exhibition, Registration};
use std::collections::HashSet;
use std::sync::Arc;

/// Visitor controller.
pub struct VisitorPanel {
    api: ApiClient,
    prompt: Arc<dyn Prompt>,
    events: Vec<Exhibition>,
    registrations: Vec<Registration>,
}

impl VisitorPanel {
    /// Create an empty panel. Call [`VisitorPanel::load`] to populate it.
    #[must_use]
    pub fn new(api: ApiClient, prompt: Arc<dyn Prompt>) -> Self {
        Self {
            api,
            prompt,
            events: Vec::new(),
            registrations: Vec::new(),
        }
    }

    /// All exhibitions as last fetched.
    #[must_use]
    pub fn events(&self) -> &[Exhibition] {
        &self.events
    }

    /// The visitor's registrations as last fetched.
    #[must_use]
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Exhibitions the visitor has not registered for yet.
    #[must_use]
    pub fn open_exhibitions(&self) -> Vec<&Exhibition> {
        let registered: HashSet<i64> = self.registrations.iter().map(|r| r.exhibition).collect();
        self.events
            .iter()
            .filter(|event| !registered.contains(&event.id))
            .collect()
    }

    /// QR token of the registration for an exhibition.
    #[must_use]
    pub fn ticket(&self, exhibition: i64) -> Option<&str> {
        self.registrations
            .iter()
            .find(|r| r.exhibition == exhibition)
            .map(|r| r.qr_token.as_str())
    }

    /// Fetch own registrations and exhibitions.
    pub async fn load(&mut self) {
        let (registrations, events) =
            tokio::join!(self.api.list_registrations(), self.api.list_events());

        match registrations {
            Ok(registrations) => self.registrations = registrations,
            Err(error) => tracing::warn!(%error, "Failed to load registrations"),
        }
        match events {
            Ok(events) => self.events = events,
            Err(error) => tracing::warn!(%error, "Failed to load exhibitions"),
        }
    }

    /// Register for an exhibition, then re-fetch registrations.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Api`] after alerting the operator.
    pub async fn register(&mut self, exhibition: i64) -> Result<Registration, PanelError> {
        let registration = self
            .api
            .register(exhibition)
            .await
            .map_err(|e| crate::alert_failure(self.prompt.as_ref(), "register", e))?;
        tracing::info!(exhibition, "Registered");

        match self.api.list_registrations().await {
            Ok(registrations) => self.registrations = registrations,
            Err(error) => tracing::warn!(%error, "Failed to load registrations"),
        }
        Ok(registration)
    }
}

impl std::fmt::Debug for VisitorPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisitorPanel")
            .field("events", &self.events.len())
            .field("registrations", &self.registrations.len())
            .finish_non_exhaustive()
    }
}

//! Exhibitor panel: booth applications and listed properties.

use crate::error::PanelError;
use crate::prompt::Prompt;
use expohub_client::{
    ApiClient, Application, BoothApplication, Exhibition, NewProperty, Property,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Exhibitor controller.
pub struct ExhibitorPanel {
    api: ApiClient,
    prompt: Arc<dyn Prompt>,
    events: Vec<Exhibition>,
    applications: Vec<Application>,
    open_application: Option<i64>,
    properties: Vec<Property>,
}

impl ExhibitorPanel {
    /// Create an empty panel. Call [`ExhibitorPanel::load`] to populate it.
    #[must_use]
    pub fn new(api: ApiClient, prompt: Arc<dyn Prompt>) -> Self {
        Self {
            api,
            prompt,
            events: Vec::new(),
            applications: Vec::new(),
            open_application: None,
            properties: Vec::new(),
        }
    }

    /// All exhibitions as last fetched.
    #[must_use]
    pub fn events(&self) -> &[Exhibition] {
        &self.events
    }

    /// The exhibitor's own applications as last fetched.
    #[must_use]
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Application whose properties are shown.
    #[must_use]
    pub const fn open_application(&self) -> Option<i64> {
        self.open_application
    }

    /// Properties of the open application as last fetched.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Applications properties may be listed under.
    #[must_use]
    pub fn approved_applications(&self) -> Vec<&Application> {
        self.applications.iter().filter(|a| a.is_approved()).collect()
    }

    /// Exhibitions the exhibitor has not applied to yet.
    #[must_use]
    pub fn open_exhibitions(&self) -> Vec<&Exhibition> {
        let applied: HashSet<i64> = self.applications.iter().map(|a| a.exhibition).collect();
        self.events
            .iter()
            .filter(|event| !applied.contains(&event.id))
            .collect()
    }

    /// Fetch own applications and exhibitions.
    pub async fn load(&mut self) {
        let (applications, events) =
            tokio::join!(self.api.list_applications(None), self.api.list_events());

        match applications {
            Ok(applications) => self.applications = applications,
            Err(error) => tracing::warn!(%error, "Failed to load applications"),
        }
        match events {
            Ok(events) => self.events = events,
            Err(error) => tracing::warn!(%error, "Failed to load exhibitions"),
        }
    }

    /// Fetch own applications only.
    pub async fn load_applications(&mut self) {
        match self.api.list_applications(None).await {
            Ok(applications) => self.applications = applications,
            Err(error) => tracing::warn!(%error, "Failed to load applications"),
        }
    }

    /// Submit a booth application, then re-fetch own applications.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Api`] after alerting the operator.
    pub async fn apply(&mut self, application: BoothApplication) -> Result<Application, PanelError> {
        let created = self
            .api
            .submit_application(application)
            .await
            .map_err(|e| crate::alert_failure(self.prompt.as_ref(), "submit application", e))?;
        tracing::info!(id = created.id, exhibition = created.exhibition, "Application submitted");
        self.load_applications().await;
        Ok(created)
    }

    /// Show the properties listed under an application.
    ///
    /// Only approved applications have properties; the check runs against
    /// the applications as last loaded.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::NotApproved`] after alerting the operator.
    pub async fn open_properties(&mut self, application: i64) -> Result<(), PanelError> {
        self.require_approved(application)?;
        self.open_application = Some(application);
        self.properties.clear();
        self.load_properties().await;
        Ok(())
    }

    fn require_approved(&self, application: i64) -> Result<(), PanelError> {
        let approved = self
            .applications
            .iter()
            .any(|a| a.id == application && a.is_approved());
        if approved {
            return Ok(());
        }
        let error = PanelError::NotApproved(application);
        tracing::warn!(application, "Refused property access");
        self.prompt.alert(&error.to_string());
        Err(error)
    }

    async fn load_properties(&mut self) {
        let Some(application) = self.open_application else {
            return;
        };
        match self.api.list_properties(application).await {
            Ok(properties) => self.properties = properties,
            Err(error) => tracing::warn!(%error, application, "Failed to load properties"),
        }
    }

    /// List a property under an approved application, then re-fetch the
    /// properties of that application.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::NotApproved`] without calling the backend when
    /// the application is not approved, or [`PanelError::Api`]; the operator
    /// is alerted either way.
    pub async fn add_property(&mut self, property: NewProperty) -> Result<Property, PanelError> {
        self.require_approved(property.exhibitor_application)?;
        let created = self
            .api
            .create_property(&property)
            .await
            .map_err(|e| crate::alert_failure(self.prompt.as_ref(), "add property", e))?;
        self.open_application = Some(property.exhibitor_application);
        self.load_properties().await;
        Ok(created)
    }

    /// Delete a property after confirmation, then re-fetch.
    ///
    /// Returns `false` when the operator declines.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Api`] after alerting the operator.
    pub async fn delete_property(&mut self, id: i64) -> Result<bool, PanelError> {
        if !self.prompt.confirm("Delete this property?") {
            return Ok(false);
        }
        self.api
            .delete_property(id)
            .await
            .map_err(|e| crate::alert_failure(self.prompt.as_ref(), "delete property", e))?;
        self.load_properties().await;
        Ok(true)
    }
}

impl std::fmt::Debug for ExhibitorPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExhibitorPanel")
            .field("events", &self.events.len())
            .field("applications", &self.applications.len())
            .field("open_application", &self.open_application)
            .finish_non_exhaustive()
    }
}

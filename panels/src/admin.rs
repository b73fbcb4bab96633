//! Admin panel: exhibitions, application review and ticket scanning.

use crate::error::PanelError;
use crate::prompt::Prompt;
use crate::scanner::{QrScanner, ScannerState};
use expohub_client::{ApiClient, Application, Exhibition, NewExhibition, ReviewAction};
use std::sync::Arc;

/// Admin controller.
///
/// Lists exhibitions, reviews the booth applications of the selected one
/// and owns the entrance scanner. Every mutation is followed by a fresh
/// fetch of the collection it touched.
pub struct AdminPanel {
    api: ApiClient,
    prompt: Arc<dyn Prompt>,
    events: Vec<Exhibition>,
    selected_event: Option<i64>,
    applications: Vec<Application>,
    scanner: QrScanner<ApiClient>,
}

impl AdminPanel {
    /// Create an empty panel. Call [`AdminPanel::load`] to populate it.
    #[must_use]
    pub fn new(api: ApiClient, prompt: Arc<dyn Prompt>) -> Self {
        let scanner = QrScanner::new(Arc::new(api.clone()));
        Self {
            api,
            prompt,
            events: Vec::new(),
            selected_event: None,
            applications: Vec::new(),
            scanner,
        }
    }

    /// Exhibitions as last fetched.
    #[must_use]
    pub fn events(&self) -> &[Exhibition] {
        &self.events
    }

    /// Exhibition whose applications are shown.
    #[must_use]
    pub const fn selected_event(&self) -> Option<i64> {
        self.selected_event
    }

    /// Applications of the selected exhibition as last fetched.
    #[must_use]
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Entrance scanner.
    #[must_use]
    pub const fn scanner(&self) -> &QrScanner<ApiClient> {
        &self.scanner
    }

    /// Verify a decoded ticket code at the entrance.
    ///
    /// Codes arriving while a result is shown are ignored until
    /// [`AdminPanel::resume_scanning`].
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Store`] if the scanner has shut down.
    pub async fn scan(&self, token: &str) -> Result<ScannerState, PanelError> {
        Ok(self.scanner.decoded(token).await?)
    }

    /// Dismiss the scan result and scan again.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Store`] if the scanner has shut down.
    pub async fn resume_scanning(&self) -> Result<ScannerState, PanelError> {
        Ok(self.scanner.resume().await?)
    }

    /// Fetch exhibitions. Failures are logged and the previous list kept.
    pub async fn load(&mut self) {
        match self.api.list_events().await {
            Ok(events) => self.events = events,
            Err(error) => tracing::warn!(%error, "Failed to load exhibitions"),
        }
    }

    /// Create an exhibition, then re-fetch the list.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Api`] after alerting the operator.
    pub async fn create_event(&mut self, event: NewExhibition) -> Result<Exhibition, PanelError> {
        let created = self
            .api
            .create_event(&event)
            .await
            .map_err(|e| crate::alert_failure(self.prompt.as_ref(), "create exhibition", e))?;
        tracing::info!(id = created.id, name = %created.name, "Exhibition created");
        self.load().await;
        Ok(created)
    }

    /// Delete an exhibition after confirmation, then re-fetch the list.
    ///
    /// Returns `false` when the operator declines.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Api`] after alerting the operator.
    pub async fn delete_event(&mut self, id: i64) -> Result<bool, PanelError> {
        if !self
            .prompt
            .confirm("Are you sure you want to delete this exhibition?")
        {
            return Ok(false);
        }

        self.api
            .delete_event(id)
            .await
            .map_err(|e| crate::alert_failure(self.prompt.as_ref(), "delete exhibition", e))?;

        if self.selected_event == Some(id) {
            self.selected_event = None;
            self.applications.clear();
        }
        self.load().await;
        Ok(true)
    }

    /// Show the applications of an exhibition.
    pub async fn select_event(&mut self, id: i64) {
        self.selected_event = Some(id);
        self.applications.clear();
        self.load_applications().await;
    }

    async fn load_applications(&mut self) {
        let Some(event) = self.selected_event else {
            return;
        };
        match self.api.list_applications(Some(event)).await {
            Ok(applications) => self.applications = applications,
            Err(error) => tracing::warn!(%error, event, "Failed to load applications"),
        }
    }

    /// Approve a pending application, optionally assigning a booth.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Api`] after alerting the operator.
    pub async fn approve(
        &mut self,
        application: i64,
        booth_number: Option<String>,
    ) -> Result<(), PanelError> {
        let booth_number = booth_number.filter(|booth| !booth.trim().is_empty());
        self.review(application, ReviewAction::Approve, booth_number.as_deref())
            .await
    }

    /// Reject a pending application.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Api`] after alerting the operator.
    pub async fn reject(&mut self, application: i64) -> Result<(), PanelError> {
        self.review(application, ReviewAction::Reject, None).await
    }

    async fn review(
        &mut self,
        application: i64,
        action: ReviewAction,
        booth_number: Option<&str>,
    ) -> Result<(), PanelError> {
        self.api
            .review_application(application, action, booth_number)
            .await
            .map_err(|e| crate::alert_failure(self.prompt.as_ref(), action.as_path(), e))?;
        tracing::info!(
            application,
            action = action.as_path(),
            booth = booth_number.unwrap_or("-"),
            "Application reviewed"
        );
        self.load_applications().await;
        Ok(())
    }
}

impl std::fmt::Debug for AdminPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminPanel")
            .field("events", &self.events.len())
            .field("selected_event", &self.selected_event)
            .field("applications", &self.applications.len())
            .finish_non_exhaustive()
    }
}

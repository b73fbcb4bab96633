//! Exhibition, application, property and registration endpoints.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{
    Application, BoothApplication, Exhibition, NewExhibition, NewProperty, Property,
    QrVerification, Registration, ReviewAction,
};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::json;

impl ApiClient {
    // ═══════════════════════════════════════════════════════════════════
    // Exhibitions
    // ═══════════════════════════════════════════════════════════════════

    /// `GET events/`
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn list_events(&self) -> Result<Vec<Exhibition>, ApiError> {
        Self::fetch_list(self.request(Method::GET, "events/")?).await
    }

    /// `POST events/`
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn create_event(&self, event: &NewExhibition) -> Result<Exhibition, ApiError> {
        Self::fetch_json(self.request(Method::POST, "events/")?.json(event)).await
    }

    /// `DELETE events/{id}/`
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn delete_event(&self, id: i64) -> Result<(), ApiError> {
        Self::fetch_empty(self.request(Method::DELETE, &format!("events/{id}/"))?).await
    }

    // ═══════════════════════════════════════════════════════════════════
    // Booth applications
    // ═══════════════════════════════════════════════════════════════════

    /// `GET exhibitor/applications/[?exhibition={id}]`
    ///
    /// Without a filter the backend scopes the list to the caller, which is
    /// how exhibitors fetch "my applications".
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn list_applications(
        &self,
        exhibition: Option<i64>,
    ) -> Result<Vec<Application>, ApiError> {
        let mut builder = self.request(Method::GET, "exhibitor/applications/")?;
        if let Some(exhibition) = exhibition {
            builder = builder.query(&[("exhibition", exhibition)]);
        }
        Self::fetch_list(builder).await
    }

    /// `POST exhibitor/applications/` as multipart form data
    ///
    /// Text fields go first, in form order; the screenshot part is added only
    /// when one was chosen.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn submit_application(
        &self,
        application: BoothApplication,
    ) -> Result<Application, ApiError> {
        let mut form = Form::new()
            .text("company_name", application.company_name)
            .text("council_area", application.council_area)
            .text("business_type", application.business_type)
            .text("contact_details", application.contact_details)
            .text("exhibition", application.exhibition.to_string());

        if let Some(screenshot) = application.payment_screenshot {
            let file = Part::bytes(screenshot.bytes)
                .file_name(screenshot.file_name)
                .mime_str(&screenshot.content_type)
                .map_err(|e| ApiError::Request(format!("Invalid attachment type: {e}")))?;
            form = form.part("payment_screenshot", file);
        }

        Self::fetch_json(
            self.request(Method::POST, "exhibitor/applications/")?
                .multipart(form),
        )
        .await
    }

    /// `POST exhibitor/applications/{id}/approve|reject/ {booth_number}`
    ///
    /// `booth_number` is sent as `null` when absent.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn review_application(
        &self,
        id: i64,
        action: ReviewAction,
        booth_number: Option<&str>,
    ) -> Result<(), ApiError> {
        let path = format!("exhibitor/applications/{id}/{}/", action.as_path());
        Self::fetch_empty(
            self.request(Method::POST, &path)?
                .json(&json!({ "booth_number": booth_number })),
        )
        .await
    }

    // ═══════════════════════════════════════════════════════════════════
    // Properties
    // ═══════════════════════════════════════════════════════════════════

    /// `GET exhibitor/properties/?exhibitor_application={id}`
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn list_properties(&self, application: i64) -> Result<Vec<Property>, ApiError> {
        let builder = self
            .request(Method::GET, "exhibitor/properties/")?
            .query(&[("exhibitor_application", application)]);
        Self::fetch_list(builder).await
    }

    /// `POST exhibitor/properties/`
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn create_property(&self, property: &NewProperty) -> Result<Property, ApiError> {
        Self::fetch_json(
            self.request(Method::POST, "exhibitor/properties/")?
                .json(property),
        )
        .await
    }

    /// `DELETE exhibitor/properties/{id}/`
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn delete_property(&self, id: i64) -> Result<(), ApiError> {
        Self::fetch_empty(self.request(Method::DELETE, &format!("exhibitor/properties/{id}/"))?)
            .await
    }

    // ═══════════════════════════════════════════════════════════════════
    // Registrations
    // ═══════════════════════════════════════════════════════════════════

    /// `GET visitor/registrations/` (the caller's registrations)
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn list_registrations(&self) -> Result<Vec<Registration>, ApiError> {
        Self::fetch_list(self.request(Method::GET, "visitor/registrations/")?).await
    }

    /// `POST visitor/registrations/ {exhibition}`
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn register(&self, exhibition: i64) -> Result<Registration, ApiError> {
        Self::fetch_json(
            self.request(Method::POST, "visitor/registrations/")?
                .json(&json!({ "exhibition": exhibition })),
        )
        .await
    }

    /// `POST visitor/registrations/verify-qr/ {qr_token}`
    ///
    /// # Errors
    ///
    /// An unknown or already-used token comes back as a `Status` error.
    pub async fn verify_qr(&self, qr_token: &str) -> Result<QrVerification, ApiError> {
        Self::fetch_json(
            self.request(Method::POST, "visitor/registrations/verify-qr/")?
                .json(&json!({ "qr_token": qr_token })),
        )
        .await
    }
}

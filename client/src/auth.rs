//! Authentication endpoints.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{AuthResponse, Role, RoleUpdateResponse, UserIdentity};
use reqwest::Method;
use serde_json::json;
use std::future::Future;

/// Authentication calls the session state machine depends on.
///
/// Implemented by [`ApiClient`]; tests substitute a scripted fake.
pub trait AuthApi: Send + Sync {
    /// `POST auth/send-otp/ {phone_number}`
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    fn send_otp(&self, phone_number: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST auth/verify-otp/ {phone_number, otp}`
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error (wrong code → `Status`).
    fn verify_otp(
        &self,
        phone_number: &str,
        otp: &str,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    /// `POST auth/login/ {email, password}` (admin path)
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    fn login_admin(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    /// `POST auth/google/ {token}`
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    fn login_google(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    /// `POST auth/update-role/ {role}`
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    fn update_role(&self, role: Role) -> impl Future<Output = Result<UserIdentity, ApiError>> + Send;
}

impl AuthApi for ApiClient {
    #[tracing::instrument(skip(self, phone_number))]
    async fn send_otp(&self, phone_number: &str) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "auth/send-otp/")?
            .json(&json!({ "phone_number": phone_number }));
        Self::fetch_empty(builder).await
    }

    #[tracing::instrument(skip(self, phone_number, otp))]
    async fn verify_otp(&self, phone_number: &str, otp: &str) -> Result<AuthResponse, ApiError> {
        let builder = self
            .request(Method::POST, "auth/verify-otp/")?
            .json(&json!({ "phone_number": phone_number, "otp": otp }));
        Self::fetch_json(builder).await
    }

    #[tracing::instrument(skip(self, email, password))]
    async fn login_admin(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let builder = self
            .request(Method::POST, "auth/login/")?
            .json(&json!({ "email": email, "password": password }));
        Self::fetch_json(builder).await
    }

    #[tracing::instrument(skip(self, access_token))]
    async fn login_google(&self, access_token: &str) -> Result<AuthResponse, ApiError> {
        let builder = self
            .request(Method::POST, "auth/google/")?
            .json(&json!({ "token": access_token }));
        Self::fetch_json(builder).await
    }

    #[tracing::instrument(skip(self))]
    async fn update_role(&self, role: Role) -> Result<UserIdentity, ApiError> {
        let builder = self
            .request(Method::POST, "auth/update-role/")?
            .json(&json!({ "role": role }));
        let response: RoleUpdateResponse = Self::fetch_json(builder).await?;
        Ok(response.user)
    }
}

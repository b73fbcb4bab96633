//! # ExpoHub Client
//!
//! HTTP client and wire models for the ExpoHub backend.
//!
//! The backend owns every resource (exhibitions, booth applications,
//! properties, registrations) and all authorization. This crate only speaks
//! its REST contract:
//!
//! ```text
//! POST auth/send-otp/ | auth/verify-otp/ | auth/login/ | auth/google/ | auth/update-role/
//! GET/POST events/, DELETE events/{id}/
//! GET/POST exhibitor/applications/, POST exhibitor/applications/{id}/approve|reject/
//! GET/POST exhibitor/properties/, DELETE exhibitor/properties/{id}/
//! GET/POST visitor/registrations/, POST visitor/registrations/verify-qr/
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use expohub_client::ApiClient;
//!
//! # async fn example() -> Result<(), expohub_client::ApiError> {
//! let client = ApiClient::new("http://localhost:8000/api/")?;
//! for event in client.list_events().await? {
//!     println!("{} ({}, {})", event.name, event.venue_name, event.city);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
mod resources;

pub use auth::AuthApi;
pub use client::{ApiClient, NoCredentials, TokenSource};
pub use error::ApiError;
pub use reqwest::Url;
pub use models::{
    Application, ApplicationStatus, Attachment, AuthResponse, BoothApplication,
    DEFAULT_BOOTH_CAPACITY, DEFAULT_BUSINESS_TYPE, Exhibition, ExhibitionDetails, NewExhibition,
    NewProperty, Page, Property, QrVerification, Registration, ReviewAction, Role,
    UNNAMED_TICKET, UserIdentity,
};

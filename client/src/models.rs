//! Wire models shared with the backend.
//!
//! Resources are owned by the backend; the client only holds request-scoped
//! copies, so these types carry no invariants beyond what deserialization
//! enforces.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

// ═══════════════════════════════════════════════════════════════════════
// Identity
// ═══════════════════════════════════════════════════════════════════════

/// Role of an authenticated user.
///
/// Determines which panel and API scope the user sees. `Unset` covers a
/// missing, null, empty or unknown role on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Manages exhibitions and reviews applications.
    Admin,
    /// Applies for booths and lists properties.
    Exhibitor,
    /// Registers for exhibitions and holds QR tickets.
    Visitor,
    /// No role chosen yet.
    #[default]
    Unset,
}

impl Role {
    /// Wire representation (`None` for [`Role::Unset`]).
    #[must_use]
    pub const fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::Admin => Some("ADMIN"),
            Self::Exhibitor => Some("EXHIBITOR"),
            Self::Visitor => Some("VISITOR"),
            Self::Unset => None,
        }
    }

    /// Parse a role name, case-insensitively. Unknown names map to `Unset`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Self::Admin,
            "EXHIBITOR" => Self::Exhibitor,
            "VISITOR" => Self::Visitor,
            _ => Self::Unset,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("UNSET"))
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().map_or(Self::Unset, Self::parse))
    }
}

/// The authenticated user as the backend describes it.
///
/// Fields the client does not interpret are kept in `extra` so the identity
/// survives a persist/restore round trip unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Backend user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Current role.
    #[serde(default)]
    pub role: Role,

    /// Phone number (OTP users).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// Email (admin and OAuth users).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Whether the user has confirmed their role.
    ///
    /// New OTP users come back as `VISITOR` with this set to `false` until
    /// they pick a role; older backends omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_selected: Option<bool>,

    /// Remaining backend fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserIdentity {
    /// Human-readable handle: email, then phone number, then id.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.email
            .clone()
            .or_else(|| self.phone_number.clone())
            .or_else(|| self.id.map(|id| format!("user #{id}")))
            .unwrap_or_else(|| "unknown user".to_string())
    }
}

/// Successful login answer: identity plus token pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Authenticated identity.
    pub user: UserIdentity,
    /// Bearer token for subsequent requests.
    pub access: String,
    /// Refresh token.
    #[serde(default)]
    pub refresh: String,
}

/// Answer to `auth/update-role/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoleUpdateResponse {
    /// Identity with the new role applied.
    pub user: UserIdentity,
}

// ═══════════════════════════════════════════════════════════════════════
// Lists
// ═══════════════════════════════════════════════════════════════════════

/// A list endpoint's body: either a paginated envelope or a bare array.
///
/// Only `results` is read from the envelope; `count`, `next` and `previous`
/// are ignored and the client never follows `next`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Page<T> {
    /// `{"count": .., "next": .., "previous": .., "results": [..]}`
    Paginated {
        /// Items on this page.
        results: Vec<T>,
    },
    /// `[..]`
    Items(Vec<T>),
}

impl<T> Page<T> {
    /// The listed items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Paginated { results } | Self::Items(results) => results,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Exhibitions
// ═══════════════════════════════════════════════════════════════════════

/// Booth capacity of a new exhibition unless the admin sets one.
pub const DEFAULT_BOOTH_CAPACITY: u32 = 100;

/// An exhibition event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exhibition {
    /// Backend id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Venue name.
    #[serde(default)]
    pub venue_name: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// State or region.
    #[serde(default)]
    pub state: String,
    /// Country.
    #[serde(default)]
    pub country: String,
    /// Opening time.
    #[serde(default, with = "wire_time::option")]
    pub start_date: Option<NaiveDateTime>,
    /// Closing time.
    #[serde(default, with = "wire_time::option")]
    pub end_date: Option<NaiveDateTime>,
    /// Number of booths on offer.
    #[serde(default)]
    pub booth_capacity: Option<u32>,
    /// URL of the venue map image.
    #[serde(default)]
    pub map_image: Option<String>,
    /// Remaining backend fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Payload for `POST events/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExhibition {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Venue name.
    pub venue_name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Country.
    pub country: String,
    /// Opening time, sent as `YYYY-MM-DDTHH:MM`.
    #[serde(with = "wire_time")]
    pub start_date: NaiveDateTime,
    /// Closing time, sent as `YYYY-MM-DDTHH:MM`.
    #[serde(with = "wire_time")]
    pub end_date: NaiveDateTime,
    /// Number of booths on offer.
    pub booth_capacity: u32,
}

/// Exhibition timestamps.
///
/// Requests carry minute-precision local times (`2026-03-01T10:00`). The
/// backend answers with ISO 8601, with or without seconds and an offset;
/// an offset is dropped and the wall-clock time kept.
pub mod wire_time {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M";

    /// Parse any of the accepted shapes.
    #[must_use]
    pub fn parse(value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        DateTime::parse_from_rfc3339(value)
            .map(|t| t.naive_local())
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok())
            .or_else(|| NaiveDateTime::parse_from_str(value, FORMAT).ok())
            .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").ok())
    }

    /// Format as the backend's datetime-local inputs expect.
    #[must_use]
    pub fn format(value: &NaiveDateTime) -> String {
        value.format(FORMAT).to_string()
    }

    /// Serialize a required timestamp.
    ///
    /// # Errors
    ///
    /// Propagates the serializer's error.
    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    /// Deserialize a required timestamp.
    ///
    /// # Errors
    ///
    /// Fails on a string none of the accepted shapes match.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date/time: {raw}")))
    }

    /// Optional timestamps; blank and null both read as `None`.
    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize an optional timestamp.
        ///
        /// # Errors
        ///
        /// Propagates the serializer's error.
        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize an optional timestamp.
        ///
        /// # Errors
        ///
        /// Fails on a non-blank string none of the accepted shapes match.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if !raw.trim().is_empty() => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date/time: {raw}"))),
                _ => Ok(None),
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Booth applications
// ═══════════════════════════════════════════════════════════════════════

/// Review status of a booth application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    /// Awaiting admin review.
    Pending,
    /// Accepted by an admin.
    Approved,
    /// Declined by an admin.
    Rejected,
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        })
    }
}

/// Review actions an admin can take on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewAction {
    /// `POST exhibitor/applications/{id}/approve/`
    Approve,
    /// `POST exhibitor/applications/{id}/reject/`
    Reject,
}

impl ReviewAction {
    /// Path segment used by the backend.
    #[must_use]
    pub const fn as_path(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// Business type preselected on the application form.
pub const DEFAULT_BUSINESS_TYPE: &str = "Developer";

/// An exhibitor's booth application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Backend id.
    pub id: i64,
    /// Exhibition applied to.
    pub exhibition: i64,
    /// Applying company.
    pub company_name: String,
    /// Council area the company operates in.
    #[serde(default)]
    pub council_area: String,
    /// Kind of business.
    #[serde(default)]
    pub business_type: String,
    /// How to reach the company.
    #[serde(default)]
    pub contact_details: String,
    /// Review status.
    pub status: ApplicationStatus,
    /// Booth assigned on approval.
    #[serde(default)]
    pub booth_number: Option<String>,
    /// URL of the uploaded payment screenshot.
    #[serde(default)]
    pub payment_screenshot: Option<String>,
    /// Remaining backend fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Application {
    /// Review buttons to render for this entry; empty once reviewed.
    #[must_use]
    pub fn available_actions(&self) -> Vec<ReviewAction> {
        match self.status {
            ApplicationStatus::Pending => vec![ReviewAction::Approve, ReviewAction::Reject],
            ApplicationStatus::Approved | ApplicationStatus::Rejected => Vec::new(),
        }
    }

    /// Whether properties may be listed under this application.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == ApplicationStatus::Approved
    }
}

/// An uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name sent to the backend.
    pub file_name: String,
    /// MIME type.
    pub content_type: String,
    /// Raw contents.
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Build an attachment from in-memory bytes, guessing the MIME type from
    /// the file extension.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read an attachment from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Io`](crate::ApiError::Io) if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, crate::ApiError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| crate::ApiError::Io {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }
}

fn guess_content_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Multipart payload for `POST exhibitor/applications/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoothApplication {
    /// Exhibition applied to.
    pub exhibition: i64,
    /// Applying company.
    pub company_name: String,
    /// Council area the company operates in.
    pub council_area: String,
    /// Kind of business, [`DEFAULT_BUSINESS_TYPE`] unless chosen.
    pub business_type: String,
    /// How to reach the company.
    pub contact_details: String,
    /// Proof of payment; the part is left out when none was chosen.
    pub payment_screenshot: Option<Attachment>,
}

// ═══════════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════════

/// A property an exhibitor lists under an approved application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Backend id.
    pub id: i64,
    /// Owning application.
    pub exhibitor_application: i64,
    /// Display title.
    pub title: String,
    /// Where the property is.
    #[serde(default)]
    pub location: String,
    /// Lower bound of the price range, as the backend formats it.
    #[serde(default, deserialize_with = "decimal::option")]
    pub price_min: Option<String>,
    /// Upper bound of the price range.
    #[serde(default, deserialize_with = "decimal::option")]
    pub price_max: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Remaining backend fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Property {
    /// `min - max`, with `?` for a missing bound.
    #[must_use]
    pub fn price_range(&self) -> String {
        format!(
            "{} - {}",
            self.price_min.as_deref().unwrap_or("?"),
            self.price_max.as_deref().unwrap_or("?")
        )
    }
}

/// Payload for `POST exhibitor/properties/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProperty {
    /// Owning application; must be approved.
    pub exhibitor_application: i64,
    /// Display title.
    pub title: String,
    /// Where the property is.
    pub location: String,
    /// Lower bound of the price range, as a decimal string.
    pub price_min: String,
    /// Upper bound of the price range, as a decimal string.
    pub price_max: String,
    /// Free-form description.
    pub description: String,
}

/// Decimal fields arrive as strings or as JSON numbers.
mod decimal {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    pub fn option<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
            Raw::Text(text) => text,
            Raw::Number(number) => number.to_string(),
        }))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registrations
// ═══════════════════════════════════════════════════════════════════════

/// Title shown on a ticket whose exhibition details are missing.
pub const UNNAMED_TICKET: &str = "Event Ticket";

/// The exhibition a registration points at, as embedded by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExhibitionDetails {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A visitor's registration, carrying the QR ticket token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    /// Backend id.
    pub id: i64,
    /// Exhibition registered for.
    pub exhibition: i64,
    /// Token encoded in the QR ticket.
    pub qr_token: String,
    /// Whether the ticket has been scanned at the entrance.
    #[serde(default)]
    pub is_verified: bool,
    /// Embedded exhibition, when the backend expands it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhibition_details: Option<ExhibitionDetails>,
    /// Remaining backend fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Registration {
    /// Ticket title: the embedded exhibition name, or [`UNNAMED_TICKET`].
    #[must_use]
    pub fn ticket_title(&self) -> &str {
        self.exhibition_details
            .as_ref()
            .and_then(|details| details.name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNNAMED_TICKET)
    }
}

/// Successful answer to `visitor/registrations/verify-qr/`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QrVerification {
    /// Backend confirmation message.
    #[serde(default)]
    pub message: Option<String>,
    /// The registration that was checked in, when returned.
    #[serde(default)]
    pub registration: Option<Registration>,
    /// Remaining fields (visitor details, exhibition title, ...).
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

//! Command-line interface.

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand, ValueEnum};
use expohub_client::models::wire_time;
use expohub_client::{DEFAULT_BOOTH_CAPACITY, DEFAULT_BUSINESS_TYPE, Role};
use std::path::PathBuf;

/// ExpoHub exhibition client.
#[derive(Debug, Parser)]
#[command(name = "expohub", version, about)]
pub struct Cli {
    /// Backend base URL (overrides `EXPOHUB_API_URL`).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Answer yes to every confirmation.
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Sign in.
    #[command(subcommand)]
    Login(LoginCommand),
    /// Sign out and forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Confirm the role of a first-time user.
    SelectRole {
        /// Role to take.
        #[arg(value_enum)]
        role: SelectableRole,
    },
    /// Open a view, as the route guard allows.
    Goto {
        /// View path, for example `/admin/scan`.
        path: String,
    },
    /// Manage exhibitions (admin).
    #[command(subcommand)]
    Events(EventsCommand),
    /// Booth applications.
    #[command(subcommand)]
    Applications(ApplicationsCommand),
    /// Properties listed under an application (exhibitor).
    #[command(subcommand)]
    Properties(PropertiesCommand),
    /// Visitor registrations.
    #[command(subcommand)]
    Visit(VisitCommand),
    /// Verify ticket codes at the entrance (admin).
    Scan {
        /// Decoded QR tokens, verified in order.
        #[arg(required = true)]
        tokens: Vec<String>,
    },
}

/// Login paths.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum LoginCommand {
    /// Request a one-time code by SMS.
    SendOtp {
        /// Phone number, with country code.
        phone_number: String,
    },
    /// Sign in with the received code.
    VerifyOtp {
        /// Phone number the code was sent to.
        phone_number: String,
        /// One-time code.
        otp: String,
    },
    /// Admin email/password login.
    Admin {
        /// Admin email.
        email: String,
        /// Password.
        #[arg(long, env = "EXPOHUB_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in with a Google access token.
    Google {
        /// Provider access token.
        access_token: String,
    },
}

/// Roles a user may pick for themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SelectableRole {
    /// Apply for booths.
    Exhibitor,
    /// Register for exhibitions.
    Visitor,
}

impl From<SelectableRole> for Role {
    fn from(role: SelectableRole) -> Self {
        match role {
            SelectableRole::Exhibitor => Self::Exhibitor,
            SelectableRole::Visitor => Self::Visitor,
        }
    }
}

/// Exhibition commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum EventsCommand {
    /// List exhibitions.
    List,
    /// Create an exhibition.
    Create(NewEventArgs),
    /// Delete an exhibition.
    Delete {
        /// Exhibition id.
        id: i64,
    },
}

/// Fields of a new exhibition.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct NewEventArgs {
    /// Name.
    #[arg(long)]
    pub name: String,
    /// Description.
    #[arg(long, default_value = "")]
    pub description: String,
    /// Venue name.
    #[arg(long)]
    pub venue_name: String,
    /// Street address.
    #[arg(long, default_value = "")]
    pub address: String,
    /// City.
    #[arg(long)]
    pub city: String,
    /// State or region.
    #[arg(long, default_value = "")]
    pub state: String,
    /// Country.
    #[arg(long, default_value = "")]
    pub country: String,
    /// Opening time (YYYY-MM-DDTHH:MM).
    #[arg(long, value_parser = date_time)]
    pub start_date: NaiveDateTime,
    /// Closing time (YYYY-MM-DDTHH:MM).
    #[arg(long, value_parser = date_time)]
    pub end_date: NaiveDateTime,
    /// Number of booths on offer.
    #[arg(long, default_value_t = DEFAULT_BOOTH_CAPACITY)]
    pub booth_capacity: u32,
}

fn date_time(value: &str) -> Result<NaiveDateTime, String> {
    wire_time::parse(value).ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM, got {value:?}"))
}

/// Application commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ApplicationsCommand {
    /// Applications for an exhibition (admin).
    List {
        /// Exhibition id.
        exhibition: i64,
    },
    /// Approve an application (admin).
    Approve {
        /// Exhibition the application belongs to.
        #[arg(long)]
        exhibition: i64,
        /// Booth to assign.
        #[arg(long)]
        booth_number: Option<String>,
        /// Application id.
        id: i64,
    },
    /// Reject an application (admin).
    Reject {
        /// Exhibition the application belongs to.
        #[arg(long)]
        exhibition: i64,
        /// Application id.
        id: i64,
    },
    /// Apply for a booth (exhibitor).
    Apply(ApplyArgs),
    /// Own applications (exhibitor).
    Mine,
}

/// Fields of a booth application.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ApplyArgs {
    /// Exhibition id.
    pub exhibition: i64,
    /// Company name.
    #[arg(long)]
    pub company_name: String,
    /// Council area the company operates in.
    #[arg(long)]
    pub council_area: String,
    /// Kind of business.
    #[arg(long, default_value = DEFAULT_BUSINESS_TYPE)]
    pub business_type: String,
    /// How to reach the company.
    #[arg(long)]
    pub contact_details: String,
    /// Proof of payment image.
    #[arg(long)]
    pub payment_screenshot: Option<PathBuf>,
}

/// Property commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum PropertiesCommand {
    /// Properties of an application.
    List {
        /// Application id.
        application: i64,
    },
    /// Add a property to an approved application.
    Add {
        /// Application id.
        application: i64,
        /// Title.
        #[arg(long)]
        title: String,
        /// Where the property is.
        #[arg(long)]
        location: String,
        /// Lowest price.
        #[arg(long)]
        price_min: String,
        /// Highest price.
        #[arg(long)]
        price_max: String,
        /// Description.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a property.
    Delete {
        /// Application the property belongs to.
        #[arg(long)]
        application: i64,
        /// Property id.
        id: i64,
    },
}

/// Visitor commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum VisitCommand {
    /// Register for an exhibition.
    Register {
        /// Exhibition id.
        exhibition: i64,
    },
    /// Show registrations and their ticket codes.
    Tickets,
}

//! Command execution.
//!
//! Every command returns the text to print. Role-scoped commands first open
//! their view through the [`Shell`], so a user without the role gets the same
//! redirect the guard would show in the browser.

use crate::cli::{
    ApplicationsCommand, ApplyArgs, Command, EventsCommand, LoginCommand, NewEventArgs,
    PropertiesCommand, VisitCommand,
};
use crate::shell::Shell;
use anyhow::{Context, bail};
use chrono::NaiveDateTime;
use expohub_client::models::wire_time;
use expohub_client::{
    ApiClient, ApiError, Application, Attachment, BoothApplication, Exhibition, NewExhibition,
    NewProperty, Property, Registration, UNNAMED_TICKET,
};
use expohub_panels::{AdminPanel, ExhibitorPanel, Prompt, ScanPhase, VisitorPanel};
use expohub_session::{Route, SessionContext, SessionState, SessionStorage, StoredToken};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

/// How long shutdown waits for in-flight session effects.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A wired client: API, session and prompt.
pub struct App<S: SessionStorage> {
    api: ApiClient,
    session: SessionContext<ApiClient, S>,
    prompt: Arc<dyn Prompt>,
}

impl<S: SessionStorage> App<S> {
    /// Wire a client against `api_url`, authenticating with the token held
    /// in `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `api_url` is not a base URL.
    pub fn new(api_url: &str, storage: S, prompt: Arc<dyn Prompt>) -> Result<Self, ApiError> {
        let api = ApiClient::new(api_url)?
            .with_token_source(Arc::new(StoredToken(storage.clone())));
        let session = SessionContext::new(Arc::new(api.clone()), storage);
        Ok(Self {
            api,
            session,
            prompt,
        })
    }

    /// The session context.
    #[must_use]
    pub const fn session(&self) -> &SessionContext<ApiClient, S> {
        &self.session
    }

    /// Wait for in-flight session work.
    pub async fn shutdown(&self) {
        if let Err(error) = self.session.shutdown(SHUTDOWN_TIMEOUT).await {
            tracing::warn!(%error, "Session did not shut down cleanly");
        }
    }

    /// Run one command.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend refuses the request, the guard
    /// redirects away from the command's view, or the session is gone.
    #[tracing::instrument(skip_all)]
    pub async fn run(&self, command: Command) -> anyhow::Result<String> {
        match command {
            Command::Login(login) => self.login(login).await,
            Command::Logout => {
                self.session.logout().await?;
                Ok("Signed out".to_string())
            },
            Command::Whoami => Ok(whoami(&self.session.snapshot().await)),
            Command::SelectRole { role } => {
                self.require(Route::RoleSelection).await?;
                let state = settled(self.session.select_role(role.into()).await?)?;
                Ok(format!(
                    "Role set to {}; next: {}",
                    state.role().unwrap_or_default(),
                    self.session.next_route().await
                ))
            },
            Command::Goto { path } => {
                let state = self.session.snapshot().await;
                Ok(Shell::navigate(&state, &path)?.to_string())
            },
            Command::Events(events) => self.events(events).await,
            Command::Applications(applications) => self.applications(applications).await,
            Command::Properties(properties) => self.properties(properties).await,
            Command::Visit(visit) => self.visit(visit).await,
            Command::Scan { tokens } => self.scan(tokens).await,
        }
    }

    /// Fail unless the guard shows `route` for the current session.
    async fn require(&self, route: Route) -> anyhow::Result<()> {
        let navigation = Shell::open(&self.session.snapshot().await, route);
        if navigation.redirected() {
            bail!("{route} is not available to this session (redirected to {})", navigation.shown);
        }
        Ok(())
    }

    async fn login(&self, command: LoginCommand) -> anyhow::Result<String> {
        let state = match command {
            LoginCommand::SendOtp { phone_number } => {
                settled(self.session.send_otp(&phone_number).await?)?;
                return Ok(format!("OTP sent to {phone_number}"));
            },
            LoginCommand::VerifyOtp { phone_number, otp } => {
                self.session.verify_otp(&phone_number, &otp).await?
            },
            LoginCommand::Admin { email, password } => {
                self.session.login_admin(&email, &password).await?
            },
            LoginCommand::Google { access_token } => {
                self.session.login_with_google(&access_token).await?
            },
        };
        let state = settled(state)?;
        Ok(format!(
            "Signed in as {}; next: {}",
            whoami(&state),
            self.session.next_route().await
        ))
    }

    async fn events(&self, command: EventsCommand) -> anyhow::Result<String> {
        self.require(Route::Management).await?;
        let mut panel = AdminPanel::new(self.api.clone(), Arc::clone(&self.prompt));

        match command {
            EventsCommand::List => {
                panel.load().await;
                Ok(lines(panel.events().iter().map(exhibition_line)))
            },
            EventsCommand::Create(args) => {
                let created = panel.create_event(args.into()).await?;
                Ok(format!("Created {}", exhibition_line(&created)))
            },
            EventsCommand::Delete { id } => Ok(if panel.delete_event(id).await? {
                format!("Deleted exhibition #{id}")
            } else {
                "Cancelled".to_string()
            }),
        }
    }

    async fn applications(&self, command: ApplicationsCommand) -> anyhow::Result<String> {
        match command {
            ApplicationsCommand::List { exhibition } => {
                self.require(Route::Management).await?;
                let mut panel = AdminPanel::new(self.api.clone(), Arc::clone(&self.prompt));
                panel.select_event(exhibition).await;
                Ok(lines(panel.applications().iter().map(application_line)))
            },
            ApplicationsCommand::Approve {
                exhibition,
                booth_number,
                id,
            } => {
                self.require(Route::Management).await?;
                let mut panel = AdminPanel::new(self.api.clone(), Arc::clone(&self.prompt));
                panel.select_event(exhibition).await;
                panel.approve(id, booth_number).await?;
                Ok(reviewed(panel.applications(), id))
            },
            ApplicationsCommand::Reject { exhibition, id } => {
                self.require(Route::Management).await?;
                let mut panel = AdminPanel::new(self.api.clone(), Arc::clone(&self.prompt));
                panel.select_event(exhibition).await;
                panel.reject(id).await?;
                Ok(reviewed(panel.applications(), id))
            },
            ApplicationsCommand::Apply(args) => {
                self.require(Route::ExhibitorPanel).await?;
                let application = booth_application(args).await?;
                let mut panel = ExhibitorPanel::new(self.api.clone(), Arc::clone(&self.prompt));
                let created = panel.apply(application).await?;
                Ok(format!("Submitted {}", application_line(&created)))
            },
            ApplicationsCommand::Mine => {
                self.require(Route::ExhibitorPanel).await?;
                let mut panel = ExhibitorPanel::new(self.api.clone(), Arc::clone(&self.prompt));
                panel.load().await;

                let mut out = lines(panel.applications().iter().map(application_line));
                let open = panel.open_exhibitions();
                if !open.is_empty() {
                    out.push_str("\nOpen for applications:\n");
                    out.push_str(&lines(open.into_iter().map(exhibition_line)));
                }
                Ok(out)
            },
        }
    }

    async fn properties(&self, command: PropertiesCommand) -> anyhow::Result<String> {
        self.require(Route::ExhibitorPanel).await?;
        let mut panel = ExhibitorPanel::new(self.api.clone(), Arc::clone(&self.prompt));
        // Approval is checked against the exhibitor's own applications.
        panel.load_applications().await;

        match command {
            PropertiesCommand::List { application } => {
                panel.open_properties(application).await?;
            },
            PropertiesCommand::Add {
                application,
                title,
                location,
                price_min,
                price_max,
                description,
            } => {
                panel
                    .add_property(NewProperty {
                        exhibitor_application: application,
                        title,
                        location,
                        price_min,
                        price_max,
                        description,
                    })
                    .await?;
            },
            PropertiesCommand::Delete { application, id } => {
                panel.open_properties(application).await?;
                if !panel.delete_property(id).await? {
                    return Ok("Cancelled".to_string());
                }
            },
        }

        Ok(lines(panel.properties().iter().map(property_line)))
    }

    async fn visit(&self, command: VisitCommand) -> anyhow::Result<String> {
        self.require(Route::VisitorPanel).await?;
        let mut panel = VisitorPanel::new(self.api.clone(), Arc::clone(&self.prompt));

        match command {
            VisitCommand::Register { exhibition } => {
                let registration = panel.register(exhibition).await?;
                Ok(format!(
                    "Registered for exhibition #{exhibition}; ticket {}",
                    registration.qr_token
                ))
            },
            VisitCommand::Tickets => {
                panel.load().await;
                let title = |r: &Registration| {
                    if r.exhibition_details.as_ref().and_then(|d| d.name.as_ref()).is_some() {
                        return r.ticket_title().to_string();
                    }
                    panel
                        .events()
                        .iter()
                        .find(|e| e.id == r.exhibition)
                        .map_or_else(|| UNNAMED_TICKET.to_string(), |e| e.name.clone())
                };
                Ok(lines(panel.registrations().iter().map(|r| {
                    let status = if r.is_verified { "checked in" } else { "not scanned" };
                    format!("{}: {} ({status})", title(r), r.qr_token)
                })))
            },
        }
    }

    async fn scan(&self, tokens: Vec<String>) -> anyhow::Result<String> {
        self.require(Route::Scanner).await?;
        let panel = AdminPanel::new(self.api.clone(), Arc::clone(&self.prompt));
        let mut out = String::new();

        for token in tokens {
            let state = panel.scan(&token).await?;
            match state.last_result.as_ref() {
                Some(result) if state.phase == ScanPhase::ResultShown => {
                    let mark = if result.is_verified() { "OK" } else { "REFUSED" };
                    writeln!(out, "{mark} {token}: {}", result.message())?;
                    panel.resume_scanning().await?;
                },
                _ => writeln!(out, "SKIPPED {token:?}")?,
            }
        }

        let totals = panel.scanner().snapshot().await;
        write!(
            out,
            "{} verified, {} refused",
            totals.verified_count, totals.rejected_count
        )?;
        Ok(out)
    }
}

impl<S: SessionStorage> std::fmt::Debug for App<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("api", &self.api.base_url().as_str())
            .finish_non_exhaustive()
    }
}

impl From<NewEventArgs> for NewExhibition {
    fn from(args: NewEventArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            venue_name: args.venue_name,
            address: args.address,
            city: args.city,
            state: args.state,
            country: args.country,
            start_date: args.start_date,
            end_date: args.end_date,
            booth_capacity: args.booth_capacity,
        }
    }
}

async fn booth_application(args: ApplyArgs) -> anyhow::Result<BoothApplication> {
    let payment_screenshot = match &args.payment_screenshot {
        Some(path) => Some(
            Attachment::from_path(path)
                .await
                .context("Could not read the payment screenshot")?,
        ),
        None => None,
    };
    Ok(BoothApplication {
        exhibition: args.exhibition,
        company_name: args.company_name,
        council_area: args.council_area,
        business_type: args.business_type,
        contact_details: args.contact_details,
        payment_screenshot,
    })
}

/// Surface a settled session error.
fn settled(state: SessionState) -> anyhow::Result<SessionState> {
    match state.error {
        Some(error) => bail!(error),
        None => Ok(state),
    }
}

fn whoami(state: &SessionState) -> String {
    if !state.is_authenticated() {
        return "Not signed in".to_string();
    }
    let name = state
        .user
        .as_ref()
        .map_or_else(|| "unknown user".to_string(), |user| user.display_name());
    format!("{name} ({})", state.role().unwrap_or_default())
}

fn exhibition_line(event: &Exhibition) -> String {
    let at = |d: Option<&NaiveDateTime>| d.map_or_else(|| "?".to_string(), wire_time::format);
    let place: Vec<&str> = [event.venue_name.as_str(), event.city.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    format!(
        "#{} {} @ {} ({} to {})",
        event.id,
        event.name,
        place.join(", "),
        at(event.start_date.as_ref()),
        at(event.end_date.as_ref())
    )
}

fn property_line(property: &Property) -> String {
    format!(
        "#{} {} @ {} [{}] {}",
        property.id,
        property.title,
        property.location,
        property.price_range(),
        property.description
    )
    .trim_end()
    .to_string()
}

fn application_line(application: &Application) -> String {
    let actions: Vec<&str> = application
        .available_actions()
        .iter()
        .map(|a| a.as_path())
        .collect();
    let mut line = format!(
        "#{} {} for exhibition #{} [{}]",
        application.id, application.company_name, application.exhibition, application.status
    );
    if let Some(booth) = &application.booth_number {
        line.push_str(" booth ");
        line.push_str(booth);
    }
    if !actions.is_empty() {
        line.push_str(" actions: ");
        line.push_str(&actions.join(", "));
    }
    line
}

fn reviewed(applications: &[Application], id: i64) -> String {
    applications
        .iter()
        .find(|a| a.id == id)
        .map_or_else(|| format!("Reviewed application #{id}"), application_line)
}

fn lines<I: IntoIterator<Item = String>>(items: I) -> String {
    let joined: Vec<String> = items.into_iter().collect();
    if joined.is_empty() {
        "Nothing to show".to_string()
    } else {
        joined.join("\n")
    }
}

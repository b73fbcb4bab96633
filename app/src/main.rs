//! `expohub` binary.

use clap::Parser;
use expohub_app::{App, Cli, Config, TerminalPrompt};
use expohub_panels::{AssumeYes, PanelError, Prompt};
use expohub_session::FileStorage;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(api_url) = cli.api_url.as_deref() {
        config = config.with_api_url(api_url)?;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(
        api_url = %config.api_url,
        session_file = %config.session_file.display(),
        "Configuration loaded"
    );

    let prompt: Arc<dyn Prompt> = if cli.yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(TerminalPrompt)
    };
    let app = App::new(&config.api_url, FileStorage::new(config.session_file), prompt)?;

    let result = app.run(cli.command).await;
    app.shutdown().await;

    match result {
        Ok(output) => {
            println!("{output}");
            Ok(ExitCode::SUCCESS)
        },
        Err(error) => {
            // Panel failures have already been shown through the prompt.
            if error.downcast_ref::<PanelError>().is_none() {
                eprintln!("error: {error:#}");
            }
            Ok(ExitCode::FAILURE)
        },
    }
}

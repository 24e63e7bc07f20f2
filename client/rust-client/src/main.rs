use clap::Parser;
use quizportal_client::{cli::Cli, config::Config, services::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for the rendered views
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizportal_client=info".into()),
        )
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let cli = Cli::parse();

    let config = Config::load()?;
    tracing::debug!(
        "Configuration loaded for environment: {:?}",
        std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string())
    );

    let state = AppState::new(config)?;

    if let Err(e) = quizportal_client::cli::run(cli, &state).await {
        if let Some(to) = e
            .downcast_ref::<quizportal_client::SessionError>()
            .and_then(|e| e.redirect_target())
        {
            tracing::info!("Redirecting to {}", to);
        }
        return Err(e);
    }

    Ok(())
}

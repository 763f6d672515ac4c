use lettre::{AsyncSmtpTransport, Tokio1Executor, transport::smtp::authentication::Credentials};
use otp_auth_server::AppResources;
use otp_auth_server::api::start_webserver;
use otp_auth_server::cleanup::spawn_cleanup_task;
use otp_auth_server::config::load_config_or_panic;
use sea_orm::Database;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing() {
    let default_directives = "otp_auth_server=info,hyper=warn,sea_orm=info";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install().expect("Failed to install `color_eyre::install`");

    initialize_tracing();

    // Load config
    let config = Arc::new(load_config_or_panic());

    // Set up SeaORM database connection
    let db = Arc::new(
        Database::connect(&config.database_url)
            .await
            .expect("Failed to connect to database"),
    );

    // Set up lettre SMTP client
    let creds = Credentials::new(config.smtp.username.clone(), config.smtp.password.clone());
    let mailer = Arc::new(
        AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp.server)
            .expect("Failed to build SMTP transport")
            .port(config.smtp.port)
            .credentials(creds)
            .build(),
    );

    let resources = AppResources { db, mailer, config };
    tracing::info!(
        otp_expiry = resources.config.otp.expiry_seconds,
        max_attempts = resources.config.otp.max_attempts,
        max_resends = resources.config.otp.max_resends,
        block_seconds = resources.config.otp.block_seconds,
        "OTP configuration"
    );

    // Sweep expired OTP records and dead tokens in the background
    spawn_cleanup_task(resources.clone());

    start_webserver(resources).await?;
    Ok(())
}

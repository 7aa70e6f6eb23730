use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pawhaven::auth::TokenSigner;
use pawhaven::config::{Cli, Config};
use pawhaven::notify::{DynNotifier, LogNotifier, SmtpNotifier};
use pawhaven::state::AppState;
use pawhaven::{build_app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Missing secret is fatal; tokens signed against a default would be
    // forgeable.
    let jwt_secret = config.jwt_secret()?;

    // Initialize database
    let pool = db::create_pool(config.db_path())?;
    db::run_migrations(&pool)?;

    let tokens = Arc::new(TokenSigner::new(
        jwt_secret.as_bytes(),
        config.auth.token_hours,
    ));

    let notifier: DynNotifier = match config.smtp {
        Some(ref smtp) => {
            tracing::info!("SMTP notifications enabled via {}", smtp.host);
            Arc::new(SmtpNotifier::new(smtp)?)
        }
        None => {
            tracing::info!("SMTP not configured; notifications will be logged only");
            Arc::new(LogNotifier)
        }
    };

    let state = AppState {
        db: pool,
        config: config.clone(),
        tokens,
        notifier,
    };

    let app = build_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

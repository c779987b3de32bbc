//! Faith promise form entry point.
//!
//! Runs the pledge form on the terminal and records completed pledges in
//! the configured sink. With the SQLite sink, a small Axum API exposes the
//! recorded pledges alongside the form.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use faith_promise::api::{self, ApiState};
use faith_promise::config::{Config, SinkKind};
use faith_promise::db::{self, SqliteSink};
use faith_promise::sink::LogSink;
use faith_promise::webhook::WebhookSink;
use faith_promise::{console, shutdown, SubmissionController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with the form on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    let token = CancellationToken::new();
    tokio::spawn(shutdown::cancel_on_signal(token.clone()));

    match config.sink {
        SinkKind::Log => {
            info!("Recording pledges to the log only");
            let controller = SubmissionController::with_reset_delay(LogSink, config.reset_delay);
            console::run(controller, token.clone()).await?;
        }
        SinkKind::Sqlite => {
            let pool = db::init_pool(&config.database_url).await?;
            let api = spawn_api(pool.clone(), config.api_port, token.clone()).await?;

            let controller =
                SubmissionController::with_reset_delay(SqliteSink::new(pool), config.reset_delay);
            console::run(controller, token.clone()).await?;

            token.cancel();
            api.await??;
        }
        SinkKind::Webhook => {
            let url = config
                .webhook_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("WEBHOOK_URL is not set"))?;
            let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
            info!("Forwarding pledges to {url}");

            let sink = WebhookSink::new(client, url, config.webhook_max_retries);
            let controller = SubmissionController::with_reset_delay(sink, config.reset_delay);
            console::run(controller, token.clone()).await?;
        }
    }

    info!("Bye");
    Ok(())
}

async fn spawn_api(
    pool: SqlitePool,
    port: u16,
    token: CancellationToken,
) -> anyhow::Result<JoinHandle<std::io::Result<()>>> {
    let app = api::router(Arc::new(ApiState { pool }));

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Pledge API listening on http://{addr}");

    Ok(tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(token.cancelled_owned())
            .await
    }))
}

pub mod db;
pub mod model;
pub mod services;
pub mod token;
pub mod utils;

use std::sync::Arc;
use dotenv::dotenv;
use tokio::signal;
use tokio::sync::oneshot;
use db::member::MongoMemberStore;
use db::mongo;
use db::recovery::MongoRecoveryStore;
use services::ServiceContext;
use utils::config::{self, Configuration};
use utils::errors::{ErrorCode, WardenError};
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, Registry};

const APP_NAME: &str = "Warden";

///
/// Entry point to start the app.
///
pub async fn lib_main() -> Result<(), WardenError> {

    // Load any local dev settings as environment variables from a .env file.
    dotenv().ok();

    // Default log level to INFO if it's not specified.
    config::default_env("RUST_LOG", "INFO");

    // SIGINT/ctrl+c handling for graceful shutdown.
    let (signal_tx, signal_rx) = oneshot::channel();
    let _signal = tokio::spawn(wait_for_signal(signal_tx));

    // Load the service configuration into struct and initialise tracing.
    let config = Configuration::from_env()?;
    init_tracing();

    tracing::info!("{}\n{}", BANNER, config.fmt_console()?);

    // Create a MongoDB client and connect to it before proceeding.
    let db = mongo::get_mongo_db(APP_NAME, &config).await?;

    // Ensure the schema is in sync with the code.
    mongo::update_mongo(&db).await?;

    // The service context gives every handler access to shared stuff (stores, tokens, the clock).
    let ctx = Arc::new(ServiceContext::new(
        config.clone(),
        Arc::new(MongoMemberStore::new(db.clone())),
        Arc::new(MongoRecoveryStore::new(db))));

    let router = services::router(ctx);

    tracing::info!("{} listening on {}", APP_NAME, config.address);

    let listener = bind(&config.address).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            signal_rx.await.ok();
            tracing::info!("Graceful shutdown");
        })
        .await
        .map_err(|err| ErrorCode::ServerStartError
            .with_msg(&format!("Failed to run the HTTP server: {}", err)))?;

    Ok(())
}

///
/// Bind the listening socket, surfacing failures as a server start error rather than
/// a generic IO error.
///
async fn bind(address: &str) -> Result<tokio::net::TcpListener, WardenError> {
    tokio::net::TcpListener::bind(address).await
        .map_err(|err| ErrorCode::ServerStartError
            .with_msg(&format!("Unable to bind to {}: {}", address, err)))
}

///
/// Sends a oneshot signal when a SIGINT is received (Ctrl+C)
///
async fn wait_for_signal(tx: oneshot::Sender<()>) {
    let _ = signal::ctrl_c().await;
    tracing::info!("SIGINT received: shutting down");
    let _ = tx.send(());
}

///
/// Initialise tracing with the level taken from the RUST_LOG env variable.
///
fn init_tracing() {
    if let Err(err) = Registry::default()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_test_writer().with_ansi(true))
        .try_init() {
            tracing::info!("Tracing already initialised: {}", err.to_string()); // Allowed error here - tests call this fn repeatedly.
    }
}

const BANNER: &str = r#"
 __      __                  .___
/  \    /  \_____ _______  __| _/____   ____
\   \/\/   /\__  \\_  __ \/ __ |/ __ \ /    \
 \        /  / __ \|  | \/ /_/ \  ___/|   |  \
  \__/\  /  (____  /__|  \____ |\___  >___|  /
       \/        \/           \/    \/     \/
"#;

use std::fs::File;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, info_span, level_filters::LevelFilter};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use matchday::api::{self, Data};
use matchday::database::PgDatabase;

type ServerError = anyhow::Error;

#[tokio::main]
async fn main() {
    if let Err(e) = setup_tracing() {
        panic!("Error trying to setup tracing: {}", e);
    }

    if let Err(e) = run().await {
        panic!("Error trying to run the server: {}", e);
    }
}

/// The main function that runs the server.
async fn run() -> Result<(), ServerError> {
    let setup_span = info_span!("server_setup");
    let _guard = setup_span.enter();
    // Load the .env file only in the development environment (bypassed with the --release flag)
    #[cfg(debug_assertions)]
    dotenv::dotenv().ok();

    let database = PgDatabase::connect().await?;
    database.migrate().await?;
    info!("Database migrations are up to date");

    if let Ok(dir) = std::env::var("SEED_DATA") {
        database.seed_from_legacy(&dir).await?;
    }

    let admin_token =
        std::env::var("ADMIN_TOKEN").expect("Expected ADMIN_TOKEN as an environment variable");
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());

    let state = Arc::new(Data::new(database, admin_token));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);
    drop(_guard);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Sets up the tracing subscriber for the server.
fn setup_tracing() -> Result<(), ServerError> {
    if cfg!(debug_assertions) {
        let filter = EnvFilter::from_default_env()
            .add_directive("none".parse()?)
            .add_directive("matchday=info".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::NONE)
            .pretty()
            .init();

        return Ok(());
    }

    let log_file = File::create("debug.log")?;

    // Set up tracing with a filter that only logs errors in production
    tracing_subscriber::fmt::fmt()
        .with_span_events(FmtSpan::NONE)
        .with_max_level(LevelFilter::ERROR)
        .with_writer(log_file)
        .pretty()
        .init();

    Ok(())
}

use habit_tracker::{AppState, Config, Store, Tracker, program::WorkoutProgram, router};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env().await?;
    let store = Store::open(&config.data_dir).await?;
    let tracker = Tracker::new(store, WorkoutProgram::standard(), &config);
    info!(
        utc_offset = %config.utc_offset,
        max_body_bytes = config.max_body_bytes,
        today = %tracker.today(),
        "tracking habits in {}",
        config.data_dir.display()
    );

    let app = router(AppState::new(tracker, config.max_body_bytes));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use shiftboard_core::config::Config;
use shiftboard_core::display::{self, DisplaySink};
use shiftboard_core::log::ShiftLog;
use shiftboard_core::store::StateStore;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware. The display
/// sink is injected so tests can run without a broker.
pub fn build_router(root: PathBuf, config: Config, display: Arc<dyn DisplaySink>) -> Router {
    let app_state = state::AppState::new(root, config, display);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Lines and shift actions
        .route("/api/lines", get(routes::lines::list_lines))
        .route("/api/lines/{id}", get(routes::lines::get_line))
        .route("/api/lines/{id}/start", post(routes::lines::start_shift))
        .route("/api/lines/{id}/update", post(routes::lines::update_actual))
        .route("/api/lines/{id}/end", post(routes::lines::end_shift))
        // Shift log
        .route("/api/log", get(routes::log::download_log))
        .route("/api/log/clear", post(routes::log::clear_log))
        // Display
        .route("/api/display/publish", post(routes::display::publish_all))
        .layer(cors)
        .with_state(app_state)
}

/// Start the shiftboard API server.
///
/// On startup the state file is loaded (healing any missing records), the
/// log file gets its header if new, and current counters are pushed to the
/// display once so a freshly rebooted sign comes up in sync.
pub async fn serve(root: PathBuf, port: u16) -> anyhow::Result<()> {
    let config = Config::load(&root)?;
    let display = display::sink_from_config(&config.mqtt);

    let store = StateStore::load(&root)?;
    store.save(&root)?;
    ShiftLog::new(&root).ensure_exists()?;
    display.publish_all(&store);

    let app = build_router(root, config, display);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("shiftboard server listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}

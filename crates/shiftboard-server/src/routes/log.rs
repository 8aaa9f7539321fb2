use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use shiftboard_core::log::ShiftLog;
use shiftboard_core::paths::LOG_DOWNLOAD_NAME;
use shiftboard_core::ShiftboardError;

/// GET /api/log — download the shift log as CSV. A log that has never been
/// written to downloads as a header-only file.
pub async fn download_log(State(app): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let bytes = tokio::task::spawn_blocking(move || {
        let log = ShiftLog::new(&app.root);
        log.ensure_exists()?;
        Ok::<_, ShiftboardError>(std::fs::read(log.path())?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{LOG_DOWNLOAD_NAME}\""),
            ),
        ],
        bytes,
    ))
}

#[derive(serde::Deserialize)]
pub struct ClearBody {
    #[serde(default)]
    pub confirm: bool,
}

/// POST /api/log/clear — truncate the log back to its header row. Requires
/// an explicit `confirm: true`; this is the one destructive operation in the
/// system.
pub async fn clear_log(
    State(app): State<AppState>,
    Json(body): Json<ClearBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !body.confirm {
        return Err(AppError::bad_request("log clear requires confirm: true"));
    }

    tokio::task::spawn_blocking(move || {
        let log = ShiftLog::new(&app.root);
        log.clear()?;
        tracing::info!("shift log cleared");
        Ok::<_, ShiftboardError>(())
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({ "cleared": true })))
}

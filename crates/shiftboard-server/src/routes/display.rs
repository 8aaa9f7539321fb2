use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use shiftboard_core::store::StateStore;
use shiftboard_core::ShiftboardError;

/// POST /api/display/publish — manually republish every line's counters to
/// the physical display, e.g. after the sign controller reboots.
pub async fn publish_all(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let published = tokio::task::spawn_blocking(move || {
        let guard = app.lock_store();
        let store = StateStore::load(&app.root)?;
        drop(guard);
        Ok::<_, ShiftboardError>(app.display.publish_all(&store))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    if published {
        Ok(Json(serde_json::json!({
            "published": true,
            "message": "all current counters published to display",
        })))
    } else {
        Err(ShiftboardError::Publish("display broker unreachable".to_string()).into())
    }
}

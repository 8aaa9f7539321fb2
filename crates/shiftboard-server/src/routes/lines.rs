use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Local};

use crate::error::AppError;
use crate::state::AppState;
use shiftboard_core::error::parse_count;
use shiftboard_core::line::{LineRecord, ShiftOutcome, UpdateMode};
use shiftboard_core::log::{ShiftLog, ShiftLogEntry};
use shiftboard_core::penalty;
use shiftboard_core::store::StateStore;
use shiftboard_core::ShiftboardError;

/// Accept a count as either a JSON number or a numeric string, the way the
/// value arrives from a form-driven frontend.
fn count_from(value: &serde_json::Value) -> shiftboard_core::Result<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| ShiftboardError::InvalidCount(n.to_string())),
        serde_json::Value::String(s) => parse_count(s),
        other => Err(ShiftboardError::InvalidCount(other.to_string())),
    }
}

/// GET /api/lines — all line records. No penalty sweep here: a line decays
/// only when it is individually viewed.
pub async fn list_lines(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let _guard = app.lock_store();
        let store = StateStore::load(&app.root)?;
        let lines: Vec<LineRecord> = store.lines().cloned().collect();
        Ok::<_, ShiftboardError>(serde_json::json!(lines))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/lines/:id — one line's record, with the overdue-update penalty
/// applied first when the policy is enabled. A penalty that fires is
/// persisted and re-broadcast before the record is returned.
pub async fn get_line(
    State(app): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let guard = app.lock_store();
        let mut store = StateStore::load(&app.root)?;
        let mut applied = 0;
        if app.config.penalty.enabled {
            let line = store.get_mut(id)?;
            applied = penalty::apply(line, Local::now(), app.config.penalty.interval());
            if applied > 0 {
                store.save(&app.root)?;
            }
        }
        let line = store.get(id)?.clone();
        drop(guard);
        if applied > 0 {
            app.display.publish_all(&store);
        }
        Ok::<_, ShiftboardError>(serde_json::json!({
            "line": line,
            "penalty_applied": applied,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Shift actions
// ---------------------------------------------------------------------------

/// Load-mutate-save cycle shared by the three shift actions: append to the
/// shift log when a shift ended, persist (a failed append or save is fatal
/// to the request), then broadcast the new counters best-effort.
async fn run_shift_action<F>(
    app: AppState,
    id: u32,
    action: F,
) -> Result<Json<serde_json::Value>, AppError>
where
    F: FnOnce(&mut LineRecord, DateTime<Local>) -> (ShiftOutcome, Option<ShiftLogEntry>)
        + Send
        + 'static,
{
    let result = tokio::task::spawn_blocking(move || {
        let guard = app.lock_store();
        let mut store = StateStore::load(&app.root)?;
        let now = Local::now();
        let (outcome, entry) = {
            let line = store.get_mut(id)?;
            action(line, now)
        };

        // Log before persisting the fold: if the append fails, nothing was
        // committed and the shift can still be ended.
        if let Some(entry) = &entry {
            ShiftLog::new(&app.root).append(entry)?;
        }
        store.save(&app.root)?;

        let line = store.get(id)?.clone();
        drop(guard);

        // Paced broadcast runs outside the critical section.
        let published = app.display.publish_all(&store);
        if !published {
            tracing::warn!(line = id, "could not publish latest counters to display");
        }

        Ok::<_, ShiftboardError>(serde_json::json!({
            "outcome": outcome,
            "message": outcome.message(),
            "line": line,
            "published": published,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct StartBody {
    pub plan: serde_json::Value,
}

/// POST /api/lines/:id/start — open a shift with a day plan.
pub async fn start_shift(
    State(app): State<AppState>,
    Path(id): Path<u32>,
    Json(body): Json<StartBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let plan = count_from(&body.plan)?;
    run_shift_action(app, id, move |line, now| {
        (line.start_shift(plan, now), None)
    })
    .await
}

#[derive(serde::Deserialize)]
pub struct UpdateBody {
    #[serde(default)]
    pub actual: Option<serde_json::Value>,
}

/// POST /api/lines/:id/update — record actual progress. Which of the two
/// update semantics applies is configuration, not request data.
pub async fn update_actual(
    State(app): State<AppState>,
    Path(id): Path<u32>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mode = app.config.update_mode;
    let value = match (mode, body.actual.as_ref()) {
        (UpdateMode::Explicit, None) => {
            return Err(AppError::bad_request("actual value not provided for update"))
        }
        (UpdateMode::Explicit, Some(v)) => count_from(v)?,
        // Increment mode ignores any supplied value entirely.
        (UpdateMode::Increment, _) => 0,
    };
    run_shift_action(app, id, move |line, now| {
        (line.update_actual(mode, value, now), None)
    })
    .await
}

/// POST /api/lines/:id/end — close the shift, log it, fold day totals into
/// the month.
pub async fn end_shift(
    State(app): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<serde_json::Value>, AppError> {
    run_shift_action(app, id, move |line, now| line.end_shift(now)).await
}

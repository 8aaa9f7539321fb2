use crate::output::print_json;
use anyhow::Context;
use chrono::{DateTime, Local};
use shiftboard_core::config::Config;
use shiftboard_core::display;
use shiftboard_core::error::parse_count;
use shiftboard_core::line::{LineRecord, ShiftOutcome, UpdateMode};
use shiftboard_core::log::{ShiftLog, ShiftLogEntry};
use shiftboard_core::store::StateStore;
use std::path::Path;

/// Load-mutate-save cycle shared by the three shift actions, mirroring the
/// server: persist first, log an ended shift, then broadcast best-effort.
fn run_action<F>(root: &Path, config: &Config, id: u32, json: bool, action: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut LineRecord, DateTime<Local>) -> (ShiftOutcome, Option<ShiftLogEntry>),
{
    let mut store = StateStore::load(root).context("failed to load state")?;
    let now = Local::now();
    let (outcome, entry) = {
        let line = store.get_mut(id)?;
        action(line, now)
    };

    // Log before persisting the fold, so a failed append leaves the shift
    // still endable.
    if let Some(entry) = &entry {
        ShiftLog::new(root)
            .append(entry)
            .context("failed to append shift log")?;
    }
    store.save(root).context("failed to persist state")?;

    let sink = display::sink_from_config(&config.mqtt);
    let published = sink.publish_all(&store);
    if !published {
        eprintln!("warning: could not publish counters to display");
    }

    if json {
        print_json(&serde_json::json!({
            "outcome": outcome,
            "message": outcome.message(),
            "line": store.get(id)?,
            "published": published,
        }))
    } else {
        println!("line {id}: {}", outcome.message());
        Ok(())
    }
}

pub fn start(root: &Path, line: u32, plan: &str, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let plan = parse_count(plan)?;
    run_action(root, &config, line, json, |record, now| {
        (record.start_shift(plan, now), None)
    })
}

pub fn update(root: &Path, line: u32, value: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let mode = config.update_mode;
    let value = match (mode, value) {
        (UpdateMode::Explicit, None) => {
            anyhow::bail!("an actual value is required in explicit update mode")
        }
        (UpdateMode::Explicit, Some(raw)) => parse_count(raw)?,
        (UpdateMode::Increment, _) => 0,
    };
    run_action(root, &config, line, json, move |record, now| {
        (record.update_actual(mode, value, now), None)
    })
}

pub fn end(root: &Path, line: u32, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    run_action(root, &config, line, json, |record, now| record.end_shift(now))
}

use crate::output::{print_json, print_table};
use anyhow::Context;
use shiftboard_core::line::LineRecord;
use shiftboard_core::store::StateStore;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = StateStore::load(root).context("failed to load state")?;

    if json {
        let lines: Vec<&LineRecord> = store.lines().collect();
        return print_json(&lines);
    }

    let rows: Vec<Vec<String>> = store
        .lines()
        .map(|l| {
            vec![
                l.id.to_string(),
                if l.shift_active { "active" } else { "idle" }.to_string(),
                l.plan_day.to_string(),
                l.actual_day.to_string(),
                l.gap_day.to_string(),
                l.plan_month.to_string(),
                l.actual_month.to_string(),
                l.gap_month.to_string(),
            ]
        })
        .collect();

    print_table(
        &[
            "line", "shift", "plan", "actual", "gap", "plan/mo", "actual/mo", "gap/mo",
        ],
        rows,
    );
    Ok(())
}

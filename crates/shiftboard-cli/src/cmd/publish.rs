use shiftboard_core::config::Config;
use shiftboard_core::display;
use shiftboard_core::store::StateStore;
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let store = StateStore::load(root)?;

    let sink = display::sink_from_config(&config.mqtt);
    if !sink.publish_all(&store) {
        anyhow::bail!("could not publish counters to display");
    }
    println!("published counters for all lines");
    Ok(())
}

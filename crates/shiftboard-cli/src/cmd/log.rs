use clap::Subcommand;
use shiftboard_core::log::ShiftLog;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum LogSubcommand {
    /// Export the shift log (to stdout, or to a file with --out)
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Clear all logged shifts, leaving only the header
    Clear {
        /// Required: clearing is irreversible
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(root: &Path, subcommand: LogSubcommand) -> anyhow::Result<()> {
    let log = ShiftLog::new(root);

    match subcommand {
        LogSubcommand::Export { out } => {
            log.ensure_exists()?;
            match out {
                Some(path) => {
                    std::fs::copy(log.path(), &path)?;
                    println!("exported shift log to {}", path.display());
                }
                None => {
                    let content = std::fs::read_to_string(log.path())?;
                    print!("{content}");
                }
            }
        }
        LogSubcommand::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to clear the shift log without --yes");
            }
            log.clear()?;
            println!("shift log cleared");
        }
    }
    Ok(())
}

mod changeset;
mod cli;
mod constants;
mod error;
mod git;
mod retry;
mod ui;
mod upload;

use crate::cli::Cli;
use crate::constants::TROUBLESHOOTING_HINTS;
use crate::git::SystemGit;
use crate::upload::{Outcome, Uploader};
use anyhow::Result;

fn main() {
    let cli = Cli::parse_args();
    if let Err(e) = run(&cli) {
        error!("error: {:#}", e);
        hint!("troubleshooting:");
        for hint in TROUBLESHOOTING_HINTS {
            hint!("  - {}", hint);
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let dir = cli.dir.canonicalize().unwrap_or_else(|_| cli.dir.clone());
    status!("working directory: {}", dir.display());

    let git = SystemGit::new(cli.command_timeout());
    match Uploader::new(&git, cli.settings()).upload(&dir)? {
        Outcome::NothingToDo => status!("nothing to upload"),
        Outcome::Uploaded { batches, files } => {
            info!();
            status!(
                "uploaded {} in {}",
                ui::count(files, "file"),
                ui::count(batches, "batch")
            );
        }
    }

    Ok(())
}

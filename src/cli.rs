use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed household chore board.
/// Storage defaults to ~/.chorewheel/board.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "chores", version, about = "Household chore board with recurring resets")]
pub struct Cli {
    /// Path to the JSON board file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

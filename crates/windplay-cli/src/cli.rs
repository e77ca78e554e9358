use clap::{Parser, Subcommand};
use windplay_runtime::LogFormat;

use crate::error::Result;
use crate::frames::{FramesArgs, run_frames};
use crate::play::{PlayArgs, run_play};

#[derive(Debug, Parser)]
#[command(
    name = "windplay",
    about = "Assemble and play back station wind frames",
    version
)]
pub struct Cli {
    /// Log line format (pretty, compact, json). Overrides the config file.
    #[arg(long = "log-format", global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Play a wind frame JSON file in the terminal.
    Play(PlayArgs),

    /// Align observations onto a step grid and print frames as JSON.
    Frames(FramesArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Play(args) => run_play(&args, cli.log_format, &mut out),
        Commands::Frames(args) => run_frames(&args, cli.log_format, &mut out),
    }
}

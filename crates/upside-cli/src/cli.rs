use clap::{Parser, ValueHint};
use std::path::PathBuf;

/// Every flag is optional; with none the run uses `upside.toml` (if present)
/// and the built-in defaults.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level (logs go to stderr)
    #[arg(long)]
    pub log_level: Option<tracing::Level>,

    /// Configuration file [default: ./upside.toml when it exists]
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Directory holding intervals.csv, dffr.csv and da.csv
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    /// AMPL model file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub model: Option<PathBuf>,

    /// AMPL executable
    #[arg(long, value_hint = ValueHint::ExecutablePath)]
    pub ampl: Option<PathBuf>,

    /// Let the solvers print their progress logs
    #[arg(long)]
    pub verbose_solver: bool,

    /// Also list accepted bids (Q_R, Q_DA) above the noise threshold
    #[arg(long)]
    pub show_accepted: bool,
}

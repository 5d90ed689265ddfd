use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dbcview",
    version,
    about = "Browse CAN database documents in the terminal"
)]
pub struct Cli {
    /// Documents to load at startup.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Read configuration from PATH instead of the default location.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print a summary of each file and exit without starting the UI.
    #[arg(long)]
    pub summary: bool,

    /// Write the effective configuration to the config file and exit.
    #[arg(long, conflicts_with = "summary")]
    pub write_config: bool,
}

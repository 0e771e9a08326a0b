//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// techdigest: crawl Korean tech blogs into one static digest report
#[derive(Parser, Debug)]
#[command(name = "techdigest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl every enabled source and write the digest report
    Run(RunArgs),

    /// List the configured sources
    Sources(SourcesArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Keep only posts published on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub cutoff: Option<String>,

    /// Rolling window in days instead of an absolute cutoff date
    #[arg(long, conflicts_with = "cutoff")]
    pub window_days: Option<i64>,

    /// Directory the rendered report is written to
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Apply the tech-relevance keyword filter
    #[arg(long)]
    pub relevance: bool,

    /// Crawl and aggregate only; skip rendering and export
    #[arg(long)]
    pub skip_render: bool,
}

#[derive(Args, Debug)]
pub struct SourcesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

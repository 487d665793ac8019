use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use streamwatch::humanize::HumanDuration;

#[derive(Parser, Debug)]
#[command(name = "streamwatch")]
#[command(about = "HLS live stream availability checker", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check streams once and print one JSON verdict per line
    Check(CheckArgs),
    /// Track streams periodically and serve their status over HTTP
    Watch(WatchArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Stream URLs to check
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Upper bound for the whole run (e.g. "10s", "500ms")
    #[arg(long, default_value = "30s")]
    pub timeout: HumanDuration,
}

#[derive(clap::Args, Debug)]
pub struct WatchArgs {
    /// Extra stream URLs to track alongside the configured ones
    pub urls: Vec<String>,

    /// Configuration file (defaults to $STREAMWATCH_CONFIG or config/streamwatch.toml)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Address to bind the status server to
    #[arg(long)]
    pub address: Option<SocketAddr>,

    /// Override the polling interval
    #[arg(long)]
    pub interval: Option<HumanDuration>,
}

#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    /// Configuration file (defaults to $STREAMWATCH_CONFIG or config/streamwatch.toml)
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

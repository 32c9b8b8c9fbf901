use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Fabula voice skill backend
#[derive(Debug, Parser)]
#[command(name = "fabula", about = "Voice skill backend for questions and background-prepared stories")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "fabula.toml", env = "FABULA_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "FABULA_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter directives, e.g. `info` or `fabula_story=debug,info`
    #[arg(long, default_value = "info", env = "FABULA_LOG")]
    pub log_filter: String,
}

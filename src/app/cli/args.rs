//! Command line arguments for the server binary

use crate::server::api::ServerSettings;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Command line options
///
/// Every option overrides the matching key of the settings file.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "remcache-server")]
#[command(about = "Remote cache server core")]
#[command(version)]
pub struct Args {
    /// Settings file path (defaults to <config dir>/Remcache/remcache.toml)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Forward cluster-originated mutations to local listeners
    #[arg(long = "local-cluster-consistency")]
    pub local_cluster_consistency: bool,

    /// Log level
    #[arg(long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Args {
    /// Colour only when asked for and writing to a terminal
    pub fn color_enabled(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
    }

    /// Fold command line overrides into loaded settings
    pub fn apply_to(&self, mut settings: ServerSettings) -> ServerSettings {
        if self.local_cluster_consistency {
            settings.local_cluster_consistency = true;
        }
        if self.log_level.is_some() {
            settings.logging.level = self.log_level.clone();
        }
        if self.log_format.is_some() {
            settings.logging.format = self.log_format.clone();
        }
        if self.log_file.is_some() {
            settings.logging.file = self.log_file.clone();
        }
        settings
    }
}

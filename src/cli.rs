//! CLI argument parsing using clap v4

use clap::{Parser, Subcommand};

/// Thermal Coordinator - central process of a distributed temperature stabilization
///
/// Waits for the external processes to connect, then averages temperatures
/// with them round by round until every reading has settled.
#[derive(Parser, Debug)]
#[command(name = "thermal-coordinator")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the coordinator until all peers have stabilized
    Run {
        /// Initial central temperature
        #[arg(env = "THERMAL_INITIAL_TEMP", allow_negative_numbers = true)]
        initial_temp: String,

        /// Path to configuration file
        #[arg(short, long, env = "THERMAL_CONFIG")]
        config: Option<String>,

        /// Address to accept peer connections on (overrides the configuration)
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::CliConfig;

#[derive(Parser, Debug)]
#[command(name = "nebula-region", version, about = "Drive and inspect nebula-region pools")]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "NEBULA_REGION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a synthetic workload against one pool and print its statistics
    Run(RunArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Block size in bytes
    #[arg(long)]
    pub block_size: Option<usize>,

    /// Rounds to run, with a reset between consecutive rounds
    #[arg(long)]
    pub rounds: Option<usize>,

    /// Small allocations per round
    #[arg(long)]
    pub small: Option<usize>,

    /// Size of each small allocation
    #[arg(long)]
    pub small_size: Option<usize>,

    /// Large allocations per round
    #[arg(long)]
    pub large: Option<usize>,

    /// Size of each large allocation
    #[arg(long)]
    pub large_size: Option<usize>,

    /// Cleanup handlers registered per round
    #[arg(long)]
    pub cleanups: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl RunArgs {
    /// Applies flags on top of the loaded configuration
    pub fn apply(&self, config: &mut CliConfig) {
        if let Some(size) = self.block_size {
            config.pool.block_size = size;
        }
        let workload = &mut config.workload;
        if let Some(rounds) = self.rounds {
            workload.rounds = rounds;
        }
        if let Some(small) = self.small {
            workload.small = small;
        }
        if let Some(size) = self.small_size {
            workload.small_size = size;
        }
        if let Some(large) = self.large {
            workload.large = large;
        }
        if let Some(size) = self.large_size {
            workload.large_size = size;
        }
        if let Some(cleanups) = self.cleanups {
            workload.cleanups = cleanups;
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

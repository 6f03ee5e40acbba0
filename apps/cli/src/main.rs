//! `nebula-region`: drive region pools from the command line
//!
//! - `run` executes a synthetic per-request workload and reports pool stats
//! - `config` prints the configuration after all layers are merged

// free_large hands back raw payloads
#![allow(unsafe_code)]

mod cli;
mod config;
mod workload;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, OutputFormat};
use config::CliConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => {
            args.apply(&mut config);
            config.validate()?;
            let report = workload::run(&config)?;
            match args.format {
                OutputFormat::Text => {
                    println!("rounds:        {}", report.rounds);
                    println!(
                        "released:      {} large payloads early",
                        report.large_released_early
                    );
                    println!("cleanups run:  {}", report.cleanups_run);
                    println!("{}", report.stats);
                }
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&report)
                        .context("failed to encode report")?;
                    println!("{json}");
                }
            }
        }
        Commands::Config(args) => {
            config.validate()?;
            match args.format {
                OutputFormat::Text => print_config(&config),
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&config)
                        .context("failed to encode configuration")?;
                    println!("{json}");
                }
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over `-v`/`-q`; logs go to stderr so stdout stays parseable
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_config(config: &CliConfig) {
    let pool = &config.pool;
    let pattern = |p: Option<u8>| p.map_or_else(|| "none".to_string(), |b| format!("{b:#04x}"));

    println!("# allocator: {}", nebula_region::SystemAllocator::info());
    println!("[pool]");
    println!("block_size            = {}", pool.block_size);
    println!(
        "max_small_size        = {} (effective {})",
        pool.max_small_size,
        pool.effective_max_small_size()
    );
    println!("fail_threshold        = {}", pool.fail_threshold);
    println!("large_reuse_lookahead = {}", pool.large_reuse_lookahead);
    println!("alloc_pattern         = {}", pattern(pool.alloc_pattern));
    println!("reset_pattern         = {}", pattern(pool.reset_pattern));

    let workload = &config.workload;
    println!();
    println!("[workload]");
    println!("rounds     = {}", workload.rounds);
    println!("small      = {} x {} B", workload.small, workload.small_size);
    println!("large      = {} x {} B", workload.large, workload.large_size);
    println!("cleanups   = {}", workload.cleanups);
}

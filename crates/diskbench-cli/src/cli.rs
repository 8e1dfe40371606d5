use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use diskbench::BenchRunConfig;
use std::path::PathBuf;

use crate::commands::bench::{exit_status, list_cases, run_benchmark};
use crate::logging::setup_logging;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Selects the device/mode matrix to work on
#[derive(Args, Debug)]
struct MatrixArgs {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to a JSON config file",
        long_help = "Path to a JSON config file overriding the tool, devices, modes and output locations. Without it the built-in device and mode lists are used."
    )]
    config: Option<PathBuf>,

    #[arg(
        short,
        long = "device",
        value_name = "DEVICE",
        help = "Only run on this device (can be specified multiple times)",
        action = clap::ArgAction::Append
    )]
    devices: Vec<String>,

    #[arg(
        short,
        long = "workload",
        value_name = "WORKLOAD",
        help = "Only run this workload, e.g. 'randwrite' (can be specified multiple times)",
        action = clap::ArgAction::Append
    )]
    workloads: Vec<String>,
}

impl MatrixArgs {
    fn load(&self) -> Result<BenchRunConfig> {
        let mut config = match &self.config {
            Some(path) => BenchRunConfig::from(path.clone())?,
            None => BenchRunConfig::default(),
        };
        config.restrict(&self.devices, &self.workloads)?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run fio against every selected device
    #[command(about = "Run fio against every selected device and check for IOPS output")]
    Run {
        #[command(flatten)]
        matrix: MatrixArgs,

        #[arg(
            short,
            long,
            value_name = "DIR",
            help = "Directory for attachments, results and logs (overrides config)"
        )]
        output_dir: Option<PathBuf>,
    },

    /// Show the cases and their command lines without running anything
    #[command(about = "List the benchmark cases and the exact fio command lines")]
    List {
        #[command(flatten)]
        matrix: MatrixArgs,
    },
}

pub fn cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run { matrix, output_dir } => {
            let mut config = matrix.load()?;
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }

            let guard = setup_logging(&config.output_dir.join("logs"))?;
            let summary = run_benchmark(config)?;
            drop(guard);

            let code = exit_status(&summary);
            if code != 0 {
                std::process::exit(code);
            }
        }
        Command::List { matrix } => {
            list_cases(&matrix.load()?);
        }
    }
    Ok(())
}

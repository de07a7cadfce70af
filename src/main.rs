//! csprobe command line tool
//!
//! Subcommands:
//! - `decode`  structural report of a controller assignment file
//! - `analyze` marker spacing, long strings and OSC paths
//! - `diff`    block-by-block comparison of two snapshots
//! - `monitor` capture snapshots while the file changes

use clap::{ArgAction, Parser, Subcommand};
use csprobe::analyzer::analyze_file;
use csprobe::config::validate_interval;
use csprobe::decoder::decode_file;
use csprobe::diff::{compare_files, DiffOptions};
use csprobe::error::{ProbeError, ProbeResult};
use csprobe::monitor::{
    default_target, install_interrupt_flag, Monitor, MonitorOptions, ProcessDiffer,
    CS_FILE_RELATIVE_PATH,
};
use csprobe::ProbeConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "csprobe")]
#[command(about = "Probe Logic Pro controller assignment (.cs) files")]
#[command(version)]
struct Cli {
    /// JSON configuration file overriding the built-in limits and device names
    #[arg(long, global = true, env = "CSPROBE_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a controller assignment file into a structural report
    Decode {
        /// Path to the .cs file to decode
        filepath: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze the structure of a controller assignment file
    Analyze {
        /// Path to the .cs file to analyze
        filepath: PathBuf,
    },

    /// Compare two controller assignment files
    Diff {
        /// Path to the first (original) file
        file1: PathBuf,

        /// Path to the second (modified) file
        file2: PathBuf,

        /// Number of context bytes to show around differences
        #[arg(short, long)]
        context: Option<usize>,
    },

    /// Monitor the controller assignment file and snapshot every change
    Monitor {
        /// Polling interval in seconds
        #[arg(short, long, default_value_t = 1.0)]
        interval: f64,

        /// Directory to save snapshots of changed files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Disable diff output when changes are detected
        #[arg(long)]
        no_diff: bool,

        /// Watch this file instead of the Logic Pro preferences file
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();
}

fn run_decode(
    config: &ProbeConfig,
    filepath: &Path,
    json: bool,
    output: Option<&Path>,
) -> ProbeResult<()> {
    let report = decode_file(filepath, config)?;
    let rendered = if json {
        report.to_json()?
    } else {
        report.to_text(config.text_mapping_limit)
    };

    match output {
        Some(path) => {
            fs::write(path, rendered).map_err(|e| ProbeError::io(path, e))?;
            println!("Output written to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn run_diff(
    config: &ProbeConfig,
    file1: &Path,
    file2: &Path,
    context: Option<usize>,
) -> ProbeResult<()> {
    let options = DiffOptions::from_config(config, context);
    let report = compare_files(file1, file2, &options)?;
    print!("{}", report);
    Ok(())
}

fn run_monitor(
    config: &ProbeConfig,
    config_path: Option<PathBuf>,
    interval: f64,
    output_dir: Option<PathBuf>,
    no_diff: bool,
    file: Option<PathBuf>,
) -> ProbeResult<()> {
    let interval = validate_interval(interval)?;

    let Some(target) = file.or_else(default_target) else {
        return Err(ProbeError::MissingFile(PathBuf::from(CS_FILE_RELATIVE_PATH)));
    };

    if !target.is_file() {
        eprintln!(
            "Error: Logic Pro controller assignment file not found at {}",
            target.display()
        );
        eprintln!("Make sure Logic Pro is installed and has been run at least once.");
        process::exit(1);
    }

    println!("Monitoring: {}", target.display());
    println!("Make changes in Logic Pro's Controller Assignments window and save them.");
    println!("Press Ctrl+C to stop monitoring.");

    let shutdown = install_interrupt_flag()?;
    let differ =
        ProcessDiffer::current_exe(config.default_context_bytes)?.with_config(config_path);
    let options = MonitorOptions {
        target,
        interval,
        output_dir,
        diff: !no_diff,
    };

    let mut monitor = Monitor::start(options, differ)?;
    monitor.run(&shutdown)
}

fn run(cli: Cli) -> ProbeResult<()> {
    let config = ProbeConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Decode {
            filepath,
            json,
            output,
        } => run_decode(&config, &filepath, json, output.as_deref()),
        Commands::Analyze { filepath } => {
            print!("{}", analyze_file(&filepath, &config)?);
            Ok(())
        }
        Commands::Diff {
            file1,
            file2,
            context,
        } => run_diff(&config, &file1, &file2, context),
        Commands::Monitor {
            interval,
            output_dir,
            no_diff,
            file,
        } => run_monitor(&config, cli.config, interval, output_dir, no_diff, file),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

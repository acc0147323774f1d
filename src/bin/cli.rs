use clap::{Args, Parser, Subcommand};
use prc_op::logging::init_logging;
use prc_op::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prc-op")]
#[command(version, about = "Clean and aggregate the outpatient claims export for survey upload", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process the export waiting in the input directory
    Run(RunArgs),
    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args)]
struct RunArgs {
    /// Configuration file (defaults to the per-user config location)
    #[arg(short, long, env = "PRC_OP_CONFIG")]
    config: Option<PathBuf>,
    /// Directory the export is dropped into
    #[arg(long)]
    input_dir: Option<PathBuf>,
    /// Directory the cleaned file is written to
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Directory holding the error log
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Leave the source export in place after writing
    #[arg(long)]
    keep_input: bool,
    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show {
        #[arg(short, long, env = "PRC_OP_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Write the default configuration
    Init {
        /// Destination (defaults to the per-user config location)
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Config(ConfigCommand::Show { config }) => cmd_config_show(config),
        Commands::Config(ConfigCommand::Init { path, force }) => cmd_config_init(path, force),
    }
}

fn cmd_run(args: RunArgs) {
    let mut config = match PipelineConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e.user_message());
            std::process::exit(1);
        }
    };
    if let Some(dir) = args.input_dir {
        config.input_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(dir) = args.log_dir {
        config.log_dir = dir;
    }
    if args.keep_input {
        config.delete_source = false;
    }

    let guard = match init_logging(&config.log_dir, &config.log_file_name) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!(
                "Cannot open log file {}: {}",
                config.log_file_path().display(),
                e
            );
            std::process::exit(1);
        }
    };

    match Pipeline::new(config).run() {
        Ok(report) => {
            if args.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("Could not render report: {}", e),
                }
            } else {
                match &report.source {
                    SourceDisposition::Deleted => {
                        println!("File {} deleted.", report.input_file.display())
                    }
                    SourceDisposition::DeleteFailed { reason } => println!(
                        "Error deleting file {}: {}",
                        report.input_file.display(),
                        reason
                    ),
                    SourceDisposition::Kept => {}
                }
                println!(
                    "Wrote {} rows ({} of {} input records kept) to {}",
                    report.output_rows,
                    report.filter.retained_records,
                    report.filter.input_records,
                    report.output_file.display()
                );
            }
        }
        Err(e) => {
            tracing::error!(error = ?e, "Run failed: {}", e);
            eprintln!("Run failed: {}", e.user_message());
            drop(guard);
            std::process::exit(1);
        }
    }
}

fn cmd_config_show(config: Option<PathBuf>) {
    let result = PipelineConfig::load(config.as_deref()).and_then(|c| c.to_toml());
    match result {
        Ok(toml) => print!("{}", toml),
        Err(e) => {
            eprintln!("Error loading configuration: {}", e.user_message());
            std::process::exit(1);
        }
    }
}

fn cmd_config_init(path: Option<PathBuf>, force: bool) {
    let Some(path) = path.or_else(PipelineConfig::default_config_path) else {
        eprintln!("No default configuration directory on this platform; pass --path");
        std::process::exit(1);
    };

    if path.exists() && !force {
        eprintln!("{} already exists (use --force to overwrite)", path.display());
        std::process::exit(1);
    }

    match PipelineConfig::default().save(&path) {
        Ok(()) => println!("Wrote default configuration to {}", path.display()),
        Err(e) => {
            eprintln!("Error writing configuration: {}", e.user_message());
            std::process::exit(1);
        }
    }
}

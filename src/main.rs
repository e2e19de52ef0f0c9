//! @ai:module:intent CLI entry point for generating service descriptors
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on scanner, output

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use servicefile::{
    output, scan, AggregateConfig, DuplicatePolicy, OutputFormat, ScanConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "servicefile")]
#[command(author, version, about = "Generate service descriptors from source comment tags")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse service tags from source and write descriptors
    Parse {
        /// Directory to analyze
        #[arg(long, short, default_value = ".")]
        dir: PathBuf,

        /// Recursively analyze subdirectories
        #[arg(long, short, default_value_t = true, action = ArgAction::Set)]
        recursive: bool,

        /// Output file path; with several services, the file-name suffix
        #[arg(long, short, default_value = "servicefile.yaml")]
        output: PathBuf,

        /// Fill missing repository URLs from the git remote
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        detect_repository: bool,

        /// Seconds to wait for the git remote lookup
        #[arg(long, default_value_t = 5)]
        git_timeout: u64,

        /// Let a later service declaration override an earlier one with the same name
        #[arg(long)]
        allow_duplicate_services: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "yaml")]
        format: Format,

        /// Print descriptors to stdout instead of writing files
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Yaml => OutputFormat::Yaml,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("servicefile={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse {
            dir,
            recursive,
            output: output_path,
            detect_repository,
            git_timeout,
            allow_duplicate_services,
            format,
            dry_run,
        } => {
            let config = ScanConfig {
                recursive,
                detect_repository,
                git_timeout: Duration::from_secs(git_timeout),
                aggregate: AggregateConfig {
                    duplicate_services: if allow_duplicate_services {
                        DuplicatePolicy::LastWins
                    } else {
                        DuplicatePolicy::Reject
                    },
                },
            };

            let files = match scan(&dir, &config) {
                Ok(files) => files,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(1);
                }
            };

            let planned = match output::plan_outputs(&files, &output_path, format.into()) {
                Ok(planned) => planned,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(2);
                }
            };

            if dry_run {
                for item in &planned {
                    println!("# {}\n{}", item.path.display(), item.content);
                }
                return ExitCode::SUCCESS;
            }

            match output::write_outputs(&planned) {
                Ok(()) => {
                    print!("{}", output::format_summary(&planned));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(2)
                }
            }
        }
    }
}

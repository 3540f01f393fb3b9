//! labgrade CLI, the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "labgrade", version, about = "Plant physiology lab report grader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a lab-report workbook
    Grade {
        /// Workbook to grade (.xlsx, .xlsm, .xls or .ods)
        #[arg(long)]
        input: PathBuf,

        /// Output directory (default: output_dir from the config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, document, all (comma-separated)
        #[arg(long, default_value = "all")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check the workbook format and read every range without grading
    Check {
        /// Workbook to check
        #[arg(long)]
        input: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List every cell range the grader reads
    Schema,

    /// Grade the built-in sample workbook
    Demo {
        /// Output directory (default: output_dir from the config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, document, all (comma-separated)
        #[arg(long, default_value = "all")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write the sample workbook as .xlsx, filled in with correct answers
    Template {
        /// Destination file
        #[arg(long, default_value = "labgrade-sample.xlsx")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Create a starter labgrade.toml
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("labgrade=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            input,
            output,
            format,
            config,
        } => commands::grade::execute(input, output, format, config),
        Commands::Check { input, config } => commands::check::execute(input, config),
        Commands::Schema => commands::schema::execute(),
        Commands::Demo {
            output,
            format,
            config,
        } => commands::demo::execute(output, format, config),
        Commands::Template { output, force } => commands::template::execute(output, force),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

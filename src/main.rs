use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use contribkit::cli;
use contribkit::config::Config;
use contribkit::metadata::MetadataFormat;

#[derive(Parser)]
#[command(name = "contribkit", version)]
#[command(about = "Scaffold, validate and document contributions", long_about = None)]
struct Cli {
    /// Path to config file (defaults to ./contribkit.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Override the contribution source root
    #[arg(long, global = true)]
    contrib_dir: Option<PathBuf>,

    /// Override the generated documentation root
    #[arg(long, global = true)]
    docs_dir: Option<PathBuf>,

    /// Metadata descriptor format (pyproject, yaml)
    #[arg(long, global = true)]
    format: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new contribution with the standard files
    Init {
        /// Contribution name (lowercase letters, digits, underscores)
        name: String,

        /// One-line description for the README and descriptor
        #[arg(short, long)]
        description: Option<String>,

        /// Dependency to declare in the descriptor (repeatable)
        #[arg(long = "dependency")]
        dependencies: Vec<String>,
    },

    /// Add missing standard files to every existing contribution
    Fix,

    /// Check metadata descriptors for required fields
    Validate {
        /// Contribution to check (all when omitted)
        name: Option<String>,
    },

    /// Reconcile the documentation tree with the contribution tree
    Sync {
        /// Regenerate the pages of every contribution before indexing
        #[arg(long)]
        full: bool,
    },

    /// Generate the documentation pages of one contribution
    Docs {
        /// Contribution name
        name: String,
    },

    /// Write a single page listing every contribution
    Catalog {
        /// Output file path (default: from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load_with_path(cli.config)?;
    apply_overrides(&mut config, cli.contrib_dir, cli.docs_dir, cli.format)?;

    match cli.command {
        Commands::Init {
            name,
            description,
            dependencies,
        } => cli::init::run(&config, &name, description, dependencies),
        Commands::Fix => cli::fix::run(&config),
        Commands::Validate { name } => cli::validate::run(&config, name.as_deref()),
        Commands::Sync { full } => cli::sync::run(&config, full),
        Commands::Docs { name } => cli::docs::run(&config, &name),
        Commands::Catalog { output } => cli::catalog::run(&config, output),
    }
}

fn apply_overrides(
    config: &mut Config,
    contrib_dir: Option<PathBuf>,
    docs_dir: Option<PathBuf>,
    format: Option<String>,
) -> Result<()> {
    if let Some(dir) = contrib_dir {
        info!("Overriding contrib_dir: {}", dir.display());
        config.paths.contrib_dir = dir;
    }
    if let Some(dir) = docs_dir {
        info!("Overriding docs_dir: {}", dir.display());
        config.paths.docs_dir = dir;
    }
    if let Some(format) = format {
        let format: MetadataFormat = format.parse()?;
        info!("Overriding metadata format: {}", format.as_str());
        config.metadata.format = format;
    }
    Ok(())
}

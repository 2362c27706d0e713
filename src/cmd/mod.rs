mod convert;
mod import;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use import::ImportArgs;

#[derive(Parser)]
#[command(name = "mysql-to-pg")]
#[command(version)]
#[command(about = "Translate a MySQL dump to PostgreSQL and load it", long_about = None)]
pub struct Cli {
    /// Verbose output (debug logging, failure counts in the summary)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a MySQL dump and load it into PostgreSQL
    Import(ImportArgs),

    /// Translate a MySQL dump to PostgreSQL without loading it
    Convert {
        /// Input SQL file (supports .gz, .bz2, .xz, .zst compression)
        file: PathBuf,

        /// Output SQL file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Table name for INSERT statements that have none (default: from file name)
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    match cli.command {
        Commands::Import(args) => import::run(args, cli.verbose),
        Commands::Convert {
            file,
            output,
            table,
        } => convert::run(file, output, table),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "mysql-to-pg",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mysql_to_pg={}", level)));

    // A subscriber may already be installed when run from tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

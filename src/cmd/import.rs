//! Import command CLI handler.

use crate::config::{FileConfig, ImportConfig};
use crate::import;
use crate::loader::ImportStats;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub struct ImportArgs {
    /// Input SQL file (supports .gz, .bz2, .xz, .zst compression)
    pub file: PathBuf,

    /// YAML config file with `database:` and `import:` sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Database host
    #[arg(long, env = "PGHOST")]
    pub host: Option<String>,

    /// Database port
    #[arg(long, env = "PGPORT")]
    pub port: Option<u16>,

    /// Database name
    #[arg(long, env = "PGDATABASE")]
    pub dbname: Option<String>,

    /// Database user
    #[arg(long, env = "PGUSER")]
    pub user: Option<String>,

    /// Database password
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Schema to load into (applied via search_path)
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Table name for INSERT statements that have none (default: from file name)
    #[arg(short, long)]
    pub table: Option<String>,

    /// Write the first INSERT before and after translation to this file
    #[arg(long)]
    pub debug_file: Option<PathBuf>,

    /// Commit after every N data statements
    #[arg(long)]
    pub commit_every: Option<usize>,

    /// Wrap statements in explicit transactions between commit points
    #[arg(long)]
    pub no_autocommit: bool,

    /// Translate and plan without connecting to the database
    #[arg(long)]
    pub dry_run: bool,

    /// Show progress during the data phase
    #[arg(short, long)]
    pub progress: bool,
}

impl ImportArgs {
    /// Layer CLI values over the config file over the defaults.
    pub fn into_config(self) -> anyhow::Result<ImportConfig> {
        let file_config = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let mut config = ImportConfig::new(self.file);
        let mut database = file_config.database;

        if let Some(host) = self.host {
            database.host = host;
        }
        if let Some(port) = self.port {
            database.port = port;
        }
        if let Some(dbname) = self.dbname {
            database.dbname = dbname;
        }
        if let Some(user) = self.user {
            database.user = user;
        }
        if self.password.is_some() {
            database.password = self.password;
        }
        if let Some(schema) = self.schema {
            database.schema = schema;
        }
        if self.no_autocommit {
            database.autocommit = false;
        }

        config.database = database;
        config.load = file_config.import.load;
        if let Some(n) = self.commit_every {
            config.load.commit_every = n;
        }
        if config.load.commit_every == 0 {
            anyhow::bail!("commit_every must be at least 1");
        }
        if config.load.progress_every == 0 {
            anyhow::bail!("progress_every must be at least 1");
        }
        config.table_name = self.table.or(file_config.import.table);
        config.debug_file = self.debug_file.or(file_config.import.debug_file);
        config.progress = self.progress;
        config.dry_run = self.dry_run;

        Ok(config)
    }
}

pub fn run(args: ImportArgs, verbose: bool) -> anyhow::Result<()> {
    let config = args.into_config()?;
    let stats = import::run(&config)?;

    if config.dry_run {
        print_plan(&stats);
    } else {
        print_stats(&stats, verbose);
    }

    Ok(())
}

fn print_plan(stats: &ImportStats) {
    eprintln!();
    eprintln!("Import Plan:");
    eprintln!("  CREATE TABLE statements: {}", stats.create_statements);
    eprintln!("  Data statements: {}", stats.data_statements);
    eprintln!();
    eprintln!("(Dry run - nothing executed)");
}

fn print_stats(stats: &ImportStats, verbose: bool) {
    eprintln!();
    eprintln!("✅ Import completed successfully!");
    eprintln!("  {}", stats);

    if verbose {
        eprintln!("  Destination table bootstrapped: {}", stats.table_bootstrapped);
        eprintln!("  CREATE TABLE failures: {}", stats.create_failed);
        eprintln!("  Data statements skipped: {}", stats.data_failed);
        eprintln!("  Commits: {}", stats.commits);
    }
}

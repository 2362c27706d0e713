//! Run configuration.
//!
//! Everything the import needs is carried in [`ImportConfig`] and
//! [`DatabaseConfig`]; nothing is read from globals. Values can come from a
//! YAML file (`--config`), with explicit CLI flags layered on top.

use crate::translate::DEFAULT_SNIPPET_CHARS;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Connection parameters for the target PostgreSQL server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: Option<String>,
    /// Schema applied with `SET search_path` before anything else runs
    pub schema: String,
    /// Run each statement in its own implicit transaction
    pub autocommit: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "postgres".to_string(),
            user: "postgres".to_string(),
            password: None,
            schema: "public".to_string(),
            autocommit: true,
        }
    }
}

impl DatabaseConfig {
    /// Build the `postgres` connection config
    pub fn to_pg_config(&self) -> postgres::Config {
        let mut config = postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .dbname(&self.dbname)
            .user(&self.user)
            .application_name("mysql-to-pg");
        if let Some(password) = &self.password {
            config.password(password);
        }
        config
    }
}

/// Knobs for the load phase.
///
/// The loader treats a zero interval as 1; the CLI rejects zero outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Commit after every Nth data statement (by loop position)
    pub commit_every: usize,
    /// Emit a progress notice after every Nth data statement
    pub progress_every: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            commit_every: 10,
            progress_every: 100,
        }
    }
}

/// Configuration for an import run
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    /// Input dump file (optionally compressed)
    pub input: PathBuf,
    /// Table name used when the dump has none; derived from `input` if None
    pub table_name: Option<String>,
    pub database: DatabaseConfig,
    pub load: LoadOptions,
    /// Where to write the first-INSERT before/after snippet
    pub debug_file: Option<PathBuf>,
    /// Length of the logged snippets, in characters
    pub snippet_chars: usize,
    /// Show a progress bar during the data phase
    pub progress: bool,
    /// Translate and plan, but never connect
    pub dry_run: bool,
}

impl ImportConfig {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
            ..Default::default()
        }
    }
}

/// Import settings that may appear in a YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    pub table: Option<String>,
    pub debug_file: Option<PathBuf>,
    #[serde(flatten)]
    pub load: LoadOptions,
}

/// Complete YAML configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub database: DatabaseConfig,
    pub import: ImportSection,
}

impl FileConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn parse(yaml: &str) -> anyhow::Result<Self> {
        let config: FileConfig = serde_yaml_ng::from_str(yaml)?;
        Ok(config)
    }
}

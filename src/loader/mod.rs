//! Loading translated statements into PostgreSQL.
//!
//! The load runs in three steps against one [`SqlSession`]:
//!
//! 1. `SET search_path`, which must succeed.
//! 2. Optional bootstrap of a permissive (all-TEXT) destination table.
//! 3. Execution of the [`StatementBatch`]: CREATE TABLE statements first,
//!    then everything else.
//!
//! Schema work is committed as soon as each step succeeds, so a later
//! failure never undoes it. Schema failures are reported and rolled back.
//! Data failures are skipped without a word; a partial load is an accepted
//! outcome.

mod batch;
mod session;
mod table;

pub use batch::StatementBatch;
pub use session::{PgSession, QueryClient, SqlSession};
pub use table::TableSpec;
#[allow(unused_imports)]
pub use table::infer_table_spec;

use crate::config::LoadOptions;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

/// Error messages in reports are cut to this many characters
const ERROR_PREVIEW_CHARS: usize = 100;

/// Statistics from a load
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportStats {
    /// Whether the all-TEXT destination table was created
    pub table_bootstrapped: bool,
    /// CREATE TABLE statements found in the dump
    pub create_statements: usize,
    /// CREATE TABLE statements that executed
    pub tables_created: usize,
    /// CREATE TABLE statements that failed and were rolled back
    pub create_failed: usize,
    /// Data statements found in the dump
    pub data_statements: usize,
    /// Data statements that executed
    pub data_executed: usize,
    /// Data statements that failed and were skipped
    pub data_failed: usize,
    /// Data-phase commits issued, including the final one
    pub commits: usize,
    /// Load duration in seconds
    pub duration_secs: f64,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} tables created, {}/{} data statements executed in {:.2}s",
            self.tables_created, self.data_executed, self.data_statements, self.duration_secs
        )
    }
}

/// Executes statements against a session
pub struct Loader<'a, S: SqlSession> {
    session: &'a mut S,
    options: &'a LoadOptions,
    progress: bool,
}

impl<'a, S: SqlSession> Loader<'a, S> {
    pub fn new(session: &'a mut S, options: &'a LoadOptions) -> Self {
        Self {
            session,
            options,
            progress: false,
        }
    }

    /// Show a progress bar while data statements run
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Point unqualified names at `schema`. Failure is fatal.
    pub fn set_search_path(&mut self, schema: &str) -> Result<()> {
        self.session
            .execute(&format!("SET search_path TO {};", schema))
            .with_context(|| format!("Failed to set search_path to {}", schema))?;
        self.session
            .commit()
            .with_context(|| format!("Failed to commit search_path {}", schema))
    }

    /// Drop and recreate the destination table with every column as TEXT.
    ///
    /// Skipped when the table has no columns. A failure is reported and rolled
    /// back; it never aborts the load.
    pub fn bootstrap(&mut self, spec: &TableSpec, stats: &mut ImportStats) -> Result<()> {
        let Some(sql) = spec.bootstrap_sql() else {
            tracing::info!("No column list found, relying on CREATE TABLE statements in the dump");
            return Ok(());
        };

        match self.session.execute(&sql) {
            Ok(()) => {
                stats.table_bootstrapped = true;
                tracing::info!(
                    "✓ Table {} created with {} columns",
                    spec.name,
                    spec.columns.len()
                );
                self.commit_schema();
            }
            Err(e) => {
                tracing::warn!("Table creation: {}", error_preview(&e));
                self.rollback_schema();
            }
        }

        Ok(())
    }

    /// Run every statement in the batch, CREATE TABLE statements first.
    pub fn execute(&mut self, batch: &StatementBatch, stats: &mut ImportStats) -> Result<()> {
        self.execute_creates(&batch.create_statements, stats)?;
        self.execute_data(&batch.other_statements, stats)
    }

    fn execute_creates(&mut self, statements: &[String], stats: &mut ImportStats) -> Result<()> {
        stats.create_statements = statements.len();
        tracing::info!("Creating tables ({} statements)...", statements.len());

        for stmt in statements {
            match self.session.execute(&terminated(stmt)) {
                Ok(()) => {
                    stats.tables_created += 1;
                    tracing::info!("✓ Created table");
                    self.commit_schema();
                }
                Err(e) => {
                    stats.create_failed += 1;
                    tracing::warn!("Table creation skipped: {}", error_preview(&e));
                    self.rollback_schema();
                }
            }
        }

        Ok(())
    }

    fn commit_schema(&mut self) {
        if let Err(e) = self.session.commit() {
            tracing::warn!("Schema commit failed: {}", error_preview(&e));
        }
    }

    fn rollback_schema(&mut self) {
        if let Err(e) = self.session.rollback() {
            tracing::warn!("Rollback failed: {}", error_preview(&e));
        }
    }

    fn execute_data(&mut self, statements: &[String], stats: &mut ImportStats) -> Result<()> {
        stats.data_statements = statements.len();
        tracing::info!("Inserting data ({} statements)...", statements.len());

        let progress_bar = if self.progress {
            let pb = ProgressBar::new(statements.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                    .unwrap()
                    .progress_chars("=>-"),
            );
            Some(pb)
        } else {
            None
        };

        // Zero intervals behave as 1
        let commit_every = self.options.commit_every.max(1);
        let progress_every = self.options.progress_every.max(1);

        for (idx, stmt) in statements.iter().enumerate() {
            let position = idx + 1;

            if let Some(ref pb) = progress_bar {
                pb.set_position(position as u64);
            }

            if self.session.execute(&terminated(stmt)).is_err() {
                stats.data_failed += 1;
                continue;
            }
            stats.data_executed += 1;

            if position % commit_every == 0 && self.session.commit().is_ok() {
                stats.commits += 1;
            }

            if position % progress_every == 0 {
                match progress_bar {
                    Some(ref pb) => pb.set_message(format!("✓ Processed {} statements", position)),
                    None => tracing::info!("✓ Processed {} statements", position),
                }
            }
        }

        self.session.commit().context("Final commit failed")?;
        stats.commits += 1;

        if let Some(pb) = progress_bar {
            pb.finish_with_message(format!("{} statements processed", statements.len()));
        }

        Ok(())
    }
}

/// Run a batch against a session with default progress settings.
pub fn execute<S: SqlSession>(
    batch: &StatementBatch,
    session: &mut S,
    options: &LoadOptions,
) -> Result<ImportStats> {
    let start = std::time::Instant::now();
    let mut stats = ImportStats::default();

    Loader::new(session, options).execute(batch, &mut stats)?;

    stats.duration_secs = start.elapsed().as_secs_f64();
    Ok(stats)
}

fn terminated(stmt: &str) -> String {
    format!("{};", stmt)
}

fn error_preview(err: &anyhow::Error) -> String {
    format!("{:#}", err).chars().take(ERROR_PREVIEW_CHARS).collect()
}

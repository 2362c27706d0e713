//! The import pipeline: read, translate, infer, load.

use crate::config::ImportConfig;
use crate::loader::{ImportStats, Loader, PgSession, SqlSession, StatementBatch, TableSpec};
use crate::source;
use crate::translate::{self, first_insert_snippet};
use anyhow::Result;
use std::time::Instant;

/// Everything derived from the dump before a connection is needed
#[derive(Debug, Clone)]
pub struct PreparedImport {
    /// Name used for `INSERT INTO (` statements with no table
    pub fallback_table: String,
    pub translated: String,
    pub table: TableSpec,
    pub batch: StatementBatch,
}

/// Read and translate the dump, and plan the load.
pub fn prepare(config: &ImportConfig) -> Result<PreparedImport> {
    let original = source::read_dump(&config.input)?;

    let fallback_table = match &config.table_name {
        Some(name) => name.clone(),
        None => {
            let name = translate::table_name_from_path(&config.input);
            tracing::info!("Detected table name from filename: {}", name);
            name
        }
    };

    let original_insert = first_insert_snippet(&original, config.snippet_chars);
    if let Some(snippet) = original_insert {
        tracing::info!("Original SQL (first INSERT):\n{}\n", snippet);
    }

    let translated = translate::translate(&original, &fallback_table);

    if let Some(converted_insert) = first_insert_snippet(&translated, config.snippet_chars) {
        tracing::info!("Converted SQL (first INSERT):\n{}\n", converted_insert);

        if let Some(ref path) = config.debug_file {
            translate::write_debug_file(path, original_insert.unwrap_or_default(), converted_insert)?;
            tracing::debug!("Wrote debug snippet to {}", path.display());
        }
    }

    let table = TableSpec::infer(&translated, &fallback_table);
    let batch = StatementBatch::partition(&translated);

    Ok(PreparedImport {
        fallback_table,
        translated,
        table,
        batch,
    })
}

/// Load a prepared import through an already-open session.
pub fn load<S: SqlSession>(
    prepared: &PreparedImport,
    config: &ImportConfig,
    session: &mut S,
) -> Result<ImportStats> {
    let start = Instant::now();
    let mut stats = ImportStats::default();

    let mut loader = Loader::new(session, &config.load).with_progress(config.progress);
    loader.set_search_path(&config.database.schema)?;
    loader.bootstrap(&prepared.table, &mut stats)?;
    loader.execute(&prepared.batch, &mut stats)?;

    stats.duration_secs = start.elapsed().as_secs_f64();
    Ok(stats)
}

/// Run a full import against the configured database.
///
/// With `dry_run` set, nothing is executed and the returned stats only carry
/// the statement counts.
pub fn run(config: &ImportConfig) -> Result<ImportStats> {
    let prepared = prepare(config)?;

    if config.dry_run {
        return Ok(ImportStats {
            create_statements: prepared.batch.create_statements.len(),
            data_statements: prepared.batch.other_statements.len(),
            ..Default::default()
        });
    }

    let mut session = PgSession::connect(&config.database)?;
    let stats = load(&prepared, config, &mut session)?;
    session.close()?;

    Ok(stats)
}

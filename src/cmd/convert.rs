//! Convert command CLI handler.

use crate::source;
use crate::translate;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub fn run(file: PathBuf, output: Option<PathBuf>, table: Option<String>) -> anyhow::Result<()> {
    let original = source::read_dump(&file)?;
    let fallback_table = table.unwrap_or_else(|| translate::table_name_from_path(&file));
    let translated = translate::translate(&original, &fallback_table);

    let mut writer: Box<dyn Write> = match &output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::with_capacity(256 * 1024, file))
        }
        None => Box::new(BufWriter::new(std::io::stdout())),
    };

    writer.write_all(translated.as_bytes())?;
    writer.flush()?;

    if let Some(path) = output {
        eprintln!(
            "Converted {} → {} ({} bytes)",
            file.display(),
            path.display(),
            translated.len()
        );
    }

    Ok(())
}

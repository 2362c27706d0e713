//! First-INSERT snippets for eyeballing what the translation did.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// How many characters of the first INSERT are shown by default.
pub const DEFAULT_SNIPPET_CHARS: usize = 500;

/// Return up to `max_chars` characters starting at the first `INSERT INTO`.
pub fn first_insert_snippet(sql: &str, max_chars: usize) -> Option<&str> {
    let start = sql.find("INSERT INTO")?;
    let rest = &sql[start..];
    let end = rest
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Write the original and converted snippet side by side.
pub fn write_debug_file(path: &Path, original: &str, converted: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create debug file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "ORIGINAL:")?;
    writeln!(writer, "{}", original)?;
    writeln!(writer)?;
    writeln!(writer, "CONVERTED:")?;
    write!(writer, "{}", converted)?;
    writer.flush()?;

    Ok(())
}

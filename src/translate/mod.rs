//! MySQL → PostgreSQL dialect translation.
//!
//! Translation is a fixed sequence of lexical substitutions applied to the
//! whole dump text (see [`rules`]). Nothing here parses SQL: quoting and
//! escaping are not tracked, so a pattern that happens to appear inside a
//! string literal is rewritten too.

pub mod rules;
mod snippet;

pub use rules::translate;
pub use snippet::{first_insert_snippet, write_debug_file, DEFAULT_SNIPPET_CHARS};

use crate::source::Compression;
use std::path::Path;

/// Derive a fallback table name from a dump file name.
///
/// A trailing compression extension is dropped first, then every `.sql`
/// occurrence is removed: `ci_erp_users_details.sql` → `ci_erp_users_details`.
pub fn table_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let without_compression = if Compression::from_path(path) == Compression::None {
        file_name.as_str()
    } else {
        file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(file_name.as_str())
    };

    without_compression.replace(".sql", "")
}

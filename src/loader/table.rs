//! Destination table inference and bootstrap.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_FIRST_INSERT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"INSERT INTO\s+(\w+)\s*\((.*?)\)").unwrap());

/// Target table inferred from the first INSERT of a dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<String>,
}

impl TableSpec {
    /// Infer the target table from the first `INSERT INTO name (cols)`.
    ///
    /// Only the first match is consulted. When nothing matches, the result has
    /// the fallback name and no columns.
    pub fn infer(translated: &str, fallback_table: &str) -> Self {
        let Some(caps) = RE_FIRST_INSERT.captures(translated) else {
            return Self {
                name: fallback_table.to_string(),
                columns: Vec::new(),
            };
        };

        let name = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(fallback_table)
            .to_string();

        let columns = caps
            .get(2)
            .map(|m| m.as_str())
            .unwrap_or_default()
            .split(',')
            .map(|c| c.trim().to_string())
            .collect();

        Self { name, columns }
    }

    /// Whether there are columns to build a destination table from
    pub fn has_columns(&self) -> bool {
        !self.columns.is_empty()
    }

    /// `DROP` + `CREATE` with every column typed as TEXT.
    ///
    /// Returns None when there are no columns to create.
    pub fn bootstrap_sql(&self) -> Option<String> {
        if !self.has_columns() {
            return None;
        }

        let column_defs = self
            .columns
            .iter()
            .map(|c| format!("{} TEXT", c))
            .collect::<Vec<_>>()
            .join(", ");

        Some(format!(
            "DROP TABLE IF EXISTS {name};\nCREATE TABLE {name} ({column_defs});",
            name = self.name
        ))
    }
}

/// Free-function form of [`TableSpec::infer`].
pub fn infer_table_spec(translated: &str, fallback_table: &str) -> TableSpec {
    TableSpec::infer(translated, fallback_table)
}

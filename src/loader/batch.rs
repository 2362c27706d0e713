//! Statement partitioning.

/// Translated statements split into schema and data phases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementBatch {
    /// Statements beginning with `CREATE TABLE` (case-insensitive)
    pub create_statements: Vec<String>,
    /// Everything else, mostly INSERTs
    pub other_statements: Vec<String>,
}

impl StatementBatch {
    /// Split on `;` and classify each trimmed, non-empty fragment.
    ///
    /// The split is naive: a `;` inside a string literal or comment ends the
    /// statement just the same. Source order is kept within each partition.
    pub fn partition(sql: &str) -> Self {
        let mut batch = StatementBatch::default();

        for stmt in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            if is_create_table(stmt) {
                batch.create_statements.push(stmt.to_string());
            } else {
                batch.other_statements.push(stmt.to_string());
            }
        }

        batch
    }

    pub fn len(&self) -> usize {
        self.create_statements.len() + self.other_statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_create_table(stmt: &str) -> bool {
    const PREFIX: &str = "CREATE TABLE";
    stmt.get(..PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(PREFIX))
}

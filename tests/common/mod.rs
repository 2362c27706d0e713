//! Shared test helpers.

#![allow(dead_code)]

use mysql_to_pg::loader::{QueryClient, SqlSession};

/// A call made against a [`RecordingSession`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Execute(String),
    Commit,
    Rollback,
}

/// In-memory session that records every call.
///
/// Statements for which `fails` returns true produce an error (after being
/// recorded), which is how tests simulate server-side failures.
pub struct RecordingSession {
    pub calls: Vec<Call>,
    fails: Box<dyn Fn(&str) -> bool>,
    rollback_fails: bool,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::failing_when(|_| false)
    }

    pub fn failing_when<F>(fails: F) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        Self {
            calls: Vec::new(),
            fails: Box::new(fails),
            rollback_fails: false,
        }
    }

    /// Make every rollback return an error after being recorded
    pub fn with_failing_rollback(mut self) -> Self {
        self.rollback_fails = true;
        self
    }

    pub fn executed(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Execute(sql) => Some(sql.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl SqlSession for RecordingSession {
    fn execute(&mut self, sql: &str) -> anyhow::Result<()> {
        self.calls.push(Call::Execute(sql.to_string()));
        if (self.fails)(sql) {
            anyhow::bail!("ERROR: simulated failure for {}", sql);
        }
        Ok(())
    }

    fn commit(&mut self) -> anyhow::Result<()> {
        self.calls.push(Call::Commit);
        Ok(())
    }

    fn rollback(&mut self) -> anyhow::Result<()> {
        self.calls.push(Call::Rollback);
        if self.rollback_fails {
            anyhow::bail!("ERROR: connection lost during rollback");
        }
        Ok(())
    }
}

/// In-memory stand-in for a PostgreSQL server, fed through [`QueryClient`].
///
/// Models just enough transaction behaviour for the loader: statements run
/// outside a transaction are durable immediately; inside one they stay pending
/// until `COMMIT`. A failing statement inside a transaction aborts it, and
/// every later statement fails until `ROLLBACK` or `ROLLBACK TO SAVEPOINT`.
/// `COMMIT` of an aborted transaction discards the pending work.
pub struct FakeServer {
    /// Every statement received, control statements included
    pub log: Vec<String>,
    /// Statements whose effects are durable
    pub committed: Vec<String>,
    pending: Vec<String>,
    savepoints: Vec<(String, usize)>,
    in_transaction: bool,
    aborted: bool,
    fails: Box<dyn Fn(&str) -> bool>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::failing_when(|_| false)
    }

    pub fn failing_when<F>(fails: F) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        Self {
            log: Vec::new(),
            committed: Vec::new(),
            pending: Vec::new(),
            savepoints: Vec::new(),
            in_transaction: false,
            aborted: false,
            fails: Box::new(fails),
        }
    }

    pub fn is_committed(&self, sql: &str) -> bool {
        self.committed.iter().any(|s| s == sql)
    }

    fn end_transaction(&mut self, keep: bool) {
        if keep && !self.aborted {
            self.committed.append(&mut self.pending);
        }
        self.pending.clear();
        self.savepoints.clear();
        self.in_transaction = false;
        self.aborted = false;
    }
}

impl QueryClient for FakeServer {
    fn run(&mut self, sql: &str) -> anyhow::Result<()> {
        self.log.push(sql.to_string());

        match sql {
            "BEGIN" => {
                self.in_transaction = true;
                return Ok(());
            }
            "COMMIT" => {
                self.end_transaction(true);
                return Ok(());
            }
            "ROLLBACK" => {
                self.end_transaction(false);
                return Ok(());
            }
            _ => {}
        }

        if let Some(name) = sql.strip_prefix("ROLLBACK TO SAVEPOINT ") {
            let Some(&(_, mark)) = self.savepoints.iter().rev().find(|(n, _)| n == name) else {
                anyhow::bail!("ERROR: savepoint \"{}\" does not exist", name);
            };
            self.pending.truncate(mark);
            self.aborted = false;
            return Ok(());
        }

        if self.aborted {
            anyhow::bail!("ERROR: current transaction is aborted, commands ignored until end of transaction block");
        }

        if let Some(name) = sql.strip_prefix("SAVEPOINT ") {
            self.savepoints.push((name.to_string(), self.pending.len()));
            return Ok(());
        }
        if let Some(name) = sql.strip_prefix("RELEASE SAVEPOINT ") {
            let Some(pos) = self.savepoints.iter().rposition(|(n, _)| n == name) else {
                anyhow::bail!("ERROR: savepoint \"{}\" does not exist", name);
            };
            self.savepoints.truncate(pos);
            return Ok(());
        }

        if (self.fails)(sql) {
            if self.in_transaction {
                self.aborted = true;
            }
            anyhow::bail!("ERROR: simulated failure for {}", sql);
        }

        if self.in_transaction {
            self.pending.push(sql.to_string());
        } else {
            self.committed.push(sql.to_string());
        }
        Ok(())
    }
}

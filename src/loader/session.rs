//! Database sessions the loader executes against.

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use postgres::{Client, NoTls};

/// Savepoint wrapped around each statement in transactional mode
const STATEMENT_SAVEPOINT: &str = "mysql_to_pg_stmt";

/// A single, exclusively owned database session.
///
/// The loader only ever issues raw SQL text, commits and rolls back, so that
/// is all a session has to provide.
pub trait SqlSession {
    fn execute(&mut self, sql: &str) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
}

/// The simple-query surface `PgSession` needs from a client.
pub trait QueryClient {
    fn run(&mut self, sql: &str) -> Result<()>;
}

impl QueryClient for Client {
    fn run(&mut self, sql: &str) -> Result<()> {
        Client::batch_execute(self, sql)?;
        Ok(())
    }
}

/// A PostgreSQL session, by default over the blocking `postgres` client.
///
/// In autocommit mode every statement runs in its own implicit transaction
/// and `commit`/`rollback` have nothing to do.
///
/// Otherwise the first statement after a commit point opens a transaction
/// with `BEGIN`, and each statement runs under a savepoint. A failing
/// statement is rolled back to its savepoint, so the transaction stays usable
/// and only that statement's work is lost.
pub struct PgSession<C: QueryClient = Client> {
    client: C,
    autocommit: bool,
    in_transaction: bool,
}

impl PgSession<Client> {
    /// Open a connection to the configured server.
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let client = config.to_pg_config().connect(NoTls).with_context(|| {
            format!(
                "Failed to connect to {}@{}:{}/{}",
                config.user, config.host, config.port, config.dbname
            )
        })?;

        tracing::debug!(
            host = %config.host,
            port = config.port,
            dbname = %config.dbname,
            autocommit = config.autocommit,
            "connected"
        );

        Ok(Self::with_client(client, config.autocommit))
    }

    /// Close the connection, reporting any error from the server.
    ///
    /// Dropping the session also releases the connection, silently.
    pub fn close(mut self) -> Result<()> {
        self.commit()?;
        self.client.close().context("Failed to close connection")
    }
}

impl<C: QueryClient> PgSession<C> {
    pub fn with_client(client: C, autocommit: bool) -> Self {
        Self {
            client,
            autocommit,
            in_transaction: false,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    fn execute_in_savepoint(&mut self, sql: &str) -> Result<()> {
        self.client.run(&format!("SAVEPOINT {}", STATEMENT_SAVEPOINT))?;

        match self.client.run(sql) {
            Ok(()) => self
                .client
                .run(&format!("RELEASE SAVEPOINT {}", STATEMENT_SAVEPOINT)),
            Err(e) => {
                self.client
                    .run(&format!("ROLLBACK TO SAVEPOINT {}", STATEMENT_SAVEPOINT))?;
                self.client
                    .run(&format!("RELEASE SAVEPOINT {}", STATEMENT_SAVEPOINT))?;
                Err(e)
            }
        }
    }
}

impl<C: QueryClient> SqlSession for PgSession<C> {
    fn execute(&mut self, sql: &str) -> Result<()> {
        if self.autocommit {
            return self.client.run(sql);
        }

        if !self.in_transaction {
            self.client.run("BEGIN")?;
            self.in_transaction = true;
        }
        self.execute_in_savepoint(sql)
    }

    fn commit(&mut self) -> Result<()> {
        if self.in_transaction {
            self.in_transaction = false;
            self.client.run("COMMIT")?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if self.in_transaction {
            self.in_transaction = false;
            self.client.run("ROLLBACK")?;
        }
        Ok(())
    }
}

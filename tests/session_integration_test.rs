//! Transaction behaviour of `PgSession` against an in-memory server.

mod common;

use common::FakeServer;
use mysql_to_pg::config::ImportConfig;
use mysql_to_pg::import::{load, prepare};
use mysql_to_pg::loader::PgSession;
use std::fs;
use tempfile::TempDir;

fn prepared_config(name: &str, dump: &str, autocommit: bool) -> (TempDir, ImportConfig) {
    let temp_dir = TempDir::new().unwrap();
    let dump_path = temp_dir.path().join(name);
    fs::write(&dump_path, dump).unwrap();

    let mut config = ImportConfig::new(dump_path);
    config.database.autocommit = autocommit;
    (temp_dir, config)
}

fn insert_dump(rows: usize, bad_row: usize) -> String {
    (1..=rows)
        .map(|i| {
            if i == bad_row {
                "INSERT INTO `t` (`id`) VALUES ('bad');\n".to_string()
            } else {
                format!("INSERT INTO `t` (`id`) VALUES ({});\n", i)
            }
        })
        .collect()
}

#[test]
fn test_create_failure_keeps_earlier_schema_work() {
    let dump = "CREATE TABLE `a` (`x` INT);\nCREATE TABLE `bad` (`x` NOPE);\nCREATE TABLE `c` (`y` INT);\nINSERT INTO `a` (`x`) VALUES (1);\n";
    let (_dir, config) = prepared_config("a.sql", dump, false);
    let prepared = prepare(&config).unwrap();

    let mut session =
        PgSession::with_client(FakeServer::failing_when(|sql| sql.contains("NOPE")), false);
    let stats = load(&prepared, &config, &mut session).unwrap();
    let server = session.client();

    assert!(server.is_committed("SET search_path TO public;"));
    assert!(server.is_committed("DROP TABLE IF EXISTS a;\nCREATE TABLE a (x TEXT);"));
    assert!(server.is_committed("CREATE TABLE a (x INT);"));
    assert!(!server.is_committed("CREATE TABLE bad (x NOPE);"));
    assert!(server.is_committed("CREATE TABLE c (y INT);"));
    assert!(server.is_committed("INSERT INTO a (x) VALUES (1);"));

    assert!(stats.table_bootstrapped);
    assert_eq!(stats.tables_created, 2);
    assert_eq!(stats.create_failed, 1);
    assert_eq!(stats.data_executed, 1);
}

#[test]
fn test_data_failure_does_not_discard_other_rows() {
    let (_dir, config) = prepared_config("t.sql", &insert_dump(25, 3), false);
    let prepared = prepare(&config).unwrap();

    let mut session =
        PgSession::with_client(FakeServer::failing_when(|sql| sql.contains("'bad'")), false);
    let stats = load(&prepared, &config, &mut session).unwrap();
    let server = session.client();

    let committed_rows = server
        .committed
        .iter()
        .filter(|s| s.starts_with("INSERT INTO t"))
        .count();
    assert_eq!(committed_rows, 24);
    assert!(server.is_committed("INSERT INTO t (id) VALUES (2);"));
    assert!(server.is_committed("INSERT INTO t (id) VALUES (4);"));
    assert!(server.is_committed("INSERT INTO t (id) VALUES (25);"));
    assert!(!server.is_committed("INSERT INTO t (id) VALUES ('bad');"));

    assert_eq!(stats.data_executed, 24);
    assert_eq!(stats.data_failed, 1);
    // positions 10 and 20, plus the final commit
    assert_eq!(stats.commits, 3);
    assert!(!session.in_transaction());
}

#[test]
fn test_failed_bootstrap_keeps_search_path() {
    let (_dir, config) = prepared_config("t.sql", &insert_dump(2, 0), false);
    let prepared = prepare(&config).unwrap();

    let mut session = PgSession::with_client(
        FakeServer::failing_when(|sql| sql.starts_with("DROP TABLE")),
        false,
    );
    let stats = load(&prepared, &config, &mut session).unwrap();
    let server = session.client();

    assert!(server.is_committed("SET search_path TO public;"));
    assert!(server.log.contains(&"ROLLBACK".to_string()));
    assert!(!stats.table_bootstrapped);
    assert_eq!(stats.data_executed, 2);
}

#[test]
fn test_autocommit_sends_no_transaction_control() {
    let (_dir, config) = prepared_config("t.sql", &insert_dump(5, 2), true);
    let prepared = prepare(&config).unwrap();

    let mut session =
        PgSession::with_client(FakeServer::failing_when(|sql| sql.contains("'bad'")), true);
    let stats = load(&prepared, &config, &mut session).unwrap();
    let server = session.client();

    assert!(!server
        .log
        .iter()
        .any(|s| s == "BEGIN" || s == "COMMIT" || s.contains("SAVEPOINT")));
    assert_eq!(server.committed.len(), 1 + 1 + 4);
    assert_eq!(stats.data_failed, 1);
}

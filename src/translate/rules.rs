//! The substitution rules, in application order.
//!
//! Order matters: every rule sees the output of the previous one. The patterns
//! are case-sensitive and deliberately narrow; anything they do not match is
//! passed through and left for the server to accept or reject.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

static RE_EMPTY_INSERT_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"INSERT INTO\s+\(").unwrap());

static RE_ENGINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"ENGINE=\w+").unwrap());

static RE_DEFAULT_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"DEFAULT CHARSET=\w+").unwrap());

static RE_COLLATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"COLLATE=\w+").unwrap());

static RE_COLUMN_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"COMMENT\s+'[^']*'").unwrap());

static RE_BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// Translate a MySQL dump into PostgreSQL-flavoured SQL.
///
/// `fallback_table` names the target of `INSERT INTO (...)` statements whose
/// table name was stripped from the dump. It is inserted literally.
pub fn translate(sql: &str, fallback_table: &str) -> String {
    let sql = strip_backticks(sql);
    let sql = fill_empty_insert_target(&sql, fallback_table);
    let sql = sql.replace("AUTO_INCREMENT", "SERIAL");
    let sql = strip(&RE_ENGINE, &sql);
    let sql = sql.replace("UNSIGNED", "");
    let sql = strip(&RE_DEFAULT_CHARSET, &sql);
    let sql = strip(&RE_COLLATE, &sql);
    let sql = strip(&RE_COLUMN_COMMENT, &sql);
    strip(&RE_BLOCK_COMMENT, &sql)
}

fn strip_backticks(sql: &str) -> String {
    sql.replace('`', "")
}

fn fill_empty_insert_target(sql: &str, fallback_table: &str) -> String {
    let replacement = format!("INSERT INTO {} (", fallback_table);
    RE_EMPTY_INSERT_TARGET
        .replace_all(sql, NoExpand(&replacement))
        .into_owned()
}

fn strip(re: &Regex, sql: &str) -> String {
    re.replace_all(sql, "").into_owned()
}

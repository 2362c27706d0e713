//! Translate MySQL dumps to PostgreSQL and load them into a running server.
//!
//! The translation is a fixed set of textual substitutions, not a parser.
//! Loading is best-effort: schema statements that fail are reported and
//! rolled back, data statements that fail are skipped.

pub mod config;
pub mod import;
pub mod loader;
pub mod source;
pub mod translate;

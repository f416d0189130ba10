//! tapestry - a day organizer library
//!
//! Tasks live in periods of the day (morning, afternoon, evening, night and
//! any user-defined ones). Every change recomputes a per-day activity record
//! and persists both the periods and the day log through a key-value store.
//!
//! # Module Organization
//!
//! - `model`: persisted records (tasks, periods, day analytics)
//! - `board`: flat task registry with ordered period lists
//! - `analytics`: day records and derived views (summaries, stats, calendar)
//! - `organizer`: board + day log + persistence
//! - `storage`: key-value stores (files on disk, in memory)
//! - `lock`: file locking and atomic writes
//! - `session`: local sign-in holder
//! - `config`: `.tapestry.toml` and data directory resolution
//! - `output`: human and JSON output for the CLI
//! - `cli`: command-line interface using clap
//! - `error`: error types and result aliases

pub mod analytics;
pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod model;
pub mod organizer;
pub mod output;
pub mod session;
pub mod storage;

pub use error::{Error, Result};

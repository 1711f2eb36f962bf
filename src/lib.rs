//! Core library surface for the school manager TUI.
//!
//! The roster lives in a pipe-delimited text file, one student per line. The
//! [`db`] module owns that file (codec and store), [`models`] holds the record
//! and its validation rules, and [`ui`] is the interactive front-end built on
//! top of the store.
pub mod db;
pub mod logging;
pub mod models;
pub mod ui;

/// Persistence entry points used by `main.rs` and by tests.
pub use db::{ensure_store, log_path, LoadReport, StoreError, StudentStore};

pub use models::{Student, ValidationError};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};

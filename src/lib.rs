//! Ripl (Recruiting Pipeline Ledger) - A command-line recruiting stage and
//! candidate pipeline tool
//!
//! This library provides the core functionality for Ripl, including:
//! - Database operations and migrations
//! - Data models for candidates and pipeline stages
//! - The stage registry (ordered stage configuration with best-effort
//!   persistence and change notification) and its editor
//! - The pipeline board (stage grouping and candidate transitions)
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use ripl::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod board;
pub mod cli;
pub mod db;
pub mod models;
pub mod registry;
pub mod repo;

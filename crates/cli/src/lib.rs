//! ns CLI library
//!
//! Exposes the command tree and output helpers to tests.

pub mod commands;
pub mod exit_code;
pub mod output;

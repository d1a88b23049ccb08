//! postdiff engine - Orchestration layer
//!
//! Provides the `index_column_diff` command, its engine command dispatch and
//! the response envelope, coordinating the core report builder with a
//! catalog and diff engine.

pub mod commands;

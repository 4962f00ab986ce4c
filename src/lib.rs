//! Reconciliation of mutational signature activity matrices.
//!
//! A reference cohort and a query cohort are read from tab-separated
//! matrices, aligned on one sorted signature axis with zero-fill, and
//! serialized into a payload for rendering. The [`prepare`] module builds the
//! reference matrix itself from raw activity files and a sample metadata
//! table.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod fs_util;
pub mod matrix;
pub mod output;
pub mod payload;
pub mod prepare;
pub mod reconcile;

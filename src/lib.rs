//! tickbars — incremental windowed aggregation over trade tick streams.
//!
//! Hexagonal architecture: bar building and window indicators in [`domain`],
//! port traits in [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
pub mod logging;

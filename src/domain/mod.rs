//! Core domain types and logic.

pub mod tick;
pub mod bar;
pub mod segmentation;
pub mod builder;
pub mod indicator;
pub mod engine_config;
pub mod error;

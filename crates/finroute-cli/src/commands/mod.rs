//! CLI command handlers

pub mod ask;
pub mod build_index;
pub mod import;
pub mod serve;

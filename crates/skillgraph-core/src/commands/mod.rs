//! Commands module - operations shared by the CLI and library callers

pub mod ingest;
pub mod registry;

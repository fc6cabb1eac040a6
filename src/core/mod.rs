// ElwSleuth - core/mod.rs
//
// Core business logic layer: parsing, filtering, deduplication, moon
// resolution, scoring, ranking, export.
// Must NOT depend on: app or platform.

pub mod dedup;
pub mod discovery;
pub mod esi;
pub mod export;
pub mod filter;
pub mod model;
pub mod parser;
pub mod ranking;
pub mod relation;

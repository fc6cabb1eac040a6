// ElwSleuth - app/mod.rs
//
// Application layer: run orchestration and text rendering.
// Dependencies: core, platform, util.

pub mod pipeline;
pub mod report;

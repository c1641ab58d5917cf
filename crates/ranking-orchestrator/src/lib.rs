//! Per-sector ranking pipelines: statement panels in, scored and ranked
//! rows out, persisted incrementally through the diff layer.
//!
//! Each sector module exposes a pure `assemble` step (panels and upstream
//! scores to rows and records) and an async `run` that does the IO around
//! it. A sector run is independent; failures do not touch other sectors.

pub mod bank;
pub mod insurance;
pub mod persist;
pub mod securities;
pub mod upstream;

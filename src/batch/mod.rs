//! Batch generation: bind and render many records against one template.
//!
//! Rows are independent units of work. [`pipeline::BatchRenderer::run`] renders them on a
//! bounded worker pool, delivers successes to an [`sink::OutputSink`] in row order and records
//! per-row failures without stopping.

/// Batch options, the row renderer and reports.
pub mod pipeline;
/// Output sinks.
pub mod sink;
/// Verification codes and generation metadata.
pub mod verify;

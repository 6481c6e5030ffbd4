// Event occurrence tracking.
//
// - model.rs: event identifiers and alert channels
// - tracker.rs: per-tick active set, sticky latch, persistence counters
// - wire.rs: record projection for inter-process reporting

pub mod model;
pub mod tracker;
pub mod wire;

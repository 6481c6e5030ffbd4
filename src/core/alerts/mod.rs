// Alert system: presentable alerts and how they are chosen each tick.
//
// Architecture:
// - model.rs: Alert template, priorities, resolved candidates
// - factories.rs: Dynamic alerts computed from live vehicle state
// - engine.rs: Arbitration with creation-delay gating

pub mod engine;
pub mod factories;
pub mod model;

// cashbak/src/flow/mod.rs

//! A small async step runner: named steps with `before`/`on`/`after` phases
//! over a shared, lockable context. The checkout orchestrator is built on it.

pub mod context;
pub mod control;
pub mod pipeline;

pub use context::FlowContext;
pub use control::{FlowOutcome, Phase, StepControl};
pub use pipeline::{Flow, SkipCondition, StepDef, StepHandler};

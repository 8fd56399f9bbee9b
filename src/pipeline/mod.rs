//! Orchestrator
//!
//! Drives a run through `Idle → Loading → Classifying → Rewriting →
//! Synthesizing → Emitting → Done`, falling into `Failed` when a stage
//! cannot continue.

pub mod orchestrator;
pub mod stage;

pub use orchestrator::{
    run_project, CompanionStatus, HandlerSummary, Orchestrator, PipelineReport,
};
pub use stage::PipelineStage;

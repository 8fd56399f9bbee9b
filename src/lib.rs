//! actionmap: strongly typed action descriptors for MVC controllers.
//!
//! A run classifies the controller classes of a C# project through a
//! semantic model, marks them `partial` and their actions `virtual` in
//! place, and writes one companion document holding a capability interface
//! per controller, a descriptor implementation of it, a registry of those
//! descriptors, and name constants for actions, views and static assets.

pub mod analysis;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod io;
pub mod locators;
pub mod observability;
pub mod pipeline;
pub mod rewrite;
pub mod source;

pub use crate::analysis::{ActionMethod, HandlerClass};
pub use crate::codegen::{CompanionDocument, DescriptorTemplate, Registry, RouteSource};
pub use crate::config::ActionmapConfig;
pub use crate::errors::{Error, Result};
pub use crate::pipeline::{run_project, Orchestrator, PipelineReport, PipelineStage};

//! Descriptor Synthesizer
//!
//! Turns the merged handler list into the companion C# document: a
//! capability interface per handler with a live bridge and a descriptor
//! implementation, one registry exposing the descriptor variants, the shared
//! descriptor type, and name constants for actions, views and static assets.

pub mod descriptor;
pub mod emit;
pub mod names;
pub mod registry;
pub mod synthesizer;

pub use descriptor::{ActionDescriptor, DescriptorTemplate, RouteSource};
pub use emit::{render, CSharpWriter};
pub use registry::{Registry, RegistryEntry};
pub use synthesizer::{
    ActionSurface, CompanionDocument, Completion, DescriptorType, HandlerMembers, HandlerSurface,
    LinkTree, Synthesizer,
};

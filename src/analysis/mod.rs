//! Classification Analyzer
//!
//! Finds handler classes and their action methods using the semantic model,
//! then merges the per-unit results into one project-wide view.

pub mod classifier;
pub mod merge;
pub mod model;

pub use classifier::{ClassMatch, Classifier};
pub use merge::{merge_project, UnitClassification};
pub use model::{
    ActionMethod, AreaSource, HandlerClass, Parameter, ParameterModifier, ReturnKind,
    SourceLocation, Visibility,
};

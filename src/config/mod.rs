// Core configuration types
pub mod catalog;
mod core;
mod loader;

pub use catalog::{builtin_catalog, ExternalTypeConfig, TypeKind};
pub use core::{ActionmapConfig, ExclusionPolicy};
pub use loader::{
    directory_ancestors, load_config, load_config_file, parse_and_validate_config,
    CONFIG_FILE_NAME,
};

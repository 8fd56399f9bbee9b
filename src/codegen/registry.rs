//! The registry: one descriptor-variant instance per handler.

use super::names::global_name;
use crate::analysis::HandlerClass;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    /// Property name on the registry container.
    pub key: String,
    /// Metadata key of the handler class.
    pub handler: String,
    /// `global::`-qualified capability interface.
    pub interface: String,
    /// `global::`-qualified descriptor variant class.
    pub descriptor_class: String,
}

/// Built once per run and handed to the emitter by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registry {
    pub container: String,
    entries: IndexMap<String, RegistryEntry>,
}

impl Registry {
    pub fn build(container: impl Into<String>, handlers: &[HandlerClass]) -> Self {
        let mut entries: IndexMap<String, RegistryEntry> = IndexMap::new();
        for handler in handlers {
            let base = handler.registry_key();
            let mut key = base.clone();
            let mut n = 2;
            while entries.contains_key(&key) {
                key = format!("{}{}", base, n);
                n += 1;
            }
            if key != base {
                tracing::warn!(
                    "Registry key '{}' already taken; {} registered as '{}'",
                    base,
                    handler.qualified_name(),
                    key
                );
            }

            let namespace = if handler.namespace.is_empty() {
                String::new()
            } else {
                format!("{}.", handler.namespace)
            };
            entries.insert(
                key.clone(),
                RegistryEntry {
                    key,
                    handler: handler.key.clone(),
                    interface: global_name(&format!(
                        "{}{}",
                        namespace,
                        interface_name(&handler.route_name)
                    )),
                    descriptor_class: global_name(&format!(
                        "{}{}",
                        namespace,
                        descriptor_class_name(&handler.route_name)
                    )),
                },
            );
        }
        Self {
            container: container.into(),
            entries,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }
}

/// `I{Route}Actions`
pub fn interface_name(route_name: &str) -> String {
    format!("I{}Actions", route_name)
}

/// `{Route}ActionDescriptors`
pub fn descriptor_class_name(route_name: &str) -> String {
    format!("{}ActionDescriptors", route_name)
}

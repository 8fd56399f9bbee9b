use serde::{Deserialize, Serialize};

use super::catalog::{builtin_catalog, ExternalTypeConfig};
use crate::errors::{Error, Result};

/// Root configuration structure for actionmap
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ActionmapConfig {
    /// Namespace of the generated registry and descriptor type
    pub namespace: String,

    /// Metadata name of the type every handler derives from
    pub base_handler_type: String,

    /// Metadata names of the action-result capability types
    pub action_result_types: Vec<String>,

    /// Generic wrappers unwrapped before the capability check (`Task`1`)
    pub async_wrapper_types: Vec<String>,

    /// Glob patterns of source files that are never scanned
    pub exclude_globs: Vec<String>,

    /// Handler classes never classified, by simple or qualified name
    pub excluded_handlers: Vec<String>,

    /// Actions never classified, as `Handler.Action`
    pub excluded_actions: Vec<String>,

    /// Suffix stripped from handler class names (`HomeController` -> `Home`)
    pub handler_suffix: String,

    /// Companion document file name, relative to the project root
    pub output_file: String,

    /// Name of the generated registry class
    pub registry_name: String,

    /// Name of the generated descriptor type
    pub descriptor_name: String,

    /// Runtime helper called once per bound parameter
    pub binding_helper: String,

    /// Surface view template names as constants
    pub emit_views: bool,

    /// Surface static assets as link constants
    pub emit_static_files: bool,

    /// Static asset root, relative to the project root
    pub static_root: String,

    /// Extra referenced types on top of the built-in catalog
    pub external_types: Vec<ExternalTypeConfig>,
}

impl Default for ActionmapConfig {
    fn default() -> Self {
        Self {
            namespace: "ActionMap".to_string(),
            base_handler_type: "Microsoft.AspNetCore.Mvc.Controller".to_string(),
            action_result_types: vec!["Microsoft.AspNetCore.Mvc.IActionResult".to_string()],
            async_wrapper_types: vec![
                "System.Threading.Tasks.Task`1".to_string(),
                "System.Threading.Tasks.ValueTask`1".to_string(),
            ],
            exclude_globs: vec![
                "**/bin/**".to_string(),
                "**/obj/**".to_string(),
                "**/*.generated.cs".to_string(),
            ],
            excluded_handlers: Vec::new(),
            excluded_actions: Vec::new(),
            handler_suffix: "Controller".to_string(),
            output_file: "Actions.generated.cs".to_string(),
            registry_name: "ActionRegistry".to_string(),
            descriptor_name: "ActionDescriptor".to_string(),
            binding_helper: "ActionRouteBinder.Bind".to_string(),
            emit_views: true,
            emit_static_files: true,
            static_root: "wwwroot".to_string(),
            external_types: Vec::new(),
        }
    }
}

impl ActionmapConfig {
    pub fn validate(&self) -> Result<()> {
        if !is_qualified_identifier(&self.namespace) {
            return Err(Error::Configuration(format!(
                "namespace '{}' is not a valid qualified identifier",
                self.namespace
            )));
        }
        if self.base_handler_type.trim().is_empty() {
            return Err(Error::Configuration(
                "base_handler_type must not be empty".into(),
            ));
        }
        if self.action_result_types.iter().all(|t| t.trim().is_empty()) {
            return Err(Error::Configuration(
                "action_result_types must name at least one type".into(),
            ));
        }
        for name in [&self.registry_name, &self.descriptor_name] {
            if !is_qualified_identifier(name) || name.contains('.') {
                return Err(Error::Configuration(format!(
                    "'{}' is not a valid type name",
                    name
                )));
            }
        }
        if self.output_file.trim().is_empty() {
            return Err(Error::Configuration("output_file must not be empty".into()));
        }
        for pattern in &self.exclude_globs {
            glob::Pattern::new(pattern)?;
        }
        Ok(())
    }

    /// Compiled exclusion globs. Call after [`validate`](Self::validate).
    pub fn exclude_patterns(&self) -> Vec<glob::Pattern> {
        self.exclude_globs
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect()
    }

    /// Built-in catalog followed by the configured external types.
    pub fn type_catalog(&self) -> Vec<ExternalTypeConfig> {
        let mut catalog = builtin_catalog();
        catalog.extend(self.external_types.iter().cloned());
        catalog
    }

    pub fn exclusion_policy(&self) -> ExclusionPolicy {
        ExclusionPolicy {
            handlers: self.excluded_handlers.clone(),
            actions: self.excluded_actions.clone(),
        }
    }
}

/// Explicit veto list evaluated during classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionPolicy {
    handlers: Vec<String>,
    actions: Vec<String>,
}

impl ExclusionPolicy {
    pub fn new(handlers: Vec<String>, actions: Vec<String>) -> Self {
        Self { handlers, actions }
    }

    /// `qualified` is the namespace-qualified class name.
    pub fn excludes_handler(&self, name: &str, qualified: &str) -> bool {
        self.handlers.iter().any(|h| h == name || h == qualified)
    }

    pub fn excludes_action(&self, handler: &str, action: &str) -> bool {
        self.actions.iter().any(|entry| {
            entry
                .rsplit_once('.')
                .is_some_and(|(h, a)| h == handler && a == action)
        })
    }
}

fn is_qualified_identifier(text: &str) -> bool {
    !text.is_empty()
        && text.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c == '_' || c.is_alphabetic())
                && chars.all(|c| c == '_' || c.is_alphanumeric())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ActionmapConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_namespace_rejected() {
        let config = ActionmapConfig {
            namespace: "My App".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_empty_capability_list_rejected() {
        let config = ActionmapConfig {
            action_result_types: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_glob_rejected() {
        let config = ActionmapConfig {
            exclude_globs: vec!["[".into()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Pattern(_))));
    }

    #[test]
    fn test_exclusion_policy_matches_simple_and_qualified_names() {
        let policy = ExclusionPolicy::new(
            vec!["LegacyController".into(), "App.Admin.AuditController".into()],
            vec!["HomeController.Secret".into()],
        );

        assert!(policy.excludes_handler("LegacyController", "App.LegacyController"));
        assert!(policy.excludes_handler("AuditController", "App.Admin.AuditController"));
        assert!(!policy.excludes_handler("AuditController", "App.AuditController"));
        assert!(policy.excludes_action("HomeController", "Secret"));
        assert!(!policy.excludes_action("HomeController", "Index"));
    }
}

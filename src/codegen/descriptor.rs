//! Route descriptors.
//!
//! [`DescriptorTemplate`] is what the generated descriptor variant does for
//! one action, expressed in Rust: fill area, handler and action, bind the
//! arguments in signature order, then materialize the route. Keeping it here
//! lets the route shape be checked without compiling the generated code.

use crate::analysis::{ActionMethod, HandlerClass, ParameterModifier};
use indexmap::IndexMap;
use serde::Serialize;

pub const AREA_KEY: &str = "Area";
pub const HANDLER_KEY: &str = "Controller";
pub const ACTION_KEY: &str = "Action";

/// Anything that turns into routing information.
pub trait RouteSource {
    /// Ordered route values: area (when set), handler, action, then the
    /// bound parameters in signature order.
    fn route_values(&self) -> IndexMap<String, String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorTemplate {
    pub area: String,
    pub handler_name: String,
    pub action_name: String,
    /// Names of the parameters that get bound, in signature order.
    pub parameters: Vec<String>,
}

impl DescriptorTemplate {
    pub fn for_action(handler: &HandlerClass, action: &ActionMethod) -> Self {
        Self {
            area: handler.area.clone().unwrap_or_default(),
            handler_name: handler.route_name.clone(),
            action_name: super::names::route_key(&action.name).to_string(),
            parameters: action
                .parameters
                .iter()
                .filter(|p| p.modifier != Some(ParameterModifier::Out))
                .map(|p| super::names::route_key(&p.name).to_string())
                .collect(),
        }
    }

    /// Build the descriptor a call with `arguments` would return. Extra
    /// arguments are ignored; missing ones leave their parameter unbound.
    pub fn instantiate<I, V>(&self, arguments: I) -> ActionDescriptor
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let bindings = self
            .parameters
            .iter()
            .zip(arguments)
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();
        ActionDescriptor {
            area: self.area.clone(),
            handler_name: self.handler_name.clone(),
            action_name: self.action_name.clone(),
            protocol: None,
            bindings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    pub area: String,
    pub handler_name: String,
    pub action_name: String,
    pub protocol: Option<String>,
    pub bindings: IndexMap<String, String>,
}

impl RouteSource for ActionDescriptor {
    fn route_values(&self) -> IndexMap<String, String> {
        let mut values = IndexMap::with_capacity(self.bindings.len() + 3);
        if !self.area.is_empty() {
            values.insert(AREA_KEY.to_string(), self.area.clone());
        }
        values.insert(HANDLER_KEY.to_string(), self.handler_name.clone());
        values.insert(ACTION_KEY.to_string(), self.action_name.clone());
        for (name, value) in &self.bindings {
            values.insert(name.clone(), value.clone());
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn template(area: &str) -> DescriptorTemplate {
        DescriptorTemplate {
            area: area.into(),
            handler_name: "Foo".into(),
            action_name: "Bar".into(),
            parameters: vec!["id".into(), "name".into()],
        }
    }

    #[test]
    fn test_route_values_in_key_order() {
        let descriptor = template("").instantiate(["5", "x"]);
        let route: Vec<_> = descriptor.route_values().into_iter().collect();
        assert_eq!(
            route,
            vec![
                ("Controller".to_string(), "Foo".to_string()),
                ("Action".to_string(), "Bar".to_string()),
                ("id".to_string(), "5".to_string()),
                ("name".to_string(), "x".to_string()),
            ]
        );
    }

    #[test]
    fn test_area_leads_when_present() {
        let mut descriptor = template("Admin").instantiate([1, 2]);
        descriptor.protocol = Some("https".into());
        let keys: Vec<_> = descriptor.route_values().into_keys().collect();
        assert_eq!(keys, vec!["Area", "Controller", "Action", "id", "name"]);
        assert_eq!(descriptor.protocol.as_deref(), Some("https"));
    }
}

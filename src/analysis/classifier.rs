//! Handler and action classification for one compilation unit.
//!
//! Every decision goes through the semantic model: a class is a handler when
//! the base handler symbol is among its resolved ancestors, and a method is an
//! action when its resolved return type (unwrapped from a configured async
//! wrapper) is assignable to a configured action-result type. Names alone never
//! qualify anything.

use super::model::{
    ActionMethod, AreaSource, HandlerClass, Parameter, ParameterModifier, ReturnKind,
    SourceLocation, Visibility,
};
use crate::config::{ActionmapConfig, ExclusionPolicy, TypeKind};
use crate::observability::set_current_declaration;
use crate::source::parser::{
    all_children, child_of_kind, modifiers, named_children, node_line, node_text,
};
use crate::source::semantic::TypeDeclaration;
use crate::source::{Resolution, Scope, SemanticModel, SourceUnit, TypeRef};
use std::path::Path;
use tree_sitter::Node;

/// A handler class declaration matched in one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMatch {
    /// This part's view of the handler; `actions` holds only the actions
    /// declared in this part.
    pub handler: HandlerClass,
    pub location: SourceLocation,
    pub composable: bool,
}

impl ClassMatch {
    pub fn class_offset(&self) -> usize {
        self.location.start_byte
    }

    /// Offsets of actions that still need `virtual`.
    pub fn virtual_targets(&self) -> Vec<usize> {
        self.handler
            .actions
            .iter()
            .filter(|a| a.needs_virtual())
            .map(|a| a.location.start_byte)
            .collect()
    }
}

pub struct Classifier<'m> {
    model: &'m SemanticModel,
    base_handler: String,
    capabilities: Vec<String>,
    async_wrappers: Vec<String>,
    policy: ExclusionPolicy,
    handler_suffix: String,
}

impl<'m> Classifier<'m> {
    pub fn new(model: &'m SemanticModel, config: &ActionmapConfig) -> Self {
        Self {
            model,
            base_handler: config.base_handler_type.clone(),
            capabilities: config.action_result_types.clone(),
            async_wrappers: config.async_wrapper_types.clone(),
            policy: config.exclusion_policy(),
            handler_suffix: config.handler_suffix.clone(),
        }
    }

    /// Handler classes of `unit` in source declaration order.
    ///
    /// `root` is the project root, used to detect `Areas/{Area}/` folders.
    pub fn classify_unit(&self, unit: &SourceUnit, root: &Path) -> Vec<ClassMatch> {
        self.model
            .declarations(unit)
            .iter()
            .filter_map(|decl| self.classify_class(decl, unit, root))
            .collect()
    }

    fn classify_class(
        &self,
        decl: &TypeDeclaration,
        unit: &SourceUnit,
        root: &Path,
    ) -> Option<ClassMatch> {
        if decl.kind != TypeKind::Class || decl.is_nested() || decl.is_generic() {
            return None;
        }
        if !self
            .model
            .ancestors(&decl.key)
            .iter()
            .any(|a| a == &self.base_handler)
        {
            return None;
        }

        let namespace = decl.scope.namespace.clone();
        let qualified = if namespace.is_empty() {
            decl.name.clone()
        } else {
            format!("{}.{}", namespace, decl.name)
        };
        if self.policy.excludes_handler(&decl.name, &qualified) {
            tracing::debug!("Handler {} excluded by configuration", qualified);
            return None;
        }

        let _decl_guard = set_current_declaration(qualified.clone());
        let route_name = strip_suffix(&decl.name, &self.handler_suffix);
        let scope = decl.member_scope();
        let actions = decl
            .body()
            .map(|body| {
                named_children(&body)
                    .into_iter()
                    .filter(|m| m.kind() == "method_declaration")
                    .filter_map(|m| self.classify_method(m, unit, &scope, &decl.name, &route_name))
                    .collect()
            })
            .unwrap_or_default();

        let composable = decl.has_modifier("partial");
        let location = SourceLocation {
            path: unit.path.clone(),
            line: node_line(&decl.node),
            start_byte: decl.node.start_byte(),
        };

        let (area, area_source) = match area_attribute(&decl.node, &unit.text) {
            Some(area) => (Some(area), AreaSource::Attribute),
            None => match area_from_path(&unit.path, root) {
                Some(area) => (Some(area), AreaSource::Folder),
                None => (None, AreaSource::None),
            },
        };

        Some(ClassMatch {
            handler: HandlerClass {
                key: decl.key.clone(),
                name: decl.name.clone(),
                route_name,
                namespace,
                area,
                area_source,
                base_chain: self.model.base_chain(&decl.key),
                actions,
                already_composable: composable,
                files: vec![unit.path.clone()],
                usings: scope.usings.clone(),
            },
            location,
            composable,
        })
    }

    fn classify_method(
        &self,
        method: Node,
        unit: &SourceUnit,
        scope: &Scope,
        class_name: &str,
        route_name: &str,
    ) -> Option<ActionMethod> {
        if child_of_kind(&method, "explicit_interface_specifier").is_some()
            || child_of_kind(&method, "type_parameter_list").is_some()
        {
            return None;
        }

        let mods = modifiers(&method, &unit.text);
        let visibility = Visibility::from_modifiers(&mods);
        if visibility != Visibility::Public || mods.iter().any(|m| m == "static") {
            return None;
        }

        let name = node_text(&method.child_by_field_name("name")?, &unit.text).to_string();
        if self.policy.excludes_action(class_name, &name)
            || self.policy.excludes_action(route_name, &name)
        {
            tracing::debug!("Action {}.{} excluded by configuration", class_name, name);
            return None;
        }

        let return_node = method
            .child_by_field_name("returns")
            .or_else(|| method.child_by_field_name("type"))?;
        let return_kind = self.classify_return(&return_node, &unit.text, scope, class_name, &name)?;

        let has = |m: &str| mods.iter().any(|x| x == m);
        Some(ActionMethod {
            parameters: self.parameters(method, unit, scope),
            return_kind,
            already_overridable: has("virtual"),
            overrides_base: has("override") || has("abstract"),
            visibility,
            location: SourceLocation {
                path: unit.path.clone(),
                line: node_line(&method),
                start_byte: method.start_byte(),
            },
            name,
        })
    }

    fn classify_return(
        &self,
        node: &Node,
        source: &str,
        scope: &Scope,
        class_name: &str,
        method: &str,
    ) -> Option<ReturnKind> {
        let text = node_text(node, source);
        let Some(ty) = TypeRef::from_node(node, source) else {
            tracing::debug!(
                "{}.{}: return type '{}' not understood, not an action",
                class_name,
                method,
                text
            );
            return None;
        };

        match self.model.resolve(&ty, scope) {
            Resolution::Symbol { key, args } => {
                if self.async_wrappers.contains(&key) && args.len() == 1 {
                    let inner = self.resolved_key(&args[0], scope, class_name, method)?;
                    return self.capability_of(&inner).map(|capability| ReturnKind::Async {
                        wrapper: key,
                        capability,
                    });
                }
                self.capability_of(&key)
                    .map(|capability| ReturnKind::Direct { capability })
            }
            Resolution::Unresolved(reason) => {
                tracing::debug!(
                    "{}.{}: return type '{}' unresolved ({}), not an action",
                    class_name,
                    method,
                    text,
                    reason
                );
                None
            }
            Resolution::Predefined(_) | Resolution::Other => None,
        }
    }

    fn resolved_key(
        &self,
        ty: &TypeRef,
        scope: &Scope,
        class_name: &str,
        method: &str,
    ) -> Option<String> {
        match self.model.resolve(ty, scope) {
            Resolution::Symbol { key, .. } => Some(key),
            Resolution::Unresolved(reason) => {
                tracing::debug!(
                    "{}.{}: wrapped type '{}' unresolved ({}), not an action",
                    class_name,
                    method,
                    ty,
                    reason
                );
                None
            }
            _ => None,
        }
    }

    fn capability_of(&self, key: &str) -> Option<String> {
        self.capabilities
            .iter()
            .find(|cap| self.model.is_assignable_to(key, cap))
            .cloned()
    }

    fn parameters(&self, method: Node, unit: &SourceUnit, scope: &Scope) -> Vec<Parameter> {
        let Some(list) = method
            .child_by_field_name("parameters")
            .or_else(|| child_of_kind(&method, "parameter_list"))
        else {
            return Vec::new();
        };

        // A `params` array is spread over the list itself as `type` and
        // `name` fields.
        let mut out = Vec::new();
        let mut array_type = None;
        let mut cursor = list.walk();
        if !cursor.goto_first_child() {
            return out;
        }
        loop {
            let child = cursor.node();
            match (child.kind(), cursor.field_name()) {
                ("parameter", _) => out.extend(self.parameter(child, unit, scope)),
                (_, Some("type")) => array_type = Some(child),
                (_, Some("name")) => {
                    if let Some(type_node) = array_type.take() {
                        out.push(self.build_parameter(
                            &child,
                            &type_node,
                            Some(ParameterModifier::Params),
                            None,
                            unit,
                            scope,
                        ));
                    }
                }
                _ => {}
            }
            if !cursor.goto_next_sibling() {
                return out;
            }
        }
    }

    fn parameter(&self, node: Node, unit: &SourceUnit, scope: &Scope) -> Option<Parameter> {
        let source = unit.text.as_str();
        let name_node = node.child_by_field_name("name")?;
        let mut type_node = node.child_by_field_name("type")?;
        let children = all_children(&node);

        let mut modifier = children
            .iter()
            .filter(|c| c.kind() == "modifier" && c.end_byte() <= type_node.start_byte())
            .find_map(|c| ParameterModifier::from_keyword(node_text(c, source).trim()));
        // `ref T` may also come back as a single `ref_type` node.
        while matches!(type_node.kind(), "ref_type" | "scoped_type") {
            if type_node.kind() == "ref_type" {
                modifier = modifier.or(Some(ParameterModifier::Ref));
            }
            type_node = type_node.child_by_field_name("type")?;
        }
        let default_value = children
            .iter()
            .skip_while(|c| c.kind() != "=")
            .find(|c| c.is_named() && c.kind() != "comment")
            .map(|value| node_text(value, source).trim().to_string());

        Some(self.build_parameter(&name_node, &type_node, modifier, default_value, unit, scope))
    }

    fn build_parameter(
        &self,
        name_node: &Node,
        type_node: &Node,
        modifier: Option<ParameterModifier>,
        default_value: Option<String>,
        unit: &SourceUnit,
        scope: &Scope,
    ) -> Parameter {
        let source = unit.text.as_str();
        let type_text = collapse_whitespace(node_text(type_node, source));
        let qualified_type = TypeRef::from_node(type_node, source)
            .map(|ty| self.model.render_qualified(&ty, scope))
            .unwrap_or_else(|| type_text.clone());

        Parameter {
            name: node_text(name_node, source).to_string(),
            type_text,
            qualified_type,
            modifier,
            default_value,
        }
    }
}

/// `HomeController` -> `Home`; a name that is only the suffix stays whole.
pub fn strip_suffix(name: &str, suffix: &str) -> String {
    match name.strip_suffix(suffix) {
        Some(stripped) if !stripped.is_empty() && !suffix.is_empty() => stripped.to_string(),
        _ => name.to_string(),
    }
}

/// `Areas/{Area}/...` below the project root.
pub fn area_from_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    segments
        .iter()
        .position(|s| s.eq_ignore_ascii_case("Areas"))
        .filter(|&i| i + 2 < segments.len())
        .map(|i| segments[i + 1].clone())
}

/// Area named by an `[Area("...")]` attribute on the declaration.
fn area_attribute(node: &Node, source: &str) -> Option<String> {
    all_children(node)
        .iter()
        .filter(|c| c.kind() == "attribute_list")
        .flat_map(|list| named_children(list))
        .filter(|attr| attr.kind() == "attribute")
        .find_map(|attr| {
            let name = attr
                .child_by_field_name("name")
                .map(|n| node_text(&n, source))
                .unwrap_or_default();
            let simple = name.rsplit('.').next().unwrap_or(name);
            if simple != "Area" && simple != "AreaAttribute" {
                return None;
            }
            let args = child_of_kind(&attr, "attribute_argument_list")?;
            first_string_literal(node_text(&args, source))
        })
}

fn first_string_literal(text: &str) -> Option<String> {
    let start = text.find('"')? + 1;
    let len = text[start..].find('"')?;
    Some(text[start..start + len].to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

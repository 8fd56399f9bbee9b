//! Builds the [`CompanionDocument`] from merged handlers and located assets.
//!
//! Everything here is plain data; [`super::emit`] turns it into C#. Order is
//! taken from the inputs unchanged so the same project always yields the same
//! document.

use super::descriptor::DescriptorTemplate;
use super::names::{global_name, route_key, sanitize_identifier};
use super::registry::{descriptor_class_name, interface_name, Registry};
use crate::analysis::{ActionMethod, HandlerClass, Parameter};
use crate::config::{ActionmapConfig, TypeKind};
use crate::locators::{StaticFile, View};
use crate::source::SemanticModel;
use serde::Serialize;

const TASK: &str = "System.Threading.Tasks.Task`1";
const VALUE_TASK: &str = "System.Threading.Tasks.ValueTask`1";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanionDocument {
    /// Namespace of the registry, descriptor type and links.
    pub namespace: String,
    pub usings: Vec<String>,
    pub handlers: Vec<HandlerSurface>,
    pub registry: Registry,
    pub descriptor: DescriptorType,
    pub links: Option<LinkTree>,
}

impl CompanionDocument {
    pub fn action_count(&self) -> usize {
        self.handlers.iter().map(|h| h.actions.len()).sum()
    }
}

/// Everything generated for one handler class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerSurface {
    pub namespace: String,
    pub class_name: String,
    /// `global::`-qualified handler class.
    pub qualified_class: String,
    pub route_name: String,
    pub area: String,
    pub interface_name: String,
    pub descriptor_class: String,
    pub members: HandlerMembers,
    /// Action name constants: (identifier, value).
    pub action_names: Vec<(String, String)>,
    /// View name constants: (identifier, value).
    pub view_names: Vec<(String, String)>,
    pub actions: Vec<ActionSurface>,
}

/// Names of the members generated onto the handler's partial class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerMembers {
    pub area: String,
    pub name: String,
    pub action_names: String,
    pub view_names: String,
}

impl HandlerMembers {
    /// `Area`, `Name`, `ActionNames` and `ViewNames`, each suffixed with `_`
    /// while an action of the handler already uses the name.
    fn for_handler(handler: &HandlerClass) -> Self {
        let pick = |base: &str| {
            let mut name = base.to_string();
            while handler.actions.iter().any(|a| a.name == name) {
                name.push('_');
            }
            if name != base {
                tracing::warn!(
                    "{} has an action named {}; generated member emitted as {}",
                    handler.qualified_name(),
                    base,
                    name
                );
            }
            name
        };
        Self {
            area: pick("Area"),
            name: pick("Name"),
            action_names: pick("ActionNames"),
            view_names: pick("ViewNames"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionSurface {
    pub name: String,
    /// Return type shared by interface, bridge and descriptor.
    pub return_type: String,
    /// `global::`-qualified capability the descriptor is returned as.
    pub capability: String,
    pub completion: Completion,
    pub parameters: Vec<Parameter>,
    pub template: DescriptorTemplate,
}

impl ActionSurface {
    pub fn is_async(&self) -> bool {
        self.completion != Completion::Direct
    }
}

/// How a descriptor method hands its descriptor back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    Direct,
    Task,
    ValueTask,
    /// A configured wrapper the generator cannot complete synchronously; the
    /// descriptor method is emitted `async` and awaits nothing.
    Async,
}

impl Completion {
    fn for_wrapper(wrapper: Option<&str>) -> Self {
        match wrapper {
            None => Self::Direct,
            Some(TASK) => Self::Task,
            Some(VALUE_TASK) => Self::ValueTask,
            Some(_) => Self::Async,
        }
    }
}

/// The shared descriptor type implementing the action-result capabilities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptorType {
    pub name: String,
    /// Base class first (at most one), then interfaces.
    pub bases: Vec<String>,
    /// Members required by the capabilities, from the type catalog.
    pub stubs: Vec<String>,
    pub binding_helper: String,
}

/// Static assets grouped by directory.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LinkTree {
    pub name: String,
    /// Directory name as found on disk.
    #[serde(skip)]
    pub(crate) segment: String,
    /// (identifier, url) constants.
    pub files: Vec<(String, String)>,
    pub children: Vec<LinkTree>,
}

impl LinkTree {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn insert(&mut self, segments: &[&str], file: &StaticFile) {
        match segments.split_first() {
            None => {
                let ident = self.member_name(&file.file_name);
                self.files.push((ident, format!("~/{}", file.relative_path)));
            }
            Some((dir, rest)) => {
                let idx = match self.children.iter().position(|c| c.segment == *dir) {
                    Some(idx) => idx,
                    None => {
                        let mut child = LinkTree::named(self.member_name(dir));
                        child.segment = dir.to_string();
                        self.children.push(child);
                        self.children.len() - 1
                    }
                };
                self.children[idx].insert(rest, file);
            }
        }
    }

    /// Identifier for a new member: never the enclosing class's name, and
    /// numbered from 2 when another member already took it.
    fn member_name(&self, raw: &str) -> String {
        let mut base = sanitize_identifier(raw);
        if base == self.name {
            base.push('_');
        }
        let taken = |ident: &str| {
            ident == self.name
                || self.files.iter().any(|(i, _)| i == ident)
                || self.children.iter().any(|c| c.name == ident)
        };
        let mut ident = base.clone();
        let mut n = 2;
        while taken(&ident) {
            ident = format!("{}{}", base, n);
            n += 1;
        }
        if ident != base {
            tracing::warn!(
                "Static asset name '{}' collides in {}; emitted as {}",
                raw,
                self.name,
                ident
            );
        }
        ident
    }
}

pub struct Synthesizer<'a> {
    config: &'a ActionmapConfig,
    model: &'a SemanticModel,
}

impl<'a> Synthesizer<'a> {
    pub fn new(config: &'a ActionmapConfig, model: &'a SemanticModel) -> Self {
        Self { config, model }
    }

    pub fn synthesize(
        &self,
        handlers: &[HandlerClass],
        views: &[View],
        static_files: &[StaticFile],
    ) -> CompanionDocument {
        let _span = tracing::info_span!("synthesize", handlers = handlers.len()).entered();

        let surfaces: Vec<HandlerSurface> = handlers
            .iter()
            .map(|handler| self.handler_surface(handler, views))
            .collect();

        let mut usings: Vec<String> = Vec::new();
        for using in handlers.iter().flat_map(|h| h.usings.iter()) {
            if !usings.contains(using) {
                usings.push(using.clone());
            }
        }
        if !usings.contains(&self.config.namespace) {
            usings.push(self.config.namespace.clone());
        }

        let links = if static_files.is_empty() {
            None
        } else {
            let mut root = LinkTree::named("Links");
            for file in static_files {
                root.insert(&file.collection_segments(), file);
            }
            Some(root)
        };

        tracing::debug!(
            "Synthesized {} handlers, {} actions",
            surfaces.len(),
            surfaces.iter().map(|s| s.actions.len()).sum::<usize>()
        );

        CompanionDocument {
            namespace: self.config.namespace.clone(),
            usings,
            handlers: surfaces,
            registry: Registry::build(&self.config.registry_name, handlers),
            descriptor: self.descriptor_type(),
            links,
        }
    }

    fn handler_surface(&self, handler: &HandlerClass, views: &[View]) -> HandlerSurface {
        let members = HandlerMembers::for_handler(handler);
        let action_names: Vec<(String, String)> = handler
            .action_names()
            .into_iter()
            .map(|name| (name.to_string(), route_key(name).to_string()))
            .collect();

        let mut view_names: Vec<(String, String)> = Vec::new();
        for view in views.iter().filter(|v| {
            v.handler == handler.route_name && v.area.as_deref() == handler.area.as_deref()
        }) {
            let mut ident = sanitize_identifier(&view.name);
            if ident == members.view_names {
                ident.push('_');
            }
            if !view_names.iter().any(|(i, _)| *i == ident) {
                view_names.push((ident, view.name.clone()));
            }
        }

        HandlerSurface {
            namespace: handler.namespace.clone(),
            class_name: handler.name.clone(),
            qualified_class: global_name(&handler.key),
            route_name: handler.route_name.clone(),
            area: handler.area.clone().unwrap_or_default(),
            interface_name: interface_name(&handler.route_name),
            descriptor_class: descriptor_class_name(&handler.route_name),
            members,
            action_names,
            view_names,
            actions: handler
                .actions
                .iter()
                .map(|action| self.action_surface(handler, action))
                .collect(),
        }
    }

    fn action_surface(&self, handler: &HandlerClass, action: &ActionMethod) -> ActionSurface {
        let capability = global_name(action.return_kind.capability());
        let return_type = match action.return_kind.wrapper() {
            Some(wrapper) => format!("{}<{}>", global_name(wrapper), capability),
            None => capability.clone(),
        };
        ActionSurface {
            name: action.name.clone(),
            return_type,
            capability,
            completion: Completion::for_wrapper(action.return_kind.wrapper()),
            parameters: action.parameters.clone(),
            template: DescriptorTemplate::for_action(handler, action),
        }
    }

    fn descriptor_type(&self) -> DescriptorType {
        let mut classes = Vec::new();
        let mut interfaces = Vec::new();
        let mut stubs = Vec::new();

        for capability in &self.config.action_result_types {
            let symbol = self.model.symbol(capability);
            match symbol.map(|s| s.kind) {
                Some(TypeKind::Interface) => interfaces.push(global_name(capability)),
                Some(TypeKind::Class) | Some(TypeKind::Record) => {
                    if classes.is_empty() {
                        classes.push(global_name(capability));
                    } else {
                        tracing::warn!(
                            "{} cannot derive from both {} and {}; skipping the latter",
                            self.config.descriptor_name,
                            classes[0],
                            capability
                        );
                        continue;
                    }
                }
                Some(kind) => {
                    tracing::warn!(
                        "Capability {} is a {:?}; the descriptor cannot implement it",
                        capability,
                        kind
                    );
                    continue;
                }
                None => {
                    tracing::warn!("Capability {} is not a known type", capability);
                    continue;
                }
            }
            if let Some(stub) = symbol.and_then(|s| s.descriptor_stub.as_ref()) {
                if !stubs.contains(stub) {
                    stubs.push(stub.clone());
                }
            }
        }

        classes.extend(interfaces);
        DescriptorType {
            name: self.config.descriptor_name.clone(),
            bases: classes,
            stubs,
            binding_helper: self.config.binding_helper.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AreaSource, ParameterModifier, ReturnKind, SourceLocation, Visibility};
    use crate::config::builtin_catalog;
    use std::path::PathBuf;

    const RESULT: &str = "Microsoft.AspNetCore.Mvc.IActionResult";

    fn action(
        name: &str,
        wrapper: Option<&str>,
        params: &[(&str, Option<ParameterModifier>)],
    ) -> ActionMethod {
        ActionMethod {
            name: name.into(),
            parameters: params
                .iter()
                .map(|(p, modifier)| Parameter {
                    name: p.to_string(),
                    type_text: "int".into(),
                    qualified_type: "int".into(),
                    modifier: *modifier,
                    default_value: None,
                })
                .collect(),
            return_kind: match wrapper {
                Some(w) => ReturnKind::Async {
                    wrapper: w.into(),
                    capability: RESULT.into(),
                },
                None => ReturnKind::Direct {
                    capability: RESULT.into(),
                },
            },
            already_overridable: false,
            overrides_base: false,
            visibility: Visibility::Public,
            location: SourceLocation {
                path: PathBuf::from("HomeController.cs"),
                line: 1,
                start_byte: 0,
            },
        }
    }

    fn home() -> HandlerClass {
        HandlerClass {
            key: "Shop.Controllers.HomeController".into(),
            name: "HomeController".into(),
            route_name: "Home".into(),
            namespace: "Shop.Controllers".into(),
            area: None,
            area_source: AreaSource::None,
            base_chain: vec!["Microsoft.AspNetCore.Mvc.Controller".into()],
            actions: vec![
                action("Index", None, &[]),
                action("Details", Some(TASK), &[("id", None)]),
                action("TryGet", None, &[("id", None), ("found", Some(ParameterModifier::Out))]),
            ],
            already_composable: true,
            files: vec![PathBuf::from("HomeController.cs")],
            usings: vec!["System".into(), "Microsoft.AspNetCore.Mvc".into()],
        }
    }

    fn model() -> SemanticModel {
        SemanticModel::build(&[], &builtin_catalog())
    }

    #[test]
    fn test_surfaces_follow_handler_order() {
        let config = ActionmapConfig::default();
        let model = model();
        let doc = Synthesizer::new(&config, &model).synthesize(&[home()], &[], &[]);

        let surface = &doc.handlers[0];
        assert_eq!(surface.interface_name, "IHomeActions");
        assert_eq!(surface.descriptor_class, "HomeActionDescriptors");
        let names: Vec<_> = surface.actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Index", "Details", "TryGet"]);
        assert_eq!(
            surface.actions[1].return_type,
            "global::System.Threading.Tasks.Task<global::Microsoft.AspNetCore.Mvc.IActionResult>"
        );
        assert_eq!(surface.actions[1].completion, Completion::Task);
        assert_eq!(doc.usings.last().map(String::as_str), Some("ActionMap"));
    }

    #[test]
    fn test_out_parameters_are_not_bound() {
        let config = ActionmapConfig::default();
        let model = model();
        let doc = Synthesizer::new(&config, &model).synthesize(&[home()], &[], &[]);

        let try_get = &doc.handlers[0].actions[2];
        assert_eq!(try_get.parameters.len(), 2);
        assert_eq!(try_get.template.parameters, vec!["id"]);
    }

    #[test]
    fn test_generated_members_step_aside_for_actions() {
        let config = ActionmapConfig::default();
        let model = model();
        let mut handler = home();
        handler.actions = vec![
            action("Name", None, &[]),
            action("ActionNames", None, &[]),
            action("ActionNames_", None, &[]),
        ];
        let doc = Synthesizer::new(&config, &model).synthesize(&[handler], &[], &[]);

        assert_eq!(
            doc.handlers[0].members,
            HandlerMembers {
                area: "Area".into(),
                name: "Name_".into(),
                action_names: "ActionNames__".into(),
                view_names: "ViewNames".into(),
            }
        );
    }

    #[test]
    fn test_descriptor_implements_capability_with_stub() {
        let config = ActionmapConfig::default();
        let model = model();
        let doc = Synthesizer::new(&config, &model).synthesize(&[home()], &[], &[]);

        assert_eq!(
            doc.descriptor.bases,
            vec!["global::Microsoft.AspNetCore.Mvc.IActionResult"]
        );
        assert_eq!(doc.descriptor.stubs.len(), 1);
        assert!(doc.descriptor.stubs[0].contains("ExecuteResultAsync"));
    }

    #[test]
    fn test_views_matched_by_handler_and_area() {
        let config = ActionmapConfig::default();
        let model = model();
        let views = vec![
            View {
                area: None,
                handler: "Home".into(),
                name: "Index".into(),
                relative_path: "Views/Home/Index.cshtml".into(),
            },
            View {
                area: Some("Admin".into()),
                handler: "Home".into(),
                name: "Dashboard".into(),
                relative_path: "Areas/Admin/Views/Home/Dashboard.cshtml".into(),
            },
            View {
                area: None,
                handler: "Other".into(),
                name: "Index".into(),
                relative_path: "Views/Other/Index.cshtml".into(),
            },
        ];
        let doc = Synthesizer::new(&config, &model).synthesize(&[home()], &views, &[]);
        assert_eq!(
            doc.handlers[0].view_names,
            vec![("Index".to_string(), "Index".to_string())]
        );
    }

    #[test]
    fn test_link_tree_groups_by_directory() {
        let config = ActionmapConfig::default();
        let model = model();
        let files = vec![
            StaticFile {
                file_name: "site.css".into(),
                relative_path: "css/site.css".into(),
                collection: "css".into(),
            },
            StaticFile {
                file_name: "favicon.ico".into(),
                relative_path: "favicon.ico".into(),
                collection: String::new(),
            },
            StaticFile {
                file_name: "Links".into(),
                relative_path: "Links".into(),
                collection: String::new(),
            },
        ];
        let doc = Synthesizer::new(&config, &model).synthesize(&[home()], &[], &files);

        let links = doc.links.expect("links");
        assert_eq!(links.children.len(), 1);
        assert_eq!(lookup(&links, &["css", "site_css"]), Some("~/css/site.css"));
        assert_eq!(lookup(&links, &["favicon_ico"]), Some("~/favicon.ico"));
        assert_eq!(lookup(&links, &["Links_"]), Some("~/Links"));
    }

    #[test]
    fn test_colliding_link_names_are_numbered() {
        let config = ActionmapConfig::default();
        let model = model();
        let file = |name: &str, path: &str, collection: &str| StaticFile {
            file_name: name.into(),
            relative_path: path.into(),
            collection: collection.into(),
        };
        let files = vec![
            file("site.min.js", "js/site.min.js", "js"),
            file("site-min.js", "js/site-min.js", "js"),
            file("app.js", "js/app.js", "js"),
            file("js", "js", ""),
        ];
        let doc = Synthesizer::new(&config, &model).synthesize(&[home()], &[], &files);

        let links = doc.links.expect("links");
        assert_eq!(lookup(&links, &["js", "site_min_js"]), Some("~/js/site.min.js"));
        assert_eq!(lookup(&links, &["js", "site_min_js2"]), Some("~/js/site-min.js"));
        assert_eq!(lookup(&links, &["js", "app_js"]), Some("~/js/app.js"));
        assert_eq!(lookup(&links, &["js2"]), Some("~/js"));
        assert_eq!(links.children.len(), 1);
    }

    fn lookup<'t>(tree: &'t LinkTree, segments: &[&str]) -> Option<&'t str> {
        match segments {
            [] => None,
            [file] => tree
                .files
                .iter()
                .find(|(ident, _)| ident == file)
                .map(|(_, url)| url.as_str()),
            [dir, rest @ ..] => tree
                .children
                .iter()
                .find(|c| c.name == *dir)
                .and_then(|c| lookup(c, rest)),
        }
    }

    #[test]
    fn test_no_static_files_no_links() {
        let config = ActionmapConfig::default();
        let model = model();
        let doc = Synthesizer::new(&config, &model).synthesize(&[], &[], &[]);
        assert!(doc.links.is_none());
        assert_eq!(doc.registry.entries().count(), 0);
    }
}

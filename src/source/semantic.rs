//! Project-wide symbol table.
//!
//! The model knows every type declared in the scanned units plus the types of
//! the external catalog. Names written in source are resolved the way the C#
//! compiler looks them up: enclosing types, then the enclosing namespaces from
//! the innermost outwards, then `using` aliases, then `using` namespaces. A
//! name that matches through more than one `using` namespace is ambiguous and
//! does not resolve.
//!
//! Keys are metadata names: namespace, enclosing types and the type name,
//! dot-separated, with a backtick arity suffix on generic types
//! (``App.Controllers.Outer`1.Inner``).

use super::parser::{all_children, child_of_kind, modifiers, named_children, node_text};
use super::type_ref::{NameSegment, TypeRef};
use super::SourceUnit;
use crate::config::{ExternalTypeConfig, TypeKind};
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolOrigin {
    Source,
    External,
}

/// A named type known to the model.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub key: String,
    pub name: String,
    pub namespace: String,
    pub kind: TypeKind,
    pub arity: usize,
    pub origin: SymbolOrigin,
    /// Resolved direct bases of all parts, in declaration order.
    pub bases: Vec<String>,
    pub nested: bool,
    /// Files declaring a part of this type.
    pub parts: Vec<PathBuf>,
    pub descriptor_stub: Option<String>,
}

/// Lookup context of a position in source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    pub namespace: String,
    pub usings: Vec<String>,
    pub aliases: Vec<(String, TypeRef)>,
    /// Keys of the enclosing types, outermost first.
    pub enclosing_types: Vec<String>,
    pub type_parameters: Vec<String>,
}

impl Scope {
    fn add_using(&mut self, directive: UsingDirective) {
        match directive.target {
            UsingTarget::Namespace(ns) => {
                if !self.usings.contains(&ns) {
                    self.usings.push(ns);
                }
            }
            UsingTarget::Alias(alias, target) => self.aliases.push((alias, target)),
            UsingTarget::Static(_) => {}
        }
    }

    fn alias(&self, name: &str) -> Option<&TypeRef> {
        self.aliases
            .iter()
            .rev()
            .find(|(alias, _)| alias == name)
            .map(|(_, target)| target)
    }
}

/// Outcome of looking up a type reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A known named type; `args` are the type arguments as written.
    Symbol { key: String, args: Vec<TypeRef> },
    Predefined(String),
    /// Arrays, tuples, pointers and type parameters.
    Other,
    Unresolved(String),
}

/// A type declaration found in one unit.
#[derive(Debug, Clone)]
pub struct TypeDeclaration<'t> {
    pub node: Node<'t>,
    pub key: String,
    pub name: String,
    pub kind: TypeKind,
    pub type_parameters: Vec<String>,
    pub modifiers: Vec<String>,
    /// Base list entries as written, with their structured form.
    pub bases: Vec<(String, Option<TypeRef>)>,
    /// Scope the declaration itself sits in.
    pub scope: Scope,
}

impl<'t> TypeDeclaration<'t> {
    pub fn is_nested(&self) -> bool {
        !self.scope.enclosing_types.is_empty()
    }

    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty()
    }

    pub fn has_modifier(&self, keyword: &str) -> bool {
        self.modifiers.iter().any(|m| m == keyword)
    }

    pub fn body(&self) -> Option<Node<'t>> {
        self.node
            .child_by_field_name("body")
            .or_else(|| child_of_kind(&self.node, "declaration_list"))
    }

    /// Scope for the base list: the outer scope plus own type parameters.
    pub fn base_scope(&self) -> Scope {
        let mut scope = self.scope.clone();
        scope.type_parameters.extend(self.type_parameters.iter().cloned());
        scope
    }

    /// Scope for members declared in the body.
    pub fn member_scope(&self) -> Scope {
        let mut scope = self.base_scope();
        scope.enclosing_types.push(self.key.clone());
        scope
    }
}

#[derive(Debug, Default)]
pub struct SemanticModel {
    symbols: IndexMap<String, Symbol>,
    global_scope: Scope,
}

impl SemanticModel {
    /// Build the model over all units and the external catalog.
    pub fn build(units: &[SourceUnit], catalog: &[ExternalTypeConfig]) -> Self {
        let mut model = Self::default();
        for external in catalog {
            model.insert_external(external);
        }
        for unit in units {
            model.collect_global_usings(unit);
        }

        let mut pending = Vec::new();
        for unit in units {
            for decl in model.declarations(unit) {
                model.insert_declaration(&decl, unit);
                pending.push((decl.key.clone(), decl.bases.clone(), decl.base_scope()));
            }
        }

        let resolved: Vec<_> = pending
            .into_iter()
            .map(|(key, bases, scope)| {
                let outcomes: Vec<_> = bases
                    .into_iter()
                    .map(|(text, ty)| {
                        let resolution = ty
                            .map(|ty| model.resolve(&ty, &scope))
                            .unwrap_or_else(|| Resolution::Unresolved("not a named type".into()));
                        (text, resolution)
                    })
                    .collect();
                (key, outcomes)
            })
            .collect();

        for (key, outcomes) in resolved {
            let Some(symbol) = model.symbols.get_mut(&key) else {
                continue;
            };
            for (text, resolution) in outcomes {
                match resolution {
                    Resolution::Symbol { key: base, .. } if base != key => {
                        if !symbol.bases.contains(&base) {
                            symbol.bases.push(base);
                        }
                    }
                    Resolution::Unresolved(reason) => {
                        tracing::debug!("Base type '{}' of {} unresolved: {}", text, key, reason);
                    }
                    _ => {}
                }
            }
        }

        tracing::debug!("Semantic model holds {} types", model.symbols.len());
        model
    }

    pub fn symbol(&self, key: &str) -> Option<&Symbol> {
        self.symbols.get(key)
    }

    /// Type declarations of a unit in source order, nested ones after their parent.
    pub fn declarations<'t>(&self, unit: &'t SourceUnit) -> Vec<TypeDeclaration<'t>> {
        let mut out = Vec::new();
        let root = unit.tree.root_node();
        walk_declarations(root, &unit.text, self.global_scope.clone(), &mut out);
        out
    }

    pub fn resolve(&self, ty: &TypeRef, scope: &Scope) -> Resolution {
        match ty {
            TypeRef::Predefined(name) => Resolution::Predefined(name.clone()),
            TypeRef::Nullable(inner) => match self.resolve(inner, scope) {
                symbol @ Resolution::Symbol { .. } => symbol,
                unresolved @ Resolution::Unresolved(_) => unresolved,
                _ => Resolution::Other,
            },
            TypeRef::Named {
                qualifier,
                segments,
            } => self.resolve_named(qualifier.as_deref(), segments, scope),
            TypeRef::Array { .. } | TypeRef::Pointer(_) | TypeRef::Tuple(_) => Resolution::Other,
        }
    }

    fn resolve_named(
        &self,
        qualifier: Option<&str>,
        segments: &[NameSegment],
        scope: &Scope,
    ) -> Resolution {
        let Some(first) = segments.first() else {
            return Resolution::Unresolved("empty name".into());
        };
        let args = segments.last().map(|s| s.args.clone()).unwrap_or_default();
        let path = metadata_path(segments);
        let hit = |key: String| {
            self.symbols.contains_key(&key).then(|| Resolution::Symbol {
                key,
                args: args.clone(),
            })
        };

        match qualifier {
            Some("global") => {
                return hit(path.clone())
                    .unwrap_or_else(|| Resolution::Unresolved(format!("global::{} not found", path)))
            }
            Some(alias) => {
                return match scope.alias(alias).and_then(TypeRef::metadata_name) {
                    Some(target) => hit(format!("{}.{}", target, path)).unwrap_or_else(|| {
                        Resolution::Unresolved(format!("{}::{} not found", alias, path))
                    }),
                    None => Resolution::Unresolved(format!("unknown alias '{}'", alias)),
                }
            }
            None => {}
        }

        if segments.len() == 1 && first.args.is_empty() && scope.type_parameters.contains(&first.name)
        {
            return Resolution::Other;
        }

        for enclosing in scope.enclosing_types.iter().rev() {
            if let Some(found) = hit(format!("{}.{}", enclosing, path)) {
                return found;
            }
        }

        for ns in namespace_chain(&scope.namespace) {
            let key = if ns.is_empty() {
                path.clone()
            } else {
                format!("{}.{}", ns, path)
            };
            if let Some(found) = hit(key) {
                return found;
            }
        }

        if first.args.is_empty() {
            if let Some(target) = scope.alias(&first.name) {
                if segments.len() == 1 {
                    return self.resolve_absolute(target);
                }
                if let Some(target) = target.metadata_name() {
                    let rest = metadata_path(&segments[1..]);
                    if let Some(found) = hit(format!("{}.{}", target, rest)) {
                        return found;
                    }
                }
            }
        }

        let head = first.metadata_name();
        let mut hits: Vec<String> = Vec::new();
        for ns in &scope.usings {
            let key = format!("{}.{}", ns, path);
            let head_is_type = self.symbols.contains_key(&format!("{}.{}", ns, head));
            if head_is_type && self.symbols.contains_key(&key) && !hits.contains(&key) {
                hits.push(key);
            }
        }

        match hits.len() {
            0 => Resolution::Unresolved(format!("'{}' not found", path)),
            1 => Resolution::Symbol {
                key: hits.remove(0),
                args,
            },
            _ => Resolution::Unresolved(format!(
                "'{}' is ambiguous between {}",
                path,
                hits.join(" and ")
            )),
        }
    }

    /// Resolve a fully qualified reference, such as the target of an alias.
    fn resolve_absolute(&self, target: &TypeRef) -> Resolution {
        match target {
            TypeRef::Named { segments, .. } => {
                let key = metadata_path(segments);
                if self.symbols.contains_key(&key) {
                    Resolution::Symbol {
                        key,
                        args: target.type_args().to_vec(),
                    }
                } else {
                    Resolution::Unresolved(format!("alias target '{}' not found", target))
                }
            }
            TypeRef::Predefined(name) => Resolution::Predefined(name.clone()),
            _ => Resolution::Other,
        }
    }

    /// All transitive bases of `key`, breadth-first, excluding `key` itself.
    pub fn ancestors(&self, key: &str) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::from([key.to_string()]);
        let mut queue: VecDeque<String> = VecDeque::from([key.to_string()]);
        let mut out = Vec::new();

        while let Some(current) = queue.pop_front() {
            let Some(symbol) = self.symbols.get(&current) else {
                continue;
            };
            for base in &symbol.bases {
                if seen.insert(base.clone()) {
                    out.push(base.clone());
                    queue.push_back(base.clone());
                }
            }
        }
        out
    }

    /// Class inheritance chain of `key`, nearest base first.
    pub fn base_chain(&self, key: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([key]);
        let mut current = self.symbols.get(key);

        while let Some(symbol) = current {
            let next = symbol.bases.iter().find(|b| {
                self.symbols
                    .get(b.as_str())
                    .is_some_and(|s| matches!(s.kind, TypeKind::Class | TypeKind::Record))
            });
            match next {
                Some(base) if seen.insert(base.as_str()) => {
                    chain.push(base.clone());
                    current = self.symbols.get(base.as_str());
                }
                _ => break,
            }
        }
        chain
    }

    pub fn is_assignable_to(&self, key: &str, target: &str) -> bool {
        key == target || self.ancestors(key).iter().any(|a| a == target)
    }

    /// Render a reference fully qualified (`global::` prefixed) so it reads the
    /// same from any namespace. Unresolved names are rendered as written.
    pub fn render_qualified(&self, ty: &TypeRef, scope: &Scope) -> String {
        match ty {
            TypeRef::Predefined(name) => name.clone(),
            TypeRef::Nullable(inner) => format!("{}?", self.render_qualified(inner, scope)),
            TypeRef::Pointer(inner) => format!("{}*", self.render_qualified(inner, scope)),
            TypeRef::Array { element, rank } => format!(
                "{}[{}]",
                self.render_qualified(element, scope),
                ",".repeat(rank.saturating_sub(1))
            ),
            TypeRef::Tuple(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|(item, name)| {
                        let rendered = self.render_qualified(item, scope);
                        match name {
                            Some(n) => format!("{} {}", rendered, n),
                            None => rendered,
                        }
                    })
                    .collect();
                format!("({})", parts.join(", "))
            }
            TypeRef::Named { segments, .. } => match self.resolve(ty, scope) {
                Resolution::Symbol { key, args } => {
                    self.render_key(&key, segments, &args, scope)
                }
                _ => ty.to_string(),
            },
        }
    }

    fn render_key(
        &self,
        key: &str,
        segments: &[NameSegment],
        args: &[TypeRef],
        scope: &Scope,
    ) -> String {
        let parts: Vec<&str> = key.split('.').collect();
        let rendered: Vec<String> = parts
            .iter()
            .enumerate()
            .map(|(i, part)| {
                let name = part.split('`').next().unwrap_or(part);
                let from_end = parts.len() - 1 - i;
                let part_args: &[TypeRef] = if from_end == 0 {
                    args
                } else {
                    segments
                        .len()
                        .checked_sub(1 + from_end)
                        .map(|idx| &segments[idx])
                        .filter(|seg| seg.name == name)
                        .map(|seg| seg.args.as_slice())
                        .unwrap_or(&[])
                };
                if part_args.is_empty() {
                    name.to_string()
                } else {
                    let rendered_args: Vec<String> = part_args
                        .iter()
                        .map(|a| self.render_qualified(a, scope))
                        .collect();
                    format!("{}<{}>", name, rendered_args.join(", "))
                }
            })
            .collect();
        format!("global::{}", rendered.join("."))
    }

    fn insert_external(&mut self, external: &ExternalTypeConfig) {
        let (namespace, last) = match external.name.rsplit_once('.') {
            Some((ns, last)) => (ns.to_string(), last),
            None => (String::new(), external.name.as_str()),
        };
        let (name, arity) = split_arity(last);
        self.symbols.insert(
            external.name.clone(),
            Symbol {
                key: external.name.clone(),
                name,
                namespace,
                kind: external.kind,
                arity,
                origin: SymbolOrigin::External,
                bases: external.bases.clone(),
                nested: false,
                parts: Vec::new(),
                descriptor_stub: external.descriptor_stub.clone(),
            },
        );
    }

    fn insert_declaration(&mut self, decl: &TypeDeclaration, unit: &SourceUnit) {
        match self.symbols.get_mut(&decl.key) {
            Some(existing) if existing.origin == SymbolOrigin::Source => {
                if !existing.parts.contains(&unit.path) {
                    existing.parts.push(unit.path.clone());
                }
            }
            _ => {
                self.symbols.insert(
                    decl.key.clone(),
                    Symbol {
                        key: decl.key.clone(),
                        name: decl.name.clone(),
                        namespace: decl.scope.namespace.clone(),
                        kind: decl.kind,
                        arity: decl.type_parameters.len(),
                        origin: SymbolOrigin::Source,
                        bases: Vec::new(),
                        nested: decl.is_nested(),
                        parts: vec![unit.path.clone()],
                        descriptor_stub: None,
                    },
                );
            }
        }
    }

    fn collect_global_usings(&mut self, unit: &SourceUnit) {
        for child in named_children(&unit.tree.root_node()) {
            if child.kind() != "using_directive" {
                continue;
            }
            if let Some(directive) = using_directive(&child, &unit.text) {
                if directive.global {
                    self.global_scope.add_using(directive);
                }
            }
        }
    }
}

fn walk_declarations<'t>(
    node: Node<'t>,
    source: &str,
    mut scope: Scope,
    out: &mut Vec<TypeDeclaration<'t>>,
) {
    for child in named_children(&node) {
        match child.kind() {
            "using_directive" => {
                if let Some(directive) = using_directive(&child, source) {
                    if !directive.global {
                        scope.add_using(directive);
                    }
                }
            }
            "namespace_declaration" => {
                let inner = namespace_scope(&scope, &child, source);
                if let Some(body) = child
                    .child_by_field_name("body")
                    .or_else(|| child_of_kind(&child, "declaration_list"))
                {
                    walk_declarations(body, source, inner, out);
                }
            }
            "file_scoped_namespace_declaration" => {
                scope = namespace_scope(&scope, &child, source);
                walk_declarations(child, source, scope.clone(), out);
            }
            kind => {
                let Some(type_kind) = declaration_kind(kind) else {
                    continue;
                };
                let Some(decl) = type_declaration(child, type_kind, source, &scope) else {
                    continue;
                };
                let member_scope = decl.member_scope();
                let body = decl.body();
                out.push(decl);
                if let Some(body) = body {
                    walk_declarations(body, source, member_scope, out);
                }
            }
        }
    }
}

fn declaration_kind(kind: &str) -> Option<TypeKind> {
    match kind {
        "class_declaration" => Some(TypeKind::Class),
        "interface_declaration" => Some(TypeKind::Interface),
        "struct_declaration" | "record_struct_declaration" => Some(TypeKind::Struct),
        "record_declaration" => Some(TypeKind::Record),
        "enum_declaration" => Some(TypeKind::Enum),
        _ => None,
    }
}

fn namespace_scope(outer: &Scope, node: &Node, source: &str) -> Scope {
    let name = node
        .child_by_field_name("name")
        .map(|n| strip_whitespace(node_text(&n, source)))
        .unwrap_or_default();
    let mut scope = outer.clone();
    scope.namespace = if outer.namespace.is_empty() {
        name
    } else {
        format!("{}.{}", outer.namespace, name)
    };
    scope
}

fn type_declaration<'t>(
    node: Node<'t>,
    kind: TypeKind,
    source: &str,
    scope: &Scope,
) -> Option<TypeDeclaration<'t>> {
    let name = node_text(&node.child_by_field_name("name")?, source).to_string();
    let type_parameters = child_of_kind(&node, "type_parameter_list")
        .map(|list| {
            named_children(&list)
                .into_iter()
                .filter(|p| p.kind() == "type_parameter")
                .map(|p| {
                    p.child_by_field_name("name")
                        .map(|n| node_text(&n, source).to_string())
                        .unwrap_or_else(|| {
                            let text = node_text(&p, source);
                            text.split_whitespace().last().unwrap_or(text).to_string()
                        })
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let bases = child_of_kind(&node, "base_list")
        .map(|list| base_types(&list, source))
        .unwrap_or_default();

    let simple = if type_parameters.is_empty() {
        name.clone()
    } else {
        format!("{}`{}", name, type_parameters.len())
    };
    let key = match (scope.enclosing_types.last(), scope.namespace.as_str()) {
        (Some(outer), _) => format!("{}.{}", outer, simple),
        (None, "") => simple,
        (None, ns) => format!("{}.{}", ns, simple),
    };

    Some(TypeDeclaration {
        modifiers: modifiers(&node, source),
        node,
        key,
        name,
        kind,
        type_parameters,
        bases,
        scope: scope.clone(),
    })
}

fn base_types(list: &Node, source: &str) -> Vec<(String, Option<TypeRef>)> {
    named_children(list)
        .into_iter()
        .filter(|c| !matches!(c.kind(), "argument_list" | "comment"))
        .map(|c| {
            if c.kind() == "primary_constructor_base_type" {
                c.child_by_field_name("type")
                    .or_else(|| named_children(&c).into_iter().next())
                    .unwrap_or(c)
            } else {
                c
            }
        })
        .map(|c| {
            (
                node_text(&c, source).trim().to_string(),
                TypeRef::from_node(&c, source),
            )
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
struct UsingDirective {
    global: bool,
    target: UsingTarget,
}

#[derive(Debug, Clone, PartialEq)]
enum UsingTarget {
    Namespace(String),
    Static(String),
    Alias(String, TypeRef),
}

fn using_directive(node: &Node, source: &str) -> Option<UsingDirective> {
    let children = all_children(node);
    let keyword = |kw: &str| children.iter().any(|c| !c.is_named() && c.kind() == kw);
    let mut named = children
        .iter()
        .filter(|c| c.is_named() && c.kind() != "comment");

    let target = match node.child_by_field_name("name") {
        Some(alias) => {
            let ty = named
                .filter(|c| c.id() != alias.id())
                .find_map(|c| TypeRef::from_node(c, source))?;
            UsingTarget::Alias(node_text(&alias, source).to_string(), ty)
        }
        None => {
            let path = strip_whitespace(strip_global(node_text(named.next()?, source)));
            if keyword("static") {
                UsingTarget::Static(path)
            } else {
                UsingTarget::Namespace(path)
            }
        }
    };
    Some(UsingDirective {
        global: keyword("global"),
        target,
    })
}

fn strip_global(text: &str) -> &str {
    text.strip_prefix("global::").unwrap_or(text)
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn metadata_path(segments: &[NameSegment]) -> String {
    segments
        .iter()
        .map(NameSegment::metadata_name)
        .collect::<Vec<_>>()
        .join(".")
}

fn namespace_chain(namespace: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = namespace;
    while !current.is_empty() {
        chain.push(current.to_string());
        current = current.rsplit_once('.').map(|(outer, _)| outer).unwrap_or("");
    }
    chain.push(String::new());
    chain
}

fn split_arity(name: &str) -> (String, usize) {
    match name.split_once('`') {
        Some((base, arity)) => (base.to_string(), arity.parse().unwrap_or(0)),
        None => (name.to_string(), 0),
    }
}

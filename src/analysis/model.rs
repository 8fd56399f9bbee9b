//! Classification results.

use serde::Serialize;
use std::path::PathBuf;

/// A class deriving, possibly transitively, from the base handler type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerClass {
    /// Metadata key of the class symbol.
    pub key: String,
    pub name: String,
    /// Class name with the handler suffix stripped (`HomeController` -> `Home`).
    pub route_name: String,
    pub namespace: String,
    pub area: Option<String>,
    pub area_source: AreaSource,
    /// Resolved class ancestors, nearest first.
    pub base_chain: Vec<String>,
    pub actions: Vec<ActionMethod>,
    /// Every part carried `partial` before this run.
    pub already_composable: bool,
    /// Files declaring a classified part, in merge order.
    pub files: Vec<PathBuf>,
    /// Namespaces imported where the class is declared.
    pub usings: Vec<String>,
}

impl HandlerClass {
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Registry key: the route name, area-prefixed when the handler lives in
    /// an area.
    pub fn registry_key(&self) -> String {
        match self.area.as_deref() {
            Some(area) if !area.is_empty() => format!("{}{}", area, self.route_name),
            _ => self.route_name.clone(),
        }
    }

    /// Distinct action names in declaration order.
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for action in &self.actions {
            if !names.contains(&action.name.as_str()) {
                names.push(&action.name);
            }
        }
        names
    }
}

/// Where a handler's area came from. Later variants take precedence when
/// partial parts disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaSource {
    #[default]
    None,
    /// An `Areas/<name>/` folder in the declaring file's path.
    Folder,
    /// An `[Area("name")]` attribute on the class.
    Attribute,
}

/// A public action on a handler class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionMethod {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_kind: ReturnKind,
    pub already_overridable: bool,
    /// Declared `override` or `abstract`; never receives `virtual`.
    pub overrides_base: bool,
    pub visibility: Visibility,
    pub location: SourceLocation,
}

impl ActionMethod {
    /// Identity used to drop duplicates when partial parts are merged.
    pub fn signature(&self) -> (String, Vec<String>) {
        (
            self.name.clone(),
            self.parameters
                .iter()
                .map(|p| p.qualified_type.clone())
                .collect(),
        )
    }

    pub fn needs_virtual(&self) -> bool {
        !self.already_overridable && !self.overrides_base
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    /// Type as written in source.
    pub type_text: String,
    /// Type rendered `global::`-qualified, or as written when unresolved.
    pub qualified_type: String,
    pub modifier: Option<ParameterModifier>,
    /// Default value expression as written.
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterModifier {
    Ref,
    Out,
    In,
    Params,
}

impl ParameterModifier {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "ref" => Some(Self::Ref),
            "out" => Some(Self::Out),
            "in" => Some(Self::In),
            "params" => Some(Self::Params),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ref => "ref",
            Self::Out => "out",
            Self::In => "in",
            Self::Params => "params",
        }
    }

    /// Keyword repeated at the call site (`M(out x)`).
    pub fn call_site(&self) -> Option<&'static str> {
        match self {
            Self::Ref => Some("ref"),
            Self::Out => Some("out"),
            Self::In => Some("in"),
            Self::Params => None,
        }
    }
}

/// How the declared return type satisfies the action-result capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReturnKind {
    /// The return type itself is assignable to `capability`.
    Direct { capability: String },
    /// A generic `wrapper` (`Task<T>`) whose argument is assignable to `capability`.
    Async { wrapper: String, capability: String },
}

impl ReturnKind {
    pub fn capability(&self) -> &str {
        match self {
            Self::Direct { capability } | Self::Async { capability, .. } => capability,
        }
    }

    pub fn wrapper(&self) -> Option<&str> {
        match self {
            Self::Direct { .. } => None,
            Self::Async { wrapper, .. } => Some(wrapper),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    ProtectedInternal,
    Internal,
    Protected,
    PrivateProtected,
    Private,
}

impl Visibility {
    pub fn from_modifiers(modifiers: &[String]) -> Self {
        let has = |m: &str| modifiers.iter().any(|x| x == m);
        match (has("public"), has("protected"), has("internal"), has("private")) {
            (true, ..) => Self::Public,
            (_, true, true, _) => Self::ProtectedInternal,
            (_, true, _, true) => Self::PrivateProtected,
            (_, true, ..) => Self::Protected,
            (_, _, true, _) => Self::Internal,
            _ => Self::Private,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub path: PathBuf,
    pub line: usize,
    /// Byte offset of the declaration; identifies it for the rewriter.
    pub start_byte: usize,
}

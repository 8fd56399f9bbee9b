//! Type reference syntax.
//!
//! A [`TypeRef`] is the structured form of a type syntax node
//! (`Task<IActionResult>`, `global::App.Models.User[]`, `int?`). It carries
//! no meaning on its own: resolution against the semantic model decides what
//! symbol, if any, a name refers to.

use super::parser::{all_children, named_children, node_text};
use std::fmt;
use tree_sitter::Node;

pub const PREDEFINED_TYPES: &[&str] = &[
    "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "long", "ulong",
    "short", "ushort", "object", "string", "void", "nint", "nuint", "dynamic",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameSegment {
    pub name: String,
    pub args: Vec<TypeRef>,
}

impl NameSegment {
    /// Metadata form of the segment: `Task`1`.
    pub fn metadata_name(&self) -> String {
        if self.args.is_empty() {
            self.name.clone()
        } else {
            format!("{}`{}", self.name, self.args.len())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Predefined(String),
    Named {
        /// `global` or an extern/using alias written as `alias::Name`.
        qualifier: Option<String>,
        segments: Vec<NameSegment>,
    },
    Nullable(Box<TypeRef>),
    Array { element: Box<TypeRef>, rank: usize },
    Pointer(Box<TypeRef>),
    Tuple(Vec<(TypeRef, Option<String>)>),
}

impl TypeRef {
    /// Build a type reference from a syntax node of the `type` supertype.
    /// Types with no named form (`var`, function pointers, `ref` types)
    /// yield `None`.
    pub fn from_node(node: &Node, source: &str) -> Option<TypeRef> {
        match node.kind() {
            "predefined_type" => Some(TypeRef::Predefined(node_text(node, source).to_string())),
            "identifier" | "generic_name" | "qualified_name" | "alias_qualified_name" => {
                let mut qualifier = None;
                let mut segments = Vec::new();
                collect_name(node, source, &mut qualifier, &mut segments)?;
                let predefined = qualifier.is_none()
                    && matches!(segments.as_slice(), [only]
                        if only.args.is_empty() && PREDEFINED_TYPES.contains(&only.name.as_str()));
                if predefined {
                    Some(TypeRef::Predefined(segments.remove(0).name))
                } else {
                    Some(TypeRef::Named {
                        qualifier,
                        segments,
                    })
                }
            }
            "nullable_type" => Some(TypeRef::Nullable(Box::new(inner_type(node, source)?))),
            "pointer_type" => Some(TypeRef::Pointer(Box::new(inner_type(node, source)?))),
            "array_type" => {
                let rank = node
                    .child_by_field_name("rank")
                    .map(|spec| {
                        all_children(&spec)
                            .iter()
                            .filter(|c| c.kind() == ",")
                            .count()
                            + 1
                    })
                    .unwrap_or(1);
                Some(TypeRef::Array {
                    element: Box::new(inner_type(node, source)?),
                    rank,
                })
            }
            "tuple_type" => named_children(node)
                .iter()
                .filter(|c| c.kind() == "tuple_element")
                .map(|element| {
                    let ty = inner_type(element, source)?;
                    let name = element
                        .child_by_field_name("name")
                        .map(|n| node_text(&n, source).to_string());
                    Some((ty, name))
                })
                .collect::<Option<Vec<_>>>()
                .map(TypeRef::Tuple),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn parse(text: &str) -> Option<TypeRef> {
        let holder = format!("class __Holder {{ {} __value; }}", text);
        let unit = super::SourceUnit::parse("__holder.cs", holder).ok()?;
        if unit.has_errors() {
            return None;
        }
        let root = unit.tree.root_node();
        let field = find_kind(root, "variable_declaration")?;
        TypeRef::from_node(&field.child_by_field_name("type")?, &unit.text)
    }

    /// Dotted metadata name of a named type (`System.Threading.Tasks.Task`1`).
    pub fn metadata_name(&self) -> Option<String> {
        match self {
            TypeRef::Named { segments, .. } => Some(
                segments
                    .iter()
                    .map(NameSegment::metadata_name)
                    .collect::<Vec<_>>()
                    .join("."),
            ),
            _ => None,
        }
    }

    /// Type arguments of the last name segment.
    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Named { segments, .. } => segments
                .last()
                .map(|s| s.args.as_slice())
                .unwrap_or(&[]),
            _ => &[],
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Predefined(p) if p == "void")
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Predefined(name) => write!(f, "{}", name),
            TypeRef::Named {
                qualifier,
                segments,
            } => {
                if let Some(q) = qualifier {
                    write!(f, "{}::", q)?;
                }
                for (i, segment) in segments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", segment.name)?;
                    if !segment.args.is_empty() {
                        write!(f, "<{}>", join(&segment.args))?;
                    }
                }
                Ok(())
            }
            TypeRef::Nullable(inner) => write!(f, "{}?", inner),
            TypeRef::Array { element, rank } => {
                write!(f, "{}[{}]", element, ",".repeat(rank.saturating_sub(1)))
            }
            TypeRef::Pointer(inner) => write!(f, "{}*", inner),
            TypeRef::Tuple(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|(ty, name)| match name {
                        Some(n) => format!("{} {}", ty, n),
                        None => ty.to_string(),
                    })
                    .collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

fn join(types: &[TypeRef]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn inner_type(node: &Node, source: &str) -> Option<TypeRef> {
    TypeRef::from_node(&node.child_by_field_name("type")?, source)
}

fn collect_name(
    node: &Node,
    source: &str,
    qualifier: &mut Option<String>,
    segments: &mut Vec<NameSegment>,
) -> Option<()> {
    match node.kind() {
        "identifier" => segments.push(NameSegment {
            name: node_text(node, source).to_string(),
            args: Vec::new(),
        }),
        "generic_name" => {
            let children = named_children(node);
            let name = children.iter().find(|c| c.kind() == "identifier")?;
            let args = children
                .iter()
                .filter(|c| c.kind() == "type_argument_list")
                .flat_map(|list| named_children(list))
                .map(|arg| TypeRef::from_node(&arg, source))
                .collect::<Option<Vec<_>>>()?;
            segments.push(NameSegment {
                name: node_text(name, source).to_string(),
                args,
            });
        }
        "qualified_name" => {
            collect_name(&node.child_by_field_name("qualifier")?, source, qualifier, segments)?;
            collect_name(&node.child_by_field_name("name")?, source, qualifier, segments)?;
        }
        "alias_qualified_name" => {
            let alias = node.child_by_field_name("alias")?;
            *qualifier = Some(node_text(&alias, source).to_string());
            collect_name(&node.child_by_field_name("name")?, source, qualifier, segments)?;
        }
        _ => return None,
    }
    Some(())
}

#[cfg(test)]
fn find_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    if node.kind() == kind {
        return Some(node);
    }
    named_children(&node)
        .into_iter()
        .find_map(|child| find_kind(child, kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_and_generic_names() {
        let ty = TypeRef::parse("Task<IActionResult>").unwrap();
        assert_eq!(ty.metadata_name().as_deref(), Some("Task`1"));
        assert_eq!(ty.type_args(), &[TypeRef::parse("IActionResult").unwrap()]);
    }

    #[test]
    fn test_parse_qualified_with_global_alias() {
        let ty = TypeRef::parse("global::Microsoft.AspNetCore.Mvc.IActionResult").unwrap();
        match &ty {
            TypeRef::Named {
                qualifier,
                segments,
            } => {
                assert_eq!(qualifier.as_deref(), Some("global"));
                assert_eq!(segments.len(), 4);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            ty.to_string(),
            "global::Microsoft.AspNetCore.Mvc.IActionResult"
        );
    }

    #[test]
    fn test_parse_suffixes_and_predefined() {
        assert_eq!(
            TypeRef::parse("int?").unwrap(),
            TypeRef::Nullable(Box::new(TypeRef::Predefined("int".into())))
        );
        assert_eq!(TypeRef::parse("string[ , ]").unwrap().to_string(), "string[,]");
        assert!(TypeRef::parse("void").unwrap().is_void());
    }

    #[test]
    fn test_parse_tuple_and_whitespace() {
        let ty = TypeRef::parse("( int id ,\n Dictionary < string , List<int> > map )").unwrap();
        assert_eq!(
            ty.to_string(),
            "(int id, Dictionary<string, List<int>> map)"
        );
    }

    #[test]
    fn test_parse_rejects_broken_types() {
        assert!(TypeRef::parse("Task<").is_none());
        assert!(TypeRef::parse("A B").is_none());
    }
}

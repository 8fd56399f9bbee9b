//! Project-wide aggregation of per-unit classification.

use super::classifier::ClassMatch;
use super::model::HandlerClass;
use indexmap::IndexMap;
use std::path::PathBuf;

/// Classification of one unit, as produced by a worker.
#[derive(Debug, Clone, Default)]
pub struct UnitClassification {
    pub path: PathBuf,
    pub matches: Vec<ClassMatch>,
}

/// Merge per-unit matches into one record per handler symbol.
///
/// Units are ordered by path and matches keep their declaration order, so the
/// result does not depend on which worker finished first. Partial parts of the
/// same class contribute the union of their actions; an action seen twice
/// (same name and parameter types) is kept once.
pub fn merge_project(mut units: Vec<UnitClassification>) -> Vec<HandlerClass> {
    units.sort_by(|a, b| a.path.cmp(&b.path));

    let mut merged: IndexMap<String, HandlerClass> = IndexMap::new();
    for unit in units {
        for class_match in unit.matches {
            let part = class_match.handler;
            match merged.get_mut(&part.key) {
                Some(existing) => absorb(existing, part),
                None => {
                    merged.insert(part.key.clone(), part);
                }
            }
        }
    }

    let handlers: Vec<HandlerClass> = merged.into_values().collect();
    tracing::debug!(
        "Merged {} handler classes with {} actions",
        handlers.len(),
        handlers.iter().map(|h| h.actions.len()).sum::<usize>()
    );
    handlers
}

fn absorb(existing: &mut HandlerClass, part: HandlerClass) {
    for action in part.actions {
        let signature = action.signature();
        if existing.actions.iter().any(|a| a.signature() == signature) {
            tracing::debug!(
                "Duplicate action {}.{} dropped during merge",
                existing.name,
                action.name
            );
            continue;
        }
        existing.actions.push(action);
    }
    for file in part.files {
        if !existing.files.contains(&file) {
            existing.files.push(file);
        }
    }
    for using in part.usings {
        if !existing.usings.contains(&using) {
            existing.usings.push(using);
        }
    }
    existing.already_composable &= part.already_composable;
    if part.area_source > existing.area_source {
        existing.area = part.area;
        existing.area_source = part.area_source;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::model::{
        ActionMethod, AreaSource, Parameter, ReturnKind, SourceLocation, Visibility,
    };
    use pretty_assertions::assert_eq;

    fn action(name: &str, params: &[&str], path: &str) -> ActionMethod {
        ActionMethod {
            name: name.into(),
            parameters: params
                .iter()
                .map(|p| Parameter {
                    name: p.to_lowercase(),
                    type_text: p.to_string(),
                    qualified_type: p.to_string(),
                    modifier: None,
                    default_value: None,
                })
                .collect(),
            return_kind: ReturnKind::Direct {
                capability: "Microsoft.AspNetCore.Mvc.IActionResult".into(),
            },
            already_overridable: false,
            overrides_base: false,
            visibility: Visibility::Public,
            location: SourceLocation {
                path: path.into(),
                line: 1,
                start_byte: 0,
            },
        }
    }

    fn part(path: &str, composable: bool, actions: Vec<ActionMethod>) -> UnitClassification {
        UnitClassification {
            path: path.into(),
            matches: vec![ClassMatch {
                handler: HandlerClass {
                    key: "Shop.OrdersController".into(),
                    name: "OrdersController".into(),
                    route_name: "Orders".into(),
                    namespace: "Shop".into(),
                    area: None,
                    area_source: AreaSource::None,
                    base_chain: vec!["Microsoft.AspNetCore.Mvc.Controller".into()],
                    actions,
                    already_composable: composable,
                    files: vec![path.into()],
                    usings: vec!["Microsoft.AspNetCore.Mvc".into()],
                },
                location: SourceLocation {
                    path: path.into(),
                    line: 1,
                    start_byte: 0,
                },
                composable,
            }],
        }
    }

    #[test]
    fn test_partial_parts_merge_in_path_order() {
        let units = vec![
            part("b/Orders.Write.cs", true, vec![action("Create", &["int"], "b")]),
            part(
                "a/Orders.Read.cs",
                true,
                vec![action("Index", &[], "a"), action("Details", &["int"], "a")],
            ),
        ];

        let merged = merge_project(units);

        assert_eq!(merged.len(), 1);
        let names: Vec<_> = merged[0].actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Index", "Details", "Create"]);
        assert_eq!(
            merged[0].files,
            vec![PathBuf::from("a/Orders.Read.cs"), PathBuf::from("b/Orders.Write.cs")]
        );
    }

    #[test]
    fn test_duplicate_signatures_kept_once_but_overloads_survive() {
        let units = vec![
            part("a.cs", false, vec![action("Details", &["int"], "a")]),
            part(
                "b.cs",
                true,
                vec![
                    action("Details", &["int"], "b"),
                    action("Details", &["string"], "b"),
                ],
            ),
        ];

        let merged = merge_project(units);

        assert_eq!(merged[0].actions.len(), 2);
        assert!(!merged[0].already_composable);
    }

    fn with_area(
        mut unit: UnitClassification,
        area: &str,
        source: AreaSource,
    ) -> UnitClassification {
        let handler = &mut unit.matches[0].handler;
        handler.area = Some(area.into());
        handler.area_source = source;
        unit
    }

    #[test]
    fn test_area_attribute_beats_earlier_folder_area() {
        let units = vec![
            with_area(
                part("Areas/Admin/Orders.cs", true, vec![]),
                "Admin",
                AreaSource::Folder,
            ),
            with_area(
                part("Controllers/Orders.cs", true, vec![]),
                "Billing",
                AreaSource::Attribute,
            ),
        ];

        let merged = merge_project(units);

        assert_eq!(merged[0].area.as_deref(), Some("Billing"));
        assert_eq!(merged[0].area_source, AreaSource::Attribute);
        assert_eq!(merged[0].registry_key(), "BillingOrders");
    }

    #[test]
    fn test_first_area_of_equal_rank_is_kept() {
        let units = vec![
            with_area(part("a.cs", true, vec![]), "Billing", AreaSource::Attribute),
            part("b.cs", true, vec![]),
            with_area(part("c.cs", true, vec![]), "Sales", AreaSource::Attribute),
        ];

        let merged = merge_project(units);

        assert_eq!(merged[0].area.as_deref(), Some("Billing"));
    }
}

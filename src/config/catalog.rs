//! Referenced-assembly stand-in.
//!
//! Handler base classes and action-result types live in framework assemblies,
//! not in the scanned sources. The catalog describes just enough of them
//! (kind and direct bases, by metadata name) for the semantic model to walk
//! inheritance chains that leave the project.
//!
//! Metadata names use the backtick arity suffix for generics, as in
//! ``System.Threading.Tasks.Task`1``.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Record,
    Enum,
}

/// One externally declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalTypeConfig {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub bases: Vec<String>,
    /// Members the generated descriptor must carry to implement this type.
    #[serde(default)]
    pub descriptor_stub: Option<String>,
}

impl ExternalTypeConfig {
    fn new(name: &str, kind: TypeKind, bases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind,
            bases: bases.iter().map(|b| b.to_string()).collect(),
            descriptor_stub: None,
        }
    }
}

const MVC: &str = "Microsoft.AspNetCore.Mvc";

const ACTION_RESULTS: &[&str] = &[
    "ViewResult",
    "PartialViewResult",
    "ViewComponentResult",
    "JsonResult",
    "ContentResult",
    "EmptyResult",
    "RedirectResult",
    "LocalRedirectResult",
    "RedirectToActionResult",
    "RedirectToRouteResult",
    "RedirectToPageResult",
    "StatusCodeResult",
    "ObjectResult",
    "FileResult",
    "ChallengeResult",
    "ForbidResult",
    "SignInResult",
    "SignOutResult",
];

const STATUS_CODE_RESULTS: &[&str] = &[
    "OkResult",
    "NotFoundResult",
    "BadRequestResult",
    "UnauthorizedResult",
    "NoContentResult",
    "ConflictResult",
];

const OBJECT_RESULTS: &[&str] = &[
    "OkObjectResult",
    "NotFoundObjectResult",
    "BadRequestObjectResult",
    "ConflictObjectResult",
    "CreatedResult",
    "CreatedAtActionResult",
    "AcceptedResult",
];

const FILE_RESULTS: &[&str] = &[
    "FileContentResult",
    "FileStreamResult",
    "PhysicalFileResult",
    "VirtualFileResult",
];

/// ASP.NET Core MVC surface needed to classify controllers out of the box.
pub fn builtin_catalog() -> Vec<ExternalTypeConfig> {
    let mvc = |name: &str| format!("{}.{}", MVC, name);

    let mut catalog = vec![
        ExternalTypeConfig::new("System.Object", TypeKind::Class, &[]),
        ExternalTypeConfig::new("System.Threading.Tasks.Task", TypeKind::Class, &[]),
        ExternalTypeConfig::new(
            "System.Threading.Tasks.Task`1",
            TypeKind::Class,
            &["System.Threading.Tasks.Task"],
        ),
        ExternalTypeConfig::new("System.Threading.Tasks.ValueTask`1", TypeKind::Struct, &[]),
        ExternalTypeConfig::new(&mvc("ControllerBase"), TypeKind::Class, &[]),
        ExternalTypeConfig::new(&mvc("Controller"), TypeKind::Class, &[&mvc("ControllerBase")]),
        ExternalTypeConfig {
            descriptor_stub: Some(
                "public global::System.Threading.Tasks.Task ExecuteResultAsync(\
                 global::Microsoft.AspNetCore.Mvc.ActionContext context) => \
                 throw new global::System.NotSupportedException(\
                 \"Action descriptors only carry route values.\");"
                    .to_string(),
            ),
            ..ExternalTypeConfig::new(&mvc("IActionResult"), TypeKind::Interface, &[])
        },
        ExternalTypeConfig::new(&mvc("ActionResult"), TypeKind::Class, &[&mvc("IActionResult")]),
        ExternalTypeConfig::new(
            &mvc("Infrastructure.IConvertToActionResult"),
            TypeKind::Interface,
            &[],
        ),
        ExternalTypeConfig::new(
            &mvc("ActionResult`1"),
            TypeKind::Class,
            &[&mvc("Infrastructure.IConvertToActionResult")],
        ),
    ];

    let derived = |names: &[&str], base: &str| {
        names
            .iter()
            .map(|n| ExternalTypeConfig::new(&mvc(n), TypeKind::Class, &[&mvc(base)]))
            .collect::<Vec<_>>()
    };
    catalog.extend(derived(ACTION_RESULTS, "ActionResult"));
    catalog.extend(derived(STATUS_CODE_RESULTS, "StatusCodeResult"));
    catalog.extend(derived(OBJECT_RESULTS, "ObjectResult"));
    catalog.extend(derived(FILE_RESULTS, "FileResult"));
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        let catalog = builtin_catalog();
        let mut names: Vec<_> = catalog.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn test_view_result_derives_from_action_result() {
        let catalog = builtin_catalog();
        let view = catalog
            .iter()
            .find(|t| t.name == "Microsoft.AspNetCore.Mvc.ViewResult")
            .unwrap();
        assert_eq!(view.bases, vec!["Microsoft.AspNetCore.Mvc.ActionResult"]);
    }

    #[test]
    fn test_external_type_from_toml() {
        let parsed: ExternalTypeConfig = toml::from_str(
            r#"
            name = "System.Web.Mvc.ActionResult"
            kind = "class"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.kind, TypeKind::Class);
        assert!(parsed.bases.is_empty());
        assert!(parsed.descriptor_stub.is_none());
    }
}

mod common;

use actionmap::config::ActionmapConfig;
use common::{strip_inserted_modifiers, ProjectFixture, HOME_CONTROLLER};
use indoc::indoc;
use pretty_assertions::assert_eq;

const PARTS: &str = indoc! {r#"
    using Microsoft.AspNetCore.Mvc;

    namespace Shop.Controllers
    {
        [ResponseCache(Duration = 60)]
        public sealed class CatalogController : Controller
        {
            /* keep me */
            public IActionResult Index() => View();

            public override void Dispose(bool disposing) { }

            public abstract class Nested : Controller
            {
                public IActionResult Skip() => View();
            }
        }

        public static class Helpers
        {
            public static IActionResult Make() => null;
        }
    }
"#};

#[test]
fn test_handler_rewritten_with_modifiers_only() {
    let project =
        ProjectFixture::with_files(&[("Controllers/HomeController.cs", HOME_CONTROLLER)]);
    let report = project.run(&ActionmapConfig::default());

    let rewritten = project.read("Controllers/HomeController.cs");
    assert!(rewritten.contains("public partial class HomeController : Controller"));
    assert!(rewritten.contains("public virtual IActionResult Index() => View();"));
    assert!(rewritten
        .contains("public virtual IActionResult Details(int id, string slug = \"none\")"));
    assert!(rewritten.contains("public virtual async Task<IActionResult> Save(int id)"));
    assert!(rewritten.contains("public string Version() => \"1.0\";"));
    assert!(rewritten.contains("public static IActionResult Helper() => null;"));
    assert!(rewritten.contains("// Landing page"));

    assert_eq!(report.classes_marked_partial, 1);
    assert_eq!(report.methods_marked_virtual, 2);
    assert_eq!(
        strip_inserted_modifiers(&rewritten),
        strip_inserted_modifiers(HOME_CONTROLLER)
    );
}

#[test]
fn test_second_run_is_a_no_op() {
    let project =
        ProjectFixture::with_files(&[("Controllers/HomeController.cs", HOME_CONTROLLER)]);
    let config = ActionmapConfig::default();

    project.run(&config);
    let after_first = project.read("Controllers/HomeController.cs");
    let generated_first = project.generated();

    let second = project.run(&config);
    assert!(second.files_rewritten.is_empty());
    assert_eq!(second.methods_marked_virtual, 0);
    assert_eq!(project.read("Controllers/HomeController.cs"), after_first);
    assert_eq!(project.generated(), generated_first);
}

#[test]
fn test_sealed_and_nested_declarations() {
    let project = ProjectFixture::with_files(&[("Controllers/CatalogController.cs", PARTS)]);
    project.run(&ActionmapConfig::default());

    let rewritten = project.read("Controllers/CatalogController.cs");
    assert!(rewritten.contains("public sealed partial class CatalogController"));
    assert!(rewritten.contains("public virtual IActionResult Index()"));
    assert!(rewritten.contains("/* keep me */"));
    assert!(rewritten.contains("public override void Dispose(bool disposing)"));
    // Nested classes are never handlers.
    assert!(rewritten.contains("public abstract class Nested : Controller"));
    assert!(rewritten.contains("public IActionResult Skip() => View();"));
    assert!(rewritten.contains("public static class Helpers"));
}

#[test]
fn test_untouched_files_keep_their_bytes() {
    let plain = "namespace Shop\n{\n    public class Money { }\n}\n";
    let project = ProjectFixture::with_files(&[
        ("Controllers/HomeController.cs", HOME_CONTROLLER),
        ("Models/Money.cs", plain),
    ]);
    let report = project.run(&ActionmapConfig::default());

    let home = project
        .path("Controllers/HomeController.cs")
        .canonicalize()
        .unwrap();
    assert_eq!(report.files_rewritten, vec![home]);
    assert_eq!(project.read("Models/Money.cs"), plain);
}

#[cfg(unix)]
#[test]
fn test_rewritten_files_keep_their_mode() {
    use std::os::unix::fs::PermissionsExt;

    let project =
        ProjectFixture::with_files(&[("Controllers/HomeController.cs", HOME_CONTROLLER)]);
    let path = project.path("Controllers/HomeController.cs");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let report = project.run(&ActionmapConfig::default());

    assert_eq!(report.files_rewritten.len(), 1);
    let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}

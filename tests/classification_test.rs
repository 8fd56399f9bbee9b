mod common;

use actionmap::config::ActionmapConfig;
use actionmap::pipeline::run_project;
use common::{ProjectFixture, HOME_CONTROLLER};
use indoc::indoc;
use pretty_assertions::assert_eq;

const APP_CONTROLLER: &str = indoc! {r#"
    using Microsoft.AspNetCore.Mvc;

    namespace Shop.Infrastructure
    {
        public abstract class AppController : Controller
        {
        }
    }
"#};

const ORDERS_CONTROLLER: &str = indoc! {r#"
    using Microsoft.AspNetCore.Mvc;
    using Shop.Infrastructure;

    namespace Shop.Controllers
    {
        public class OrdersController : AppController
        {
            public ViewResult List(int page = 1) => View();

            public ActionResult<Order> Get(int id) => null;

            public JsonResult Data() => Json(null);

            IActionResult Implicit() => View();
        }

        public class Order { }
    }
"#};

const LOOKALIKE: &str = indoc! {r#"
    using Microsoft.AspNetCore.Mvc;

    namespace Shop.Models
    {
        // Named like a handler but never derives from Controller.
        public class FakeController
        {
            public IActionResult Index() => null;
        }
    }
"#};

fn fixture() -> ProjectFixture {
    ProjectFixture::with_files(&[
        ("Controllers/HomeController.cs", HOME_CONTROLLER),
        ("Controllers/OrdersController.cs", ORDERS_CONTROLLER),
        ("Infrastructure/AppController.cs", APP_CONTROLLER),
        ("Models/FakeController.cs", LOOKALIKE),
    ])
}

#[test]
fn test_handlers_found_through_inheritance_only() {
    let project = fixture();
    let report = run_project(project.root(), &ActionmapConfig::default(), true).unwrap();

    let classes: Vec<_> = report.handlers.iter().map(|h| h.class.as_str()).collect();
    assert_eq!(
        classes,
        vec![
            "Shop.Controllers.HomeController",
            "Shop.Controllers.OrdersController",
            "Shop.Infrastructure.AppController",
        ]
    );
}

#[test]
fn test_actions_are_public_instance_methods_returning_results() {
    let project = fixture();
    let report = run_project(project.root(), &ActionmapConfig::default(), true).unwrap();

    assert_eq!(report.handlers[0].actions, vec!["Index", "Details", "Save"]);
    assert_eq!(report.handlers[1].actions, vec!["List", "Data"]);
    assert!(report.handlers[2].actions.is_empty());
}

#[test]
fn test_configured_exclusions_are_honored() {
    let project = fixture();
    let config = ActionmapConfig {
        excluded_handlers: vec!["Shop.Infrastructure.AppController".into()],
        excluded_actions: vec!["Home.Save".into(), "OrdersController.Data".into()],
        ..Default::default()
    };
    let report = run_project(project.root(), &config, true).unwrap();

    let summary: Vec<_> = report
        .handlers
        .iter()
        .map(|h| (h.registry_key.as_str(), h.actions.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Home", vec!["Index".to_string(), "Details".to_string()]),
            ("Orders", vec!["List".to_string()]),
        ]
    );
}

#[test]
fn test_area_taken_from_folder_and_attribute() {
    let project = ProjectFixture::with_files(&[
        (
            "Areas/Admin/Controllers/UsersController.cs",
            indoc! {r#"
                using Microsoft.AspNetCore.Mvc;

                namespace Shop.Admin
                {
                    public class UsersController : Controller
                    {
                        public IActionResult Index() => View();
                    }
                }
            "#},
        ),
        (
            "Controllers/ReportsController.cs",
            indoc! {r#"
                using Microsoft.AspNetCore.Mvc;

                namespace Shop.Reporting
                {
                    [Area("Reports")]
                    public class ReportsController : Controller
                    {
                        public IActionResult Index() => View();
                    }
                }
            "#},
        ),
    ]);
    let report = run_project(project.root(), &ActionmapConfig::default(), true).unwrap();

    let areas: Vec<_> = report
        .handlers
        .iter()
        .map(|h| (h.registry_key.as_str(), h.area.as_deref()))
        .collect();
    assert_eq!(
        areas,
        vec![("AdminUsers", Some("Admin")), ("ReportsReports", Some("Reports"))]
    );
}

#[test]
fn test_custom_base_handler_type() {
    let project = ProjectFixture::with_files(&[(
        "Api/PingController.cs",
        indoc! {r#"
            using Microsoft.AspNetCore.Mvc;

            namespace Shop.Api
            {
                public class PingController : ControllerBase
                {
                    public IActionResult Get() => Ok();
                }
            }
        "#},
    )]);

    let default_report = run_project(project.root(), &ActionmapConfig::default(), true).unwrap();
    assert!(default_report.handlers.is_empty());

    let config = ActionmapConfig {
        base_handler_type: "Microsoft.AspNetCore.Mvc.ControllerBase".into(),
        ..Default::default()
    };
    let report = run_project(project.root(), &config, true).unwrap();
    assert_eq!(report.handlers.len(), 1);
    assert_eq!(report.handlers[0].actions, vec!["Get"]);
}

#[test]
fn test_area_attribute_on_any_part_wins_over_folder() {
    let project = ProjectFixture::with_files(&[
        (
            "Areas/Admin/Controllers/OrdersController.cs",
            indoc! {r#"
                using Microsoft.AspNetCore.Mvc;

                namespace Shop.Orders
                {
                    public partial class OrdersController : Controller
                    {
                        public IActionResult Index() => View();
                    }
                }
            "#},
        ),
        (
            "Controllers/OrdersController.Billing.cs",
            indoc! {r#"
                using Microsoft.AspNetCore.Mvc;

                namespace Shop.Orders
                {
                    [Area("Billing")]
                    public partial class OrdersController
                    {
                        public IActionResult Invoice() => View();
                    }
                }
            "#},
        ),
    ]);
    let report = run_project(project.root(), &ActionmapConfig::default(), true).unwrap();

    assert_eq!(report.handlers.len(), 1);
    assert_eq!(report.handlers[0].registry_key, "BillingOrders");
    assert_eq!(report.handlers[0].area.as_deref(), Some("Billing"));
    assert_eq!(report.handlers[0].actions, vec!["Index", "Invoice"]);
}

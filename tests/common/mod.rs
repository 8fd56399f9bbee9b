// Test utility module for actionmap integration tests
#![allow(dead_code)]

use actionmap::config::ActionmapConfig;
use actionmap::pipeline::{run_project, PipelineReport};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const HOME_CONTROLLER: &str = r#"using Microsoft.AspNetCore.Mvc;
using System.Threading.Tasks;

namespace Shop.Controllers
{
    public class HomeController : Controller
    {
        // Landing page
        public IActionResult Index() => View();

        public virtual IActionResult Details(int id, string slug = "none") => View();

        public async Task<IActionResult> Save(int id)
        {
            await Task.Yield();
            return RedirectToAction(nameof(Index));
        }

        public string Version() => "1.0";

        private IActionResult Hidden() => View();

        public static IActionResult Helper() => null;
    }
}
"#;

/// A C# project in a temporary directory.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let fixture = Self::new();
        for (path, content) in files {
            fixture.write(path, content);
        }
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(path, content).expect("write fixture file");
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("read fixture file")
    }

    pub fn run(&self, config: &ActionmapConfig) -> PipelineReport {
        run_project(self.root(), config, false).expect("pipeline run")
    }

    pub fn generated(&self) -> String {
        self.read("Actions.generated.cs")
    }
}

/// `text` with every `partial ` and `virtual ` removed.
pub fn strip_inserted_modifiers(text: &str) -> String {
    text.replace("partial ", "").replace("virtual ", "")
}

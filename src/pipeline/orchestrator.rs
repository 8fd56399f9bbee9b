//! Runs one project through every stage.
//!
//! Load, classify and rewrite work per unit on the rayon pool; merge,
//! synthesis and emission run once on the calling thread. A stage error
//! moves the run to [`PipelineStage::Failed`] and stops it; per-file
//! problems are collected in the report instead.

use super::stage::PipelineStage;
use crate::analysis::{merge_project, Classifier, HandlerClass, UnitClassification};
use crate::codegen::{render, CompanionDocument, Synthesizer};
use crate::config::ActionmapConfig;
use crate::errors::{Error, FailureSummary, Result, UnitFailure};
use crate::io::{ensure_dir, read_file, write_atomic};
use crate::locators::{default_services, StaticFileService, ViewLocatorService};
use crate::observability::{increment_processed, set_current_file, set_progress, set_stage};
use crate::rewrite::{rewrite, RewriteTargets};
use crate::source::{FileSystemLoader, Project, ProjectLoader, SemanticModel, SourceUnit};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What happened to the companion document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanionStatus {
    Written,
    Unchanged,
    /// Dry run; nothing written.
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerSummary {
    pub class: String,
    pub registry_key: String,
    pub area: Option<String>,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub project_root: PathBuf,
    pub stage: PipelineStage,
    pub dry_run: bool,
    pub units_loaded: usize,
    pub handlers: Vec<HandlerSummary>,
    pub classes_marked_partial: usize,
    pub methods_marked_virtual: usize,
    /// Units whose text changed (written, or would be on a dry run).
    pub files_rewritten: Vec<PathBuf>,
    pub companion_path: PathBuf,
    pub companion: CompanionStatus,
    pub failures: Vec<UnitFailure>,
}

impl PipelineReport {
    /// No failure that flips the exit status.
    pub fn is_success(&self) -> bool {
        !self.failures.iter().any(|f| f.kind.fails_run())
    }

    pub fn failure_summary(&self) -> FailureSummary {
        FailureSummary::from_failures(&self.failures)
    }

    pub fn action_count(&self) -> usize {
        self.handlers.iter().map(|h| h.actions.len()).sum()
    }
}

/// Per-unit rewrite result.
#[derive(Debug)]
struct RewriteOutcome {
    path: PathBuf,
    partial: usize,
    virtual_: usize,
    changed: bool,
}

pub struct Orchestrator<'a> {
    config: &'a ActionmapConfig,
    loader: Box<dyn ProjectLoader>,
    views: ViewLocatorService,
    static_files: StaticFileService,
    dry_run: bool,
    stage: PipelineStage,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a ActionmapConfig) -> Self {
        let (views, static_files) = default_services(config);
        Self {
            config,
            loader: Box::new(FileSystemLoader::new(config.exclude_patterns())),
            views,
            static_files,
            dry_run: false,
            stage: PipelineStage::Idle,
        }
    }

    pub fn with_loader(mut self, loader: Box<dyn ProjectLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_locators(mut self, views: ViewLocatorService, files: StaticFileService) -> Self {
        self.views = views;
        self.static_files = files;
        self
    }

    /// Classify and synthesize without writing anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn run(&mut self, project: &Path) -> Result<PipelineReport> {
        match self.run_stages(project) {
            Ok(mut report) => {
                self.enter(PipelineStage::Done);
                report.stage = PipelineStage::Done;
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Pipeline failed during {}: {}", self.stage, e);
                self.enter(PipelineStage::Failed);
                Err(e)
            }
        }
    }

    fn enter(&mut self, stage: PipelineStage) {
        tracing::info!("Stage: {}", stage);
        self.stage = stage;
        set_stage(stage);
    }

    fn run_stages(&mut self, project: &Path) -> Result<PipelineReport> {
        self.enter(PipelineStage::Loading);
        let (project, mut failures) = self.load(project)?;
        let root = project.root().to_path_buf();
        let companion_path = root.join(&self.config.output_file);
        let model = SemanticModel::build(&project.units, &self.config.type_catalog());

        self.enter(PipelineStage::Classifying);
        let classifications = self.classify(&project, &model);

        self.enter(PipelineStage::Rewriting);
        let (outcomes, rewrite_failures) = self.rewrite_units(&project.units, &classifications);
        failures.extend(rewrite_failures);

        self.enter(PipelineStage::Synthesizing);
        let handlers = merge_project(classifications);
        let views = self.views.find_views(&root)?;
        let static_files = self.static_files.find_files(&root)?;
        let doc =
            Synthesizer::new(self.config, &model).synthesize(&handlers, &views, &static_files);
        let text = render(&doc)?;

        self.enter(PipelineStage::Emitting);
        let companion = match self.emit(&companion_path, &text) {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("Failed to write {}: {}", companion_path.display(), e);
                failures.push(UnitFailure::write(companion_path.clone(), &e));
                CompanionStatus::Failed
            }
        };

        failures.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(PipelineReport {
            project_root: root,
            stage: self.stage,
            dry_run: self.dry_run,
            units_loaded: project.units.len(),
            handlers: summarize(&handlers, &doc),
            classes_marked_partial: outcomes.iter().map(|o| o.partial).sum(),
            methods_marked_virtual: outcomes.iter().map(|o| o.virtual_).sum(),
            files_rewritten: outcomes
                .into_iter()
                .filter(|o| o.changed)
                .map(|o| o.path)
                .collect(),
            companion_path,
            companion,
            failures,
        })
    }

    /// Parse the project, setting aside units with blocking syntax errors
    /// and the companion document from a previous run.
    fn load(&self, project: &Path) -> Result<(Project, Vec<UnitFailure>)> {
        let mut project = self.loader.load(project)?;
        let mut failures = std::mem::take(&mut project.failures);
        let companion = project.root().join(&self.config.output_file);

        let units = std::mem::take(&mut project.units);
        for unit in units {
            if unit.path == companion {
                continue;
            }
            if unit.has_errors() {
                let (line, column) = unit.first_error().unwrap_or((0, 0));
                tracing::warn!(
                    "Skipping {}: syntax error at {}:{}",
                    unit.path.display(),
                    line,
                    column
                );
                failures.push(UnitFailure::syntax(unit.path.clone(), line, column));
                continue;
            }
            project.units.push(unit);
        }

        tracing::info!(
            "Loaded {} units from {}",
            project.units.len(),
            project.root().display()
        );
        Ok((project, failures))
    }

    fn classify(&self, project: &Project, model: &SemanticModel) -> Vec<UnitClassification> {
        let classifier = Classifier::new(model, self.config);
        set_progress(0, project.units.len());

        project
            .units
            .par_iter()
            .map(|unit| {
                let _file = set_current_file(&unit.path);
                set_stage(PipelineStage::Classifying);
                let matches = classifier.classify_unit(unit, project.root());
                increment_processed();
                UnitClassification {
                    path: unit.path.clone(),
                    matches,
                }
            })
            .collect()
    }

    fn rewrite_units(
        &self,
        units: &[SourceUnit],
        classifications: &[UnitClassification],
    ) -> (Vec<RewriteOutcome>, Vec<UnitFailure>) {
        let work: Vec<(&SourceUnit, RewriteTargets)> = units
            .iter()
            .zip(classifications)
            .map(|(unit, classified)| (unit, RewriteTargets::from_matches(&classified.matches)))
            .filter(|(_, targets)| !targets.is_empty())
            .collect();
        set_progress(0, work.len());

        let results: Vec<std::result::Result<RewriteOutcome, UnitFailure>> = work
            .par_iter()
            .map(|(unit, targets)| {
                let _file = set_current_file(&unit.path);
                set_stage(PipelineStage::Rewriting);
                let outcome = self.rewrite_unit(unit, targets);
                increment_processed();
                outcome
            })
            .collect();

        let mut outcomes = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(failure) => failures.push(failure),
            }
        }
        (outcomes, failures)
    }

    fn rewrite_unit(
        &self,
        unit: &SourceUnit,
        targets: &RewriteTargets,
    ) -> std::result::Result<RewriteOutcome, UnitFailure> {
        let rewritten = match rewrite(unit, targets) {
            Ok(rewritten) => rewritten,
            Err(Error::RewriteRejected { path, message }) => {
                tracing::error!("{}: {}", path.display(), message);
                return Err(UnitFailure::rejected(path, message));
            }
            Err(e) => {
                tracing::error!("{}: {}", unit.path.display(), e);
                return Err(UnitFailure::rejected(unit.path.clone(), e.to_string()));
            }
        };

        let count = |keyword: &str| {
            rewritten
                .insertions
                .iter()
                .filter(|i| i.keyword_text() == keyword)
                .count()
        };
        let outcome = RewriteOutcome {
            path: unit.path.clone(),
            partial: count("partial"),
            virtual_: count("virtual"),
            changed: rewritten.changed,
        };

        if rewritten.changed && !self.dry_run {
            if let Err(e) = write_atomic(&unit.path, &rewritten.unit.text) {
                tracing::error!("Failed to write {}: {}", unit.path.display(), e);
                return Err(UnitFailure::write(unit.path.clone(), &e));
            }
            tracing::info!("Rewrote {}", unit.path.display());
        }
        Ok(outcome)
    }

    fn emit(&self, path: &Path, text: &str) -> Result<CompanionStatus> {
        if read_file(path).is_ok_and(|existing| existing == text) {
            tracing::info!("{} is up to date", path.display());
            return Ok(CompanionStatus::Unchanged);
        }
        if self.dry_run {
            return Ok(CompanionStatus::Skipped);
        }
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        write_atomic(path, text)?;
        tracing::info!("Wrote {}", path.display());
        Ok(CompanionStatus::Written)
    }
}

fn summarize(handlers: &[HandlerClass], doc: &CompanionDocument) -> Vec<HandlerSummary> {
    handlers
        .iter()
        .zip(doc.registry.entries())
        .map(|(handler, entry)| HandlerSummary {
            class: handler.qualified_name(),
            registry_key: entry.key.clone(),
            area: handler.area.clone(),
            actions: handler.actions.iter().map(|a| a.name.clone()).collect(),
        })
        .collect()
}

/// Run the pipeline once over `project` with the default collaborators.
pub fn run_project(
    project: &Path,
    config: &ActionmapConfig,
    dry_run: bool,
) -> Result<PipelineReport> {
    Orchestrator::new(config).dry_run(dry_run).run(project)
}

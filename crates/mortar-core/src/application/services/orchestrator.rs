//! Orchestrator - runs every component for every entity.
//!
//! Workflow per run:
//! 1. Validate the entity model
//! 2. Per entity, in model order: components in layer order, then artifacts
//! 3. Collect file-scoped failures; any other error aborts the run
//!
//! File state lives in one [`FileArena`] for the whole run, so shared files
//! (permissions, repository port) accumulate across entities, dry-run
//! included.

use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::application::arena::FileArena;
use crate::application::components::{self, GeneratorComponent};
use crate::application::error::FileFailure;
use crate::application::loader::{FallbackPolicy, SourceLoader};
use crate::application::pipeline;
use crate::application::ports::{ArtifactRenderer, Filesystem};
use crate::application::services::report::{ArtifactReport, FileReport, RunReport};
use crate::application::ApplicationError;
use crate::domain::{EntityConfig, EntityModel, ModelValidator};
use crate::error::MortarResult;

/// What the core needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Output root every target path is resolved against.
    pub root: PathBuf,
    pub fallback: FallbackPolicy,
    pub dry_run: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            fallback: FallbackPolicy::default(),
            dry_run: false,
        }
    }
}

pub struct Orchestrator {
    filesystem: Box<dyn Filesystem>,
    renderers: Vec<Box<dyn ArtifactRenderer>>,
    components: Vec<Box<dyn GeneratorComponent>>,
    options: GenerateOptions,
}

impl Orchestrator {
    /// Create an orchestrator with the built-in component catalogue.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use mortar_core::application::{GenerateOptions, Orchestrator};
    ///
    /// let orchestrator = Orchestrator::new(
    ///     filesystem, // impl Filesystem
    ///     renderers,  // Vec<Box<dyn ArtifactRenderer>>
    ///     GenerateOptions::default(),
    /// );
    /// let report = orchestrator.run(&model)?;
    /// ```
    pub fn new(
        filesystem: Box<dyn Filesystem>,
        renderers: Vec<Box<dyn ArtifactRenderer>>,
        options: GenerateOptions,
    ) -> Self {
        Self {
            filesystem,
            renderers,
            components: components::catalogue(),
            options,
        }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate (or bring up to date) every file the model describes.
    ///
    /// # Errors
    ///
    /// - `DomainError` when the model is invalid; nothing is touched.
    /// - `ApplicationError::UnresolvedConflicts` when some files were left
    ///   alone; every other file is still generated.
    /// - Filesystem and rendering errors abort the run.
    #[instrument(
        skip_all,
        fields(
            entities = model.entities.len(),
            root = %self.options.root.display(),
            dry_run = self.options.dry_run
        )
    )]
    pub fn run(&self, model: &EntityModel) -> MortarResult<RunReport> {
        ModelValidator::validate(model)?;

        let loader = SourceLoader::new(self.options.fallback);
        let mut arena = FileArena::new(
            self.filesystem.as_ref(),
            &self.options.root,
            self.options.dry_run,
        );
        let mut report = RunReport::new(&self.options.root, self.options.dry_run);
        let mut failures = Vec::new();

        for entity in &model.entities {
            info!(entity = %entity.name, "Generating entity");
            self.generate_sources(model, entity, &loader, &mut arena, &mut report, &mut failures)?;
            self.render_artifacts(model, entity, &mut arena, &mut report)?;
        }
        report.entities = model.entities.len();

        if !failures.is_empty() {
            warn!(failed = failures.len(), "Some files could not be generated");
            return Err(ApplicationError::UnresolvedConflicts { failures }.into());
        }

        info!(
            written = report.written(),
            unchanged = report.unchanged(),
            "Generation complete"
        );
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn generate_sources(
        &self,
        model: &EntityModel,
        entity: &EntityConfig,
        loader: &SourceLoader,
        arena: &mut FileArena<'_>,
        report: &mut RunReport,
        failures: &mut Vec<FileFailure>,
    ) -> MortarResult<()> {
        for component in components::for_entity(&self.components, entity) {
            let target = component.target(&model.application, entity);
            let desired = component.desired(&model.application, entity);
            match pipeline::apply(arena, loader, &target, desired) {
                Ok(change) => report.files.push(FileReport {
                    entity: entity.name.clone(),
                    component: component.name(),
                    layer: component.layer(),
                    change,
                }),
                Err(err) if err.is_file_scoped() => {
                    warn!(
                        entity = %entity.name,
                        component = component.name(),
                        path = %target.path,
                        error = %err,
                        "File left untouched"
                    );
                    failures.push(FileFailure {
                        entity: entity.name.clone(),
                        component: component.name().to_string(),
                        path: target.path.as_path().to_path_buf(),
                        message: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn render_artifacts(
        &self,
        model: &EntityModel,
        entity: &EntityConfig,
        arena: &mut FileArena<'_>,
        report: &mut RunReport,
    ) -> MortarResult<()> {
        for renderer in self.renderers.iter().filter(|r| r.applies_to(entity)) {
            let path = renderer.path(entity);
            let content = renderer.render(&model.application, entity)?;
            let written = arena.write_if_changed(&path, content)?;
            if written {
                info!(artifact = renderer.name(), path = %path, "Wrote artifact");
            }
            report.artifacts.push(ArtifactReport {
                entity: entity.name.clone(),
                artifact: renderer.name(),
                path: path.as_path().to_path_buf(),
                written,
            });
        }
        Ok(())
    }
}

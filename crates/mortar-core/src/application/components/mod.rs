//! Generator components: one per layer, backend and transport.
//!
//! A component only describes *what* a file should contain. Loading,
//! merging and writing is the pipeline's job, so every component is
//! incremental for free.

mod golang;
mod handler;
mod permissions;
mod record;
mod repository;
mod service;
mod usecase;

use std::fmt;

use serde::Serialize;

use crate::domain::{Application, Declaration, EntityConfig, RelativePath};

pub use handler::{GrpcHandler, HttpHandler};
pub use permissions::PermissionsComponent;
pub use record::RecordComponent;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryPort};
pub use service::ServiceComponent;
pub use usecase::UseCaseComponent;

/// Architectural layer, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Record,
    Repository,
    Service,
    UseCase,
    Handler,
}

impl Layer {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Repository => "repository",
            Self::Service => "service",
            Self::UseCase => "use-case",
            Self::Handler => "handler",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File a component writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFile {
    pub path: RelativePath,
    pub package: String,
}

impl TargetFile {
    pub fn new(path: impl Into<RelativePath>, package: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            package: package.into(),
        }
    }
}

/// Contract every generator component fulfils.
pub trait GeneratorComponent: Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &'static str;

    fn layer(&self) -> Layer;

    /// Whether the entity gets this component's file at all.
    fn applies_to(&self, entity: &EntityConfig) -> bool {
        let _ = entity;
        true
    }

    fn target(&self, app: &Application, entity: &EntityConfig) -> TargetFile;

    /// Declarations the file must contain, in file order.
    fn desired(&self, app: &Application, entity: &EntityConfig) -> Vec<Declaration>;
}

/// Every built-in component, sorted by layer.
pub fn catalogue() -> Vec<Box<dyn GeneratorComponent>> {
    let mut components: Vec<Box<dyn GeneratorComponent>> = vec![
        Box::new(RecordComponent),
        Box::new(PermissionsComponent),
        Box::new(RepositoryPort),
        Box::new(PostgresRepository),
        Box::new(MemoryRepository),
        Box::new(ServiceComponent),
        Box::new(UseCaseComponent),
        Box::new(HttpHandler),
        Box::new(GrpcHandler),
    ];
    components.sort_by_key(|c| c.layer());
    components
}

/// The catalogue entries that apply to `entity`, in layer order.
pub fn for_entity<'a>(
    components: &'a [Box<dyn GeneratorComponent>],
    entity: &'a EntityConfig,
) -> impl Iterator<Item = &'a dyn GeneratorComponent> {
    components
        .iter()
        .map(AsRef::as_ref)
        .filter(move |c| c.applies_to(entity))
}

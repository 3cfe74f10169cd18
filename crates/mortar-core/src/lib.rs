//! Mortar Core - Hexagonal Architecture Implementation
//!
//! Domain and application layers of Mortar, the incremental scaffolding
//! engine for layered Go services.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           mortar-cli (CLI)              │
//! │   config, logging, model file loading   │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  Orchestrator → components → pipeline   │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │     (Filesystem, ArtifactRenderer)      │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    mortar-adapters (Infrastructure)     │
//! │ (LocalFilesystem, MemoryFilesystem, …)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  entity model, source tree, parser,     │
//! │  locator, merge engine                  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mortar_core::prelude::*;
//!
//! let model: EntityModel = toml::from_str(&text)?;
//! let orchestrator = Orchestrator::new(filesystem, renderers, GenerateOptions::default());
//! let report = orchestrator.run(&model)?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ArtifactRenderer, FallbackPolicy, Filesystem, GenerateOptions, Orchestrator, RunReport,
    };
    pub use crate::domain::{
        Application, Backend, Capabilities, Declaration, EntityConfig, EntityModel, Field,
        FieldType, Format, MergeAction, SourceFile, Transport, ensure, parse,
    };
    pub use crate::error::{MortarError, MortarResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

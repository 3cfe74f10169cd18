//! Implementation of the `mortar generate` command.
//!
//! Responsibility: read the entity model, resolve generation options from
//! flags and config, run the core orchestrator and display the report.

use std::io;
use std::path::Path;

use tracing::{debug, info, instrument};

use mortar_adapters::{LocalFilesystem, renderer};
use mortar_core::application::{GenerateOptions, Orchestrator};
use mortar_core::domain::EntityModel;

use crate::{
    cli::GenerateArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `mortar generate` command.
///
/// Dispatch sequence:
/// 1. Read and deserialize the entity model
/// 2. Resolve options (flags over config)
/// 3. Run the orchestrator against the local filesystem
/// 4. Print the report
#[instrument(skip_all, fields(model = %args.model.display()))]
pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let model = read_model(&args.model)?;
    let options = resolve_options(&args, &config);

    debug!(
        entities = model.entities.len(),
        root = %options.root.display(),
        fallback = %options.fallback,
        dry_run = options.dry_run,
        "Options resolved"
    );

    let orchestrator = Orchestrator::new(
        Box::new(LocalFilesystem::new()),
        renderer::builtin(),
        options,
    );
    let report = orchestrator.run(&model)?;
    info!(written = report.written(), "Generate finished");

    output.report(&report)?;
    Ok(())
}

/// Flags win over config; `--dry-run` can only switch dry-run on.
pub fn resolve_options(args: &GenerateArgs, config: &AppConfig) -> GenerateOptions {
    GenerateOptions {
        root: args
            .root
            .clone()
            .unwrap_or_else(|| config.generation.root.clone()),
        fallback: args
            .on_parse_failure
            .map(Into::into)
            .unwrap_or(config.generation.on_parse_failure),
        dry_run: args.dry_run || config.generation.dry_run,
    }
}

/// Read a model document; `.json` files are JSON, everything else TOML.
pub fn read_model(path: &Path) -> CliResult<EntityModel> {
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CliError::ModelNotFound {
            path: path.to_path_buf(),
        },
        _ => CliError::IoError {
            message: format!("Failed to read model '{}'", path.display()),
            source: e,
        },
    })?;

    let invalid = |message: String| CliError::InvalidModel {
        path: path.to_path_buf(),
        message,
    };
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))
    } else {
        toml::from_str(&text).map_err(|e| invalid(e.to_string()))
    }
}

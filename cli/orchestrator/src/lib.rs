#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Operations behind the `idlbridge` command line tool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::{Bridge, BridgeError, BridgeMethod, CallContext, MethodFailure};
use marshal::TypedView;
use schema::{check_method_decl, MethodDecl, SchemaError};
use serde_json::{Map, Value};
use thiserror::Error;
use types::Platform;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A metadata file could not be read or converted
    #[error("{path}: {source}")]
    Metadata {
        /// File being loaded
        path: PathBuf,
        /// Underlying failure
        source: SchemaError,
    },
    /// The payload argument is not valid JSON
    #[error("Invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
    /// The metadata describes a different method than requested
    #[error("{path} declares `{found}`, not `{requested}`")]
    MethodMismatch {
        /// File being loaded
        path: PathBuf,
        /// Method named on the command line
        requested: String,
        /// Method declared in the file
        found: String,
    },
    /// The bridge rejected the declaration or the payload
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Logging could not be initialized
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
}

/// Result type alias for command operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Problems found in one metadata file.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    /// File that was checked
    pub path: PathBuf,
    /// Declared method name, when the file could be read
    pub method: Option<String>,
    /// Every problem found; empty when the file is valid
    pub problems: Vec<String>,
}

impl CheckReport {
    /// Whether the file passed.
    pub fn is_ok(&self) -> bool { self.problems.is_empty() }
}

/// Load the declaration in the metadata file at `path`.
pub fn load_decl(path: &Path) -> Result<MethodDecl> {
    schema::load_method_metadata(path).map_err(|source| CliError::Metadata { path: path.to_path_buf(), source })
}

/// Check each metadata file and report every problem found.
pub fn check_files(paths: &[PathBuf]) -> Vec<CheckReport> {
    paths
        .iter()
        .map(|path| match load_decl(path) {
            Ok(decl) => CheckReport { path: path.clone(), method: Some(decl.name.clone()), problems: check_method_decl(&decl) },
            Err(e) => CheckReport { path: path.clone(), method: None, problems: vec![e.to_string()] },
        })
        .collect()
}

/// Stand-in implementation for a method known only by its declaration.
struct Declared(MethodDecl);

impl BridgeMethod for Declared {
    fn declaration(&self) -> MethodDecl { self.0.clone() }

    fn invoke(&self, _params: TypedView, ctx: &CallContext) -> std::result::Result<Map<String, Value>, MethodFailure> {
        Err(MethodFailure::not_implemented(format!("{} has no native implementation", ctx.method)))
    }
}

/// Arguments of a dry-run call.
#[derive(Debug, Clone)]
pub struct DryRun {
    /// Metadata file declaring the method
    pub metadata: PathBuf,
    /// Method name; defaults to the declared one
    pub method: Option<String>,
    /// Platform the call is tagged with
    pub platform: Platform,
    /// Raw JSON parameters
    pub payload: String,
}

/// Register the declared method on `bridge`, then validate and default the
/// payload as a call would, returning the canonical parameter tree.
pub async fn dry_run(bridge: &Bridge, args: &DryRun) -> Result<Map<String, Value>> {
    let decl = load_decl(&args.metadata)?;
    if let Some(requested) = &args.method {
        if *requested != decl.name {
            return Err(CliError::MethodMismatch {
                path: args.metadata.clone(),
                requested: requested.clone(),
                found: decl.name,
            });
        }
    }
    let params: Value = serde_json::from_str(&args.payload)?;

    // Warm nested models off the calling thread before registration needs them.
    for model in &decl.models {
        bridge.register_model(model.clone());
    }
    let pending: Vec<_> = decl.models.iter().filter_map(|m| bridge.prefetch(m.key())).collect();
    for handle in pending {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "prefetch task failed");
        }
    }

    let name = decl.name.clone();
    bridge.register_method(Arc::new(Declared(decl)), Platform::All, None)?;
    Ok(bridge.dry_run(args.platform, None, &name, &params)?)
}

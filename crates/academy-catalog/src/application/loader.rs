//! Catalog ingestion from YAML.

use std::path::Path;

use academy_core::error::DomainError;
use serde::Deserialize;
use tracing::info;

use crate::domain::catalog::StepCatalog;
use crate::domain::step::Routine;

/// Catalog shipped with the application.
const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.yaml");

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    routines: Vec<Routine>,
}

/// Parses and validates a YAML catalog document.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the YAML is malformed or the
/// routines fail catalog validation.
pub fn load_from_str(source: &str) -> Result<StepCatalog, DomainError> {
    let document: CatalogDocument = serde_yaml::from_str(source)
        .map_err(|e| DomainError::Validation(format!("catalog is not valid YAML: {e}")))?;
    let catalog = StepCatalog::from_routines(document.routines)?;
    info!(
        routines = catalog.len(),
        fingerprint = catalog.fingerprint(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Reads a YAML catalog from disk.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the file cannot be read, or any
/// error from [`load_from_str`].
pub fn load_from_path(path: &Path) -> Result<StepCatalog, DomainError> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        DomainError::Infrastructure(format!("cannot read catalog {}: {e}", path.display()))
    })?;
    load_from_str(&source)
}

/// The catalog compiled into the binary.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the bundled data is invalid.
pub fn builtin() -> Result<StepCatalog, DomainError> {
    load_from_str(BUILTIN_CATALOG)
}

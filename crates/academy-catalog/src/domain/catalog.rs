//! The unified technique/service table.

use std::collections::HashSet;

use academy_core::error::DomainError;
use sha2::{Digest, Sha256};

use super::step::{Routine, RoutineKind, StepDescriptor};

/// Static lookup table from routine identifier to ordered steps.
///
/// Built once at startup and never mutated; swapping the source data does
/// not affect the sequencer.
#[derive(Debug, Clone)]
pub struct StepCatalog {
    routines: Vec<Routine>,
    fingerprint: String,
}

impl StepCatalog {
    /// Builds a catalog from routines, checking identifiers and step titles.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if an identifier is blank or
    /// duplicated, or if a step has a blank title.
    pub fn from_routines(routines: Vec<Routine>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for routine in &routines {
            if routine.id.trim().is_empty() {
                return Err(DomainError::Validation(format!(
                    "routine '{}' has a blank id",
                    routine.name
                )));
            }
            if !seen.insert(routine.id.as_str()) {
                return Err(DomainError::Validation(format!(
                    "duplicate routine id '{}'",
                    routine.id
                )));
            }
            if routine.kind == RoutineKind::Technique && !routine.sub_services.is_empty() {
                return Err(DomainError::Validation(format!(
                    "technique '{}' cannot declare sub-services",
                    routine.id
                )));
            }
            let mut sub_ids = HashSet::new();
            for sub in &routine.sub_services {
                if !sub_ids.insert(sub.id.as_str()) {
                    return Err(DomainError::Validation(format!(
                        "duplicate sub-service id '{}' in '{}'",
                        sub.id, routine.id
                    )));
                }
            }
            let all_steps = routine
                .steps
                .iter()
                .chain(routine.sub_services.iter().flat_map(|sub| sub.steps.iter()));
            for step in all_steps {
                if step.title.trim().is_empty() {
                    return Err(DomainError::Validation(format!(
                        "routine '{}' has a step with a blank title",
                        routine.id
                    )));
                }
            }
        }

        let fingerprint = fingerprint_of(&routines)?;
        Ok(Self {
            routines,
            fingerprint,
        })
    }

    /// Hex SHA-256 over the canonical serialization of the table.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Number of routines in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routines.len()
    }

    /// Whether the catalog has no routines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    /// Looks a routine up by id, or by name ignoring ASCII case.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Routine> {
        self.routines
            .iter()
            .find(|routine| routine.id == key)
            .or_else(|| {
                self.routines
                    .iter()
                    .find(|routine| routine.name.eq_ignore_ascii_case(key))
            })
    }

    /// Routines of one kind (or all of them), in catalog order.
    pub fn routines(&self, kind: Option<RoutineKind>) -> impl Iterator<Item = &Routine> {
        self.routines
            .iter()
            .filter(move |routine| kind.is_none_or(|k| routine.kind == k))
    }

    /// Resolves the step list for a routine, or one of its sub-services.
    ///
    /// The returned slice may be empty; refusing to walk an empty list is
    /// the sequencer's job.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unavailable` if the routine or sub-service does
    /// not exist.
    pub fn steps_for(
        &self,
        key: &str,
        sub_service: Option<&str>,
    ) -> Result<&[StepDescriptor], DomainError> {
        let routine = self
            .get(key)
            .ok_or_else(|| DomainError::Unavailable(format!("no routine named '{key}'")))?;
        match sub_service {
            None => Ok(&routine.steps),
            Some(sub_key) => routine
                .sub_service(sub_key)
                .map(|sub| sub.steps.as_slice())
                .ok_or_else(|| {
                    DomainError::Unavailable(format!(
                        "'{}' has no sub-service '{sub_key}'",
                        routine.id
                    ))
                }),
        }
    }
}

fn fingerprint_of(routines: &[Routine]) -> Result<String, DomainError> {
    let canonical = serde_yaml::to_string(routines)
        .map_err(|e| DomainError::Infrastructure(format!("catalog serialization failed: {e}")))?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(format!("{digest:x}"))
}

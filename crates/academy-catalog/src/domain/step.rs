//! Step descriptors and the routines that order them.

use serde::{Deserialize, Serialize};

/// One instructional step. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    /// Short heading shown above the step.
    pub title: String,
    /// Instructional text, Markdown.
    pub instructions: String,
    /// Reference to an illustrative image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    /// Reference to a demonstration video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_ref: Option<String>,
}

/// Whether a routine is virtual training or a customer-facing offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineKind {
    /// Virtual haircut training module.
    Technique,
    /// Service performed on a real customer in a live session.
    Service,
}

/// A variant of a service with its own step list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubService {
    /// Identifier, unique within its service.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Ordered steps.
    #[serde(default)]
    pub steps: Vec<StepDescriptor>,
}

/// A technique or service: identifier plus ordered steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    /// Catalog-wide unique identifier.
    pub id: String,
    /// Display name, also accepted for lookup.
    pub name: String,
    /// Technique or service.
    pub kind: RoutineKind,
    /// Grouping shown in the catalog (cutting, colouring, styling).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// One-paragraph summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered steps. May be empty for routines not yet authored.
    #[serde(default)]
    pub steps: Vec<StepDescriptor>,
    /// Variants, services only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_services: Vec<SubService>,
}

impl Routine {
    /// Returns the sub-service with the given id or (case-insensitive) name.
    #[must_use]
    pub fn sub_service(&self, key: &str) -> Option<&SubService> {
        self.sub_services
            .iter()
            .find(|sub| sub.id == key || sub.name.eq_ignore_ascii_case(key))
    }
}

//! Admin review of candidates' completed training and customer sessions.

use std::collections::{BTreeMap, HashSet};

use academy_core::error::DomainError;
use academy_core::record::CandidateHistory;
use academy_core::repository::RecordRepository;
use academy_core::user::{Role, User};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSummary {
    /// The candidate.
    pub user: User,
    /// Technique runs completed, counting repeats.
    pub techniques_completed: usize,
    /// Distinct techniques completed at least once.
    pub distinct_techniques: usize,
    /// Live customer sessions completed.
    pub customer_sessions: usize,
    /// Mean total time of technique runs.
    pub average_technique_ms: Option<u64>,
    /// Mean customer rating over rated sessions.
    pub average_rating: Option<f64>,
    /// Most recent completion of either kind.
    pub last_activity: Option<DateTime<Utc>>,
}

/// Per-step timing statistics for one technique across all candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechniqueStats {
    /// Technique identifier.
    pub technique_id: String,
    /// Number of completed runs.
    pub attempts: usize,
    /// Mean total time across runs.
    pub average_total_ms: Option<u64>,
    /// Mean duration by step index. Runs with fewer entries do not
    /// contribute to later steps.
    pub average_step_ms: Vec<u64>,
}

/// Summarizes every candidate, most recently active first. Admin accounts
/// are excluded.
#[must_use]
pub fn summarize_candidates(histories: &[CandidateHistory]) -> Vec<CandidateSummary> {
    let mut summaries: Vec<CandidateSummary> = histories
        .iter()
        .filter(|history| history.user.role == Role::Candidate)
        .map(summarize)
        .collect();
    summaries.sort_by(|a, b| {
        b.last_activity
            .cmp(&a.last_activity)
            .then_with(|| a.user.name.cmp(&b.user.name))
    });
    summaries
}

fn summarize(history: &CandidateHistory) -> CandidateSummary {
    let techniques = &history.completed_techniques;
    let sessions = &history.customer_sessions;

    let distinct: HashSet<&str> = techniques
        .iter()
        .map(|record| record.technique_id.as_str())
        .collect();
    let ratings: Vec<u8> = sessions.iter().filter_map(|s| s.rating).collect();
    let last_activity = techniques
        .iter()
        .map(|record| record.completed_at)
        .chain(sessions.iter().map(|record| record.completed_at))
        .max();

    CandidateSummary {
        user: history.user.clone(),
        techniques_completed: techniques.len(),
        distinct_techniques: distinct.len(),
        customer_sessions: sessions.len(),
        average_technique_ms: mean(techniques.iter().map(|record| record.total_time_ms)),
        average_rating: if ratings.is_empty() {
            None
        } else {
            let sum: f64 = ratings.iter().map(|r| f64::from(*r)).sum();
            #[allow(clippy::cast_precision_loss)]
            let count = ratings.len() as f64;
            Some(sum / count)
        },
        last_activity,
    }
}

/// Step-level statistics for `technique_id` across all candidates.
#[must_use]
pub fn technique_stats(histories: &[CandidateHistory], technique_id: &str) -> TechniqueStats {
    let runs: Vec<&[u64]> = histories
        .iter()
        .flat_map(|history| history.completed_techniques.iter())
        .filter(|record| record.technique_id == technique_id)
        .map(|record| record.step_timings.as_slice())
        .collect();

    let mut by_step: BTreeMap<usize, Vec<u64>> = BTreeMap::new();
    for run in &runs {
        for (index, millis) in run.iter().enumerate() {
            by_step.entry(index).or_default().push(*millis);
        }
    }

    TechniqueStats {
        technique_id: technique_id.to_owned(),
        attempts: runs.len(),
        average_total_ms: mean(runs.iter().copied().map(saturating_total)),
        average_step_ms: by_step
            .into_values()
            .filter_map(|values| mean(values.into_iter()))
            .collect(),
    }
}

/// Loads histories from the backend and summarizes them.
///
/// # Errors
///
/// Returns `DomainError` if the backend cannot be reached.
pub async fn handle_candidate_review(
    repo: &dyn RecordRepository,
) -> Result<Vec<CandidateSummary>, DomainError> {
    let histories = repo.list_candidates().await?;
    Ok(summarize_candidates(&histories))
}

/// Loads histories from the backend and computes statistics for one
/// technique.
///
/// # Errors
///
/// Returns `DomainError` if the backend cannot be reached.
pub async fn handle_technique_review(
    technique_id: &str,
    repo: &dyn RecordRepository,
) -> Result<TechniqueStats, DomainError> {
    let histories = repo.list_candidates().await?;
    Ok(technique_stats(&histories, technique_id))
}

// Backend values are untrusted; sums are widened so they cannot overflow.
fn mean(values: impl Iterator<Item = u64>) -> Option<u64> {
    let (sum, count) = values.fold((0_u128, 0_u128), |(sum, count), v| {
        (sum + u128::from(v), count + 1)
    });
    (count > 0).then(|| u64::try_from(sum / count).unwrap_or(u64::MAX))
}

fn saturating_total(timings: &[u64]) -> u64 {
    timings.iter().fold(0_u64, |total, v| total.saturating_add(*v))
}

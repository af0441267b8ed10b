//! Operation-to-project name matching.
//!
//! Operations (spreadsheet-sourced) and ERP projects are joined by name
//! only. Exact matches after normalization win; when none exists, a
//! containment score resolves near-misses (e.g. a project registered as
//! "Residencial Aurora - Fase 2" against the operation "Residencial
//! Aurora"). Ties break toward the smaller internal code so results are
//! deterministic.

use super::types::ProjectCandidate;

/// Normalizes a name for comparison: lowercase, trimmed, inner
/// whitespace collapsed.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true when two names are equal after normalization.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    let a = normalize_name(a);
    !a.is_empty() && a == normalize_name(b)
}

/// Picks the project best matching an operation name.
///
/// Exact normalized equality wins outright; otherwise candidates where
/// one name contains the other are scored by how much of the longer
/// name the shorter one covers, and the highest score wins.
#[must_use]
pub fn best_project_match<'a>(
    operation_name: &str,
    candidates: &'a [ProjectCandidate],
) -> Option<&'a ProjectCandidate> {
    let target = normalize_name(operation_name);
    if target.is_empty() {
        return None;
    }

    let mut exact: Option<&ProjectCandidate> = None;
    let mut best: Option<(u64, &ProjectCandidate)> = None;

    for candidate in candidates {
        let name = normalize_name(&candidate.name);
        if name.is_empty() {
            continue;
        }

        if name == target {
            let replace = exact.is_none_or(|held| candidate.internal_code < held.internal_code);
            if replace {
                exact = Some(candidate);
            }
            continue;
        }

        if let Some(score) = containment_score(&target, &name) {
            let replace = match best {
                None => true,
                Some((held_score, held)) => {
                    score > held_score
                        || (score == held_score && candidate.internal_code < held.internal_code)
                }
            };
            if replace {
                best = Some((score, candidate));
            }
        }
    }

    exact.or_else(|| best.map(|(_, candidate)| candidate))
}

/// Scores two normalized names when one contains the other: permille of
/// the longer name covered by the shorter. `None` when neither contains
/// the other.
fn containment_score(a: &str, b: &str) -> Option<u64> {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if !longer.contains(shorter) {
        return None;
    }
    let shorter_len = u64::try_from(shorter.len()).ok()?;
    let longer_len = u64::try_from(longer.len()).ok()?;
    Some(shorter_len * 1000 / longer_len.max(1))
}

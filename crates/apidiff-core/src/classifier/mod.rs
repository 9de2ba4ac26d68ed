//! Severity classification.
//!
//! Looks up each entry's `entity.action` code in [`taxonomy::TAXONOMY`] and
//! partitions the entries into breaking, non-breaking and unclassified lists,
//! preserving finder order inside each list.

pub mod taxonomy;

use crate::diff::model::{composite_code, DiffEntity, DiffEntry, Outcome, Severity};
use crate::errors::{ApiDiffError, Result};
use std::collections::HashMap;
use std::sync::OnceLock;

static TABLE: OnceLock<HashMap<&'static str, Severity>> = OnceLock::new();
static VALIDATED: OnceLock<Result<()>> = OnceLock::new();

fn table() -> &'static HashMap<&'static str, Severity> {
    TABLE.get_or_init(|| taxonomy::TAXONOMY.iter().copied().collect())
}

/// Severity registered for a composite code
pub fn severity_of(code: &str) -> Option<Severity> {
    table().get(code).copied()
}

/// Check every emittable entity/action pair has a severity.
///
/// The result is computed once per process.
///
/// # Errors
///
/// `ClassificationGap` naming the first missing code.
pub fn validate_taxonomy() -> Result<()> {
    VALIDATED
        .get_or_init(|| {
            for entity in DiffEntity::ALL {
                for action in entity.supported_actions() {
                    let code = composite_code(entity, *action);
                    if severity_of(&code).is_none() {
                        return Err(ApiDiffError::ClassificationGap { code });
                    }
                }
            }
            Ok(())
        })
        .clone()
}

/// Assign a severity to every entry and partition them.
///
/// Entries whose entity is `unclassified` are unclassified whatever the
/// action. `breaking_differences_found` is true iff the breaking list is
/// non-empty.
///
/// # Errors
///
/// `ClassificationGap` if the table is incomplete or an entry's code has no row.
pub fn classify(entries: Vec<DiffEntry>) -> Result<Outcome> {
    validate_taxonomy()?;

    let mut outcome = Outcome::empty();
    for mut entry in entries {
        let severity = if entry.entity == DiffEntity::Unclassified {
            Severity::Unclassified
        } else {
            severity_of(&entry.code).ok_or_else(|| ApiDiffError::ClassificationGap {
                code: entry.code.clone(),
            })?
        };
        entry.severity = Some(severity);
        match severity {
            Severity::Breaking => outcome.breaking_differences.push(entry),
            Severity::NonBreaking => outcome.non_breaking_differences.push(entry),
            Severity::Unclassified => outcome.unclassified_differences.push(entry),
        }
    }
    outcome.breaking_differences_found = !outcome.breaking_differences.is_empty();
    Ok(outcome)
}

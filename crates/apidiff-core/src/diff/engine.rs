//! Comparison entry point.
//!
//! The core entry point is [`compare_specs`], which takes two already
//! deserialised documents and produces a classified [`Outcome`].

use crate::canonical::builder::build_canonical_spec;
use crate::canonical::model::{CanonicalSpec, SpecDocument};
use crate::classifier::classify;
use crate::config::EngineConfig;
use crate::diff::finder::find_differences;
use crate::diff::model::{DiffIdentity, Outcome};
use crate::diff::schema_diff::SchemaDiffer;
use crate::errors::{ExError, ExErrorKind};
use crate::{log_op_end, log_op_error, log_op_start};
use apidiff_core_types::RunId;
use serde_json::Value;
use sha2::{Digest as _, Sha256};
use std::time::Instant;

/// SHA-256 of a document's JSON serialisation, hex encoded.
///
/// # Errors
///
/// `Serialization` if the value cannot be serialised.
pub fn document_digest(content: &Value) -> Result<String, ExError> {
    let bytes = serde_json::to_vec(content).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("document_digest")
            .with_message(format!("document is not serialisable: {}", e))
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Compare two documents and classify every difference.
///
/// Both documents are always canonicalised so malformed input fails even when
/// the two sides are identical. When their digests match, finding and
/// classification are skipped and an empty outcome is returned.
///
/// # Errors
///
/// - `Config` if `config` is inconsistent
/// - `UnsupportedFormat`, `InvalidDocument`, `CircularReference`,
///   `UnresolvableReference` from canonicalisation, tagged with the document
/// - `SchemaDiff` if the differ fails
/// - `ClassificationGap` if an entry has no severity
pub fn compare_specs(
    source: &SpecDocument,
    destination: &SpecDocument,
    differ: &dyn SchemaDiffer,
    config: &EngineConfig,
) -> Result<Outcome, ExError> {
    let run_id = RunId::new();
    let start = Instant::now();
    log_op_start!(
        "compare_specs",
        run_id = %run_id,
        source = %source.location,
        destination = %destination.location
    );

    let result = compare_inner(source, destination, differ, config);
    let duration_ms = start.elapsed().as_millis() as u64;

    match &result {
        Ok(outcome) => {
            log_op_end!(
                "compare_specs",
                duration_ms = duration_ms,
                run_id = %run_id,
                entry_count = outcome.total(),
                breaking_count = outcome.breaking_differences.len()
            );
        }
        Err(err) => {
            log_op_error!("compare_specs", err, duration_ms = duration_ms, run_id = %run_id);
        }
    }

    result
}

fn compare_inner(
    source: &SpecDocument,
    destination: &SpecDocument,
    differ: &dyn SchemaDiffer,
    config: &EngineConfig,
) -> Result<Outcome, ExError> {
    config
        .validate()
        .map_err(|e| ExError::from(e).with_op("compare_specs"))?;

    let source_spec = build(source, config)?;
    let destination_spec = build(destination, config)?;

    let identity = DiffIdentity {
        source_location: source.location.clone(),
        source_format: source.format,
        source_digest: document_digest(&source.content)?,
        destination_location: destination.location.clone(),
        destination_format: destination.format,
        destination_digest: document_digest(&destination.content)?,
    };

    if identity.source_digest == identity.destination_digest {
        tracing::debug!(
            component = module_path!(),
            digest = %identity.source_digest,
            "documents identical, skipping difference search"
        );
        return Ok(Outcome::empty().with_identity(identity));
    }

    let entries = find_differences(&source_spec, &destination_spec, differ, config)?;
    let outcome = classify(entries).map_err(ExError::from)?;
    Ok(outcome.with_identity(identity))
}

fn build(document: &SpecDocument, config: &EngineConfig) -> Result<CanonicalSpec, ExError> {
    build_canonical_spec(document, config)
        .map_err(|e| ExError::from(e).with_document(document.location.clone()))
}

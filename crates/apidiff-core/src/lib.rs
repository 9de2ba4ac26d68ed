//! apidiff core - OpenAPI/Swagger normalisation and differencing engine
//!
//! This crate reduces Swagger 2.0 and OpenAPI 3.x documents to one canonical
//! tree and compares two of them, including:
//! - Internal `$ref` resolution with cycle detection
//! - Canonicalisation of both wire formats into a single model
//! - Path template matching that ignores parameter names
//! - Ordered structural differencing with a pluggable JSON-schema differ
//! - Classification of every difference as breaking, non-breaking or unclassified
//!
//! The engine is computation only: documents arrive already deserialised and
//! the outcome is returned as data.

pub mod canonical;
pub mod classifier;
pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod path_matcher;
pub mod resolver;

// Re-export commonly used types
pub use canonical::{build_canonical_spec, CanonicalSpec, SpecDocument, SpecFormat};
pub use classifier::classify;
pub use config::EngineConfig;
pub use diff::{
    compare_specs, find_differences, render_human_summary, DiffAction, DiffEntity, DiffEntry,
    DiffSource, NoopSchemaDiffer, Outcome, SchemaDiffer, Severity, StructuralSchemaDiffer,
};
pub use errors::{ApiDiffError, ExError, ExErrorKind, Result};

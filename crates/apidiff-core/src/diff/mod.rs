//! Structural diff engine.
//!
//! Compares two canonical specs and produces ordered, classified differences
//! suitable for CI gates and human review.
//!
//! ## Entry point
//!
//! ```ignore
//! use apidiff_core::diff::{compare_specs, StructuralSchemaDiffer};
//!
//! let outcome = compare_specs(&source, &destination, &StructuralSchemaDiffer, &config)?;
//! let summary = apidiff_core::diff::render_human_summary(&outcome);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce identical entry lists, in
//!   traversal order, whatever the schema-diff parallelism.
//! - **Idempotence**: a document compared with itself yields no entries.
//! - **Edits as pairs**: a changed value is one `add` plus one `remove`.

pub mod engine;
pub mod finder;
pub mod human_summary;
pub mod model;
pub mod schema_diff;

pub use engine::{compare_specs, document_digest};
pub use finder::find_differences;
pub use human_summary::render_human_summary;
pub use model::{
    DiffAction, DiffEntity, DiffEntry, DiffIdentity, DiffSource, EntityDetails, Outcome, Severity,
};
pub use schema_diff::{
    NoopSchemaDiffer, SchemaChangeKind, SchemaDiffer, SchemaDifference, StructuralSchemaDiffer,
};

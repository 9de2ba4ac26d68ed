//! Canonical spec: the format-agnostic tree both documents are reduced to.
//!
//! ```ignore
//! use apidiff_core::canonical::{build_canonical_spec, SpecDocument};
//!
//! let doc = SpecDocument::detect("specs/v2.yaml", content)?;
//! let spec = build_canonical_spec(&doc, &EngineConfig::default())?;
//! ```

pub mod builder;
pub mod model;
mod openapi3;
mod swagger2;

pub use builder::build_canonical_spec;
pub use model::{
    AnnotatedProperty, CanonicalSpec, ExtensionProperty, HttpMethod, OriginalPath, ParsedContact,
    ParsedHeader, ParsedInfo, ParsedLicense, ParsedOperation, ParsedPathItem, ParsedRequestBody,
    ParsedResponse, PathSegment, SpecDocument, SpecFormat,
};

//! Canonical spec types.
//!
//! A [`CanonicalSpec`] is the format-agnostic tree the finder walks. Every
//! leaf is an [`AnnotatedProperty`] that remembers where it came from in the
//! original document so reports can point at it.

use crate::errors::{ApiDiffError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One step of an original document location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Ordered location of a value in the document it was read from.
///
/// Used for reporting only; two properties are never compared by location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginalPath(Vec<PathSegment>);

impl OriginalPath {
    /// The document root
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// A new path one level below this one
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// A new path with every segment of `tail` appended
    pub fn join(&self, tail: &[PathSegment]) -> Self {
        let mut segments = self.0.clone();
        segments.extend(tail.iter().cloned());
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Dot-joined rendering used in reports, e.g. `paths./pets.get`
    pub fn to_location(&self) -> String {
        self.0
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for OriginalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_location())
    }
}

/// The atomic unit of the canonical tree.
///
/// `value: None` means the property did not exist in the document; a present
/// `null` or empty string is `Some(..)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedProperty {
    pub original_path: OriginalPath,
    pub value: Option<Value>,
}

impl AnnotatedProperty {
    pub fn present(original_path: OriginalPath, value: Value) -> Self {
        Self {
            original_path,
            value: Some(value),
        }
    }

    pub fn absent(original_path: OriginalPath) -> Self {
        Self {
            original_path,
            value: None,
        }
    }

    /// Wrap an optional borrowed value, cloning it when present
    pub fn from_optional(original_path: OriginalPath, value: Option<&Value>) -> Self {
        Self {
            original_path,
            value: value.cloned(),
        }
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

/// A vendor-extension property collected during canonicalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionProperty {
    pub name: String,
    pub property: AnnotatedProperty,
}

/// Supported wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecFormat {
    Swagger2,
    OpenApi3,
}

impl SpecFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecFormat::Swagger2 => "swagger2",
            SpecFormat::OpenApi3 => "openapi3",
        }
    }

    /// The top-level key that carries this format's version string
    pub fn version_key(&self) -> &'static str {
        match self {
            SpecFormat::Swagger2 => "swagger",
            SpecFormat::OpenApi3 => "openapi",
        }
    }

    /// HTTP methods the format recognises as operations inside a path item
    pub fn methods(&self) -> &'static [HttpMethod] {
        match self {
            SpecFormat::Swagger2 => &HttpMethod::ALL[..7],
            SpecFormat::OpenApi3 => &HttpMethod::ALL,
        }
    }

    /// Infer the format from a document's version key.
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` if neither `swagger: "2.0"` nor `openapi: "3.x"` is present.
    pub fn detect(content: &Value) -> Result<Self> {
        if let Some(version) = content.get("openapi") {
            return match version.as_str() {
                Some(v) if v.starts_with("3.") => Ok(SpecFormat::OpenApi3),
                _ => Err(ApiDiffError::UnsupportedFormat {
                    format: format!("openapi {}", version),
                }),
            };
        }
        if let Some(version) = content.get("swagger") {
            return match version.as_str() {
                Some("2.0") => Ok(SpecFormat::Swagger2),
                _ => Err(ApiDiffError::UnsupportedFormat {
                    format: format!("swagger {}", version),
                }),
            };
        }
        Err(ApiDiffError::UnsupportedFormat {
            format: "no `swagger` or `openapi` version key".to_string(),
        })
    }
}

impl FromStr for SpecFormat {
    type Err = ApiDiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "swagger2" => Ok(SpecFormat::Swagger2),
            "openapi3" => Ok(SpecFormat::OpenApi3),
            other => Err(ApiDiffError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SpecFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP methods in the order operations are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Every method; the first seven are the Swagger 2 set
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        HttpMethod::ALL.iter().copied().find(|m| m.as_str() == key)
    }
}

/// An already-deserialised document handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDocument {
    /// Where the document came from; used only in messages
    pub location: String,
    pub format: SpecFormat,
    pub content: Value,
}

impl SpecDocument {
    pub fn new(location: impl Into<String>, format: SpecFormat, content: Value) -> Self {
        Self {
            location: location.into(),
            format,
            content,
        }
    }

    /// Build a document whose format is inferred from its version key
    pub fn detect(location: impl Into<String>, content: Value) -> Result<Self> {
        let format = SpecFormat::detect(&content)?;
        Ok(Self::new(location, format, content))
    }
}

/// `info.contact`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedContact {
    pub name: AnnotatedProperty,
    pub email: AnnotatedProperty,
    pub url: AnnotatedProperty,
}

/// `info.license`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLicense {
    pub name: AnnotatedProperty,
    pub url: AnnotatedProperty,
}

/// The `info` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedInfo {
    pub title: AnnotatedProperty,
    pub description: AnnotatedProperty,
    pub terms_of_service: AnnotatedProperty,
    pub version: AnnotatedProperty,
    pub contact: ParsedContact,
    pub license: ParsedLicense,
    pub x_properties: Vec<ExtensionProperty>,
}

/// A request body and the JSON schema it carries, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRequestBody {
    pub property: AnnotatedProperty,
    pub json_schema: Option<AnnotatedProperty>,
}

/// One response header, keyed by its lower-cased name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedHeader {
    pub name: String,
    pub property: AnnotatedProperty,
}

/// One declared status code of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResponse {
    pub status_code: String,
    pub property: AnnotatedProperty,
    pub json_schema: Option<AnnotatedProperty>,
    pub headers: Vec<ParsedHeader>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedOperation {
    pub method: HttpMethod,
    pub property: AnnotatedProperty,
    pub request_body: ParsedRequestBody,
    pub responses: Vec<ParsedResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedPathItem {
    pub path_name: String,
    pub property: AnnotatedProperty,
    pub operations: Vec<ParsedOperation>,
}

impl ParsedPathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&ParsedOperation> {
        self.operations.iter().find(|op| op.method == method)
    }
}

/// The normalised tree for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSpec {
    pub format: SpecFormat,
    pub location: String,
    pub swagger: AnnotatedProperty,
    pub openapi: AnnotatedProperty,
    pub info: ParsedInfo,
    pub base_path: AnnotatedProperty,
    pub host: AnnotatedProperty,
    pub schemes: AnnotatedProperty,
    pub x_properties: Vec<ExtensionProperty>,
    pub paths: Vec<ParsedPathItem>,
}

impl CanonicalSpec {
    pub fn path(&self, name: &str) -> Option<&ParsedPathItem> {
        self.paths.iter().find(|p| p.path_name == name)
    }

    pub fn path_names(&self) -> Vec<&str> {
        self.paths.iter().map(|p| p.path_name.as_str()).collect()
    }
}

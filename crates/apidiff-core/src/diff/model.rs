//! Difference entry and outcome types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! Entry lists are ordered by traversal so serialised output is deterministic.

use crate::canonical::model::{AnnotatedProperty, OriginalPath, SpecFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Taxonomy key naming what kind of thing changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiffEntity {
    #[serde(rename = "basePath")]
    BasePath,
    #[serde(rename = "host")]
    Host,
    #[serde(rename = "schemes")]
    Schemes,
    #[serde(rename = "swagger")]
    Swagger,
    #[serde(rename = "openapi")]
    Openapi,
    #[serde(rename = "info.title")]
    InfoTitle,
    #[serde(rename = "info.description")]
    InfoDescription,
    #[serde(rename = "info.termsOfService")]
    InfoTermsOfService,
    #[serde(rename = "info.version")]
    InfoVersion,
    #[serde(rename = "info.contact.name")]
    InfoContactName,
    #[serde(rename = "info.contact.email")]
    InfoContactEmail,
    #[serde(rename = "info.contact.url")]
    InfoContactUrl,
    #[serde(rename = "info.license.name")]
    InfoLicenseName,
    #[serde(rename = "info.license.url")]
    InfoLicenseUrl,
    #[serde(rename = "path")]
    Path,
    #[serde(rename = "method")]
    Method,
    #[serde(rename = "request.body")]
    RequestBody,
    #[serde(rename = "request.body.scope")]
    RequestBodyScope,
    #[serde(rename = "response.body")]
    ResponseBody,
    #[serde(rename = "response.body.scope")]
    ResponseBodyScope,
    #[serde(rename = "response.header")]
    ResponseHeader,
    #[serde(rename = "response.status")]
    ResponseStatus,
    #[serde(rename = "unclassified")]
    Unclassified,
}

impl DiffEntity {
    pub const ALL: [DiffEntity; 23] = [
        DiffEntity::BasePath,
        DiffEntity::Host,
        DiffEntity::Schemes,
        DiffEntity::Swagger,
        DiffEntity::Openapi,
        DiffEntity::InfoTitle,
        DiffEntity::InfoDescription,
        DiffEntity::InfoTermsOfService,
        DiffEntity::InfoVersion,
        DiffEntity::InfoContactName,
        DiffEntity::InfoContactEmail,
        DiffEntity::InfoContactUrl,
        DiffEntity::InfoLicenseName,
        DiffEntity::InfoLicenseUrl,
        DiffEntity::Path,
        DiffEntity::Method,
        DiffEntity::RequestBody,
        DiffEntity::RequestBodyScope,
        DiffEntity::ResponseBody,
        DiffEntity::ResponseBodyScope,
        DiffEntity::ResponseHeader,
        DiffEntity::ResponseStatus,
        DiffEntity::Unclassified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiffEntity::BasePath => "basePath",
            DiffEntity::Host => "host",
            DiffEntity::Schemes => "schemes",
            DiffEntity::Swagger => "swagger",
            DiffEntity::Openapi => "openapi",
            DiffEntity::InfoTitle => "info.title",
            DiffEntity::InfoDescription => "info.description",
            DiffEntity::InfoTermsOfService => "info.termsOfService",
            DiffEntity::InfoVersion => "info.version",
            DiffEntity::InfoContactName => "info.contact.name",
            DiffEntity::InfoContactEmail => "info.contact.email",
            DiffEntity::InfoContactUrl => "info.contact.url",
            DiffEntity::InfoLicenseName => "info.license.name",
            DiffEntity::InfoLicenseUrl => "info.license.url",
            DiffEntity::Path => "path",
            DiffEntity::Method => "method",
            DiffEntity::RequestBody => "request.body",
            DiffEntity::RequestBodyScope => "request.body.scope",
            DiffEntity::ResponseBody => "response.body",
            DiffEntity::ResponseBodyScope => "response.body.scope",
            DiffEntity::ResponseHeader => "response.header",
            DiffEntity::ResponseStatus => "response.status",
            DiffEntity::Unclassified => "unclassified",
        }
    }

    /// Actions the finder can emit for this entity
    pub fn supported_actions(&self) -> &'static [DiffAction] {
        match self {
            DiffEntity::Schemes => &DiffAction::ALL,
            _ => &DiffAction::ALL[..2],
        }
    }
}

impl fmt::Display for DiffEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to the entity. An edit is reported as an `Add` + `Remove` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiffAction {
    #[serde(rename = "add")]
    Add,
    #[serde(rename = "remove")]
    Remove,
    #[serde(rename = "item.add")]
    ItemAdd,
    #[serde(rename = "item.remove")]
    ItemRemove,
}

impl DiffAction {
    pub const ALL: [DiffAction; 4] = [
        DiffAction::Add,
        DiffAction::Remove,
        DiffAction::ItemAdd,
        DiffAction::ItemRemove,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiffAction::Add => "add",
            DiffAction::Remove => "remove",
            DiffAction::ItemAdd => "item.add",
            DiffAction::ItemRemove => "item.remove",
        }
    }
}

impl fmt::Display for DiffAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which sub-engine produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffSource {
    #[serde(rename = "openapi-diff")]
    OpenApiDiff,
    #[serde(rename = "json-schema-diff")]
    JsonSchemaDiff,
}

/// Severity assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Breaking,
    NonBreaking,
    Unclassified,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Breaking => "breaking",
            Severity::NonBreaking => "non-breaking",
            Severity::Unclassified => "unclassified",
        }
    }
}

/// One side of a difference: where the value lives and what it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetails {
    /// Dot-joined original location
    pub location: String,
    pub original_path: OriginalPath,
    pub value: Option<Value>,
}

impl EntityDetails {
    pub fn new(original_path: OriginalPath, value: Option<Value>) -> Self {
        Self {
            location: original_path.to_location(),
            original_path,
            value,
        }
    }
}

impl From<&AnnotatedProperty> for EntityDetails {
    fn from(property: &AnnotatedProperty) -> Self {
        EntityDetails::new(property.original_path.clone(), property.value.clone())
    }
}

/// One reported difference between the two documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    /// `entity.action`, the classification lookup key
    pub code: String,
    pub entity: DiffEntity,
    pub action: DiffAction,
    pub source: DiffSource,
    pub source_details: Option<EntityDetails>,
    pub destination_details: Option<EntityDetails>,
    /// `None` until the classifier runs
    pub severity: Option<Severity>,
}

impl DiffEntry {
    pub fn new(
        entity: DiffEntity,
        action: DiffAction,
        source: DiffSource,
        source_details: Option<EntityDetails>,
        destination_details: Option<EntityDetails>,
    ) -> Self {
        Self {
            code: composite_code(entity, action),
            entity,
            action,
            source,
            source_details,
            destination_details,
            severity: None,
        }
    }
}

/// The `entity.action` key used for taxonomy lookup
pub fn composite_code(entity: DiffEntity, action: DiffAction) -> String {
    format!("{}.{}", entity.as_str(), action.as_str())
}

/// Digest identity of both compared documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffIdentity {
    pub source_location: String,
    pub source_format: SpecFormat,
    /// SHA-256 of the source document's JSON serialisation
    pub source_digest: String,
    pub destination_location: String,
    pub destination_format: SpecFormat,
    pub destination_digest: String,
}

/// The engine's final result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub identity: Option<DiffIdentity>,
    pub breaking_differences_found: bool,
    pub breaking_differences: Vec<DiffEntry>,
    pub non_breaking_differences: Vec<DiffEntry>,
    pub unclassified_differences: Vec<DiffEntry>,
}

impl Outcome {
    pub fn empty() -> Self {
        Self {
            identity: None,
            breaking_differences_found: false,
            breaking_differences: Vec::new(),
            non_breaking_differences: Vec::new(),
            unclassified_differences: Vec::new(),
        }
    }

    pub fn with_identity(mut self, identity: DiffIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Successful iff nothing breaking was found
    pub fn is_success(&self) -> bool {
        !self.breaking_differences_found
    }

    pub fn total(&self) -> usize {
        self.breaking_differences.len()
            + self.non_breaking_differences.len()
            + self.unclassified_differences.len()
    }

    /// Every entry, breaking first
    pub fn entries(&self) -> impl Iterator<Item = &DiffEntry> {
        self.breaking_differences
            .iter()
            .chain(self.non_breaking_differences.iter())
            .chain(self.unclassified_differences.iter())
    }
}

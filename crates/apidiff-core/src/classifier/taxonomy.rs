//! Severity table for every `entity.action` code the finder can emit.
//!
//! Rows are plain data so a new entity fails the exhaustiveness check instead
//! of silently falling through to a default.

use crate::diff::model::Severity::{self, Breaking, NonBreaking, Unclassified};

pub const TAXONOMY: &[(&str, Severity)] = &[
    // Service location
    ("basePath.add", Breaking),
    ("basePath.remove", Breaking),
    ("host.add", Breaking),
    ("host.remove", Breaking),
    ("schemes.add", Breaking),
    ("schemes.remove", Breaking),
    ("schemes.item.add", NonBreaking),
    ("schemes.item.remove", Breaking),
    // Version keys
    ("swagger.add", NonBreaking),
    ("swagger.remove", NonBreaking),
    ("openapi.add", NonBreaking),
    ("openapi.remove", NonBreaking),
    // Documentation
    ("info.title.add", NonBreaking),
    ("info.title.remove", NonBreaking),
    ("info.description.add", NonBreaking),
    ("info.description.remove", NonBreaking),
    ("info.termsOfService.add", NonBreaking),
    ("info.termsOfService.remove", NonBreaking),
    ("info.version.add", NonBreaking),
    ("info.version.remove", NonBreaking),
    ("info.contact.name.add", NonBreaking),
    ("info.contact.name.remove", NonBreaking),
    ("info.contact.email.add", NonBreaking),
    ("info.contact.email.remove", NonBreaking),
    ("info.contact.url.add", NonBreaking),
    ("info.contact.url.remove", NonBreaking),
    ("info.license.name.add", NonBreaking),
    ("info.license.name.remove", NonBreaking),
    ("info.license.url.add", NonBreaking),
    ("info.license.url.remove", NonBreaking),
    // Endpoints
    ("path.add", NonBreaking),
    ("path.remove", Breaking),
    ("method.add", NonBreaking),
    ("method.remove", Breaking),
    // Bodies
    ("request.body.add", Breaking),
    ("request.body.remove", NonBreaking),
    ("request.body.scope.add", NonBreaking),
    ("request.body.scope.remove", Breaking),
    ("response.body.add", NonBreaking),
    ("response.body.remove", Breaking),
    ("response.body.scope.add", Breaking),
    ("response.body.scope.remove", NonBreaking),
    // Responses
    ("response.header.add", NonBreaking),
    ("response.header.remove", Breaking),
    ("response.status.add", NonBreaking),
    ("response.status.remove", Breaking),
    // Extensions
    ("unclassified.add", Unclassified),
    ("unclassified.remove", Unclassified),
];

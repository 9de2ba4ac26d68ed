//! Canonical spec construction.
//!
//! The builder walks one document and produces a [`CanonicalSpec`]. The
//! traversal (info, extensions, paths, operations, responses, headers) is
//! shared; the places where the wire formats disagree are delegated to
//! [`super::swagger2`] and [`super::openapi3`].

use crate::canonical::model::{
    AnnotatedProperty, CanonicalSpec, ExtensionProperty, HttpMethod, OriginalPath, ParsedContact,
    ParsedHeader, ParsedInfo, ParsedLicense, ParsedOperation, ParsedPathItem, ParsedRequestBody,
    ParsedResponse, SpecDocument, SpecFormat,
};
use crate::canonical::{openapi3, swagger2};
use crate::config::EngineConfig;
use crate::errors::{ApiDiffError, Result};
use crate::resolver;
use serde_json::{Map, Value};

/// Response header skipped on every comparison
const CONTENT_TYPE_HEADER: &str = "content-type";

/// Build the canonical tree for one document.
///
/// # Errors
///
/// - `UnsupportedFormat` if the document's version key disagrees with its declared format
/// - `InvalidDocument` if the root or a structural node is not an object
/// - `CircularReference` / `UnresolvableReference` from reference resolution
pub fn build_canonical_spec(
    document: &SpecDocument,
    config: &EngineConfig,
) -> Result<CanonicalSpec> {
    let root = expect_object(&document.content, &OriginalPath::root(), "document root")?;

    let detected = SpecFormat::detect(&document.content)?;
    if detected != document.format {
        return Err(ApiDiffError::UnsupportedFormat {
            format: format!(
                "document declared as {} but its version key says {}",
                document.format, detected
            ),
        });
    }

    let ctx = BuildContext {
        document: &document.content,
        format: document.format,
        config,
    };

    let swagger_only = |key: &str| -> AnnotatedProperty {
        let path = OriginalPath::root().child(key);
        match ctx.format {
            SpecFormat::Swagger2 => AnnotatedProperty::from_optional(path, root.get(key)),
            SpecFormat::OpenApi3 => AnnotatedProperty::absent(path),
        }
    };

    let spec = CanonicalSpec {
        format: document.format,
        location: document.location.clone(),
        swagger: AnnotatedProperty::from_optional(
            OriginalPath::root().child("swagger"),
            root.get("swagger"),
        ),
        openapi: AnnotatedProperty::from_optional(
            OriginalPath::root().child("openapi"),
            root.get("openapi"),
        ),
        info: ctx.build_info(root.get("info"))?,
        base_path: swagger_only("basePath"),
        host: swagger_only("host"),
        schemes: swagger_only("schemes"),
        x_properties: ctx.extensions(root, &OriginalPath::root()),
        paths: ctx.build_paths(root.get("paths"))?,
    };

    tracing::debug!(
        component = module_path!(),
        spec_location = %spec.location,
        spec_format = spec.format.as_str(),
        path_count = spec.paths.len(),
        "canonical spec built"
    );

    Ok(spec)
}

/// Fail with `InvalidDocument` unless `value` is an object
pub(crate) fn expect_object<'v>(
    value: &'v Value,
    path: &OriginalPath,
    what: &str,
) -> Result<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ApiDiffError::InvalidDocument {
            location: location_or_root(path),
            reason: format!("{} must be an object", what),
        })
}

fn location_or_root(path: &OriginalPath) -> String {
    if path.segments().is_empty() {
        "<root>".to_string()
    } else {
        path.to_location()
    }
}

/// Look up the `application/json` media type inside an OpenAPI `content` map
/// (a `charset` parameter is tolerated).
pub(crate) fn json_media_type<'v>(content: &'v Map<String, Value>) -> Option<(&'v str, &'v Value)> {
    content
        .iter()
        .find(|(media_type, _)| {
            media_type
                .split(';')
                .next()
                .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
                .unwrap_or(false)
        })
        .map(|(k, v)| (k.as_str(), v))
}

/// Shared state for one document build.
pub(crate) struct BuildContext<'a> {
    pub document: &'a Value,
    pub format: SpecFormat,
    pub config: &'a EngineConfig,
}

impl<'a> BuildContext<'a> {
    pub fn resolve(&self, value: &'a Value) -> Result<&'a Value> {
        resolver::resolve(value, self.document)
    }

    /// Collect extension properties of `object`, in document order
    pub fn extensions(&self, object: &Map<String, Value>, base: &OriginalPath) -> Vec<ExtensionProperty> {
        object
            .iter()
            .filter(|(key, _)| self.config.is_extension(key))
            .map(|(key, value)| ExtensionProperty {
                name: key.clone(),
                property: AnnotatedProperty::present(base.child(key.as_str()), value.clone()),
            })
            .collect()
    }

    /// Wrap a JSON schema found at `path`, attaching the document's reference
    /// sources so secondary `$ref`s stay resolvable against the schema alone.
    pub fn json_schema(&self, schema: &Value, path: OriginalPath) -> AnnotatedProperty {
        let sources = match self.format {
            SpecFormat::Swagger2 => swagger2::reference_sources(self.document),
            SpecFormat::OpenApi3 => openapi3::reference_sources(self.document),
        };
        let augmented = match (schema, sources) {
            (Value::Object(map), Some((key, value))) if !map.contains_key(key) => {
                let mut map = map.clone();
                map.insert(key.to_string(), value.clone());
                Value::Object(map)
            }
            _ => schema.clone(),
        };
        AnnotatedProperty::present(path, augmented)
    }

    fn scalar(&self, object: Option<&Map<String, Value>>, base: &OriginalPath, key: &str) -> AnnotatedProperty {
        AnnotatedProperty::from_optional(base.child(key), object.and_then(|o| o.get(key)))
    }

    fn nested<'v>(
        &self,
        object: Option<&'v Map<String, Value>>,
        base: &OriginalPath,
        key: &str,
    ) -> Result<Option<&'v Map<String, Value>>> {
        match object.and_then(|o| o.get(key)) {
            None => Ok(None),
            Some(value) => expect_object(value, &base.child(key), key).map(Some),
        }
    }

    fn build_info(&self, info: Option<&Value>) -> Result<ParsedInfo> {
        let base = OriginalPath::root().child("info");
        let info = match info {
            Some(value) => Some(expect_object(value, &base, "info")?),
            None => None,
        };

        let contact_path = base.child("contact");
        let contact = self.nested(info, &base, "contact")?;
        let license_path = base.child("license");
        let license = self.nested(info, &base, "license")?;

        Ok(ParsedInfo {
            title: self.scalar(info, &base, "title"),
            description: self.scalar(info, &base, "description"),
            terms_of_service: self.scalar(info, &base, "termsOfService"),
            version: self.scalar(info, &base, "version"),
            contact: ParsedContact {
                name: self.scalar(contact, &contact_path, "name"),
                email: self.scalar(contact, &contact_path, "email"),
                url: self.scalar(contact, &contact_path, "url"),
            },
            license: ParsedLicense {
                name: self.scalar(license, &license_path, "name"),
                url: self.scalar(license, &license_path, "url"),
            },
            x_properties: info
                .map(|o| self.extensions(o, &base))
                .unwrap_or_default(),
        })
    }

    fn build_paths(&self, paths: Option<&'a Value>) -> Result<Vec<ParsedPathItem>> {
        let base = OriginalPath::root().child("paths");
        let Some(paths) = paths else {
            return Ok(Vec::new());
        };
        let paths = expect_object(paths, &base, "paths")?;

        paths
            .iter()
            .filter(|(name, _)| !self.config.is_extension(name))
            .map(|(name, raw)| self.build_path_item(name, raw, base.child(name.as_str())))
            .collect()
    }

    fn build_path_item(
        &self,
        path_name: &str,
        raw: &'a Value,
        path: OriginalPath,
    ) -> Result<ParsedPathItem> {
        let item = self.resolve(raw)?;
        let item_map = expect_object(item, &path, "path item")?;

        let mut operations = Vec::new();
        for (key, raw_operation) in item_map {
            let Some(method) = HttpMethod::parse(key) else {
                continue;
            };
            if !self.format.methods().contains(&method) {
                continue;
            }
            operations.push(self.build_operation(
                method,
                raw_operation,
                item,
                &path,
            )?);
        }

        Ok(ParsedPathItem {
            path_name: path_name.to_string(),
            property: AnnotatedProperty::present(path, item.clone()),
            operations,
        })
    }

    fn build_operation(
        &self,
        method: HttpMethod,
        raw: &'a Value,
        path_item: &'a Value,
        item_path: &OriginalPath,
    ) -> Result<ParsedOperation> {
        let path = item_path.child(method.as_str());
        let operation = self.resolve(raw)?;
        let operation_map = expect_object(operation, &path, "operation")?;

        let request_body = match self.format {
            SpecFormat::Swagger2 => {
                swagger2::request_body(self, operation_map, path_item, item_path, &path)?
            }
            SpecFormat::OpenApi3 => openapi3::request_body(self, operation_map, &path)?,
        };

        let responses = match operation_map.get("responses") {
            Some(responses) => self.build_responses(responses, &path.child("responses"))?,
            None => Vec::new(),
        };

        Ok(ParsedOperation {
            method,
            property: AnnotatedProperty::present(path, operation.clone()),
            request_body,
            responses,
        })
    }

    fn build_responses(&self, raw: &'a Value, base: &OriginalPath) -> Result<Vec<ParsedResponse>> {
        let responses = expect_object(raw, base, "responses")?;
        let mut parsed = Vec::with_capacity(responses.len());

        for (status_code, raw_response) in responses {
            if self.config.is_extension(status_code) {
                continue;
            }
            let path = base.child(status_code.as_str());
            let response = self.resolve(raw_response)?;
            let response_map = expect_object(response, &path, "response")?;

            let json_schema = match self.format {
                SpecFormat::Swagger2 => swagger2::response_schema(self, response_map, &path),
                SpecFormat::OpenApi3 => openapi3::response_schema(self, response_map, &path)?,
            };
            let headers = match response_map.get("headers") {
                Some(headers) => self.build_headers(headers, &path.child("headers"))?,
                None => Vec::new(),
            };

            parsed.push(ParsedResponse {
                status_code: status_code.clone(),
                property: AnnotatedProperty::present(path, response.clone()),
                json_schema,
                headers,
            });
        }

        Ok(parsed)
    }

    fn build_headers(&self, raw: &'a Value, base: &OriginalPath) -> Result<Vec<ParsedHeader>> {
        let headers_value = self.resolve(raw)?;
        let headers = expect_object(headers_value, base, "headers")?;
        let mut parsed: Vec<ParsedHeader> = Vec::with_capacity(headers.len());

        for (name, raw_header) in headers {
            let lower = name.to_ascii_lowercase();
            if lower == CONTENT_TYPE_HEADER
                || self.config.is_ignored_header(&lower)
                || parsed.iter().any(|h| h.name == lower)
            {
                continue;
            }
            let header = self.resolve(raw_header)?;
            parsed.push(ParsedHeader {
                name: lower,
                property: AnnotatedProperty::present(base.child(name.as_str()), header.clone()),
            });
        }

        Ok(parsed)
    }
}

/// Convenience for request bodies that are not declared at all
pub(crate) fn absent_request_body(path: OriginalPath) -> ParsedRequestBody {
    ParsedRequestBody {
        property: AnnotatedProperty::absent(path),
        json_schema: None,
    }
}

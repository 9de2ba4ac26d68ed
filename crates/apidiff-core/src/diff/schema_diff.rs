//! JSON-schema difference collaborator.
//!
//! The finder hands each pair of body schemas to a [`SchemaDiffer`] and maps
//! the returned value-space changes to `*.body.scope` entries. Each schema
//! arrives with the document's `definitions` / `components` attached, so
//! `$ref`s inside it resolve against the schema value alone.

use crate::canonical::model::PathSegment;
use crate::errors::{ExError, ExErrorKind};
use crate::resolver;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Direction of a value-space change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaChangeKind {
    /// The destination accepts values the source did not
    AddedValues,
    /// The destination rejects values the source accepted
    RemovedValues,
}

/// One change reported by a schema differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDifference {
    pub kind: SchemaChangeKind,
    /// Keyword location relative to the schema root, e.g. `properties.name.type`
    pub location: Vec<PathSegment>,
    pub source_value: Option<Value>,
    pub destination_value: Option<Value>,
}

/// Compares two JSON schemas and reports value-space changes.
///
/// Implementations are shared across worker threads when schema diffs run in
/// parallel.
pub trait SchemaDiffer: Send + Sync {
    /// # Errors
    ///
    /// Any `ExError`; the finder wraps it as `SchemaDiff` with the body location.
    fn compare(&self, source: &Value, destination: &Value) -> Result<Vec<SchemaDifference>, ExError>;
}

/// Reports nothing. Used when body scope changes are not wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSchemaDiffer;

impl SchemaDiffer for NoopSchemaDiffer {
    fn compare(&self, _source: &Value, _destination: &Value) -> Result<Vec<SchemaDifference>, ExError> {
        Ok(Vec::new())
    }
}

/// Keyword-level differ covering `type`, `enum`, `required`,
/// `additionalProperties: false`, `properties` and `items`.
///
/// Recursive schemas are walked once per pair of references.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralSchemaDiffer;

impl SchemaDiffer for StructuralSchemaDiffer {
    fn compare(&self, source: &Value, destination: &Value) -> Result<Vec<SchemaDifference>, ExError> {
        let mut walk = Walk {
            source_root: source,
            destination_root: destination,
            active: Vec::new(),
            out: Vec::new(),
        };
        walk.node(source, destination, &mut Vec::new())?;
        Ok(walk.out)
    }
}

const ALL_TYPES: [&str; 7] = [
    "array", "boolean", "integer", "null", "number", "object", "string",
];

struct Walk<'a> {
    source_root: &'a Value,
    destination_root: &'a Value,
    active: Vec<(String, String)>,
    out: Vec<SchemaDifference>,
}

impl<'a> Walk<'a> {
    fn node(
        &mut self,
        source: &'a Value,
        destination: &'a Value,
        location: &mut Vec<PathSegment>,
    ) -> Result<(), ExError> {
        let source_ref = resolver::reference_of(source).map(str::to_string);
        let destination_ref = resolver::reference_of(destination).map(str::to_string);
        let source = resolve(source, self.source_root, location)?;
        let destination = resolve(destination, self.destination_root, location)?;

        let pair = match (source_ref, destination_ref) {
            (Some(s), Some(d)) => Some((s, d)),
            _ => None,
        };
        if let Some(pair) = &pair {
            if self.active.contains(pair) {
                return Ok(());
            }
            self.active.push(pair.clone());
        }

        let result = self.keywords(source, destination, location);

        if pair.is_some() {
            self.active.pop();
        }
        result
    }

    fn keywords(
        &mut self,
        source: &'a Value,
        destination: &'a Value,
        location: &mut Vec<PathSegment>,
    ) -> Result<(), ExError> {
        let source_types = types_of(source);
        let destination_types = types_of(destination);
        self.compare_sets(
            location,
            "type",
            &source_types,
            &destination_types,
            source.get("type"),
            destination.get("type"),
        );

        match (enum_of(source), enum_of(destination)) {
            (Some(s), Some(d)) => {
                let added = d.iter().any(|v| !s.contains(v));
                let removed = s.iter().any(|v| !d.contains(v));
                let (sv, dv) = (source.get("enum"), destination.get("enum"));
                if added {
                    self.push(SchemaChangeKind::AddedValues, location, "enum", sv, dv);
                }
                if removed {
                    self.push(SchemaChangeKind::RemovedValues, location, "enum", sv, dv);
                }
            }
            (Some(_), None) => {
                let sv = source.get("enum");
                self.push(SchemaChangeKind::AddedValues, location, "enum", sv, None);
            }
            (None, Some(_)) => {
                let dv = destination.get("enum");
                self.push(SchemaChangeKind::RemovedValues, location, "enum", None, dv);
            }
            (None, None) => {}
        }

        let both = |t: &str| source_types.contains(t) && destination_types.contains(t);
        if both("object") {
            self.object(source, destination, location)?;
        }
        if both("array") {
            if let (Some(s), Some(d)) = (source.get("items"), destination.get("items")) {
                location.push(PathSegment::from("items"));
                let result = self.node(s, d, location);
                location.pop();
                result?;
            }
        }
        Ok(())
    }

    fn object(
        &mut self,
        source: &'a Value,
        destination: &'a Value,
        location: &mut Vec<PathSegment>,
    ) -> Result<(), ExError> {
        let source_required = required_of(source);
        let destination_required = required_of(destination);
        let (sv, dv) = (source.get("required"), destination.get("required"));
        if destination_required.difference(&source_required).next().is_some() {
            self.push(SchemaChangeKind::RemovedValues, location, "required", sv, dv);
        }
        if source_required.difference(&destination_required).next().is_some() {
            self.push(SchemaChangeKind::AddedValues, location, "required", sv, dv);
        }

        let source_closed = is_closed(source);
        let destination_closed = is_closed(destination);
        let (sv, dv) = (
            source.get("additionalProperties"),
            destination.get("additionalProperties"),
        );
        match (source_closed, destination_closed) {
            (true, false) => {
                self.push(SchemaChangeKind::AddedValues, location, "additionalProperties", sv, dv)
            }
            (false, true) => {
                self.push(SchemaChangeKind::RemovedValues, location, "additionalProperties", sv, dv)
            }
            _ => {}
        }

        static EMPTY: std::sync::LazyLock<Map<String, Value>> = std::sync::LazyLock::new(Map::new);
        let source_properties = properties_of(source).unwrap_or(&EMPTY);
        let destination_properties = properties_of(destination).unwrap_or(&EMPTY);

        location.push(PathSegment::from("properties"));
        for (name, source_schema) in source_properties {
            match destination_properties.get(name) {
                Some(destination_schema) => {
                    location.push(PathSegment::from(name.as_str()));
                    let result = self.node(source_schema, destination_schema, location);
                    location.pop();
                    if let Err(err) = result {
                        location.pop();
                        return Err(err);
                    }
                }
                None => {
                    // A dropped declaration on an open object lifts its constraint.
                    let kind = if destination_closed {
                        SchemaChangeKind::RemovedValues
                    } else {
                        SchemaChangeKind::AddedValues
                    };
                    self.push(kind, location, name, Some(source_schema), None);
                }
            }
        }
        for (name, destination_schema) in destination_properties {
            if source_properties.contains_key(name) {
                continue;
            }
            let kind = if source_closed {
                SchemaChangeKind::AddedValues
            } else {
                SchemaChangeKind::RemovedValues
            };
            self.push(kind, location, name, None, Some(destination_schema));
        }
        location.pop();
        Ok(())
    }

    fn compare_sets(
        &mut self,
        location: &[PathSegment],
        keyword: &str,
        source: &BTreeSet<&str>,
        destination: &BTreeSet<&str>,
        source_value: Option<&Value>,
        destination_value: Option<&Value>,
    ) {
        if destination.difference(source).next().is_some() {
            self.push(
                SchemaChangeKind::AddedValues,
                location,
                keyword,
                source_value,
                destination_value,
            );
        }
        if source.difference(destination).next().is_some() {
            self.push(
                SchemaChangeKind::RemovedValues,
                location,
                keyword,
                source_value,
                destination_value,
            );
        }
    }

    fn push(
        &mut self,
        kind: SchemaChangeKind,
        location: &[PathSegment],
        keyword: &str,
        source_value: Option<&Value>,
        destination_value: Option<&Value>,
    ) {
        let mut location = location.to_vec();
        location.push(PathSegment::from(keyword));
        self.out.push(SchemaDifference {
            kind,
            location,
            source_value: source_value.cloned(),
            destination_value: destination_value.cloned(),
        });
    }
}

fn resolve<'v>(value: &'v Value, root: &'v Value, location: &[PathSegment]) -> Result<&'v Value, ExError> {
    resolver::resolve(value, root).map_err(|err| {
        let location = location
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".");
        ExError::from(err).with_op("schema_diff").with_pointer(location)
    })
}

/// Types a schema admits; a missing `type` admits all of them
fn types_of(schema: &Value) -> BTreeSet<&str> {
    match schema {
        Value::Bool(false) => BTreeSet::new(),
        Value::Object(map) => match map.get("type") {
            Some(Value::String(t)) => BTreeSet::from([t.as_str()]),
            Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
            _ => ALL_TYPES.into_iter().collect(),
        },
        _ => ALL_TYPES.into_iter().collect(),
    }
}

fn enum_of(schema: &Value) -> Option<&Vec<Value>> {
    schema.get("enum")?.as_array()
}

fn required_of(schema: &Value) -> BTreeSet<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn properties_of(schema: &Value) -> Option<&Map<String, Value>> {
    schema.get("properties")?.as_object()
}

fn is_closed(schema: &Value) -> bool {
    schema.get("additionalProperties") == Some(&Value::Bool(false))
}

/// Wrap a differ failure with the body location it happened at
pub(crate) fn schema_diff_error(location: &str, err: ExError) -> ExError {
    ExError::new(ExErrorKind::SchemaDiff)
        .with_op("find_differences")
        .with_pointer(location)
        .with_message("schema differ failed")
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diff(source: Value, destination: Value) -> Vec<SchemaDifference> {
        StructuralSchemaDiffer.compare(&source, &destination).unwrap()
    }

    fn kinds(diffs: &[SchemaDifference]) -> Vec<(SchemaChangeKind, String)> {
        diffs
            .iter()
            .map(|d| {
                let loc = d
                    .location
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(".");
                (d.kind, loc)
            })
            .collect()
    }

    #[test]
    fn test_identical_schemas_have_no_differences() {
        let schema = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"]
        });
        assert!(diff(schema.clone(), schema).is_empty());
    }

    #[test]
    fn test_type_widening_and_narrowing() {
        let d = diff(json!({"type": "string"}), json!({"type": ["string", "null"]}));
        assert_eq!(kinds(&d), vec![(SchemaChangeKind::AddedValues, "type".to_string())]);

        let d = diff(json!({"type": "string"}), json!({"type": "integer"}));
        assert_eq!(
            kinds(&d),
            vec![
                (SchemaChangeKind::AddedValues, "type".to_string()),
                (SchemaChangeKind::RemovedValues, "type".to_string()),
            ]
        );
    }

    #[test]
    fn test_nested_property_change_carries_location() {
        let d = diff(
            json!({"type": "object", "properties": {"age": {"type": "integer"}}}),
            json!({"type": "object", "properties": {"age": {"type": "string"}}}),
        );
        assert_eq!(d.len(), 2);
        assert!(d
            .iter()
            .all(|x| kinds(std::slice::from_ref(x))[0].1 == "properties.age.type"));
    }

    #[test]
    fn test_newly_required_property_removes_values() {
        let d = diff(
            json!({"type": "object", "required": []}),
            json!({"type": "object", "required": ["id"]}),
        );
        assert_eq!(kinds(&d), vec![(SchemaChangeKind::RemovedValues, "required".to_string())]);
    }

    #[test]
    fn test_enum_changes() {
        let d = diff(json!({"enum": ["a", "b"]}), json!({"enum": ["a"]}));
        assert_eq!(kinds(&d), vec![(SchemaChangeKind::RemovedValues, "enum".to_string())]);
    }

    #[test]
    fn test_refs_resolve_against_attached_definitions() {
        let source = json!({
            "$ref": "#/definitions/Pet",
            "definitions": {"Pet": {"type": "object", "properties": {"id": {"type": "integer"}}}}
        });
        let destination = json!({
            "$ref": "#/definitions/Pet",
            "definitions": {"Pet": {"type": "object", "properties": {"id": {"type": "string"}}}}
        });
        let d = diff(source, destination);
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn test_recursive_schema_terminates() {
        let recursive = json!({
            "$ref": "#/definitions/Node",
            "definitions": {
                "Node": {
                    "type": "object",
                    "properties": {"next": {"$ref": "#/definitions/Node"}}
                }
            }
        });
        assert!(diff(recursive.clone(), recursive).is_empty());
    }

    #[test]
    fn test_unresolvable_ref_is_an_error() {
        let err = StructuralSchemaDiffer
            .compare(&json!({"$ref": "#/definitions/Missing"}), &json!({}))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::UnresolvableReference);
        assert_eq!(err.op(), Some("schema_diff"));
    }

    #[test]
    fn test_noop_differ_reports_nothing() {
        let d = NoopSchemaDiffer
            .compare(&json!({"type": "string"}), &json!({"type": "integer"}))
            .unwrap();
        assert!(d.is_empty());
    }
}

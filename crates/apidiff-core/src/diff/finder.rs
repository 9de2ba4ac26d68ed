//! Difference finder.
//!
//! Walks two canonical specs side by side and emits [`DiffEntry`] values in
//! traversal order:
//!
//! 1. `info` scalars, then `info` extensions
//! 2. `basePath`, `host`, `swagger`, `openapi`, then `schemes`
//! 3. top-level extensions
//! 4. paths in source order (removed or recursed into), then added paths
//!
//! Within a path, source methods come first (removed or recursed into), then
//! added methods. Within an operation: request body, response bodies, response
//! headers, then status codes.
//!
//! Schema comparisons are queued in place and run after the walk, inline or on
//! a rayon pool, and their entries are spliced back into their slot so
//! the output order never depends on scheduling.

use crate::canonical::model::{
    AnnotatedProperty, CanonicalSpec, ExtensionProperty, ParsedInfo, ParsedOperation,
    ParsedPathItem, ParsedRequestBody, ParsedResponse,
};
use crate::config::EngineConfig;
use crate::diff::model::{DiffAction, DiffEntity, DiffEntry, DiffSource, EntityDetails};
use crate::diff::schema_diff::{
    schema_diff_error, SchemaChangeKind, SchemaDiffer, SchemaDifference,
};
use crate::errors::{ExError, ExErrorKind};
use crate::path_matcher::match_path_templates;
use serde_json::Value;
use rayon::prelude::*;
use std::collections::HashMap;

/// Compute every difference between two canonical specs.
///
/// # Errors
///
/// `SchemaDiff` wrapping the first failure reported by `differ`, in traversal
/// order. No partial result is returned.
pub fn find_differences(
    source: &CanonicalSpec,
    destination: &CanonicalSpec,
    differ: &dyn SchemaDiffer,
    config: &EngineConfig,
) -> Result<Vec<DiffEntry>, ExError> {
    let mut finder = Finder::default();
    finder.info(&source.info, &destination.info);
    finder.property(DiffEntity::BasePath, &source.base_path, &destination.base_path);
    finder.property(DiffEntity::Host, &source.host, &destination.host);
    finder.property(DiffEntity::Swagger, &source.swagger, &destination.swagger);
    finder.property(DiffEntity::Openapi, &source.openapi, &destination.openapi);
    finder.set_property(DiffEntity::Schemes, &source.schemes, &destination.schemes);
    finder.extensions(&source.x_properties, &destination.x_properties);
    finder.paths(source, destination);

    let task_count = finder.task_count();
    let entries = finder.finish(differ, config.schema_diff_parallelism)?;

    tracing::debug!(
        component = module_path!(),
        entry_count = entries.len(),
        schema_task_count = task_count,
        "differences found"
    );

    Ok(entries)
}

/// A position in the output: either finished entries or a pending schema diff.
enum Slot<'s> {
    Entries(Vec<DiffEntry>),
    Schema(SchemaTask<'s>),
}

struct SchemaTask<'s> {
    entity: DiffEntity,
    source: &'s AnnotatedProperty,
    destination: &'s AnnotatedProperty,
}

impl SchemaTask<'_> {
    fn run(&self, differ: &dyn SchemaDiffer) -> Result<Vec<DiffEntry>, ExError> {
        let (Some(source), Some(destination)) = (&self.source.value, &self.destination.value)
        else {
            return Ok(Vec::new());
        };
        let differences = differ
            .compare(source, destination)
            .map_err(|err| schema_diff_error(&self.source.original_path.to_location(), err))?;
        Ok(differences.into_iter().map(|d| self.entry(d)).collect())
    }

    fn entry(&self, difference: SchemaDifference) -> DiffEntry {
        let action = match difference.kind {
            SchemaChangeKind::AddedValues => DiffAction::Add,
            SchemaChangeKind::RemovedValues => DiffAction::Remove,
        };
        DiffEntry::new(
            self.entity,
            action,
            DiffSource::JsonSchemaDiff,
            Some(EntityDetails::new(
                self.source.original_path.join(&difference.location),
                difference.source_value,
            )),
            Some(EntityDetails::new(
                self.destination.original_path.join(&difference.location),
                difference.destination_value,
            )),
        )
    }
}

#[derive(Default)]
struct Finder<'s> {
    slots: Vec<Slot<'s>>,
}

impl<'s> Finder<'s> {
    fn emit(&mut self, entry: DiffEntry) {
        match self.slots.last_mut() {
            Some(Slot::Entries(entries)) => entries.push(entry),
            _ => self.slots.push(Slot::Entries(vec![entry])),
        }
    }

    fn add(&mut self, entity: DiffEntity, destination: &AnnotatedProperty) {
        self.emit(DiffEntry::new(
            entity,
            DiffAction::Add,
            DiffSource::OpenApiDiff,
            None,
            Some(destination.into()),
        ));
    }

    fn remove(&mut self, entity: DiffEntity, source: &AnnotatedProperty) {
        self.emit(DiffEntry::new(
            entity,
            DiffAction::Remove,
            DiffSource::OpenApiDiff,
            Some(source.into()),
            None,
        ));
    }

    /// Scalar rule: presence changes are add/remove, a value change is both
    fn property(
        &mut self,
        entity: DiffEntity,
        source: &AnnotatedProperty,
        destination: &AnnotatedProperty,
    ) {
        match (&source.value, &destination.value) {
            (None, None) => {}
            (None, Some(_)) => self.add(entity, destination),
            (Some(_), None) => self.remove(entity, source),
            (Some(a), Some(b)) if a == b => {}
            (Some(_), Some(_)) => {
                for action in [DiffAction::Add, DiffAction::Remove] {
                    self.emit(DiffEntry::new(
                        entity,
                        action,
                        DiffSource::OpenApiDiff,
                        Some(source.into()),
                        Some(destination.into()),
                    ));
                }
            }
        }
    }

    /// Set rule: element membership only; order and duplicates are ignored
    fn set_property(
        &mut self,
        entity: DiffEntity,
        source: &AnnotatedProperty,
        destination: &AnnotatedProperty,
    ) {
        let (Some(Value::Array(source_items)), Some(Value::Array(destination_items))) =
            (&source.value, &destination.value)
        else {
            self.property(entity, source, destination);
            return;
        };

        for (index, item) in distinct(destination_items) {
            if !source_items.contains(item) {
                self.emit(DiffEntry::new(
                    entity,
                    DiffAction::ItemAdd,
                    DiffSource::OpenApiDiff,
                    None,
                    Some(EntityDetails::new(
                        destination.original_path.child(index),
                        Some(item.clone()),
                    )),
                ));
            }
        }
        for (index, item) in distinct(source_items) {
            if !destination_items.contains(item) {
                self.emit(DiffEntry::new(
                    entity,
                    DiffAction::ItemRemove,
                    DiffSource::OpenApiDiff,
                    Some(EntityDetails::new(
                        source.original_path.child(index),
                        Some(item.clone()),
                    )),
                    None,
                ));
            }
        }
    }

    /// Extensions pair by name and always land in `unclassified`
    fn extensions(&mut self, source: &[ExtensionProperty], destination: &[ExtensionProperty]) {
        for s in source {
            match destination.iter().find(|d| d.name == s.name) {
                Some(d) => self.property(DiffEntity::Unclassified, &s.property, &d.property),
                None => self.remove(DiffEntity::Unclassified, &s.property),
            }
        }
        for d in destination {
            if !source.iter().any(|s| s.name == d.name) {
                self.add(DiffEntity::Unclassified, &d.property);
            }
        }
    }

    fn info(&mut self, source: &ParsedInfo, destination: &ParsedInfo) {
        self.property(DiffEntity::InfoTitle, &source.title, &destination.title);
        self.property(DiffEntity::InfoDescription, &source.description, &destination.description);
        self.property(
            DiffEntity::InfoTermsOfService,
            &source.terms_of_service,
            &destination.terms_of_service,
        );
        self.property(DiffEntity::InfoVersion, &source.version, &destination.version);
        self.property(
            DiffEntity::InfoContactName,
            &source.contact.name,
            &destination.contact.name,
        );
        self.property(
            DiffEntity::InfoContactEmail,
            &source.contact.email,
            &destination.contact.email,
        );
        self.property(DiffEntity::InfoContactUrl, &source.contact.url, &destination.contact.url);
        self.property(
            DiffEntity::InfoLicenseName,
            &source.license.name,
            &destination.license.name,
        );
        self.property(DiffEntity::InfoLicenseUrl, &source.license.url, &destination.license.url);
        self.extensions(&source.x_properties, &destination.x_properties);
    }

    fn paths(&mut self, source: &'s CanonicalSpec, destination: &'s CanonicalSpec) {
        let matches = match_path_templates(&source.path_names(), &destination.path_names());
        let partners: HashMap<&str, &str> = matches
            .matched
            .iter()
            .map(|(s, d)| (s.as_str(), d.as_str()))
            .collect();

        for item in &source.paths {
            let partner = partners
                .get(item.path_name.as_str())
                .and_then(|name| destination.path(name));
            match partner {
                Some(other) => self.path_item(item, other),
                None => self.remove(DiffEntity::Path, &item.property),
            }
        }
        for name in &matches.added {
            if let Some(item) = destination.path(name) {
                self.add(DiffEntity::Path, &item.property);
            }
        }
    }

    fn path_item(&mut self, source: &'s ParsedPathItem, destination: &'s ParsedPathItem) {
        for operation in &source.operations {
            match destination.operation(operation.method) {
                Some(other) => self.operation(operation, other),
                None => self.remove(DiffEntity::Method, &operation.property),
            }
        }
        for operation in &destination.operations {
            if source.operation(operation.method).is_none() {
                self.add(DiffEntity::Method, &operation.property);
            }
        }
    }

    fn operation(&mut self, source: &'s ParsedOperation, destination: &'s ParsedOperation) {
        self.request_body(&source.request_body, &destination.request_body);

        let matched: Vec<(&'s ParsedResponse, &'s ParsedResponse)> = source
            .responses
            .iter()
            .filter_map(|s| {
                destination
                    .responses
                    .iter()
                    .find(|d| d.status_code == s.status_code)
                    .map(|d| (s, d))
            })
            .collect();

        for (s, d) in &matched {
            self.response_body(s, d);
        }
        for (s, d) in &matched {
            self.headers(s, d);
        }

        for s in &source.responses {
            if !destination.responses.iter().any(|d| d.status_code == s.status_code) {
                self.remove(DiffEntity::ResponseStatus, &s.property);
            }
        }
        for d in &destination.responses {
            if !source.responses.iter().any(|s| s.status_code == d.status_code) {
                self.add(DiffEntity::ResponseStatus, &d.property);
            }
        }
    }

    fn request_body(&mut self, source: &'s ParsedRequestBody, destination: &'s ParsedRequestBody) {
        match (source.property.is_present(), destination.property.is_present()) {
            (false, true) => self.add(DiffEntity::RequestBody, &destination.property),
            (true, false) => self.remove(DiffEntity::RequestBody, &source.property),
            (true, true) => {
                if let (Some(s), Some(d)) = (&source.json_schema, &destination.json_schema) {
                    self.schema(DiffEntity::RequestBodyScope, s, d);
                }
            }
            (false, false) => {}
        }
    }

    fn response_body(&mut self, source: &'s ParsedResponse, destination: &'s ParsedResponse) {
        match (&source.json_schema, &destination.json_schema) {
            (None, Some(d)) => self.add(DiffEntity::ResponseBody, d),
            (Some(s), None) => self.remove(DiffEntity::ResponseBody, s),
            (Some(s), Some(d)) => self.schema(DiffEntity::ResponseBodyScope, s, d),
            (None, None) => {}
        }
    }

    /// Headers are compared by presence of their lower-cased names
    fn headers(&mut self, source: &ParsedResponse, destination: &ParsedResponse) {
        for s in &source.headers {
            if !destination.headers.iter().any(|d| d.name == s.name) {
                self.remove(DiffEntity::ResponseHeader, &s.property);
            }
        }
        for d in &destination.headers {
            if !source.headers.iter().any(|s| s.name == d.name) {
                self.add(DiffEntity::ResponseHeader, &d.property);
            }
        }
    }

    fn schema(
        &mut self,
        entity: DiffEntity,
        source: &'s AnnotatedProperty,
        destination: &'s AnnotatedProperty,
    ) {
        self.slots.push(Slot::Schema(SchemaTask {
            entity,
            source,
            destination,
        }));
    }

    fn task_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Schema(_)))
            .count()
    }

    fn finish(self, differ: &dyn SchemaDiffer, parallelism: usize) -> Result<Vec<DiffEntry>, ExError> {
        let mut results = {
            let tasks: Vec<&SchemaTask<'s>> = self
                .slots
                .iter()
                .filter_map(|slot| match slot {
                    Slot::Schema(task) => Some(task),
                    Slot::Entries(_) => None,
                })
                .collect();
            run_tasks(&tasks, differ, parallelism)?.into_iter()
        };

        let mut entries = Vec::new();
        for slot in self.slots {
            match slot {
                Slot::Entries(batch) => entries.extend(batch),
                Slot::Schema(_) => entries.extend(results.next().unwrap_or_default()),
            }
        }
        Ok(entries)
    }
}

/// Items with their first index, skipping repeats
fn distinct(items: &[Value]) -> impl Iterator<Item = (usize, &Value)> {
    items
        .iter()
        .enumerate()
        .filter(move |(index, item)| !items[..*index].contains(*item))
}

/// Run schema tasks, returning their entries in task order.
///
/// With more than one worker the tasks run on a dedicated rayon pool. Every
/// result is kept in task order before the first error is taken, so the
/// reported failure does not depend on scheduling.
fn run_tasks(
    tasks: &[&SchemaTask<'_>],
    differ: &dyn SchemaDiffer,
    parallelism: usize,
) -> Result<Vec<Vec<DiffEntry>>, ExError> {
    if parallelism <= 1 || tasks.len() <= 1 {
        return tasks.iter().map(|task| task.run(differ)).collect();
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .build()
        .map_err(|e| {
            ExError::new(ExErrorKind::Internal)
                .with_op("find_differences")
                .with_message(format!("cannot start schema diff workers: {}", e))
        })?;

    let results: Vec<Result<Vec<DiffEntry>, ExError>> =
        pool.install(|| tasks.par_iter().map(|task| task.run(differ)).collect());
    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::builder::build_canonical_spec;
    use crate::canonical::model::SpecDocument;
    use crate::diff::schema_diff::{NoopSchemaDiffer, StructuralSchemaDiffer};
    use serde_json::json;

    fn canonical(content: Value) -> CanonicalSpec {
        let document = SpecDocument::detect("test.json", content).unwrap();
        build_canonical_spec(&document, &EngineConfig::default()).unwrap()
    }

    fn codes(entries: &[DiffEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.code.as_str()).collect()
    }

    fn find(source: Value, destination: Value) -> Vec<DiffEntry> {
        find_differences(
            &canonical(source),
            &canonical(destination),
            &NoopSchemaDiffer,
            &EngineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_value_change_is_add_remove_pair() {
        let entries = find(
            json!({"swagger": "2.0", "info": {"title": "A"}, "paths": {}}),
            json!({"swagger": "2.0", "info": {"title": "B"}, "paths": {}}),
        );
        assert_eq!(codes(&entries), vec!["info.title.add", "info.title.remove"]);
        assert_eq!(
            entries[0].destination_details.as_ref().unwrap().value,
            Some(json!("B"))
        );
        assert_eq!(
            entries[1].source_details.as_ref().unwrap().value,
            Some(json!("A"))
        );
    }

    #[test]
    fn test_schemes_compare_as_sets() {
        let entries = find(
            json!({"swagger": "2.0", "schemes": ["http", "https"], "paths": {}}),
            json!({"swagger": "2.0", "schemes": ["https", "http", "https"], "paths": {}}),
        );
        assert!(entries.is_empty());

        let entries = find(
            json!({"swagger": "2.0", "schemes": ["http"], "paths": {}}),
            json!({"swagger": "2.0", "schemes": ["https"], "paths": {}}),
        );
        assert_eq!(codes(&entries), vec!["schemes.item.add", "schemes.item.remove"]);
        assert_eq!(
            entries[0].destination_details.as_ref().unwrap().location,
            "schemes.0"
        );
    }

    #[test]
    fn test_extensions_are_unclassified() {
        let entries = find(
            json!({"swagger": "2.0", "x-owner": "a", "x-gone": 1, "paths": {}}),
            json!({"swagger": "2.0", "x-owner": "b", "x-new": 2, "paths": {}}),
        );
        assert_eq!(
            codes(&entries),
            vec![
                "unclassified.add",
                "unclassified.remove",
                "unclassified.remove",
                "unclassified.add"
            ]
        );
    }

    #[test]
    fn test_traversal_order_for_paths_and_methods() {
        let entries = find(
            json!({"swagger": "2.0", "paths": {
                "/a": {"get": {"responses": {}}, "put": {"responses": {}}},
                "/b": {"get": {"responses": {}}}
            }}),
            json!({"swagger": "2.0", "paths": {
                "/c": {"get": {"responses": {}}},
                "/a": {"get": {"responses": {}}, "post": {"responses": {}}}
            }}),
        );
        assert_eq!(
            codes(&entries),
            vec!["method.remove", "method.add", "path.remove", "path.add"]
        );
        assert_eq!(
            entries[0].source_details.as_ref().unwrap().location,
            "paths./a.put"
        );
    }

    #[test]
    fn test_renamed_parameter_path_is_the_same_path() {
        let entries = find(
            json!({"swagger": "2.0", "paths": {"/pets/{id}": {"get": {"responses": {}}}}}),
            json!({"swagger": "2.0", "paths": {"/pets/{petId}": {"get": {"responses": {}}}}}),
        );
        assert!(entries.is_empty());
    }

    #[test]
    fn test_status_and_header_presence() {
        let entries = find(
            json!({"swagger": "2.0", "paths": {"/a": {"get": {"responses": {
                "200": {"description": "ok", "headers": {"X-Rate": {"type": "integer"}}},
                "404": {"description": "missing"}
            }}}}}),
            json!({"swagger": "2.0", "paths": {"/a": {"get": {"responses": {
                "200": {"description": "ok", "headers": {
                    "x-rate": {"type": "string"},
                    "X-Trace": {"type": "string"},
                    "Content-Type": {"type": "string"}
                }},
                "500": {"description": "boom"}
            }}}}}),
        );
        assert_eq!(
            codes(&entries),
            vec![
                "response.header.add",
                "response.status.remove",
                "response.status.add"
            ]
        );
    }

    #[test]
    fn test_request_body_presence() {
        let with_body = json!({"swagger": "2.0", "paths": {"/a": {"post": {
            "parameters": [{"in": "body", "name": "b", "schema": {"type": "object"}}],
            "responses": {}
        }}}});
        let without_body = json!({"swagger": "2.0", "paths": {"/a": {"post": {"responses": {}}}}});
        assert_eq!(
            codes(&find(without_body.clone(), with_body.clone())),
            vec!["request.body.add"]
        );
        assert_eq!(codes(&find(with_body, without_body)), vec!["request.body.remove"]);
    }

    struct FailingDiffer;

    impl SchemaDiffer for FailingDiffer {
        fn compare(&self, _: &Value, _: &Value) -> Result<Vec<SchemaDifference>, ExError> {
            Err(ExError::new(ExErrorKind::Internal).with_message("differ down"))
        }
    }

    fn schema_doc(status_types: &[(&str, &str)]) -> Value {
        let responses: serde_json::Map<String, Value> = status_types
            .iter()
            .map(|(status, ty)| {
                (
                    status.to_string(),
                    json!({"description": "r", "schema": {"type": ty}}),
                )
            })
            .collect();
        json!({"swagger": "2.0", "paths": {"/a": {"get": {"responses": responses}}}})
    }

    #[test]
    fn test_schema_entries_are_spliced_in_order_regardless_of_parallelism() {
        let source = canonical(schema_doc(&[("200", "string"), ("201", "string"), ("202", "string")]));
        let destination = canonical(schema_doc(&[("200", "integer"), ("201", "string"), ("202", "boolean")]));

        let sequential = find_differences(
            &source,
            &destination,
            &StructuralSchemaDiffer,
            &EngineConfig::default(),
        )
        .unwrap();
        let parallel = find_differences(
            &source,
            &destination,
            &StructuralSchemaDiffer,
            &EngineConfig {
                schema_diff_parallelism: 4,
                ..EngineConfig::default()
            },
        )
        .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(sequential.len(), 4);
        assert!(sequential
            .iter()
            .all(|e| e.source == DiffSource::JsonSchemaDiff && e.entity == DiffEntity::ResponseBodyScope));
        assert_eq!(
            sequential[0].source_details.as_ref().unwrap().location,
            "paths./a.get.responses.200.schema.type"
        );
        assert_eq!(
            sequential[3].source_details.as_ref().unwrap().location,
            "paths./a.get.responses.202.schema.type"
        );
    }

    #[test]
    fn test_differ_failure_aborts_with_location() {
        let source = canonical(schema_doc(&[("200", "string")]));
        let destination = canonical(schema_doc(&[("200", "integer")]));
        for parallelism in [1, 3] {
            let err = find_differences(
                &source,
                &destination,
                &FailingDiffer,
                &EngineConfig {
                    schema_diff_parallelism: parallelism,
                    ..EngineConfig::default()
                },
            )
            .unwrap_err();
            assert_eq!(err.kind(), ExErrorKind::SchemaDiff);
            assert_eq!(err.pointer(), Some("paths./a.get.responses.200.schema"));
        }
    }

    #[test]
    fn test_pooled_failures_report_the_first_task_in_order() {
        let source = canonical(schema_doc(&[("200", "string"), ("201", "string"), ("202", "string")]));
        let destination = canonical(schema_doc(&[("200", "integer"), ("201", "number"), ("202", "boolean")]));
        for parallelism in [2, 4, 8] {
            let err = find_differences(
                &source,
                &destination,
                &FailingDiffer,
                &EngineConfig {
                    schema_diff_parallelism: parallelism,
                    ..EngineConfig::default()
                },
            )
            .unwrap_err();
            assert_eq!(err.kind(), ExErrorKind::SchemaDiff);
            assert_eq!(err.pointer(), Some("paths./a.get.responses.200.schema"));
            assert_eq!(
                err.source_error().map(|e| e.message().to_string()),
                Some("differ down".to_string())
            );
        }
    }
}

//! Swagger 2.0 extraction rules.
//!
//! Request bodies are `in: body` parameters; response schemas sit directly
//! under the response object; reusable schemas live in `definitions`.

use crate::canonical::builder::{absent_request_body, BuildContext};
use crate::canonical::model::{AnnotatedProperty, OriginalPath, ParsedRequestBody};
use crate::errors::{ApiDiffError, Result};
use serde_json::{Map, Value};

pub(crate) fn reference_sources(document: &Value) -> Option<(&'static str, &Value)> {
    document.get("definitions").map(|d| ("definitions", d))
}

/// The body parameter of an operation, falling back to the path-level parameters.
pub(crate) fn request_body<'a>(
    ctx: &BuildContext<'a>,
    operation: &'a Map<String, Value>,
    path_item: &'a Value,
    item_path: &OriginalPath,
    operation_path: &OriginalPath,
) -> Result<ParsedRequestBody> {
    let found = match find_body_parameter(
        ctx,
        operation.get("parameters"),
        &operation_path.child("parameters"),
    )? {
        Some(found) => Some(found),
        None => find_body_parameter(
            ctx,
            path_item.get("parameters"),
            &item_path.child("parameters"),
        )?,
    };

    let Some((parameter, path)) = found else {
        return Ok(absent_request_body(operation_path.child("parameters")));
    };

    let json_schema = parameter
        .get("schema")
        .map(|schema| ctx.json_schema(schema, path.child("schema")));

    Ok(ParsedRequestBody {
        property: AnnotatedProperty::present(path, parameter.clone()),
        json_schema,
    })
}

fn find_body_parameter<'a>(
    ctx: &BuildContext<'a>,
    parameters: Option<&'a Value>,
    base: &OriginalPath,
) -> Result<Option<(&'a Value, OriginalPath)>> {
    let Some(parameters) = parameters else {
        return Ok(None);
    };
    let parameters = parameters
        .as_array()
        .ok_or_else(|| ApiDiffError::InvalidDocument {
            location: base.to_location(),
            reason: "parameters must be an array".to_string(),
        })?;

    for (index, raw) in parameters.iter().enumerate() {
        let parameter = ctx.resolve(raw)?;
        if parameter.get("in").and_then(Value::as_str) == Some("body") {
            return Ok(Some((parameter, base.child(index))));
        }
    }
    Ok(None)
}

pub(crate) fn response_schema(
    ctx: &BuildContext<'_>,
    response: &Map<String, Value>,
    response_path: &OriginalPath,
) -> Option<AnnotatedProperty> {
    response
        .get("schema")
        .map(|schema| ctx.json_schema(schema, response_path.child("schema")))
}

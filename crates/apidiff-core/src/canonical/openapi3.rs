//! OpenAPI 3.x extraction rules.
//!
//! Bodies are media-type maps; only `application/json` carries a schema the
//! engine compares. Reusable schemas live under `components`.

use crate::canonical::builder::{absent_request_body, expect_object, json_media_type, BuildContext};
use crate::canonical::model::{AnnotatedProperty, OriginalPath, ParsedRequestBody};
use crate::errors::Result;
use serde_json::{Map, Value};

pub(crate) fn reference_sources(document: &Value) -> Option<(&'static str, &Value)> {
    document.get("components").map(|c| ("components", c))
}

pub(crate) fn request_body<'a>(
    ctx: &BuildContext<'a>,
    operation: &'a Map<String, Value>,
    operation_path: &OriginalPath,
) -> Result<ParsedRequestBody> {
    let path = operation_path.child("requestBody");
    let Some(raw) = operation.get("requestBody") else {
        return Ok(absent_request_body(path));
    };

    let body = ctx.resolve(raw)?;
    let body_map = expect_object(body, &path, "requestBody")?;
    let json_schema = json_content_schema(ctx, body_map, &path)?;

    Ok(ParsedRequestBody {
        property: AnnotatedProperty::present(path, body.clone()),
        json_schema,
    })
}

pub(crate) fn response_schema(
    ctx: &BuildContext<'_>,
    response: &Map<String, Value>,
    response_path: &OriginalPath,
) -> Result<Option<AnnotatedProperty>> {
    json_content_schema(ctx, response, response_path)
}

/// `content.application/json.schema` of a request body or response
fn json_content_schema(
    ctx: &BuildContext<'_>,
    owner: &Map<String, Value>,
    owner_path: &OriginalPath,
) -> Result<Option<AnnotatedProperty>> {
    let Some(content) = owner.get("content") else {
        return Ok(None);
    };
    let content_path = owner_path.child("content");
    let content = expect_object(content, &content_path, "content")?;

    Ok(json_media_type(content).and_then(|(media_type, media)| {
        media.get("schema").map(|schema| {
            ctx.json_schema(schema, content_path.child(media_type).child("schema"))
        })
    }))
}

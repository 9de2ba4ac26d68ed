//! Internal reference resolution.
//!
//! Resolves `{"$ref": "#/..."}` objects against the document they came from.
//! Only the references on the *active* resolution path are tracked, so one
//! definition reused from several places is fine while `A -> B -> A` fails
//! with [`ApiDiffError::CircularReference`].

use crate::errors::{ApiDiffError, Result};
use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Key that marks a reference object
pub const REF_KEY: &str = "$ref";

/// Return the reference string if `value` is a reference object
pub fn reference_of(value: &Value) -> Option<&str> {
    value.as_object()?.get(REF_KEY)?.as_str()
}

/// Look up a single `#/...` reference in `document` without following chains.
///
/// # Errors
///
/// `UnresolvableReference` for external references, undecodable fragments, or
/// pointers that do not exist in the document.
pub fn lookup_reference<'a>(document: &'a Value, reference: &str) -> Result<&'a Value> {
    let fragment = reference
        .strip_prefix('#')
        .ok_or_else(|| ApiDiffError::UnresolvableReference {
            reference: reference.to_string(),
            reason: "only internal references starting with `#` are supported".to_string(),
        })?;

    let pointer = percent_decode_str(fragment).decode_utf8().map_err(|e| {
        ApiDiffError::UnresolvableReference {
            reference: reference.to_string(),
            reason: format!("fragment is not valid UTF-8 after decoding: {}", e),
        }
    })?;

    if pointer.is_empty() {
        return Ok(document);
    }
    if !pointer.starts_with('/') {
        return Err(ApiDiffError::UnresolvableReference {
            reference: reference.to_string(),
            reason: "fragment must be empty or start with `/`".to_string(),
        });
    }

    document
        .pointer(&pointer)
        .ok_or_else(|| ApiDiffError::UnresolvableReference {
            reference: reference.to_string(),
            reason: "no value exists at this location".to_string(),
        })
}

/// Resolve `value` if it is a reference, following chained references.
///
/// Non-reference values are returned unchanged.
///
/// # Errors
///
/// - `CircularReference` if a reference reappears in the chain
/// - `UnresolvableReference` if any link of the chain cannot be looked up
pub fn resolve<'a>(value: &'a Value, document: &'a Value) -> Result<&'a Value> {
    let mut active: Vec<String> = Vec::new();
    follow_chain(value, document, &mut active)
}

fn follow_chain<'a>(
    value: &'a Value,
    document: &'a Value,
    active: &mut Vec<String>,
) -> Result<&'a Value> {
    let mut current = value;
    while let Some(reference) = reference_of(current) {
        enter(active, reference)?;
        current = lookup_reference(document, reference)?;
    }
    Ok(current)
}

/// Push a reference onto the active path, failing if it is already there
fn enter(active: &mut Vec<String>, reference: &str) -> Result<()> {
    if active.iter().any(|r| r == reference) {
        let mut chain = active.clone();
        chain.push(reference.to_string());
        return Err(ApiDiffError::CircularReference {
            reference: reference.to_string(),
            chain,
        });
    }
    active.push(reference.to_string());
    Ok(())
}

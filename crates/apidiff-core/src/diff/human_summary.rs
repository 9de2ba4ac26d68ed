//! Human-readable summary renderer for comparison outcomes.

use crate::diff::model::{DiffEntry, EntityDetails, Outcome};

/// Render a Markdown summary of an [`Outcome`].
///
/// Entries are grouped by severity in the order the finder produced them.
/// The summary is informational only; the structured outcome is authoritative.
pub fn render_human_summary(outcome: &Outcome) -> String {
    let mut out = String::new();

    // Header
    out.push_str("## API Comparison\n\n");

    let verdict = if outcome.breaking_differences_found {
        "Breaking changes found"
    } else {
        "No breaking changes"
    };
    out.push_str(&format!(
        "**Result**: {verdict}  \n**Breaking**: {}  \n**Non-breaking**: {}  \n**Unclassified**: {}\n\n",
        outcome.breaking_differences.len(),
        outcome.non_breaking_differences.len(),
        outcome.unclassified_differences.len(),
    ));

    // Identity
    if let Some(identity) = &outcome.identity {
        out.push_str("### Documents\n\n");
        out.push_str(&format!(
            "| | Location | Format | Digest |\n\
             |---|---|---|---|\n\
             | Source | `{}` | {} | `{}` |\n\
             | Destination | `{}` | {} | `{}` |\n\n",
            identity.source_location,
            identity.source_format,
            short(&identity.source_digest),
            identity.destination_location,
            identity.destination_format,
            short(&identity.destination_digest),
        ));
    }

    if outcome.total() == 0 {
        out.push_str("_No differences detected._\n");
        return out;
    }

    section(&mut out, "Breaking Differences", &outcome.breaking_differences);
    section(
        &mut out,
        "Non-breaking Differences",
        &outcome.non_breaking_differences,
    );
    section(
        &mut out,
        "Unclassified Differences",
        &outcome.unclassified_differences,
    );

    out
}

fn section(out: &mut String, title: &str, entries: &[DiffEntry]) {
    if entries.is_empty() {
        return;
    }
    out.push_str(&format!("### {} ({})\n\n", title, entries.len()));
    for entry in entries {
        out.push_str(&format!("- `{}`", entry.code));
        if let Some(details) = &entry.source_details {
            out.push_str(&format!("\n  - source: {}", describe(details)));
        }
        if let Some(details) = &entry.destination_details {
            out.push_str(&format!("\n  - destination: {}", describe(details)));
        }
        out.push('\n');
    }
    out.push('\n');
}

fn describe(details: &EntityDetails) -> String {
    match &details.value {
        Some(value) if is_compact(value) => format!("`{}` = `{}`", details.location, value),
        Some(_) => format!("`{}`", details.location),
        None => format!("`{}` (absent)", details.location),
    }
}

/// Scalars and short arrays are inlined; objects are too noisy
fn is_compact(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Object(_) => false,
        serde_json::Value::Array(items) => items.len() <= 8 && items.iter().all(|v| !v.is_object()),
        _ => true,
    }
}

fn short(digest: &str) -> &str {
    let end = digest.len().min(12);
    &digest[..end]
}

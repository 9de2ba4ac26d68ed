//! Document and configuration loading

use apidiff_core::{EngineConfig, SpecDocument};
use serde_json::Value;
use std::path::Path;

/// Read a JSON or YAML document and detect its format.
///
/// Files ending in `.json` are parsed as JSON; everything else as YAML, which
/// also accepts JSON.
pub fn load_document(path: &Path) -> Result<SpecDocument, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let content: Value = if is_json {
        serde_json::from_str(&text)
            .map_err(|e| format!("{} is not valid JSON: {}", path.display(), e))?
    } else {
        serde_yaml::from_str(&text)
            .map_err(|e| format!("{} is not valid YAML: {}", path.display(), e))?
    };

    let location = path.display().to_string();
    let document = SpecDocument::detect(location, content)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    tracing::debug!(
        component = module_path!(),
        spec_location = %document.location,
        spec_format = document.format.as_str(),
        "document loaded"
    );

    Ok(document)
}

/// Read engine configuration from a TOML file, or use the defaults.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
    let config: EngineConfig = toml::from_str(&text)
        .map_err(|e| format!("invalid config {}: {}", path.display(), e))?;
    Ok(config)
}

//! Generate JSON Schemas for the themekit engine config and settings record
//!
//! This binary generates JSON Schemas from Rust structs using schemars.
//!
//! Usage:
//!   cargo run --features dev-bins --bin generate_schema config > schemas/config.schema.json
//!   cargo run --features dev-bins --bin generate_schema settings > schemas/settings.schema.json
//!   cargo run --features dev-bins --bin generate_schema preset > schemas/preset.schema.json

use schemars::schema_for;
use serde_json::Value;
use std::env;
use themekit::a11y::{AccessibilitySettings, PresetRecord};
use themekit::EngineConfig;

/// Schema for one record kind, or the usage message for an unknown kind
fn schema_json(schema_type: &str) -> Result<Value, String> {
    let schema = match schema_type {
        "config" => schema_for!(EngineConfig),
        "settings" => schema_for!(AccessibilitySettings),
        "preset" => schema_for!(PresetRecord),
        other => {
            return Err(format!(
                "Unknown schema type: {}. Use 'config', 'settings' or 'preset'.",
                other
            ))
        }
    };
    let mut json =
        serde_json::to_value(&schema).map_err(|e| format!("Failed to serialize schema: {}", e))?;

    // Preview sources are validated, not stored, through the schema;
    // their default table only adds noise
    if let Some(sources) = json
        .get_mut("properties")
        .and_then(|properties| properties.get_mut("preview_sources"))
        .and_then(|sources| sources.as_object_mut())
    {
        sources.remove("default");
    }
    Ok(json)
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let schema_type = args.get(1).map(|s| s.as_str()).unwrap_or("config");

    let schema = match schema_json(schema_type) {
        Ok(schema) => schema,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    };
    let output = serde_json::to_string_pretty(&schema).expect("Failed to serialize schema");
    println!("{}", output);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_schema_drops_preview_default() {
        let schema = schema_json("config").unwrap();
        let sources = &schema["properties"]["preview_sources"];
        assert!(sources.is_object());
        assert!(sources.get("default").is_none());
    }

    #[test]
    fn test_settings_and_preset_schemas() {
        let settings = schema_json("settings").unwrap();
        assert!(settings["properties"].get("fontSize").is_some());
        let preset = schema_json("preset").unwrap();
        assert!(preset["properties"].is_object());
    }

    #[test]
    fn test_unknown_schema_type_is_an_error() {
        let err = schema_json("themes").unwrap_err();
        assert!(err.contains("Unknown schema type: themes"));
    }
}

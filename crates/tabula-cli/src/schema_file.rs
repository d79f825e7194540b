//! Schema files: the draft as TOML or JSON on disk.

use crate::error::{CliError, Result};
use std::fs;
use std::path::Path;
use tabula_domain::SchemaDefinition;

/// Read a schema definition; `.json` files are JSON, everything else TOML.
pub fn read_definition(path: &Path) -> Result<SchemaDefinition> {
    let contents = fs::read_to_string(path).map_err(|e| {
        CliError::InvalidInput(format!("Cannot read schema file {}: {}", path.display(), e))
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::from_str(&contents)?)
    } else {
        Ok(toml::from_str(&contents)?)
    }
}

/// Render a schema definition as TOML.
pub fn to_toml(definition: &SchemaDefinition) -> Result<String> {
    toml::to_string_pretty(definition)
        .map_err(|e| CliError::Config(format!("Failed to serialize schema: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_domain::SchemaDraft;
    use tempfile::TempDir;

    #[test]
    fn test_toml_round_trip_keeps_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.toml");
        let seeded = SchemaDraft::seeded().to_definition();
        fs::write(&path, to_toml(&seeded).unwrap()).unwrap();

        let loaded = read_definition(&path).unwrap();
        assert_eq!(loaded, seeded);
    }

    #[test]
    fn test_json_schema_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.JSON");
        fs::write(
            &path,
            r#"{"class_name": "X", "fields": [{"name": "a", "type": "Set[int]", "description": "d"}]}"#,
        )
        .unwrap();

        let loaded = read_definition(&path).unwrap();
        assert_eq!(loaded.class_name, "X");
        assert_eq!(loaded.fields[0].field_type, "Set[int]");
    }

    #[test]
    fn test_missing_file() {
        let result = read_definition(Path::new("/nonexistent/schema.toml"));
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}

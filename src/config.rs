use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DocgenError;
use crate::utils::is_plain_key;

pub const CONFIG_FILE_NAME: &str = ".docgenrc.json";

/// Tables that drive schema discovery and field interpretation.
///
/// Every table is passed explicitly to the resolver and renderers; nothing is looked
/// up from process-wide state.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Constructor names that create a schema (`new Schema(...)`).
    #[serde(default = "default_schema_constructors")]
    pub schema_constructors: Vec<String>,
    /// Namespaces the constructor may be reached through (`mongoose.Schema`).
    #[serde(default = "default_schema_namespaces")]
    pub schema_namespaces: Vec<String>,
    /// Key that holds a field's type inside a definition object.
    #[serde(default = "default_type_marker")]
    pub type_marker: String,
    /// Recognized field options, in rendering order.
    #[serde(default = "default_options")]
    pub options: Vec<String>,
    /// Global names that resolve to themselves as type labels.
    #[serde(default = "default_builtin_types")]
    pub builtin_types: Vec<String>,
}

fn default_schema_constructors() -> Vec<String> {
    vec!["Schema".to_string()]
}

fn default_schema_namespaces() -> Vec<String> {
    vec!["mongoose".to_string()]
}

fn default_type_marker() -> String {
    "type".to_string()
}

fn default_options() -> Vec<String> {
    [
        "ref",
        "required",
        "unique",
        "select",
        "default",
        "enum",
        "lowercase",
        "trim",
        "min",
        "max",
        "validate",
    ]
    .map(String::from)
    .to_vec()
}

fn default_builtin_types() -> Vec<String> {
    [
        "String", "Number", "Boolean", "Date", "Buffer", "Object", "Array", "Map", "Set",
        "RegExp", "Function", "Symbol", "BigInt", "Promise", "Error", "Math", "JSON",
        "Int8Array", "Uint8Array", "ArrayBuffer",
    ]
    .map(String::from)
    .to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_constructors: default_schema_constructors(),
            schema_namespaces: default_schema_namespaces(),
            type_marker: default_type_marker(),
            options: default_options(),
            builtin_types: default_builtin_types(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Every configured name must be a JavaScript identifier, and a schema needs at
    /// least one constructor name to be discoverable.
    pub fn validate(&self) -> Result<(), DocgenError> {
        if self.schema_constructors.is_empty() {
            return Err(DocgenError::InvalidConfig(
                "'schemaConstructors' must not be empty".to_string(),
            ));
        }

        let tables = [
            ("schemaConstructors", &self.schema_constructors),
            ("schemaNamespaces", &self.schema_namespaces),
            ("options", &self.options),
            ("builtinTypes", &self.builtin_types),
        ];
        for (table, names) in tables {
            if let Some(bad) = names.iter().find(|name| !is_plain_key(name)) {
                return Err(DocgenError::InvalidConfig(format!(
                    "'{}' contains an invalid name: \"{}\"",
                    table, bad
                )));
            }
        }

        if !is_plain_key(&self.type_marker) {
            return Err(DocgenError::InvalidConfig(format!(
                "'typeMarker' is not a valid name: \"{}\"",
                self.type_marker
            )));
        }

        Ok(())
    }

    pub fn is_option(&self, key: &str) -> bool {
        self.options.iter().any(|o| o == key)
    }

    pub fn is_builtin_type(&self, name: &str) -> bool {
        self.builtin_types.iter().any(|t| t == name)
    }

    pub fn is_schema_constructor(&self, name: &str) -> bool {
        self.schema_constructors.iter().any(|c| c == name)
    }

    pub fn is_schema_namespace(&self, name: &str) -> bool {
        self.schema_namespaces.iter().any(|n| n == name)
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// The file the configuration came from, `None` when using defaults.
    pub path: Option<PathBuf>,
}

/// Load configuration from an explicit file.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    config.validate()?;
    Ok(config)
}

/// Discover and load configuration starting at `start_dir`.
pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => Ok(ConfigLoadResult {
            config: load_config_file(&path)?,
            path: Some(path),
        }),
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schema_constructors, vec!["Schema"]);
        assert_eq!(config.type_marker, "type");
        assert!(config.is_option("required"));
        assert!(!config.is_option("type"));
        assert!(config.is_builtin_type("Number"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
              "schemaConstructors": ["Schema", "BaseSchema"],
              "options": ["required", "default", "match"]
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.schema_constructors, vec!["Schema", "BaseSchema"]);
        assert_eq!(config.options, vec!["required", "default", "match"]);
        assert_eq!(config.schema_namespaces, default_schema_namespaces());
        assert_eq!(config.builtin_types, default_builtin_types());
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("models");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let found = find_config_file(&sub_dir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let found = find_config_file(dir.path());
        assert!(found.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        fs::write(&config_path, r#"{ "typeMarker": "kind" }"#).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert_eq!(result.path, Some(config_path));
        assert_eq!(result.config.type_marker, "kind");
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.path.is_none());
        assert_eq!(result.config.options, default_options());
    }

    #[test]
    fn test_validate_rejects_empty_constructors() {
        let config = Config {
            schema_constructors: Vec::new(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("schemaConstructors"));
    }

    #[test]
    fn test_validate_rejects_invalid_option_name() {
        let config = Config {
            options: vec!["min".to_string(), "max length".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("options"));
        assert!(err.to_string().contains("max length"));
    }

    #[test]
    fn test_load_config_with_invalid_marker_fails() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "typeMarker": "" }"#,
        )
        .unwrap();

        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_default_config_json_round_trips() {
        let json = default_config_json().unwrap();
        assert!(json.contains("schemaConstructors"));
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.options, default_options());
    }
}

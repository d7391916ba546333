//! Configuration handling for Stencil templates.
//! A template may carry a `stencil.json`, `stencil.yml` or `stencil.yaml` file at its
//! root with default variable values and extra pass-through placeholder prefixes.

use crate::constants::CONFIG_FILES;
use crate::error::{Error, Result};
use crate::placeholder::is_variable_name;
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// Template configuration.
///
/// ```yaml
/// variables:
///   LICENSE: MIT
/// reflect:
///   - CMAKE_
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default values for variables not given on the command line
    pub variables: IndexMap<String, String>,
    /// Placeholder prefixes written to the output unchanged
    pub reflect: Vec<String>,
}

/// Reads the first configuration file found in `template_dir`.
///
/// # Returns
/// * `Result<Option<(String, String)>>` - File name and content, `None` without a configuration
pub fn load_config<P: AsRef<Path>>(template_dir: P, config_files: &[&str]) -> Result<Option<(String, String)>> {
    for file in config_files {
        let config_path = template_dir.as_ref().join(file);
        if config_path.is_file() {
            debug!("Loading configuration from {}", config_path.display());
            let content = std::fs::read_to_string(&config_path).map_err(|e| Error::file(&config_path, e))?;
            return Ok(Some((file.to_string(), content)));
        }
    }

    debug!("No configuration file found (tried: {})", config_files.join(", "));
    Ok(None)
}

/// Parses configuration content, trying JSON first and YAML second.
///
/// # Errors
/// * `Error::ConfigError` if the content is neither, or names an invalid variable
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = match serde_json::from_str(content) {
        Ok(config) => config,
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {e}")))?,
    };

    let mut names = config.variables.keys().chain(config.reflect.iter());
    if let Some(name) = names.find(|name| !is_variable_name(name)) {
        return Err(Error::InvalidVariableError { name: name.clone() });
    }

    Ok(config)
}

/// Loads the template configuration.
///
/// # Returns
/// * `Result<(Config, Option<String>)>` - Configuration (default when absent) and the
///   name of the file it came from
pub fn get_config<P: AsRef<Path>>(template_dir: P) -> Result<(Config, Option<String>)> {
    match load_config(template_dir, &CONFIG_FILES)? {
        Some((file, content)) => Ok((parse_config(&content)?, Some(file))),
        None => Ok((Config::default(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_yaml() {
        let config = parse_config("variables:\n  LICENSE: MIT\n  APP_NAME: demo\nreflect:\n  - CMAKE_\n").unwrap();
        assert_eq!(config.variables.keys().collect::<Vec<_>>(), vec!["LICENSE", "APP_NAME"]);
        assert_eq!(config.reflect, vec!["CMAKE_"]);
    }

    #[test]
    fn test_parse_json() {
        let config = parse_config(r#"{"variables": {"LICENSE": "MIT"}}"#).unwrap();
        assert_eq!(config.variables.get("LICENSE").map(String::as_str), Some("MIT"));
        assert!(config.reflect.is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_keys_and_names() {
        assert!(matches!(parse_config("questions: {}\n"), Err(Error::ConfigError(_))));
        assert!(matches!(
            parse_config("variables:\n  BAD-NAME: x\n"),
            Err(Error::InvalidVariableError { .. })
        ));
    }

    #[test]
    fn test_get_config() {
        let temp_dir = TempDir::new().unwrap();
        let (config, file) = get_config(temp_dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(file.is_none());

        std::fs::write(temp_dir.path().join("stencil.yml"), "variables:\n  LICENSE: MIT\n").unwrap();
        let (config, file) = get_config(temp_dir.path()).unwrap();
        assert_eq!(config.variables.len(), 1);
        assert_eq!(file.as_deref(), Some("stencil.yml"));
    }
}

//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = parse_config(&content)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            debug = true

            [log]
            flushInterval = 3

            [log.targets.app]
            type = "file"
            path = "/tmp/app.log"
            format = "json"

            [log.targets.orphan]
            path = "/tmp/orphan.log"
            "#,
        )
        .unwrap();

        assert!(config.debug);
        let log = config.log.unwrap();
        assert_eq!(log.flush_interval, 3);

        let targets = log.targets.unwrap();
        let app = &targets["app"];
        assert_eq!(app.kind.as_deref(), Some("file"));
        assert_eq!(app.params["path"], "/tmp/app.log");
        assert_eq!(app.params["format"], "json");
        assert!(!app.params.contains_key("type"));
        assert_eq!(targets["orphan"].kind, None);
    }

    #[test]
    fn test_targets_keep_declaration_order() {
        let config = parse_config(
            r#"
            [log.targets.zeta]
            type = "console"

            [log.targets.alpha]
            type = "tracing"

            [log.targets.mid]
            type = "console"
            stream = "stderr"
            "#,
        )
        .unwrap();

        let targets = config.log.unwrap().targets.unwrap();
        let names: Vec<&str> = targets.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_defaults() {
        let config = parse_config("").unwrap();
        assert!(!config.debug);
        assert!(config.log.is_none());

        let config = parse_config("[log]\ntargets = {}\n").unwrap();
        assert_eq!(config.log.unwrap().flush_interval, crate::pipeline::DEFAULT_FLUSH_INTERVAL);
    }

    #[test]
    fn test_negative_interval_rejected() {
        let err = parse_config("[log]\nflush_interval = -1\ntargets = {}\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_targets_rejected() {
        let err = parse_config("[log]\nflush_interval = 5\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ref errors) if errors == &[ValidationError::MissingTargets]
        ));
    }

    #[test]
    fn test_validation_errors_are_listed() {
        let err = parse_config(
            "[log]\ntargets = { \" \" = { type = \"console\" }, app = { type = \" \" } }\n",
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Validation failed: "));
        assert_eq!(message.matches(", ").count(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

use std::collections::HashSet;
use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub const ENV_INFERENCE_URL: &str = "DOCANALYZER_INFERENCE_URL";
pub const ENV_MODEL: &str = "DOCANALYZER_MODEL";
pub const ENV_BIND: &str = "DOCANALYZER_BIND";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Applies environment overrides on top of a loaded or default config.
pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    if let Ok(url) = std::env::var(ENV_INFERENCE_URL) {
        config.inference.base_url = url;
    }
    if let Ok(model) = std::env::var(ENV_MODEL) {
        config.inference.model = model;
    }
    if let Ok(bind) = std::env::var(ENV_BIND) {
        config.server.bind = bind;
    }
    if let Ok(format) = std::env::var(ENV_LOG_FORMAT) {
        config.logging.json = format.eq_ignore_ascii_case("json");
    }

    validate_config(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();

    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let inference = &config.inference;
    if !inference.base_url.starts_with("http://") && !inference.base_url.starts_with("https://")
    {
        return Err(ConfigError::Validation {
            message: format!(
                "Inference base_url must start with http:// or https://: {}",
                inference.base_url
            ),
        });
    }
    if inference.model.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "Inference model must not be empty".to_string(),
        });
    }
    if !(0.0..=2.0).contains(&inference.temperature) {
        return Err(ConfigError::Validation {
            message: format!(
                "temperature must be within 0.0..=2.0, got {}",
                inference.temperature
            ),
        });
    }
    if !(0.0..=1.0).contains(&inference.top_p) {
        return Err(ConfigError::Validation {
            message: format!("top_p must be within 0.0..=1.0, got {}", inference.top_p),
        });
    }

    if config.checklist.max_files_per_question == 0 {
        return Err(ConfigError::Validation {
            message: "max_files_per_question must be at least 1".to_string(),
        });
    }

    let mut question_ids = HashSet::new();
    for question in &config.checklist.questions {
        if !question_ids.insert(question.id) {
            return Err(ConfigError::Validation {
                message: format!("Duplicate question id: {}", question.id),
            });
        }
        if question.text.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: format!("Question {} has empty text", question.id),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_load_minimal_config_uses_defaults() {
        let config = load_config_from_str(r#"{ "version": "1.0" }"#).unwrap();
        assert_eq!(config.inference.base_url, "http://localhost:11434");
        assert_eq!(config.inference.model, "llama3.2:latest");
        assert_eq!(config.inference.top_k, 40);
        assert_eq!(config.checklist.questions.len(), 11);
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_load_full_config() {
        let config_json = r#"
        {
            "version": "1.0",
            "inference": {
                "base_url": "http://127.0.0.1:9999",
                "model": "mistral",
                "temperature": 0.2,
                "top_p": 0.5,
                "top_k": 10
            },
            "checklist": {
                "questions": [
                    { "id": 1, "text": "Is there a fire safety plan?" },
                    { "id": 7, "text": "Are first aiders appointed?" }
                ],
                "max_files_per_question": 5
            },
            "export": {
                "directory": "/tmp/out",
                "document_prefix": "docs",
                "checklist_prefix": "audit"
            },
            "server": { "bind": "0.0.0.0:8080" },
            "logging": { "json": true, "filter": "warn" }
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.inference.model, "mistral");
        assert_eq!(config.inference.top_k, 10);
        assert_eq!(config.checklist.questions.len(), 2);
        assert_eq!(config.checklist.questions[1].id, 7);
        assert_eq!(config.checklist.max_files_per_question, 5);
        assert_eq!(config.export.checklist_prefix, "audit");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_version() {
        let result = load_config_from_str(r#"{ "version": "2.0" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_version_fails_schema() {
        let result = load_config_from_str(r#"{ "inference": { "model": "x" } }"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_unknown_top_level_key_fails_schema() {
        let result = load_config_from_str(r#"{ "version": "1.0", "workers": 4 }"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_invalid_json() {
        let result = load_config_from_str("{ not json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let result = load_config_from_str(
            r#"{ "version": "1.0", "inference": { "base_url": "localhost:11434" } }"#,
        );
        match result {
            Err(ConfigError::Validation { message }) => assert!(message.contains("base_url")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_duplicate_question_ids() {
        let config_json = r#"
        {
            "version": "1.0",
            "checklist": {
                "questions": [
                    { "id": 1, "text": "First" },
                    { "id": 1, "text": "Again" }
                ]
            }
        }
        "#;
        let result = load_config_from_str(config_json);
        match result {
            Err(ConfigError::Validation { message }) => assert!(message.contains("Duplicate")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/docanalyzer.json");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var(ENV_MODEL, "phi3");
        std::env::set_var(ENV_INFERENCE_URL, "http://ollama.internal:11434");
        std::env::set_var(ENV_LOG_FORMAT, "JSON");

        let mut config = Config::default();
        let result = apply_env_overrides(&mut config);

        std::env::remove_var(ENV_MODEL);
        std::env::remove_var(ENV_INFERENCE_URL);
        std::env::remove_var(ENV_LOG_FORMAT);

        assert!(result.is_ok());
        assert_eq!(config.inference.model, "phi3");
        assert_eq!(config.inference.base_url, "http://ollama.internal:11434");
        assert!(config.logging.json);
    }

    #[test]
    #[serial]
    fn test_env_override_is_validated() {
        std::env::set_var(ENV_INFERENCE_URL, "ftp://nope");

        let mut config = Config::default();
        let result = apply_env_overrides(&mut config);

        std::env::remove_var(ENV_INFERENCE_URL);

        assert!(result.is_err());
    }
}

//! Configuration validation for the docdeck web server
//!
//! Run once at startup, after the environment and command line are merged.

use crate::{WebConfig, WebError, WebResult};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Minimum admin password length before a warning is raised
pub const RECOMMENDED_PASSWORD_LENGTH: usize = 12;

/// Configuration validation result
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// Configuration validation error
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub severity: ErrorSeverity,
}

/// Configuration validation warning
#[derive(Debug, Clone, Serialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub recommendation: String,
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorSeverity {
    /// The server cannot start
    Critical,
    /// The server starts but part of it will not work
    Medium,
}

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate complete web configuration
    pub fn validate_config(config: &WebConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        Self::validate_network_config(config, &mut errors);
        Self::validate_session_config(config, &mut errors, &mut warnings);
        Self::validate_static_config(config, &mut errors);
        Self::validate_dev_mode_config(config, &mut warnings);

        let is_valid = errors
            .iter()
            .all(|e| e.severity != ErrorSeverity::Critical);

        ValidationResult {
            is_valid,
            errors,
            warnings,
        }
    }

    fn validate_network_config(config: &WebConfig, errors: &mut Vec<ValidationError>) {
        if config.host.trim().is_empty() {
            errors.push(ValidationError {
                field: "host".to_string(),
                message: "Host cannot be empty".to_string(),
                severity: ErrorSeverity::Critical,
            });
        }

        if config.port == 0 {
            errors.push(ValidationError {
                field: "port".to_string(),
                message: "Port cannot be 0".to_string(),
                severity: ErrorSeverity::Critical,
            });
        }
    }

    fn validate_session_config(
        config: &WebConfig,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        if config.session_timeout_minutes == 0 {
            errors.push(ValidationError {
                field: "session_timeout_minutes".to_string(),
                message: "Session timeout must be at least one minute".to_string(),
                severity: ErrorSeverity::Critical,
            });
        }

        if config.admin_password.chars().count() < RECOMMENDED_PASSWORD_LENGTH {
            warnings.push(ValidationWarning {
                field: "admin_password".to_string(),
                message: format!(
                    "Admin password is shorter than {} characters",
                    RECOMMENDED_PASSWORD_LENGTH
                ),
                recommendation: "Use a long random password".to_string(),
            });
        }

        if config.secret_key.is_none() {
            warnings.push(ValidationWarning {
                field: "secret_key".to_string(),
                message: "SECRET_KEY is not set".to_string(),
                recommendation: "Set SECRET_KEY so sessions survive a restart".to_string(),
            });
        }
    }

    fn validate_static_config(config: &WebConfig, errors: &mut Vec<ValidationError>) {
        let path = Path::new(&config.static_dir);
        if !path.is_dir() {
            errors.push(ValidationError {
                field: "static_dir".to_string(),
                message: format!("Static directory does not exist: {}", config.static_dir),
                severity: ErrorSeverity::Medium,
            });
        }
    }

    fn validate_dev_mode_config(config: &WebConfig, warnings: &mut Vec<ValidationWarning>) {
        if config.dev_mode {
            warnings.push(ValidationWarning {
                field: "dev_mode".to_string(),
                message: "Development mode is enabled".to_string(),
                recommendation: "Disable development mode when serving over HTTPS".to_string(),
            });
        }
    }

    /// Log validation results
    pub fn log_validation_results(result: &ValidationResult) {
        for error in &result.errors {
            warn!(field = %error.field, severity = ?error.severity, "{}", error.message);
        }

        for warning in &result.warnings {
            warn!(
                field = %warning.field,
                recommendation = %warning.recommendation,
                "{}",
                warning.message
            );
        }

        if result.is_valid {
            info!("Configuration validation passed");
        } else {
            warn!("Configuration validation failed");
        }
    }
}

/// Validate configuration, failing on any critical error
pub fn validate_config(config: &WebConfig) -> WebResult<ValidationResult> {
    let result = ConfigValidator::validate_config(config);
    ConfigValidator::log_validation_results(&result);

    if !result.is_valid {
        let messages: Vec<&str> = result
            .errors
            .iter()
            .filter(|e| e.severity == ErrorSeverity::Critical)
            .map(|e| e.message.as_str())
            .collect();
        return Err(WebError::Config(messages.join("; ")));
    }

    Ok(result)
}

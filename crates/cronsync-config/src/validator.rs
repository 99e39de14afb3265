//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, StoreBackend};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_store(config, &mut result);
        Self::validate_scheduler(config, &mut result);
        Self::validate_http_client(config, &mut result);
        Self::validate_expression(config, &mut result);
        Self::validate_rewrite(config, &mut result);

        Ok(result)
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_store(config: &Config, result: &mut ValidationResult) {
        match config.store.backend_kind() {
            Ok(StoreBackend::Sqlite) if config.store.path.is_none() => {
                result.add_warning(ValidationWarning::new(
                    "store.path",
                    "SQLite store path not set, will use default location",
                ));
            }
            Ok(StoreBackend::Memory) => {
                result.add_warning(ValidationWarning::new(
                    "store.backend",
                    "Memory store loses all job definitions on restart",
                ));
            }
            Ok(StoreBackend::Sqlite) => {}
            Err(e) => result.add_error(ValidationError::new("store.backend", e.to_string())),
        }
    }

    fn validate_scheduler(config: &Config, result: &mut ValidationResult) {
        if config.scheduler.max_concurrent_jobs == 0 {
            result.add_error(ValidationError::new(
                "scheduler.max_concurrent_jobs",
                "max_concurrent_jobs must be greater than 0",
            ));
        }

        if config.scheduler.misfire_threshold_secs == 0 {
            result.add_warning(ValidationWarning::new(
                "scheduler.misfire_threshold_secs",
                "misfire_threshold_secs is 0, every late fire counts as a misfire",
            ));
        }

        if config.scheduler.startup_groups.is_empty() {
            result.add_warning(ValidationWarning::new(
                "scheduler.startup_groups",
                "No startup groups, jobs are only registered through the admin API",
            ));
        }
    }

    fn validate_http_client(config: &Config, result: &mut ValidationResult) {
        if config.http_client.connect_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "http_client.connect_timeout_secs",
                "connect_timeout_secs must be greater than 0",
            ));
        }

        if config.http_client.read_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "http_client.read_timeout_secs",
                "read_timeout_secs must be greater than 0",
            ));
        }
    }

    fn validate_expression(config: &Config, result: &mut ValidationResult) {
        if let Err(e) = config.expression.offset() {
            result.add_error(ValidationError::new("expression.utc_offset", e.to_string()));
        }
    }

    fn validate_rewrite(config: &Config, result: &mut ValidationResult) {
        if let Err(e) = config.rewrite.proxy_url() {
            result.add_error(ValidationError::new("rewrite.proxy", e.to_string()));
        }

        if !config.rewrite.enabled && !config.rewrite.proxy.is_empty() {
            result.add_warning(ValidationWarning::new(
                "rewrite.enabled",
                "Proxy is set but rewrite is disabled",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

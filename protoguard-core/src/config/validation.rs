//! Configuration validation module

use crate::config::{Config, LoggingConfig, ParserConfig, ScanConfig};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Logging configuration error: {message}")]
    Logging { message: String },

    #[error("Scan configuration error: {message}")]
    Scan { message: String },

    #[error("Parser configuration error: {message}")]
    Parser { message: String },
}

impl ValidationError {
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    pub fn scan(message: impl Into<String>) -> Self {
        Self::Scan {
            message: message.into(),
        }
    }

    pub fn parser(message: impl Into<String>) -> Self {
        Self::Parser {
            message: message.into(),
        }
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.format.as_str() {
            "json" | "pretty" => Ok(()),
            other => Err(ValidationError::logging(format!(
                "Log format must be \"json\" or \"pretty\", got: {}",
                other
            ))),
        }
    }
}

impl Validate for ScanConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_scan_depth == 0 {
            return Err(ValidationError::scan(
                "max_scan_depth must be greater than 0",
            ));
        }

        if self.max_concurrent_files == 0 {
            return Err(ValidationError::scan(
                "max_concurrent_files must be greater than 0",
            ));
        }

        if self.max_file_size_bytes == Some(0) {
            return Err(ValidationError::scan(
                "max_file_size_bytes must be greater than 0 when set",
            ));
        }

        if self.max_tree_nodes == Some(0) || self.max_tree_depth == Some(0) {
            return Err(ValidationError::scan(
                "tree limits must be greater than 0 when set",
            ));
        }

        if self.sensitive_properties.is_empty() {
            return Err(ValidationError::scan(
                "sensitive_properties cannot be empty",
            ));
        }

        if let Some(blank) = self
            .sensitive_properties
            .iter()
            .find(|p| p.trim().is_empty())
        {
            return Err(ValidationError::scan(format!(
                "sensitive_properties contains a blank entry: {:?}",
                blank
            )));
        }

        Ok(())
    }
}

impl Validate for ParserConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.node_executable.trim().is_empty() {
            return Err(ValidationError::parser("node_executable cannot be empty"));
        }

        if self.timeout_seconds == 0 {
            return Err(ValidationError::parser(
                "Parser timeout must be greater than 0 seconds",
            ));
        }

        if self.ecma_version.trim().is_empty() {
            return Err(ValidationError::parser("ecma_version cannot be empty"));
        }

        Ok(())
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.scan.validate()?;
        self.parser.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unknown_log_format() {
        let config = LoggingConfig {
            format: "xml".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::Logging { .. })
        ));
    }

    #[test]
    fn test_rejects_blank_sensitive_property() {
        let config = ScanConfig {
            sensitive_properties: vec!["__proto__".to_string(), "  ".to_string()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::Scan { .. })));
    }

    #[test]
    fn test_rejects_zero_parser_timeout() {
        let config = ParserConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::Parser { .. })
        ));
    }
}

//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::forward::{ForwardConfigError, ForwardSettings};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Forwarding middleware: {0}")]
    Forward(#[from] ForwardConfigError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Build the immutable forwarding settings from a loaded configuration.
pub fn forward_settings(config: &GatewayConfig) -> Result<ForwardSettings, ConfigError> {
    Ok(ForwardSettings::from_config(&config.forward)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
        [listener]
        bind_address = "127.0.0.1:8443"

        [upstream]
        address = "127.0.0.1:9000"

        [forward]
        encodePem = true
        encodeURL = true

        [forward.headers]
        sslClientCert = "SSL_CLIENT_CERT"
        sslCertChainPrefix = "CERT_CHAIN"
    "#;

    #[test]
    fn test_parse_valid_config() {
        let config = parse_config(VALID).unwrap();
        assert_eq!(config.upstream.address, "127.0.0.1:9000");

        let settings = forward_settings(&config).unwrap();
        assert_eq!(settings.chain_prefix(), "CERT_CHAIN");
        assert!(settings.encoding().pem);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[listener\nbind_address = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_problems() {
        let err = parse_config("[upstream]\naddress = \"nowhere\"").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Validation failed: "));
        assert!(message.contains("upstream.address"));
    }

    #[test]
    fn test_missing_header_role_reported_by_settings() {
        let config = parse_config(&VALID.replace("sslClientCert = \"SSL_CLIENT_CERT\"", "")).unwrap();
        let err = forward_settings(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Forward(ForwardConfigError::MissingHeader("sslClientCert"))
        ));
        assert_eq!(
            err.to_string(),
            "Forwarding middleware: configuration option 'sslClientCert' not set"
        );
    }

    #[test]
    fn test_forward_settings_error_surfaces() {
        let config = parse_config(&VALID.replace("encodeURL = true", "encodeURL = false")).unwrap();
        let err = forward_settings(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Forward(ForwardConfigError::PemRequiresUrlEncoding)
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/mtls-forward.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

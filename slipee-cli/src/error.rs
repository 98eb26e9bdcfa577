//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and exit codes.

use std::fmt;
use std::net::SocketAddr;
use std::process;

use slipee::config::ConfigFileError;
use slipee::overlay::OverlayError;
use slipee::provider::ProviderError;
use slipee::request::ValidationError;
use slipee::service::ServiceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Config file could not be read or holds an invalid value
    Config(ConfigFileError),
    /// Tile server template or HTTP client setup failed
    Provider(ProviderError),
    /// Font or marker image could not be loaded
    Overlay(OverlayError),
    /// Failed to create service
    ServiceCreation(ServiceError),
    /// Map parameters out of range
    InvalidRequest(ValidationError),
    /// Map generation failed
    Render(ServiceError),
    /// Could not listen on the configured address
    Bind {
        addr: SocketAddr,
        error: std::io::Error,
    },
    /// HTTP server error
    Serve(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!(
                    "Check {} or pass --config with another file.",
                    slipee::config::config_file_path().display()
                );
            }
            CliError::Bind { .. } => {
                eprintln!();
                eprintln!("Is another server already using this address? Try --listen.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Provider(e) => write!(f, "Tile server setup failed: {}", e),
            CliError::Overlay(e) => write!(f, "Overlay setup failed: {}", e),
            CliError::ServiceCreation(e) => write!(f, "Failed to create service: {}", e),
            CliError::InvalidRequest(e) => write!(f, "Invalid map request: {}", e),
            CliError::Render(e) => write!(f, "Failed to render map: {}", e),
            CliError::Bind { addr, error } => write!(f, "Failed to listen on {}: {}", addr, error),
            CliError::Serve(e) => write!(f, "HTTP server error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Provider(e) => Some(e),
            CliError::Overlay(e) => Some(e),
            CliError::ServiceCreation(e) => Some(e),
            CliError::InvalidRequest(e) => Some(e),
            CliError::Render(e) => Some(e),
            CliError::Bind { error, .. } => Some(error),
            CliError::Serve(e) => Some(e),
            CliError::LoggingInit(_) => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e)
    }
}

impl From<OverlayError> for CliError {
    fn from(e: OverlayError) -> Self {
        CliError::Overlay(e)
    }
}

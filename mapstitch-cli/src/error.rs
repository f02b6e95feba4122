//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent
//! formatting and a single exit path.

use mapstitch::error::MosaicError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error (bad file, missing output directory, ...)
    Config(String),
    /// Failed to construct the HTTP client
    Client(String),
    /// The mosaic run itself failed
    Run(MosaicError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Generate a starting config with: mapstitch --write-config");
            }
            CliError::Run(MosaicError::TileFetch { .. }) => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. The tile server is unreachable or rate limiting you");
                eprintln!("  2. The requested zoom has no coverage for this area");
                eprintln!("  3. Too many parallel downloads: lower --concurrency");
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
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Client(msg) => write!(f, "Failed to create HTTP client: {}", msg),
            CliError::Run(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = CliError::Config("output directory /x does not exist".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: output directory /x does not exist"
        );
    }
}

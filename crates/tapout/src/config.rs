// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Command line configuration for tapout
//!
//! Input selection, output format and logging options.

use std::path::PathBuf;

use clap::Parser;

/// tapout - convert TAP output into JSON
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "tapout")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// TAP file to read
    ///
    /// Reads standard input when omitted.
    #[arg(value_name = "FILE", env = "TAPOUT_INPUT")]
    pub input: Option<PathBuf>,

    /// Write the aggregate as a single line of JSON
    #[arg(short, long, default_value = "false")]
    pub compact: bool,

    /// Write every event as a JSON line while parsing
    ///
    /// The final line carries the aggregate as an `output` event.
    #[arg(short, long, default_value = "false")]
    pub stream: bool,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so stdout only carries JSON.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

/// How the aggregate is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented JSON document
    Pretty,
    /// Single line JSON document
    Compact,
    /// One JSON event per line followed by the aggregate
    Stream,
}

impl Config {
    /// Output format selected by the flags
    ///
    /// `--stream` takes precedence over `--compact`.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if self.stream {
            OutputFormat::Stream
        } else if self.compact {
            OutputFormat::Compact
        } else {
            OutputFormat::Pretty
        }
    }

    /// Human readable name of the input
    #[must_use]
    pub fn input_name(&self) -> String {
        self.input
            .as_ref()
            .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the input path is given but does not exist or is
    /// not a regular file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(ConfigError::InputNotFound(input.clone()));
            }
            if !input.is_file() {
                return Err(ConfigError::InputNotFile(input.clone()));
            }
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input path not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Input path is not a regular file
    #[error("Input path is not a file: {0}")]
    InputNotFile(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.input.is_none());
        assert!(!config.compact);
        assert!(!config.stream);
        assert!(!config.verbose);
        assert!(!config.quiet);
    }

    #[test]
    fn test_output_format_default_is_pretty() {
        assert_eq!(Config::default().output_format(), OutputFormat::Pretty);
    }

    #[test]
    fn test_output_format_compact() {
        let config = Config {
            compact: true,
            ..Default::default()
        };
        assert_eq!(config.output_format(), OutputFormat::Compact);
    }

    #[test]
    fn test_output_format_stream_wins_over_compact() {
        let config = Config {
            compact: true,
            stream: true,
            ..Default::default()
        };
        assert_eq!(config.output_format(), OutputFormat::Stream);
    }

    #[test]
    fn test_input_name() {
        assert_eq!(Config::default().input_name(), "<stdin>");
        let config = Config {
            input: Some(PathBuf::from("/tmp/results.tap")),
            ..Default::default()
        };
        assert_eq!(config.input_name(), "/tmp/results.tap");
    }

    #[test]
    fn test_log_level_default() {
        assert_eq!(Config::default().log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_verbose() {
        let config = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_level_quiet() {
        let config = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_validate_stdin() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_nonexistent_input() {
        let config = Config {
            input: Some(PathBuf::from("/nonexistent/path/12345.tap")),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InputNotFound(_))));
    }

    #[test]
    fn test_validate_directory_input() {
        let config = Config {
            input: Some(std::env::temp_dir()),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InputNotFile(_))));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}

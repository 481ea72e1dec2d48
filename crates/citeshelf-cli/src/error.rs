//! Error types for the citeshelf command line.

use thiserror::Error;

/// Result alias used throughout the CLI.
pub type Result<T> = core::result::Result<T, CliError>;

/// Everything a command can fail with.
#[derive(Error, Debug)]
pub enum CliError {
  /// Errors from the citeshelf library
  #[error(transparent)]
  Citeshelf(#[from] citeshelf::error::CiteshelfError),

  /// A prompt could not be shown or answered
  #[error(transparent)]
  Dialog(#[from] dialoguer::Error),

  /// Reading or writing a local file failed
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// A paper file did not contain a paper
  #[error("Invalid paper file: {0}")]
  PaperFile(#[from] serde_json::Error),

  /// The configuration could not be rendered
  #[error(transparent)]
  Toml(#[from] toml::ser::Error),

  /// The arguments do not describe a runnable command
  #[error("{0}")]
  Usage(String),

  /// Input was required but prompts are disabled
  #[error("{0} (prompts are disabled by --accept-defaults)")]
  NonInteractive(String),
}

//! Error types for the citeshelf library.
//!
//! A single error enum covers every failure the core can report:
//! - Precondition failures of the save and library creation flows
//! - Export attempts on citations that have not finished loading
//! - Network, HTTP status and decoding errors from the collaborator services
//! - Configuration and file system errors
//!
//! Most network failures never reach callers as errors: the citation cache and the save
//! workflow convert them into fallback values or per-target outcomes. The variants below are
//! what remains when no sensible fallback exists.
//!
//! # Examples
//!
//! ```no_run
//! use citeshelf::{client::ApiClient, error::CiteshelfError, Config};
//!
//! # async fn example() -> Result<(), CiteshelfError> {
//! let client = ApiClient::new(&Config::default())?;
//! match client.get_paper("unknown").await {
//!   Err(CiteshelfError::Api { status, message }) => println!("{status}: {message}"),
//!   Err(CiteshelfError::Network(e)) => println!("Network error: {e}"),
//!   Err(e) => println!("Other error: {e}"),
//!   Ok(paper) => println!("Found {}", paper.title),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

use crate::citation::CitationStyle;

/// Error type alias used for the [`citeshelf`](crate) crate.
pub type Result<T> = core::result::Result<T, CiteshelfError>;

/// Errors that can occur when working with the citeshelf library.
#[derive(Error, Debug)]
pub enum CiteshelfError {
  /// An authenticated action was attempted without a bearer token.
  ///
  /// Raised before any network call is made, so the caller can send the user to log in.
  #[error("Not authenticated, log in first")]
  NotAuthenticated,

  /// The save workflow was started with an empty target selection.
  #[error("No libraries selected")]
  NoTargetsSelected,

  /// A library was about to be created with a blank name.
  #[error("Library name cannot be empty")]
  EmptyLibraryName,

  /// A citation was exported before its value finished loading.
  #[error("The {0} citation has not finished loading")]
  NotLoaded(CitationStyle),

  /// The provided citation style tag is not one of bibtex, mla, apa or ieee.
  #[error("Invalid citation style \"{0}\", see `citeshelf::citation::CitationStyle`")]
  InvalidStyle(String),

  /// A clipboard backend could not take the text.
  #[error("Clipboard unavailable: {0}")]
  Clipboard(String),

  /// The server rejected the bearer token.
  ///
  /// Whoever observes this is expected to clear the session.
  #[error("Session expired or token rejected")]
  Unauthorized,

  /// A collaborator service answered with a non-success status.
  ///
  /// The message is the `message` field of the error body when present, verbatim.
  #[error("API error ({status}): {message}")]
  Api {
    /// HTTP status code of the response
    status:  u16,
    /// Server provided message
    message: String,
  },

  /// A network request failed or timed out.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// A response or payload could not be (de)serialized.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// The configuration file could not be parsed.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// The configuration could not be written.
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),

  /// The configured base URL is not a valid URL.
  #[error(transparent)]
  Url(#[from] url::ParseError),

  /// Any other configuration problem.
  #[error("{0}")]
  Config(String),
}

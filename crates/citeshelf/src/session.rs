//! Ownership of the bearer token.
//!
//! A [`Session`] is the single owner of the user's bearer token. It is created once by the
//! application, handed by reference to everything that performs authenticated requests, and is
//! the only place the token is persisted or cleared. The token lives in a small file (by default
//! `<config dir>/citeshelf/session`) so it survives between invocations.
//!
//! # Examples
//!
//! ```no_run
//! use citeshelf::session::Session;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::load(Session::default_path())?;
//! if !session.is_authenticated() {
//!   session.login("eyJhbGciOi...")?;
//! }
//! # Ok(())
//! # }
//! ```

use super::*;

/// The bearer token of the current user and where it is stored.
#[derive(Debug, Default)]
pub struct Session {
  /// The token, absent when logged out
  token: Mutex<Option<String>>,
  /// File the token is persisted to, if any
  path:  Option<PathBuf>,
}

impl Session {
  /// A session without token or persistence.
  pub fn anonymous() -> Self { Self::default() }

  /// An in-memory session holding `token`.
  pub fn with_token(token: impl Into<String>) -> Self {
    Self { token: Mutex::new(Some(token.into())), path: None }
  }

  /// Default location of the session file.
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("citeshelf").join("session")
  }

  /// Loads the session persisted at `path`, or an empty one if nothing is stored there.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let token = match std::fs::read_to_string(&path) {
      Ok(content) => Some(content.trim().to_string()).filter(|t| !t.is_empty()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
      Err(e) => return Err(e.into()),
    };
    trace!("Loaded session from {path:?}, authenticated: {}", token.is_some());
    Ok(Self { token: Mutex::new(token), path: Some(path) })
  }

  /// Whether a token is held.
  pub fn is_authenticated(&self) -> bool { self.lock().is_some() }

  /// The current token, if any.
  pub fn token(&self) -> Option<String> { self.lock().clone() }

  /// The current token, or [`CiteshelfError::NotAuthenticated`].
  pub fn require_token(&self) -> Result<String> {
    self.token().ok_or(CiteshelfError::NotAuthenticated)
  }

  /// Stores a new token and persists it.
  pub fn login(&self, token: impl Into<String>) -> Result<()> {
    let token = token.into().trim().to_string();
    if token.is_empty() {
      return Err(CiteshelfError::NotAuthenticated);
    }
    if let Some(path) = &self.path {
      if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
      }
      std::fs::write(path, &token)?;
      debug!("Persisted session token to {path:?}");
    }
    *self.lock() = Some(token);
    Ok(())
  }

  /// Drops the token, in memory and on disk.
  ///
  /// Called on logout and whenever a server answers 401.
  pub fn invalidate(&self) -> Result<()> {
    self.lock().take();
    if let Some(path) = &self.path {
      match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed session file {path:?}"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
        Err(e) => return Err(e.into()),
      }
    }
    Ok(())
  }

  /// Locks the token, recovering it from a poisoned lock.
  fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
    self.token.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
  }
}

//! Client configuration.
//!
//! Configuration is a small TOML file, by default at `<config dir>/citeshelf/config.toml`:
//!
//! ```toml
//! base_url = "http://localhost:5000"
//! request_timeout_secs = 30
//! citation_fallback_secs = 8
//! session_path = "/home/me/.config/citeshelf/session"
//! download_dir = "/home/me/Downloads"
//! ```
//!
//! Every field is optional. A missing file yields the defaults.

use super::*;

/// Default API root.
const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Longest accepted citation fallback delay, in seconds.
pub const MAX_CITATION_FALLBACK_SECS: u64 = 600;

/// Settings shared by the client, the citation cache and the exporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Root URL of the API exposing `/api/papers`, `/api/citations` and `/api/libraries`
  pub base_url:               String,
  /// Upper bound for each HTTP request, in seconds
  pub request_timeout_secs:   u64,
  /// Delay before placeholders left by the citation service are generated locally, in seconds
  pub citation_fallback_secs: u64,
  /// Where the bearer token is persisted
  pub session_path:           PathBuf,
  /// Where downloaded citations are written
  pub download_dir:           PathBuf,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      base_url:               DEFAULT_BASE_URL.to_string(),
      request_timeout_secs:   30,
      citation_fallback_secs: 8,
      session_path:           crate::session::Session::default_path(),
      download_dir:           dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
    }
  }
}

impl Config {
  /// Default location of the configuration file.
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("citeshelf").join("config.toml")
  }

  /// Loads the configuration at `path`, falling back to defaults when the file does not exist.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
      Ok(content) => {
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        debug!("Loaded configuration from {path:?}");
        Ok(config)
      },
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        debug!("No configuration at {path:?}, using defaults");
        Ok(Self::default())
      },
      Err(e) => Err(e.into()),
    }
  }

  /// Writes the configuration to `path`, creating parent directories.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(self)?)?;
    Ok(())
  }

  /// Sets the API root.
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  /// Sets the per-request timeout.
  pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
    self.request_timeout_secs = timeout.as_secs();
    self
  }

  /// Sets the citation fallback delay.
  pub fn with_citation_fallback(mut self, delay: Duration) -> Self {
    self.citation_fallback_secs = delay.as_secs();
    self
  }

  /// Sets the session file.
  pub fn with_session_path(mut self, path: &Path) -> Self {
    self.session_path = path.to_path_buf();
    self
  }

  /// Sets the download directory.
  pub fn with_download_dir(mut self, path: &Path) -> Self {
    self.download_dir = path.to_path_buf();
    self
  }

  /// Per-request timeout.
  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

  /// Citation fallback delay.
  pub fn citation_fallback(&self) -> Duration { Duration::from_secs(self.citation_fallback_secs) }

  /// Checks values that would otherwise only fail at request time.
  pub fn validate(&self) -> Result<()> {
    url::Url::parse(&self.base_url)?;
    if self.request_timeout_secs == 0 {
      return Err(CiteshelfError::Config("request_timeout_secs must be positive".into()));
    }
    if self.citation_fallback_secs > MAX_CITATION_FALLBACK_SECS {
      return Err(CiteshelfError::Config(format!(
        "citation_fallback_secs must be at most {MAX_CITATION_FALLBACK_SECS}"
      )));
    }
    Ok(())
  }
}

//! HTTP client for the paper, citation and library endpoints.
//!
//! The collaborator services are reached through a thin REST API:
//!
//! | method | path                           | auth   | body / response                           |
//! |--------|--------------------------------|--------|-------------------------------------------|
//! | GET    | `/api/papers/{id}`             |        | paper object                              |
//! | GET    | `/api/citations/{id}`          |        | `{success, data: [{id, label, value}]}`   |
//! | GET    | `/api/libraries`               | bearer | `{my_libraries, shared_with_me}`          |
//! | POST   | `/api/libraries`               | bearer | `{name, description?, is_public}` → `{library}` |
//! | POST   | `/api/libraries/{id}/papers`   | bearer | [`SavePayload`] → 2xx or `{message}`      |
//!
//! The workflows in this crate are written against the [`CitationService`] and
//! [`LibraryService`] traits rather than [`ApiClient`] directly, so they can run against any
//! implementation.
//!
//! Error mapping:
//! - 401 → [`CiteshelfError::Unauthorized`]
//! - any other non-2xx → [`CiteshelfError::Api`] with the body's `message` field, or the raw
//!   body when it has none
//! - transport failures and timeouts → [`CiteshelfError::Network`]

use reqwest::{Response, StatusCode};
use url::Url;

use super::*;
use crate::{
  citation::RemoteFormat,
  library::{LibraryListing, LibraryTarget, NewLibrary, SavePayload},
};

/// Source of remotely rendered citations.
#[async_trait]
pub trait CitationService: Send + Sync {
  /// Fetches every citation format the service offers for a paper.
  async fn fetch_citations(&self, paper_id: &str) -> Result<Vec<RemoteFormat>>;
}

/// Access to the user's libraries.
///
/// Every method takes the bearer token explicitly; the caller owns the session.
#[async_trait]
pub trait LibraryService: Send + Sync {
  /// Lists owned and shared libraries.
  async fn list_libraries(&self, token: &str) -> Result<LibraryListing>;

  /// Saves a paper into one library.
  async fn save_paper(&self, token: &str, library_id: &str, payload: &SavePayload) -> Result<()>;

  /// Creates a library.
  async fn create_library(&self, token: &str, request: &NewLibrary) -> Result<LibraryTarget>;
}

/// reqwest based client for the API.
#[derive(Debug, Clone)]
pub struct ApiClient {
  /// Shared connection pool, configured with the request timeout
  http: reqwest::Client,
  /// API root
  base: Url,
}

/// Body of `GET /api/citations/{id}`.
#[derive(Debug, Deserialize)]
struct CitationResponse {
  /// Whether the service produced citations
  #[serde(default)]
  success: bool,
  /// One entry per style
  #[serde(default)]
  data:    Vec<RemoteFormat>,
  /// Error description when `success` is false
  #[serde(default)]
  message: Option<String>,
}

/// Body of `POST /api/libraries`.
#[derive(Debug, Deserialize)]
struct CreatedLibrary {
  /// The new library
  library: LibraryTarget,
}

/// Error body sent by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
  /// Human readable message
  message: Option<String>,
  /// Alternative field some endpoints use
  error:   Option<String>,
}

impl ApiClient {
  /// Builds a client for the configured API root.
  pub fn new(config: &Config) -> Result<Self> {
    config.validate()?;
    let http = reqwest::Client::builder()
      .timeout(config.request_timeout())
      .user_agent(concat!("citeshelf/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { http, base: Url::parse(&config.base_url)? })
  }

  /// The API root this client talks to.
  pub fn base_url(&self) -> &Url { &self.base }

  /// Fetches a paper by its external id.
  pub async fn get_paper(&self, paper_id: &str) -> Result<Paper> {
    let url = self.endpoint(&["api", "papers", paper_id])?;
    debug!("Fetching paper via: {url}");
    let response = check(self.http.get(url).send().await?).await?;
    let data = response.bytes().await?;
    trace!("paper response: {}", String::from_utf8_lossy(&data));
    Ok(serde_json::from_slice(&data)?)
  }

  /// Builds `{base}/{segments...}`, percent-encoding each segment.
  fn endpoint(&self, segments: &[&str]) -> Result<Url> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|_| CiteshelfError::Config(format!("{} cannot be used as an API root", self.base)))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }
}

#[async_trait]
impl CitationService for ApiClient {
  async fn fetch_citations(&self, paper_id: &str) -> Result<Vec<RemoteFormat>> {
    let url = self.endpoint(&["api", "citations", paper_id])?;
    debug!("Fetching citations via: {url}");
    let response = check(self.http.get(url).send().await?).await?;
    let body: CitationResponse = response.json().await?;
    if !body.success {
      return Err(CiteshelfError::Api {
        status:  StatusCode::OK.as_u16(),
        message: body.message.unwrap_or_else(|| "citation service reported failure".into()),
      });
    }
    Ok(body.data)
  }
}

#[async_trait]
impl LibraryService for ApiClient {
  async fn list_libraries(&self, token: &str) -> Result<LibraryListing> {
    let url = self.endpoint(&["api", "libraries"])?;
    debug!("Listing libraries via: {url}");
    let response = check(self.http.get(url).bearer_auth(token).send().await?).await?;
    Ok(response.json().await?)
  }

  async fn save_paper(&self, token: &str, library_id: &str, payload: &SavePayload) -> Result<()> {
    let url = self.endpoint(&["api", "libraries", library_id, "papers"])?;
    debug!("Saving {:?} via: {url}", payload.paper_id);
    check(self.http.post(url).bearer_auth(token).json(payload).send().await?).await?;
    Ok(())
  }

  async fn create_library(&self, token: &str, request: &NewLibrary) -> Result<LibraryTarget> {
    let url = self.endpoint(&["api", "libraries"])?;
    debug!("Creating library {:?} via: {url}", request.name);
    let response = check(self.http.post(url).bearer_auth(token).json(request).send().await?).await?;
    let created: CreatedLibrary = response.json().await?;
    Ok(created.library)
  }
}

/// Converts non-success responses into errors.
async fn check(response: Response) -> Result<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }
  if status == StatusCode::UNAUTHORIZED {
    return Err(CiteshelfError::Unauthorized);
  }

  let text = response.text().await.unwrap_or_default();
  trace!("error response ({status}): {text}");
  Err(CiteshelfError::Api { status: status.as_u16(), message: error_message(status, &text) })
}

/// Extracts the server message from an error body.
fn error_message(status: StatusCode, body: &str) -> String {
  serde_json::from_str::<ErrorBody>(body)
    .ok()
    .and_then(|b| b.message.or(b.error))
    .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
    .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string())
}

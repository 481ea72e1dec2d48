//! User libraries and saving papers into them.
//!
//! A library is a named collection of saved papers owned by an external library service. This
//! module holds the read-only [`LibraryTarget`] references the service hands out, the payload
//! shape it expects when a paper is saved, and the workflows built on top:
//!
//! - [`workflow::LibrarySaveWorkflow`]: saves one paper into several libraries at once
//! - [`create_library`]: creates a new library inline
//! - [`list_libraries`]: lists owned and shared libraries
//!
//! # Examples
//!
//! ```no_run
//! use citeshelf::{
//!   client::ApiClient,
//!   library::{create_library, NewLibrary},
//!   session::Session,
//!   Config,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(&Config::default())?;
//! let session = Session::with_token("token");
//! let library = create_library(&client, &session, NewLibrary::new("Reading group")).await?;
//! println!("Created {} ({})", library.name, library.id);
//! # Ok(())
//! # }
//! ```

use chrono::Datelike;

use super::*;
use crate::{
  client::LibraryService,
  paper::{Author, Venue},
  session::Session,
};

pub mod workflow;

/// A library a paper can be saved into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryTarget {
  /// Library identifier
  #[serde(deserialize_with = "string_or_number")]
  pub id:          String,
  /// Display name
  #[serde(default)]
  pub name:        String,
  /// The user's role in this library, e.g. `owner` or `editor`
  #[serde(default)]
  pub role:        String,
  /// Optional description
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  /// Number of saved papers, when reported
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub paper_count: Option<u64>,
}

/// Libraries visible to the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryListing {
  /// Libraries the user owns
  #[serde(default)]
  pub my_libraries:   Vec<LibraryTarget>,
  /// Libraries shared with the user
  #[serde(default)]
  pub shared_with_me: Vec<LibraryTarget>,
}

/// Request body for creating a library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLibrary {
  /// Display name, must not be blank
  pub name:        String,
  /// Optional description
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  /// Whether the library is publicly visible
  pub is_public:   bool,
}

/// Reading progress recorded with a saved paper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
  /// Not read yet, the only status a fresh save records
  #[default]
  Unread,
}

/// An author as stored by the library service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadAuthor {
  /// Author name, possibly empty
  pub name:        String,
  /// Affiliation, if known
  pub affiliation: Option<String>,
}

/// The normalized paper sent to `POST /api/libraries/{id}/papers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavePayload {
  /// External paper id
  pub paper_id:        String,
  /// Title
  pub title:           String,
  /// Canonical venue name
  pub venue:           String,
  /// Publication year, the current year when unknown
  pub year:            i32,
  /// Citation count
  pub citation_count:  u64,
  /// Fields of study
  pub fields_of_study: Vec<String>,
  /// Abstract text
  #[serde(rename = "abstract")]
  pub abstract_text:   String,
  /// Authors
  pub authors:         Vec<PayloadAuthor>,
  /// Best-effort BibTeX entry, empty when none could be obtained
  pub bibtex:          String,
  /// Initial reading status
  pub reading_status:  ReadingStatus,
  /// Initial personal note
  pub user_note:       String,
}

impl LibraryTarget {
  /// A target with the given id and name, owned by the user.
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      id:          id.into(),
      name:        name.into(),
      role:        "owner".to_string(),
      description: None,
      paper_count: None,
    }
  }
}

impl Display for LibraryTarget {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.role[..] {
      "" => write!(f, "{}", self.name),
      role => write!(f, "{} ({role})", self.name),
    }
  }
}

impl LibraryListing {
  /// Every visible library, owned ones first.
  pub fn all(&self) -> impl Iterator<Item = &LibraryTarget> {
    self.my_libraries.iter().chain(self.shared_with_me.iter())
  }

  /// Finds a visible library by id.
  pub fn find(&self, id: &str) -> Option<&LibraryTarget> { self.all().find(|t| t.id == id) }

  /// Whether no library is visible.
  pub fn is_empty(&self) -> bool { self.my_libraries.is_empty() && self.shared_with_me.is_empty() }
}

impl NewLibrary {
  /// A private library with no description.
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), description: None, is_public: false }
  }

  /// Sets the description; blank descriptions are dropped.
  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into()).filter(|d| !d.trim().is_empty());
    self
  }

  /// Sets the visibility.
  pub fn public(mut self, is_public: bool) -> Self {
    self.is_public = is_public;
    self
  }
}

impl From<&Author> for PayloadAuthor {
  fn from(author: &Author) -> Self {
    Self {
      name:        author.display_name().to_string(),
      affiliation: author.affiliation().map(str::to_string),
    }
  }
}

impl SavePayload {
  /// Normalizes `paper` for the library service, using the current year when it has none.
  pub fn from_paper(paper: &Paper, bibtex: impl Into<String>) -> Self {
    Self::from_paper_in_year(paper, bibtex, chrono::Local::now().year())
  }

  /// Normalizes `paper`, using `current_year` when it has no year.
  pub fn from_paper_in_year(paper: &Paper, bibtex: impl Into<String>, current_year: i32) -> Self {
    let venue = match &paper.venue {
      Venue::Many(names) => names.first().cloned().unwrap_or_default(),
      Venue::Single(name) => name.clone(),
    };
    Self {
      paper_id: paper.paper_id.clone(),
      title: paper.title.clone(),
      venue,
      year: paper.year.unwrap_or(current_year),
      citation_count: paper.citation_count,
      fields_of_study: paper.fields_of_study.clone(),
      abstract_text: paper.abstract_text.clone(),
      authors: paper.authors.iter().map(PayloadAuthor::from).collect(),
      bibtex: bibtex.into(),
      reading_status: ReadingStatus::Unread,
      user_note: String::new(),
    }
  }
}

/// Lists the libraries visible to the session's user.
pub async fn list_libraries<S: LibraryService + ?Sized>(
  service: &S,
  session: &Session,
) -> Result<LibraryListing> {
  let token = session.require_token()?;
  match service.list_libraries(&token).await {
    Err(CiteshelfError::Unauthorized) => Err(reject(session)),
    result => result,
  }
}

/// Creates a new library.
///
/// The only client-side validation is that the trimmed name is not empty. Server errors are
/// returned with their message untouched.
pub async fn create_library<S: LibraryService + ?Sized>(
  service: &S,
  session: &Session,
  request: NewLibrary,
) -> Result<LibraryTarget> {
  let token = session.require_token()?;
  let name = request.name.trim().to_string();
  if name.is_empty() {
    return Err(CiteshelfError::EmptyLibraryName);
  }
  let request = NewLibrary { name, ..request };

  match service.create_library(&token, &request).await {
    Ok(library) => {
      info!("Created library {:?} ({})", library.name, library.id);
      Ok(library)
    },
    Err(CiteshelfError::Unauthorized) => Err(reject(session)),
    Err(e) => Err(e),
  }
}

/// Clears a session the server refused and returns the error to report.
pub(crate) fn reject(session: &Session) -> CiteshelfError {
  if let Err(e) = session.invalidate() {
    warn!("Failed to clear rejected session: {e}");
  }
  CiteshelfError::Unauthorized
}

/// Accepts ids sent either as strings or as numbers.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where D: serde::Deserializer<'de> {
  match serde_json::Value::deserialize(deserializer)? {
    serde_json::Value::String(s) => Ok(s),
    serde_json::Value::Number(n) => Ok(n.to_string()),
    other => Err(serde::de::Error::custom(format!("invalid library id {other}"))),
  }
}

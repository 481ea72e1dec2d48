//! The paper view model.
//!
//! Papers are produced by the external academic-graph service and are only ever read by this
//! crate. Payloads from that service are frequently incomplete, so deserialization is lenient:
//! every field may be missing or `null`, authors may be structured objects or bare strings, and
//! the venue may be a string or a list of strings.
//!
//! # Examples
//!
//! ```
//! use citeshelf::paper::{Author, Paper};
//!
//! let paper: Paper = serde_json::from_str(
//!   r#"{
//!     "paperId": "abc123",
//!     "title": "Attention Is All You Need",
//!     "authors": [{"name": "Ashish Vaswani"}, "Noam Shazeer", 42],
//!     "venue": ["NeurIPS", "NIPS"],
//!     "year": 2017
//!   }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(paper.authors[0].display_name(), "Ashish Vaswani");
//! assert_eq!(paper.authors[1].display_name(), "Noam Shazeer");
//! assert_eq!(paper.authors[2].display_name(), "");
//! assert_eq!(paper.venue.primary(), "NeurIPS");
//! ```

use super::*;

/// A bibliographic record as received from the academic-graph service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
  /// External identifier, used as the citation fetch and cache key
  #[serde(default, deserialize_with = "null_as_default")]
  pub paper_id:        String,
  /// Full title
  #[serde(default, deserialize_with = "null_as_default")]
  pub title:           String,
  /// Ordered author list
  #[serde(default, deserialize_with = "null_as_default")]
  pub authors:         Vec<Author>,
  /// Publication venue
  #[serde(default, deserialize_with = "null_as_default")]
  pub venue:           Venue,
  /// Publication year, rendered as `n.d.` when absent
  #[serde(default)]
  pub year:            Option<i32>,
  /// Abstract text
  #[serde(rename = "abstract", default, deserialize_with = "null_as_default")]
  pub abstract_text:   String,
  /// Number of citing papers
  #[serde(default, deserialize_with = "null_as_default")]
  pub citation_count:  u64,
  /// Fields of study, without duplicates
  #[serde(default, deserialize_with = "null_as_default")]
  pub fields_of_study: Vec<String>,
  /// Open access PDF location, when one is known
  #[serde(default)]
  pub open_access_pdf: Option<OpenAccessPdf>,
  /// BibTeX entry embedded in the paper payload by some endpoints
  #[serde(default)]
  pub bibtex:          Option<String>,
}

/// A single author entry.
///
/// The service sends authors either as objects or as plain strings. Anything else is kept as
/// raw JSON and resolves to an empty display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
  /// An author object such as `{"name": "Ada Lovelace", "affiliation": "..."}`
  Structured {
    /// Author's full name
    #[serde(default)]
    name:        Option<String>,
    /// Optional institutional affiliation
    #[serde(default)]
    affiliation: Option<String>,
  },
  /// A bare author name
  Raw(String),
  /// Any other JSON value
  Unknown(serde_json::Value),
}

/// Publication venue, either a single name or a list of aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Venue {
  /// A single venue name
  Single(String),
  /// Several venue names, the first is the canonical one
  Many(Vec<String>),
}

/// Location and licensing status of an open access PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAccessPdf {
  /// Direct URL of the PDF
  #[serde(default)]
  pub url:    String,
  /// Open access category
  #[serde(default)]
  pub status: OpenAccessStatus,
}

/// Open access categories reported by the academic-graph service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpenAccessStatus {
  /// Published open access
  #[serde(alias = "gold")]
  Gold,
  /// Self-archived copy
  #[serde(alias = "green")]
  Green,
  /// Open access in a subscription venue
  #[serde(alias = "hybrid")]
  Hybrid,
  /// Free to read without an explicit license
  #[serde(alias = "bronze")]
  Bronze,
  /// Not openly available
  #[serde(alias = "closed")]
  Closed,
  /// Anything the service adds later
  #[default]
  #[serde(other)]
  Other,
}

impl Paper {
  /// Creates a paper with only a title, mostly useful for tests and local records.
  pub fn new(title: impl Into<String>) -> Self { Self { title: title.into(), ..Self::default() } }

  /// Sets the external identifier.
  pub fn with_id(mut self, paper_id: impl Into<String>) -> Self {
    self.paper_id = paper_id.into();
    self
  }

  /// Appends a structured author without affiliation.
  pub fn with_author(mut self, name: impl Into<String>) -> Self {
    self.authors.push(Author::named(name));
    self
  }

  /// Sets the venue.
  pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
    self.venue = Venue::Single(venue.into());
    self
  }

  /// Sets the publication year.
  pub fn with_year(mut self, year: i32) -> Self {
    self.year = Some(year);
    self
  }

  /// Whether the paper carries an external id usable for remote lookups.
  pub fn has_external_id(&self) -> bool { !self.paper_id.trim().is_empty() }

  /// Whether an open access PDF with a usable URL is known.
  pub fn is_open_access(&self) -> bool {
    self
      .open_access_pdf
      .as_ref()
      .is_some_and(|pdf| !pdf.url.is_empty() && pdf.status != OpenAccessStatus::Closed)
  }

  /// Author display names in order, empty names included.
  pub fn author_names(&self) -> Vec<&str> { self.authors.iter().map(Author::display_name).collect() }
}

impl Author {
  /// Creates a structured author with the given name.
  pub fn named(name: impl Into<String>) -> Self {
    Self::Structured { name: Some(name.into()), affiliation: None }
  }

  /// The name used when rendering citations, empty when none can be resolved.
  pub fn display_name(&self) -> &str {
    match self {
      Self::Structured { name, .. } => name.as_deref().unwrap_or(""),
      Self::Raw(name) => name,
      Self::Unknown(_) => "",
    }
  }

  /// The author's affiliation, if one was provided.
  pub fn affiliation(&self) -> Option<&str> {
    match self {
      Self::Structured { affiliation, .. } => affiliation.as_deref(),
      _ => None,
    }
  }
}

impl Default for Venue {
  fn default() -> Self { Self::Single(String::new()) }
}

impl Venue {
  /// The canonical venue name, empty when unknown.
  pub fn primary(&self) -> &str {
    match self {
      Self::Single(name) => name,
      Self::Many(names) => names.first().map(String::as_str).unwrap_or(""),
    }
  }

  /// The canonical venue name, or `Unknown` when there is none.
  pub fn or_unknown(&self) -> &str {
    match self.primary() {
      "" => "Unknown",
      name => name,
    }
  }
}

impl Display for OpenAccessStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Gold => write!(f, "gold"),
      Self::Green => write!(f, "green"),
      Self::Hybrid => write!(f, "hybrid"),
      Self::Bronze => write!(f, "bronze"),
      Self::Closed => write!(f, "closed"),
      Self::Other => write!(f, "other"),
    }
  }
}

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
  D: serde::Deserializer<'de>,
  T: Default + Deserialize<'de>, {
  Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

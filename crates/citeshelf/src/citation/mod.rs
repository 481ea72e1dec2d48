//! Citation styles and citation rendering.
//!
//! Four styles are supported, each a fixed template applied to a [`Paper`]:
//!
//! | style  | template                                                                 |
//! |--------|--------------------------------------------------------------------------|
//! | bibtex | `@inproceedings{key,\n  title={..},\n  author={..},\n  booktitle={..},\n  year={..},\n}` |
//! | mla    | `Authors. "Title." Venue, Year.`                                         |
//! | apa    | `Authors (Year). Title. Venue.`                                          |
//! | ieee   | `[1] Authors, "Title," Venue, Year.`                                     |
//!
//! Rendering is total: every paper renders in every style, however sparse it is. A missing
//! year becomes `n.d.`, a missing venue becomes `Unknown`, and authors without a resolvable
//! name still occupy a slot in the author list.
//!
//! # Examples
//!
//! ```
//! use citeshelf::{
//!   citation::{format, CitationStyle},
//!   paper::Paper,
//! };
//!
//! let paper = Paper::new("Deep Learning").with_venue("NeurIPS").with_year(2020);
//! assert_eq!(format(&paper, CitationStyle::Apa), " (2020). Deep Learning. NeurIPS.");
//! ```

use super::*;

pub mod cache;

/// Token used in place of a missing publication year.
pub const NO_DATE: &str = "n.d.";

/// Citation key stem used when a paper has no authors.
const ANONYMOUS_KEY: &str = "author";

/// A supported bibliographic style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
  /// BibTeX entry, plain text
  Bibtex,
  /// Modern Language Association
  Mla,
  /// American Psychological Association
  Apa,
  /// Institute of Electrical and Electronics Engineers
  Ieee,
}

/// One citation variant of an open paper.
///
/// A format starts out as a placeholder and is loaded exactly once, either from the remote
/// citation service or by local generation. Its value must not reach an exporter before that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationFormat {
  /// Style of this variant
  pub id:        CitationStyle,
  /// Human readable style name
  pub label:     String,
  /// Rendered citation, plain text for BibTeX and possibly HTML for the other styles
  pub value:     String,
  /// Whether `value` is final
  pub is_loaded: bool,
}

/// A citation variant as sent by the remote citation service.
///
/// The id is kept as a string since the service may send styles this crate does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFormat {
  /// Style tag, e.g. `"apa"`
  pub id:    String,
  /// Display label
  #[serde(default)]
  pub label: String,
  /// Rendered citation
  #[serde(default)]
  pub value: String,
}

impl CitationStyle {
  /// Every supported style, in display order.
  pub const ALL: [CitationStyle; 4] =
    [CitationStyle::Bibtex, CitationStyle::Mla, CitationStyle::Apa, CitationStyle::Ieee];

  /// The lowercase tag used on the wire.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Bibtex => "bibtex",
      Self::Mla => "mla",
      Self::Apa => "apa",
      Self::Ieee => "ieee",
    }
  }

  /// The style whose wire tag is exactly `tag`.
  pub fn from_tag(tag: &str) -> Option<Self> { Self::ALL.into_iter().find(|s| s.as_str() == tag) }

  /// Label shown to users.
  pub fn label(&self) -> &'static str {
    match self {
      Self::Bibtex => "BibTeX",
      Self::Mla => "MLA",
      Self::Apa => "APA",
      Self::Ieee => "IEEE",
    }
  }

  /// Whether values of this style may contain HTML markup.
  pub fn has_markup(&self) -> bool { !matches!(self, Self::Bibtex) }

  /// File extension used when downloading a citation of this style.
  pub fn extension(&self) -> &'static str {
    match self {
      Self::Bibtex => "bib",
      _ => "txt",
    }
  }

  /// MIME type used when downloading a citation of this style.
  pub fn mime_type(&self) -> &'static str {
    match self {
      Self::Bibtex => "application/x-bibtex",
      _ => "text/plain",
    }
  }
}

impl Display for CitationStyle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.label())
  }
}

/// Lenient parse for user input: surrounding whitespace and case are ignored.
impl FromStr for CitationStyle {
  type Err = CiteshelfError;

  fn from_str(s: &str) -> Result<Self> {
    match &s.trim().to_lowercase() as &str {
      "bibtex" => Ok(Self::Bibtex),
      "mla" => Ok(Self::Mla),
      "apa" => Ok(Self::Apa),
      "ieee" => Ok(Self::Ieee),
      s => Err(CiteshelfError::InvalidStyle(s.to_owned())),
    }
  }
}

impl CitationFormat {
  /// An empty, not yet loaded variant.
  pub fn placeholder(style: CitationStyle) -> Self {
    Self { id: style, label: style.label().to_string(), value: String::new(), is_loaded: false }
  }

  /// A variant whose value is final.
  pub fn loaded(style: CitationStyle, value: impl Into<String>) -> Self {
    Self { id: style, label: style.label().to_string(), value: value.into(), is_loaded: true }
  }

  /// A variant rendered locally from the paper.
  pub fn generate(paper: &Paper, style: CitationStyle) -> Self {
    Self::loaded(style, format(paper, style))
  }

  /// The value, only once it is loaded.
  pub fn exportable_value(&self) -> Result<&str> {
    if self.is_loaded {
      Ok(&self.value)
    } else {
      Err(CiteshelfError::NotLoaded(self.id))
    }
  }
}

/// Renders `paper` in the given style.
pub fn format(paper: &Paper, style: CitationStyle) -> String {
  let title = &paper.title;
  let venue = paper.venue.or_unknown();
  let year = year_token(paper);

  match style {
    CitationStyle::Bibtex => format!(
      "@inproceedings{{{key},\n  title={{{title}}},\n  author={{{authors}}},\n  \
       booktitle={{{venue}}},\n  year={{{year}}},\n}}",
      key = citation_key(paper),
      authors = paper.author_names().join(" and "),
    ),
    CitationStyle::Mla =>
      format!("{}. \"{title}.\" {venue}, {year}.", paper.author_names().join(", ")),
    CitationStyle::Apa => format!("{} ({year}). {title}. {venue}.", paper.author_names().join(", ")),
    CitationStyle::Ieee =>
      format!("[1] {}, \"{title},\" {venue}, {year}.", paper.author_names().join(", ")),
  }
}

/// Renders `paper` in the style named by `tag`, or returns an empty string for unknown tags.
///
/// Tags must match exactly, `"APA"` is unknown.
pub fn format_tag(paper: &Paper, tag: &str) -> String {
  match CitationStyle::from_tag(tag) {
    Some(style) => format(paper, style),
    None => {
      trace!("Unknown citation style tag {tag:?}");
      String::new()
    },
  }
}

/// The BibTeX citation key: first author's name without whitespace followed by the year token.
///
/// Keys are not deduplicated across papers.
pub fn citation_key(paper: &Paper) -> String {
  let stem: String = match paper.authors.first() {
    Some(author) => author.display_name().split_whitespace().collect(),
    None => ANONYMOUS_KEY.to_string(),
  };
  format!("{stem}{}", year_token(paper))
}

/// The rendered year, or [`NO_DATE`].
fn year_token(paper: &Paper) -> String {
  paper.year.map_or_else(|| NO_DATE.to_string(), |year| year.to_string())
}

//! Clipboard and file export of citations.
//!
//! Both exporters only accept loaded [`CitationFormat`]s; a placeholder yields
//! [`CiteshelfError::NotLoaded`]. Front ends bind their copy and download controls to
//! [`ExportControl::for_format`] so the action cannot be triggered early.
//!
//! Copying puts plain text on the clipboard. BibTeX is copied verbatim; the other styles may
//! carry HTML markup (`<i>Journal</i>`), which is parsed and reduced to its text. A primary
//! [`ClipboardBackend`] is tried first and a fallback second. When both fail the copy is
//! reported as [`CopyOutcome::NotCopied`] and nothing else happens.
//!
//! Downloading writes the raw value to `<sanitized title>.<bib|txt>`.
//!
//! # Examples
//!
//! ```no_run
//! use citeshelf::{
//!   citation::{CitationFormat, CitationStyle},
//!   export::FileExporter,
//!   paper::Paper,
//! };
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let paper = Paper::new("My Paper: A Study (2024)!!").with_year(2024);
//! let bibtex = CitationFormat::generate(&paper, CitationStyle::Bibtex);
//! let path = FileExporter::new("citations").export(&paper.title, &bibtex)?;
//! assert!(path.ends_with("My-Paper--A-Study--2024---.bib"));
//! # Ok(())
//! # }
//! ```

use scraper::Html;

use super::*;
use crate::citation::{CitationFormat, CitationStyle};

/// Longest filename stem produced by [`sanitize_filename`].
pub const MAX_FILENAME_LEN: usize = 120;

lazy_static! {
  /// Anything outside the portable filename alphabet.
  static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
}

/// Whether a copy or download control may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportControl {
  /// Style the control exports
  pub style:   CitationStyle,
  /// Whether the control accepts input
  pub enabled: bool,
}

/// A system facility that can receive copied text.
pub trait ClipboardBackend {
  /// Short name used in logs.
  fn name(&self) -> &str;

  /// Places `text` on the clipboard.
  fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Which path, if any, delivered the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
  /// The primary backend accepted the text
  Copied,
  /// The primary backend failed and the fallback accepted the text
  CopiedWithFallback,
  /// Both backends failed
  NotCopied,
}

/// Copies citations using a primary and a fallback backend.
pub struct ClipboardExporter {
  /// Backend tried first
  primary:  Box<dyn ClipboardBackend + Send>,
  /// Backend tried when the primary one fails
  fallback: Box<dyn ClipboardBackend + Send>,
}

/// A file ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
  /// File name including extension
  pub filename:  String,
  /// MIME type of the contents
  pub mime_type: &'static str,
  /// File contents
  pub contents:  String,
}

/// Writes citations into a directory.
#[derive(Debug, Clone)]
pub struct FileExporter {
  /// Target directory
  dir: PathBuf,
}

/// Turns a title into a filename stem.
///
/// Every character outside `[A-Za-z0-9._-]` becomes `-`, and the result is cut to
/// [`MAX_FILENAME_LEN`] characters.
pub fn sanitize_filename(title: &str) -> String {
  UNSAFE_FILENAME_CHARS.replace_all(title, "-").chars().take(MAX_FILENAME_LEN).collect()
}

/// The text a user expects on the clipboard for this format.
pub fn plain_text(format: &CitationFormat) -> String {
  if !format.id.has_markup() {
    return format.value.clone();
  }
  Html::parse_fragment(&format.value).root_element().text().collect()
}

impl ExportControl {
  /// Control state for a format: enabled exactly when the format is loaded.
  pub fn for_format(format: &CitationFormat) -> Self {
    Self { style: format.id, enabled: format.is_loaded }
  }
}

impl CopyOutcome {
  /// Whether the text reached a clipboard.
  pub fn is_copied(&self) -> bool { !matches!(self, Self::NotCopied) }
}

impl ClipboardExporter {
  /// Creates an exporter from two backends.
  pub fn new(
    primary: Box<dyn ClipboardBackend + Send>,
    fallback: Box<dyn ClipboardBackend + Send>,
  ) -> Self {
    Self { primary, fallback }
  }

  /// Copies a loaded format.
  ///
  /// Only an unloaded format is an error; backend failures are absorbed into the outcome.
  pub fn copy(&mut self, format: &CitationFormat) -> Result<CopyOutcome> {
    format.exportable_value()?;
    let text = plain_text(format);

    match self.primary.write_text(&text) {
      Ok(()) => return Ok(CopyOutcome::Copied),
      Err(e) =>
        debug!("{} clipboard failed, trying {}: {e}", self.primary.name(), self.fallback.name()),
    }
    match self.fallback.write_text(&text) {
      Ok(()) => Ok(CopyOutcome::CopiedWithFallback),
      Err(e) => {
        debug!("{} clipboard failed as well: {e}", self.fallback.name());
        Ok(CopyOutcome::NotCopied)
      },
    }
  }
}

impl ExportFile {
  /// The download for one format of a paper titled `title`.
  pub fn for_format(title: &str, format: &CitationFormat) -> Result<Self> {
    let contents = format.exportable_value()?.to_string();
    Ok(Self {
      filename: format!("{}.{}", sanitize_filename(title), format.id.extension()),
      mime_type: format.id.mime_type(),
      contents,
    })
  }

  /// One download holding several formats, separated by blank lines.
  ///
  /// The extension is `.bib` only when every entry is BibTeX.
  pub fn batch(stem: &str, formats: &[CitationFormat]) -> Result<Self> {
    let values = formats.iter().map(CitationFormat::exportable_value).collect::<Result<Vec<_>>>()?;
    let style = if !formats.is_empty() && formats.iter().all(|f| f.id == CitationStyle::Bibtex) {
      CitationStyle::Bibtex
    } else {
      CitationStyle::Mla
    };
    Ok(Self {
      filename:  format!("{}.{}", sanitize_filename(stem), style.extension()),
      mime_type: style.mime_type(),
      contents:  values.join("\n\n"),
    })
  }
}

impl FileExporter {
  /// Exports into `dir`.
  pub fn new(dir: impl AsRef<Path>) -> Self { Self { dir: dir.as_ref().to_path_buf() } }

  /// Writes one format and returns the file path.
  pub fn export(&self, title: &str, format: &CitationFormat) -> Result<PathBuf> {
    self.write(ExportFile::for_format(title, format)?)
  }

  /// Writes several formats into one file and returns its path.
  pub fn export_batch(&self, stem: &str, formats: &[CitationFormat]) -> Result<PathBuf> {
    self.write(ExportFile::batch(stem, formats)?)
  }

  /// Writes a prepared file into the target directory.
  pub fn write(&self, file: ExportFile) -> Result<PathBuf> {
    std::fs::create_dir_all(&self.dir)?;
    let path = self.dir.join(&file.filename);
    debug!("Writing {} citation to path: {path:?}", file.mime_type);
    std::fs::write(&path, file.contents)?;
    Ok(path)
  }
}

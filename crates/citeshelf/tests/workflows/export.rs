use std::fs;

use citeshelf::export::{
  ClipboardBackend, ClipboardExporter, CopyOutcome, ExportControl, FileExporter,
};
use tempfile::tempdir;

use super::*;

struct Unavailable;

impl ClipboardBackend for Unavailable {
  fn name(&self) -> &str { "unavailable" }

  fn write_text(&mut self, _text: &str) -> Result<()> {
    Err(CiteshelfError::Clipboard("no display".into()))
  }
}

#[tokio::test(start_paused = true)]
async fn test_download_after_load() -> TestResult<()> {
  let dir = tempdir()?;
  let citations = MockCitations::answering(&[("bibtex", "@article{vaswani2017}")]);
  let paper = test_paper();
  let cache = CitationFormatCache::open(&paper, Duration::from_secs(8));

  let placeholder = cache.get(CitationStyle::Bibtex).unwrap();
  assert!(!ExportControl::for_format(&placeholder).enabled);
  assert_err!(FileExporter::new(dir.path()).export(&paper.title, &placeholder));

  cache.load(&citations).await;
  let bibtex = cache.get(CitationStyle::Bibtex).unwrap();
  assert!(ExportControl::for_format(&bibtex).enabled);

  let path = FileExporter::new(dir.path()).export(&paper.title, &bibtex)?;
  assert_eq!(path.file_name().unwrap(), "Attention-Is-All-You-Need.bib");
  assert_eq!(fs::read_to_string(&path)?, "@article{vaswani2017}");
  Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_batch_download() -> TestResult<()> {
  let dir = tempdir()?;
  let cache = CitationFormatCache::open(&test_paper(), Duration::ZERO);
  cache.load(&MockCitations::failing()).await;

  let formats = cache.formats();
  let path = FileExporter::new(dir.path().join("nested")).export_batch("all styles", &formats)?;
  assert_eq!(path.file_name().unwrap(), "all-styles.txt");
  let contents = fs::read_to_string(&path)?;
  assert_eq!(contents.split("\n\n").count(), 4);
  Ok(())
}

#[test]
fn test_copy_with_no_clipboard() {
  let format = CitationFormat::loaded(CitationStyle::Apa, "Doe, J. (2020). <i>Title</i>.");
  let mut exporter = ClipboardExporter::new(Box::new(Unavailable), Box::new(Unavailable));
  let outcome = assert_ok!(exporter.copy(&format));
  assert_eq!(outcome, CopyOutcome::NotCopied);
  assert!(!outcome.is_copied());
}

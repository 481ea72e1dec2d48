//! Saving one paper into several libraries.
//!
//! [`LibrarySaveWorkflow::run`] performs, in order:
//!
//! 1. Precondition checks: a bearer token must be held and at least one target selected. Either
//!    failure is reported before any request is made.
//! 2. BibTeX resolution: an already loaded value is reused, otherwise the citation service is
//!    asked once. Failure there never blocks the save, the payload just carries an empty entry.
//! 3. Normalization of the paper into a [`SavePayload`].
//! 4. One save request per target, all in flight at once. Targets are independent: a failure
//!    does not cancel or roll back the others.
//! 5. Aggregation of every outcome into a [`SaveReport`], only after all requests settled.
//!
//! Re-running the workflow re-sends every request; duplicates are for the library service to
//! detect.

use std::collections::BTreeMap;

use futures::future::join_all;

use super::*;
use crate::citation::{CitationFormat, CitationStyle};
use crate::client::CitationService;

/// Libraries the user picked for the next save.
///
/// Selection is transient: it is cleared once a save run completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSelection {
  /// Selected targets keyed by id
  targets: BTreeMap<String, LibraryTarget>,
}

/// Result of saving into one library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
  /// The library
  pub target:        LibraryTarget,
  /// Whether the paper was saved
  pub success:       bool,
  /// Why the save failed
  pub error_message: Option<String>,
}

/// Aggregated outcome of a save run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
  /// One outcome per selected target, ordered by library id
  pub outcomes: Vec<SaveOutcome>,
}

/// Saves papers into the selected libraries.
pub struct LibrarySaveWorkflow<'a, L: ?Sized, C: ?Sized> {
  /// Where papers are saved
  libraries: &'a L,
  /// Where missing BibTeX entries are fetched from
  citations: &'a C,
  /// Owner of the bearer token
  session:   &'a Session,
}

impl TargetSelection {
  /// An empty selection.
  pub fn new() -> Self { Self::default() }

  /// Adds a target; selecting twice keeps one entry.
  pub fn select(&mut self, target: LibraryTarget) { self.targets.insert(target.id.clone(), target); }

  /// Removes a target.
  pub fn deselect(&mut self, id: &str) -> bool { self.targets.remove(id).is_some() }

  /// Selects the target if absent, deselects it otherwise. Returns whether it is now selected.
  pub fn toggle(&mut self, target: LibraryTarget) -> bool {
    if self.deselect(&target.id) {
      false
    } else {
      self.select(target);
      true
    }
  }

  /// Whether the target is selected.
  pub fn contains(&self, id: &str) -> bool { self.targets.contains_key(id) }

  /// Number of selected targets.
  pub fn len(&self) -> usize { self.targets.len() }

  /// Whether nothing is selected.
  pub fn is_empty(&self) -> bool { self.targets.is_empty() }

  /// Selected targets.
  pub fn targets(&self) -> impl Iterator<Item = &LibraryTarget> { self.targets.values() }

  /// Forgets the selection.
  pub fn clear(&mut self) { self.targets.clear(); }
}

impl FromIterator<LibraryTarget> for TargetSelection {
  fn from_iter<I: IntoIterator<Item = LibraryTarget>>(iter: I) -> Self {
    let mut selection = Self::new();
    for target in iter {
      selection.select(target);
    }
    selection
  }
}

impl SaveReport {
  /// Number of libraries the paper was saved into.
  pub fn saved_count(&self) -> usize { self.outcomes.iter().filter(|o| o.success).count() }

  /// Number of libraries that rejected the paper.
  pub fn failed_count(&self) -> usize { self.outcomes.len() - self.saved_count() }

  /// Whether at least one save succeeded.
  pub fn is_success(&self) -> bool { self.saved_count() > 0 }

  /// Outcomes of the failed targets.
  pub fn failed(&self) -> impl Iterator<Item = &SaveOutcome> {
    self.outcomes.iter().filter(|o| !o.success)
  }

  /// A one line description naming every failed target.
  pub fn summary(&self) -> String {
    let failures = self
      .failed()
      .map(|o| {
        format!("{} ({})", o.target.name, o.error_message.as_deref().unwrap_or("unknown error"))
      })
      .collect::<Vec<_>>()
      .join(", ");

    match (self.saved_count(), self.failed_count()) {
      (saved, 0) => format!("Saved to {saved} {}", plural_libraries(saved)),
      (0, _) => format!("Failed to save to any library: {failures}"),
      (saved, _) => format!(
        "Saved to {saved} of {} libraries. Failed: {failures}",
        self.outcomes.len()
      ),
    }
  }
}

impl<'a, L, C> LibrarySaveWorkflow<'a, L, C>
where
  L: LibraryService + ?Sized,
  C: CitationService + ?Sized,
{
  /// Creates the workflow.
  pub fn new(libraries: &'a L, citations: &'a C, session: &'a Session) -> Self {
    Self { libraries, citations, session }
  }

  /// Saves `paper` into every selected target and clears the selection.
  ///
  /// `known_bibtex` is a BibTeX format the caller already holds, e.g. from the view's
  /// citation cache; it is used only when loaded.
  pub async fn run(
    &self,
    paper: &Paper,
    selection: &mut TargetSelection,
    known_bibtex: Option<&CitationFormat>,
  ) -> Result<SaveReport> {
    let token = self.session.require_token()?;
    if selection.is_empty() {
      return Err(CiteshelfError::NoTargetsSelected);
    }

    let bibtex = self.resolve_bibtex(paper, known_bibtex).await;
    let payload = SavePayload::from_paper(paper, bibtex);
    let targets: Vec<LibraryTarget> = selection.targets().cloned().collect();

    debug!("Saving {:?} into {} libraries", paper.title, targets.len());
    let results = join_all(
      targets.iter().map(|target| self.libraries.save_paper(&token, &target.id, &payload)),
    )
    .await;

    let mut rejected = false;
    let outcomes = targets
      .into_iter()
      .zip(results)
      .map(|(target, result)| match result {
        Ok(()) => SaveOutcome { target, success: true, error_message: None },
        Err(e) => {
          rejected |= matches!(e, CiteshelfError::Unauthorized);
          warn!("Saving {:?} into {:?} failed: {e}", paper.title, target.name);
          SaveOutcome { target, success: false, error_message: Some(e.to_string()) }
        },
      })
      .collect();

    if rejected {
      reject(self.session);
    }

    selection.clear();
    let report = SaveReport { outcomes };
    info!("{}", report.summary());
    Ok(report)
  }

  /// Finds a BibTeX entry for the payload, or an empty string.
  pub async fn resolve_bibtex(&self, paper: &Paper, known: Option<&CitationFormat>) -> String {
    if let Some(value) = known.and_then(|f| f.exportable_value().ok()) {
      return value.to_string();
    }
    if !paper.has_external_id() {
      return String::new();
    }

    match self.citations.fetch_citations(&paper.paper_id).await {
      Ok(formats) => formats
        .into_iter()
        .find(|f| CitationStyle::from_tag(&f.id) == Some(CitationStyle::Bibtex))
        .map(|f| f.value)
        .unwrap_or_default(),
      Err(e) => {
        warn!("BibTeX fetch for {:?} failed, saving without it: {e}", paper.paper_id);
        String::new()
      },
    }
  }
}

/// `library` or `libraries`.
fn plural_libraries(count: usize) -> &'static str {
  if count == 1 {
    "library"
  } else {
    "libraries"
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_selection() {
    let mut selection = TargetSelection::new();
    assert!(selection.toggle(LibraryTarget::new("1", "One")));
    selection.select(LibraryTarget::new("1", "One again"));
    selection.select(LibraryTarget::new("2", "Two"));
    assert_eq!(selection.len(), 2);
    assert!(!selection.toggle(LibraryTarget::new("2", "Two")));
    assert!(selection.contains("1") && !selection.contains("2"));
    selection.clear();
    assert!(selection.is_empty());
  }

  #[test]
  fn test_report_summary() {
    let ok = |id: &str| SaveOutcome {
      target:        LibraryTarget::new(id, format!("Lib {id}")),
      success:       true,
      error_message: None,
    };
    let failed = |id: &str| SaveOutcome {
      target:        LibraryTarget::new(id, format!("Lib {id}")),
      success:       false,
      error_message: Some("already saved".into()),
    };

    let report = SaveReport { outcomes: vec![ok("1")] };
    assert_eq!(report.summary(), "Saved to 1 library");

    let report = SaveReport { outcomes: vec![ok("1"), failed("2"), ok("3")] };
    assert_eq!(report.summary(), "Saved to 2 of 3 libraries. Failed: Lib 2 (already saved)");
    assert!(report.is_success());

    let report = SaveReport { outcomes: vec![failed("2")] };
    assert!(!report.is_success());
    assert_eq!(report.summary(), "Failed to save to any library: Lib 2 (already saved)");
  }
}

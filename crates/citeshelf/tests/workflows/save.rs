use citeshelf::library::{create_library, list_libraries};
use tempfile::tempdir;

use super::*;

#[traced_test]
#[tokio::test(start_paused = true)]
async fn test_partial_failure_reports_every_target() -> TestResult<()> {
  let libraries = MockLibraries::new()
    .with_delay("1", Duration::from_millis(300))
    .failing("2", MockFailure::Rejected("Paper already in library".into()))
    .with_delay("3", Duration::from_millis(100));
  let citations = MockCitations::answering(&[("bibtex", "@article{vaswani2017}")]);
  let session = Session::with_token("secret");
  let workflow = LibrarySaveWorkflow::new(&libraries, &citations, &session);

  let mut selection: TargetSelection = targets(&["1", "2", "3"]).into_iter().collect();
  let report = workflow.run(&test_paper(), &mut selection, None).await?;

  assert_eq!(report.outcomes.len(), 3);
  assert_eq!(report.saved_count(), 2);
  assert_eq!(report.failed_count(), 1);
  let failed: Vec<_> = report.failed().collect();
  assert_eq!(failed[0].target.id, "2");
  assert_eq!(failed[0].error_message.as_deref(), Some("API error (400): Paper already in library"));
  assert_eq!(
    report.summary(),
    "Saved to 2 of 3 libraries. Failed: Library 2 (API error (400): Paper already in library)"
  );

  // Slow targets still settled before the report was built
  let saved: Vec<String> = libraries.saved().into_iter().map(|(id, _)| id).collect();
  assert_eq!(saved.len(), 2);
  assert!(saved.contains(&"1".to_string()) && saved.contains(&"3".to_string()));
  assert!(selection.is_empty());
  assert!(libraries.tokens().iter().all(|t| t == "secret"));
  Ok(())
}

#[tokio::test]
async fn test_payload_carries_fetched_bibtex() -> TestResult<()> {
  let libraries = MockLibraries::new();
  let citations = MockCitations::answering(&[("mla", "x"), ("bibtex", "@article{vaswani2017}")]);
  let session = Session::with_token("secret");
  let workflow = LibrarySaveWorkflow::new(&libraries, &citations, &session);

  let mut selection: TargetSelection = targets(&["a"]).into_iter().collect();
  let report = workflow.run(&test_paper(), &mut selection, None).await?;
  assert!(report.is_success());
  assert_eq!(citations.call_count(), 1);

  let (_, payload) = &libraries.saved()[0];
  assert_eq!(payload.bibtex, "@article{vaswani2017}");
  assert_eq!(payload.venue, "NeurIPS");
  assert_eq!(payload.year, 2017);
  assert_eq!(payload.authors.len(), 2);
  Ok(())
}

#[tokio::test]
async fn test_loaded_bibtex_is_reused() -> TestResult<()> {
  let libraries = MockLibraries::new();
  let citations = MockCitations::answering(&[("bibtex", "@article{remote}")]);
  let session = Session::with_token("secret");
  let workflow = LibrarySaveWorkflow::new(&libraries, &citations, &session);

  let known = CitationFormat::loaded(CitationStyle::Bibtex, "@article{cached}");
  let mut selection: TargetSelection = targets(&["a", "b"]).into_iter().collect();
  workflow.run(&test_paper(), &mut selection, Some(&known)).await?;

  assert_eq!(citations.call_count(), 0);
  assert!(libraries.saved().iter().all(|(_, p)| p.bibtex == "@article{cached}"));
  Ok(())
}

#[tokio::test]
async fn test_placeholder_bibtex_is_not_reused() -> TestResult<()> {
  let libraries = MockLibraries::new();
  let citations = MockCitations::answering(&[("bibtex", "@article{remote}")]);
  let session = Session::with_token("secret");
  let workflow = LibrarySaveWorkflow::new(&libraries, &citations, &session);

  let placeholder = CitationFormat::placeholder(CitationStyle::Bibtex);
  let bibtex = workflow.resolve_bibtex(&test_paper(), Some(&placeholder)).await;
  assert_eq!(bibtex, "@article{remote}");
  assert_eq!(citations.call_count(), 1);
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_bibtex_failure_does_not_block_save() -> TestResult<()> {
  let libraries = MockLibraries::new();
  let citations = MockCitations::failing();
  let session = Session::with_token("secret");
  let workflow = LibrarySaveWorkflow::new(&libraries, &citations, &session);

  let mut selection: TargetSelection = targets(&["a"]).into_iter().collect();
  let report = workflow.run(&test_paper(), &mut selection, None).await?;

  assert_eq!(report.saved_count(), 1);
  assert_eq!(libraries.saved()[0].1.bibtex, "");
  Ok(())
}

#[tokio::test]
async fn test_unauthenticated_makes_no_requests() {
  let libraries = MockLibraries::new();
  let citations = MockCitations::answering(&[]);
  let session = Session::anonymous();
  let workflow = LibrarySaveWorkflow::new(&libraries, &citations, &session);

  let mut selection: TargetSelection = targets(&["a"]).into_iter().collect();
  let result = workflow.run(&test_paper(), &mut selection, None).await;

  assert!(matches!(result, Err(CiteshelfError::NotAuthenticated)));
  assert_eq!(libraries.call_count(), 0);
  assert_eq!(citations.call_count(), 0);
  assert_eq!(selection.len(), 1);
}

#[tokio::test]
async fn test_empty_selection_makes_no_requests() {
  let libraries = MockLibraries::new();
  let citations = MockCitations::answering(&[]);
  let session = Session::with_token("secret");
  let workflow = LibrarySaveWorkflow::new(&libraries, &citations, &session);

  let result = workflow.run(&test_paper(), &mut TargetSelection::new(), None).await;
  assert!(matches!(result, Err(CiteshelfError::NoTargetsSelected)));
  assert_eq!(libraries.call_count() + citations.call_count(), 0);
}

#[traced_test]
#[tokio::test]
async fn test_rejected_token_clears_session() -> TestResult<()> {
  let dir = tempdir()?;
  let path = dir.path().join("session");
  let session = Session::load(&path)?;
  session.login("stale-token")?;
  assert!(path.exists());

  let libraries = MockLibraries::new().failing("b", MockFailure::Unauthorized);
  let citations = MockCitations::answering(&[]);
  let workflow = LibrarySaveWorkflow::new(&libraries, &citations, &session);

  let mut selection: TargetSelection = targets(&["a", "b"]).into_iter().collect();
  let report = workflow.run(&test_paper(), &mut selection, None).await?;

  assert_eq!(report.saved_count(), 1);
  assert!(!session.is_authenticated());
  assert!(!path.exists());

  let mut selection: TargetSelection = targets(&["a"]).into_iter().collect();
  let retry = workflow.run(&test_paper(), &mut selection, None).await;
  assert!(matches!(retry, Err(CiteshelfError::NotAuthenticated)));
  Ok(())
}

#[tokio::test]
async fn test_rerun_sends_duplicates() -> TestResult<()> {
  let libraries = MockLibraries::new();
  let citations = MockCitations::answering(&[]);
  let session = Session::with_token("secret");
  let workflow = LibrarySaveWorkflow::new(&libraries, &citations, &session);

  for _ in 0..2 {
    let mut selection: TargetSelection = targets(&["a"]).into_iter().collect();
    workflow.run(&test_paper(), &mut selection, None).await?;
  }
  assert_eq!(libraries.saved().len(), 2);
  Ok(())
}

#[tokio::test]
async fn test_create_library() {
  let libraries = MockLibraries::new();
  let session = Session::with_token("secret");

  let created =
    assert_ok!(create_library(&libraries, &session, NewLibrary::new("  Thesis  ")).await);
  assert_eq!(created.name, "Thesis");
  assert_eq!(created.id, "new-1");

  let blank = create_library(&libraries, &session, NewLibrary::new("   ")).await;
  assert!(matches!(assert_err!(blank), CiteshelfError::EmptyLibraryName));
  assert_eq!(libraries.call_count(), 1);

  let anonymous = create_library(&libraries, &Session::anonymous(), NewLibrary::new("x")).await;
  assert!(matches!(anonymous, Err(CiteshelfError::NotAuthenticated)));
}

#[tokio::test]
async fn test_create_library_surfaces_server_message() {
  let libraries =
    MockLibraries::new().failing_create(MockFailure::Rejected("Library name taken".into()));
  let session = Session::with_token("secret");

  let result = create_library(&libraries, &session, NewLibrary::new("Thesis")).await;
  match result {
    Err(CiteshelfError::Api { message, .. }) => assert_eq!(message, "Library name taken"),
    other => panic!("unexpected result: {other:?}"),
  }
  assert!(session.is_authenticated());

  let libraries = MockLibraries::new().failing_create(MockFailure::Unauthorized);
  let result = create_library(&libraries, &session, NewLibrary::new("Thesis")).await;
  assert!(matches!(result, Err(CiteshelfError::Unauthorized)));
  assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_list_libraries() -> TestResult<()> {
  let libraries = MockLibraries::new();
  let session = Session::with_token("secret");

  let listing = list_libraries(&libraries, &session).await?;
  assert_eq!(listing.all().map(ToString::to_string).collect::<Vec<_>>(), [
    "Reading list (owner)",
    "Lab (viewer)"
  ]);

  let anonymous = list_libraries(&libraries, &Session::anonymous()).await;
  assert!(matches!(anonymous, Err(CiteshelfError::NotAuthenticated)));
  assert_eq!(libraries.call_count(), 1);

  let rejecting = MockLibraries::new().failing_list(MockFailure::Unauthorized);
  assert_err!(list_libraries(&rejecting, &session).await);
  assert!(!session.is_authenticated());
  Ok(())
}

use super::*;

#[traced_test]
#[tokio::test(start_paused = true)]
async fn test_open_view_with_remote_formats() {
  let citations = MockCitations::answering(&[
    ("bibtex", "@inproceedings{vaswani2017attention}"),
    ("mla", "Vaswani, Ashish, et al. \"Attention Is All You Need.\" <i>NeurIPS</i>, 2017."),
    ("apa", "Vaswani, A. (2017). Attention Is All You Need."),
    ("ieee", "[1] A. Vaswani et al."),
  ])
  .with_delay(Duration::from_millis(500));
  let cache = CitationFormatCache::open(&test_paper(), Duration::from_secs(8));

  // Nothing is exportable while the fetch is in flight
  let (_, before) = tokio::join!(cache.load(&citations), async {
    tokio::time::sleep(Duration::from_millis(100)).await;
    cache.pending()
  });
  assert_eq!(before, CitationStyle::ALL.to_vec());

  cache.settle().await;
  assert!(cache.pending().is_empty());
  assert_eq!(citations.call_count(), 1);
  assert_eq!(cache.get(CitationStyle::Ieee).unwrap().value, "[1] A. Vaswani et al.");
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_falls_back_locally() {
  let citations = MockCitations::failing();
  let paper = test_paper();
  let cache = CitationFormatCache::open(&paper, Duration::from_secs(8));
  cache.load(&citations).await;

  assert_eq!(
    cache.get(CitationStyle::Apa).unwrap().value,
    "Ashish Vaswani, Noam Shazeer (2017). Attention Is All You Need. NeurIPS."
  );
  assert_eq!(cache.pending(), vec![CitationStyle::Bibtex]);

  cache.settle().await;
  let bibtex = cache.get(CitationStyle::Bibtex).unwrap();
  assert!(bibtex.is_loaded);
  assert!(bibtex.value.starts_with("@inproceedings{AshishVaswani2017,"));
}

#[tokio::test(start_paused = true)]
async fn test_reopened_view_fetches_again() {
  let citations = MockCitations::answering(&[("mla", "remote mla")]);
  let cache = CitationFormatCache::open(&test_paper(), Duration::from_secs(8));

  cache.load(&citations).await;
  cache.load(&citations).await;
  assert_eq!(citations.call_count(), 1);

  cache.close();
  assert!(cache.formats().iter().all(|f| !f.is_loaded && f.value.is_empty()));

  cache.reopen();
  cache.load(&citations).await;
  assert_eq!(citations.call_count(), 2);
}

#[tokio::test]
async fn test_paper_without_id_never_fetches() -> TestResult<()> {
  let citations = MockCitations::answering(&[("mla", "remote")]);
  let libraries = MockLibraries::new();
  let session = Session::with_token("secret");
  let paper = Paper::new("Local Notes").with_author("Ada Lovelace").with_year(1843);

  let cache = CitationFormatCache::open(&paper, Duration::from_secs(8));
  cache.load(&citations).await;
  assert!(cache.pending().is_empty());

  let workflow = LibrarySaveWorkflow::new(&libraries, &citations, &session);
  assert_eq!(workflow.resolve_bibtex(&paper, None).await, "");
  assert_eq!(citations.call_count(), 0);
  Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cached_bibtex_feeds_save() -> TestResult<()> {
  let citations = MockCitations::answering(&[("bibtex", "@article{from_view}")]);
  let libraries = MockLibraries::new();
  let session = Session::with_token("secret");
  let paper = test_paper();

  let cache = CitationFormatCache::open(&paper, Duration::from_secs(8));
  cache.load(&citations).await;

  let workflow = LibrarySaveWorkflow::new(&libraries, &citations, &session);
  let mut selection: TargetSelection = targets(&["1"]).into_iter().collect();
  let known = cache.get(CitationStyle::Bibtex);
  workflow.run(&paper, &mut selection, known.as_ref()).await?;

  assert_eq!(citations.call_count(), 1);
  assert_eq!(libraries.saved()[0].1.bibtex, "@article{from_view}");
  Ok(())
}

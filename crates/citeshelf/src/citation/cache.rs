//! Per-view cache of citation formats.
//!
//! When a paper detail view opens, a [`CitationFormatCache`] is created for that paper. It
//! holds one entry per [`CitationStyle`], seeded as placeholders (BibTeX is loaded right away
//! when the paper payload embeds it), and performs at most one remote fetch for the lifetime
//! of the view.
//!
//! The fetch guard is a [`FetchState`] that is checked and advanced under the cache lock before
//! the request is issued, so concurrent triggers cannot both observe `NotStarted`.
//!
//! Claiming the fetch yields a [`FetchTicket`] bound to the current view session. The outcome of
//! the request is a [`FetchResult`] handed to [`CitationFormatCache::apply`] with that ticket, and
//! is dropped if the view was closed or reopened in the meantime:
//! - `Ok(formats)` merges every entry whose id matches a known style.
//! - `Err(_)` generates MLA, APA and IEEE locally. A seeded BibTeX entry is left untouched.
//!
//! Entries that are still placeholders once the fetch is done are generated locally after the
//! configured fallback delay, see [`CitationFormatCache::resolve_stale`].
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use citeshelf::{
//!   citation::{cache::CitationFormatCache, CitationStyle},
//!   client::ApiClient,
//!   paper::Paper,
//!   Config,
//! };
//!
//! # async fn example(paper: Paper) -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(&Config::default())?;
//! let cache = CitationFormatCache::open(&paper, Duration::from_secs(8));
//!
//! // A second call is a no-op
//! cache.load(&client).await;
//! cache.load(&client).await;
//! cache.settle().await;
//!
//! assert!(cache.is_loaded(CitationStyle::Ieee));
//! # Ok(())
//! # }
//! ```

use std::{collections::BTreeMap, sync::PoisonError};

use tokio::time::Instant;

use super::*;
use crate::client::CitationService;

/// Outcome of the remote citation request.
pub type FetchResult = Result<Vec<RemoteFormat>>;

/// Progress of the single remote fetch a view is allowed to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
  /// No fetch has been attempted
  NotStarted,
  /// A fetch has been issued and not yet applied
  InFlight,
  /// The fetch completed, failed, or was skipped
  Done,
}

/// Right to apply the fetch result of one view session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Citation formats of one open paper.
#[derive(Debug)]
pub struct CitationFormatCache {
  /// The paper this view was opened for
  paper:          Paper,
  /// How long placeholders may remain after the fetch is done
  fallback_after: Duration,
  /// Guarded mutable state, never held across an await point
  state:          Mutex<CacheState>,
}

/// Mutable part of the cache.
#[derive(Debug)]
struct CacheState {
  /// Fetch guard
  fetch:      FetchState,
  /// One entry per style
  formats:    BTreeMap<CitationStyle, CitationFormat>,
  /// When the fetch reached [`FetchState::Done`]
  settled_at: Option<Instant>,
  /// View session, advanced on every close and reopen
  session:    u64,
}

impl CacheState {
  /// Fresh state seeded from `paper`.
  fn seeded(paper: &Paper) -> Self {
    let mut formats: BTreeMap<_, _> =
      CitationStyle::ALL.into_iter().map(|s| (s, CitationFormat::placeholder(s))).collect();
    if let Some(bibtex) = paper.bibtex.as_deref().filter(|b| !b.trim().is_empty()) {
      formats.insert(CitationStyle::Bibtex, CitationFormat::loaded(CitationStyle::Bibtex, bibtex));
    }
    Self { fetch: FetchState::NotStarted, formats, settled_at: None, session: 0 }
  }

  /// Replaces a placeholder with a locally generated value.
  fn generate_if_pending(&mut self, paper: &Paper, style: CitationStyle) -> bool {
    match self.formats.get(&style) {
      Some(format) if format.is_loaded => false,
      _ => {
        self.formats.insert(style, CitationFormat::generate(paper, style));
        true
      },
    }
  }

  /// Styles that are still placeholders.
  fn pending(&self) -> Vec<CitationStyle> {
    self.formats.values().filter(|f| !f.is_loaded).map(|f| f.id).collect()
  }
}

impl CitationFormatCache {
  /// Opens the cache for a paper detail view.
  pub fn open(paper: &Paper, fallback_after: Duration) -> Self {
    Self {
      paper: paper.clone(),
      fallback_after,
      state: Mutex::new(CacheState::seeded(paper)),
    }
  }

  /// The paper this cache belongs to.
  pub fn paper(&self) -> &Paper { &self.paper }

  /// Current fetch guard state.
  pub fn fetch_state(&self) -> FetchState { self.lock().fetch }

  /// A snapshot of one format.
  pub fn get(&self, style: CitationStyle) -> Option<CitationFormat> {
    self.lock().formats.get(&style).cloned()
  }

  /// A snapshot of every format in display order.
  pub fn formats(&self) -> Vec<CitationFormat> { self.lock().formats.values().cloned().collect() }

  /// Whether the given format may be exported.
  pub fn is_loaded(&self, style: CitationStyle) -> bool {
    self.lock().formats.get(&style).is_some_and(|f| f.is_loaded)
  }

  /// Styles still waiting for a value.
  pub fn pending(&self) -> Vec<CitationStyle> { self.lock().pending() }

  /// Claims the right to fetch.
  ///
  /// Returns a ticket exactly once per view session, for the caller that must issue the
  /// request. Papers without an external id are never fetched; their placeholders are generated
  /// locally.
  pub fn begin_fetch(&self) -> Option<FetchTicket> {
    let mut state = self.lock();
    if state.fetch != FetchState::NotStarted {
      trace!("Citation fetch for {:?} already {:?}", self.paper.paper_id, state.fetch);
      return None;
    }

    if !self.paper.has_external_id() {
      debug!("Paper {:?} has no external id, generating citations locally", self.paper.title);
      for style in CitationStyle::ALL {
        state.generate_if_pending(&self.paper, style);
      }
      state.fetch = FetchState::Done;
      state.settled_at = Some(Instant::now());
      return None;
    }

    state.fetch = FetchState::InFlight;
    Some(FetchTicket(state.session))
  }

  /// Applies the outcome of the remote fetch claimed with `ticket`.
  ///
  /// Returns `false` and leaves the cache untouched when the ticket belongs to a closed session.
  pub fn apply(&self, ticket: FetchTicket, result: FetchResult) -> bool {
    let mut state = self.lock();
    if ticket.0 != state.session || state.fetch != FetchState::InFlight {
      debug!("Dropping citation fetch for {:?} from a closed view", self.paper.paper_id);
      return false;
    }
    match result {
      Ok(remote) => {
        let mut merged = 0;
        for entry in remote {
          let Some(style) = CitationStyle::from_tag(&entry.id) else {
            trace!("Ignoring unknown citation format {:?}", entry.id);
            continue;
          };
          state.formats.insert(style, CitationFormat::loaded(style, entry.value));
          merged += 1;
        }
        debug!("Merged {merged} remote citation formats for {:?}", self.paper.paper_id);
      },
      Err(e) => {
        warn!("Citation fetch for {:?} failed, generating locally: {e}", self.paper.paper_id);
        for style in [CitationStyle::Mla, CitationStyle::Apa, CitationStyle::Ieee] {
          state.generate_if_pending(&self.paper, style);
        }
      },
    }
    state.fetch = FetchState::Done;
    state.settled_at = Some(Instant::now());
    true
  }

  /// Fetches the formats once, applying the result.
  ///
  /// Concurrent or repeated calls after the first are no-ops.
  pub async fn load<S: CitationService + ?Sized>(&self, service: &S) {
    let Some(ticket) = self.begin_fetch() else {
      return;
    };
    let result = service.fetch_citations(&self.paper.paper_id).await;
    if self.apply(ticket, result) && self.fallback_after.is_zero() {
      self.resolve_stale();
    }
  }

  /// Generates every remaining placeholder locally once the fallback delay has passed.
  ///
  /// Returns how many entries were generated.
  pub fn resolve_stale(&self) -> usize {
    let mut state = self.lock();
    let Some(settled_at) = state.settled_at else {
      return 0;
    };
    if settled_at.elapsed() < self.fallback_after {
      return 0;
    }

    let pending = state.pending();
    for style in &pending {
      state.generate_if_pending(&self.paper, *style);
    }
    if !pending.is_empty() {
      warn!(
        "Citation service never returned {pending:?} for {:?}, generated locally",
        self.paper.paper_id
      );
    }
    pending.len()
  }

  /// Waits out the fallback delay if any placeholder remains after the fetch, then resolves it.
  ///
  /// A delay past the clock's range never elapses and returns at once.
  pub async fn settle(&self) {
    let deadline = {
      let state = self.lock();
      match state.settled_at {
        Some(settled_at) if !state.pending().is_empty() => {
          let Some(deadline) = settled_at.checked_add(self.fallback_after) else {
            warn!("Citation fallback delay {:?} is out of range, skipping it", self.fallback_after);
            return;
          };
          deadline
        },
        _ => return,
      }
    };
    tokio::time::sleep_until(deadline).await;
    self.resolve_stale();
  }

  /// Discards every value, as when the view closes.
  pub fn close(&self) {
    let mut state = self.lock();
    state.formats =
      CitationStyle::ALL.into_iter().map(|s| (s, CitationFormat::placeholder(s))).collect();
    state.fetch = FetchState::NotStarted;
    state.settled_at = None;
    state.session += 1;
  }

  /// Starts a fresh view session for the same paper.
  pub fn reopen(&self) {
    let mut state = self.lock();
    let session = state.session + 1;
    *state = CacheState::seeded(&self.paper);
    state.session = session;
  }

  /// Locks the state, recovering it if a panicking thread poisoned the lock.
  fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;

  /// Citation service answering from a fixed script.
  struct ScriptedService {
    response: Option<Vec<RemoteFormat>>,
    delay:    Duration,
    calls:    AtomicUsize,
  }

  impl ScriptedService {
    fn answering(formats: &[(&str, &str)]) -> Self {
      Self {
        response: Some(
          formats
            .iter()
            .map(|(id, value)| RemoteFormat {
              id:    id.to_string(),
              label: id.to_uppercase(),
              value: value.to_string(),
            })
            .collect(),
        ),
        delay:    Duration::from_millis(50),
        calls:    AtomicUsize::new(0),
      }
    }

    fn failing() -> Self {
      Self { response: None, delay: Duration::from_millis(50), calls: AtomicUsize::new(0) }
    }
  }

  #[async_trait]
  impl CitationService for ScriptedService {
    async fn fetch_citations(&self, _paper_id: &str) -> Result<Vec<RemoteFormat>> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      tokio::time::sleep(self.delay).await;
      self.response.clone().ok_or(CiteshelfError::Api { status: 503, message: "down".into() })
    }
  }

  fn paper() -> Paper {
    Paper::new("Deep Learning").with_id("p1").with_author("Yann LeCun").with_year(2015)
  }

  #[test]
  fn test_open_seeds_placeholders() {
    let cache = CitationFormatCache::open(&paper(), Duration::from_secs(8));
    assert_eq!(cache.fetch_state(), FetchState::NotStarted);
    assert_eq!(cache.pending(), CitationStyle::ALL.to_vec());
    assert!(cache.formats().iter().all(|f| f.value.is_empty()));
  }

  #[test]
  fn test_open_seeds_embedded_bibtex() {
    let mut paper = paper();
    paper.bibtex = Some("@article{x}".into());
    let cache = CitationFormatCache::open(&paper, Duration::from_secs(8));
    let bibtex = cache.get(CitationStyle::Bibtex).unwrap();
    assert!(bibtex.is_loaded);
    assert_eq!(bibtex.value, "@article{x}");
  }

  #[traced_test]
  #[tokio::test(start_paused = true)]
  async fn test_concurrent_triggers_fetch_once() {
    let service = ScriptedService::answering(&[("apa", "remote apa")]);
    let cache = CitationFormatCache::open(&paper(), Duration::from_secs(8));

    tokio::join!(cache.load(&service), cache.load(&service), cache.load(&service));
    cache.load(&service).await;

    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.fetch_state(), FetchState::Done);
    assert_eq!(cache.get(CitationStyle::Apa).unwrap().value, "remote apa");
  }

  #[tokio::test(start_paused = true)]
  async fn test_success_merges_matching_ids() {
    let service = ScriptedService::answering(&[
      ("bibtex", "@inproceedings{remote}"),
      ("mla", "remote mla"),
      ("chicago", "ignored"),
    ]);
    let cache = CitationFormatCache::open(&paper(), Duration::from_secs(8));
    cache.load(&service).await;

    assert_eq!(cache.get(CitationStyle::Bibtex).unwrap().value, "@inproceedings{remote}");
    assert_eq!(cache.get(CitationStyle::Mla).unwrap().value, "remote mla");
    assert_eq!(cache.pending(), vec![CitationStyle::Apa, CitationStyle::Ieee]);
  }

  #[tokio::test(start_paused = true)]
  async fn test_unmatched_entries_fall_back_after_delay() {
    let service = ScriptedService::answering(&[("mla", "remote mla")]);
    let cache = CitationFormatCache::open(&paper(), Duration::from_secs(8));
    cache.load(&service).await;

    assert_eq!(cache.resolve_stale(), 0);
    tokio::time::advance(Duration::from_secs(9)).await;
    assert_eq!(cache.resolve_stale(), 3);

    assert!(cache.pending().is_empty());
    assert_eq!(cache.get(CitationStyle::Mla).unwrap().value, "remote mla");
    assert_eq!(
      cache.get(CitationStyle::Apa).unwrap().value,
      format(&paper(), CitationStyle::Apa)
    );
  }

  #[tokio::test(start_paused = true)]
  async fn test_settle_waits_for_fallback() {
    let service = ScriptedService::answering(&[]);
    let cache = CitationFormatCache::open(&paper(), Duration::from_secs(2));
    cache.load(&service).await;
    assert_eq!(cache.pending().len(), 4);

    cache.settle().await;
    assert!(cache.pending().is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn test_zero_fallback_resolves_immediately() {
    let service = ScriptedService::answering(&[("ieee", "remote ieee")]);
    let cache = CitationFormatCache::open(&paper(), Duration::ZERO);
    cache.load(&service).await;
    assert!(cache.pending().is_empty());
    assert_eq!(cache.get(CitationStyle::Ieee).unwrap().value, "remote ieee");
  }

  #[traced_test]
  #[tokio::test(start_paused = true)]
  async fn test_failure_generates_text_styles_only() {
    let mut seeded = paper();
    seeded.bibtex = Some("@misc{seeded}".into());
    let service = ScriptedService::failing();

    let cache = CitationFormatCache::open(&seeded, Duration::from_secs(8));
    cache.load(&service).await;

    assert!(logs_contain("generating locally"));
    assert_eq!(cache.get(CitationStyle::Bibtex).unwrap().value, "@misc{seeded}");
    for style in [CitationStyle::Mla, CitationStyle::Apa, CitationStyle::Ieee] {
      let entry = cache.get(style).unwrap();
      assert!(entry.is_loaded);
      assert_eq!(entry.value, format(&seeded, style));
    }

    // Without a seeded value, BibTeX waits for the stale fallback
    let cache = CitationFormatCache::open(&paper(), Duration::from_secs(8));
    cache.load(&service).await;
    assert_eq!(cache.pending(), vec![CitationStyle::Bibtex]);
  }

  #[tokio::test]
  async fn test_paper_without_id_is_never_fetched() {
    let service = ScriptedService::answering(&[("apa", "remote")]);
    let cache = CitationFormatCache::open(&Paper::new("Local Only"), Duration::from_secs(8));
    cache.load(&service).await;

    assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    assert_eq!(cache.fetch_state(), FetchState::Done);
    assert!(cache.pending().is_empty());
  }

  #[traced_test]
  #[tokio::test(start_paused = true)]
  async fn test_late_response_after_close_is_dropped() {
    let mut service = ScriptedService::answering(&[("apa", "late apa")]);
    service.delay = Duration::from_secs(1);
    let cache = CitationFormatCache::open(&paper(), Duration::from_secs(8));

    tokio::join!(cache.load(&service), async {
      tokio::time::sleep(Duration::from_millis(100)).await;
      cache.close();
    });
    assert!(logs_contain("from a closed view"));
    assert_eq!(cache.fetch_state(), FetchState::NotStarted);
    assert!(!cache.is_loaded(CitationStyle::Apa));

    // Same with a reopen while the old request is still out
    tokio::join!(cache.load(&service), async {
      tokio::time::sleep(Duration::from_millis(100)).await;
      cache.reopen();
    });
    assert_eq!(cache.fetch_state(), FetchState::NotStarted);
    cache.load(&service).await;
    assert_eq!(service.calls.load(Ordering::SeqCst), 3);
    assert_eq!(cache.get(CitationStyle::Apa).unwrap().value, "late apa");
  }

  #[test]
  fn test_stale_ticket_is_rejected() {
    let cache = CitationFormatCache::open(&paper(), Duration::from_secs(8));
    let ticket = cache.begin_fetch().unwrap();
    assert_eq!(cache.begin_fetch(), None);

    cache.reopen();
    let fresh = cache.begin_fetch().unwrap();
    assert!(!cache.apply(ticket, Ok(vec![])));
    assert_eq!(cache.fetch_state(), FetchState::InFlight);
    assert!(cache.apply(fresh, Ok(vec![])));
    assert_eq!(cache.fetch_state(), FetchState::Done);
  }

  #[tokio::test(start_paused = true)]
  async fn test_out_of_range_fallback_does_not_panic() {
    let cache = CitationFormatCache::open(&paper(), Duration::from_secs(u64::MAX));
    let ticket = cache.begin_fetch().unwrap();
    assert!(cache.apply(ticket, Ok(vec![])));

    cache.settle().await;
    assert_eq!(cache.resolve_stale(), 0);
    assert_eq!(cache.pending().len(), 4);
  }

  #[tokio::test(start_paused = true)]
  async fn test_close_and_reopen() {
    let mut seeded = paper();
    seeded.bibtex = Some("@misc{seeded}".into());
    let service = ScriptedService::answering(&[("mla", "remote mla")]);
    let cache = CitationFormatCache::open(&seeded, Duration::from_secs(8));
    cache.load(&service).await;

    cache.close();
    assert_eq!(cache.fetch_state(), FetchState::NotStarted);
    assert!(cache.formats().iter().all(|f| !f.is_loaded && f.value.is_empty()));

    cache.reopen();
    assert!(cache.is_loaded(CitationStyle::Bibtex));
    cache.load(&service).await;
    assert_eq!(service.calls.load(Ordering::SeqCst), 2);
  }
}

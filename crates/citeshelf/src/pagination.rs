//! Paging and filtering over result lists.
//!
//! Search, recommendation and library pages all show papers a page at a time after applying
//! the same set of filters. [`PaperFilter`] narrows a list, [`Paginator`] cuts it into pages:
//!
//! ```
//! use citeshelf::{
//!   pagination::{PaperFilter, Paginator},
//!   paper::Paper,
//! };
//!
//! let papers: Vec<Paper> =
//!   (2010..2030).map(|year| Paper::new(format!("Paper {year}")).with_year(year)).collect();
//!
//! let recent = PaperFilter::new().with_year_range(Some(2020), None).apply(&papers);
//! let page = Paginator::new(4).page(&recent, 3);
//! assert_eq!(page.number, 3);
//! assert_eq!(page.total_pages, 3);
//! assert_eq!(page.items.len(), 2);
//! ```

use super::*;

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Criteria a paper must meet to be listed.
///
/// Every criterion is optional; the default filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperFilter {
  /// Earliest publication year, inclusive
  pub year_from:        Option<i32>,
  /// Latest publication year, inclusive
  pub year_to:          Option<i32>,
  /// Field of study, compared case-insensitively
  pub field_of_study:   Option<String>,
  /// Keep only papers with an open-access PDF
  pub open_access_only: bool,
  /// Minimum citation count
  pub min_citations:    u64,
}

/// Splits lists into fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
  /// Items per page, never zero
  page_size: usize,
}

/// One page of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
  /// Items on this page
  pub items:       &'a [T],
  /// 1-based page number, after clamping
  pub number:      usize,
  /// Index of the first item of this page in the whole list
  pub offset:      usize,
  /// Number of pages, at least 1
  pub total_pages: usize,
  /// Number of items across all pages
  pub total_items: usize,
}

impl PaperFilter {
  /// A filter that keeps everything.
  pub fn new() -> Self { Self::default() }

  /// Restricts publication years; `None` leaves that side open.
  pub fn with_year_range(mut self, from: Option<i32>, to: Option<i32>) -> Self {
    self.year_from = from;
    self.year_to = to;
    self
  }

  /// Restricts to one field of study.
  pub fn with_field_of_study(mut self, field: impl Into<String>) -> Self {
    self.field_of_study = Some(field.into()).filter(|f| !f.trim().is_empty());
    self
  }

  /// Keeps only open-access papers.
  pub fn open_access_only(mut self, only: bool) -> Self {
    self.open_access_only = only;
    self
  }

  /// Requires at least `count` citations.
  pub fn with_min_citations(mut self, count: u64) -> Self {
    self.min_citations = count;
    self
  }

  /// Whether the filter keeps everything.
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Whether `paper` passes every criterion.
  ///
  /// Papers without a year are dropped as soon as a year bound is set.
  pub fn matches(&self, paper: &Paper) -> bool {
    if self.year_from.is_some() || self.year_to.is_some() {
      let Some(year) = paper.year else {
        return false;
      };
      if self.year_from.is_some_and(|from| year < from) || self.year_to.is_some_and(|to| year > to) {
        return false;
      }
    }

    if let Some(field) = &self.field_of_study {
      let field = field.trim();
      if !paper.fields_of_study.iter().any(|f| f.trim().eq_ignore_ascii_case(field)) {
        return false;
      }
    }

    (!self.open_access_only || paper.is_open_access()) && paper.citation_count >= self.min_citations
  }

  /// The papers that pass, in their original order.
  pub fn apply<'a>(&self, papers: &'a [Paper]) -> Vec<&'a Paper> {
    let kept: Vec<&Paper> = papers.iter().filter(|p| self.matches(p)).collect();
    trace!("Filter kept {} of {} papers", kept.len(), papers.len());
    kept
  }
}

impl Default for Paginator {
  fn default() -> Self { Self { page_size: DEFAULT_PAGE_SIZE } }
}

impl Paginator {
  /// A paginator with `page_size` items per page; zero is treated as one.
  pub fn new(page_size: usize) -> Self { Self { page_size: page_size.max(1) } }

  /// Items per page.
  pub fn page_size(&self) -> usize { self.page_size }

  /// Number of pages needed for `total` items. An empty list still has one (empty) page.
  pub fn page_count(&self, total: usize) -> usize { total.div_ceil(self.page_size).max(1) }

  /// The 1-based page `number` of `items`, clamped into `1..=page_count`.
  pub fn page<'a, T>(&self, items: &'a [T], number: usize) -> Page<'a, T> {
    let total_pages = self.page_count(items.len());
    let number = number.clamp(1, total_pages);
    let start = ((number - 1) * self.page_size).min(items.len());
    let end = (start + self.page_size).min(items.len());
    Page {
      items: &items[start..end],
      number,
      offset: start,
      total_pages,
      total_items: items.len(),
    }
  }
}

impl<T> Page<'_, T> {
  /// Whether a later page exists.
  pub fn has_next(&self) -> bool { self.number < self.total_pages }

  /// Whether an earlier page exists.
  pub fn has_previous(&self) -> bool { self.number > 1 }

  /// 1-based position of the first item on this page, 0 for an empty list.
  pub fn first_index(&self) -> usize {
    if self.items.is_empty() {
      0
    } else {
      self.offset + 1
    }
  }
}

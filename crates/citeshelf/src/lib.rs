//! Citation formatting, export and library management for research papers.
//!
//! `citeshelf` is the client-side core of a paper discovery application. It provides:
//!
//! - Deterministic citation rendering in BibTeX, MLA, APA and IEEE styles
//! - A per-view cache of citation formats backed by a remote citation service
//! - Clipboard and file export of loaded citations
//! - A save workflow that stores a paper into several user libraries at once
//! - A typed HTTP client for the paper, citation and library endpoints
//! - Pagination and filtering over result lists
//!
//! # Getting Started
//!
//! ```no_run
//! use citeshelf::{
//!   citation::{cache::CitationFormatCache, CitationStyle},
//!   client::ApiClient,
//!   prelude::*,
//!   Config,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let config = Config::load(Config::default_path())?;
//!   let client = ApiClient::new(&config)?;
//!
//!   // Open a paper and render its citations
//!   let paper = client.get_paper("649def34f8be52c8b66281af98ae884c09aef38b").await?;
//!   let cache = CitationFormatCache::open(&paper, config.citation_fallback());
//!   cache.load(&client).await;
//!
//!   if let Some(apa) = cache.get(CitationStyle::Apa) {
//!     println!("{}", apa.value);
//!   }
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`paper`]: The paper view model as received from the academic-graph service
//! - [`citation`]: Citation styles, formatting and the per-view format cache
//! - [`export`]: Clipboard and file export of loaded citations
//! - [`library`]: Library targets and the multi-target save workflow
//! - [`client`]: HTTP client and the service traits it implements
//! - [`session`]: Ownership of the bearer token
//! - [`pagination`]: Paging and filtering helpers for result lists
//! - [`prelude`]: Common traits and types for ergonomic imports

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  fmt::Display,
  path::{Path, PathBuf},
  str::FromStr,
  sync::Mutex,
  time::Duration,
};

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod citation;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod library;
pub mod pagination;
pub mod paper;
pub mod session;

pub use config::Config;

use crate::{error::*, paper::Paper};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use citeshelf::prelude::*;
///
/// async fn example(service: &impl CitationService) -> Result<(), CiteshelfError> {
///   let formats = service.fetch_citations("paper-id").await?;
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{
    client::{CitationService, LibraryService},
    error::CiteshelfError,
  };
}

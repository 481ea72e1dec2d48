use citeshelf::{
  citation::{cache::CitationFormatCache, CitationFormat, CitationStyle},
  library::workflow::{LibrarySaveWorkflow, TargetSelection},
  session::Session,
};
use tokio_test::{assert_err, assert_ok};

use super::*;

mod cache;
mod export;
mod save;

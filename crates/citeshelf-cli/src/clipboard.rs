//! Clipboard backends for the copy command.
//!
//! The system clipboard is tried first. Over SSH or on a headless machine that usually fails,
//! so the terminal itself is asked to set its selection with an OSC 52 escape sequence.

use std::io::Write;

use base64::Engine;
use citeshelf::{error::CiteshelfError, export::ClipboardBackend};
use console::Term;

/// The system clipboard.
#[derive(Debug, Default)]
pub struct ArboardClipboard;

/// The terminal's selection, set through OSC 52.
///
/// Most modern terminal emulators honour the sequence; there is no acknowledgement, so a
/// successful write only means the sequence reached an interactive terminal.
#[derive(Debug, Default)]
pub struct Osc52Clipboard;

impl ClipboardBackend for ArboardClipboard {
  fn name(&self) -> &str { "system" }

  fn write_text(&mut self, text: &str) -> citeshelf::error::Result<()> {
    let mut clipboard =
      arboard::Clipboard::new().map_err(|e| CiteshelfError::Clipboard(e.to_string()))?;
    clipboard.set_text(text).map_err(|e| CiteshelfError::Clipboard(e.to_string()))
  }
}

impl ClipboardBackend for Osc52Clipboard {
  fn name(&self) -> &str { "OSC 52" }

  fn write_text(&mut self, text: &str) -> citeshelf::error::Result<()> {
    if !Term::stdout().is_term() {
      return Err(CiteshelfError::Clipboard("stdout is not a terminal".into()));
    }
    let mut stdout = std::io::stdout();
    stdout.write_all(osc52_sequence(text).as_bytes())?;
    stdout.flush()?;
    Ok(())
  }
}

/// The escape sequence asking the terminal to put `text` on its clipboard.
fn osc52_sequence(text: &str) -> String {
  let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
  format!("\x1b]52;c;{encoded}\x07")
}

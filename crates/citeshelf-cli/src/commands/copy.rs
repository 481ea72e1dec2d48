//! The `copy` command: put one citation on the clipboard.

use citeshelf::export::{ClipboardExporter, CopyOutcome};

use super::*;
use crate::clipboard::{ArboardClipboard, Osc52Clipboard};

/// Arguments for [`Commands::Copy`]
#[derive(Args, Clone, Debug)]
pub struct CopyArgs {
  /// The paper
  #[command(flatten)]
  pub paper: PaperArgs,

  /// Style to copy (bibtex, mla, apa, ieee)
  #[arg(long, short, default_value = "bibtex", value_parser = parse_style)]
  pub style: CitationStyle,
}

/// Function for the [`Commands::Copy`] in the CLI.
pub async fn copy<I: UserInteraction>(interaction: &I, ctx: &Context, args: CopyArgs) -> Result<()> {
  let paper = args.paper.resolve(ctx).await?;
  let cache = load_citations(ctx, &paper).await;
  let format = cache.get(args.style).ok_or(CiteshelfError::NotLoaded(args.style))?;

  let mut exporter =
    ClipboardExporter::new(Box::new(ArboardClipboard), Box::new(Osc52Clipboard));
  match exporter.copy(&format)? {
    CopyOutcome::Copied =>
      interaction.reply(ResponseContent::Success(&format!("Copied {} citation", format.label))),
    CopyOutcome::CopiedWithFallback => interaction.reply(ResponseContent::Success(&format!(
      "Copied {} citation through the terminal",
      format.label
    ))),
    CopyOutcome::NotCopied => {
      interaction.reply(ResponseContent::Warning("No clipboard available, printing instead"))?;
      interaction.reply(ResponseContent::Citation(&format))
    },
  }
}

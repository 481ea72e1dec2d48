//! The `show` command: a paper's detail view without citations.

use super::*;

/// Function for the [`Commands::Show`] in the CLI.
pub async fn show<I: UserInteraction>(interaction: &I, ctx: &Context, args: PaperArgs) -> Result<()> {
  let paper = args.resolve(ctx).await?;
  interaction.reply(ResponseContent::Paper(&paper))
}

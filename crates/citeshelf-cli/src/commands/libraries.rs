//! The `libraries` command: list owned and shared libraries a page at a time.

use citeshelf::{library::list_libraries, pagination::Paginator};

use super::*;

/// Arguments for [`Commands::Libraries`]
#[derive(Args, Clone, Debug)]
pub struct LibrariesArgs {
  /// Page to show, starting at 1
  #[arg(long, short, default_value_t = 1)]
  pub page: usize,

  /// Libraries per page
  #[arg(long, default_value_t = citeshelf::pagination::DEFAULT_PAGE_SIZE)]
  pub page_size: usize,
}

/// Function for the [`Commands::Libraries`] in the CLI.
pub async fn libraries<I: UserInteraction>(
  interaction: &I,
  ctx: &Context,
  args: LibrariesArgs,
) -> Result<()> {
  let listing = list_libraries(&ctx.client, &ctx.session).await?;
  let all: Vec<LibraryTarget> = listing.all().cloned().collect();
  let page = Paginator::new(args.page_size).page(&all, args.page);
  interaction.reply(ResponseContent::Libraries(page))
}

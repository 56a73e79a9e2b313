//! `otaku search`: resolve a title to its detail route.

use otaku_detail::{NavigationPayload, search};

use crate::cli::{OutputFormat, SearchArgs};
use crate::client::{AppContext, CliResult};
use crate::output::render_search;

pub(crate) async fn handle_search(
    ctx: &AppContext,
    args: &SearchArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let payload = resolve(ctx, &args.query()).await?;
    print!("{}", render_search(&payload, format)?);
    Ok(())
}

pub(crate) async fn resolve(ctx: &AppContext, query: &str) -> CliResult<NavigationPayload> {
    Ok(search(ctx.gateway.as_ref(), query).await?)
}

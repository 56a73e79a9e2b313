//! `otaku open`: mount a route directly, as when a detail link is opened cold.

use std::sync::Arc;

use otaku_detail::{DetailRoute, DetailView, TokioScheduler};

use crate::cli::{OpenArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{DetailReport, render_detail};

pub(crate) fn handle_open(ctx: &AppContext, args: &OpenArgs, format: OutputFormat) -> CliResult<()> {
    let report = open_route(ctx, &args.route)?;
    print!("{}", render_detail(&report, format)?);
    Ok(())
}

/// Mount `route` with no navigation payload and capture what the view resolved.
pub(crate) fn open_route(ctx: &AppContext, route: &str) -> CliResult<DetailReport> {
    let route = DetailRoute::parse(route).map_err(|err| CliError::validation(err.to_string()))?;
    let mut view = DetailView::new(Arc::clone(&ctx.gateway), Arc::new(TokioScheduler), ctx.detail);
    let primary = view.mount(&route, None).cloned();
    view.teardown();
    Ok(DetailReport {
        route: route.path(),
        primary,
        episodes: None,
        manga: None,
    })
}

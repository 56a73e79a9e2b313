//! Argument parsing and command dispatch.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use otaku_detail::DetailTab;
use otaku_gateway::config::parse_base_url;
use otaku_telemetry::LogFormat;
use tracing::debug;
use url::Url;

use crate::client::{AppContext, CliResult, init_tracing};
use crate::commands::{detail::handle_detail, open::handle_open, search::handle_search};

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, executes the requested command, and returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    init_tracing(&cli);

    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

pub(crate) async fn dispatch(cli: Cli) -> CliResult<()> {
    let ctx = AppContext::from_cli(&cli)?;
    debug!(output = ?cli.output, "dispatching command");
    match cli.command {
        Command::Search(args) => handle_search(&ctx, &args, cli.output).await,
        Command::Detail(args) => handle_detail(&ctx, &args, cli.output).await,
        Command::Open(args) => handle_open(&ctx, &args, cli.output),
    }
}

#[derive(Parser)]
#[command(name = "otaku", about = "Browse anime episode analytics and manga continuations")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        value_parser = parse_url,
        help = "API root; overrides OTAKU_API_URL (default http://localhost:8080/api)"
    )]
    pub(crate) api_url: Option<Url>,
    #[arg(
        long,
        global = true,
        help = "Per-request timeout in seconds; overrides OTAKU_HTTP_TIMEOUT_SECS (default 10)"
    )]
    pub(crate) timeout: Option<u64>,
    #[arg(
        long,
        global = true,
        value_parser = parse_max_retries,
        help = "Manga retries after the first attempt; overrides OTAKU_MANGA_MAX_RETRIES (default 2)"
    )]
    pub(crate) manga_max_retries: Option<u32>,
    #[arg(
        long,
        global = true,
        value_parser = parse_base_delay,
        help = "Manga backoff base in milliseconds; overrides OTAKU_MANGA_BASE_DELAY_MS (default 1000)"
    )]
    pub(crate) manga_base_delay_ms: Option<Duration>,
    #[arg(
        long,
        global = true,
        env = "OTAKU_LOG_FORMAT",
        value_parser = parse_log_format,
        help = "Log output format (json or pretty); inferred from the build when unset"
    )]
    pub(crate) log_format: Option<LogFormat>,
    #[arg(long, global = true, env = "OTAKU_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Look up an anime by title and print its detail route.
    Search(SearchArgs),
    /// Search, open the detail view, and render the requested sections.
    Detail(DetailArgs),
    /// Open a detail route directly, without a navigation payload.
    Open(OpenArgs),
}

#[derive(Args)]
pub(crate) struct SearchArgs {
    #[arg(required = true, num_args = 1.., help = "Anime title")]
    pub(crate) name: Vec<String>,
}

impl SearchArgs {
    pub(crate) fn query(&self) -> String {
        self.name.join(" ")
    }
}

#[derive(Args)]
pub(crate) struct DetailArgs {
    #[arg(required = true, num_args = 1.., help = "Anime title")]
    pub(crate) name: Vec<String>,
    #[arg(long, value_enum, default_value_t = TabArg::All)]
    pub(crate) tab: TabArg,
}

impl DetailArgs {
    pub(crate) fn query(&self) -> String {
        self.name.join(" ")
    }
}

#[derive(Args)]
pub(crate) struct OpenArgs {
    #[arg(help = "Detail route such as /anime/1535")]
    pub(crate) route: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum TabArg {
    Overview,
    Episodes,
    Manga,
    All,
}

impl TabArg {
    /// Tabs to visit, in display order.
    pub(crate) fn tabs(self) -> Vec<DetailTab> {
        match self {
            Self::Overview => vec![DetailTab::Overview],
            Self::Episodes => vec![DetailTab::Episodes],
            Self::Manga => vec![DetailTab::Manga],
            Self::All => DetailTab::ALL.to_vec(),
        }
    }
}

fn parse_url(input: &str) -> Result<Url, String> {
    parse_base_url(input).map_err(|err| err.to_string())
}

fn parse_max_retries(input: &str) -> Result<u32, String> {
    otaku_detail::config::parse_max_retries(input).map_err(|err| err.to_string())
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    input.parse::<LogFormat>().map_err(|err| err.to_string())
}

fn parse_base_delay(input: &str) -> Result<Duration, String> {
    otaku_detail::config::parse_base_delay(input).map_err(|err| err.to_string())
}

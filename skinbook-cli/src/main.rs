//! `skinbook` binary: one invocation of the resumable CS2 order-book sweep.
//!
//! Suggested logging: `RUST_LOG=info,skinbook=debug,skinbook_steam=debug`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use clap::builder::BoolishValueParser;
use skinbook::{BackoffConfig, PacingConfig, RunOutcome, Scraper, StallPolicy};
use skinbook_core::connector::MarketConnector;
use skinbook_core::money::usd_to_eur_string;
use skinbook_core::{JsonCursorStore, JsonItemStore, ScrapeError, stop_channel};
use skinbook_steam::SteamConnector;
use tracing_subscriber::EnvFilter;

/// Exit status for configuration problems; clap uses the same code for usage errors.
const EXIT_CONFIG: u8 = 2;
/// Exit status for startup failures (catalog, name ids, unreadable snapshot).
const EXIT_STARTUP: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "skinbook", version)]
#[command(about = "Resumable, rate-limited order-book scraper for the CS2 market catalog")]
struct Args {
    /// Snapshot of every fetched item (JSON array).
    #[arg(long, env = "SKINBOOK_OUTPUT", default_value = "data/cs2_items.json")]
    output: PathBuf,

    /// Resume cursor file (`{"start_from": N}`).
    #[arg(long, env = "SKINBOOK_CURSOR", default_value = "data/start_from.json")]
    cursor: PathBuf,

    /// Create the cursor file when it does not exist yet.
    #[arg(long, env = "SKINBOOK_CREATE_CURSOR", value_parser = BoolishValueParser::new())]
    create_cursor: bool,

    /// Delay after every processed item, in milliseconds.
    #[arg(long, env = "SKINBOOK_DELAY_MS", default_value_t = 7_000)]
    delay_ms: u64,

    /// Pause after an item exhausted its retries, in milliseconds.
    #[arg(long, env = "SKINBOOK_ERROR_PAUSE_MS", default_value_t = 30_000)]
    error_pause_ms: u64,

    /// Wall-clock window one invocation targets, in seconds.
    #[arg(long, env = "SKINBOOK_RUN_WINDOW_SECS", default_value_t = 100)]
    run_window_secs: u64,

    /// Timeout for a single HTTP request, in seconds.
    #[arg(long, env = "SKINBOOK_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    /// First retry backoff, in milliseconds.
    #[arg(long, env = "SKINBOOK_BACKOFF_MS", default_value_t = 30_000)]
    backoff_ms: u64,

    /// Upper bound for a single retry backoff, in milliseconds.
    #[arg(long, env = "SKINBOOK_MAX_BACKOFF_MS", default_value_t = 3_600_000)]
    max_backoff_ms: u64,

    /// Attempts per order-book request.
    #[arg(long, env = "SKINBOOK_MAX_ATTEMPTS", default_value_t = 5)]
    max_attempts: u32,

    /// Skip an item after this many consecutive failed rounds (default: never skip).
    #[arg(long, env = "SKINBOOK_MAX_ITEM_FAILURES")]
    max_item_failures: Option<u32>,

    /// Token for the catalog source (sent as `Authorization: token ...`).
    #[arg(long, env = "SKINBOOK_GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Market base URL (the histogram path is appended).
    #[arg(long, env = "SKINBOOK_MARKET_BASE")]
    market_base: Option<String>,

    /// Catalog source URL.
    #[arg(long, env = "SKINBOOK_CATALOG_URL")]
    catalog_url: Option<String>,

    /// Name-id source URL.
    #[arg(long, env = "SKINBOOK_NAME_IDS_URL")]
    name_ids_url: Option<String>,

    /// Exchange-rate source URL.
    #[arg(long, env = "SKINBOOK_FX_URL")]
    fx_url: Option<String>,

    /// Serve fixture data instead of calling the network.
    #[arg(long, env = "SKINBOOK_USE_MOCK", value_parser = BoolishValueParser::new())]
    mock: bool,
}

impl Args {
    fn pacing(&self) -> PacingConfig {
        PacingConfig {
            inter_request_delay: Duration::from_millis(self.delay_ms),
            error_pause: Duration::from_millis(self.error_pause_ms),
            run_window: Duration::from_secs(self.run_window_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    fn backoff(&self) -> BackoffConfig {
        BackoffConfig {
            min_backoff_ms: self.backoff_ms,
            max_backoff_ms: self.max_backoff_ms.max(self.backoff_ms),
            max_attempts: self.max_attempts,
            ..BackoffConfig::default()
        }
    }

    fn connector(&self) -> Result<Arc<dyn MarketConnector>, ScrapeError> {
        if self.mock {
            println!("--- (Using Mock Connector) ---");
            return Ok(Arc::new(skinbook_mock::MockConnector::new()));
        }
        let mut builder = SteamConnector::builder()
            .github_token(self.github_token.clone())
            .timeout(Duration::from_secs(self.request_timeout_secs));
        if let Some(u) = &self.market_base {
            builder = builder.market_base(u.clone());
        }
        if let Some(u) = &self.catalog_url {
            builder = builder.catalog_url(u.clone());
        }
        if let Some(u) = &self.name_ids_url {
            builder = builder.name_ids_url(u.clone());
        }
        if let Some(u) = &self.fx_url {
            builder = builder.fx_url(u.clone());
        }
        Ok(Arc::new(builder.build()?))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ScrapeError>() {
        Some(ScrapeError::InvalidArg(_) | ScrapeError::Unsupported { .. }) => EXIT_CONFIG,
        _ => EXIT_STARTUP,
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let scraper = Scraper::builder()
        .connector(args.connector().context("building market connector")?)
        .item_store(Arc::new(JsonItemStore::new(&args.output)))
        .cursor_store(Arc::new(
            JsonCursorStore::new(&args.cursor).create_if_missing(args.create_cursor),
        ))
        .pacing(args.pacing())
        .backoff(args.backoff())
        .stall_policy(StallPolicy {
            max_item_failures: args.max_item_failures,
        })
        .build()
        .context("invalid configuration")?;

    let (handle, stop) = stop_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current step");
            handle.stop();
        }
    });

    let out = scraper.run(stop).await.context("startup failed")?;
    let report = &out.report;

    if report.outcome == RunOutcome::Cancelled {
        println!("Interrupted. Resume from item {}.", report.end_cursor);
    }
    println!(
        "Processed {} of {} catalog items ({} failed attempts, {} skipped); next start: {}",
        report.fetched,
        report.catalog_len,
        report.failed_attempts,
        report.skipped,
        report.end_cursor
    );
    println!(
        "USD to EUR: $1.00 = {}",
        usd_to_eur_string("1", report.conversion_rate)?
    );
    println!(
        "Done! Saved {} items to {}",
        report.records,
        args.output.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

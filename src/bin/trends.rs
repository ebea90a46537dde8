use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use trends_checker::api::HttpProvider;
use trends_checker::models::{Gprop, MAX_KEYWORDS, RequestConfig};
use trends_checker::{driver, input, render, storage};

const DEFAULT_KEYWORDS: &str = "real time translation YouTube,\
live translation YouTube,\
AI dubbing YouTube,\
YouTube voiceover,\
automatic translation YouTube";

const DEFAULT_GEOS: &str = "WW,US,BR,ES,IN,ID,RU";

#[derive(Parser, Debug)]
#[command(
    name = "trends",
    version,
    about = "Probe Google Trends for relative keyword interest across regions"
)]
struct Cli {
    /// Comma-separated list of up to 5 keywords
    #[arg(long, default_value = DEFAULT_KEYWORDS)]
    keywords: String,
    /// File with keywords (one per line; blank lines and lines starting with # are ignored)
    #[arg(long)]
    keywords_file: Option<PathBuf>,
    /// Comma-separated list of regions (ISO country code) or WW for worldwide
    #[arg(long, default_value = DEFAULT_GEOS)]
    geo: String,
    /// Timeframe, e.g. 'today 12-m' or 'today 5-y'
    #[arg(long, default_value = "today 12-m")]
    timeframe: String,
    /// UI language, e.g. en-US or ru-RU
    #[arg(long, default_value = "en-US")]
    hl: String,
    /// Search category: web, youtube, images, news, or shopping
    #[arg(long, default_value = "youtube")]
    group: Gprop,
    /// Sleep seconds between region requests (avoid throttling)
    #[arg(long, default_value_t = 1.2)]
    sleep: f64,
    /// Number of retries on 429/temporary errors per region
    #[arg(long, default_value_t = 3)]
    retries: u32,
    /// Exponential backoff base (seconds) for retries
    #[arg(long, default_value_t = 1.5)]
    backoff: f64,
    /// Random jitter (seconds) added to backoffs and sleeps
    #[arg(long, default_value_t = 0.6)]
    jitter: f64,
    /// HTTP/HTTPS proxy URL(s), comma-separated; rotated across retry attempts
    #[arg(long)]
    proxy: Option<String>,
    /// Raw Cookie header value to send (e.g. 'NID=...; ...')
    #[arg(long)]
    cookie: Option<String>,
    /// File containing the Cookie header value (preferred over --cookie)
    #[arg(long)]
    cookie_file: Option<PathBuf>,
    /// Table layout
    #[arg(long, value_enum, default_value_t = DisplayMode::Vertical)]
    display: DisplayMode,
    /// Write summary CSV to this path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Fetch and print rising related queries per keyword per region
    #[arg(long)]
    related: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DisplayMode {
    Vertical,
    Wide,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut keywords = match &cli.keywords_file {
        Some(path) => input::load_list_from_file(path)?,
        None => input::parse_list(&cli.keywords),
    };
    if keywords.is_empty() {
        anyhow::bail!("no keywords provided");
    }
    if keywords.len() > MAX_KEYWORDS {
        eprintln!(
            "Google Trends compares up to {MAX_KEYWORDS} terms at once; taking first {MAX_KEYWORDS}. \
             For larger sets, run multiple passes or narrow the list."
        );
        keywords.truncate(MAX_KEYWORDS);
    }

    let geos = input::parse_list(&cli.geo);
    if geos.is_empty() {
        anyhow::bail!("no regions provided");
    }

    let cfg = RequestConfig {
        keywords,
        geos,
        timeframe: cli.timeframe,
        hl: cli.hl,
        gprop: cli.group,
        sleep: cli.sleep,
        retries: cli.retries,
        backoff: cli.backoff,
        jitter: cli.jitter,
        cookie: input::resolve_cookie(cli.cookie_file.as_deref(), cli.cookie.as_deref()),
        proxies: cli
            .proxy
            .as_deref()
            .map(input::parse_list)
            .unwrap_or_default(),
        related: cli.related,
    };

    let mut provider = HttpProvider::new();
    let report = driver::run(&mut provider, &cfg)?;

    if !report.any_success() {
        println!("No summary data produced.");
        print!("{}", render::render_failures(&report.failures));
        return Ok(ExitCode::from(1));
    }

    if cfg.related {
        print!(
            "{}",
            render::render_related(&report.related, &cfg.keywords, &report.rows)
        );
    }

    println!("\n=== Mean interest over time ({}) ===", cfg.gprop.label());
    match cli.display {
        DisplayMode::Vertical => print!("{}", render::render_vertical(&report.rows)),
        DisplayMode::Wide => print!("{}", render::render_wide(&report.rows, &cfg.keywords)),
    }
    print!("{}", render::render_failures(&report.failures));

    if let Some(path) = &cli.output {
        let related = cfg.related.then_some(report.related.as_slice());
        storage::save_csv(&report.rows, related, path)?;
        eprintln!("Saved CSV: {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

//! trends_checker
//!
//! A lightweight Rust library for probing Google Trends interest in a small
//! keyword set across regions. Pairs with the `trends` CLI.
//!
//! ### Features
//! - Compare up to 5 keywords per region over a configurable timeframe
//! - Sequential, throttled fetching with retry/backoff on rate limits
//! - ASCII tables (per-region blocks or a wide layout) and CSV export
//! - Optional rising related queries per keyword per region
//!
//! ### Example
//! ```no_run
//! use trends_checker::api::HttpProvider;
//! use trends_checker::models::{Gprop, RequestConfig};
//!
//! let cfg = RequestConfig {
//!     keywords: vec!["AI dubbing".into(), "live translation".into()],
//!     geos: vec!["WW".into(), "US".into()],
//!     timeframe: "today 12-m".into(),
//!     hl: "en-US".into(),
//!     gprop: Gprop::Youtube,
//!     sleep: 1.2,
//!     retries: 3,
//!     backoff: 1.5,
//!     jitter: 0.6,
//!     cookie: None,
//!     proxies: vec![],
//!     related: false,
//! };
//! let report = trends_checker::driver::run(&mut HttpProvider::new(), &cfg)?;
//! println!("{}", trends_checker::render::render_vertical(&report.rows));
//! # Ok::<(), trends_checker::TrendsError>(())
//! ```

pub mod api;
pub mod driver;
pub mod error;
pub mod input;
pub mod models;
pub mod render;
pub mod retry;
pub mod stats;
pub mod storage;

pub use driver::{RunReport, TrendsProvider};
pub use error::TrendsError;
pub use models::{Gprop, RelatedQuery, RequestConfig, ResultRow, Rise};

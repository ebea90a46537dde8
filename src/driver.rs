//! Sequential per-region request loop.
//!
//! Regions are processed strictly one at a time with deliberate pauses in
//! between; concurrency is intentionally avoided so the upstream rate limits
//! are respected. A region that exhausts its retries is recorded as a failure
//! and never aborts the run.

use std::thread;
use std::time::Duration;

use crate::error::TrendsError;
use crate::models::{RelatedQuery, RequestConfig, ResultRow, TimelinePoint, validate_geo};
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::stats;

/// Source of trends data. The network implementation is
/// [`crate::api::HttpProvider`]; tests substitute an in-memory one.
pub trait TrendsProvider {
    /// Fetch interest-over-time buckets for all configured keywords in one
    /// region. `attempt` is 0-based and increments across retries.
    fn fetch_interest(
        &mut self,
        cfg: &RequestConfig,
        geo: &str,
        attempt: u32,
    ) -> Result<Vec<TimelinePoint>, TrendsError>;

    /// Fetch rising related queries for the region most recently fetched.
    fn fetch_related(
        &mut self,
        cfg: &RequestConfig,
        geo: &str,
    ) -> Result<Vec<RelatedQuery>, TrendsError>;
}

/// A region that produced no scores, with the reason it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFailure {
    pub geo: String,
    pub reason: String,
}

/// Everything one run produced. Failures sit alongside successes; nothing is
/// silently dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub rows: Vec<ResultRow>,
    pub related: Vec<RelatedQuery>,
    pub failures: Vec<GeoFailure>,
}

impl RunReport {
    /// True when at least one region produced scores.
    pub fn any_success(&self) -> bool {
        !self.rows.is_empty()
    }
}

/// Process every configured region in order. Per region: fetch with
/// retry/backoff, compute per-keyword means, optionally fetch related queries
/// (best effort), then pause `sleep + U(0, jitter)` seconds before the next
/// region. Returns an error only for an invalid configuration; per-region
/// trouble lands in [`RunReport::failures`].
pub fn run<P: TrendsProvider>(
    provider: &mut P,
    cfg: &RequestConfig,
) -> Result<RunReport, TrendsError> {
    cfg.validate()?;

    let policy = RetryPolicy {
        max_retries: cfg.retries,
        backoff_base: cfg.backoff,
        jitter: cfg.jitter,
    };

    let mut report = RunReport::default();
    for (i, geo_raw) in cfg.geos.iter().enumerate() {
        let label = geo_raw.trim().to_uppercase();
        fetch_geo(provider, cfg, &policy, &label, &mut report);
        if i + 1 < cfg.geos.len() {
            thread::sleep(pause(cfg.sleep, cfg.jitter));
        }
    }
    Ok(report)
}

fn fetch_geo<P: TrendsProvider>(
    provider: &mut P,
    cfg: &RequestConfig,
    policy: &RetryPolicy,
    label: &str,
    report: &mut RunReport,
) {
    if let Err(e) = validate_geo(label) {
        log::error!("{label}: {e}");
        report.failures.push(GeoFailure {
            geo: label.to_string(),
            reason: e.to_string(),
        });
        return;
    }

    let points = match retry_with_backoff(policy, |attempt| {
        provider.fetch_interest(cfg, label, attempt)
    }) {
        Ok(points) => points,
        Err(e) => {
            log::error!("{label}: {e}");
            report.failures.push(GeoFailure {
                geo: label.to_string(),
                reason: e.to_string(),
            });
            return;
        }
    };

    if points.is_empty() {
        log::warn!("no data for {label}");
        report.failures.push(GeoFailure {
            geo: label.to_string(),
            reason: "no data returned".to_string(),
        });
        return;
    }

    let means = stats::keyword_means(&points, cfg.keywords.len());
    for (keyword, score) in cfg.keywords.iter().zip(means) {
        report.rows.push(ResultRow {
            geo: label.to_string(),
            keyword: keyword.clone(),
            score,
        });
    }

    if cfg.related {
        // Best effort: a failed related fetch never invalidates the scores.
        match provider.fetch_related(cfg, label) {
            Ok(related) => report.related.extend(related),
            Err(e) => log::warn!("related queries failed for {label}: {e}"),
        }
    }
}

fn pause(sleep: f64, jitter: f64) -> Duration {
    let jitter = if jitter > 0.0 {
        rand::random::<f64>() * jitter
    } else {
        0.0
    };
    Duration::from_secs_f64(sleep.max(0.0) + jitter)
}

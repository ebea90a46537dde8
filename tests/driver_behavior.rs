use std::collections::{HashMap, HashSet};

use trends_checker::driver::{self, TrendsProvider};
use trends_checker::error::TrendsError;
use trends_checker::models::{
    Gprop, RelatedQuery, RequestConfig, Rise, TimelinePoint,
};

fn config(keywords: &[&str], geos: &[&str]) -> RequestConfig {
    RequestConfig {
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        geos: geos.iter().map(|s| s.to_string()).collect(),
        timeframe: "today 12-m".into(),
        hl: "en-US".into(),
        gprop: Gprop::Youtube,
        // zero delays keep the tests instant
        sleep: 0.0,
        retries: 3,
        backoff: 0.0,
        jitter: 0.0,
        cookie: None,
        proxies: vec![],
        related: false,
    }
}

fn point(values: &[u32]) -> TimelinePoint {
    TimelinePoint {
        time: "1714867200".into(),
        formatted_time: "May 2024".into(),
        value: values.to_vec(),
        is_partial: false,
    }
}

/// Scripted in-memory provider: per-region rate-limit counts, hard failures,
/// and call recording.
#[derive(Default)]
struct ScriptedProvider {
    /// geo -> number of 429 responses before succeeding
    rate_limits: HashMap<String, u32>,
    unauthorized: HashSet<String>,
    empty: HashSet<String>,
    interest_calls: Vec<(String, u32)>,
    keywords_seen: Vec<Vec<String>>,
    related_fails: bool,
}

impl TrendsProvider for ScriptedProvider {
    fn fetch_interest(
        &mut self,
        cfg: &RequestConfig,
        geo: &str,
        attempt: u32,
    ) -> Result<Vec<TimelinePoint>, TrendsError> {
        self.interest_calls.push((geo.to_string(), attempt));
        self.keywords_seen.push(cfg.keywords.clone());
        if self.unauthorized.contains(geo) {
            return Err(TrendsError::Unauthorized { status: 401 });
        }
        if let Some(n) = self.rate_limits.get_mut(geo) {
            if *n > 0 {
                *n -= 1;
                return Err(TrendsError::RateLimited);
            }
        }
        if self.empty.contains(geo) {
            return Ok(vec![]);
        }
        Ok(vec![point(&[80, 20]), point(&[80, 20])])
    }

    fn fetch_related(
        &mut self,
        cfg: &RequestConfig,
        geo: &str,
    ) -> Result<Vec<RelatedQuery>, TrendsError> {
        if self.related_fails {
            return Err(TrendsError::RateLimited);
        }
        Ok(vec![RelatedQuery {
            geo: geo.to_string(),
            keyword: cfg.keywords[0].clone(),
            query: "rising thing".into(),
            rise: Rise::Percent(250),
        }])
    }
}

#[test]
fn sends_keyword_set_unmodified() {
    let cfg = config(&["alpha", "beta gamma"], &["US"]);
    let mut provider = ScriptedProvider::default();
    let report = driver::run(&mut provider, &cfg).unwrap();

    assert_eq!(provider.keywords_seen, vec![cfg.keywords.clone()]);
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0].keyword, "alpha");
    assert_eq!(report.rows[0].score, Some(80.0));
    assert_eq!(report.rows[1].score, Some(20.0));
}

#[test]
fn rate_limited_region_is_retried_then_succeeds() {
    let cfg = config(&["alpha"], &["US"]);
    let mut provider = ScriptedProvider {
        rate_limits: HashMap::from([("US".to_string(), 2)]),
        ..Default::default()
    };
    let report = driver::run(&mut provider, &cfg).unwrap();

    // two 429s, then success, with the attempt counter increasing
    let attempts: Vec<u32> = provider.interest_calls.iter().map(|(_, a)| *a).collect();
    assert_eq!(attempts, vec![0, 1, 2]);
    assert!(report.any_success());
    assert!(report.failures.is_empty());
}

#[test]
fn exhausted_region_does_not_abort_the_run() {
    let cfg = config(&["alpha"], &["AA", "US"]);
    let mut provider = ScriptedProvider {
        rate_limits: HashMap::from([("AA".to_string(), u32::MAX)]),
        ..Default::default()
    };
    let report = driver::run(&mut provider, &cfg).unwrap();

    // retries=3 means 4 total attempts for AA, then one for US
    let aa_calls = provider
        .interest_calls
        .iter()
        .filter(|(g, _)| g == "AA")
        .count();
    assert_eq!(aa_calls, 4);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].geo, "AA");
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].geo, "US");
}

#[test]
fn unauthorized_is_fatal_for_the_region_and_not_retried() {
    let cfg = config(&["alpha"], &["US", "DE"]);
    let mut provider = ScriptedProvider {
        unauthorized: HashSet::from(["US".to_string()]),
        ..Default::default()
    };
    let report = driver::run(&mut provider, &cfg).unwrap();

    let us_calls = provider
        .interest_calls
        .iter()
        .filter(|(g, _)| g == "US")
        .count();
    assert_eq!(us_calls, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].reason.contains("unauthorized"));
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].geo, "DE");
}

#[test]
fn malformed_region_code_is_skipped_without_a_request() {
    let cfg = config(&["alpha"], &["U!S", "DE"]);
    let mut provider = ScriptedProvider::default();
    let report = driver::run(&mut provider, &cfg).unwrap();

    assert!(provider.interest_calls.iter().all(|(g, _)| g == "DE"));
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].reason.contains("malformed region code"));
    assert_eq!(report.rows.len(), 1);
}

#[test]
fn region_labels_are_uppercased() {
    let cfg = config(&["alpha"], &["us"]);
    let mut provider = ScriptedProvider::default();
    let report = driver::run(&mut provider, &cfg).unwrap();
    assert_eq!(report.rows[0].geo, "US");
}

#[test]
fn empty_timeline_is_reported_as_failure() {
    let cfg = config(&["alpha"], &["US"]);
    let mut provider = ScriptedProvider {
        empty: HashSet::from(["US".to_string()]),
        ..Default::default()
    };
    let report = driver::run(&mut provider, &cfg).unwrap();

    assert!(!report.any_success());
    assert_eq!(report.failures[0].reason, "no data returned");
}

#[test]
fn related_queries_are_collected_when_requested() {
    let mut cfg = config(&["alpha"], &["US"]);
    cfg.related = true;
    let mut provider = ScriptedProvider::default();
    let report = driver::run(&mut provider, &cfg).unwrap();

    assert_eq!(report.related.len(), 1);
    assert_eq!(report.related[0].query, "rising thing");
}

#[test]
fn failed_related_fetch_keeps_the_scores() {
    let mut cfg = config(&["alpha"], &["US"]);
    cfg.related = true;
    let mut provider = ScriptedProvider {
        related_fails: true,
        ..Default::default()
    };
    let report = driver::run(&mut provider, &cfg).unwrap();

    assert!(report.any_success());
    assert!(report.related.is_empty());
    assert!(report.failures.is_empty());
}

#[test]
fn invalid_config_is_rejected_before_any_request() {
    let cfg = config(&["a", "b", "c", "d", "e", "f"], &["US"]);
    let mut provider = ScriptedProvider::default();
    let err = driver::run(&mut provider, &cfg).unwrap_err();

    assert!(matches!(err, TrendsError::InvalidInput(_)));
    assert!(provider.interest_calls.is_empty());
}

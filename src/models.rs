use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrendsError;

/// Upstream compares at most this many terms in one request.
pub const MAX_KEYWORDS: usize = 5;

/// Search category the interest scores are computed over (upstream `gprop`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gprop {
    Web,
    Youtube,
    Images,
    News,
    Shopping,
}

impl Gprop {
    /// Value sent on the wire. Web search is selected with an empty string;
    /// shopping is historically `froogle`.
    pub fn as_param(&self) -> &'static str {
        match self {
            Gprop::Web => "",
            Gprop::Youtube => "youtube",
            Gprop::Images => "images",
            Gprop::News => "news",
            Gprop::Shopping => "froogle",
        }
    }

    /// Human-readable label used in report headings.
    pub fn label(&self) -> &'static str {
        match self {
            Gprop::Web => "Web Search",
            Gprop::Youtube => "YouTube Search",
            Gprop::Images => "Image Search",
            Gprop::News => "News Search",
            Gprop::Shopping => "Shopping",
        }
    }
}

impl FromStr for Gprop {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "web" => Ok(Gprop::Web),
            "youtube" => Ok(Gprop::Youtube),
            "images" => Ok(Gprop::Images),
            "news" => Ok(Gprop::News),
            "shopping" => Ok(Gprop::Shopping),
            other => Err(format!(
                "unknown group '{other}' (expected web, youtube, images, news, or shopping)"
            )),
        }
    }
}

/// One fully resolved request: constructed once from CLI input, read-only
/// afterward. There is deliberately no process-wide default instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Up to [`MAX_KEYWORDS`] search terms, compared against each other.
    pub keywords: Vec<String>,
    /// Region labels: ISO country codes, subregions like `US-CA`, or `WW`.
    pub geos: Vec<String>,
    /// Upstream timeframe string, e.g. `today 12-m` or `today 5-y`.
    pub timeframe: String,
    /// UI language, e.g. `en-US`.
    pub hl: String,
    pub gprop: Gprop,
    /// Seconds to pause between regions.
    pub sleep: f64,
    /// Retries per region on rate-limit/transient errors.
    pub retries: u32,
    /// Exponential backoff base in seconds.
    pub backoff: f64,
    /// Upper bound of the random delay added to backoffs and pauses.
    pub jitter: f64,
    /// Raw Cookie header value, passed through opaquely.
    pub cookie: Option<String>,
    /// Proxy URLs, rotated across retry attempts.
    pub proxies: Vec<String>,
    /// Also fetch rising related queries per keyword per region.
    pub related: bool,
}

impl RequestConfig {
    /// Reject configurations the upstream provider cannot serve.
    pub fn validate(&self) -> Result<(), TrendsError> {
        if self.keywords.is_empty() {
            return Err(TrendsError::InvalidInput("no keywords provided".into()));
        }
        if self.keywords.len() > MAX_KEYWORDS {
            return Err(TrendsError::InvalidInput(format!(
                "at most {MAX_KEYWORDS} keywords per request (got {})",
                self.keywords.len()
            )));
        }
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(TrendsError::InvalidInput("empty keyword".into()));
        }
        if self.geos.is_empty() {
            return Err(TrendsError::InvalidInput("no regions provided".into()));
        }
        for v in [self.sleep, self.backoff, self.jitter] {
            if !v.is_finite() || v < 0.0 {
                return Err(TrendsError::InvalidInput(
                    "sleep, backoff, and jitter must be non-negative".into(),
                ));
            }
        }
        Ok(())
    }
}

/// `WW` means worldwide and maps to an empty geo on the wire.
pub fn normalize_geo(label: &str) -> &str {
    if label.eq_ignore_ascii_case("WW") { "" } else { label }
}

/// Region labels are country codes (`US`), subregions (`US-CA`), or `WW`.
pub fn validate_geo(label: &str) -> Result<(), TrendsError> {
    let ok = !label.is_empty()
        && label.len() <= 8
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if ok {
        Ok(())
    } else {
        Err(TrendsError::InvalidInput(format!(
            "malformed region code '{label}'"
        )))
    }
}

/// One timeline bucket from the interest-over-time widget. `value` holds one
/// score in [0, 100] per requested keyword, in request order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub time: String,
    #[serde(rename = "formattedTime")]
    pub formatted_time: String,
    #[serde(default)]
    pub value: Vec<u32>,
    #[serde(rename = "isPartial", default)]
    pub is_partial: bool,
}

/// One cell of the final table: mean interest for a keyword in a region.
/// `None` means the provider returned no usable data for that keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub geo: String,
    pub keyword: String,
    pub score: Option<f64>,
}

/// Rise magnitude of a related query: a growth percentage, or "Breakout"
/// when upstream reports growth beyond its percentage scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rise {
    Percent(i64),
    Breakout,
}

impl fmt::Display for Rise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rise::Percent(p) => write!(f, "+{p}%"),
            Rise::Breakout => write!(f, "Breakout"),
        }
    }
}

/// A rising related query attributed to a (region, keyword) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedQuery {
    pub geo: String,
    pub keyword: String,
    pub query: String,
    pub rise: Rise,
}

//! Synchronous client for the unofficial Google Trends widget endpoints.
//!
//! The upstream flow is a two-step handshake: `api/explore` resolves the
//! keyword set into widgets carrying one-time tokens, then
//! `api/widgetdata/multiline` (interest over time) and
//! `api/widgetdata/relatedsearches` (rising related queries) are fetched with
//! those tokens. Responses are JSON behind an anti-XSSI prefix (`)]}'…`) that
//! must be stripped before parsing.
//!
//! ### Notes
//! - These endpoints are unofficial: a browser user agent is required, and a
//!   `Cookie` header (e.g. an exported `NID=…` value) noticeably reduces 429s.
//! - One [`Client`] is built per attempt so a proxy list can rotate across
//!   retries; see [`HttpProvider`].

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::COOKIE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::driver::TrendsProvider;
use crate::error::TrendsError;
use crate::models::{Gprop, RelatedQuery, RequestConfig, Rise, TimelinePoint, normalize_geo};

pub const DEFAULT_BASE_URL: &str = "https://trends.google.com/trends";

/// Rising related queries kept per keyword per region.
pub const RELATED_LIMIT: usize = 10;

// The endpoints reject non-browser user agents outright.
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

// Allow -, _, . unescaped in query values (hl tags, tokens)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(s: &str) -> String {
    utf8_percent_encode(s, SAFE).to_string()
}

/// Widget reference from the explore handshake: the one-time token plus the
/// request body to echo back to the widgetdata endpoint.
#[derive(Debug, Clone)]
pub struct Widget {
    pub token: String,
    pub request: Value,
}

/// Tokens resolved for one (keyword set, region, timeframe) payload.
#[derive(Debug, Clone)]
pub struct ExploreSession {
    pub timeseries: Widget,
    /// One related-queries widget per keyword, in request order.
    pub related: Vec<Widget>,
}

/// A rising related query as returned for a single keyword's widget.
#[derive(Debug, Clone, PartialEq)]
pub struct RisingQuery {
    pub query: String,
    pub rise: Rise,
}

#[derive(Debug)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
    hl: String,
    cookie: Option<String>,
}

impl Client {
    /// Build a client for one attempt. `proxy` is applied to every request
    /// this client makes; rotation across attempts happens in [`HttpProvider`].
    pub fn new(
        base_url: &str,
        hl: &str,
        cookie: Option<&str>,
        proxy: Option<&str>,
    ) -> Result<Self, TrendsError> {
        let mut builder = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(BROWSER_UA);
        if let Some(p) = proxy {
            let p = reqwest::Proxy::all(p)
                .map_err(|e| TrendsError::InvalidInput(format!("invalid proxy URL '{p}': {e}")))?;
            builder = builder.proxy(p);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: builder.build()?,
            hl: hl.to_string(),
            cookie: cookie.map(str::to_string),
        })
    }

    /// Resolve widget tokens for a keyword set in one region.
    pub fn explore(
        &self,
        keywords: &[String],
        geo: &str,
        timeframe: &str,
        gprop: Gprop,
    ) -> Result<ExploreSession, TrendsError> {
        let items: Vec<Value> = keywords
            .iter()
            .map(|k| {
                json!({
                    "keyword": k,
                    "geo": normalize_geo(geo),
                    "time": timeframe,
                })
            })
            .collect();
        let req = json!({
            "comparisonItem": items,
            "category": 0,
            "property": gprop.as_param(),
        });
        let url = format!(
            "{}/api/explore?hl={}&tz=0&req={}",
            self.base_url,
            enc(&self.hl),
            enc(&req.to_string())
        );
        let body = self.get_text(&url)?;
        parse_explore(&body)
    }

    /// Fetch the interest-over-time buckets for a resolved session.
    pub fn interest_over_time(
        &self,
        session: &ExploreSession,
    ) -> Result<Vec<TimelinePoint>, TrendsError> {
        let url = format!(
            "{}/api/widgetdata/multiline?hl={}&tz=0&req={}&token={}",
            self.base_url,
            enc(&self.hl),
            enc(&session.timeseries.request.to_string()),
            enc(&session.timeseries.token)
        );
        let body = self.get_text(&url)?;
        parse_multiline(&body)
    }

    /// Fetch rising related queries, one list per keyword in request order.
    /// Keywords without a matching widget get an empty list.
    pub fn related_queries(
        &self,
        session: &ExploreSession,
        keywords: &[String],
    ) -> Result<Vec<(String, Vec<RisingQuery>)>, TrendsError> {
        let mut out = Vec::with_capacity(keywords.len());
        for (i, keyword) in keywords.iter().enumerate() {
            let Some(widget) = session.related.get(i) else {
                out.push((keyword.clone(), Vec::new()));
                continue;
            };
            let url = format!(
                "{}/api/widgetdata/relatedsearches?hl={}&tz=0&req={}&token={}",
                self.base_url,
                enc(&self.hl),
                enc(&widget.request.to_string()),
                enc(&widget.token)
            );
            let body = self.get_text(&url)?;
            out.push((keyword.clone(), parse_related(&body)?));
        }
        Ok(out)
    }

    fn get_text(&self, url: &str) -> Result<String, TrendsError> {
        let mut req = self.http.get(url);
        if let Some(cookie) = &self.cookie {
            req = req.header(COOKIE, cookie.as_str());
        }
        let resp = req.send()?;
        let status = resp.status();
        match status {
            s if s.is_success() => Ok(resp.text()?),
            StatusCode::TOO_MANY_REQUESTS => Err(TrendsError::RateLimited),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TrendsError::Unauthorized {
                status: status.as_u16(),
            }),
            s => Err(TrendsError::UnexpectedStatus {
                status: s.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}

/// Drop the anti-XSSI prefix (`)]}'` plus an optional comma/newline) that the
/// widget endpoints prepend to their JSON bodies.
pub fn strip_json_prefix(body: &str) -> &str {
    match body.find(['{', '[']) {
        Some(idx) => &body[idx..],
        None => body,
    }
}

/// Parse an explore response into widget tokens.
pub fn parse_explore(body: &str) -> Result<ExploreSession, TrendsError> {
    let v: Value =
        serde_json::from_str(strip_json_prefix(body)).map_err(|e| TrendsError::Deserialize {
            context: "explore response".into(),
            source: e,
        })?;
    let widgets = v
        .get("widgets")
        .and_then(Value::as_array)
        .ok_or_else(|| TrendsError::UnexpectedPayload {
            context: "explore response".into(),
            reason: "no widgets array".into(),
        })?;

    let mut timeseries = None;
    let mut related = Vec::new();
    for w in widgets {
        let id = w.get("id").and_then(Value::as_str).unwrap_or_default();
        let Some(widget) = widget_from(w) else {
            continue;
        };
        match id {
            "TIMESERIES" => timeseries = Some(widget),
            "RELATED_QUERIES" => related.push(widget),
            _ => {}
        }
    }

    let timeseries = timeseries.ok_or_else(|| TrendsError::UnexpectedPayload {
        context: "explore response".into(),
        reason: "no TIMESERIES widget".into(),
    })?;
    Ok(ExploreSession {
        timeseries,
        related,
    })
}

fn widget_from(w: &Value) -> Option<Widget> {
    let token = w.get("token")?.as_str()?.to_string();
    let request = w.get("request")?.clone();
    Some(Widget { token, request })
}

#[derive(Deserialize)]
struct MultilineResponse {
    default: MultilineData,
}

#[derive(Deserialize)]
struct MultilineData {
    #[serde(rename = "timelineData", default)]
    timeline_data: Vec<TimelinePoint>,
}

/// Parse an interest-over-time widget body into timeline buckets.
pub fn parse_multiline(body: &str) -> Result<Vec<TimelinePoint>, TrendsError> {
    let resp: MultilineResponse =
        serde_json::from_str(strip_json_prefix(body)).map_err(|e| TrendsError::Deserialize {
            context: "interest-over-time payload".into(),
            source: e,
        })?;
    Ok(resp.default.timeline_data)
}

/// Parse a related-searches widget body into its rising list. The payload
/// carries two ranked lists (top, rising); only rising is kept. Regions
/// without rising queries come back with fewer lists, which is not an error.
pub fn parse_related(body: &str) -> Result<Vec<RisingQuery>, TrendsError> {
    let v: Value =
        serde_json::from_str(strip_json_prefix(body)).map_err(|e| TrendsError::Deserialize {
            context: "related-searches payload".into(),
            source: e,
        })?;
    let ranked_lists = v
        .get("default")
        .and_then(|d| d.get("rankedList"))
        .and_then(Value::as_array)
        .ok_or_else(|| TrendsError::UnexpectedPayload {
            context: "related-searches payload".into(),
            reason: "no rankedList array".into(),
        })?;
    let Some(rising) = ranked_lists.get(1) else {
        return Ok(Vec::new());
    };
    let entries = rising
        .get("rankedKeyword")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut out = Vec::new();
    for e in entries {
        let Some(query) = e.get("query").and_then(Value::as_str) else {
            continue;
        };
        let formatted = e
            .get("formattedValue")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let rise = if formatted.eq_ignore_ascii_case("breakout") {
            Rise::Breakout
        } else {
            Rise::Percent(e.get("value").and_then(Value::as_i64).unwrap_or(0))
        };
        out.push(RisingQuery {
            query: query.to_string(),
            rise,
        });
    }
    Ok(out)
}

/// Cached handshake for the most recently explored region, so the related
/// fetch reuses the tokens obtained for the interest fetch.
#[derive(Debug)]
struct GeoSession {
    geo: String,
    explore: ExploreSession,
    client: Client,
}

/// The network-backed [`TrendsProvider`]. Builds a fresh [`Client`] per
/// attempt and indexes the proxy list round-robin by attempt number.
#[derive(Debug)]
pub struct HttpProvider {
    pub base_url: String,
    session: Option<GeoSession>,
}

impl Default for HttpProvider {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            session: None,
        }
    }
}

impl HttpProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn make_client(&self, cfg: &RequestConfig, attempt: u32) -> Result<Client, TrendsError> {
        let proxy = if cfg.proxies.is_empty() {
            None
        } else {
            Some(cfg.proxies[attempt as usize % cfg.proxies.len()].as_str())
        };
        Client::new(&self.base_url, &cfg.hl, cfg.cookie.as_deref(), proxy)
    }

    fn refresh_session(
        &mut self,
        cfg: &RequestConfig,
        geo: &str,
        attempt: u32,
    ) -> Result<(), TrendsError> {
        let client = self.make_client(cfg, attempt)?;
        let explore = client.explore(&cfg.keywords, geo, &cfg.timeframe, cfg.gprop)?;
        self.session = Some(GeoSession {
            geo: geo.to_string(),
            explore,
            client,
        });
        Ok(())
    }
}

impl TrendsProvider for HttpProvider {
    fn fetch_interest(
        &mut self,
        cfg: &RequestConfig,
        geo: &str,
        attempt: u32,
    ) -> Result<Vec<TimelinePoint>, TrendsError> {
        self.refresh_session(cfg, geo, attempt)?;
        match &self.session {
            Some(s) => s.client.interest_over_time(&s.explore),
            None => Ok(Vec::new()),
        }
    }

    fn fetch_related(
        &mut self,
        cfg: &RequestConfig,
        geo: &str,
    ) -> Result<Vec<RelatedQuery>, TrendsError> {
        if !matches!(&self.session, Some(s) if s.geo == geo) {
            self.refresh_session(cfg, geo, 0)?;
        }
        let groups = match &self.session {
            Some(s) => s.client.related_queries(&s.explore, &cfg.keywords)?,
            None => Vec::new(),
        };
        Ok(groups
            .into_iter()
            .flat_map(|(keyword, rising)| {
                rising
                    .into_iter()
                    .take(RELATED_LIMIT)
                    .map(move |r| RelatedQuery {
                        geo: geo.to_string(),
                        keyword: keyword.clone(),
                        query: r.query,
                        rise: r.rise,
                    })
            })
            .collect())
    }
}

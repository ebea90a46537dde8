//! ASCII rendering of the result table.
//!
//! Two layouts: `vertical` prints one block per region with keywords sorted by
//! descending score and a proportional bar, `wide` prints one row per keyword
//! with regions as columns. Both use GitHub-style pipe tables.

use crate::driver::GeoFailure;
use crate::models::{RelatedQuery, ResultRow};

/// Bar width in characters for a score of 100.
const BAR_WIDTH: usize = 20;

/// Format a score with up to 2 decimals, trimming trailing zeros; absent
/// scores render as `no data`.
pub fn format_score(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            let s = format!("{x:.2}");
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "no data".to_string(),
    }
}

/// Proportional bar: `score` in [0, 100] fills `width` characters.
pub fn bar(score: f64, width: usize) -> String {
    let clamped = score.clamp(0.0, 100.0);
    let filled = (clamped / 100.0 * width as f64).round() as usize;
    let mut out = "█".repeat(filled);
    out.push_str(&"░".repeat(width - filled));
    out
}

/// Region labels in first-seen order.
fn geo_order(rows: &[ResultRow]) -> Vec<&str> {
    let mut order: Vec<&str> = Vec::new();
    for r in rows {
        if !order.contains(&r.geo.as_str()) {
            order.push(&r.geo);
        }
    }
    order
}

/// GitHub-style pipe table with per-column padding.
fn table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let mut out = String::new();
    let line = |cells: &[String], out: &mut String| {
        out.push('|');
        for (i, cell) in cells.iter().enumerate() {
            let pad = widths[i] - cell.chars().count();
            out.push(' ');
            out.push_str(cell);
            out.push_str(&" ".repeat(pad + 1));
            out.push('|');
        }
        out.push('\n');
    };
    line(headers, &mut out);
    out.push('|');
    for w in &widths {
        out.push_str(&"-".repeat(w + 2));
        out.push('|');
    }
    out.push('\n');
    for row in rows {
        line(row.as_slice(), &mut out);
    }
    out
}

/// One row per keyword, one column per region, scores unchanged.
pub fn render_wide(rows: &[ResultRow], keywords: &[String]) -> String {
    let geos = geo_order(rows);
    let mut headers = vec!["keyword".to_string()];
    headers.extend(geos.iter().map(|g| g.to_string()));

    let mut body = Vec::new();
    for kw in keywords {
        let mut cells = vec![kw.clone()];
        for geo in &geos {
            let score = rows
                .iter()
                .find(|r| r.geo == *geo && &r.keyword == kw)
                .and_then(|r| r.score);
            cells.push(format_score(score));
        }
        body.push(cells);
    }
    table(&headers, &body)
}

/// One block per region; keywords sorted by descending score (absent scores
/// last), each row annotated with a proportional bar.
pub fn render_vertical(rows: &[ResultRow]) -> String {
    let headers = vec!["keyword".to_string(), "mean".to_string(), "bar".to_string()];
    let mut out = String::new();
    for geo in geo_order(rows) {
        let mut block: Vec<&ResultRow> = rows.iter().filter(|r| r.geo == geo).collect();
        block.sort_by(|a, b| {
            b.score
                .unwrap_or(f64::NEG_INFINITY)
                .total_cmp(&a.score.unwrap_or(f64::NEG_INFINITY))
        });
        let body: Vec<Vec<String>> = block
            .iter()
            .map(|r| {
                vec![
                    r.keyword.clone(),
                    format_score(r.score),
                    bar(r.score.unwrap_or(0.0), BAR_WIDTH),
                ]
            })
            .collect();
        out.push_str(&format!("\n--- [{geo}] ---\n"));
        out.push_str(&table(&headers, &body));
    }
    out
}

/// Rising related queries, one section per region in row order, one list per
/// keyword. Keywords without rising queries are called out explicitly.
pub fn render_related(
    related: &[RelatedQuery],
    keywords: &[String],
    rows: &[ResultRow],
) -> String {
    let mut out = String::new();
    for geo in geo_order(rows) {
        out.push_str(&format!("\n=== Rising related queries [{geo}] ===\n"));
        for kw in keywords {
            let entries: Vec<&RelatedQuery> = related
                .iter()
                .filter(|r| r.geo == geo && &r.keyword == kw)
                .collect();
            if entries.is_empty() {
                out.push_str(&format!("\n{kw}: (no rising queries)\n"));
            } else {
                out.push_str(&format!("\n{kw}:\n"));
                for e in entries {
                    out.push_str(&format!("  - {} ({})\n", e.query, e.rise));
                }
            }
        }
    }
    out
}

/// Regions that produced no scores, listed alongside the successes.
pub fn render_failures(failures: &[GeoFailure]) -> String {
    let mut out = String::new();
    if failures.is_empty() {
        return out;
    }
    out.push_str("\nFailed regions:\n");
    for f in failures {
        out.push_str(&format!("  - {}: {}\n", f.geo, f.reason));
    }
    out
}

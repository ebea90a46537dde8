use crate::models::{RelatedQuery, ResultRow};
use anyhow::Result;
use csv::WriterBuilder;
use std::path::Path;

/// Save the flat result table as CSV with a header row.
///
/// With `related` set to `None` the header is `region,keyword,score`. With
/// `Some(queries)` two columns are appended (`rising_query,rise`): score rows
/// leave them empty and each rising query gets its own row with an empty score
/// field, so filtering on a non-empty score recovers the score triples.
pub fn save_csv<P: AsRef<Path>>(
    rows: &[ResultRow],
    related: Option<&[RelatedQuery]>,
    path: P,
) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    match related {
        None => {
            wtr.serialize(("region", "keyword", "score"))?;
            for r in rows {
                wtr.serialize((&r.geo, &r.keyword, r.score))?;
            }
        }
        Some(queries) => {
            wtr.serialize(("region", "keyword", "score", "rising_query", "rise"))?;
            for r in rows {
                wtr.serialize((&r.geo, &r.keyword, r.score, "", ""))?;
            }
            for q in queries {
                wtr.serialize((&q.geo, &q.keyword, None::<f64>, &q.query, q.rise.to_string()))?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rise;
    use tempfile::tempdir;

    #[test]
    fn write_csv_plain_and_with_related() {
        let dir = tempdir().unwrap();
        let rows = vec![ResultRow {
            geo: "US".into(),
            keyword: "ai dubbing".into(),
            score: Some(42.5),
        }];

        let plain = dir.path().join("plain.csv");
        save_csv(&rows, None, &plain).unwrap();
        let txt = std::fs::read_to_string(&plain).unwrap();
        assert!(txt.starts_with("region,keyword,score\n"));
        assert!(txt.contains("US,ai dubbing,42.5"));

        let related = vec![RelatedQuery {
            geo: "US".into(),
            keyword: "ai dubbing".into(),
            query: "ai dubbing app".into(),
            rise: Rise::Breakout,
        }];
        let with_related = dir.path().join("related.csv");
        save_csv(&rows, Some(&related), &with_related).unwrap();
        let txt = std::fs::read_to_string(&with_related).unwrap();
        assert!(txt.starts_with("region,keyword,score,rising_query,rise\n"));
        assert!(txt.contains("US,ai dubbing,,ai dubbing app,Breakout"));
    }
}

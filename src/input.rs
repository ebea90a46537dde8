//! CLI input helpers: list parsing, keyword files, cookie resolution.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Environment variable consulted as the last cookie fallback.
pub const COOKIE_ENV: &str = "TRENDS_COOKIE";

/// Split a comma- or semicolon-separated list, trimming blanks.
pub fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Load a list file: one item per line, blank lines and `#` comments ignored,
/// comma-separated items within a line allowed.
pub fn load_list_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read list file '{}'", path.display()))?;
    let mut items = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        items.extend(parse_list(line));
    }
    Ok(items)
}

/// Resolve the Cookie header value with precedence file > flag > environment.
/// An unreadable cookie file is a warning, not an error, so a stale path does
/// not block a run that would work without it.
pub fn resolve_cookie(file: Option<&Path>, flag: Option<&str>) -> Option<String> {
    let from_file = file.and_then(|p| match fs::read_to_string(p) {
        Ok(s) => Some(s),
        Err(e) => {
            log::warn!("failed to read cookie file '{}': {e}", p.display());
            None
        }
    });
    pick_cookie(from_file, flag, std::env::var(COOKIE_ENV).ok())
}

fn pick_cookie(file: Option<String>, flag: Option<&str>, env: Option<String>) -> Option<String> {
    [
        file,
        flag.map(str::to_string),
        env,
    ]
    .into_iter()
    .flatten()
    .map(|s| s.trim().to_string())
    .find(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parse_list_splits_and_trims() {
        assert_eq!(
            parse_list(" a , b ;; c,"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(parse_list("  ").is_empty());
    }

    #[test]
    fn list_file_skips_comments_and_splits_lines() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "# header comment").unwrap();
        writeln!(f, "first keyword").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "second, third").unwrap();
        let items = load_list_from_file(f.path()).unwrap();
        assert_eq!(items, vec!["first keyword", "second", "third"]);
    }

    #[test]
    fn missing_list_file_is_an_error() {
        assert!(load_list_from_file("/nonexistent/keywords.txt").is_err());
    }

    #[test]
    fn cookie_precedence_is_file_then_flag_then_env() {
        assert_eq!(
            pick_cookie(Some("NID=file\n".into()), Some("NID=flag"), Some("NID=env".into())),
            Some("NID=file".to_string())
        );
        assert_eq!(
            pick_cookie(None, Some("NID=flag"), Some("NID=env".into())),
            Some("NID=flag".to_string())
        );
        assert_eq!(
            pick_cookie(None, None, Some("NID=env".into())),
            Some("NID=env".to_string())
        );
        // blank values fall through to the next source
        assert_eq!(
            pick_cookie(Some("  ".into()), None, Some("NID=env".into())),
            Some("NID=env".to_string())
        );
        assert_eq!(pick_cookie(None, None, None), None);
    }
}

use crate::error::{Error, Result};
use crate::types::PrefEntry;
use glob::Pattern;

/// Query preferences by glob patterns (OR logic)
/// Returns entries matching any of the provided patterns, in input order
pub fn query_entries<'a, I>(entries: I, patterns: &[&str]) -> Result<Vec<&'a PrefEntry>>
where
    I: IntoIterator<Item = &'a PrefEntry>,
{
    // Compile all patterns first to fail fast on invalid patterns
    let compiled_patterns: Vec<Pattern> = patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| Error::InvalidGlobPattern(format!("'{}': {}", p, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    // Keep if ANY pattern matches
    let queried = entries
        .into_iter()
        .filter(|entry| {
            compiled_patterns
                .iter()
                .any(|pattern| pattern.matches(&entry.key))
        })
        .collect();

    Ok(queried)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entries() -> Vec<PrefEntry> {
        vec![
            PrefEntry::new("app.update.enabled", true),
            PrefEntry::new("app.update.interval", 86400),
            PrefEntry::new("app.update.url.manual", "http://www.zotero.org/support/standalone"),
            PrefEntry::new("network.prefetch-next", false),
            PrefEntry::new("offline.autoDetect", false),
        ]
    }

    fn keys<'a>(entries: &[&'a PrefEntry]) -> Vec<&'a str> {
        entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn test_query_single_pattern() {
        let entries = create_test_entries();
        let queried = query_entries(&entries, &["app.update.*"]).unwrap();
        assert_eq!(
            keys(&queried),
            vec![
                "app.update.enabled",
                "app.update.interval",
                "app.update.url.manual"
            ]
        );
    }

    #[test]
    fn test_query_multiple_patterns_or_logic() {
        let entries = create_test_entries();
        let queried =
            query_entries(&entries, &["network.*", "offline.autoDetect"]).unwrap();
        assert_eq!(
            keys(&queried),
            vec!["network.prefetch-next", "offline.autoDetect"]
        );
    }

    #[test]
    fn test_query_no_matches() {
        let entries = create_test_entries();
        let queried = query_entries(&entries, &["nonexistent.*"]).unwrap();
        assert!(queried.is_empty());
    }

    #[test]
    fn test_query_invalid_pattern() {
        let entries = create_test_entries();
        let result = query_entries(&entries, &["[invalid"]);
        assert!(matches!(result, Err(Error::InvalidGlobPattern(_))));
    }
}

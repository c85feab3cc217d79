//! Defaults registry
//!
//! A [`Registry`] holds typed default preferences in declaration order. It is
//! filled during a load phase (via [`Registry::declare`] or by loading
//! manifests), then frozen. After [`Registry::freeze`] succeeds no further
//! mutation is possible and the registry can be shared freely between
//! readers, e.g. behind an `Arc`.
//!
//! # Example
//!
//! ```rust
//! use gecko_prefs::{PrefType, PrefValue, Registry};
//!
//! let mut registry = Registry::new();
//! registry.load_str(r#"
//!     pref("app.update.showInstalledUI", true);
//!     pref("app.update.interval", 86400);
//!     pref("app.update.showInstalledUI", false);
//! "#)?;
//! registry.freeze()?;
//!
//! assert_eq!(
//!     registry.get("app.update.showInstalledUI")?,
//!     (PrefType::Bool, &PrefValue::Bool(false))
//! );
//! assert_eq!(registry.all().count(), 2);
//! # Ok::<(), gecko_prefs::Error>(())
//! ```

use crate::error::{Error, ParseError, Result};
use crate::parser::{parse_prefs, ParseOutput};
use crate::query::query_entries;
use crate::types::{PrefEntry, PrefType, PrefValue};
use crate::writer::write_prefs;
use indexmap::IndexMap;
use log::{debug, info, trace, warn};
use std::path::Path;

/// Ordered, typed registry of default preferences
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: IndexMap<String, PrefEntry>,
    errors: Vec<ParseError>,
    frozen: bool,
}

impl Registry {
    /// Create an empty, unfrozen registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `content`, load it and freeze in one step
    pub fn from_manifest(content: &str) -> Result<Self> {
        let mut registry = Self::new();
        registry.load_str(content)?;
        registry.freeze()?;
        Ok(registry)
    }

    /// Declare a default value
    ///
    /// Re-declaring an existing key replaces its value but keeps its
    /// position in iteration order.
    pub fn declare(
        &mut self,
        key: &str,
        value_type: PrefType,
        value: impl Into<PrefValue>,
        comment: Option<&str>,
    ) -> Result<()> {
        if self.frozen {
            return Err(Error::InvalidState(format!(
                "cannot declare '{}' after the registry was frozen",
                key
            )));
        }

        let mut entry = PrefEntry::new(key, value);
        entry.comment = comment.map(str::to_string);

        let actual = entry.pref_type();
        if actual != value_type {
            return Err(mismatch(key, value_type, actual));
        }

        self.declare_entry(entry)
    }

    /// Declare a fully-formed entry, e.g. one produced by the parser
    pub fn declare_entry(&mut self, entry: PrefEntry) -> Result<()> {
        if self.frozen {
            return Err(Error::InvalidState(format!(
                "cannot declare '{}' after the registry was frozen",
                entry.key
            )));
        }
        if entry.key.is_empty() {
            return Err(Error::InvalidPreference(
                "preference name must not be empty".to_string(),
            ));
        }

        if let Some(previous) = self.entries.get(&entry.key) {
            trace!(
                "Overriding '{}': {:?} -> {:?}",
                entry.key,
                previous.value,
                entry.value
            );
        }
        // IndexMap::insert keeps the original slot for existing keys
        self.entries.insert(entry.key.clone(), entry);
        Ok(())
    }

    /// Parse manifest text and declare every well-formed entry
    ///
    /// Malformed declarations do not stop the load. They are recorded in the
    /// registry and returned together as [`Error::Load`]; a registry holding
    /// recorded errors refuses to [`freeze`](Self::freeze).
    pub fn load_str(&mut self, content: &str) -> Result<usize> {
        if self.frozen {
            return Err(Error::InvalidState(
                "cannot load a manifest into a frozen registry".to_string(),
            ));
        }
        self.apply(parse_prefs(content))
    }

    /// Read and load a manifest file
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        debug!("Loading preference manifest {}", path.display());
        self.load_str(&content)
    }

    fn apply(&mut self, output: ParseOutput) -> Result<usize> {
        let ParseOutput { entries, errors } = output;
        let declared = entries.len();
        for entry in entries {
            self.declare_entry(entry)?;
        }
        debug!(
            "Declared {} preferences ({} unique keys so far)",
            declared,
            self.entries.len()
        );

        if errors.is_empty() {
            return Ok(declared);
        }
        self.errors.extend(errors.iter().cloned());
        Err(Error::Load(errors))
    }

    /// Switch the registry to read-only mode
    ///
    /// Calling this again on a frozen registry is a no-op. Fails with
    /// [`Error::Load`] while parse errors are recorded.
    pub fn freeze(&mut self) -> Result<()> {
        if self.frozen {
            return Ok(());
        }
        if !self.errors.is_empty() {
            return Err(Error::Load(self.errors.clone()));
        }
        self.frozen = true;
        info!("Froze registry with {} preferences", self.entries.len());
        Ok(())
    }

    /// Freeze even though parse errors were recorded
    ///
    /// The recorded errors are cleared and returned so the caller can report
    /// them. Entries that did parse stay available.
    pub fn freeze_ignoring_errors(&mut self) -> Vec<ParseError> {
        let errors = std::mem::take(&mut self.errors);
        for error in &errors {
            warn!("Ignoring malformed declaration: {}", error);
        }
        self.frozen = true;
        info!(
            "Froze registry with {} preferences, {} errors ignored",
            self.entries.len(),
            errors.len()
        );
        errors
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Parse errors recorded by earlier loads
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Look up a default value and its type
    pub fn get(&self, key: &str) -> Result<(PrefType, &PrefValue)> {
        self.entry(key)
            .map(|entry| (entry.pref_type(), &entry.value))
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    pub fn entry(&self, key: &str) -> Option<&PrefEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.get(key)? {
            (_, PrefValue::Bool(b)) => Ok(*b),
            (actual, _) => Err(mismatch(key, PrefType::Bool, actual)),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i32> {
        match self.get(key)? {
            (_, PrefValue::Int(n)) => Ok(*n),
            (actual, _) => Err(mismatch(key, PrefType::Int, actual)),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<&str> {
        match self.get(key)? {
            (_, PrefValue::String(s)) => Ok(s),
            (actual, _) => Err(mismatch(key, PrefType::String, actual)),
        }
    }

    /// Iterate over `(key, type, value)` in first-declaration order
    ///
    /// Each call starts a fresh pass.
    pub fn all(&self) -> impl Iterator<Item = (&str, PrefType, &PrefValue)> + '_ {
        self.entries
            .values()
            .map(|entry| (entry.key.as_str(), entry.pref_type(), &entry.value))
    }

    /// Iterate over full entries in first-declaration order
    pub fn entries(&self) -> impl Iterator<Item = &PrefEntry> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose key matches any of the glob patterns
    pub fn query(&self, patterns: &[&str]) -> Result<Vec<&PrefEntry>> {
        query_entries(self.entries(), patterns)
    }

    /// Render the registry back into manifest text
    pub fn to_prefs_js(&self) -> String {
        write_prefs(self.entries())
    }

    /// Export `key -> value` as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .values()
            .map(|entry| {
                let value = match &entry.value {
                    PrefValue::Bool(b) => serde_json::Value::Bool(*b),
                    PrefValue::Int(n) => serde_json::Value::from(*n),
                    PrefValue::String(s) => serde_json::Value::String(s.clone()),
                };
                (entry.key.clone(), value)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

fn mismatch(key: &str, expected: PrefType, actual: PrefType) -> Error {
    Error::TypeMismatch {
        key: key.to_string(),
        expected,
        actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_declare_and_get() {
        let mut registry = Registry::new();
        registry
            .declare("offline.autoDetect", PrefType::Bool, false, None)
            .unwrap();
        registry.freeze().unwrap();
        assert_eq!(
            registry.get("offline.autoDetect").unwrap(),
            (PrefType::Bool, &PrefValue::Bool(false))
        );
    }

    #[test]
    fn test_declare_type_mismatch() {
        let mut registry = Registry::new();
        let result = registry.declare("app.update.mode", PrefType::Bool, 2, None);
        match result {
            Err(Error::TypeMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, PrefType::Bool);
                assert_eq!(actual, PrefType::Int);
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_declare_empty_key_rejected() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.declare("", PrefType::Int, 1, None),
            Err(Error::InvalidPreference(_))
        ));
    }

    #[test]
    fn test_declare_keeps_comment() {
        let mut registry = Registry::new();
        registry
            .declare(
                "app.update.channel",
                PrefType::String,
                "default",
                Some("update channel for this build"),
            )
            .unwrap();
        let entry = registry.entry("app.update.channel").unwrap();
        assert_eq!(
            entry.comment.as_deref(),
            Some("update channel for this build")
        );
    }

    #[test]
    fn test_last_write_wins_keeps_first_position() {
        let mut registry = Registry::new();
        registry.declare("a", PrefType::Bool, true, None).unwrap();
        registry.declare("b", PrefType::Int, 1, None).unwrap();
        registry.declare("a", PrefType::Bool, false, None).unwrap();
        registry.freeze().unwrap();

        let keys: Vec<_> = registry.all().map(|(key, _, _)| key).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(!registry.get_bool("a").unwrap());
    }

    #[test]
    fn test_redeclare_may_change_type() {
        let mut registry = Registry::new();
        registry.declare("k", PrefType::Int, 1, None).unwrap();
        registry
            .declare("k", PrefType::String, "one", None)
            .unwrap();
        assert_eq!(registry.get("k").unwrap().0, PrefType::String);
    }

    #[test]
    fn test_declare_after_freeze_fails() {
        let mut registry = Registry::new();
        registry.freeze().unwrap();
        assert!(matches!(
            registry.declare("late.key", PrefType::Bool, true, None),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            registry.load_str(r#"pref("late.key", true);"#),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_declare_after_freeze_reports_state_before_type() {
        let mut registry = Registry::new();
        registry.freeze().unwrap();
        assert!(matches!(
            registry.declare("k", PrefType::Bool, 1, None),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_freeze_is_idempotent() {
        let mut registry = Registry::new();
        registry.declare("a", PrefType::Int, 1, None).unwrap();
        registry.freeze().unwrap();
        registry.freeze().unwrap();
        assert!(registry.is_frozen());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_missing_key() {
        let registry = Registry::new();
        match registry.get("no.such.pref") {
            Err(Error::NotFound(key)) => assert_eq!(key, "no.such.pref"),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_typed_getters() {
        let registry = Registry::from_manifest(
            r#"
            pref("app.update.auto", true);
            pref("app.update.nagTimer.restart", 1800);
            pref("app.update.channel", "default");
            "#,
        )
        .unwrap();
        assert!(registry.get_bool("app.update.auto").unwrap());
        assert_eq!(registry.get_int("app.update.nagTimer.restart").unwrap(), 1800);
        assert_eq!(registry.get_str("app.update.channel").unwrap(), "default");
        assert!(matches!(
            registry.get_int("app.update.channel"),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_load_reports_all_errors_and_blocks_freeze() {
        init_logger();
        let mut registry = Registry::new();
        let result = registry.load_str(
            r#"
            pref("good.one", 1);
            pref("bad.one", 1.5);
            pref("good.two", "x");
            pref("bad.two", undefined);
            "#,
        );
        match result {
            Err(Error::Load(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected load error, got {:?}", other),
        }

        // Well-formed entries are still declared
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_int("good.one").unwrap(), 1);

        match registry.freeze() {
            Err(Error::Load(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected freeze to fail, got {:?}", other),
        }
        assert!(!registry.is_frozen());
    }

    #[test]
    fn test_errors_accumulate_across_loads() {
        let mut registry = Registry::new();
        let _ = registry.load_str(r#"pref("a", nope);"#);
        let _ = registry.load_str(r#"pref("b", "open);"#);
        assert_eq!(registry.errors().len(), 2);
    }

    #[test]
    fn test_freeze_ignoring_errors() {
        init_logger();
        let mut registry = Registry::new();
        let _ = registry.load_str("pref(\"kept\", true);\npref(\"dropped\", 0.5);");
        let ignored = registry.freeze_ignoring_errors();
        assert_eq!(ignored.len(), 1);
        assert!(registry.is_frozen());
        assert!(registry.errors().is_empty());
        assert!(registry.get_bool("kept").unwrap());
        assert!(!registry.contains("dropped"));
    }

    #[test]
    fn test_later_manifest_overrides_earlier() {
        let mut registry = Registry::new();
        registry
            .load_str(r#"pref("app.update.enabled", true);"#)
            .unwrap();
        registry
            .load_str(r#"pref("app.update.enabled", false);"#)
            .unwrap();
        registry.freeze().unwrap();
        assert!(!registry.get_bool("app.update.enabled").unwrap());
    }

    #[test]
    fn test_all_is_restartable() {
        let registry =
            Registry::from_manifest("pref(\"a\", 1);\npref(\"b\", 2);\npref(\"c\", 3);").unwrap();
        let first: Vec<_> = registry.all().collect();
        let second: Vec<_> = registry.all().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_to_json_object() {
        let registry = Registry::from_manifest(
            "pref(\"a.bool\", true);\npref(\"a.int\", 3);\npref(\"a.str\", \"s\");",
        )
        .unwrap();
        assert_eq!(
            registry.to_json(),
            serde_json::json!({"a.bool": true, "a.int": 3, "a.str": "s"})
        );
    }

    #[test]
    fn test_frozen_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();

        let registry = std::sync::Arc::new(Registry::from_manifest(r#"pref("x", 1);"#).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = std::sync::Arc::clone(&registry);
                std::thread::spawn(move || registry.get_int("x").unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }
}

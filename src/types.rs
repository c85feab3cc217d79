use serde::Serialize;
use std::fmt;

/// The declared type of a preference value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefType {
    /// `true` / `false`
    Bool,
    /// Signed 32-bit integer
    Int,
    /// Double- or single-quoted string
    String,
}

impl fmt::Display for PrefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrefType::Bool => "boolean",
            PrefType::Int => "integer",
            PrefType::String => "string",
        };
        f.write_str(name)
    }
}

/// A typed preference value
///
/// The type is fixed when the literal is parsed; there is no coercion
/// between variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i32),
    String(String),
}

impl PrefValue {
    /// The [`PrefType`] this value belongs to
    pub fn pref_type(&self) -> PrefType {
        match self {
            PrefValue::Bool(_) => PrefType::Bool,
            PrefValue::Int(_) => PrefType::Int,
            PrefValue::String(_) => PrefType::String,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrefValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            PrefValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrefValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        PrefValue::Bool(value)
    }
}

impl From<i32> for PrefValue {
    fn from(value: i32) -> Self {
        PrefValue::Int(value)
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue::String(value.to_string())
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        PrefValue::String(value)
    }
}

/// Which declaration function introduced a preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefKind {
    /// `pref()`
    #[default]
    Default,
    /// `sticky_pref()`
    Sticky,
    /// `lock_pref()`
    Locked,
}

impl PrefKind {
    /// Function name used for this kind in manifest files
    pub fn function_name(self) -> &'static str {
        match self {
            PrefKind::Default => "pref",
            PrefKind::Sticky => "sticky_pref",
            PrefKind::Locked => "lock_pref",
        }
    }
}

/// A single default preference with its metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefEntry {
    /// Dotted preference name, e.g. `app.update.interval`
    pub key: String,
    pub value: PrefValue,
    pub kind: PrefKind,
    /// Comment block directly above the declaration, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// 1-based line of the declaration, `None` when declared from code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl PrefEntry {
    /// Create a `pref()` entry with no comment or source line
    pub fn new(key: impl Into<String>, value: impl Into<PrefValue>) -> Self {
        PrefEntry {
            key: key.into(),
            value: value.into(),
            kind: PrefKind::Default,
            comment: None,
            line: None,
        }
    }

    pub fn pref_type(&self) -> PrefType {
        self.value.pref_type()
    }
}

//! Rendering entries back into manifest syntax
//!
//! Output re-parses to the same keys, types and values.

use crate::types::{PrefEntry, PrefValue};
use std::fmt::Write;

impl PrefEntry {
    /// Render this entry as a single declaration, e.g. `pref("a.b", 1);`
    pub fn to_pref_line(&self) -> String {
        format!(
            "{}({}, {});",
            self.kind.function_name(),
            quote(&self.key),
            literal(&self.value)
        )
    }
}

/// Render entries as manifest text, with comments as `//` lines
pub fn write_prefs<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a PrefEntry>,
{
    let mut out = String::new();
    for entry in entries {
        if let Some(comment) = &entry.comment {
            for line in comment.lines() {
                let _ = writeln!(out, "// {}", line);
            }
        }
        out.push_str(&entry.to_pref_line());
        out.push('\n');
    }
    out
}

fn literal(value: &PrefValue) -> String {
    match value {
        PrefValue::Bool(b) => b.to_string(),
        PrefValue::Int(n) => n.to_string(),
        PrefValue::String(s) => quote(s),
    }
}

/// Double-quote a string using escapes the lexer understands
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_prefs;
    use crate::types::PrefKind;

    #[test]
    fn test_pref_line_forms() {
        assert_eq!(
            PrefEntry::new("offline.autoDetect", false).to_pref_line(),
            r#"pref("offline.autoDetect", false);"#
        );
        assert_eq!(
            PrefEntry::new("app.update.mode", -2).to_pref_line(),
            r#"pref("app.update.mode", -2);"#
        );

        let mut locked = PrefEntry::new("app.update.channel", "default");
        locked.kind = PrefKind::Locked;
        assert_eq!(
            locked.to_pref_line(),
            r#"lock_pref("app.update.channel", "default");"#
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b\\c\nd\te"), r#""a\"b\\c\nd\te""#);
        assert_eq!(quote("\x01"), r#""\x01""#);
        assert_eq!(quote("%LOCALE%/ü"), "\"%LOCALE%/ü\"");
    }

    #[test]
    fn test_written_manifest_reparses() {
        let mut entry = PrefEntry::new("odd.string", "quote \" slash \\ tab\t bell\x07");
        entry.comment = Some("first line\nsecond line".to_string());
        let entries = vec![
            entry,
            PrefEntry::new("some.int", i32::MIN),
            PrefEntry::new("some.bool", true),
        ];

        let text = write_prefs(&entries);
        let output = parse_prefs(&text);
        assert!(output.is_clean(), "{:?}", output.errors);

        let reparsed: Vec<_> = output
            .entries
            .iter()
            .map(|e| (e.key.clone(), e.value.clone(), e.comment.clone()))
            .collect();
        let original: Vec<_> = entries
            .iter()
            .map(|e| (e.key.clone(), e.value.clone(), e.comment.clone()))
            .collect();
        assert_eq!(reparsed, original);
    }
}

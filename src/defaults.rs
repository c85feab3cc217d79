//! Bundled Zotero Standalone default preferences

use crate::error::Result;
use crate::registry::Registry;

/// Text of the Zotero Standalone defaults manifest
pub const STANDALONE_DEFAULTS: &str = include_str!("../defaults/standalone-prefs.js");

/// Load the bundled Zotero Standalone defaults into a frozen registry
///
/// # Example
///
/// ```rust
/// use gecko_prefs::standalone_defaults;
///
/// let registry = standalone_defaults()?;
/// assert_eq!(registry.get_int("app.update.interval")?, 86400);
/// assert_eq!(registry.get_str("app.update.channel")?, "default");
/// # Ok::<(), gecko_prefs::Error>(())
/// ```
pub fn standalone_defaults() -> Result<Registry> {
    Registry::from_manifest(STANDALONE_DEFAULTS)
}

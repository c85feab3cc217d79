//! # gecko-prefs - typed defaults for Gecko preference manifests
//!
//! This library parses Gecko-style default preference manifests
//! (`pref("key", value);` files) into a typed, ordered registry with an
//! explicit load / freeze / read lifecycle.
//!
//! ## Features
//!
//! - Parse `pref()`, `sticky_pref()` and `lock_pref()` declarations with full
//!   JavaScript string escape support
//! - Infer each value's type (boolean, integer, string) from its literal
//! - Report every malformed declaration from a single pass, with line, key
//!   and source text
//! - Last-write-wins for keys declared more than once, keeping the first
//!   declaration's position
//! - Query entries using glob patterns (e.g. `"app.update.*"`)
//! - Write a registry back out as manifest text or JSON
//! - Bundled Zotero Standalone defaults
//!
//! ## Quick Start
//!
//! ```rust
//! use gecko_prefs::{PrefType, PrefValue, Registry};
//!
//! let content = r#"
//!     // Never go offline
//!     pref("offline.autoDetect", false);
//!     pref("app.update.interval", 86400);
//! "#;
//!
//! let registry = Registry::from_manifest(content)?;
//! assert_eq!(
//!     registry.get("offline.autoDetect")?,
//!     (PrefType::Bool, &PrefValue::Bool(false))
//! );
//! assert_eq!(registry.get_int("app.update.interval")?, 86400);
//! # Ok::<(), gecko_prefs::Error>(())
//! ```
//!
//! ### Querying Preferences
//!
//! ```rust
//! use gecko_prefs::standalone_defaults;
//!
//! let registry = standalone_defaults()?;
//! let protocol_handlers = registry.query(&["network.protocol-handler.*"])?;
//! assert_eq!(protocol_handlers.len(), 4);
//! # Ok::<(), gecko_prefs::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All functions return [`Result<T, Error>`]. A load collects every
//! malformed declaration into [`Error::Load`], and a registry holding such
//! errors refuses to freeze:
//!
//! ```rust
//! use gecko_prefs::{Error, Registry};
//!
//! let mut registry = Registry::new();
//! let content = "pref(\"a\", 1.5);\npref(\"b\", true);\npref(\"c\", null);";
//! match registry.load_str(content) {
//!     Err(Error::Load(errors)) => {
//!         for error in &errors {
//!             eprintln!("{}", error);
//!         }
//!         assert_eq!(errors.len(), 2);
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! assert!(registry.freeze().is_err());
//! ```

// Re-export all public types at crate root
pub use types::{PrefEntry, PrefKind, PrefType, PrefValue};

// Re-export error types
pub use error::{Error, ParseError, Result};

// Re-export all public functions at crate root
pub use defaults::{standalone_defaults, STANDALONE_DEFAULTS};
pub use parser::{parse_declaration, parse_prefs, parse_prefs_file, ParseOutput};
pub use query::query_entries;
pub use registry::Registry;
pub use writer::write_prefs;

// All modules are private - use re-exports above for public API
mod defaults;
mod error;
mod lexer;
mod parser;
mod query;
mod registry;
mod types;
mod writer;

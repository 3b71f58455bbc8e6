//! # Bulk Rename
//!
//! Derives new file names from printf-style templates and rewrite rules,
//! and validates the whole batch before any file is touched.
//!
//! ## Core Philosophy
//! - **All or nothing** - A conflicting batch renames nothing
//! - **Deterministic** - A name depends only on the rules and the file's facts
//!
//! ## Architecture
//! The library is split into a core engine and presentation layers:
//! - `core` - The naming engine
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{RenameError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies. Logs go to
/// stderr. Calling this twice leaves the first subscriber in place.
pub fn init_tracing(default_level: tracing::Level) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

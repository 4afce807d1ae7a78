//! Path utilities.
//!
//! Pure functions for path manipulation, no side effects beyond
//! `canonicalize()` lookups.
//!
//! - [`fs`]: normalization (`normalize_path`, `resolve_path`) and ancestry checks

pub mod fs;

pub use fs::{has_ancestor, normalize_path, resolve_path};

//! Configuration section definitions.
//!
//! Each module corresponds to a section in `testbed.toml`:
//!
//! | Module  | TOML Section | Purpose                                   |
//! |---------|--------------|-------------------------------------------|
//! | `paths` | `[paths]`    | Source/tests/fixtures trees, output, template |
//! | `build` | `[build]`    | External library build command            |
//! | `watch` | `[watch]`    | Extension filter and debounce interval    |
//! | `serve` | `[serve]`    | Development server                        |

pub mod build;
mod paths;
mod serve;
mod watch;

pub use build::BuildConfig;
pub use paths::PathsConfig;
pub use serve::ServeConfig;
pub use watch::WatchConfig;

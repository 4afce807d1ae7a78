//! Test suite model: test modules and the fixtures they own.
//!
//! A module is named after the first underscore-delimited segment of its
//! script (`ajax_request_test.js` → `ajax`). Fixtures belong to every module
//! whose name appears in the fixture's file name.

mod fixture;
mod module;

pub use fixture::{Fixture, FixtureKind, FixtureSet};
pub use module::{TestModule, changed_module_key, discover_modules, find_script, output_file_name};

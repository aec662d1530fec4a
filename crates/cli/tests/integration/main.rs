//! CLI integration tests.

mod clean_tests;
mod common;
mod inspect_tests;
mod package_tests;

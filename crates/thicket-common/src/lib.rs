//! Common utilities for the thicket parser.
//!
//! This crate provides shared infrastructure used by every parser component:
//! - **Settings** - tag and attribute case folding policy
//! - **Diagnostics** - bounded log of malformed-input parse errors
//! - **Warning System** - one-shot warnings for constructs parsed in a degraded way

pub mod error;
pub mod settings;
pub mod warning;

pub use error::{ParseError, ParseErrorList};
pub use settings::ParseSettings;

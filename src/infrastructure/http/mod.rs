//! HTTP resolver adapter
//!
//! Fetches channel pages with reqwest and extracts display names from the
//! embedded page data or meta tags.

pub mod extract;
pub mod resolver;

pub use extract::extract_name;
pub use resolver::HttpResolver;

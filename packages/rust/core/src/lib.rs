//! Core build logic for the Hautū Waka site.
//!
//! This crate loads the content documents, validates their cross-references,
//! renders each template slot and writes the merged page (`build_site`).

pub mod loader;
pub mod pipeline;
pub mod render;
pub mod template;
pub mod validate;

#[cfg(test)]
mod fixtures;

pub use loader::{ContentIndex, ContentSet, load_content};
pub use pipeline::{BuildProgress, BuildReport, SilentProgress, build_site, check_content};
pub use template::{SLOTS, Template};
pub use validate::{ValidationReport, validate};

//! Shared types, error model, and configuration for the Hautū Waka builder.
//!
//! This crate is the foundation depended on by the other workspace crates.
//! It provides:
//! - [`HautuError`]: the unified error type, plus [`ValidationWarning`]
//! - Content types ([`IntroContent`], [`Stage`], [`Tool`], [`MusclesDocument`], [`SourcesDocument`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildConfig, BuildOptions, CONFIG_FILE_NAME, PathsConfig, init_config,
    load_config, load_config_from,
};
pub use error::{BuildStage, EntityKind, HautuError, Result, ValidationWarning};
pub use types::{
    Attribution, Dimension, DocumentKind, Hotspot, IntroContent, IntroSection, Muscle,
    MusclesDocument, SourceCategory, SourceItem, SourcesDocument, Stage, Tool,
};

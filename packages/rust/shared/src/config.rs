//! Build configuration for the Hautū Waka site builder.
//!
//! Project config lives at `./hautu.toml` next to the content.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HautuError, Result};
use crate::types::DocumentKind;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "hautu.toml";

// ---------------------------------------------------------------------------
// Config structs (matching hautu.toml schema)
// ---------------------------------------------------------------------------

/// Top-level project config, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Build behaviour.
    #[serde(default)]
    pub build: BuildOptions,
}

/// `[paths]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the five content documents.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Structural template; the embedded default is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    /// Output HTML file.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Diagram image, referenced from the output by relative filename.
    #[serde(default = "default_diagram_image")]
    pub diagram_image: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            template: None,
            output: default_output(),
            diagram_image: default_diagram_image(),
        }
    }
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_output() -> PathBuf {
    PathBuf::from("output").join("hautu-waka.html")
}
fn default_diagram_image() -> String {
    "hautu-waka.png".into()
}

/// `[build]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Escalate validation warnings to a fatal error.
    #[serde(default)]
    pub strict: bool,

    /// Documents that may be absent from the content directory.
    #[serde(default)]
    pub optional_documents: Vec<DocumentKind>,
}

// ---------------------------------------------------------------------------
// Build config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime build configuration: merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub content_dir: PathBuf,
    pub template: Option<PathBuf>,
    pub output: PathBuf,
    pub diagram_image: String,
    pub strict: bool,
    pub optional_documents: BTreeSet<DocumentKind>,
}

impl BuildConfig {
    /// Whether a missing file for `kind` is tolerated.
    pub fn is_optional(&self, kind: DocumentKind) -> bool {
        self.optional_documents.contains(&kind)
    }

    /// Resolve relative paths against `base` (usually the config file's directory).
    pub fn resolved_against(mut self, base: &Path) -> Self {
        self.content_dir = base.join(&self.content_dir);
        self.template = self.template.map(|t| base.join(t));
        self.output = base.join(&self.output);
        self
    }
}

impl From<&AppConfig> for BuildConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            content_dir: config.paths.content_dir.clone(),
            template: config.paths.template.clone(),
            output: config.paths.output.clone(),
            diagram_image: config.paths.diagram_image.clone(),
            strict: config.build.strict,
            optional_documents: config.build.optional_documents.iter().copied().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load `hautu.toml` from `dir`. Returns defaults if the file does not exist.
pub fn load_config(dir: &Path) -> Result<AppConfig> {
    let path = dir.join(CONFIG_FILE_NAME);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the project config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| HautuError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| HautuError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default `hautu.toml` into `dir`. Refuses to overwrite an existing file.
/// Returns the path to the created file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(HautuError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| HautuError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| HautuError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("content_dir"));
        assert!(toml_str.contains("hautu-waka.png"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed, config);
    }

    #[test]
    fn config_with_overrides() {
        let toml_str = r#"
[paths]
content_dir = "content"
template = "site/template.html"

[build]
strict = true
optional_documents = ["sources"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.paths.content_dir, PathBuf::from("content"));
        assert_eq!(config.paths.output, default_output());

        let build = BuildConfig::from(&config);
        assert!(build.strict);
        assert!(build.is_optional(DocumentKind::Sources));
        assert!(!build.is_optional(DocumentKind::Tools));
    }

    #[test]
    fn unknown_optional_document_is_rejected() {
        let toml_str = "[build]\noptional_documents = [\"glossary\"]\n";
        assert!(toml::from_str::<AppConfig>(toml_str).is_err());
    }

    #[test]
    fn build_config_resolves_relative_paths() {
        let build = BuildConfig::from(&AppConfig::default()).resolved_against(Path::new("/site"));
        assert_eq!(build.content_dir, PathBuf::from("/site/data"));
        assert_eq!(build.output, PathBuf::from("/site/output/hautu-waka.html"));
        assert_eq!(build.template, None);
    }
}

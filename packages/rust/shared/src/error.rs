//! Error types for the Hautū Waka site builder.
//!
//! Library crates use [`HautuError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::types::DocumentKind;

/// The linear build state machine. Every fatal error names the stage it aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStage {
    Idle,
    Loaded,
    Validated,
    Rendered,
    Written,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loaded => "load",
            Self::Validated => "validate",
            Self::Rendered => "render",
            Self::Written => "write",
        };
        f.write_str(name)
    }
}

/// Entity kinds that carry id references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Stage,
    Tool,
    Muscle,
    SourceCategory,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stage => "stage",
            Self::Tool => "tool",
            Self::Muscle => "muscle",
            Self::SourceCategory => "source category",
        };
        f.write_str(name)
    }
}

/// A non-fatal content issue found during validation.
///
/// The `DanglingReference` variant is the classic cross-reference warning;
/// the others cover the remaining authoring invariants. Strict builds
/// escalate any of them to [`HautuError::Validation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// `entity.field` references an id that does not exist in the target collection.
    DanglingReference {
        entity: EntityKind,
        entity_id: String,
        field: &'static str,
        missing_id: String,
    },
    /// Two entities of the same kind share an id.
    DuplicateId { entity: EntityKind, id: String },
    /// A tool lists a muscle (or vice versa) but the other side does not link back.
    OneSidedLink {
        entity: EntityKind,
        entity_id: String,
        field: &'static str,
        target_id: String,
    },
    /// A hotspot coordinate lies outside `[0, 100]`.
    HotspotOutOfRange {
        stage_id: String,
        coordinate: &'static str,
        value: f64,
    },
    /// A video or link value is not an absolute URL.
    InvalidUrl {
        entity: EntityKind,
        entity_id: String,
        field: &'static str,
        value: String,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingReference {
                entity,
                entity_id,
                field,
                missing_id,
            } => write!(
                f,
                "{entity} '{entity_id}' references unknown id '{missing_id}' in `{field}`"
            ),
            Self::DuplicateId { entity, id } => write!(f, "duplicate {entity} id '{id}'"),
            Self::OneSidedLink {
                entity,
                entity_id,
                field,
                target_id,
            } => write!(
                f,
                "{entity} '{entity_id}' lists '{target_id}' in `{field}` but '{target_id}' does not link back"
            ),
            Self::HotspotOutOfRange {
                stage_id,
                coordinate,
                value,
            } => write!(
                f,
                "stage '{stage_id}' hotspot {coordinate} = {value} is outside [0, 100]"
            ),
            Self::InvalidUrl {
                entity,
                entity_id,
                field,
                value,
            } => write!(f, "{entity} '{entity_id}' has invalid URL in `{field}`: {value}"),
        }
    }
}

/// Top-level error type for all build operations.
#[derive(Debug, thiserror::Error)]
pub enum HautuError {
    /// A content document is missing or is not valid JSON for its schema.
    #[error("failed to load {document} document from {path:?}: {message}")]
    ContentLoad {
        document: DocumentKind,
        path: PathBuf,
        message: String,
        /// 1-based line of a parse error, if any.
        line: Option<usize>,
        /// 1-based column of a parse error, if any.
        column: Option<usize>,
    },

    /// Strict-mode escalation of validation warnings.
    #[error("validation failed with {} warning(s): {}", warnings.len(), join_warnings(warnings))]
    Validation { warnings: Vec<ValidationWarning> },

    /// A template insertion point could not be bound.
    #[error("template binding error for slot {slot}: {message}")]
    TemplateBinding { slot: String, message: String },

    /// Writing the merged document failed.
    #[error("failed to write output {path:?}: {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error outside of the output write.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HautuError>;

fn join_warnings(warnings: &[ValidationWarning]) -> String {
    warnings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl HautuError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a template binding error for a slot.
    pub fn template_binding(slot: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TemplateBinding {
            slot: slot.into(),
            message: msg.into(),
        }
    }

    /// A content document file does not exist or cannot be read.
    pub fn content_missing(
        document: DocumentKind,
        path: impl Into<PathBuf>,
        source: &std::io::Error,
    ) -> Self {
        Self::ContentLoad {
            document,
            path: path.into(),
            message: source.to_string(),
            line: None,
            column: None,
        }
    }

    /// A content document failed to parse; keeps the parse location.
    pub fn content_parse(
        document: DocumentKind,
        path: impl Into<PathBuf>,
        source: &serde_json::Error,
    ) -> Self {
        Self::ContentLoad {
            document,
            path: path.into(),
            message: source.to_string(),
            line: Some(source.line()),
            column: Some(source.column()),
        }
    }

    /// Wrap a `std::io::Error` from writing the output document.
    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The build stage this error aborts.
    pub fn stage(&self) -> BuildStage {
        match self {
            Self::ContentLoad { .. } | Self::Config { .. } | Self::Io { .. } => BuildStage::Loaded,
            Self::Validation { .. } => BuildStage::Validated,
            Self::TemplateBinding { .. } => BuildStage::Rendered,
            Self::OutputWrite { .. } => BuildStage::Written,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = HautuError::config("unknown document 'glossary'");
        assert_eq!(err.to_string(), "config error: unknown document 'glossary'");

        let err = HautuError::template_binding("TOOLS_SECTION", "slot appears twice");
        assert!(err.to_string().contains("TOOLS_SECTION"));
        assert_eq!(err.stage(), BuildStage::Rendered);
    }

    #[test]
    fn parse_error_keeps_location() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{\n  \"a\": ,\n}").unwrap_err();
        let err = HautuError::content_parse(DocumentKind::Tools, "data/tools.json", &parse_err);
        match &err {
            HautuError::ContentLoad {
                document,
                line,
                column,
                ..
            } => {
                assert_eq!(*document, DocumentKind::Tools);
                assert_eq!(*line, Some(2));
                assert!(column.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("tools"));
        assert_eq!(err.stage(), BuildStage::Loaded);
    }

    #[test]
    fn validation_error_lists_every_warning() {
        let err = HautuError::Validation {
            warnings: vec![
                ValidationWarning::DanglingReference {
                    entity: EntityKind::Stage,
                    entity_id: "te-kore".into(),
                    field: "tools",
                    missing_id: "ghost".into(),
                },
                ValidationWarning::DuplicateId {
                    entity: EntityKind::Tool,
                    id: "hui".into(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 warning(s)"));
        assert!(msg.contains("stage 'te-kore' references unknown id 'ghost' in `tools`"));
        assert!(msg.contains("duplicate tool id 'hui'"));
    }
}

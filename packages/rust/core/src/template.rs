//! Structural template and slot binding.
//!
//! A template is HTML with `{{SLOT_NAME}}` insertion points. It is parsed
//! once into literal text and slot segments, then bound in a single pass:
//! fragment text is never rescanned, so content containing `{{...}}` is
//! emitted verbatim.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument, warn};

use hautu_shared::{DocumentKind, HautuError, Result};

use crate::render::{self, RenderContext};

/// The template shipped with the builder.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/hautu-waka.html");

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z][A-Z0-9_]*)\s*\}\}").expect("valid regex"));

// ---------------------------------------------------------------------------
// Slot table
// ---------------------------------------------------------------------------

/// A named insertion point and the pure renderer that fills it.
pub struct SlotSpec {
    pub name: &'static str,
    /// A mandatory slot must be present in the template and its document loaded.
    pub mandatory: bool,
    /// The document the slot renders; `None` for slots fed by configuration.
    pub document: Option<DocumentKind>,
    /// Returns `None` when the backing document is absent.
    pub render: fn(&RenderContext<'_>) -> Option<String>,
}

/// Every slot the builder knows, in render order.
pub static SLOTS: &[SlotSpec] = &[
    SlotSpec {
        name: "INTRO_SECTION",
        mandatory: true,
        document: Some(DocumentKind::Intro),
        render: |ctx| ctx.content.intro.as_ref().map(render::render_intro),
    },
    SlotSpec {
        name: "STAGES_SECTION",
        mandatory: false,
        document: Some(DocumentKind::Stages),
        render: |ctx| {
            ctx.content
                .stages
                .as_deref()
                .map(|stages| render::render_stages(stages, ctx.index))
        },
    },
    SlotSpec {
        name: "STAGE_DATA",
        mandatory: true,
        document: Some(DocumentKind::Stages),
        render: |ctx| {
            ctx.content
                .stages
                .as_deref()
                .map(|stages| render::render_stage_data(stages, ctx.index))
        },
    },
    SlotSpec {
        name: "TOOLS_SECTION",
        mandatory: true,
        document: Some(DocumentKind::Tools),
        render: |ctx| {
            ctx.content
                .tools
                .as_deref()
                .map(|tools| render::render_tools(tools, ctx.index))
        },
    },
    SlotSpec {
        name: "MUSCLES_SECTION",
        mandatory: true,
        document: Some(DocumentKind::Muscles),
        render: |ctx| {
            ctx.content
                .muscles
                .as_ref()
                .map(|doc| render::render_muscles(doc, ctx.index))
        },
    },
    SlotSpec {
        name: "SOURCES_SECTION",
        mandatory: false,
        document: Some(DocumentKind::Sources),
        render: |ctx| ctx.content.sources.as_ref().map(render::render_sources),
    },
    SlotSpec {
        name: "DIAGRAM_IMAGE",
        mandatory: false,
        document: None,
        render: |ctx| Some(render::escape(ctx.diagram_image)),
    },
];

/// Look up a slot by name.
pub fn slot(name: &str) -> Option<&'static SlotSpec> {
    SLOTS.iter().find(|s| s.name == name)
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(&'static str),
}

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template source.
    ///
    /// Fails with [`HautuError::TemplateBinding`] if a known slot appears more
    /// than once or a mandatory slot is missing. Unknown placeholders are kept
    /// as literal text.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut seen = HashSet::new();
        let mut last = 0;

        for caps in PLACEHOLDER_RE.captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str();

            let Some(spec) = slot(name) else {
                warn!(placeholder = name, "unknown template placeholder left as-is");
                continue;
            };
            if !seen.insert(spec.name) {
                return Err(HautuError::template_binding(
                    spec.name,
                    "insertion point appears more than once",
                ));
            }

            if whole.start() > last {
                segments.push(Segment::Text(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Slot(spec.name));
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Text(source[last..].to_string()));
        }

        if let Some(missing) = SLOTS.iter().find(|s| s.mandatory && !seen.contains(s.name)) {
            return Err(HautuError::template_binding(
                missing.name,
                "template has no insertion point for mandatory slot",
            ));
        }

        Ok(Self { segments })
    }

    /// Read and parse a template file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| HautuError::io(path, e))?;
        Self::parse(&source)
    }

    /// The embedded default template.
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_TEMPLATE)
    }

    /// Slot names in the order they appear.
    pub fn slot_names(&self) -> Vec<&'static str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Slot(name) => Some(*name),
                Segment::Text(_) => None,
            })
            .collect()
    }

    /// Fill every insertion point exactly once.
    ///
    /// A slot whose document is absent renders empty, unless the slot is
    /// mandatory, which fails with [`HautuError::TemplateBinding`].
    #[instrument(skip_all, fields(slots = self.slot_names().len()))]
    pub fn bind(&self, ctx: &RenderContext<'_>) -> Result<String> {
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(name) => {
                    let spec = slot(name)
                        .ok_or_else(|| HautuError::template_binding(*name, "unknown slot"))?;

                    match (spec.render)(ctx) {
                        Some(fragment) => {
                            debug!(slot = name, bytes = fragment.len(), "slot rendered");
                            out.push_str(&fragment);
                        }
                        None if spec.mandatory => {
                            let document = spec.document.map(|d| d.name()).unwrap_or("content");
                            return Err(HautuError::template_binding(
                                spec.name,
                                format!("{document} document is not loaded"),
                            ));
                        }
                        None => debug!(slot = name, "slot left empty"),
                    }
                }
            }
        }

        Ok(out)
    }
}

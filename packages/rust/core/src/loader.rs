//! Content loader.
//!
//! Reads the five named JSON documents from the content directory and
//! builds the id lookup maps used by validation and rendering.

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use hautu_shared::{
    BuildConfig, DocumentKind, HautuError, IntroContent, Muscle, MusclesDocument, Result,
    SourcesDocument, Stage, Tool,
};

/// Every content document, parsed. Optional documents may be absent.
#[derive(Debug, Clone)]
pub struct ContentSet {
    pub intro: Option<IntroContent>,
    pub stages: Option<Vec<Stage>>,
    pub tools: Option<Vec<Tool>>,
    pub muscles: Option<MusclesDocument>,
    pub sources: Option<SourcesDocument>,
}

impl ContentSet {
    /// Whether the given document was loaded.
    pub fn has(&self, kind: DocumentKind) -> bool {
        match kind {
            DocumentKind::Intro => self.intro.is_some(),
            DocumentKind::Stages => self.stages.is_some(),
            DocumentKind::Tools => self.tools.is_some(),
            DocumentKind::Muscles => self.muscles.is_some(),
            DocumentKind::Sources => self.sources.is_some(),
        }
    }

    pub fn stages(&self) -> &[Stage] {
        self.stages.as_deref().unwrap_or_default()
    }

    pub fn tools(&self) -> &[Tool] {
        self.tools.as_deref().unwrap_or_default()
    }

    /// All muscles across dimensions, in authored order.
    pub fn muscles(&self) -> Vec<&Muscle> {
        self.muscles
            .as_ref()
            .map(|doc| doc.muscles().collect())
            .unwrap_or_default()
    }

    /// Build id lookup maps. The first entity wins when an id is duplicated.
    pub fn index(&self) -> ContentIndex<'_> {
        let mut index = ContentIndex::default();
        for stage in self.stages() {
            index.stages.entry(stage.id.as_str()).or_insert(stage);
        }
        for tool in self.tools() {
            index.tools.entry(tool.id.as_str()).or_insert(tool);
        }
        for muscle in self.muscles() {
            index.muscles.entry(muscle.id.as_str()).or_insert(muscle);
        }
        index
    }
}

/// id → entity maps, built once per build and only read afterwards.
#[derive(Debug, Default)]
pub struct ContentIndex<'a> {
    pub stages: HashMap<&'a str, &'a Stage>,
    pub tools: HashMap<&'a str, &'a Tool>,
    pub muscles: HashMap<&'a str, &'a Muscle>,
}

/// Load every content document from `config.content_dir`.
///
/// Missing required documents and malformed JSON fail with
/// [`HautuError::ContentLoad`] naming the document.
#[instrument(skip_all, fields(dir = %config.content_dir.display()))]
pub fn load_content(config: &BuildConfig) -> Result<ContentSet> {
    let dir = &config.content_dir;
    let optional = |kind| config.is_optional(kind);

    let content = ContentSet {
        intro: load_document(dir, DocumentKind::Intro, optional(DocumentKind::Intro))?,
        stages: load_document(dir, DocumentKind::Stages, optional(DocumentKind::Stages))?,
        tools: load_document(dir, DocumentKind::Tools, optional(DocumentKind::Tools))?,
        muscles: load_document(dir, DocumentKind::Muscles, optional(DocumentKind::Muscles))?,
        sources: load_document(dir, DocumentKind::Sources, optional(DocumentKind::Sources))?,
    };

    info!(
        stages = content.stages().len(),
        tools = content.tools().len(),
        muscles = content.muscles().len(),
        "content loaded"
    );

    Ok(content)
}

/// Read and parse one document. Returns `Ok(None)` for an absent optional document.
pub fn load_document<T: DeserializeOwned>(
    dir: &Path,
    kind: DocumentKind,
    optional: bool,
) -> Result<Option<T>> {
    let path = dir.join(kind.file_name());

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if optional && e.kind() == std::io::ErrorKind::NotFound => {
            debug!(document = %kind, path = %path.display(), "optional document absent");
            return Ok(None);
        }
        Err(e) => return Err(HautuError::content_missing(kind, &path, &e)),
    };

    let parsed =
        serde_json::from_str(&raw).map_err(|e| HautuError::content_parse(kind, &path, &e))?;

    debug!(document = %kind, bytes = raw.len(), "parsed document");
    Ok(Some(parsed))
}

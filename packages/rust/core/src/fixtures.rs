//! Sample content shared by the unit tests.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use hautu_shared::{
    Attribution, BuildConfig, Dimension, DocumentKind, Hotspot, IntroContent, Muscle,
    MusclesDocument, SourceCategory, SourceItem, SourcesDocument, Stage, Tool,
};

use crate::loader::ContentSet;

pub(crate) fn temp_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{prefix}-{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub(crate) fn intro() -> IntroContent {
    IntroContent {
        title: Some("Hautū Waka".into()),
        subtitle: Some("Navigating change".into()),
        hook: "Every voyage begins at the shore.".into(),
        paragraphs: vec!["First paragraph.".into(), "Second paragraph.".into()],
        sections: vec![],
        video: None,
        attribution: Attribution::Text("Shared with permission.".into()),
    }
}

pub(crate) fn stage(id: &str, name: &str, tools: &[&str]) -> Stage {
    Stage {
        id: id.into(),
        name: name.into(),
        name_english: None,
        position: None,
        description: format!("About {name}."),
        state: None,
        reflection_questions: vec![format!("Where are you in {name}?")],
        hotspot: Hotspot {
            x_percent: 12.0,
            y_percent: 18.0,
            width_percent: 18.0,
            height_percent: 28.0,
        },
        tools: tools.iter().map(|t| (*t).to_string()).collect(),
    }
}

pub(crate) fn tool(id: &str, name: &str, stages: &[&str], muscles: &[&str]) -> Tool {
    Tool {
        id: id.into(),
        name: name.into(),
        description: format!("How to run a {name}."),
        stages: stages.iter().map(|s| (*s).to_string()).collect(),
        muscles: muscles.iter().map(|m| (*m).to_string()).collect(),
        video: None,
        source: None,
    }
}

pub(crate) fn muscle(id: &str, name: &str, tools: &[&str]) -> Muscle {
    Muscle {
        id: id.into(),
        name: name.into(),
        description: format!("The capacity for {name}."),
        tools: tools.iter().map(|t| (*t).to_string()).collect(),
    }
}

pub(crate) fn muscles_document(muscles: Vec<Muscle>) -> MusclesDocument {
    MusclesDocument {
        intro: "Capabilities built by practice.".into(),
        dimensions: vec![Dimension {
            id: "whakaaro".into(),
            name: "Whakaaro".into(),
            name_english: Some("Thinking".into()),
            description: "Ways of thinking.".into(),
            muscles,
        }],
    }
}

pub(crate) fn sources() -> SourcesDocument {
    SourcesDocument {
        intro: "The network that fed this work.".into(),
        categories: vec![SourceCategory {
            id: "readings".into(),
            name: "Readings".into(),
            description: "Books and papers.".into(),
            items: vec![
                SourceItem {
                    name: "Wayfinding".into(),
                    reading: true,
                    author: Some("A. Navigator".into()),
                    role: None,
                    description: None,
                    link: Some("https://example.org/wayfinding".into()),
                },
                SourceItem {
                    name: "Local iwi".into(),
                    reading: false,
                    author: None,
                    role: Some("Kaitiaki".into()),
                    description: None,
                    link: None,
                },
            ],
        }],
    }
}

/// A fully consistent content set: every reference resolves both ways.
pub(crate) fn content_set() -> ContentSet {
    ContentSet {
        intro: Some(intro()),
        stages: Some(vec![
            stage("te-kore", "Te Kore", &["hui"]),
            stage("te-po", "Te Pō", &["hui", "wananga"]),
        ]),
        tools: Some(vec![
            tool("hui", "Hui", &["te-kore", "te-po"], &["whakarongo"]),
            tool("wananga", "Wānanga", &["te-po"], &["korero"]),
        ]),
        muscles: Some(muscles_document(vec![
            muscle("whakarongo", "Whakarongo", &["hui"]),
            muscle("korero", "Kōrero", &["wananga"]),
        ])),
        sources: Some(sources()),
    }
}

/// Write every document of `content` as JSON into `dir`.
pub(crate) fn write_content(dir: &Path, content: &ContentSet) {
    let write = |kind: DocumentKind, json: String| {
        std::fs::write(dir.join(kind.file_name()), json).unwrap();
    };
    if let Some(intro) = &content.intro {
        write(DocumentKind::Intro, serde_json::to_string_pretty(intro).unwrap());
    }
    if let Some(stages) = &content.stages {
        write(DocumentKind::Stages, serde_json::to_string_pretty(stages).unwrap());
    }
    if let Some(tools) = &content.tools {
        write(DocumentKind::Tools, serde_json::to_string_pretty(tools).unwrap());
    }
    if let Some(muscles) = &content.muscles {
        write(DocumentKind::Muscles, serde_json::to_string_pretty(muscles).unwrap());
    }
    if let Some(sources) = &content.sources {
        write(DocumentKind::Sources, serde_json::to_string_pretty(sources).unwrap());
    }
}

/// A temp content directory populated with [`content_set`].
pub(crate) fn content_dir() -> PathBuf {
    let dir = temp_dir("hautu-content");
    write_content(&dir, &content_set());
    dir
}

pub(crate) fn build_config(dir: &Path) -> BuildConfig {
    BuildConfig {
        content_dir: dir.to_path_buf(),
        template: None,
        output: dir.join("out").join("site.html"),
        diagram_image: "hautu-waka.png".into(),
        strict: false,
        optional_documents: BTreeSet::new(),
    }
}

//! Content document types for the Hautū Waka site.
//!
//! Each content file in the data directory deserializes into one of the
//! document types below. Entities are read once per build and never mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DocumentKind
// ---------------------------------------------------------------------------

/// The five named content documents a build reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Intro,
    Stages,
    Tools,
    Muscles,
    Sources,
}

impl DocumentKind {
    /// Every document, in load order.
    pub const ALL: [DocumentKind; 5] = [
        Self::Intro,
        Self::Stages,
        Self::Tools,
        Self::Muscles,
        Self::Sources,
    ];

    /// Short document name (`"tools"`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Stages => "stages",
            Self::Tools => "tools",
            Self::Muscles => "muscles",
            Self::Sources => "sources",
        }
    }

    /// File name inside the content directory (`"tools.json"`).
    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown document '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Intro
// ---------------------------------------------------------------------------

/// `intro.json`: the opening section of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub hook: String,
    /// Plain body paragraphs, in authored order.
    #[serde(default)]
    pub paragraphs: Vec<String>,
    /// Headed blocks rendered after the paragraphs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<IntroSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    pub attribution: Attribution,
}

/// A headed block inside the introduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroSection {
    pub heading: String,
    pub content: String,
}

/// Either a single attribution line or a primary credit plus organisations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attribution {
    Text(String),
    Detailed {
        primary: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organisations: Option<String>,
    },
}

impl Attribution {
    /// Attribution lines in display order.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => vec![text.as_str()],
            Self::Detailed {
                primary,
                organisations,
            } => std::iter::once(primary.as_str())
                .chain(organisations.as_deref())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// One phase of the process, located on the diagram by its hotspot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    #[serde(alias = "name_maori")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_english: Option<String>,
    /// Display position; falls back to the 1-based authored index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(alias = "as_stage")]
    pub description: String,
    /// What being in this stage feels like.
    #[serde(default, alias = "as_state", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub reflection_questions: Vec<String>,
    pub hotspot: Hotspot,
    /// Tool ids, in authored order.
    #[serde(default)]
    pub tools: Vec<String>,
}

/// Percentage rectangle on the diagram image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    #[serde(alias = "x")]
    pub x_percent: f64,
    #[serde(alias = "y")]
    pub y_percent: f64,
    #[serde(alias = "width")]
    pub width_percent: f64,
    #[serde(alias = "height")]
    pub height_percent: f64,
}

impl Hotspot {
    /// `(name, value)` pairs for each coordinate.
    pub fn coordinates(&self) -> [(&'static str, f64); 4] {
        [
            ("x_percent", self.x_percent),
            ("y_percent", self.y_percent),
            ("width_percent", self.width_percent),
            ("height_percent", self.height_percent),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// A practice or technique used in stages and developing muscles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub stages: Vec<String>,
    #[serde(default)]
    pub muscles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

// ---------------------------------------------------------------------------
// Muscles
// ---------------------------------------------------------------------------

/// `muscles.json`: an intro plus muscles grouped into dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusclesDocument {
    #[serde(default)]
    pub intro: String,
    pub dimensions: Vec<Dimension>,
}

impl MusclesDocument {
    /// Every muscle across all dimensions, in authored order.
    pub fn muscles(&self) -> impl Iterator<Item = &Muscle> {
        self.dimensions.iter().flat_map(|d| d.muscles.iter())
    }
}

/// A named grouping of related muscles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_english: Option<String>,
    #[serde(default)]
    pub description: String,
    pub muscles: Vec<Muscle>,
}

impl Dimension {
    /// Ids of the muscles in this dimension, in authored order.
    pub fn muscle_ids(&self) -> Vec<&str> {
        self.muscles.iter().map(|m| m.id.as_str()).collect()
    }
}

/// A capability developed by one or more tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Muscle {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tools: Vec<String>,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// `sources.json`: categorized references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesDocument {
    #[serde(default)]
    pub intro: String,
    pub categories: Vec<SourceCategory>,
}

/// A category of references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<SourceItem>,
}

/// A single reference. Readings use `title`, people and organisations `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSourceItem", into = "RawSourceItem")]
pub struct SourceItem {
    pub name: String,
    /// Authored with `title` rather than `name`.
    pub reading: bool,
    pub author: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

impl SourceItem {
    /// Secondary text shown after the name.
    ///
    /// Readings show only their author. Other items fall back from author to
    /// role to description.
    pub fn detail(&self) -> Option<&str> {
        let detail = if self.reading {
            self.author.as_deref()
        } else {
            self.author
                .as_deref()
                .or(self.role.as_deref())
                .or(self.description.as_deref())
        };
        detail.filter(|s| !s.is_empty())
    }
}

#[derive(Serialize, Deserialize)]
struct RawSourceItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

impl TryFrom<RawSourceItem> for SourceItem {
    type Error = String;

    fn try_from(raw: RawSourceItem) -> Result<Self, Self::Error> {
        let (name, reading) = match (raw.title, raw.name) {
            (Some(title), _) => (title, true),
            (None, Some(name)) => (name, false),
            (None, None) => return Err("source item needs a `name` or `title`".into()),
        };
        Ok(Self {
            name,
            reading,
            author: raw.author,
            role: raw.role,
            description: raw.description,
            link: raw.link,
        })
    }
}

impl From<SourceItem> for RawSourceItem {
    fn from(item: SourceItem) -> Self {
        let (title, name) = if item.reading {
            (Some(item.name), None)
        } else {
            (None, Some(item.name))
        };
        Self {
            title,
            name,
            author: item.author,
            role: item.role,
            description: item.description,
            link: item.link,
        }
    }
}

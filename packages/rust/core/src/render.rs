//! Fragment renderers.
//!
//! Each function turns one content document into the markup for one
//! template slot. Renderers are pure: the same entities always produce the
//! same bytes, in authored order. All text and attribute values are
//! HTML-escaped. Unresolved references are left out of annotations; the
//! validator has already reported them.

use serde::Serialize;

use hautu_shared::{Hotspot, IntroContent, MusclesDocument, SourcesDocument, Stage, Tool};

use crate::loader::{ContentIndex, ContentSet};

/// Everything a slot renderer may read.
pub struct RenderContext<'a> {
    pub content: &'a ContentSet,
    pub index: &'a ContentIndex<'a>,
    /// Relative filename of the diagram image.
    pub diagram_image: &'a str,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        content: &'a ContentSet,
        index: &'a ContentIndex<'a>,
        diagram_image: &'a str,
    ) -> Self {
        Self {
            content,
            index,
            diagram_image,
        }
    }
}

// ---------------------------------------------------------------------------
// Intro
// ---------------------------------------------------------------------------

/// The introduction section: title, hook, paragraphs, blocks, video, attribution.
pub fn render_intro(intro: &IntroContent) -> String {
    let mut html = String::from(
        "<section id=\"introduction\" class=\"section section-intro\">\n<div class=\"container\">\n",
    );

    if let Some(title) = &intro.title {
        html.push_str(&format!("<h1>{}</h1>\n", escape(title)));
    }
    if let Some(subtitle) = &intro.subtitle {
        html.push_str(&format!("<p class=\"subtitle\">{}</p>\n", escape(subtitle)));
    }
    html.push_str(&format!("<p class=\"hook\">{}</p>\n", escape(&intro.hook)));

    for paragraph in &intro.paragraphs {
        html.push_str(&format!("<p>{}</p>\n", escape(paragraph)));
    }
    for section in &intro.sections {
        html.push_str(&format!(
            "<div class=\"intro-block\">\n<h3>{}</h3>\n<p>{}</p>\n</div>\n",
            escape(&section.heading),
            escape(&section.content)
        ));
    }
    if let Some(video) = &intro.video {
        html.push_str(&video_embed(video));
    }

    html.push_str("<div class=\"attribution\">\n");
    for line in intro.attribution.lines() {
        html.push_str(&format!("<p>{}</p>\n", escape(line)));
    }
    html.push_str("</div>\n</div>\n</section>\n");
    html
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Ordered stage blocks carrying hotspot coordinates and reflection questions.
pub fn render_stages(stages: &[Stage], index: &ContentIndex<'_>) -> String {
    let mut html = String::from(
        "<section id=\"stages\" class=\"section section-stages\">\n<div class=\"container\">\n<h2>Stages</h2>\n<ol class=\"stages-list\">\n",
    );

    for (i, stage) in stages.iter().enumerate() {
        let Hotspot {
            x_percent,
            y_percent,
            width_percent,
            height_percent,
        } = stage.hotspot;

        html.push_str(&format!(
            "<li id=\"stage-{id}\" class=\"stage-entry\" data-position=\"{position}\" \
             data-x=\"{x_percent}\" data-y=\"{y_percent}\" data-width=\"{width_percent}\" data-height=\"{height_percent}\">\n",
            id = escape(&stage.id),
            position = stage_position(stage, i),
        ));

        html.push_str(&format!("<h3>{}", escape(&stage.name)));
        if let Some(english) = &stage.name_english {
            html.push_str(&format!(
                " <span class=\"stage-english\">({})</span>",
                escape(english)
            ));
        }
        html.push_str("</h3>\n");
        html.push_str(&format!(
            "<p class=\"description\">{}</p>\n",
            escape(&stage.description)
        ));
        if let Some(state) = &stage.state {
            html.push_str(&format!("<p class=\"state\">{}</p>\n", escape(state)));
        }

        if !stage.reflection_questions.is_empty() {
            html.push_str("<ul class=\"reflection-questions\">\n");
            for question in &stage.reflection_questions {
                html.push_str(&format!("<li>{}</li>\n", escape(question)));
            }
            html.push_str("</ul>\n");
        }

        let tool_links: Vec<String> = stage
            .tools
            .iter()
            .filter_map(|id| index.tools.get(id.as_str()))
            .map(|tool| tool_link(tool))
            .collect();
        if !tool_links.is_empty() {
            html.push_str(&format!(
                "<div class=\"meta\"><span class=\"meta-label\">Tools:</span> {}</div>\n",
                tool_links.join(" ")
            ));
        }

        html.push_str("</li>\n");
    }

    html.push_str("</ol>\n</div>\n</section>\n");
    html
}

/// Overlay record for one stage, consumed by the diagram script.
#[derive(Debug, Serialize)]
struct StageOverlay<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_english: Option<&'a str>,
    position: u32,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    reflection_questions: &'a [String],
    tools: Vec<ToolRef<'a>>,
    hotspot: Hotspot,
}

#[derive(Debug, Serialize)]
struct ToolRef<'a> {
    id: &'a str,
    name: &'a str,
}

/// JSON array of stage overlays, safe to inline in a `<script>` element.
pub fn render_stage_data(stages: &[Stage], index: &ContentIndex<'_>) -> String {
    let overlays: Vec<StageOverlay<'_>> = stages
        .iter()
        .enumerate()
        .map(|(i, stage)| StageOverlay {
            id: &stage.id,
            name: &stage.name,
            name_english: stage.name_english.as_deref(),
            position: stage_position(stage, i),
            description: &stage.description,
            state: stage.state.as_deref(),
            reflection_questions: &stage.reflection_questions,
            tools: stage
                .tools
                .iter()
                .filter_map(|id| index.tools.get(id.as_str()))
                .map(|tool| ToolRef {
                    id: &tool.id,
                    name: &tool.name,
                })
                .collect(),
            hotspot: stage.hotspot,
        })
        .collect();

    // Non-finite floats serialize as null, so this never errors in practice.
    let json = serde_json::to_string_pretty(&overlays).unwrap_or_else(|_| "[]".to_string());
    json.replace("</", "<\\/")
}

fn stage_position(stage: &Stage, authored_index: usize) -> u32 {
    stage
        .position
        .unwrap_or_else(|| u32::try_from(authored_index + 1).unwrap_or(u32::MAX))
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// Tool cards with stage badges, resolved muscle names and optional video.
pub fn render_tools(tools: &[Tool], index: &ContentIndex<'_>) -> String {
    let mut html = String::from(
        "<section id=\"tools\" class=\"section section-tools\">\n<div class=\"container\">\n<h2>Tools</h2>\n\
         <p class=\"section-intro\">Processes and methods that help navigate each stage. Click a muscle name to see what it means.</p>\n\
         <div class=\"tools-list\">\n",
    );

    for tool in tools {
        html.push_str(&format!(
            "<div id=\"tool-{}\" class=\"tool-entry\">\n<h3>{}</h3>\n<p class=\"description\">{}</p>\n",
            escape(&tool.id),
            escape(&tool.name),
            escape(&tool.description)
        ));

        if let Some(video) = &tool.video {
            html.push_str(&video_embed(video));
        }

        let stage_badges: Vec<String> = tool
            .stages
            .iter()
            .filter_map(|id| index.stages.get(id.as_str()))
            .map(|stage| {
                format!(
                    "<span class=\"badge badge-stage\">{}</span>",
                    escape(&stage.name)
                )
            })
            .collect();
        let muscle_links: Vec<String> = tool
            .muscles
            .iter()
            .filter_map(|id| index.muscles.get(id.as_str()))
            .map(|muscle| {
                format!(
                    "<a href=\"#muscle-{}\" class=\"muscle-link\">{}</a>",
                    escape(&muscle.id),
                    escape(&muscle.name)
                )
            })
            .collect();

        html.push_str(&format!(
            "<div class=\"meta\">\n\
             <div class=\"stages\"><span class=\"meta-label\">Used in:</span> {}</div>\n\
             <div class=\"muscles\"><span class=\"meta-label\">Develops:</span> {}</div>\n\
             </div>\n",
            stage_badges.join(" "),
            muscle_links.join(" ")
        ));

        if let Some(source) = &tool.source {
            html.push_str(&format!(
                "<p class=\"tool-source\">Source: {}</p>\n",
                escape(source)
            ));
        }

        html.push_str("</div>\n");
    }

    html.push_str("</div>\n</div>\n</section>\n");
    html
}

// ---------------------------------------------------------------------------
// Muscles
// ---------------------------------------------------------------------------

/// Dimensions with their muscles, each annotated with resolved tool names.
pub fn render_muscles(doc: &MusclesDocument, index: &ContentIndex<'_>) -> String {
    let mut html = format!(
        "<section id=\"muscles\" class=\"section section-muscles\">\n<div class=\"container\">\n<h2>Muscles</h2>\n\
         <p class=\"section-intro\">{}</p>\n<div class=\"dimensions\">\n",
        escape(&doc.intro)
    );

    for dimension in &doc.dimensions {
        html.push_str(&format!(
            "<div class=\"dimension\" id=\"dimension-{}\">\n<h3>{}",
            escape(&dimension.id),
            escape(&dimension.name)
        ));
        if let Some(english) = &dimension.name_english {
            html.push_str(&format!(
                " <span class=\"dimension-english\">({})</span>",
                escape(english)
            ));
        }
        html.push_str(&format!(
            "</h3>\n<p class=\"dimension-description\">{}</p>\n<div class=\"muscles-list\">\n",
            escape(&dimension.description)
        ));

        for muscle in &dimension.muscles {
            let tool_links = if muscle.tools.is_empty() {
                "<span class=\"no-tools\">No specific tools mapped</span>".to_string()
            } else {
                muscle
                    .tools
                    .iter()
                    .filter_map(|id| index.tools.get(id.as_str()))
                    .map(|tool| tool_link(tool))
                    .collect::<Vec<_>>()
                    .join(" ")
            };

            html.push_str(&format!(
                "<div id=\"muscle-{}\" class=\"muscle-entry\">\n<h4>{}</h4>\n<p class=\"description\">{}</p>\n\
                 <div class=\"meta\"><span class=\"meta-label\">Developed by:</span> {}</div>\n</div>\n",
                escape(&muscle.id),
                escape(&muscle.name),
                escape(&muscle.description),
                tool_links
            ));
        }

        html.push_str("</div>\n</div>\n");
    }

    html.push_str("</div>\n</div>\n</section>\n");
    html
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Categorized source listing.
pub fn render_sources(doc: &SourcesDocument) -> String {
    let mut html = format!(
        "<section id=\"sources\" class=\"section section-sources\">\n<div class=\"container\">\n<h2>Mycorrhizal Network</h2>\n\
         <p class=\"section-intro\">{}</p>\n<div class=\"sources-grid\">\n",
        escape(&doc.intro)
    );

    for category in &doc.categories {
        html.push_str(&format!(
            "<div class=\"source-category\" id=\"sources-{}\">\n<h3>{}</h3>\n<p class=\"category-description\">{}</p>\n<ul>\n",
            escape(&category.id),
            escape(&category.name),
            escape(&category.description)
        ));

        for item in &category.items {
            let name = match &item.link {
                Some(link) => format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
                    escape(link),
                    escape(&item.name)
                ),
                None => escape(&item.name),
            };
            let detail = item
                .detail()
                .map(|d| format!(" \u{2014} {}", escape(d)))
                .unwrap_or_default();
            html.push_str(&format!("<li>{name}{detail}</li>\n"));
        }

        html.push_str("</ul>\n</div>\n");
    }

    html.push_str("</div>\n</div>\n</section>\n");
    html
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tool_link(tool: &Tool) -> String {
    format!(
        "<a href=\"#tool-{}\" class=\"tool-link\">{}</a>",
        escape(&tool.id),
        escape(&tool.name)
    )
}

fn video_embed(url: &str) -> String {
    format!(
        "<div class=\"video-embed\">\n<iframe src=\"{}\" frameborder=\"0\" allowfullscreen></iframe>\n</div>\n",
        escape(url)
    )
}

/// Escape text for HTML element content and double-quoted attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn escape_handles_markup_characters() {
        assert_eq!(
            escape(r#"<b>"Tama" & 'Hine'</b>"#),
            "&lt;b&gt;&quot;Tama&quot; &amp; &#39;Hine&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("Kōrero"), "Kōrero");
    }

    #[test]
    fn intro_keeps_hook_paragraphs_attribution_in_order() {
        let intro = IntroContent {
            title: None,
            subtitle: None,
            hook: "HOOK-H".into(),
            paragraphs: vec!["PARA-P1".into(), "PARA-P2".into()],
            sections: vec![],
            video: None,
            attribution: hautu_shared::Attribution::Text("ATTR-A".into()),
        };
        let html = render_intro(&intro);

        let positions: Vec<usize> = ["HOOK-H", "PARA-P1", "PARA-P2", "ATTR-A"]
            .iter()
            .map(|needle| {
                assert_eq!(html.matches(needle).count(), 1, "{needle} once");
                html.find(needle).unwrap()
            })
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!html.contains("video-embed"));
    }

    #[test]
    fn stage_hotspot_numbers_are_unchanged() {
        let content = fixtures::content_set();
        let index = content.index();
        let html = render_stages(content.stages(), &index);

        assert!(html.contains(
            r#"data-x="12" data-y="18" data-width="18" data-height="28""#
        ));
        assert!(html.contains("<li>Where are you in Te Kore?</li>"));
        assert!(html.contains(r#"data-position="2""#));

        let mut fractional = fixtures::stage("s", "S", &[]);
        fractional.hotspot.x_percent = 12.5;
        let html = render_stages(&[fractional], &index);
        assert!(html.contains(r#"data-x="12.5""#));
    }

    #[test]
    fn stage_data_resolves_tools_and_escapes_script_end() {
        let mut content = fixtures::content_set();
        content.stages.as_mut().unwrap()[0].description = "ends </script> here".into();
        content.stages.as_mut().unwrap()[0].tools.push("ghost".into());
        let index = content.index();

        let json = render_stage_data(content.stages(), &index);
        assert!(!json.contains("</script>"));
        assert!(!json.contains("ghost"));

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["tools"][0]["name"], "Hui");
        assert_eq!(parsed[0]["hotspot"]["x_percent"], 12.0);
        assert_eq!(parsed[1]["position"], 2);
    }

    #[test]
    fn tool_without_video_has_no_embed() {
        let content = fixtures::content_set();
        let index = content.index();
        let html = render_tools(content.tools(), &index);
        assert!(!html.contains("video-embed"));
        assert!(!html.contains("<iframe"));
    }

    #[test]
    fn tool_with_video_embeds_url_once() {
        let mut content = fixtures::content_set();
        let url = "https://www.youtube.com/embed/abc123";
        content.tools.as_mut().unwrap()[0].video = Some(url.into());
        let index = content.index();

        let html = render_tools(content.tools(), &index);
        assert_eq!(html.matches(url).count(), 1);
        assert_eq!(html.matches("<iframe").count(), 1);
    }

    #[test]
    fn tool_cards_show_resolved_muscle_names() {
        let mut content = fixtures::content_set();
        content.tools.as_mut().unwrap()[0]
            .muscles
            .push("missing-muscle".into());
        let index = content.index();

        let html = render_tools(content.tools(), &index);
        assert!(html.contains(r##"<a href="#muscle-whakarongo" class="muscle-link">Whakarongo</a>"##));
        assert!(html.contains(r#"<span class="badge badge-stage">Te Pō</span>"#));
        assert!(!html.contains("missing-muscle"));
    }

    #[test]
    fn muscles_show_resolved_tool_names() {
        let content = fixtures::content_set();
        let index = content.index();
        let html = render_muscles(content.muscles.as_ref().unwrap(), &index);

        assert!(html.contains(r##"<a href="#tool-wananga" class="tool-link">Wānanga</a>"##));
        assert!(html.contains("(Thinking)"));

        let lonely = fixtures::muscles_document(vec![fixtures::muscle("lonely", "Lonely", &[])]);
        let html = render_muscles(&lonely, &index);
        assert!(html.contains("No specific tools mapped"));
    }

    #[test]
    fn sources_render_links_and_details() {
        let html = render_sources(&fixtures::sources());
        assert!(html.contains(
            r#"<li><a href="https://example.org/wayfinding" target="_blank" rel="noopener">Wayfinding</a> — A. Navigator</li>"#
        ));
        assert!(html.contains("<li>Local iwi — Kaitiaki</li>"));
    }

    #[test]
    fn rendering_preserves_authored_order() {
        let mut content = fixtures::content_set();
        content.tools.as_mut().unwrap().reverse();
        let index = content.index();

        let html = render_tools(content.tools(), &index);
        let wananga = html.find("tool-wananga").unwrap();
        let hui = html.find("tool-hui").unwrap();
        assert!(wananga < hui);
    }
}

//! Cross-reference validation.
//!
//! Checks every id reference between stages, tools and muscles against the
//! lookup maps, plus the smaller authoring invariants (unique ids, hotspot
//! bounds, URL syntax). All issues are collected; nothing here is fatal
//! unless the caller escalates with [`ValidationReport::into_strict`].

use std::collections::HashSet;

use tracing::{info, instrument, warn};
use url::Url;

use hautu_shared::{EntityKind, HautuError, Result, ValidationWarning};

use crate::loader::{ContentIndex, ContentSet};

/// Every warning found in one validation pass, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Only the dangling-reference warnings.
    pub fn dangling(&self) -> impl Iterator<Item = &ValidationWarning> {
        self.warnings
            .iter()
            .filter(|w| matches!(w, ValidationWarning::DanglingReference { .. }))
    }

    /// Escalate any warning to [`HautuError::Validation`].
    pub fn into_strict(self) -> Result<Self> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(HautuError::Validation {
                warnings: self.warnings,
            })
        }
    }
}

/// Validate the loaded content against its lookup maps.
///
/// A reference to an absent document is not checked: with the tools document
/// missing, `stage.tools` and `muscle.tools` produce no warnings.
#[instrument(skip_all)]
pub fn validate(content: &ContentSet, index: &ContentIndex<'_>) -> ValidationReport {
    let mut warnings = Vec::new();

    check_duplicates(content, &mut warnings);
    check_stages(content, index, &mut warnings);
    check_tools(content, index, &mut warnings);
    check_muscles(content, index, &mut warnings);
    check_sources(content, &mut warnings);

    for warning in &warnings {
        warn!(%warning, "content validation");
    }
    info!(warnings = warnings.len(), "validation complete");

    ValidationReport { warnings }
}

fn check_duplicates(content: &ContentSet, warnings: &mut Vec<ValidationWarning>) {
    let mut push_dupes = |entity: EntityKind, ids: Vec<&str>| {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                warnings.push(ValidationWarning::DuplicateId {
                    entity,
                    id: id.to_string(),
                });
            }
        }
    };

    push_dupes(
        EntityKind::Stage,
        content.stages().iter().map(|s| s.id.as_str()).collect(),
    );
    push_dupes(
        EntityKind::Tool,
        content.tools().iter().map(|t| t.id.as_str()).collect(),
    );
    push_dupes(
        EntityKind::Muscle,
        content.muscles().iter().map(|m| m.id.as_str()).collect(),
    );
    if let Some(sources) = &content.sources {
        push_dupes(
            EntityKind::SourceCategory,
            sources.categories.iter().map(|c| c.id.as_str()).collect(),
        );
    }
}

fn check_stages(
    content: &ContentSet,
    index: &ContentIndex<'_>,
    warnings: &mut Vec<ValidationWarning>,
) {
    let check_tool_refs = content.tools.is_some();

    for stage in content.stages() {
        if check_tool_refs {
            for tool_id in unique(&stage.tools) {
                if !index.tools.contains_key(tool_id) {
                    warnings.push(dangling(EntityKind::Stage, &stage.id, "tools", tool_id));
                }
            }
        }

        for (coordinate, value) in stage.hotspot.coordinates() {
            if !(0.0..=100.0).contains(&value) {
                warnings.push(ValidationWarning::HotspotOutOfRange {
                    stage_id: stage.id.clone(),
                    coordinate,
                    value,
                });
            }
        }
    }
}

fn check_tools(
    content: &ContentSet,
    index: &ContentIndex<'_>,
    warnings: &mut Vec<ValidationWarning>,
) {
    // Stage references can only be checked when the stages document exists.
    let check_stage_refs = content.stages.is_some();

    for tool in content.tools() {
        if check_stage_refs {
            for stage_id in unique(&tool.stages) {
                if !index.stages.contains_key(stage_id) {
                    warnings.push(dangling(EntityKind::Tool, &tool.id, "stages", stage_id));
                }
            }
        }

        for muscle_id in unique(&tool.muscles) {
            match index.muscles.get(muscle_id) {
                None => warnings.push(dangling(EntityKind::Tool, &tool.id, "muscles", muscle_id)),
                Some(muscle) if !muscle.tools.contains(&tool.id) => {
                    warnings.push(ValidationWarning::OneSidedLink {
                        entity: EntityKind::Tool,
                        entity_id: tool.id.clone(),
                        field: "muscles",
                        target_id: muscle_id.to_string(),
                    });
                }
                Some(_) => {}
            }
        }

        if let Some(video) = &tool.video {
            check_url(EntityKind::Tool, &tool.id, "video", video, warnings);
        }
    }
}

fn check_muscles(
    content: &ContentSet,
    index: &ContentIndex<'_>,
    warnings: &mut Vec<ValidationWarning>,
) {
    if content.tools.is_none() {
        return;
    }

    for muscle in content.muscles() {
        for tool_id in unique(&muscle.tools) {
            match index.tools.get(tool_id) {
                None => warnings.push(dangling(EntityKind::Muscle, &muscle.id, "tools", tool_id)),
                Some(tool) if !tool.muscles.contains(&muscle.id) => {
                    warnings.push(ValidationWarning::OneSidedLink {
                        entity: EntityKind::Muscle,
                        entity_id: muscle.id.clone(),
                        field: "tools",
                        target_id: tool_id.to_string(),
                    });
                }
                Some(_) => {}
            }
        }
    }
}

fn check_sources(content: &ContentSet, warnings: &mut Vec<ValidationWarning>) {
    let Some(sources) = &content.sources else {
        return;
    };
    for category in &sources.categories {
        for link in category.items.iter().filter_map(|item| item.link.as_deref()) {
            check_url(EntityKind::SourceCategory, &category.id, "items.link", link, warnings);
        }
    }
}

fn check_url(
    entity: EntityKind,
    entity_id: &str,
    field: &'static str,
    value: &str,
    warnings: &mut Vec<ValidationWarning>,
) {
    if Url::parse(value).is_err() {
        warnings.push(ValidationWarning::InvalidUrl {
            entity,
            entity_id: entity_id.to_string(),
            field,
            value: value.to_string(),
        });
    }
}

/// Each id once, in first-seen order. A repeated reference is one reference.
fn unique(ids: &[String]) -> impl Iterator<Item = &str> {
    let mut seen = HashSet::new();
    ids.iter().map(String::as_str).filter(move |id| seen.insert(*id))
}

fn dangling(
    entity: EntityKind,
    entity_id: &str,
    field: &'static str,
    missing_id: &str,
) -> ValidationWarning {
    ValidationWarning::DanglingReference {
        entity,
        entity_id: entity_id.to_string(),
        field,
        missing_id: missing_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn check(content: &ContentSet) -> ValidationReport {
        validate(content, &content.index())
    }

    #[test]
    fn consistent_content_is_clean() {
        let report = check(&fixtures::content_set());
        assert!(report.is_clean(), "{:?}", report.warnings);
    }

    #[test]
    fn resolved_tool_muscles_produce_no_dangling_warnings() {
        let mut content = fixtures::content_set();
        // Break only the inverse side: still no dangling reference.
        content.muscles = Some(fixtures::muscles_document(vec![
            fixtures::muscle("whakarongo", "Whakarongo", &[]),
            fixtures::muscle("korero", "Kōrero", &["wananga"]),
        ]));

        let report = check(&content);
        assert_eq!(report.dangling().count(), 0);
        assert_eq!(
            report.warnings,
            vec![ValidationWarning::OneSidedLink {
                entity: EntityKind::Tool,
                entity_id: "hui".into(),
                field: "muscles",
                target_id: "whakarongo".into(),
            }]
        );
    }

    #[test]
    fn one_warning_per_missing_stage_tool() {
        let mut content = fixtures::content_set();
        content.stages = Some(vec![fixtures::stage(
            "te-kore",
            "Te Kore",
            &["hui", "ghost", "phantom"],
        )]);
        content.tools = Some(vec![
            fixtures::tool("hui", "Hui", &["te-kore"], &["whakarongo"]),
            fixtures::tool("wananga", "Wānanga", &[], &["korero"]),
        ]);

        let report = check(&content);
        let found: Vec<_> = report.dangling().cloned().collect();
        assert_eq!(
            found,
            vec![
                dangling(EntityKind::Stage, "te-kore", "tools", "ghost"),
                dangling(EntityKind::Stage, "te-kore", "tools", "phantom"),
            ]
        );
    }

    #[test]
    fn repeated_missing_id_warns_once() {
        let mut content = fixtures::content_set();
        content.stages = Some(vec![fixtures::stage(
            "te-kore",
            "Te Kore",
            &["hui", "ghost", "ghost"],
        )]);
        content.tools = Some(vec![
            fixtures::tool("hui", "Hui", &["te-kore"], &["whakarongo", "gone", "gone"]),
            fixtures::tool("wananga", "Wānanga", &[], &["korero"]),
        ]);

        let report = check(&content);
        let found: Vec<_> = report.dangling().cloned().collect();
        assert_eq!(
            found,
            vec![
                dangling(EntityKind::Stage, "te-kore", "tools", "ghost"),
                dangling(EntityKind::Tool, "hui", "muscles", "gone"),
            ]
        );
    }

    #[test]
    fn absent_tools_document_skips_tool_references() {
        let mut content = fixtures::content_set();
        content.tools = None;

        let report = check(&content);
        assert_eq!(report.dangling().count(), 0, "{:?}", report.warnings);
        assert!(report.is_clean());
    }

    #[test]
    fn reports_all_directions_of_dangling_references() {
        let mut content = fixtures::content_set();
        content.tools = Some(vec![
            fixtures::tool(
                "hui",
                "Hui",
                &["te-kore", "nowhere"],
                &["whakarongo", "missing-muscle"],
            ),
            fixtures::tool("wananga", "Wānanga", &["te-po"], &["korero"]),
        ]);
        content.muscles = Some(fixtures::muscles_document(vec![
            fixtures::muscle("whakarongo", "Whakarongo", &["hui", "missing-tool"]),
            fixtures::muscle("korero", "Kōrero", &["wananga"]),
        ]));

        let report = check(&content);
        let found: Vec<_> = report.dangling().cloned().collect();
        assert_eq!(
            found,
            vec![
                dangling(EntityKind::Tool, "hui", "stages", "nowhere"),
                dangling(EntityKind::Tool, "hui", "muscles", "missing-muscle"),
                dangling(EntityKind::Muscle, "whakarongo", "tools", "missing-tool"),
            ]
        );
    }

    #[test]
    fn references_are_case_sensitive() {
        let mut content = fixtures::content_set();
        content.stages = Some(vec![fixtures::stage("te-kore", "Te Kore", &["Hui"])]);
        content.tools = Some(vec![
            fixtures::tool("hui", "Hui", &[], &["whakarongo"]),
            fixtures::tool("wananga", "Wānanga", &[], &["korero"]),
        ]);

        let report = check(&content);
        assert_eq!(report.dangling().count(), 1);
    }

    #[test]
    fn flags_duplicates_hotspots_and_urls() {
        let mut content = fixtures::content_set();
        let mut bad_stage = fixtures::stage("te-kore", "Te Kore", &["hui"]);
        bad_stage.hotspot.width_percent = 120.0;
        content.stages.as_mut().unwrap().push(bad_stage);
        content.tools.as_mut().unwrap()[1].video = Some("not a url".into());

        let report = check(&content);
        assert!(report.warnings.contains(&ValidationWarning::DuplicateId {
            entity: EntityKind::Stage,
            id: "te-kore".into(),
        }));
        assert!(report.warnings.contains(&ValidationWarning::HotspotOutOfRange {
            stage_id: "te-kore".into(),
            coordinate: "width_percent",
            value: 120.0,
        }));
        assert!(report.warnings.iter().any(|w| matches!(
            w,
            ValidationWarning::InvalidUrl { entity_id, .. } if entity_id == "wananga"
        )));
    }

    #[test]
    fn strict_mode_escalates_with_every_warning() {
        let mut content = fixtures::content_set();
        content.stages = Some(vec![fixtures::stage("te-kore", "Te Kore", &["a", "b"])]);

        let err = check(&content).into_strict().unwrap_err();
        match err {
            HautuError::Validation { warnings } => assert!(warnings.len() >= 2),
            other => panic!("unexpected error: {other}"),
        }

        assert!(check(&fixtures::content_set()).into_strict().is_ok());
    }
}

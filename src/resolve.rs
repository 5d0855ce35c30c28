//! Per-route effective configuration.
//!
//! Content selectors are resolved through four layers, first match wins:
//!
//! | Layer | Source                                                      |
//! |-------|-------------------------------------------------------------|
//! | 1     | Section route entry with selectors (depth-first, in order)  |
//! | 2     | `markdown.route_rules` entry with selectors                 |
//! | 3     | The route's own `content_selectors`                         |
//! | 4     | `markdown.content_selectors`                                |
//!
//! Section membership is an ordered rule list compiled once. It only answers
//! "which declared section claims this path"; the path-depth fallback for
//! unclaimed documents lives in [`tree`](crate::tree).

use crate::config::{
    ATTACHMENTS_SECTION_ID, AttachmentFile, ConfigError, LlmsTxtOptions, OptionalLink,
    PluginConfig, SectionDefinition, walk_sections,
};
use crate::pattern::{PatternError, RouteMatcher};
use crate::types::Route;
use serde::Serialize;

/// Where the effective selectors came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layer", rename_all = "kebab-case")]
pub enum SelectorSource {
    Section { section_id: String },
    RouteRule { route: String },
    Route,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub content_selectors: Vec<String>,
    pub selector_source: SelectorSource,
    /// Declared section claiming the route, if any.
    pub section_id: Option<String>,
}

#[derive(Debug, Clone)]
struct SectionRule {
    section_id: String,
    matcher: RouteMatcher,
    /// Selectors per route entry, aligned with the matcher's patterns.
    selectors: Vec<Option<Vec<String>>>,
}

/// Declared sections flattened into first-match-wins rules.
#[derive(Debug, Clone)]
pub struct SectionRules {
    rules: Vec<SectionRule>,
}

impl SectionRules {
    pub fn new(sections: &[SectionDefinition]) -> Result<Self, PatternError> {
        let rules = walk_sections(sections)
            .into_iter()
            .map(|section| -> Result<SectionRule, PatternError> {
                let patterns: Vec<&str> =
                    section.routes.iter().map(|r| r.route.as_str()).collect();
                Ok(SectionRule {
                    section_id: section.id.clone(),
                    matcher: RouteMatcher::new(&patterns)?,
                    selectors: section
                        .routes
                        .iter()
                        .map(|r| r.content_selectors.clone())
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// First section, depth-first in declaration order, whose globs match.
    pub fn assign(&self, path: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matcher.is_match(path))
            .map(|rule| rule.section_id.as_str())
    }

    /// First matching route entry that declares selectors.
    fn selectors_for(&self, path: &str) -> Option<(&str, &[String])> {
        self.rules.iter().find_map(|rule| {
            rule.matcher
                .matching(path)
                .into_iter()
                .find_map(|i| rule.selectors[i].as_deref())
                .map(|selectors| (rule.section_id.as_str(), selectors))
        })
    }
}

/// Compiled resolver for one configuration.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    sections: SectionRules,
    route_rules: RouteMatcher,
    route_rule_selectors: Vec<Option<Vec<String>>>,
    default_selectors: Vec<String>,
}

impl ConfigResolver {
    pub fn new(config: &PluginConfig) -> Result<Self, ConfigError> {
        let rules = &config.markdown.route_rules;
        let patterns: Vec<&str> = rules.iter().map(|r| r.route.as_str()).collect();
        Ok(Self {
            sections: SectionRules::new(&config.llms_txt.sections)?,
            route_rules: RouteMatcher::new(&patterns)?,
            route_rule_selectors: rules.iter().map(|r| r.content_selectors.clone()).collect(),
            default_selectors: config.markdown.content_selectors.clone(),
        })
    }

    pub fn sections(&self) -> &SectionRules {
        &self.sections
    }

    pub fn effective_config(&self, route: &Route) -> EffectiveConfig {
        let section_id = self.sections.assign(&route.path).map(str::to_string);

        if let Some((id, selectors)) = self.sections.selectors_for(&route.path) {
            return EffectiveConfig {
                content_selectors: selectors.to_vec(),
                selector_source: SelectorSource::Section {
                    section_id: id.to_string(),
                },
                section_id,
            };
        }

        let rule_hit = self
            .route_rules
            .matching(&route.path)
            .into_iter()
            .find_map(|i| {
                self.route_rule_selectors[i]
                    .as_ref()
                    .map(|selectors| (i, selectors))
            });
        if let Some((i, selectors)) = rule_hit {
            return EffectiveConfig {
                content_selectors: selectors.clone(),
                selector_source: SelectorSource::RouteRule {
                    route: self.route_rules.patterns()[i].clone(),
                },
                section_id,
            };
        }

        if let Some(selectors) = &route.content_selectors {
            return EffectiveConfig {
                content_selectors: selectors.clone(),
                selector_source: SelectorSource::Route,
                section_id,
            };
        }

        EffectiveConfig {
            content_selectors: self.default_selectors.clone(),
            selector_source: SelectorSource::Default,
            section_id,
        }
    }
}

/// An attachment tagged with the section that declared it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectedAttachment {
    pub attachment: AttachmentFile,
    pub section_id: String,
}

/// Section attachments depth-first, then global ones under
/// [`ATTACHMENTS_SECTION_ID`].
pub fn collect_attachments(options: &LlmsTxtOptions) -> Vec<CollectedAttachment> {
    let mut collected: Vec<CollectedAttachment> = walk_sections(&options.sections)
        .into_iter()
        .flat_map(|section| {
            section.attachments.iter().map(|attachment| CollectedAttachment {
                attachment: attachment.clone(),
                section_id: section.id.clone(),
            })
        })
        .collect();
    collected.extend(options.attachments.iter().map(|attachment| CollectedAttachment {
        attachment: attachment.clone(),
        section_id: ATTACHMENTS_SECTION_ID.to_string(),
    }));
    collected
}

/// Global optional links, then section links depth-first.
pub fn collect_optional_links(options: &LlmsTxtOptions) -> Vec<&OptionalLink> {
    options
        .optional_links
        .iter()
        .chain(
            walk_sections(&options.sections)
                .into_iter()
                .flat_map(|section| section.optional_links.iter()),
        )
        .collect()
}

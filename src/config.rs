//! Generator configuration.
//!
//! Handles loading, validating and merging `llms-txt.toml`. Stock defaults are
//! serialized to a TOML table, the user file is merged over it key by key, and
//! the result is deserialized and validated. Every group is optional.
//!
//! ## Option groups
//!
//! ```toml
//! on_route_error = "warn"     # ignore | log | warn | throw
//! on_section_error = "warn"
//! log_level = 1               # 0 error .. 3 debug
//!
//! [markdown]                  # which routes get per-page markdown (and llms-full.txt)
//! include_versioned_docs = true
//! exclude_routes = ["/changelog/**"]
//!
//! [llms_txt]                  # which routes are listed in llms.txt
//! enable_llms_full_txt = true
//! auto_section_depth = 2
//!
//! [[llms_txt.sections]]
//! id = "api"
//! name = "API Reference"
//! routes = [{ route = "/api/**" }]
//!
//! [ui]
//! copy_page_content = true
//! ```
//!
//! ## Purposes
//!
//! The same include/exclude flags exist in `[markdown]` and `[llms_txt]` with
//! different defaults. [`PluginConfig::include_filter`] builds the filter for
//! one purpose, and [`IncludeFilterConfig::union`] combines them into the
//! processing set: a route is processed if either purpose wants it.
//!
//! Unknown keys are rejected to catch typos early.

use crate::pattern::{PatternError, validate_patterns};
use crate::report::ReportingSeverity;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the configuration file looked up in the site directory.
pub const CONFIG_FILENAME: &str = "llms-txt.toml";

/// Routes excluded from every purpose.
pub const DEFAULT_EXCLUDE_ROUTES: &[&str] = &["/search", "/404.html"];

/// CSS selectors tried in order to find a page's main content.
pub const DEFAULT_CONTENT_SELECTORS: &[&str] = &[
    ".theme-doc-markdown",
    "main .container .col",
    "main .theme-doc-wrapper",
    "article",
    "main .container",
    "main",
];

/// Section id given to globally declared attachments.
pub const ATTACHMENTS_SECTION_ID: &str = "attachments";

pub const DEFAULT_COPY_BUTTON_LABEL: &str = "Copy Page";
pub const DEFAULT_AI_PROMPT: &str = "Analyze this documentation:";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("{0}")]
    Pattern(#[from] PatternError),
    #[error("Duplicate section id \"{0}\"")]
    DuplicateSectionId(String),
    #[error("Invalid section id \"{0}\": only lowercase letters, digits and dashes are allowed")]
    InvalidSectionId(String),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full configuration loaded from `llms-txt.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginConfig {
    /// Severity for per-route problems (missing attachment, missing body).
    pub on_route_error: ReportingSeverity,
    /// Severity for sections that end up with no documents.
    pub on_section_error: ReportingSeverity,
    /// Default log verbosity: 0 error, 1 warn, 2 info, 3 debug.
    pub log_level: u8,
    pub markdown: MarkdownOptions,
    pub llms_txt: LlmsTxtOptions,
    pub ui: UiOptions,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            on_route_error: ReportingSeverity::Warn,
            on_section_error: ReportingSeverity::Warn,
            log_level: 1,
            markdown: MarkdownOptions::default(),
            llms_txt: LlmsTxtOptions::default(),
            ui: UiOptions::default(),
        }
    }
}

/// Per-page markdown generation, which also drives `llms-full.txt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownOptions {
    /// Link to the generated `.md` files instead of the HTML routes.
    pub enable_files: bool,
    /// Emit site-relative links instead of absolute URLs.
    pub relative_paths: bool,
    pub include_docs: bool,
    pub include_versioned_docs: bool,
    pub include_blog: bool,
    pub include_pages: bool,
    pub include_generated_index: bool,
    pub exclude_routes: Vec<String>,
    /// Fallback content selectors when nothing more specific applies.
    pub content_selectors: Vec<String>,
    pub route_rules: Vec<RouteRule>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            enable_files: true,
            relative_paths: true,
            include_docs: true,
            include_versioned_docs: true,
            include_blog: false,
            include_pages: false,
            include_generated_index: true,
            exclude_routes: Vec::new(),
            content_selectors: DEFAULT_CONTENT_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            route_rules: Vec::new(),
        }
    }
}

/// The `llms.txt` index itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmsTxtOptions {
    pub enable_llms_full_txt: bool,
    pub include_docs: bool,
    pub include_versioned_docs: bool,
    pub include_blog: bool,
    pub include_pages: bool,
    pub include_generated_index: bool,
    pub exclude_routes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_description: Option<String>,
    /// Append `: description` to links and show section blockquotes.
    pub enable_descriptions: bool,
    /// How many path segments become automatic sections (1-6).
    pub auto_section_depth: u8,
    /// Position of automatic top-level sections among declared ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_section_position: Option<f64>,
    pub sections: Vec<SectionDefinition>,
    pub optional_links: Vec<OptionalLink>,
    pub attachments: Vec<AttachmentFile>,
}

impl Default for LlmsTxtOptions {
    fn default() -> Self {
        Self {
            enable_llms_full_txt: false,
            include_docs: true,
            include_versioned_docs: false,
            include_blog: false,
            include_pages: false,
            include_generated_index: true,
            exclude_routes: Vec::new(),
            site_title: None,
            site_description: None,
            enable_descriptions: true,
            auto_section_depth: 1,
            auto_section_position: None,
            sections: Vec::new(),
            optional_links: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

/// A user-declared section. Sections nest through `subsections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionDefinition {
    /// Unique across the whole section forest, kebab-case.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sort key among siblings. Unpositioned sections sort last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<SectionRoute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsections: Vec<SectionDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional_links: Vec<OptionalLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionRoute {
    /// Route glob claiming documents for the section.
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_selectors: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteRule {
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_selectors: Option<Vec<String>>,
}

/// A local file published alongside the generated documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentFile {
    /// Path relative to the site directory.
    pub source: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub include_in_full_txt: bool,
    /// Output base name. Defaults to the source file stem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// An external link listed under `## Optional`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionalLink {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// UI options
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiOptions {
    pub copy_page_content: CopyPageContent,
}

/// `copy_page_content = true` or a table of options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CopyPageContent {
    Enabled(bool),
    Options(CopyPageContentOptions),
}

impl Default for CopyPageContent {
    fn default() -> Self {
        CopyPageContent::Enabled(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopyPageContentOptions {
    pub button_label: String,
    pub display: CopyDisplayOptions,
    pub content_strategy: ContentStrategy,
    pub actions: CopyActions,
}

impl Default for CopyPageContentOptions {
    fn default() -> Self {
        Self {
            button_label: DEFAULT_COPY_BUTTON_LABEL.to_string(),
            display: CopyDisplayOptions::default(),
            content_strategy: ContentStrategy::default(),
            actions: CopyActions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopyDisplayOptions {
    /// Show the button on docs pages.
    pub docs: bool,
    pub exclude_routes: Vec<String>,
}

impl Default for CopyDisplayOptions {
    fn default() -> Self {
        Self {
            docs: true,
            exclude_routes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentStrategy {
    #[default]
    PreferMarkdown,
    HtmlOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopyActions {
    pub view_markdown: bool,
    pub ai: AiActions,
}

impl Default for CopyActions {
    fn default() -> Self {
        Self {
            view_markdown: true,
            ai: AiActions::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AiActions {
    pub chat_gpt: AiAction,
    pub claude: AiAction,
}

/// `true`/`false`, or a table with a custom prompt (which implies enabled).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AiAction {
    Enabled(bool),
    Prompt { prompt: String },
}

impl Default for AiAction {
    fn default() -> Self {
        AiAction::Enabled(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AiTarget {
    pub enabled: bool,
    pub prompt: String,
}

impl From<&AiAction> for AiTarget {
    fn from(action: &AiAction) -> Self {
        match action {
            AiAction::Enabled(enabled) => AiTarget {
                enabled: *enabled,
                prompt: DEFAULT_AI_PROMPT.to_string(),
            },
            AiAction::Prompt { prompt } => AiTarget {
                enabled: true,
                prompt: prompt.clone(),
            },
        }
    }
}

/// Copy-button options with every default filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCopyPageContent {
    pub enabled: bool,
    pub button_label: String,
    pub display_docs: bool,
    pub exclude_routes: Vec<String>,
    pub content_strategy: ContentStrategy,
    pub view_markdown: bool,
    pub chat_gpt: AiTarget,
    pub claude: AiTarget,
}

impl UiOptions {
    pub fn resolved_copy_page_content(&self) -> ResolvedCopyPageContent {
        let (enabled, options) = match &self.copy_page_content {
            CopyPageContent::Enabled(enabled) => (*enabled, CopyPageContentOptions::default()),
            CopyPageContent::Options(options) => (true, options.clone()),
        };
        ResolvedCopyPageContent {
            enabled,
            button_label: options.button_label,
            display_docs: options.display.docs,
            exclude_routes: options.display.exclude_routes,
            content_strategy: options.content_strategy,
            view_markdown: options.actions.view_markdown,
            chat_gpt: AiTarget::from(&options.actions.ai.chat_gpt),
            claude: AiTarget::from(&options.actions.ai.claude),
        }
    }
}

// =============================================================================
// Include filters
// =============================================================================

/// Which routes a purpose wants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeFilterConfig {
    pub include_docs: bool,
    pub include_versioned_docs: bool,
    pub include_blog: bool,
    pub include_pages: bool,
    pub include_generated_index: bool,
    /// Built-in excludes first, then the purpose's own.
    pub exclude_routes: Vec<String>,
}

impl IncludeFilterConfig {
    fn with_defaults(flags: [bool; 5], user_excludes: &[String]) -> Self {
        let [docs, versioned, blog, pages, generated] = flags;
        let mut exclude_routes: Vec<String> =
            DEFAULT_EXCLUDE_ROUTES.iter().map(|s| s.to_string()).collect();
        exclude_routes.extend(user_excludes.iter().cloned());
        Self {
            include_docs: docs,
            include_versioned_docs: versioned,
            include_blog: blog,
            include_pages: pages,
            include_generated_index: generated,
            exclude_routes,
        }
    }

    /// OR every flag and concatenate the exclude lists, dropping repeats.
    pub fn union(&self, other: &Self) -> Self {
        let mut exclude_routes = self.exclude_routes.clone();
        for pattern in &other.exclude_routes {
            if !exclude_routes.contains(pattern) {
                exclude_routes.push(pattern.clone());
            }
        }
        Self {
            include_docs: self.include_docs || other.include_docs,
            include_versioned_docs: self.include_versioned_docs || other.include_versioned_docs,
            include_blog: self.include_blog || other.include_blog,
            include_pages: self.include_pages || other.include_pages,
            include_generated_index: self.include_generated_index
                || other.include_generated_index,
            exclude_routes,
        }
    }
}

/// The two consumers of include/exclude flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Listing in `llms.txt`.
    Index,
    /// Markdown generation and `llms-full.txt`.
    Full,
}

impl PluginConfig {
    pub fn include_filter(&self, purpose: Purpose) -> IncludeFilterConfig {
        match purpose {
            Purpose::Index => {
                let o = &self.llms_txt;
                IncludeFilterConfig::with_defaults(
                    [
                        o.include_docs,
                        o.include_versioned_docs,
                        o.include_blog,
                        o.include_pages,
                        o.include_generated_index,
                    ],
                    &o.exclude_routes,
                )
            }
            Purpose::Full => {
                let o = &self.markdown;
                IncludeFilterConfig::with_defaults(
                    [
                        o.include_docs,
                        o.include_versioned_docs,
                        o.include_blog,
                        o.include_pages,
                        o.include_generated_index,
                    ],
                    &o.exclude_routes,
                )
            }
        }
    }

    /// Everything either purpose wants.
    pub fn processing_filter(&self) -> IncludeFilterConfig {
        self.include_filter(Purpose::Full)
            .union(&self.include_filter(Purpose::Index))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level > 3 {
            return Err(ConfigError::Validation(format!(
                "log_level must be 0-3, got {}",
                self.log_level
            )));
        }
        if !(1..=6).contains(&self.llms_txt.auto_section_depth) {
            return Err(ConfigError::Validation(format!(
                "llms_txt.auto_section_depth must be 1-6, got {}",
                self.llms_txt.auto_section_depth
            )));
        }
        if self.markdown.content_selectors.is_empty() {
            return Err(ConfigError::Validation(
                "markdown.content_selectors must not be empty".into(),
            ));
        }

        validate_patterns(&self.markdown.exclude_routes)?;
        validate_patterns(&self.llms_txt.exclude_routes)?;
        for rule in &self.markdown.route_rules {
            validate_patterns(&[&rule.route])?;
        }
        if let CopyPageContent::Options(options) = &self.ui.copy_page_content {
            validate_patterns(&options.display.exclude_routes)?;
        }

        let mut seen = HashSet::new();
        for section in walk_sections(&self.llms_txt.sections) {
            if !is_valid_section_id(&section.id) {
                return Err(ConfigError::InvalidSectionId(section.id.clone()));
            }
            if !seen.insert(section.id.as_str()) {
                return Err(ConfigError::DuplicateSectionId(section.id.clone()));
            }
            if section.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "section \"{}\" has an empty name",
                    section.id
                )));
            }
            for route in &section.routes {
                validate_patterns(&[&route.route])?;
            }
            for attachment in &section.attachments {
                validate_attachment(attachment)?;
            }
        }
        for attachment in &self.llms_txt.attachments {
            validate_attachment(attachment)?;
        }
        Ok(())
    }
}

fn validate_attachment(attachment: &AttachmentFile) -> Result<(), ConfigError> {
    if attachment.source.trim().is_empty() {
        return Err(ConfigError::Validation(
            "attachment source must not be empty".into(),
        ));
    }
    if attachment.title.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "attachment \"{}\" has an empty title",
            attachment.source
        )));
    }
    if let Some(name) = &attachment.file_name
        && (name.trim().is_empty()
            || name.contains(['/', '\\'])
            || name.contains(".."))
    {
        return Err(ConfigError::Validation(format!(
            "attachment \"{}\" file_name \"{}\" must be a plain file name",
            attachment.source, name
        )));
    }
    Ok(())
}

/// `^[a-z0-9-]+$`
fn is_valid_section_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Every section in the forest, depth-first in declaration order.
pub fn walk_sections(sections: &[SectionDefinition]) -> Vec<&SectionDefinition> {
    let mut out = Vec::new();
    for section in sections {
        out.push(section);
        out.extend(walk_sections(&section.subsections));
    }
    out
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PluginConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, arrays included.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PluginConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PluginConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load a config file, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<PluginConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Parse a config from a TOML string over the stock defaults.
pub fn parse_config(toml_text: &str) -> Result<PluginConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(toml_text)?;
    resolve_config(stock_defaults_value()?, Some(overlay))
}

/// Returns a fully-commented stock `llms-txt.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r###"# llms-index configuration
# ========================
#
# Every key is optional. Values below are the defaults.
# Unknown keys are rejected.

# What to do with per-route problems: a missing attachment source, a page
# without a body in llms-full.txt. One of "ignore", "log", "warn", "throw".
# "throw" fails the run after every issue has been reported.
on_route_error = "warn"

# Same, for sections that receive no documents.
on_section_error = "warn"

# Default log verbosity: 0 = error, 1 = warn, 2 = info, 3 = debug.
# RUST_LOG overrides this.
log_level = 1

# ---------------------------------------------------------------------------
# Markdown generation. These flags decide which routes are processed and
# which appear in llms-full.txt.
# ---------------------------------------------------------------------------
[markdown]
# Link to generated .md files instead of HTML routes.
enable_files = true

# Emit site-relative links. When false, links are absolute using the site URL.
relative_paths = true

include_docs = true
include_versioned_docs = true
include_blog = false
include_pages = false
include_generated_index = true

# Route globs to skip. "/search" and "/404.html" are always skipped.
# `*` matches one path segment, `**` any number of segments.
exclude_routes = []

# CSS selectors tried in order to find the main content of a page.
content_selectors = [
    ".theme-doc-markdown",
    "main .container .col",
    "main .theme-doc-wrapper",
    "article",
    "main .container",
    "main",
]

# Per-route selector overrides. First matching rule wins.
# [[markdown.route_rules]]
# route = "/api/**"
# content_selectors = [".api-content"]

# ---------------------------------------------------------------------------
# The llms.txt index.
# ---------------------------------------------------------------------------
[llms_txt]
# Also write llms-full.txt with every processed page inlined.
enable_llms_full_txt = false

include_docs = true
include_versioned_docs = false
include_blog = false
include_pages = false
include_generated_index = true
exclude_routes = []

# Document title and blockquote. Default to the site title and the root
# page's description.
# site_title = "My Docs"
# site_description = "Everything about My Project."

# Append ": description" to links and show section descriptions.
enable_descriptions = true

# Path segments used to group undeclared pages into sections (1-6).
auto_section_depth = 1

# Sort key for automatic top-level sections among declared ones.
# Unset puts them after every declared section.
# auto_section_position = 50

# Declared sections. Ids must be unique kebab-case. The first section whose
# route glob matches claims the page.
# [[llms_txt.sections]]
# id = "api"
# name = "API Reference"
# description = "Endpoints and payloads"
# position = 1
# routes = [{ route = "/api/**" }]
#
# [[llms_txt.sections.subsections]]
# id = "api-v2"
# name = "Version 2"
# routes = [{ route = "/api/v2/**", content_selectors = [".api-v2"] }]

# Local files published next to llms.txt and listed in the index.
# [[llms_txt.attachments]]
# source = "specs/openapi.yaml"
# title = "OpenAPI Spec"
# include_in_full_txt = true

# Extra links listed under "## Optional".
# [[llms_txt.optional_links]]
# title = "Status page"
# url = "https://status.example.com"

# ---------------------------------------------------------------------------
# Copy-page button data.
# ---------------------------------------------------------------------------
[ui]
# true, false, or a table:
# [ui.copy_page_content]
# button_label = "Copy Page"
# content_strategy = "prefer-markdown"   # or "html-only"
# display = { docs = true, exclude_routes = ["/changelog/**"] }
# actions = { view_markdown = true, ai = { chat_gpt = true, claude = { prompt = "Explain:" } } }
copy_page_content = false
"###
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // =========================================================================
    // Defaults
    // =========================================================================

    #[test]
    fn default_purposes_differ_on_versioned_docs() {
        let config = PluginConfig::default();
        assert!(config.markdown.include_versioned_docs);
        assert!(!config.llms_txt.include_versioned_docs);
    }

    #[test]
    fn default_filters_prepend_builtin_excludes() {
        let config = PluginConfig::default();
        let index = config.include_filter(Purpose::Index);
        assert_eq!(index.exclude_routes, vec!["/search", "/404.html"]);
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config = parse_config(stock_config_toml()).unwrap();
        assert_eq!(config, PluginConfig::default());
    }

    #[test]
    fn default_copy_page_content_is_disabled() {
        let resolved = PluginConfig::default().ui.resolved_copy_page_content();
        assert!(!resolved.enabled);
        assert_eq!(resolved.button_label, "Copy Page");
    }

    // =========================================================================
    // Union reducer
    // =========================================================================

    #[test]
    fn union_ors_flags() {
        let config = parse_config(
            r#"
[markdown]
include_blog = true
[llms_txt]
include_pages = true
include_versioned_docs = false
"#,
        )
        .unwrap();
        let union = config.processing_filter();
        assert!(union.include_blog);
        assert!(union.include_pages);
        assert!(union.include_versioned_docs);
    }

    #[test]
    fn union_concatenates_excludes_without_repeats() {
        let config = parse_config(
            r#"
[markdown]
exclude_routes = ["/a/**"]
[llms_txt]
exclude_routes = ["/b/*", "/a/**"]
"#,
        )
        .unwrap();
        let union = config.processing_filter();
        assert_eq!(
            union.exclude_routes,
            vec!["/search", "/404.html", "/a/**", "/b/*"]
        );
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn parse_nested_sections() {
        let config = parse_config(
            r#"
[[llms_txt.sections]]
id = "api"
name = "API"
position = 1
routes = [{ route = "/api/**" }]

[[llms_txt.sections.subsections]]
id = "api-v2"
name = "V2"
routes = [{ route = "/api/v2/**", content_selectors = [".v2"] }]
"#,
        )
        .unwrap();
        let sections = &config.llms_txt.sections;
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].position, Some(1.0));
        assert_eq!(sections[0].subsections[0].id, "api-v2");
        assert_eq!(
            sections[0].subsections[0].routes[0].content_selectors,
            Some(vec![".v2".to_string()])
        );
    }

    #[test]
    fn attachment_defaults_to_full_txt() {
        let config = parse_config(
            r#"
[[llms_txt.attachments]]
source = "specs/api.yaml"
title = "API Spec"
"#,
        )
        .unwrap();
        assert!(config.llms_txt.attachments[0].include_in_full_txt);
    }

    #[test]
    fn copy_page_content_accepts_bool() {
        let config = parse_config("[ui]\ncopy_page_content = true\n").unwrap();
        let resolved = config.ui.resolved_copy_page_content();
        assert!(resolved.enabled);
        assert!(resolved.chat_gpt.enabled);
        assert_eq!(resolved.claude.prompt, DEFAULT_AI_PROMPT);
    }

    #[test]
    fn copy_page_content_accepts_table() {
        let config = parse_config(
            r#"
[ui.copy_page_content]
button_label = "Copy"
content_strategy = "html-only"
display = { exclude_routes = ["/blog/**"] }
actions = { ai = { chat_gpt = false, claude = { prompt = "Explain:" } } }
"#,
        )
        .unwrap();
        let resolved = config.ui.resolved_copy_page_content();
        assert!(resolved.enabled);
        assert_eq!(resolved.button_label, "Copy");
        assert_eq!(resolved.content_strategy, ContentStrategy::HtmlOnly);
        assert!(resolved.display_docs);
        assert_eq!(resolved.exclude_routes, vec!["/blog/**"]);
        assert!(resolved.view_markdown);
        assert!(!resolved.chat_gpt.enabled);
        assert_eq!(
            resolved.claude,
            AiTarget {
                enabled: true,
                prompt: "Explain:".into()
            }
        );
    }

    #[test]
    fn unknown_key_rejected() {
        let result = parse_config("[llms_txt]\nenable_full = true\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_section_key_rejected() {
        let result = parse_config(
            r#"
[[llms_txt.sections]]
id = "api"
name = "API"
glob = "/api/**"
"#,
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn invalid_severity_rejected() {
        assert!(parse_config("on_route_error = \"explode\"\n").is_err());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn duplicate_section_id_across_levels_is_fatal() {
        let result = parse_config(
            r#"
[[llms_txt.sections]]
id = "guides"
name = "Guides"

[[llms_txt.sections.subsections]]
id = "api"
name = "Nested API"

[[llms_txt.sections]]
id = "api"
name = "API"
"#,
        );
        assert!(matches!(result, Err(ConfigError::DuplicateSectionId(id)) if id == "api"));
    }

    #[test]
    fn section_id_must_be_kebab_case() {
        for bad in ["API", "my_section", "has space", ""] {
            let result = parse_config(&format!(
                "[[llms_txt.sections]]\nid = \"{bad}\"\nname = \"X\"\n"
            ));
            assert!(
                matches!(result, Err(ConfigError::InvalidSectionId(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(parse_config("[[llms_txt.sections]]\nid = \"v2-api\"\nname = \"X\"\n").is_ok());
    }

    #[test]
    fn auto_section_depth_bounds() {
        assert!(parse_config("[llms_txt]\nauto_section_depth = 6\n").is_ok());
        assert!(matches!(
            parse_config("[llms_txt]\nauto_section_depth = 0\n"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            parse_config("[llms_txt]\nauto_section_depth = 7\n"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn log_level_bounds() {
        assert!(parse_config("log_level = 3\n").is_ok());
        assert!(matches!(
            parse_config("log_level = 4\n"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn empty_content_selectors_rejected() {
        assert!(matches!(
            parse_config("[markdown]\ncontent_selectors = []\n"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn malformed_glob_rejected() {
        let result = parse_config("[llms_txt]\nexclude_routes = [\"/docs/[\"]\n");
        assert!(matches!(result, Err(ConfigError::Pattern(_))));

        let result = parse_config(
            "[[llms_txt.sections]]\nid = \"a\"\nname = \"A\"\nroutes = [{ route = \"/a/{\" }]\n",
        );
        assert!(matches!(result, Err(ConfigError::Pattern(_))));
    }

    #[test]
    fn attachment_needs_source_and_title() {
        let result = parse_config(
            "[[llms_txt.attachments]]\nsource = \"\"\ntitle = \"Spec\"\n",
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));

        let result = parse_config(
            r#"
[[llms_txt.sections]]
id = "api"
name = "API"
attachments = [{ source = "api.yaml", title = " " }]
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn attachment_file_name_stays_in_output_dir() {
        for name in ["../escape", "nested/name", "back\\\\slash", ".."] {
            let result = parse_config(&format!(
                "[[llms_txt.attachments]]\nsource = \"a.md\"\ntitle = \"A\"\nfile_name = \"{name}\"\n"
            ));
            assert!(
                matches!(result, Err(ConfigError::Validation(_))),
                "{name} should be rejected"
            );
        }
        let ok = parse_config(
            "[[llms_txt.attachments]]\nsource = \"a.md\"\ntitle = \"A\"\nfile_name = \"public-api\"\n",
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn walk_sections_is_depth_first() {
        let config = parse_config(
            r#"
[[llms_txt.sections]]
id = "a"
name = "A"
[[llms_txt.sections.subsections]]
id = "a-1"
name = "A1"
[[llms_txt.sections]]
id = "b"
name = "B"
"#,
        )
        .unwrap();
        let ids: Vec<&str> = walk_sections(&config.llms_txt.sections)
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "a-1", "b"]);
    }

    // =========================================================================
    // load_config
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, PluginConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
on_section_error = "throw"
[llms_txt]
site_title = "My Docs"
auto_section_depth = 2
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.on_section_error, ReportingSeverity::Throw);
        assert_eq!(config.llms_txt.site_title.as_deref(), Some("My Docs"));
        assert_eq!(config.llms_txt.auto_section_depth, 2);
        // Unspecified values keep their defaults
        assert!(config.llms_txt.enable_descriptions);
        assert!(config.markdown.enable_files);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // merge_toml
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[llms_txt]
include_docs = true
auto_section_depth = 1
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str("[llms_txt]\nauto_section_depth = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        let group = merged.get("llms_txt").unwrap();
        assert_eq!(group.get("auto_section_depth").unwrap().as_integer(), Some(3));
        assert_eq!(group.get("include_docs").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn merge_toml_replaces_arrays() {
        let base: toml::Value = toml::from_str(r#"list = ["a", "b"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"list = ["c"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("list").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn merge_toml_bool_replaces_table() {
        let base: toml::Value = toml::from_str("[ui]\ncopy_page_content = false\n").unwrap();
        let overlay: toml::Value =
            toml::from_str("[ui.copy_page_content]\nbutton_label = \"Copy\"\n").unwrap();
        let merged = merge_toml(base, overlay);
        let config: PluginConfig =
            merge_toml(stock_defaults_value().unwrap(), merged).try_into().unwrap();
        assert!(matches!(
            config.ui.copy_page_content,
            CopyPageContent::Options(_)
        ));
    }
}

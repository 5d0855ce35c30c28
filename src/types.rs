//! Shared types used across all library stages.
//!
//! Route and site types are the JSON contract with the site generator that
//! produces the route catalogue, so they serialize with camelCase keys. The
//! document types are internal but serializable for debugging output.

use serde::{Deserialize, Serialize};

/// Route paths that identify the site's root document.
pub const ROOT_ROUTE_PATHS: [&str; 2] = ["/", "/index"];

/// Content category of a route. Decided once per route by
/// [`classify`](crate::classify::classify).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Docs,
    Blog,
    Pages,
    /// No reliable signal. Treated as `Docs` by every include decision.
    Unknown,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Docs => "docs",
            ContentType::Blog => "blog",
            ContentType::Pages => "pages",
            ContentType::Unknown => "unknown",
        }
    }
}

/// A route as reported by the site generator.
///
/// Only `path` is required. Everything else is best-effort metadata and may
/// be missing or wrong.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Route {
    pub path: String,
    /// Name of the content plugin that produced the route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    /// Name of the rendering component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// `Some(true)` for docs of a non-latest version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_versioned: Option<bool>,
    /// `Some(true)` for auto-generated category index pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_generated_index: Option<bool>,
    /// Route-level content selector override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_selectors: Option<Vec<String>>,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn is_versioned(&self) -> bool {
        self.is_versioned.unwrap_or(false)
    }

    pub fn is_generated_index(&self) -> bool {
        self.is_generated_index.unwrap_or(false)
    }
}

/// A catalogue entry: the route plus what the conversion pipeline produced
/// for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    #[serde(flatten)]
    pub route: Route,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Relative path of the generated markdown file, if one was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_file: Option<String>,
    /// Converted markdown body. Only needed for `llms-full.txt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl RouteEntry {
    pub fn doc_info(&self) -> DocInfo {
        DocInfo {
            route_path: self.route.path.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            markdown_file: self.markdown_file.clone(),
            section_id: None,
        }
    }
}

/// Site metadata used for the document title and absolute links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Origin of the deployed site, e.g. `https://example.com`.
    pub url: String,
    /// Path the site is served under. `/` for the domain root.
    pub base_url: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: None,
            url: String::new(),
            base_url: "/".to_string(),
        }
    }
}

impl SiteInfo {
    /// Origin plus base path, e.g. `https://example.com/docs-site/`.
    ///
    /// Empty when no origin is known.
    pub fn site_url(&self) -> String {
        if self.url.is_empty() {
            return String::new();
        }
        let origin = self.url.trim_end_matches('/');
        let base = self.base_url.trim_matches('/');
        if base.is_empty() {
            origin.to_string()
        } else {
            format!("{origin}/{base}/")
        }
    }
}

/// The catalogue file read by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteManifest {
    pub site: SiteInfo,
    pub routes: Vec<RouteEntry>,
}

/// A document as seen by the tree builder and renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocInfo {
    pub route_path: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_file: Option<String>,
    /// Owning section, known up front only for attachment documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
}

impl DocInfo {
    pub fn new(route_path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            route_path: route_path.into(),
            title: title.into(),
            description: None,
            markdown_file: None,
            section_id: None,
        }
    }

    pub fn is_root(&self) -> bool {
        ROOT_ROUTE_PATHS.contains(&self.route_path.as_str())
    }
}

/// A generated output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    /// File name relative to the output directory.
    pub path: String,
    pub content: String,
    pub byte_length: usize,
}

impl OutputFile {
    pub fn new(path: impl Into<String>, content: String) -> Self {
        Self {
            path: path.into(),
            byte_length: content.len(),
            content,
        }
    }
}

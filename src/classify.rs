//! Route classification and include decisions.
//!
//! Route metadata is best-effort, so classification goes from the most to the
//! least reliable signal and gives up with [`ContentType::Unknown`] rather
//! than guessing from path substrings:
//!
//! 1. The plugin that produced the route.
//! 2. The rendering component.
//! 3. The site root path.
//!
//! [`RouteFilter`] then decides inclusion for one purpose. Checks run in a
//! fixed order and the first failing one is the reported reason.

use crate::config::IncludeFilterConfig;
use crate::pattern::{PatternError, RouteMatcher};
use crate::types::{ContentType, Route};

pub const BLOG_PLUGIN: &str = "docusaurus-plugin-content-blog";
pub const PAGES_PLUGIN: &str = "docusaurus-plugin-content-pages";
pub const DOC_ITEM_COMPONENT: &str = "@theme/DocItem";
pub const BLOG_LIST_COMPONENT: &str = "@theme/BlogListPage";
pub const BLOG_POST_COMPONENT: &str = "@theme/BlogPostPage";

pub fn classify(route: &Route) -> ContentType {
    if let Some(plugin) = route.plugin.as_deref() {
        return match plugin {
            BLOG_PLUGIN => ContentType::Blog,
            PAGES_PLUGIN => ContentType::Pages,
            _ => ContentType::Docs,
        };
    }
    match route.component.as_deref() {
        Some(DOC_ITEM_COMPONENT) => ContentType::Docs,
        Some(BLOG_LIST_COMPONENT | BLOG_POST_COMPONENT) => ContentType::Blog,
        _ if route.path == "/" => ContentType::Pages,
        _ => ContentType::Unknown,
    }
}

/// Outcome of an include check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Included,
    ExcludedByType,
    ExcludedByVersion,
    ExcludedByGeneratedIndex,
    ExcludedByPattern,
}

impl Decision {
    pub fn is_included(self) -> bool {
        self == Decision::Included
    }
}

/// An [`IncludeFilterConfig`] with its exclude patterns compiled.
#[derive(Debug, Clone)]
pub struct RouteFilter {
    config: IncludeFilterConfig,
    excluded: RouteMatcher,
}

impl RouteFilter {
    pub fn new(config: IncludeFilterConfig) -> Result<Self, PatternError> {
        let excluded = RouteMatcher::new(&config.exclude_routes)?;
        Ok(Self { config, excluded })
    }

    pub fn config(&self) -> &IncludeFilterConfig {
        &self.config
    }

    pub fn should_include(&self, route: &Route) -> bool {
        self.decide(
            classify(route),
            route.is_versioned(),
            route.is_generated_index(),
            &route.path,
        )
        .is_included()
    }

    /// Decide from already-classified facts. Shared with the cache filter so
    /// cached snapshots follow exactly the same rules as live routes.
    pub fn decide(
        &self,
        content_type: ContentType,
        is_versioned: bool,
        is_generated_index: bool,
        path: &str,
    ) -> Decision {
        let c = &self.config;
        let type_allowed = match content_type {
            ContentType::Docs | ContentType::Unknown => c.include_docs,
            ContentType::Blog => c.include_blog,
            ContentType::Pages => c.include_pages,
        };
        if !type_allowed {
            return Decision::ExcludedByType;
        }
        if matches!(content_type, ContentType::Docs | ContentType::Unknown)
            && is_versioned
            && !c.include_versioned_docs
        {
            return Decision::ExcludedByVersion;
        }
        if is_generated_index && !c.include_generated_index {
            return Decision::ExcludedByGeneratedIndex;
        }
        if self.excluded.is_excluded(path) {
            return Decision::ExcludedByPattern;
        }
        Decision::Included
    }
}

//! Per-route data for the "Copy Page" button.
//!
//! The button runs in the browser and needs to know, for the page it is on,
//! whether to show itself, whether a markdown twin exists, and which selectors
//! find the main content when it has to fall back to HTML. This module builds
//! that lookup table from the processed route snapshots. The CLI writes it as
//! pretty JSON when the button is enabled.

use crate::cache::CachedRouteInfo;
use crate::config::{DEFAULT_EXCLUDE_ROUTES, ResolvedCopyPageContent};
use crate::pattern::{PatternError, RouteMatcher};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Name of the copy-content data file within the output directory.
pub const COPY_CONTENT_FILENAME: &str = "llms-copy-content.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyContentEntry {
    pub should_display: bool,
    pub has_markdown: bool,
    pub content_selectors: Vec<String>,
}

/// Route path to button data, sorted by path.
///
/// Routes without resolved selectors get `default_selectors`, normally the
/// configured `markdown.content_selectors`.
pub fn build_copy_content_data(
    routes: &[CachedRouteInfo],
    ui: &ResolvedCopyPageContent,
    default_selectors: &[String],
) -> Result<BTreeMap<String, CopyContentEntry>, PatternError> {
    let excludes: Vec<&str> = DEFAULT_EXCLUDE_ROUTES
        .iter()
        .copied()
        .chain(ui.exclude_routes.iter().map(String::as_str))
        .collect();
    let excluded = RouteMatcher::new(&excludes)?;

    let data: BTreeMap<String, CopyContentEntry> = routes
        .iter()
        .map(|route| {
            let entry = CopyContentEntry {
                should_display: !excluded.is_excluded(&route.path),
                has_markdown: route.markdown_file.is_some(),
                content_selectors: route
                    .content_selectors
                    .clone()
                    .unwrap_or_else(|| default_selectors.to_vec()),
            };
            (route.path.clone(), entry)
        })
        .collect();
    debug!("Copy content data contains {} routes", data.len());
    Ok(data)
}

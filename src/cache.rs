//! Cached route snapshots and configuration drift checks.
//!
//! Classifying routes and resolving their selectors is cheap, but converting
//! pages to markdown is not. A build records every route it saw, already
//! classified, in a manifest next to the generated files, together with the
//! paths that build listed in `llms.txt`. Later runs can then answer "would
//! this configuration change the set of indexed routes?" without touching
//! page content.
//!
//! # Design
//!
//! The manifest stores *facts*, not decisions: content type, version and
//! generated-index flags, resolved selectors. Include/exclude flags are
//! applied when reading the cache, so changing them never invalidates it.
//!
//! ## Staleness
//!
//! - **`version`**: bump [`MANIFEST_VERSION`] when the format changes. A
//!   mismatch loads as an empty manifest.
//! - **`fingerprint`**: SHA-256 over the classification inputs of every route
//!   (path, plugin, component, flags, declared selectors). A different
//!   catalogue means a different fingerprint and the manifest must be rebuilt.
//!
//! ## Storage
//!
//! The manifest is a JSON file at `<output_dir>/.llms-txt-cache.json`.

use crate::classify::{Decision, RouteFilter, classify};
use crate::config::{PluginConfig, Purpose};
use crate::pattern::PatternError;
use crate::resolve::{ConfigResolver, SelectorSource};
use crate::types::{ContentType, Route, RouteEntry};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Name of the cache manifest file within the output directory.
pub const MANIFEST_FILENAME: &str = ".llms-txt-cache.json";

/// Version of the cache manifest format.
pub const MANIFEST_VERSION: u32 = 2;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Cache serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Classification facts for one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedRouteInfo {
    pub path: String,
    pub content_type: ContentType,
    pub is_versioned: bool,
    pub is_generated_index: bool,
    /// Only set when something more specific than the default list applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_selectors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_file: Option<String>,
}

impl CachedRouteInfo {
    pub fn from_route(route: &Route, resolver: &ConfigResolver) -> Self {
        let effective = resolver.effective_config(route);
        Self {
            path: route.path.clone(),
            content_type: classify(route),
            is_versioned: route.is_versioned(),
            is_generated_index: route.is_generated_index(),
            content_selectors: match effective.selector_source {
                SelectorSource::Default => None,
                _ => Some(effective.content_selectors),
            },
            markdown_file: None,
        }
    }

    pub fn from_entry(entry: &RouteEntry, resolver: &ConfigResolver) -> Self {
        Self {
            markdown_file: entry.markdown_file.clone(),
            ..Self::from_route(&entry.route, resolver)
        }
    }

    pub fn decide(&self, filter: &RouteFilter) -> Decision {
        filter.decide(
            self.content_type,
            self.is_versioned,
            self.is_generated_index,
            &self.path,
        )
    }
}

/// On-disk record of the last build's route catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub fingerprint: String,
    pub routes: Vec<CachedRouteInfo>,
    /// Route paths the build listed in `llms.txt`, in catalogue order.
    #[serde(default)]
    pub indexed: Vec<String>,
}

impl CacheManifest {
    /// An empty manifest (first build, or unreadable cache).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            fingerprint: String::new(),
            routes: Vec::new(),
            indexed: Vec::new(),
        }
    }

    /// Snapshot every catalogue entry. Nothing is recorded as indexed yet.
    pub fn build(entries: &[RouteEntry], resolver: &ConfigResolver) -> Self {
        let routes: Vec<&Route> = entries.iter().map(|e| &e.route).collect();
        Self {
            version: MANIFEST_VERSION,
            fingerprint: fingerprint_routes(&routes),
            routes: entries
                .iter()
                .map(|entry| CachedRouteInfo::from_entry(entry, resolver))
                .collect(),
            indexed: Vec::new(),
        }
    }

    /// Record the routes `filter` admits as the indexed set.
    pub fn with_indexed(mut self, filter: &RouteFilter) -> Self {
        self.indexed = self
            .routes
            .iter()
            .filter(|route| route.decide(filter).is_included())
            .map(|route| route.path.clone())
            .collect();
        self
    }

    /// Load from the output directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let path = output_dir.join(MANIFEST_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> Result<(), CacheError> {
        let path = output_dir.join(MANIFEST_FILENAME);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// True when the manifest was not built from this catalogue.
    pub fn is_stale_for(&self, routes: &[&Route]) -> bool {
        self.version != MANIFEST_VERSION || self.fingerprint != fingerprint_routes(routes)
    }

    pub fn status_for(&self, routes: &[&Route]) -> CacheStatus {
        if self.is_empty() {
            CacheStatus::Missing
        } else if self.is_stale_for(routes) {
            CacheStatus::Stale
        } else {
            CacheStatus::Current
        }
    }
}

/// How a loaded manifest relates to the current catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// No usable manifest on disk.
    Missing,
    Stale,
    Current,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStatus::Missing => f.write_str("missing"),
            CacheStatus::Stale => f.write_str("stale"),
            CacheStatus::Current => f.write_str("current"),
        }
    }
}

/// SHA-256 over the classification inputs of a route catalogue, as hex.
pub fn fingerprint_routes(routes: &[&Route]) -> String {
    let mut hasher = Sha256::new();
    for route in routes {
        hasher.update(route.path.as_bytes());
        hasher.update(b"\0");
        hasher.update(route.plugin.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"\0");
        hasher.update(route.component.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"\0");
        hasher.update([
            flag_byte(route.is_versioned),
            flag_byte(route.is_generated_index),
        ]);
        if let Some(selectors) = &route.content_selectors {
            for selector in selectors {
                hasher.update(selector.as_bytes());
                hasher.update(b"\x1f");
            }
        }
        hasher.update(b"\x1e");
    }
    format!("{:x}", hasher.finalize())
}

fn flag_byte(flag: Option<bool>) -> u8 {
    match flag {
        None => 0,
        Some(false) => 1,
        Some(true) => 2,
    }
}

/// Why cached routes were dropped by a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub total: usize,
    pub included: usize,
    pub by_type: usize,
    pub by_version: usize,
    pub by_generated_index: usize,
    pub by_pattern: usize,
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} routes kept ({} by type, {} by version, {} generated index, {} by pattern)",
            self.included,
            self.total,
            self.by_type,
            self.by_version,
            self.by_generated_index,
            self.by_pattern
        )
    }
}

/// Apply one filter to cached snapshots, counting exclusions by reason.
pub fn filter_cached_routes(
    routes: &[CachedRouteInfo],
    filter: &RouteFilter,
) -> (Vec<CachedRouteInfo>, FilterStats) {
    let mut stats = FilterStats {
        total: routes.len(),
        ..FilterStats::default()
    };
    let mut kept = Vec::new();
    for route in routes {
        match route.decide(filter) {
            Decision::Included => {
                stats.included += 1;
                kept.push(route.clone());
            }
            Decision::ExcludedByType => stats.by_type += 1,
            Decision::ExcludedByVersion => stats.by_version += 1,
            Decision::ExcludedByGeneratedIndex => stats.by_generated_index += 1,
            Decision::ExcludedByPattern => stats.by_pattern += 1,
        }
    }
    tracing::debug!(%stats, "filtered cached routes");
    (kept, stats)
}

/// Cached routes that belong in `llms.txt`.
pub fn filter_for_indexing(
    routes: &[CachedRouteInfo],
    config: &PluginConfig,
) -> Result<Vec<CachedRouteInfo>, PatternError> {
    let filter = RouteFilter::new(config.include_filter(Purpose::Index))?;
    Ok(filter_cached_routes(routes, &filter).0)
}

/// Cached routes either purpose wants.
pub fn filter_for_processing(
    routes: &[CachedRouteInfo],
    config: &PluginConfig,
) -> Result<Vec<CachedRouteInfo>, PatternError> {
    let filter = RouteFilter::new(config.processing_filter())?;
    Ok(filter_cached_routes(routes, &filter).0)
}

/// Result of comparing a configuration against the cached catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterChange {
    pub would_change: bool,
    pub current_count: usize,
    pub filtered_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_reason: Option<String>,
}

/// Would indexing under `config` list a different set of routes than the
/// build that wrote `manifest`?
pub fn would_filtering_change(
    manifest: &CacheManifest,
    config: &PluginConfig,
) -> Result<FilterChange, PatternError> {
    let filtered = filter_for_indexing(&manifest.routes, config)?;
    let previous: HashSet<&str> = manifest.indexed.iter().map(String::as_str).collect();
    let next: HashSet<&str> = filtered.iter().map(|r| r.path.as_str()).collect();

    let excluded = previous.difference(&next).count();
    let added = next.difference(&previous).count();
    let change_reason = match (excluded, added) {
        (0, 0) => None,
        (n, 0) => Some(format!("Configuration would exclude {n} route(s)")),
        (0, m) => Some(format!("Configuration would include {m} more route(s)")),
        (n, m) => Some(format!(
            "Configuration would exclude {n} route(s) and include {m} more"
        )),
    };
    Ok(FilterChange {
        would_change: change_reason.is_some(),
        current_count: previous.len(),
        filtered_count: next.len(),
        change_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    fn cached(path: &str, content_type: ContentType) -> CachedRouteInfo {
        CachedRouteInfo {
            path: path.into(),
            content_type,
            is_versioned: false,
            is_generated_index: false,
            content_selectors: None,
            markdown_file: None,
        }
    }

    fn sample() -> Vec<CachedRouteInfo> {
        vec![
            cached("/docs/intro", ContentType::Docs),
            CachedRouteInfo {
                is_versioned: true,
                ..cached("/docs/1.0/intro", ContentType::Docs)
            },
            CachedRouteInfo {
                is_generated_index: true,
                ..cached("/docs/category/basics", ContentType::Docs)
            },
            cached("/blog/hello", ContentType::Blog),
            cached("/about", ContentType::Pages),
            cached("/search", ContentType::Unknown),
        ]
    }

    // =========================================================================
    // Manifest persistence
    // =========================================================================

    #[test]
    fn empty_manifest_has_no_routes() {
        let m = CacheManifest::empty();
        assert_eq!(m.version, MANIFEST_VERSION);
        assert!(m.is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let resolver = default_resolver();
        let entries = vec![entry(docs_route("/docs/intro"), "Intro")];
        let m = CacheManifest::build(&entries, &resolver);
        m.save(tmp.path()).unwrap();

        let loaded = CacheManifest::load(tmp.path());
        assert_eq!(loaded, m);
        assert_eq!(loaded.routes[0].content_type, ContentType::Docs);
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(CacheManifest::load(tmp.path()).is_empty());
    }

    #[test]
    fn load_corrupt_json_returns_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MANIFEST_FILENAME), "not json {{{").unwrap();
        assert!(CacheManifest::load(tmp.path()).is_empty());
    }

    #[test]
    fn load_wrong_version_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let json = format!(
            r#"{{"version": {}, "fingerprint": "x", "routes": [{{"path": "/a", "contentType": "docs", "isVersioned": false, "isGeneratedIndex": false}}]}}"#,
            MANIFEST_VERSION + 99
        );
        fs::write(tmp.path().join(MANIFEST_FILENAME), json).unwrap();
        assert!(CacheManifest::load(tmp.path()).is_empty());
    }

    #[test]
    fn cached_json_uses_camel_case() {
        let json = serde_json::to_string(&cached("/a", ContentType::Blog)).unwrap();
        assert!(json.contains(r#""contentType":"blog""#));
        assert!(json.contains(r#""isGeneratedIndex":false"#));
        assert!(!json.contains("contentSelectors"));
    }

    #[test]
    fn default_selectors_are_not_cached() {
        let resolver = ConfigResolver::new(
            &parse_config(
                r#"
[markdown]
route_rules = [{ route = "/api/**", content_selectors = [".api"] }]
"#,
            )
            .unwrap(),
        )
        .unwrap();
        let plain = CachedRouteInfo::from_route(&docs_route("/docs/a"), &resolver);
        let ruled = CachedRouteInfo::from_route(&docs_route("/api/a"), &resolver);
        assert_eq!(plain.content_selectors, None);
        assert_eq!(ruled.content_selectors, Some(vec![".api".to_string()]));
    }

    // =========================================================================
    // Fingerprint
    // =========================================================================

    #[test]
    fn fingerprint_is_stable() {
        let a = docs_route("/docs/a");
        let b = blog_route("/blog/b");
        assert_eq!(fingerprint_routes(&[&a, &b]), fingerprint_routes(&[&a, &b]));
    }

    #[test]
    fn fingerprint_changes_with_facts() {
        let a = docs_route("/docs/a");
        let versioned = Route {
            is_versioned: Some(true),
            ..a.clone()
        };
        assert_ne!(fingerprint_routes(&[&a]), fingerprint_routes(&[&versioned]));
    }

    #[test]
    fn fingerprint_distinguishes_unset_flag_from_false() {
        let unset = Route::new("/a");
        let explicit = Route {
            is_versioned: Some(false),
            ..Route::new("/a")
        };
        assert_ne!(
            fingerprint_routes(&[&unset]),
            fingerprint_routes(&[&explicit])
        );
    }

    #[test]
    fn stale_when_catalogue_changes() {
        let resolver = default_resolver();
        let entries = vec![entry(docs_route("/docs/a"), "A")];
        let m = CacheManifest::build(&entries, &resolver);
        let same = docs_route("/docs/a");
        let other = docs_route("/docs/b");
        assert!(!m.is_stale_for(&[&same]));
        assert!(m.is_stale_for(&[&other]));
        assert!(CacheManifest::empty().is_stale_for(&[&same]));
    }

    #[test]
    fn status_distinguishes_missing_from_stale() {
        let resolver = default_resolver();
        let m = CacheManifest::build(&[entry(docs_route("/docs/a"), "A")], &resolver);
        let same = docs_route("/docs/a");
        let other = docs_route("/docs/b");
        assert_eq!(m.status_for(&[&same]), CacheStatus::Current);
        assert_eq!(m.status_for(&[&other]), CacheStatus::Stale);
        assert_eq!(
            CacheManifest::empty().status_for(&[&same]),
            CacheStatus::Missing
        );
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    #[test]
    fn index_filter_stats() {
        let filter =
            RouteFilter::new(PluginConfig::default().include_filter(Purpose::Index)).unwrap();
        let (kept, stats) = filter_cached_routes(&sample(), &filter);
        let paths: Vec<&str> = kept.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/docs/intro", "/docs/category/basics"]);
        assert_eq!(
            stats,
            FilterStats {
                total: 6,
                included: 2,
                by_type: 2,
                by_version: 1,
                by_generated_index: 0,
                by_pattern: 1,
            }
        );
    }

    #[test]
    fn processing_includes_versioned_docs() {
        let kept = filter_for_processing(&sample(), &PluginConfig::default()).unwrap();
        assert!(kept.iter().any(|r| r.path == "/docs/1.0/intro"));
        assert!(!kept.iter().any(|r| r.path == "/blog/hello"));
    }

    fn manifest_of(routes: Vec<CachedRouteInfo>, indexed: &[&str]) -> CacheManifest {
        CacheManifest {
            routes,
            indexed: indexed.iter().map(|p| p.to_string()).collect(),
            ..CacheManifest::empty()
        }
    }

    #[test]
    fn would_change_reports_excluded_count() {
        let manifest = manifest_of(
            sample(),
            &["/docs/intro", "/docs/category/basics", "/docs/1.0/intro"],
        );
        let change = would_filtering_change(&manifest, &PluginConfig::default()).unwrap();
        assert_eq!(
            change,
            FilterChange {
                would_change: true,
                current_count: 3,
                filtered_count: 2,
                change_reason: Some("Configuration would exclude 1 route(s)".into()),
            }
        );
    }

    #[test]
    fn would_change_reports_newly_included() {
        let manifest = manifest_of(sample(), &["/docs/intro", "/docs/category/basics"]);
        let config = parse_config("[llms_txt]\ninclude_blog = true\n").unwrap();
        let change = would_filtering_change(&manifest, &config).unwrap();
        assert_eq!(
            change.change_reason.as_deref(),
            Some("Configuration would include 1 more route(s)")
        );
        assert_eq!(change.filtered_count, 3);
    }

    #[test]
    fn same_config_reports_no_change() {
        // Unknown, blog and page routes are cached but were never indexed.
        let config = PluginConfig::default();
        let entries = vec![
            entry(docs_route("/docs/intro"), "Intro"),
            entry(Route::new("/search"), "Search"),
            entry(blog_route("/blog/hello"), "Hello"),
        ];
        let filter = RouteFilter::new(config.include_filter(Purpose::Index)).unwrap();
        let manifest = CacheManifest::build(&entries, &default_resolver()).with_indexed(&filter);
        assert_eq!(manifest.indexed, vec!["/docs/intro".to_string()]);

        let change = would_filtering_change(&manifest, &config).unwrap();
        assert!(!change.would_change);
        assert_eq!(change.current_count, 1);
        assert_eq!(change.filtered_count, 1);
        assert_eq!(change.change_reason, None);
    }
}

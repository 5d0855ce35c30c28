//! Shared test utilities.
//!
//! Route and document builders plus section tree assertions, so unit tests
//! can describe inputs in one line each.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tree = build_document_tree(&[doc("/docs/intro", "Intro")], &[], &rules, &options);
//! assert_tree_shape(&tree, &[("Docs", &[])]);
//! assert_eq!(find_node(&tree, "docs").docs.len(), 1);
//! ```

use crate::classify::BLOG_PLUGIN;
use crate::config::PluginConfig;
use crate::resolve::ConfigResolver;
use crate::tree::TreeNode;
use crate::types::{DocInfo, Route, RouteEntry};

pub const DOCS_PLUGIN: &str = "docusaurus-plugin-content-docs";

// =========================================================================
// Route builders
// =========================================================================

/// A route produced by the docs plugin.
pub fn docs_route(path: &str) -> Route {
    Route {
        plugin: Some(DOCS_PLUGIN.to_string()),
        ..Route::new(path)
    }
}

/// A route produced by the blog plugin.
pub fn blog_route(path: &str) -> Route {
    Route {
        plugin: Some(BLOG_PLUGIN.to_string()),
        ..Route::new(path)
    }
}

/// A docs route declaring its own content selectors.
pub fn route_with_selectors(path: &str, selectors: &[&str]) -> Route {
    Route {
        content_selectors: Some(selectors.iter().map(|s| s.to_string()).collect()),
        ..docs_route(path)
    }
}

/// A catalogue entry with a title and nothing else.
pub fn entry(route: Route, title: &str) -> RouteEntry {
    RouteEntry {
        route,
        title: title.to_string(),
        description: None,
        markdown_file: None,
        content: None,
    }
}

pub fn default_resolver() -> ConfigResolver {
    ConfigResolver::new(&PluginConfig::default()).unwrap()
}

// =========================================================================
// Document builders
// =========================================================================

pub fn doc(path: &str, title: &str) -> DocInfo {
    DocInfo::new(path, title)
}

pub fn doc_with_description(path: &str, title: &str, description: &str) -> DocInfo {
    DocInfo {
        description: Some(description.to_string()),
        ..DocInfo::new(path, title)
    }
}

// =========================================================================
// Tree lookups: panic with the available names on miss
// =========================================================================

/// Find a node by `rel_path`. Panics if not found.
pub fn find_node<'a>(tree: &'a TreeNode, rel_path: &str) -> &'a TreeNode {
    tree.find(rel_path).unwrap_or_else(|| {
        let available = tree.rel_paths();
        panic!("node '{rel_path}' not found. Available: {available:?}")
    })
}

/// Names of a node's direct sub-categories in order.
pub fn child_names(node: &TreeNode) -> Vec<&str> {
    node.sub_categories.iter().map(|c| c.name.as_str()).collect()
}

/// Assert that the top two levels of the tree match an expected shape.
///
/// Each entry is `(name, children)`. Use `&[]` for leaf sections.
///
/// ```rust
/// assert_tree_shape(&tree, &[
///     ("API Reference", &["Version 2"]),
///     ("Guides", &[]),
/// ]);
/// ```
pub fn assert_tree_shape(tree: &TreeNode, expected: &[(&str, &[&str])]) {
    let expected_names: Vec<&str> = expected.iter().map(|(n, _)| *n).collect();
    assert_eq!(
        child_names(tree),
        expected_names,
        "top-level sections mismatch"
    );

    for (node, (name, children)) in tree.sub_categories.iter().zip(expected) {
        assert_eq!(
            child_names(node),
            children.to_vec(),
            "sub-categories of '{name}' mismatch"
        );
    }
}

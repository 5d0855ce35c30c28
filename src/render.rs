//! Markdown rendering of the section tree.
//!
//! ```text
//! ## API Reference                        ← heading, level from depth
//!
//! > Endpoints and payloads                ← section or index doc description
//!
//! - [API](/api.md): Overview              ← index document first
//! - [Users](/api/users.md)                ← then documents
//!
//! ### Version 2                           ← then sub-categories
//! ```
//!
//! A heading is left out when the section's index document has the same
//! title, so a section whose landing page is "API Reference" does not repeat
//! itself.

use crate::naming::same_slug;
use crate::tree::TreeNode;
use crate::types::DocInfo;
use url::Url;

/// Link formatting options shared by the index and the full document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    /// Origin plus base path, e.g. `https://example.com/docs-site/`.
    pub site_url: String,
    pub enable_files: bool,
    pub relative_paths: bool,
    pub enable_descriptions: bool,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            enable_files: true,
            relative_paths: true,
            enable_descriptions: true,
        }
    }
}

/// `min(segments + 1, 6)`: top-level sections are `##`.
pub fn heading_level(rel_path: &str) -> usize {
    let segments = rel_path.split('/').filter(|s| !s.is_empty()).count();
    (segments + 1).min(6)
}

/// Render the whole tree. The root contributes only its loose documents;
/// its index document is the caller's to place.
pub fn render_tree(root: &TreeNode, options: &LinkOptions) -> String {
    let mut out = String::new();
    for doc in &root.docs {
        out.push_str(&format_link(doc, options));
        out.push('\n');
    }
    for child in &root.sub_categories {
        blank_line(&mut out);
        render_node(child, options, &mut out);
    }
    out
}

/// End `out` with exactly one blank line, unless it is empty.
fn blank_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
}

fn render_node(node: &TreeNode, options: &LinkOptions, out: &mut String) {
    let show_heading = node
        .index_doc
        .as_ref()
        .is_none_or(|index| !same_slug(&node.name, &index.title));

    if show_heading {
        out.push_str(&"#".repeat(heading_level(&node.rel_path)));
        out.push(' ');
        out.push_str(&node.name);
        out.push_str("\n\n");

        let description = node
            .description
            .as_deref()
            .or_else(|| node.index_doc.as_ref().and_then(|d| d.description.as_deref()));
        if options.enable_descriptions
            && let Some(description) = description.filter(|d| !d.trim().is_empty())
        {
            out.push_str("> ");
            out.push_str(description.trim());
            out.push_str("\n\n");
        }
    }

    for doc in node.index_doc.iter().chain(&node.docs) {
        out.push_str(&format_link(doc, options));
        out.push('\n');
    }

    for child in &node.sub_categories {
        blank_line(out);
        render_node(child, options, out);
    }
}

/// `- [title](url)` with `: description` when enabled and present.
pub fn format_link(doc: &DocInfo, options: &LinkOptions) -> String {
    let url = format_url(&doc.route_path, doc.markdown_file.as_deref(), options);
    match doc.description.as_deref().map(str::trim) {
        Some(description) if options.enable_descriptions && !description.is_empty() => {
            format!("- [{}]({}): {}", doc.title, url, description)
        }
        _ => format!("- [{}]({})", doc.title, url),
    }
}

/// Link target for a document.
///
/// - With `enable_files`, the markdown file if there is one, else the route
///   with `.md` appended (`/` becomes `/index.md`).
/// - With `relative_paths = false`, the site URL is joined in front without
///   repeating the base path.
/// - With relative paths under a non-root base path, the base path is
///   prefixed when missing.
pub fn format_url(route_path: &str, markdown_file: Option<&str>, options: &LinkOptions) -> String {
    let mut target = with_leading_slash(route_path);
    if options.enable_files {
        target = match markdown_file {
            Some(file) => with_leading_slash(file),
            None => markdown_path(&target),
        };
    }

    if options.site_url.is_empty() {
        return target;
    }

    let base_path = site_base_path(&options.site_url);
    let base_trimmed = base_path.trim_end_matches('/');
    if !options.relative_paths {
        let relative = if has_path_prefix(&target, base_trimmed) {
            target[base_trimmed.len()..].to_string()
        } else {
            target
        };
        return join_url(&options.site_url, &relative);
    }

    if !base_trimmed.is_empty() && !has_path_prefix(&target, base_trimmed) {
        return join_url(base_trimmed, &target);
    }
    target
}

fn with_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// `prefix` is a whole-segment prefix of `path`. Never true for an empty prefix.
fn has_path_prefix(path: &str, prefix: &str) -> bool {
    !prefix.is_empty()
        && path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn markdown_path(route: &str) -> String {
    let trimmed = route.trim_end_matches('/');
    if trimmed.is_empty() {
        "/index.md".to_string()
    } else {
        format!("{trimmed}.md")
    }
}

/// Path part of the site URL (`/docs-site/`), `/` when it has none.
fn site_base_path(site_url: &str) -> String {
    match Url::parse(site_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => site_url.to_string(),
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

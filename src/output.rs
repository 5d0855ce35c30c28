//! CLI output formatting.
//!
//! Output is **information-centric, not file-centric**. Every document is
//! shown by its positional index and title, with its route as secondary
//! context. Sections lead with their name and document count, so the output
//! reads as an outline of the generated `llms.txt`.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! Home → /
//! 001 Getting Started (2 docs)
//!     001 Intro → /docs/intro
//!     002 Install → /docs/install
//!     001 Advanced (1 docs)
//!         001 Tuning → /docs/advanced/tuning
//!
//! Attachments
//! 001 Payment API → /assets/llms-txt/attachments/api.md
//!     Source: specs/api.yaml
//!
//! Issues
//!     section api: section has no documents
//!
//! Generated llms.txt (3 documents, 412 bytes)
//! ```
//!
//! ## Check
//!
//! ```text
//! Cache
//!     Manifest: .llms-txt-cache.json (42 routes)
//!     Status: current
//!
//! Filtering
//!     30 of 42 routes kept (10 by type, 2 by version, 0 generated index, 0 by pattern)
//!     Configuration would exclude 12 route(s)
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::attachments::ProcessedAttachment;
use crate::cache::{
    CacheStatus, CachedRouteInfo, FilterChange, FilterStats, MANIFEST_FILENAME,
};
use crate::generate::GenerateOutput;
use crate::report::Issue;
use crate::tree::TreeNode;
use crate::types::{ContentType, DocInfo};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Section header: positional index + name + document count.
///
/// ```text
/// 001 Getting Started (2 docs)
/// ```
fn section_header(index: usize, name: &str, count: usize) -> String {
    format!("{} {} ({} docs)", format_index(index), name, count)
}

/// `001 Intro → /docs/intro`
fn doc_line(index: usize, doc: &DocInfo) -> String {
    format!("{} {} → {}", format_index(index), doc.title, doc.route_path)
}

// ============================================================================
// Tree outline
// ============================================================================

/// Outline of the section tree. The root index document is shown first as
/// `Home`, the root's loose documents follow at depth 0.
pub fn format_tree(root: &TreeNode) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(index) = &root.index_doc {
        lines.push(format!("Home → {}", index.route_path));
    }
    for (i, doc) in root.docs.iter().enumerate() {
        lines.push(doc_line(i + 1, doc));
    }
    for (i, child) in root.sub_categories.iter().enumerate() {
        format_node(child, i + 1, 0, &mut lines);
    }
    lines
}

fn format_node(node: &TreeNode, position: usize, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!(
        "{}{}",
        indent(depth),
        section_header(position, &node.name, node.doc_count())
    ));
    let child_indent = indent(depth + 1);
    for (i, doc) in node.index_doc.iter().chain(&node.docs).enumerate() {
        lines.push(format!("{child_indent}{}", doc_line(i + 1, doc)));
    }
    for (i, child) in node.sub_categories.iter().enumerate() {
        format_node(child, i + 1, depth + 1, lines);
    }
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_attachments(attachments: &[ProcessedAttachment]) -> Vec<String> {
    let mut lines = Vec::new();
    if attachments.is_empty() {
        return lines;
    }
    lines.push("Attachments".to_string());
    for (i, attachment) in attachments.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            attachment.title,
            attachment.url
        ));
        lines.push(format!("{}Source: {}", indent(1), attachment.source_path));
    }
    lines
}

pub fn format_issues(issues: &[Issue]) -> Vec<String> {
    let mut lines = Vec::new();
    if issues.is_empty() {
        return lines;
    }
    lines.push("Issues".to_string());
    for issue in issues {
        lines.push(format!("{}{issue}", indent(1)));
    }
    lines
}

/// Full report for the `generate` command.
pub fn format_generate_output(
    output: &GenerateOutput,
    attachments: &[ProcessedAttachment],
) -> Vec<String> {
    let Some(llms_txt) = &output.llms_txt else {
        return vec!["Nothing to index, no files generated".to_string()];
    };

    let mut lines = format_tree(&output.tree);
    for block in [format_attachments(attachments), format_issues(&output.issues)] {
        if !block.is_empty() {
            lines.push(String::new());
            lines.extend(block);
        }
    }

    lines.push(String::new());
    let mut summary = format!(
        "Generated {} ({} documents, {} bytes)",
        llms_txt.path, output.indexed_count, llms_txt.byte_length
    );
    if let Some(full) = &output.llms_full_txt {
        summary.push_str(&format!(
            ", {} ({} documents, {} bytes)",
            full.path, output.full_count, full.byte_length
        ));
    }
    lines.push(summary);
    lines
}

pub fn print_generate_output(output: &GenerateOutput, attachments: &[ProcessedAttachment]) {
    for line in format_generate_output(output, attachments) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Report for the `check` command.
pub fn format_check_output(
    status: CacheStatus,
    routes: &[CachedRouteInfo],
    stats: &FilterStats,
    change: Option<&FilterChange>,
) -> Vec<String> {
    let mut lines = vec![
        "Cache".to_string(),
        format!(
            "{}Manifest: {} ({} routes)",
            indent(1),
            MANIFEST_FILENAME,
            routes.len()
        ),
        format!("{}Status: {}", indent(1), status),
    ];
    let types = format_content_types(routes);
    if !types.is_empty() {
        lines.push(format!("{}Types: {}", indent(1), types));
    }
    lines.push(String::new());
    lines.push("Filtering".to_string());
    lines.push(format!("{}{}", indent(1), stats));
    lines.push(match change {
        Some(FilterChange {
            change_reason: Some(reason),
            ..
        }) => format!("{}{}", indent(1), reason),
        Some(_) => format!("{}No change to indexed routes", indent(1)),
        None => format!("{}No previous build to compare against", indent(1)),
    });
    lines
}

/// `"3 docs, 1 blog"`, in content type order, zero counts left out.
fn format_content_types(routes: &[CachedRouteInfo]) -> String {
    [
        ContentType::Docs,
        ContentType::Blog,
        ContentType::Pages,
        ContentType::Unknown,
    ]
    .into_iter()
    .filter_map(|kind| {
        let count = routes.iter().filter(|r| r.content_type == kind).count();
        (count > 0).then(|| format!("{} {}", count, kind.as_str()))
    })
    .collect::<Vec<_>>()
    .join(", ")
}

pub fn print_check_output(
    status: CacheStatus,
    routes: &[CachedRouteInfo],
    stats: &FilterStats,
    change: Option<&FilterChange>,
) {
    for line in format_check_output(status, routes, stats, change) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{IssueKind, ReportingSeverity};
    use crate::test_helpers::*;

    fn node(name: &str, rel_path: &str, docs: Vec<DocInfo>) -> TreeNode {
        TreeNode {
            name: name.into(),
            rel_path: rel_path.into(),
            section_id: None,
            description: None,
            index_doc: None,
            docs,
            sub_categories: Vec::new(),
        }
    }

    fn cached_route(path: &str, content_type: ContentType) -> CachedRouteInfo {
        CachedRouteInfo {
            path: path.into(),
            content_type,
            is_versioned: false,
            is_generated_index: false,
            content_selectors: None,
            markdown_file: None,
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn section_header_shows_count() {
        assert_eq!(section_header(2, "Guides", 5), "002 Guides (5 docs)");
    }

    // =========================================================================
    // Tree outline
    // =========================================================================

    #[test]
    fn tree_outline_nests_sections() {
        let mut docs = node("Docs", "docs", vec![doc("/docs/intro", "Intro")]);
        docs.sub_categories = vec![node(
            "Advanced",
            "docs/advanced",
            vec![doc("/docs/advanced/tuning", "Tuning")],
        )];
        let mut root = node("", "", vec![doc("/loose", "Loose")]);
        root.index_doc = Some(doc("/", "Home"));
        root.sub_categories = vec![docs];

        assert_eq!(
            format_tree(&root),
            vec![
                "Home → /",
                "001 Loose → /loose",
                "001 Docs (2 docs)",
                "    001 Intro → /docs/intro",
                "    001 Advanced (1 docs)",
                "        001 Tuning → /docs/advanced/tuning",
            ]
        );
    }

    #[test]
    fn issues_block() {
        let issues = vec![Issue {
            kind: IssueKind::Section,
            subject: "api".into(),
            message: "section has no documents".into(),
            severity: ReportingSeverity::Warn,
        }];
        assert_eq!(
            format_issues(&issues),
            vec!["Issues", "    section api: section has no documents"]
        );
        assert!(format_issues(&[]).is_empty());
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn check_output_without_change() {
        let routes = vec![
            cached_route("/docs/a", ContentType::Docs),
            cached_route("/docs/b", ContentType::Docs),
            cached_route("/blog/c", ContentType::Blog),
        ];
        let stats = FilterStats {
            total: 3,
            included: 2,
            ..FilterStats::default()
        };
        let change = FilterChange {
            would_change: false,
            current_count: 2,
            filtered_count: 2,
            change_reason: None,
        };
        let lines = format_check_output(CacheStatus::Current, &routes, &stats, Some(&change));
        assert_eq!(lines[1], "    Manifest: .llms-txt-cache.json (3 routes)");
        assert_eq!(lines[2], "    Status: current");
        assert_eq!(lines[3], "    Types: 2 docs, 1 blog");
        assert_eq!(lines.last().unwrap(), "    No change to indexed routes");
    }

    #[test]
    fn check_output_without_previous_build() {
        let lines = format_check_output(
            CacheStatus::Missing,
            &[],
            &FilterStats::default(),
            None,
        );
        assert_eq!(lines[2], "    Status: missing");
        assert_eq!(lines[3], "");
        assert_eq!(
            lines.last().unwrap(),
            "    No previous build to compare against"
        );
    }
}

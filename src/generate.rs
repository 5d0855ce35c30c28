//! Index assembly.
//!
//! Ties the pipeline together for one site build. Takes the route catalogue
//! and processed attachments and produces `llms.txt` and, when enabled,
//! `llms-full.txt`.
//!
//! ## Steps
//!
//! 1. Classify every route once into a [`CachedRouteInfo`] snapshot.
//! 2. Keep the routes either purpose wants (the processing set).
//! 3. Narrow the processing set with the index filter.
//! 4. Fold attachments in as documents.
//! 5. Build the section tree and render it.
//!
//! ## Output Structure
//!
//! ```text
//! # Site Title
//!
//! > Site description
//!
//! - [Home](/index.md): Root document
//!
//! ## Docs                          ← section tree
//!
//! - [Intro](/docs/intro.md)
//!
//! ## Optional                      ← global, then section links
//!
//! - [Status](https://status.example.com)
//! ```
//!
//! `llms-full.txt` shares the header and then inlines every document body in
//! tree order, each under a `---` separator.
//!
//! The two documents are built in parallel. Issues found while building them
//! are reported after both finish, so the order of issues is stable.

use crate::attachments::ProcessedAttachment;
use crate::cache::{CacheManifest, CachedRouteInfo};
use crate::classify::RouteFilter;
use crate::config::{ConfigError, PluginConfig, Purpose, SectionDefinition};
use crate::pattern::PatternError;
use crate::render::{LinkOptions, format_link, format_url, render_tree};
use crate::report::{Issue, IssueSummary, Reporter};
use crate::resolve::{ConfigResolver, collect_optional_links};
use crate::tree::{TreeNode, TreeOptions, build_document_tree};
use crate::types::{DocInfo, OutputFile, RouteEntry, SiteInfo};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

pub const LLMS_TXT_FILENAME: &str = "llms.txt";
pub const LLMS_FULL_TXT_FILENAME: &str = "llms-full.txt";

/// Title used when neither the config, the site nor a root page has one.
pub const DEFAULT_SITE_TITLE: &str = "Documentation";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Pattern(#[from] PatternError),
    #[error("{0}")]
    Reported(#[from] IssueSummary),
}

/// Everything one build needs besides the configuration.
#[derive(Debug, Clone, Copy)]
pub struct GenerateInput<'a> {
    pub site: &'a SiteInfo,
    pub routes: &'a [RouteEntry],
    pub attachments: &'a [ProcessedAttachment],
}

#[derive(Debug)]
pub struct GenerateOutput {
    /// `None` when nothing survived filtering.
    pub llms_txt: Option<OutputFile>,
    pub llms_full_txt: Option<OutputFile>,
    /// The tree rendered into `llms.txt`.
    pub tree: TreeNode,
    /// Snapshot of the whole catalogue and the indexed paths, for the next
    /// run's drift check.
    pub cache: CacheManifest,
    /// Snapshots of the processing set, in catalogue order.
    pub processed_routes: Vec<CachedRouteInfo>,
    /// Documents listed in `llms.txt`, attachments included.
    pub indexed_count: usize,
    /// Documents inlined in `llms-full.txt`.
    pub full_count: usize,
    pub issues: Vec<Issue>,
}

/// Build `llms.txt` (and `llms-full.txt` when enabled) for one site.
///
/// `reporter` may already hold issues from attachment processing; they are
/// returned with the rest. Fails with [`GenerateError::Reported`] if any
/// issue was recorded at `throw` severity.
pub fn generate(
    input: GenerateInput<'_>,
    config: &PluginConfig,
    mut reporter: Reporter,
) -> Result<GenerateOutput, GenerateError> {
    let resolver = ConfigResolver::new(config)?;
    let processing = RouteFilter::new(config.processing_filter())?;
    let indexing = RouteFilter::new(config.include_filter(Purpose::Index))?;

    let cache = CacheManifest::build(input.routes, &resolver).with_indexed(&indexing);

    let mut processed_routes = Vec::new();
    let mut processed_entries = Vec::new();
    let mut indexed_entries = Vec::new();
    for (entry, info) in input.routes.iter().zip(&cache.routes) {
        if !info.decide(&processing).is_included() {
            continue;
        }
        if info.decide(&indexing).is_included() {
            indexed_entries.push(entry);
        }
        processed_entries.push(entry);
        processed_routes.push(info.clone());
    }
    debug!(
        total = input.routes.len(),
        processed = processed_entries.len(),
        indexed = indexed_entries.len(),
        "filtered routes"
    );

    if processed_entries.is_empty() && input.attachments.is_empty() {
        info!("No routes or attachments to index, skipping llms.txt");
        let issues = reporter.finish()?;
        return Ok(GenerateOutput {
            llms_txt: None,
            llms_full_txt: None,
            tree: build_document_tree(&[], &[], resolver.sections(), &TreeOptions::default()),
            cache,
            processed_routes,
            indexed_count: 0,
            full_count: 0,
            issues,
        });
    }

    let llms = &config.llms_txt;
    let sections = &llms.sections;
    let tree_options = TreeOptions::from(llms);
    let links = LinkOptions {
        site_url: input.site.site_url(),
        enable_files: config.markdown.enable_files,
        relative_paths: config.markdown.relative_paths,
        enable_descriptions: llms.enable_descriptions,
    };

    let attachment_docs: Vec<DocInfo> = input
        .attachments
        .iter()
        .map(ProcessedAttachment::doc_info)
        .collect();
    let index_docs: Vec<DocInfo> = indexed_entries
        .iter()
        .map(|entry| entry.doc_info())
        .chain(attachment_docs.iter().cloned())
        .collect();

    let build_index = || {
        let tree = build_document_tree(&index_docs, sections, resolver.sections(), &tree_options);
        let content = render_index(&tree, input.site, config, &links);
        (tree, content)
    };

    let build_full = || {
        if !llms.enable_llms_full_txt {
            return None;
        }
        let mut bodies: HashMap<&str, &str> = HashMap::new();
        let mut full_docs = Vec::new();
        for entry in &processed_entries {
            if let Some(body) = entry.content.as_deref() {
                bodies.insert(entry.route.path.as_str(), body);
            }
            full_docs.push(entry.doc_info());
        }
        for (attachment, doc) in input.attachments.iter().zip(&attachment_docs) {
            if attachment.include_in_full_txt {
                full_docs.push(doc.clone());
            }
        }
        // Attachment paths come from their titles and may collide; the
        // published URL does not.
        let attachment_bodies: HashMap<&str, &str> = input
            .attachments
            .iter()
            .filter(|a| a.include_in_full_txt)
            .map(|a| (a.url.as_str(), a.content.as_str()))
            .collect();

        let tree = build_document_tree(&full_docs, sections, resolver.sections(), &tree_options);
        Some(render_full(&tree, input.site, config, &links, |doc| {
            doc.markdown_file
                .as_deref()
                .and_then(|file| attachment_bodies.get(file).copied())
                .or_else(|| bodies.get(doc.route_path.as_str()).copied())
        }))
    };

    let ((tree, llms_txt), full) = rayon::join(build_index, build_full);

    report_empty_sections(sections, &tree, &mut reporter);

    let indexed_count = tree.doc_count();
    let (llms_full_txt, full_count) = match full {
        Some(full) => {
            for path in &full.missing {
                debug!(route = %path, "no content for llms-full.txt, skipping");
                reporter.route_issue(path.clone(), "no content available for llms-full.txt");
            }
            info!(
                "Generated {LLMS_FULL_TXT_FILENAME} with full content from {} items",
                full.included
            );
            (
                Some(OutputFile::new(LLMS_FULL_TXT_FILENAME, full.content)),
                full.included,
            )
        }
        None => (None, 0),
    };

    info!(
        "Generated {LLMS_TXT_FILENAME} with {} documents and {} attachments",
        indexed_count.saturating_sub(input.attachments.len()),
        input.attachments.len()
    );

    let issues = reporter.finish()?;
    Ok(GenerateOutput {
        llms_txt: Some(OutputFile::new(LLMS_TXT_FILENAME, llms_txt)),
        llms_full_txt,
        tree,
        cache,
        processed_routes,
        indexed_count,
        full_count,
        issues,
    })
}

/// Title and description shared by both documents.
fn header_blocks(
    root_doc: Option<&DocInfo>,
    site: &SiteInfo,
    config: &PluginConfig,
) -> Vec<String> {
    let llms = &config.llms_txt;
    let title = [
        llms.site_title.as_deref(),
        site.title.as_deref(),
        root_doc.map(|d| d.title.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|t| !t.is_empty())
    .unwrap_or(DEFAULT_SITE_TITLE);
    let mut blocks = vec![format!("# {title}")];

    let description = [
        llms.site_description.as_deref(),
        root_doc.and_then(|d| d.description.as_deref()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|d| !d.is_empty());
    if llms.enable_descriptions
        && let Some(description) = description
    {
        blocks.push(format!("> {description}"));
    }
    blocks
}

fn join_blocks(blocks: Vec<String>) -> String {
    let mut out = blocks
        .into_iter()
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    out.push('\n');
    out
}

fn render_index(
    tree: &TreeNode,
    site: &SiteInfo,
    config: &PluginConfig,
    links: &LinkOptions,
) -> String {
    let root_doc = tree.index_doc.as_ref();
    let mut blocks = header_blocks(root_doc, site, config);
    if let Some(doc) = root_doc {
        blocks.push(format_link(doc, links));
    }
    blocks.push(render_tree(tree, links).trim_end().to_string());

    let optional = collect_optional_links(&config.llms_txt);
    if !optional.is_empty() {
        let lines: Vec<String> = optional
            .iter()
            .map(|link| match link.description.as_deref().map(str::trim) {
                Some(d) if links.enable_descriptions && !d.is_empty() => {
                    format!("- [{}]({}): {}", link.title, link.url, d)
                }
                _ => format!("- [{}]({})", link.title, link.url),
            })
            .collect();
        blocks.push(format!("## Optional\n\n{}", lines.join("\n")));
    }
    join_blocks(blocks)
}

struct FullDocument {
    content: String,
    included: usize,
    /// Route paths that had no body.
    missing: Vec<String>,
}

fn render_full<'a>(
    tree: &TreeNode,
    site: &SiteInfo,
    config: &PluginConfig,
    links: &LinkOptions,
    body_for: impl Fn(&DocInfo) -> Option<&'a str>,
) -> FullDocument {
    let mut blocks = header_blocks(tree.index_doc.as_ref(), site, config);
    let mut included = 0;
    let mut missing = Vec::new();
    for doc in tree.walk_docs() {
        let Some(body) = body_for(doc).map(str::trim) else {
            missing.push(doc.route_path.clone());
            continue;
        };
        let source = format_url(&doc.route_path, doc.markdown_file.as_deref(), links);
        blocks.push(format!(
            "---\n\n# {}\n\nSource: {source}\n\n{body}",
            doc.title
        ));
        included += 1;
    }
    FullDocument {
        content: join_blocks(blocks),
        included,
        missing,
    }
}

/// Report declared sections that did not make it into the tree.
fn report_empty_sections(sections: &[SectionDefinition], tree: &TreeNode, reporter: &mut Reporter) {
    for section in sections {
        if tree.find_section(&section.id).is_none() {
            reporter.section_issue(&section.id, "section has no documents");
            continue;
        }
        report_empty_sections(&section.subsections, tree, reporter);
    }
}

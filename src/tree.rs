//! Section tree construction.
//!
//! Merges two hierarchies into one tree:
//!
//! - **Declared sections** from the configuration, nested through
//!   `subsections` and ordered by `position`.
//! - **Automatic sections** inferred from route paths for documents no
//!   declared section claims. `/docs/guides/setup` with a depth of 2 lands in
//!   `Docs` → `Guides`.
//!
//! ## Assignment order
//!
//! 1. An attachment document whose `section_id` names a declared section.
//! 2. The first declared section (depth-first) whose route glob matches.
//! 3. The site root (`/`, `/index`) becomes the root node's index document.
//! 4. Everything else goes to an automatic section chain.
//!
//! A document whose path is a section's own prefix (the `/api` in
//! `routes = [{ route = "/api/**" }]`, or the `/docs/guides` page under an
//! automatic `docs/guides` node) becomes that section's index document
//! instead of a regular entry.
//!
//! ## Ordering
//!
//! Siblings sort by `position`; unpositioned siblings keep their relative
//! order and come after every positioned one. Declared sections come before
//! automatic ones unless `auto_section_position` places the automatic
//! top-level sections somewhere else. Documents keep input order.
//!
//! Nodes that end up with no documents anywhere below them are dropped.

use crate::config::{LlmsTxtOptions, SectionDefinition};
use crate::naming::humanize_segment;
use crate::pattern::is_literal;
use crate::resolve::SectionRules;
use crate::types::DocInfo;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub name: String,
    /// Section ids (declared) or path segments (automatic) joined by `/`.
    /// Empty for the root.
    pub rel_path: String,
    /// Id of the declared section this node renders. `None` for automatic
    /// sections and the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_doc: Option<DocInfo>,
    pub docs: Vec<DocInfo>,
    pub sub_categories: Vec<TreeNode>,
}

impl TreeNode {
    fn new(name: impl Into<String>, rel_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rel_path: rel_path.into(),
            section_id: None,
            description: None,
            index_doc: None,
            docs: Vec::new(),
            sub_categories: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.rel_path.is_empty()
    }

    /// Number of path segments in `rel_path`.
    pub fn depth(&self) -> usize {
        if self.rel_path.is_empty() {
            0
        } else {
            self.rel_path.split('/').count()
        }
    }

    /// Every document in render order: index document, own documents, then
    /// each sub-category in turn.
    pub fn walk_docs(&self) -> Vec<&DocInfo> {
        let mut out = Vec::new();
        self.collect_docs(&mut out);
        out
    }

    fn collect_docs<'a>(&'a self, out: &mut Vec<&'a DocInfo>) {
        out.extend(self.index_doc.iter());
        out.extend(self.docs.iter());
        for child in &self.sub_categories {
            child.collect_docs(out);
        }
    }

    pub fn doc_count(&self) -> usize {
        self.walk_docs().len()
    }

    /// Every node's `rel_path`, depth-first, root included.
    pub fn rel_paths(&self) -> Vec<&str> {
        let mut out = vec![self.rel_path.as_str()];
        for child in &self.sub_categories {
            out.extend(child.rel_paths());
        }
        out
    }

    pub fn find(&self, rel_path: &str) -> Option<&TreeNode> {
        if self.rel_path == rel_path {
            return Some(self);
        }
        self.sub_categories.iter().find_map(|c| c.find(rel_path))
    }

    /// The node of a declared section. Automatic nodes never match, even
    /// when their `rel_path` equals a section id.
    pub fn find_section(&self, section_id: &str) -> Option<&TreeNode> {
        if self.section_id.as_deref() == Some(section_id) {
            return Some(self);
        }
        self.sub_categories
            .iter()
            .find_map(|c| c.find_section(section_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeOptions {
    pub auto_section_depth: usize,
    pub auto_section_position: Option<f64>,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            auto_section_depth: 1,
            auto_section_position: None,
        }
    }
}

impl From<&LlmsTxtOptions> for TreeOptions {
    fn from(options: &LlmsTxtOptions) -> Self {
        Self {
            auto_section_depth: usize::from(options.auto_section_depth.max(1)),
            auto_section_position: options.auto_section_position,
        }
    }
}

/// A node under construction. Children are arena indices.
struct Draft {
    node: TreeNode,
    position: Option<f64>,
    children: Vec<usize>,
    index_paths: Vec<String>,
}

struct Builder {
    arena: Vec<Draft>,
    declared: HashMap<String, usize>,
    automatic: HashMap<String, usize>,
}

const ROOT: usize = 0;

impl Builder {
    fn new() -> Self {
        Self {
            arena: vec![Draft {
                node: TreeNode::new("", ""),
                position: None,
                children: Vec::new(),
                index_paths: Vec::new(),
            }],
            declared: HashMap::new(),
            automatic: HashMap::new(),
        }
    }

    fn push(&mut self, parent: usize, node: TreeNode, position: Option<f64>) -> usize {
        let id = self.arena.len();
        self.arena.push(Draft {
            node,
            position,
            children: Vec::new(),
            index_paths: Vec::new(),
        });
        self.arena[parent].children.push(id);
        id
    }

    fn add_declared(&mut self, parent: usize, parent_path: &str, sections: &[SectionDefinition]) {
        for section in sections {
            let rel_path = if parent_path.is_empty() {
                section.id.clone()
            } else {
                format!("{parent_path}/{}", section.id)
            };
            let mut node = TreeNode::new(&section.name, &rel_path);
            node.section_id = Some(section.id.clone());
            node.description = section.description.clone();
            let id = self.push(parent, node, section.position);
            self.arena[id].index_paths = section_index_paths(section);
            self.declared.insert(section.id.clone(), id);
            self.add_declared(id, &rel_path, &section.subsections);
        }
    }

    /// Create the automatic chain for `segments`, returning the deepest node.
    fn ensure_chain(&mut self, segments: &[&str], options: &TreeOptions) -> usize {
        let mut parent = ROOT;
        for i in 1..=segments.len() {
            let prefix = segments[..i].join("/");
            parent = match self.automatic.get(&prefix) {
                Some(&id) => id,
                None => {
                    let position = if i == 1 {
                        options.auto_section_position
                    } else {
                        None
                    };
                    let node = TreeNode::new(humanize_segment(segments[i - 1]), &prefix);
                    let id = self.push(parent, node, position);
                    self.automatic.insert(prefix, id);
                    id
                }
            };
        }
        parent
    }

    fn place(&mut self, id: usize, doc: &DocInfo, is_index: bool) {
        let node = &mut self.arena[id].node;
        if is_index && node.index_doc.is_none() {
            node.index_doc = Some(doc.clone());
        } else {
            node.docs.push(doc.clone());
        }
    }

    /// Sort, prune and convert the arena into a tree.
    fn finish(&mut self, id: usize) -> Option<(TreeNode, Option<f64>)> {
        let children = std::mem::take(&mut self.arena[id].children);
        let mut finished: Vec<(TreeNode, Option<f64>)> =
            children.into_iter().filter_map(|c| self.finish(c)).collect();
        finished.sort_by(|a, b| compare_positions(a.1, b.1));

        let draft = &mut self.arena[id];
        let mut node = std::mem::replace(&mut draft.node, TreeNode::new("", ""));
        node.sub_categories = finished.into_iter().map(|(n, _)| n).collect();

        let empty =
            node.index_doc.is_none() && node.docs.is_empty() && node.sub_categories.is_empty();
        if empty && id != ROOT {
            None
        } else {
            Some((node, draft.position))
        }
    }
}

/// Positioned first in ascending order; unpositioned after, order kept.
fn compare_positions(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Paths whose document becomes the section's index: the literal prefix of a
/// `<prefix>/**` route, or a route with no glob syntax at all.
fn section_index_paths(section: &SectionDefinition) -> Vec<String> {
    section
        .routes
        .iter()
        .filter_map(|r| match r.route.strip_suffix("/**") {
            Some(prefix) if !prefix.is_empty() && is_literal(prefix) => Some(prefix.to_string()),
            Some(_) => None,
            None if is_literal(&r.route) => Some(r.route.clone()),
            None => None,
        })
        .collect()
}

fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Build the section tree for `docs`.
pub fn build_document_tree(
    docs: &[DocInfo],
    sections: &[SectionDefinition],
    rules: &SectionRules,
    options: &TreeOptions,
) -> TreeNode {
    let mut builder = Builder::new();
    builder.add_declared(ROOT, "", sections);

    let mut unassigned = Vec::new();
    for doc in docs {
        let declared = doc
            .section_id
            .as_deref()
            .filter(|id| builder.declared.contains_key(*id))
            .or_else(|| rules.assign(&doc.route_path))
            .and_then(|id| builder.declared.get(id).copied());
        match declared {
            Some(id) => {
                let is_index = builder.arena[id].index_paths.contains(&doc.route_path);
                builder.place(id, doc, is_index);
            }
            None if doc.is_root() => builder.place(ROOT, doc, true),
            None => unassigned.push(doc),
        }
    }

    // Create every automatic node first so a section page seen before its
    // children still finds its node.
    let depth = options.auto_section_depth.max(1);
    let chains: Vec<Vec<&str>> = unassigned
        .iter()
        .map(|doc| {
            let segments = path_segments(&doc.route_path);
            let len = depth.min(segments.len().saturating_sub(1).max(1));
            segments.into_iter().take(len).collect()
        })
        .collect();
    for chain in &chains {
        if !chain.is_empty() {
            builder.ensure_chain(chain, options);
        }
    }

    for (doc, chain) in unassigned.iter().zip(&chains) {
        let full = path_segments(&doc.route_path).join("/");
        if let Some(&id) = builder.automatic.get(&full) {
            builder.place(id, doc, true);
        } else if chain.is_empty() {
            builder.place(ROOT, doc, false);
        } else {
            let id = builder.ensure_chain(chain, options);
            builder.place(id, doc, false);
        }
    }

    builder
        .finish(ROOT)
        .map(|(node, _)| node)
        .unwrap_or_else(|| TreeNode::new("", ""))
}

//! # llms-index
//!
//! Builds `llms.txt`, a markdown index of a documentation site written for
//! language models, plus an optional `llms-full.txt` that inlines every page.
//! The input is the site's route catalogue: each route with its title,
//! description, the markdown file generated for it and, for the full document,
//! its converted body.
//!
//! # Architecture: Filter, Organize, Render
//!
//! ```text
//! 1. Classify   routes        →  CachedRouteInfo   (content type, flags, selectors)
//! 2. Filter     snapshots     →  processing set    (union of both purposes)
//!                             →  index set         (llms.txt purpose only)
//! 3. Organize   documents     →  TreeNode          (declared + automatic sections)
//! 4. Render     tree          →  llms.txt / llms-full.txt
//! ```
//!
//! Every stage is a pure function of its inputs. Filesystem access is limited
//! to loading the configuration, reading attachments through a
//! [`attachments::SourceReader`], and the cache manifest, so the pipeline can
//! be tested without touching disk.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `llms-txt.toml` loading, stock defaults, merging and validation |
//! | [`pattern`] | Route glob matching with whole-segment `/**` semantics |
//! | [`classify`] | Content type detection and per-purpose include decisions |
//! | [`resolve`] | Section assignment, content selector layers, attachment and link collection |
//! | [`tree`] | Merges declared and automatic sections into one ordered tree |
//! | [`render`] | Markdown rendering of the tree and link URL formatting |
//! | [`generate`] | Assembles `llms.txt` and `llms-full.txt` |
//! | [`attachments`] | Reads attachment sources and picks unique published names |
//! | [`cache`] | Route snapshot manifest, drift checks and cached filtering |
//! | [`copy_content`] | Per-route data for the "Copy Page" button |
//! | [`report`] | Severity-driven collection of non-fatal issues |
//! | [`naming`] | Slugs, humanized segment names, unique file names |
//! | [`types`] | Catalogue and document types shared across stages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Two Purposes, One Pass
//!
//! `[markdown]` and `[llms_txt]` carry the same include flags with different
//! defaults: versioned docs get markdown files but are not listed in the
//! index. Each route is classified once, and both filters read the same
//! snapshot. A route is processed if either purpose wants it.
//!
//! ## Facts in the Cache, Decisions at Read Time
//!
//! The cache manifest stores classification facts rather than include
//! decisions, so flipping an include flag never invalidates it. The `check`
//! command uses it to tell whether a configuration change would drop routes
//! from the index.
//!
//! ## Declared Sections First
//!
//! A declared section's route globs are tried depth-first in declaration
//! order and the first match wins. Only documents no section claims fall back
//! to automatic sections derived from their path.

pub mod attachments;
pub mod cache;
pub mod classify;
pub mod config;
pub mod copy_content;
pub mod generate;
pub mod naming;
pub mod output;
pub mod pattern;
pub mod render;
pub mod report;
pub mod resolve;
pub mod tree;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

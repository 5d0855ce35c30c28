//! Attachment processing.
//!
//! Attachments are local files (API specs, changelogs, style guides) that are
//! published next to `llms.txt` and listed in it like pages. This module reads
//! each declared source and decides its published name. The CLI does the
//! writing.
//!
//! Reading goes through [`SourceReader`] so the library never touches the
//! filesystem directly: [`FsReader`] for real builds, [`MemoryReader`] for
//! tests and embedding.
//!
//! A source that cannot be read is reported as a route issue and skipped. The
//! rest of the batch still runs.

use crate::naming::{UniqueNames, source_stem, title_slug};
use crate::report::Reporter;
use crate::resolve::CollectedAttachment;
use crate::types::DocInfo;
use serde::Serialize;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// URL directory attachments are published under.
pub const ATTACHMENTS_URL_DIR: &str = "/assets/llms-txt/attachments";

/// Reads attachment sources.
pub trait SourceReader: Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Reads from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Serves files from memory, keyed by full path.
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    files: HashMap<PathBuf, String>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

impl SourceReader for MemoryReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedAttachment {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub section_id: String,
    /// Published URL, `/assets/llms-txt/attachments/<name>.md`.
    pub url: String,
    /// Published file name, `<name>.md`.
    pub file_name: String,
    pub content: String,
    pub source_path: String,
    pub include_in_full_txt: bool,
}

impl ProcessedAttachment {
    /// Route path used to place the attachment in the tree:
    /// `/<section_id>/<title slug>`.
    pub fn route_path(&self) -> String {
        format!("/{}/{}", self.section_id, title_slug(&self.title))
    }

    pub fn doc_info(&self) -> DocInfo {
        DocInfo {
            route_path: self.route_path(),
            title: self.title.clone(),
            description: self.description.clone(),
            markdown_file: Some(self.url.clone()),
            section_id: Some(self.section_id.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentBatch {
    pub processed: Vec<ProcessedAttachment>,
    /// One line per attachment that had to be renamed.
    pub warnings: Vec<String>,
}

/// Read every collected attachment relative to `site_dir`.
pub fn process_attachments(
    collected: &[CollectedAttachment],
    site_dir: &Path,
    reader: &dyn SourceReader,
    reporter: &mut Reporter,
) -> AttachmentBatch {
    let mut names = UniqueNames::new();
    let mut batch = AttachmentBatch::default();

    for item in collected {
        let attachment = &item.attachment;
        let source_path = site_dir.join(&attachment.source);
        let content = match reader.read_to_string(&source_path) {
            Ok(content) => content,
            Err(err) => {
                reporter.route_issue(
                    &attachment.source,
                    format!("attachment could not be read: {err}"),
                );
                continue;
            }
        };

        let base = attachment
            .file_name
            .clone()
            .unwrap_or_else(|| source_stem(&attachment.source));
        let claimed = names.claim(&base, "md");
        if claimed.collided {
            let message = format!(
                "attachment name \"{base}\" already used, publishing {} as {}",
                attachment.source, claimed.file_name
            );
            warn!("{message}");
            batch.warnings.push(message);
        }
        debug!(source = %attachment.source, file = %claimed.file_name, "processed attachment");

        batch.processed.push(ProcessedAttachment {
            title: attachment.title.clone(),
            description: attachment.description.clone(),
            section_id: item.section_id.clone(),
            url: format!("{ATTACHMENTS_URL_DIR}/{}", claimed.file_name),
            file_name: claimed.file_name,
            content,
            source_path: attachment.source.clone(),
            include_in_full_txt: attachment.include_in_full_txt,
        });
    }
    batch
}

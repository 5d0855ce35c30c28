//! Severity-driven reporting of non-fatal issues.
//!
//! A missing attachment or a section that matched nothing should not stop a
//! build by default, but some sites want it to. Each issue is routed through
//! the severity the user configured for its kind (`on_route_error` or
//! `on_section_error`) and collected. Issues at [`ReportingSeverity::Throw`]
//! only fail the run once the whole batch has been processed, so the user
//! sees every problem at once.

use crate::config::PluginConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info, warn};

/// What to do with a non-fatal issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingSeverity {
    /// Drop silently.
    Ignore,
    /// Record at info level.
    Log,
    #[default]
    Warn,
    /// Record and fail the run after the batch.
    Throw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    Route,
    Section,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Route => f.write_str("route"),
            IssueKind::Section => f.write_str("section"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: IssueKind,
    /// Route path, attachment source or section id.
    pub subject: String,
    pub message: String,
    pub severity: ReportingSeverity,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.subject, self.message)
    }
}

/// Collects issues for one run.
#[derive(Debug, Default)]
pub struct Reporter {
    on_route_error: ReportingSeverity,
    on_section_error: ReportingSeverity,
    issues: Vec<Issue>,
}

impl Reporter {
    pub fn new(on_route_error: ReportingSeverity, on_section_error: ReportingSeverity) -> Self {
        Self {
            on_route_error,
            on_section_error,
            issues: Vec::new(),
        }
    }

    pub fn for_config(config: &PluginConfig) -> Self {
        Self::new(config.on_route_error, config.on_section_error)
    }

    pub fn route_issue(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.record(IssueKind::Route, self.on_route_error, subject.into(), message.into());
    }

    pub fn section_issue(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.record(
            IssueKind::Section,
            self.on_section_error,
            subject.into(),
            message.into(),
        );
    }

    fn record(
        &mut self,
        kind: IssueKind,
        severity: ReportingSeverity,
        subject: String,
        message: String,
    ) {
        match severity {
            ReportingSeverity::Ignore => return,
            ReportingSeverity::Log => info!(%kind, %subject, "{message}"),
            ReportingSeverity::Warn => warn!(%kind, %subject, "{message}"),
            ReportingSeverity::Throw => error!(%kind, %subject, "{message}"),
        }
        self.issues.push(Issue {
            kind,
            subject,
            message,
            severity,
        });
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Take every recorded issue, or fail if any was recorded at `Throw`.
    pub fn finish(self) -> Result<Vec<Issue>, IssueSummary> {
        if self
            .issues
            .iter()
            .any(|issue| issue.severity == ReportingSeverity::Throw)
        {
            Err(IssueSummary {
                issues: self.issues,
            })
        } else {
            Ok(self.issues)
        }
    }
}

/// Every issue from a run that had at least one `Throw`-level issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSummary {
    pub issues: Vec<Issue>,
}

impl IssueSummary {
    pub fn failing(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == ReportingSeverity::Throw)
    }
}

impl fmt::Display for IssueSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failing: Vec<&Issue> = self.failing().collect();
        write!(f, "{} issue(s) configured to fail the build", failing.len())?;
        for issue in failing {
            write!(f, "\n  {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for IssueSummary {}

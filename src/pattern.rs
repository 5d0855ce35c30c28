//! Glob matching for route paths.
//!
//! Every pattern list in the configuration (exclude lists, section routes,
//! route rules, UI display excludes) goes through [`RouteMatcher`]. Patterns
//! are compiled once per list and reused for every route.
//!
//! ## Semantics
//!
//! | Pattern            | Matches                               | Does not match   |
//! |--------------------|---------------------------------------|------------------|
//! | `/docs/*`          | `/docs/intro`                         | `/docs/a/b`      |
//! | `/docs/**`         | `/docs`, `/docs/a`, `/docs/a/b`       | `/docs-old/a`    |
//! | `/blog/*/tags`     | `/blog/2024/tags`                     | `/blog/tags`     |
//! | `/search`          | `/search`                             | `/Search`        |
//!
//! A pattern must match the whole path. `*` never crosses a `/`, `**` spans
//! zero or more whole segments, and matching is case-sensitive.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Invalid route pattern \"{pattern}\": {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// A compiled list of route patterns.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    set: GlobSet,
    /// Compiled glob index → index into `patterns`. A trailing `/**` compiles
    /// to two globs owned by the same pattern.
    owners: Vec<usize>,
    patterns: Vec<String>,
}

impl RouteMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let mut builder = GlobSetBuilder::new();
        let mut owners = Vec::new();
        let mut kept = Vec::with_capacity(patterns.len());

        for (index, pattern) in patterns.iter().enumerate() {
            let pattern = pattern.as_ref();
            builder.add(compile(pattern)?);
            owners.push(index);
            // `/a/**` must also match `/a` itself.
            if let Some(prefix) = pattern.strip_suffix("/**") {
                let bare = if prefix.is_empty() { "/" } else { prefix };
                builder.add(compile(bare)?);
                owners.push(index);
            }
            kept.push(pattern.to_string());
        }

        let set = builder.build().map_err(|source| PatternError::Invalid {
            pattern: kept.join(", "),
            source,
        })?;
        Ok(Self {
            set,
            owners,
            patterns: kept,
        })
    }

    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
            owners: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// True when any pattern matches `path`. Always false for an empty list.
    pub fn is_match(&self, path: &str) -> bool {
        !self.patterns.is_empty() && self.set.is_match(path)
    }

    /// [`is_match`](Self::is_match) under the name exclude lists read best with.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.is_match(path)
    }

    /// Indices of every pattern that matches `path`, in declaration order.
    pub fn matching(&self, path: &str) -> Vec<usize> {
        let mut hits: Vec<usize> = self
            .set
            .matches(path)
            .into_iter()
            .map(|glob| self.owners[glob])
            .collect();
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Check that every pattern compiles.
pub fn validate_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<(), PatternError> {
    for pattern in patterns {
        compile(pattern.as_ref())?;
    }
    Ok(())
}

/// True when `pattern` contains no glob syntax and so matches only itself.
pub fn is_literal(pattern: &str) -> bool {
    !pattern.contains(['*', '?', '[', ']', '{', '}'])
}

fn compile(pattern: &str) -> Result<Glob, PatternError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| PatternError::Invalid {
            pattern: pattern.to_string(),
            source,
        })
}

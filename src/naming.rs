//! Slugs, display names and collision-free artifact names.
//!
//! Three different slug shapes are in play and they are not interchangeable:
//!
//! - [`slugify`] compares a section name with its index document title. It
//!   drops punctuation, so `Getting Started!` and `getting started` agree.
//! - [`title_slug`] builds attachment route paths. It only lowercases and
//!   collapses whitespace, so the route stays predictable from the title.
//! - [`humanize_segment`] goes the other way and turns a path segment into a
//!   section name: `tutorial-basics` → `Tutorial Basics`.

use std::collections::HashSet;
use std::path::Path;

/// Heading-style slug: lowercase, punctuation removed, spaces to dashes.
///
/// - `"Getting Started"` → `"getting-started"`
/// - `"API: Reference!"` → `"api-reference"`
/// - `"snake_case"` → `"snake_case"`
pub fn slugify(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

/// True when two display strings produce the same heading slug.
pub fn same_slug(a: &str, b: &str) -> bool {
    slugify(a) == slugify(b)
}

/// Lowercase a title and replace each run of whitespace with a single dash.
///
/// - `"Payment API"` → `"payment-api"`
/// - `"Rate   Limits"` → `"rate-limits"`
pub fn title_slug(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Turn a path segment into a display name.
///
/// - `"tutorial-basics"` → `"Tutorial Basics"`
/// - `"api_reference"` → `"Api Reference"`
/// - `"v2"` → `"V2"`
pub fn humanize_segment(segment: &str) -> String {
    segment
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// File stem of a source path: `"specs/test-api.yaml"` → `"test-api"`.
pub fn source_stem(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source)
        .to_string()
}

/// A name handed out by [`UniqueNames::claim`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedName {
    /// Full file name including extension.
    pub file_name: String,
    /// True when the base name was taken and a counter was appended.
    pub collided: bool,
}

/// Hands out file names that never repeat within one batch.
///
/// The first claim of `guide` gets `guide.md`, later claims get `guide-2.md`,
/// `guide-3.md` and so on. The counter is always applied to the original
/// base, never to an already-suffixed name.
#[derive(Debug, Default)]
pub struct UniqueNames {
    used: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, base: &str, extension: &str) -> ClaimedName {
        let first = format!("{base}.{extension}");
        if self.used.insert(first.clone()) {
            return ClaimedName {
                file_name: first,
                collided: false,
            };
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{base}-{counter}.{extension}");
            if self.used.insert(candidate.clone()) {
                return ClaimedName {
                    file_name: candidate,
                    collided: true,
                };
            }
            counter += 1;
        }
    }
}

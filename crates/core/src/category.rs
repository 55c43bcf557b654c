//! Change-type classification of changelog entries.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::config::TypeMarkers;
use crate::ticket::{PatternError, TicketId};

/// Kind of change an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Feature,
    Fix,
    BreakingChange,
    Other,
}

impl Category {
    /// Rendering order of sections.
    pub const ALL: [Category; 4] = [
        Category::Feature,
        Category::Fix,
        Category::BreakingChange,
        Category::Other,
    ];

    /// Section header text.
    pub fn header(&self) -> &'static str {
        match self {
            Category::Feature => "Changed features",
            Category::Fix => "Fixed",
            Category::BreakingChange => "Breaking Changes",
            Category::Other => "Others",
        }
    }

    /// Metric label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Feature => "feature",
            Category::Fix => "fix",
            Category::BreakingChange => "breaking_change",
            Category::Other => "other",
        }
    }

    fn index(self) -> usize {
        match self {
            Category::Feature => 0,
            Category::Fix => 1,
            Category::BreakingChange => 2,
            Category::Other => 3,
        }
    }
}

/// One categorized changelog line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub raw_line: String,
    pub ticket_ids: Vec<TicketId>,
    pub category: Category,
}

/// Entries of a single block, bucketed by category in encounter order.
#[derive(Debug, Clone, Default)]
pub struct Block {
    buckets: [Vec<Entry>; 4],
}

impl Block {
    pub fn push(&mut self, entry: Entry) {
        self.buckets[entry.category.index()].push(entry);
    }

    pub fn entries(&self, category: Category) -> &[Entry] {
        &self.buckets[category.index()]
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}

/// Classifies entries by the type marker following the list bullet,
/// e.g. `- feat/login: ...` or `* fix: ...`.
#[derive(Debug, Clone)]
pub struct Categorizer {
    detect: Option<Regex>,
    prefix: Option<Regex>,
    markers: Vec<(String, Category)>,
}

impl Categorizer {
    pub fn new(markers: &TypeMarkers) -> Result<Self, PatternError> {
        let mut table: Vec<(String, Category)> = markers
            .feature
            .iter()
            .map(|m| (m, Category::Feature))
            .chain(markers.fix.iter().map(|m| (m, Category::Fix)))
            .chain(
                markers
                    .breaking_change
                    .iter()
                    .map(|m| (m, Category::BreakingChange)),
            )
            .map(|(m, c)| (m.trim().to_lowercase(), c))
            .filter(|(m, _)| !m.is_empty())
            .collect();

        // Longest first so a marker never shadows a longer one it prefixes
        table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        if table.is_empty() {
            return Ok(Self {
                detect: None,
                prefix: None,
                markers: table,
            });
        }

        let alternation = table
            .iter()
            .map(|(m, _)| regex_lite::escape(m))
            .collect::<Vec<_>>()
            .join("|");

        let detect_pattern = format!(r"(?i)^(\*|-) ({})", alternation);
        let prefix_pattern = format!(r"(?i)^(\*|-) ({})/", alternation);
        let detect = Regex::new(&detect_pattern)
            .map_err(|e| PatternError::invalid(&detect_pattern, e))?;
        let prefix = Regex::new(&prefix_pattern)
            .map_err(|e| PatternError::invalid(&prefix_pattern, e))?;

        Ok(Self {
            detect: Some(detect),
            prefix: Some(prefix),
            markers: table,
        })
    }

    /// Category for a line; `Other` when no marker matches.
    pub fn categorize(&self, line: &str) -> Category {
        let Some(caps) = self.detect.as_ref().and_then(|re| re.captures(line)) else {
            return Category::Other;
        };
        let Some(marker) = caps.get(2) else {
            return Category::Other;
        };
        let marker = marker.as_str().to_lowercase();
        self.markers
            .iter()
            .find(|(m, _)| *m == marker)
            .map(|(_, c)| *c)
            .unwrap_or(Category::Other)
    }

    /// Replace a `- <marker>/` prefix with a plain list bullet.
    pub fn strip_marker<'a>(&self, line: &'a str) -> Cow<'a, str> {
        match &self.prefix {
            Some(re) => re.replace(line, "- "),
            None => Cow::Borrowed(line),
        }
    }
}

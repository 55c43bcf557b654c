//! Re-rendering of categorized blocks into release note sections.

use std::fmt::Write;

use crate::category::{Block, Categorizer, Category, Entry};
use crate::issue::IssueMap;
use crate::ticket::{ReferencePattern, TicketId};

/// Formats one block at a time; holds no per-block state.
#[derive(Debug, Clone)]
pub struct Renderer {
    host: String,
    reference: ReferencePattern,
    categorizer: Categorizer,
}

impl Renderer {
    pub fn new(
        host: impl Into<String>,
        reference: ReferencePattern,
        categorizer: Categorizer,
    ) -> Self {
        Self {
            host: host.into(),
            reference,
            categorizer,
        }
    }

    /// Deep link to a ticket in the tracker UI.
    pub fn browse_url(&self, id: &TicketId) -> String {
        format!("https://{}/browse/{}", self.host, id)
    }

    /// Render a block as sections in fixed category order.
    ///
    /// Empty categories produce nothing; an empty block renders as an
    /// empty string.
    pub fn render(&self, block: &Block, issues: &IssueMap) -> String {
        let mut out = String::new();

        for category in Category::ALL {
            let entries = block.entries(category);
            if entries.is_empty() {
                continue;
            }

            let _ = write!(out, "\n**{}:**\n", category.header());
            for entry in entries {
                self.render_entry(&mut out, entry, issues);
            }
            out.push('\n');
        }

        out
    }

    fn render_entry(&self, out: &mut String, entry: &Entry, issues: &IssueMap) {
        let without_refs = self.reference.strip(&entry.raw_line);
        let cleaned = self.categorizer.strip_marker(&without_refs);
        out.push_str(&cleaned);
        out.push('\n');

        for id in &entry.ticket_ids {
            let link = format!("  - [{}]({})", id, self.browse_url(id));
            match issues.get(id) {
                Some(summary) => {
                    let _ = writeln!(out, "{} {}", link, summary);
                }
                None => {
                    let _ = writeln!(out, "{}", link);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypeMarkers;

    fn renderer() -> Renderer {
        Renderer::new(
            "jira.example.com",
            ReferencePattern::new(r"#{key}-\d+", "PROJ").unwrap(),
            Categorizer::new(&TypeMarkers::default()).unwrap(),
        )
    }

    fn entry(line: &str, category: Category, ids: &[&str]) -> Entry {
        Entry {
            raw_line: line.to_string(),
            ticket_ids: ids.iter().map(|id| TicketId::from(*id)).collect(),
            category,
        }
    }

    #[test]
    fn test_render_empty_block() {
        assert_eq!(renderer().render(&Block::default(), &IssueMap::new()), "");
    }

    #[test]
    fn test_render_sections_in_fixed_order() {
        let mut block = Block::default();
        block.push(entry("- chore: deps", Category::Other, &[]));
        block.push(entry("- fix: crash", Category::Fix, &[]));
        block.push(entry("- feat: widgets", Category::Feature, &[]));

        let out = renderer().render(&block, &IssueMap::new());
        assert_eq!(
            out,
            "\n**Changed features:**\n- feat: widgets\n\n\
             \n**Fixed:**\n- fix: crash\n\n\
             \n**Others:**\n- chore: deps\n\n"
        );
        assert!(!out.contains("Breaking Changes"));
    }

    #[test]
    fn test_render_entry_with_resolved_issue() {
        let mut block = Block::default();
        block.push(entry(
            "- feat/login: add SSO (#PROJ-12)",
            Category::Feature,
            &["PROJ-12"],
        ));
        let issues: IssueMap = [(TicketId::from("PROJ-12"), "Single sign-on")]
            .into_iter()
            .collect();

        let out = renderer().render(&block, &issues);
        assert_eq!(
            out,
            "\n**Changed features:**\n\
             - login: add SSO ()\n\
             \u{20} - [PROJ-12](https://jira.example.com/browse/PROJ-12) Single sign-on\n\n"
        );
    }

    #[test]
    fn test_render_unresolved_issue_without_summary() {
        let mut block = Block::default();
        block.push(entry("- fix: PROJ-7 crash", Category::Fix, &["PROJ-7"]));

        let out = renderer().render(&block, &IssueMap::new());
        assert!(out.contains("- fix: PROJ-7 crash\n"));
        assert!(out.contains("  - [PROJ-7](https://jira.example.com/browse/PROJ-7)\n"));
    }

    #[test]
    fn test_render_one_row_per_ticket() {
        let mut block = Block::default();
        block.push(entry(
            "- breaking-changes/api: v2 (#PROJ-1, #PROJ-2)",
            Category::BreakingChange,
            &["PROJ-1", "PROJ-2"],
        ));
        let issues: IssueMap = [
            (TicketId::from("PROJ-1"), "One"),
            (TicketId::from("PROJ-2"), "Two"),
        ]
        .into_iter()
        .collect();

        let out = renderer().render(&block, &issues);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "",
                "**Breaking Changes:**",
                "- api: v2 (, )",
                "  - [PROJ-1](https://jira.example.com/browse/PROJ-1) One",
                "  - [PROJ-2](https://jira.example.com/browse/PROJ-2) Two",
                "",
            ]
        );
    }
}

//! Ticket id extraction and inline reference stripping.

use regex_lite::Regex;
use std::borrow::Cow;

use super::{PatternError, TicketId};

/// Placeholder expanded to the escaped project key in reference templates.
const KEY_PLACEHOLDER: &str = "{key}";

/// Finds `<KEY>-<digits>` ids anywhere in a line.
#[derive(Debug, Clone)]
pub struct TicketExtractor {
    regex: Regex,
}

impl TicketExtractor {
    /// Build an extractor for a case-sensitive project key.
    pub fn new(project_key: &str) -> Result<Self, PatternError> {
        let pattern = format!(r"{}-\d+", regex_lite::escape(project_key));
        let regex = Regex::new(&pattern).map_err(|e| PatternError::invalid(&pattern, e))?;
        Ok(Self { regex })
    }

    /// All ids in the line, in order of occurrence. Empty when none match.
    pub fn extract(&self, line: &str) -> Vec<TicketId> {
        self.regex
            .find_iter(line)
            .map(|m| TicketId::new(m.as_str()))
            .collect()
    }
}

/// Matches referenced forms of an id (e.g. `#PROJ-12`) for removal.
#[derive(Debug, Clone)]
pub struct ReferencePattern {
    regex: Regex,
}

impl ReferencePattern {
    /// Compile a template such as `#{key}-\d+` for the given project key.
    pub fn new(template: &str, project_key: &str) -> Result<Self, PatternError> {
        if !template.contains(KEY_PLACEHOLDER) {
            return Err(PatternError::MissingKey(template.to_string()));
        }
        let pattern = template.replace(KEY_PLACEHOLDER, &regex_lite::escape(project_key));
        let regex = Regex::new(&pattern).map_err(|e| PatternError::invalid(&pattern, e))?;
        Ok(Self { regex })
    }

    /// Remove every referenced id from the line.
    pub fn strip<'a>(&self, line: &'a str) -> Cow<'a, str> {
        self.regex.replace_all(line, "")
    }
}

//! Rule conditions - matching a rule against parsed frontmatter

use super::Rule;
use crate::frontmatter::{Frontmatter, PropertyValue};

/// How a rule matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Inline `key: value`
    Scalar,
    /// Item of an itemized `key:` list
    List,
}

/// Result of checking one rule against a note's frontmatter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Scalar,
    List,
    NoMatch,
}

impl MatchOutcome {
    /// The match kind, if the rule matched
    pub fn kind(self) -> Option<MatchKind> {
        match self {
            MatchOutcome::Scalar => Some(MatchKind::Scalar),
            MatchOutcome::List => Some(MatchKind::List),
            MatchOutcome::NoMatch => None,
        }
    }

    pub fn is_match(self) -> bool {
        self != MatchOutcome::NoMatch
    }
}

impl Rule {
    /// Check this rule against parsed frontmatter.
    ///
    /// Scalars must equal the rule value exactly (case-sensitive, already
    /// trimmed by the parser); lists must contain it verbatim. Rules with an
    /// empty property or value never match.
    pub fn check(&self, frontmatter: &Frontmatter) -> MatchOutcome {
        if self.property.is_empty() || self.value.is_empty() {
            return MatchOutcome::NoMatch;
        }

        match frontmatter.get(&self.property) {
            Some(PropertyValue::Scalar(v)) if *v == self.value => MatchOutcome::Scalar,
            Some(PropertyValue::List(items)) if items.contains(&self.value) => MatchOutcome::List,
            _ => MatchOutcome::NoMatch,
        }
    }
}

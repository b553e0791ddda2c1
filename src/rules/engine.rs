//! Rule engine - evaluates rules in order against a note's frontmatter

use tracing::{debug, trace};

use super::{MatchKind, Rule};
use crate::frontmatter::Frontmatter;

/// The first rule that matched a note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'r> {
    /// Position of the rule in the list
    pub index: usize,
    pub rule: &'r Rule,
    pub kind: MatchKind,
}

/// Engine for evaluating an ordered rule list
pub struct RuleEngine<'r> {
    rules: &'r [Rule],
}

impl<'r> RuleEngine<'r> {
    /// Create an engine over the current rule list
    pub fn new(rules: &'r [Rule]) -> Self {
        Self { rules }
    }

    /// Return the first matching rule; later rules are not evaluated
    pub fn evaluate(&self, frontmatter: &Frontmatter) -> Option<RuleMatch<'r>> {
        for (index, rule) in self.rules.iter().enumerate() {
            match rule.check(frontmatter).kind() {
                Some(kind) => {
                    debug!("Rule {} ({}) matched as {:?}", index + 1, rule, kind);
                    return Some(RuleMatch { index, rule, kind });
                }
                None => trace!("Rule {} ({}) did not match", index + 1, rule),
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let block = Frontmatter::parse("domain: Health\ntags:\n  - urgent");
        let rules = vec![
            Rule::new("domain", "Work", "Work"),
            Rule::new("tags", "urgent", "Urgent"),
            Rule::new("domain", "Health", "Health"),
        ];

        let m = RuleEngine::new(&rules).evaluate(&block).unwrap();
        assert_eq!(m.index, 1);
        assert_eq!(m.rule.folder, "Urgent");
        assert_eq!(m.kind, MatchKind::List);
    }

    #[test]
    fn test_reordering_changes_winner() {
        let block = Frontmatter::parse("domain: Health\ntags:\n  - urgent");
        let mut rules = vec![
            Rule::new("tags", "urgent", "Urgent"),
            Rule::new("domain", "Health", "Health"),
        ];

        let m = RuleEngine::new(&rules).evaluate(&block).unwrap();
        assert_eq!(m.rule.folder, "Urgent");

        rules.swap(0, 1);
        let m = RuleEngine::new(&rules).evaluate(&block).unwrap();
        assert_eq!(m.rule.folder, "Health");
        assert_eq!(m.kind, MatchKind::Scalar);
    }

    #[test]
    fn test_no_match() {
        let block = Frontmatter::parse("domain: Health");
        let rules = vec![Rule::new("domain", "Work", "Work")];

        assert!(RuleEngine::new(&rules).evaluate(&block).is_none());
        assert!(RuleEngine::new(&[]).evaluate(&block).is_none());
    }
}

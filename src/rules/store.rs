//! Rule store - the ordered, editable rule list

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Rule, RuleField};

/// Errors from rule list edits
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleStoreError {
    #[error("no rule at position {position} (there are {len} rules)", position = .index + 1)]
    OutOfRange { index: usize, len: usize },
}

/// Ordered list of rules, persisted as `[[rule]]` tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleStore {
    rules: Vec<Rule>,
}

impl RuleStore {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// All rules in evaluation order
    pub fn list(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Append a rule
    pub fn add(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Remove the rule at `index`
    pub fn remove_at(&mut self, index: usize) -> Result<Rule, RuleStoreError> {
        self.check_index(index)?;
        Ok(self.rules.remove(index))
    }

    /// Replace one field of the rule at `index`
    pub fn update_field(
        &mut self,
        index: usize,
        field: RuleField,
        value: impl Into<String>,
    ) -> Result<(), RuleStoreError> {
        self.check_index(index)?;
        *self.rules[index].field_mut(field) = value.into();
        Ok(())
    }

    /// Move the rule at `from` so that it ends up at position `to`
    pub fn move_rule(&mut self, from: usize, to: usize) -> Result<(), RuleStoreError> {
        self.check_index(from)?;
        self.check_index(to)?;
        let rule = self.rules.remove(from);
        self.rules.insert(to, rule);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), RuleStoreError> {
        if index < self.rules.len() {
            Ok(())
        } else {
            Err(RuleStoreError::OutOfRange {
                index,
                len: self.rules.len(),
            })
        }
    }
}

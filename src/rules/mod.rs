//! Move rules - which notes go where

mod condition;
mod engine;
mod store;

pub use condition::{MatchKind, MatchOutcome};
pub use engine::{RuleEngine, RuleMatch};
pub use store::{RuleStore, RuleStoreError};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// If frontmatter property `property` equals `value`, move the note into `folder`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Frontmatter key to inspect
    #[serde(default)]
    pub property: String,

    /// Value the property must hold (or contain, for lists)
    #[serde(default)]
    pub value: String,

    /// Destination folder, relative to the vault root
    #[serde(default)]
    pub folder: String,
}

impl Rule {
    /// Create a new rule
    pub fn new(
        property: impl Into<String>,
        value: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            folder: folder.into(),
        }
    }

    /// Get a field by name
    pub fn field(&self, field: RuleField) -> &str {
        match field {
            RuleField::Property => &self.property,
            RuleField::Value => &self.value,
            RuleField::Folder => &self.folder,
        }
    }

    fn field_mut(&mut self, field: RuleField) -> &mut String {
        match field {
            RuleField::Property => &mut self.property,
            RuleField::Value => &mut self.value,
            RuleField::Folder => &mut self.folder,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} -> {}", self.property, self.value, self.folder)
    }
}

/// Editable field of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    Property,
    Value,
    Folder,
}

impl FromStr for RuleField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "property" => Ok(RuleField::Property),
            "value" => Ok(RuleField::Value),
            "folder" => Ok(RuleField::Folder),
            other => Err(format!(
                "unknown rule field '{}' (expected property, value or folder)",
                other
            )),
        }
    }
}

impl fmt::Display for RuleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleField::Property => "property",
            RuleField::Value => "value",
            RuleField::Folder => "folder",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule_field() {
        assert_eq!("property".parse::<RuleField>(), Ok(RuleField::Property));
        assert_eq!("Value".parse::<RuleField>(), Ok(RuleField::Value));
        assert_eq!("FOLDER".parse::<RuleField>(), Ok(RuleField::Folder));
        assert!("name".parse::<RuleField>().is_err());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let rule: Rule = toml::from_str(r#"property = "domain""#).unwrap();
        assert_eq!(rule.property, "domain");
        assert_eq!(rule.value, "");
        assert_eq!(rule.folder, "");
    }
}

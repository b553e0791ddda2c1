//! Frontmatter extraction and parsing
//!
//! A note's frontmatter is the block fenced by `---` lines at the very top of
//! the file. Only the small subset of YAML that rules care about is
//! understood: inline scalars (`key: value`) and itemized lists
//! (`key:` followed by `- item` lines).

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

/// Delimiter line that opens and closes a frontmatter block
const DELIMITER: &str = "---";

/// A line that starts a new top-level key, ending any list in progress
static TOP_LEVEL_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+:").expect("invalid key regex"));

/// Value of a single frontmatter property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Inline value, quotes stripped and trimmed
    Scalar(String),
    /// Itemized list, bullets stripped, empty items dropped
    List(Vec<String>),
}

/// Parsed frontmatter, keys in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    properties: IndexMap<String, PropertyValue>,
}

/// Return the inner text of the frontmatter block, or `None` if the document
/// does not start with a complete block.
pub fn extract(content: &str) -> Option<&str> {
    let rest = content.strip_prefix(DELIMITER)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if bare_line(line) == DELIMITER {
            let inner = &rest[..offset];
            let inner = inner
                .strip_suffix("\r\n")
                .or_else(|| inner.strip_suffix('\n'))
                .unwrap_or(inner);
            return Some(inner);
        }
        offset += line.len();
    }

    None
}

/// Strip the line terminator (`\n` or `\r\n`)
fn bare_line(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

impl Frontmatter {
    /// Parse a frontmatter block (the text between the delimiters)
    pub fn parse(block: &str) -> Self {
        let lines: Vec<&str> = block.lines().collect();
        let mut properties = IndexMap::new();

        // Every key line registers a key, even one that also lands in a list
        for (i, line) in lines.iter().enumerate() {
            let Some((key, rest)) = split_key_line(line) else {
                continue;
            };

            let value = match scalar_value(rest) {
                Some(scalar) => PropertyValue::Scalar(scalar),
                None => PropertyValue::List(
                    lines[i + 1..]
                        .iter()
                        .take_while(|line| !ends_list(line))
                        .filter_map(|line| list_item(line))
                        .collect(),
                ),
            };

            // First occurrence wins
            properties.entry(key.to_string()).or_insert(value);
        }

        Self { properties }
    }

    /// Extract and parse the frontmatter of a whole document
    pub fn from_document(content: &str) -> Option<Self> {
        extract(content).map(Self::parse)
    }

    /// Look up a property by key
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Split a top-level `key: rest` line. Indented lines, list bullets and
/// comments are not key lines.
fn split_key_line(line: &str) -> Option<(&str, &str)> {
    if line.starts_with([' ', '\t', '-', '#']) {
        return None;
    }
    let (key, rest) = line.split_once(':')?;
    if key.is_empty() {
        return None;
    }
    Some((key, rest))
}

/// Inline value after the colon: optional whitespace, one optional opening
/// quote, then everything up to the next quote or end of line.
fn scalar_value(rest: &str) -> Option<String> {
    let s = rest.trim_start_matches([' ', '\t']);
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    let end = s.find(['"', '\'']).unwrap_or(s.len());
    let value = s[..end].trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn ends_list(line: &str) -> bool {
    line.trim().is_empty() || line == DELIMITER || TOP_LEVEL_KEY.is_match(line)
}

fn list_item(line: &str) -> Option<String> {
    let item = line.trim_start();
    let item = item.strip_prefix('-').unwrap_or(item).trim();
    (!item.is_empty()).then(|| item.to_string())
}

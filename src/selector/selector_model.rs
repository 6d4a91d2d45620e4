use std::collections::BTreeMap;
use std::fmt;

use crate::element::attr::EleAttr;
use crate::element::xpath::XPath;

/// A persistent symbolic element handle.
///
/// Either named (resolved through the catalog) or derived (an XPath produced
/// by indexing/iterating/matching another selector's resolution). Carries no
/// concrete element identity: it is re-resolved against the live tree at
/// every use, because positions and ids change between observations.
#[derive(Debug, Clone)]
pub struct Selector {
    pub name: Option<String>,
    pub xpath: String,
    cursor: usize,
}

impl Selector {
    pub fn named(name: impl Into<String>, xpath: impl Into<String>) -> Self {
        Selector {
            name: Some(name.into()),
            xpath: xpath.into(),
            cursor: 0,
        }
    }

    pub fn derived(xpath: impl Into<String>) -> Self {
        Selector {
            name: None,
            xpath: xpath.into(),
            cursor: 0,
        }
    }

    /// Derived handle bound to a concrete element's canonical XPath
    /// (role tag + id), not to the parent's expression.
    pub fn for_element(ele: &EleAttr) -> Self {
        Selector::derived(XPath::for_element(ele))
    }

    /// Iteration cursor over the base element's children.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "${}", name),
            None => write!(f, "{}", self.xpath),
        }
    }
}

/// Argument of a `match` operation: a text substring or a field/value map.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchCriterion {
    Text(String),
    Attrs(BTreeMap<String, serde_json::Value>),
}

impl MatchCriterion {
    pub fn matches(&self, ele: &EleAttr) -> bool {
        match self {
            MatchCriterion::Text(needle) => ele.is_match(needle),
            MatchCriterion::Attrs(expected) => {
                let attrs = ele.attributes();
                expected
                    .iter()
                    .all(|(key, value)| attrs.get(key) == Some(value))
            }
        }
    }
}

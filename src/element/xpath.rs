use crate::element::attr::EleAttr;
use crate::error::UiError;

/// Axis of one location step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `//`: any depth below the context node.
    Descendant,
    /// `/`: direct child.
    Child,
}

/// One location step: axis, tag (None = `*`), attribute predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    pub tag: Option<String>,
    pub predicates: Vec<(String, String)>,
}

/// A restricted XPath expression over the pruned element tree.
///
/// Supported form: `//tag[@attr='value']…/tag[@attr='value']…` with any
/// number of steps and predicates. Tags are role tags (or `*`); predicate
/// attributes are the descriptor attributes (`id`, `resource_id`, `text`,
/// `alt`, `class`, `selected`, `checked`, `scrollable`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    pub steps: Vec<Step>,
}

impl XPath {
    /// Canonical expression for an element found at runtime: role tag plus
    /// its temp id.
    pub fn for_element(ele: &EleAttr) -> String {
        format!("//{}[@id='{}']", ele.role.tag(), ele.id)
    }

    pub fn parse(expr: &str) -> Result<XPath, UiError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(UiError::InvalidSelector("empty XPath expression".into()));
        }
        let mut chars = expr.chars().peekable();
        let mut steps = Vec::new();

        while chars.peek().is_some() {
            let axis = if take(&mut chars, '/') {
                if take(&mut chars, '/') {
                    Axis::Descendant
                } else {
                    Axis::Child
                }
            } else {
                return Err(UiError::InvalidSelector(format!(
                    "expected '/' in XPath '{}'",
                    expr
                )));
            };

            let tag = read_name(&mut chars);
            if tag.is_empty() {
                return Err(UiError::InvalidSelector(format!(
                    "missing tag name in XPath '{}'",
                    expr
                )));
            }
            let tag = if tag == "*" { None } else { Some(tag) };

            let mut predicates = Vec::new();
            while take(&mut chars, '[') {
                if !take(&mut chars, '@') {
                    return Err(UiError::InvalidSelector(format!(
                        "expected '@' in predicate of '{}'",
                        expr
                    )));
                }
                let attr = read_name(&mut chars);
                if attr.is_empty() || !take(&mut chars, '=') {
                    return Err(UiError::InvalidSelector(format!(
                        "malformed predicate in '{}'",
                        expr
                    )));
                }
                let value = read_quoted(&mut chars).ok_or_else(|| {
                    UiError::InvalidSelector(format!("unterminated predicate value in '{}'", expr))
                })?;
                if !take(&mut chars, ']') {
                    return Err(UiError::InvalidSelector(format!(
                        "expected ']' in predicate of '{}'",
                        expr
                    )));
                }
                predicates.push((attr, value));
            }

            steps.push(Step {
                axis,
                tag,
                predicates,
            });
        }

        Ok(XPath { steps })
    }
}

impl Step {
    /// Does this step's tag and every predicate hold for the element?
    pub fn matches(&self, ele: &EleAttr) -> bool {
        if let Some(tag) = &self.tag {
            if tag != ele.role.tag() {
                return false;
            }
        }
        self.predicates
            .iter()
            .all(|(attr, value)| ele.attribute_str(attr).as_deref() == Some(value.as_str()))
    }
}

fn take(chars: &mut std::iter::Peekable<std::str::Chars>, expected: char) -> bool {
    if chars.peek() == Some(&expected) {
        chars.next();
        true
    } else {
        false
    }
}

fn read_name(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    if chars.peek() == Some(&'*') {
        chars.next();
        return "*".into();
    }
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

fn read_quoted(chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<String> {
    let quote = match chars.peek() {
        Some(&q) if q == '\'' || q == '"' => {
            chars.next();
            q
        }
        _ => return None,
    };
    let mut value = String::new();
    for c in chars.by_ref() {
        if c == quote {
            return Some(value);
        }
        value.push(c);
    }
    None
}

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::trace::record::CodeRef;

/// Action APIs recognized in authored scripts.
pub const API_NAMES: [&str; 9] = [
    "long_tap",
    "tap",
    "set_text",
    "scroll",
    "get_text",
    "get_attributes",
    "back",
    "get_ui_tree",
    "check_ele_exist",
];

static SIGIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$([\w%]+)").unwrap());
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]").unwrap());

/// One line of the expanded script, tied back to the authored line it came
/// from (inserted binding lines map to the line that first used the name).
#[derive(Debug, Clone)]
pub struct ExpandedLine {
    pub text: String,
    pub original_lineno: usize,
}

/// Result of macro expansion: rewritten lines plus the complete mapping from
/// expanded line numbers back to authored line numbers. All diagnostics are
/// reported against the authored script through this mapping.
#[derive(Debug, Clone)]
pub struct ExpandedScript {
    pub lines: Vec<ExpandedLine>,
    pub line_map: HashMap<usize, usize>,
    pub original: Vec<String>,
}

impl ExpandedScript {
    /// Attribution record for one expanded line.
    pub fn code_ref(&self, expanded_lineno: usize) -> Option<CodeRef> {
        let line = self.lines.get(expanded_lineno)?;
        Some(CodeRef {
            current_code: line.text.clone(),
            original_lineno: line.original_lineno,
            original_code: self
                .original
                .get(line.original_lineno)
                .cloned()
                .unwrap_or_default(),
        })
    }
}

/// Make a sigil identifier a valid script variable name: non-word characters
/// become `_`, and a leading digit is guarded with `_`.
pub fn sanitize_name(name: &str) -> String {
    let replaced = NON_WORD.replace_all(name, "_").to_string();
    match replaced.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{}", replaced),
        _ => replaced,
    }
}

/// Single forward pass over the authored script.
///
/// The first appearance of each sigil-prefixed identifier (whether as an
/// indexing/iteration target or as an argument to a recognized action API)
/// gets an explicit instantiation statement inserted immediately before that
/// line; every sigil occurrence is rewritten to the sanitized bound name.
/// An identifier used both ways on one line is declared exactly once.
pub fn expand(script: &str) -> ExpandedScript {
    let original: Vec<String> = script.lines().map(str::to_string).collect();
    let mut lines: Vec<ExpandedLine> = Vec::new();
    let mut line_map: HashMap<usize, usize> = HashMap::new();
    let mut declared: HashSet<String> = HashSet::new();

    for (original_lineno, line) in original.iter().enumerate() {
        let indent: String = line
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();

        for capture in SIGIL.captures_iter(line) {
            let name = &capture[1];
            if !declared.insert(name.to_string()) {
                continue;
            }
            let binding = format!(
                "{}{} = element(\"{}\")",
                indent,
                sanitize_name(name),
                name
            );
            line_map.insert(lines.len(), original_lineno);
            lines.push(ExpandedLine {
                text: binding,
                original_lineno,
            });
        }

        let rewritten = SIGIL
            .replace_all(line, |caps: &regex::Captures| sanitize_name(&caps[1]))
            .to_string();
        line_map.insert(lines.len(), original_lineno);
        lines.push(ExpandedLine {
            text: rewritten,
            original_lineno,
        });
    }

    ExpandedScript {
        lines,
        line_map,
        original,
    }
}

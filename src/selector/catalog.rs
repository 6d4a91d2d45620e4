use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::device::event::{InputEvent, ScrollDirection, ViewTarget};
use crate::error::UiError;

/// Action kind of one dependency-chain step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Touch,
    LongTouch,
    Scroll { direction: ScrollDirection },
    SetText { text: String },
    Back,
}

impl StepAction {
    pub fn to_event(&self, target: ViewTarget) -> InputEvent {
        match self {
            StepAction::Touch => InputEvent::Touch { target },
            StepAction::LongTouch => InputEvent::LongTouch { target },
            StepAction::Scroll { direction } => InputEvent::Scroll {
                target,
                direction: *direction,
            },
            StepAction::SetText { text } => InputEvent::SetText {
                target,
                text: text.clone(),
            },
            StepAction::Back => InputEvent::back(),
        }
    }
}

/// One prerequisite action in a dependency chain: act on the named element
/// to make the dependent element reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyStep {
    pub name: String,
    pub action: StepAction,
}

/// Externally curated resolution context: named selectors' XPath expressions
/// and the dependency chains believed to reveal them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameCatalog {
    #[serde(default)]
    xpaths: HashMap<String, String>,
    #[serde(default)]
    dependencies: HashMap<String, Vec<DependencyStep>>,
}

impl NameCatalog {
    pub fn new() -> Self {
        NameCatalog::default()
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, UiError> {
        serde_yaml::from_str(content).map_err(|e| UiError::YamlParse {
            context: "name catalog".into(),
            source: e,
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, UiError> {
        serde_json::from_str(content).map_err(|e| UiError::JsonParse {
            context: "name catalog".into(),
            source: e,
        })
    }

    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn from_path(path: &Path) -> Result<Self, UiError> {
        let content = std::fs::read_to_string(path).map_err(|e| UiError::Io {
            context: format!("reading catalog {}", path.display()),
            source: e,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.xpaths.contains_key(name)
    }

    pub fn xpath(&self, name: &str) -> Option<&str> {
        self.xpaths.get(name).map(String::as_str)
    }

    pub fn dependency(&self, name: &str) -> Option<&[DependencyStep]> {
        self.dependencies.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.xpaths.keys().map(String::as_str)
    }

    pub fn add_xpath(&mut self, name: impl Into<String>, xpath: impl Into<String>) {
        self.xpaths.insert(name.into(), xpath.into());
    }

    pub fn add_dependency(&mut self, name: impl Into<String>, chain: Vec<DependencyStep>) {
        self.dependencies.insert(name.into(), chain);
    }
}

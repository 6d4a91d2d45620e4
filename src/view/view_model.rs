use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Two-corner bounding box: `[[x1, y1], [x2, y2]]`.
pub type Bounds = [[i32; 2]; 2];

fn default_parent() -> i64 {
    -1
}

/// A single raw view record from one observation.
///
/// The schema is fixed for the fields the engine reads; anything else the
/// accessibility dump carries lands in `extra` and round-trips untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct View {
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub content_description: Option<String>,
    #[serde(default)]
    pub bounds: Bounds,

    /// Stable index within this observation's view array.
    #[serde(default)]
    pub temp_id: usize,
    /// Index of the parent view, -1 for the root.
    #[serde(default = "default_parent")]
    pub parent: i64,
    #[serde(default)]
    pub children: Vec<usize>,

    #[serde(default)]
    pub clickable: bool,
    #[serde(default)]
    pub long_clickable: bool,
    #[serde(default)]
    pub scrollable: bool,
    #[serde(default)]
    pub checkable: bool,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub selected: bool,

    /// Unknown attributes, kept for forward compatibility.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for View {
    fn default() -> Self {
        View {
            class: None,
            resource_id: None,
            text: None,
            content_description: None,
            bounds: [[0, 0], [0, 0]],
            temp_id: 0,
            parent: -1,
            children: Vec::new(),
            clickable: false,
            long_clickable: false,
            scrollable: false,
            checkable: false,
            editable: false,
            enabled: false,
            visible: false,
            checked: false,
            selected: false,
            extra: HashMap::new(),
        }
    }
}

impl View {
    pub fn width(&self) -> i32 {
        (self.bounds[0][0] - self.bounds[1][0]).abs()
    }

    pub fn height(&self) -> i32 {
        (self.bounds[0][1] - self.bounds[1][1]).abs()
    }

    /// Center point of the view, used as the touch coordinate.
    pub fn center(&self) -> (i32, i32) {
        (
            (self.bounds[0][0] + self.bounds[1][0]) / 2,
            (self.bounds[0][1] + self.bounds[1][1]) / 2,
        )
    }

    /// Comma-joined `x1,y1,x2,y2` form embedded in element descriptors.
    pub fn bound_box(&self) -> String {
        format!(
            "{},{},{},{}",
            self.bounds[0][0], self.bounds[0][1], self.bounds[1][0], self.bounds[1][1]
        )
    }
}

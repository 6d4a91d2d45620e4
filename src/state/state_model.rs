use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::device::RawObservation;
use crate::device::event::InputEvent;
use crate::element::element_tree::Rendering;
use crate::state::actions::enumerate_possible_input;
use crate::state::signature::{
    content_free_view_signature, signature_key, state_hash, view_signature,
};
use crate::view::arena::ViewArena;
use crate::view::tree::{self, ViewNode};

/// An immutable snapshot of the device UI.
///
/// All cheap derived data (signatures, nested tree, popup flag) is computed
/// at construction; the expensive derivations (possible events, rendering)
/// are memoized in side cells so the view records themselves stay untouched.
#[derive(Debug)]
pub struct DeviceState {
    pub tag: String,
    pub foreground_activity: String,
    pub activity_stack: Vec<String>,
    pub width: u32,
    pub height: u32,

    views: ViewArena,
    view_tree: Option<ViewNode>,

    // side caches, computed once per observation
    view_signatures: Vec<String>,
    content_free_view_signatures: Vec<String>,

    state_key: String,
    structure_key: String,
    pub search_content: String,
    pub is_popup: bool,

    parent: OnceCell<Arc<DeviceState>>,
    possible_events: OnceCell<Vec<InputEvent>>,
    rendering: OnceCell<Rendering>,
}

impl DeviceState {
    pub fn from_observation(raw: RawObservation) -> Self {
        let views = ViewArena::new(raw.views);
        let view_tree = tree::assemble(&views);

        let view_signatures: Vec<String> = views.iter().map(view_signature).collect();
        let content_free_view_signatures: Vec<String> =
            views.iter().map(content_free_view_signature).collect();

        let state_key = signature_key(&state_hash(
            &raw.foreground_activity,
            view_signatures.iter().cloned(),
        ));
        let structure_key = signature_key(&state_hash(
            &raw.foreground_activity,
            content_free_view_signatures.iter().cloned(),
        ));

        let is_popup = match views.root() {
            Some(root) if raw.width > 0 && raw.height > 0 => {
                (root.width() as u32) < raw.width || (root.height() as u32) < raw.height
            }
            _ => false,
        };

        let search_content = build_search_content(&views);
        let tag = raw.tag.unwrap_or_else(|| format!("state_{}", state_key));

        DeviceState {
            tag,
            foreground_activity: raw.foreground_activity,
            activity_stack: raw.activity_stack,
            width: raw.width,
            height: raw.height,
            views,
            view_tree,
            view_signatures,
            content_free_view_signatures,
            state_key,
            structure_key,
            search_content,
            is_popup,
            parent: OnceCell::new(),
            possible_events: OnceCell::new(),
            rendering: OnceCell::new(),
        }
    }

    pub fn views(&self) -> &ViewArena {
        &self.views
    }

    pub fn view_tree(&self) -> Option<&ViewNode> {
        self.view_tree.as_ref()
    }

    /// Content signature of this state alone, popup chaining not applied.
    pub fn own_state_str(&self) -> &str {
        &self.state_key
    }

    pub fn own_structure_str(&self) -> &str {
        &self.structure_key
    }

    /// Externally compared content signature.
    ///
    /// A popup is chained to its parent state, so popups with identical own
    /// content over different base screens still compare as different.
    pub fn state_str(&self) -> String {
        match self.parent.get() {
            Some(parent) if self.is_popup => format!("{}/{}", parent.state_str(), self.state_key),
            _ => self.state_key.clone(),
        }
    }

    /// Externally compared content-free signature, chained the same way.
    pub fn structure_str(&self) -> String {
        match self.parent.get() {
            Some(parent) if self.is_popup => {
                format!("{}/{}", parent.structure_str(), self.structure_key)
            }
            _ => self.structure_key.clone(),
        }
    }

    /// Record the state this popup was spawned from. First caller wins;
    /// later calls are ignored so the snapshot stays effectively immutable.
    pub fn set_parent(&self, parent: Arc<DeviceState>) {
        let _ = self.parent.set(parent);
    }

    pub fn parent(&self) -> Option<&Arc<DeviceState>> {
        self.parent.get()
    }

    pub fn activity_short_name(&self) -> &str {
        self.foreground_activity
            .rsplit('.')
            .next()
            .unwrap_or(&self.foreground_activity)
    }

    /// Depth of the package's activity in the stack, -1 when absent.
    pub fn app_activity_depth(&self, package_name: &str) -> i32 {
        for (depth, activity) in self.activity_stack.iter().enumerate() {
            if activity.contains(package_name) {
                return depth as i32;
            }
        }
        -1
    }

    pub fn is_different_from(&self, other: &DeviceState) -> bool {
        self.state_str() != other.state_str()
    }

    /// Cached per-view content signature.
    pub fn view_signature(&self, id: usize) -> Option<&str> {
        self.view_signatures.get(id).map(String::as_str)
    }

    pub fn content_free_view_signature(&self, id: usize) -> Option<&str> {
        self.content_free_view_signatures.get(id).map(String::as_str)
    }

    /// Ordered list of synthesizable input events, computed once.
    ///
    /// Callers get a fresh clone; the cached list is never re-ordered.
    pub fn possible_input(&self) -> Vec<InputEvent> {
        self.possible_events
            .get_or_init(|| enumerate_possible_input(self))
            .clone()
    }

    /// Text representation and pruned element tree, computed once.
    pub fn rendering(&self) -> &Rendering {
        self.rendering.get_or_init(|| Rendering::build(self))
    }
}

/// Free text for searching recorded states: all resource ids, then all texts.
fn build_search_content(views: &ViewArena) -> String {
    let resource_ids: BTreeSet<&str> = views
        .iter()
        .filter_map(|v| v.resource_id.as_deref())
        .filter(|s| !s.is_empty())
        .collect();
    let texts: BTreeSet<&str> = views
        .iter()
        .filter_map(|v| v.text.as_deref())
        .filter(|s| !s.is_empty())
        .collect();

    let ids: Vec<&str> = resource_ids.into_iter().collect();
    let texts: Vec<&str> = texts.into_iter().collect();
    format!("{}\n{}", ids.join(","), texts.join(","))
}

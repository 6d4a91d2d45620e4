use std::collections::BTreeMap;

use crate::state::actions::is_system_bar;
use crate::state::signature::MAX_SIG_TEXT_LEN;
use crate::view::arena::ViewArena;
use crate::view::view_model::View;

/// UI role of a descriptive element, chosen by strict priority.
///
/// A view may carry several true capability flags at once; the fixed order
/// editable > checkable > clickable > scrollable > default makes the choice
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Input,
    Checkbox,
    Button,
    Scrollbar,
    Paragraph,
}

impl Role {
    /// Markup tag used in descriptors and derived XPath expressions.
    pub fn tag(&self) -> &'static str {
        match self {
            Role::Input => "input",
            Role::Checkbox => "checkbox",
            Role::Button => "button",
            Role::Scrollbar => "scrollbar",
            Role::Paragraph => "p",
        }
    }
}

/// Derived per-view facade: stable identity fields, classified role,
/// allowed actions, and the rendered descriptor pieces.
///
/// Owned by the rendering that created it; never persisted across
/// observations.
#[derive(Debug, Clone)]
pub struct EleAttr {
    pub id: usize,
    pub resource_id: String,
    pub class_name: String,
    pub text: String,
    pub content_description: String,
    pub bound_box: String,
    pub children: Vec<usize>,

    pub role: Role,
    pub actions: Vec<String>,
    pub status: Vec<String>,
    /// Position in the flat description list, assigned for descriptive views.
    pub local_id: Option<usize>,
    /// Has text, a content description, or scroll capability.
    pub descriptive: bool,

    pub scrollable: bool,
    pub checked: bool,
    pub selected: bool,
}

/// Classify one view against its arena.
///
/// Clickability, checkability, and long-clickability are inherited from the
/// nearest ancestor carrying the flag; editability and scrollability are
/// never inherited.
pub fn classify(arena: &ViewArena, view: &View) -> EleAttr {
    let id = view.temp_id;
    let clickable = arena.inherited_flag(id, |v| v.clickable);
    let checkable = arena.inherited_flag(id, |v| v.checkable);
    let long_clickable = arena.inherited_flag(id, |v| v.long_clickable);
    let scrollable = view.scrollable;
    let editable = view.editable;

    let role = if editable {
        Role::Input
    } else if checkable {
        Role::Checkbox
    } else if clickable {
        Role::Button
    } else if scrollable {
        Role::Scrollbar
    } else {
        Role::Paragraph
    };

    let text = truncate(view.text.as_deref().unwrap_or(""));
    let content_description = truncate(view.content_description.as_deref().unwrap_or(""));
    let descriptive = !text.is_empty() || !content_description.is_empty() || scrollable;

    let mut actions = vec!["touch".to_string()];
    if editable {
        actions.push("set_text".into());
    }
    if checkable {
        actions.extend(["select".into(), "unselect".into()]);
        actions.retain(|a| a != "touch");
    }
    if scrollable {
        actions.extend(["scroll up".into(), "scroll down".into()]);
        actions.retain(|a| a != "touch");
    }
    if long_clickable {
        actions.push("long_touch".into());
    }
    if role == Role::Paragraph && !is_plain_leaf(arena, view) {
        actions.retain(|a| a != "touch");
    }

    let mut status = Vec::new();
    if view.checked || view.selected {
        status.push("selected".to_string());
    }

    EleAttr {
        id,
        resource_id: view.resource_id.clone().unwrap_or_default(),
        class_name: view.class.clone().unwrap_or_default(),
        text,
        content_description,
        bound_box: view.bound_box(),
        children: view.children.clone(),
        role,
        actions,
        status,
        local_id: None,
        descriptive,
        scrollable,
        checked: view.checked,
        selected: view.selected,
    }
}

/// A plain text view keeps its fallback `touch` only when nothing beneath
/// it is actionable in its own right.
fn is_plain_leaf(arena: &ViewArena, view: &View) -> bool {
    arena.descendants(view.temp_id).iter().all(|&d| {
        arena.get(d).map_or(true, |v| {
            !(v.clickable || v.checkable || v.long_clickable || v.scrollable || v.editable)
        })
    })
}

fn truncate(s: &str) -> String {
    if s.chars().count() > MAX_SIG_TEXT_LEN {
        s.chars().take(MAX_SIG_TEXT_LEN).collect()
    } else {
        s.to_string()
    }
}

/// Neutralize markup-reserved characters before embedding in a descriptor.
/// The descriptor is later parsed back as structured markup, so unescaped
/// content would corrupt resolution.
pub fn escape_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

impl EleAttr {
    /// Last path segment of the resource id (`com.app:id/save_btn` → `save_btn`).
    pub fn short_resource_id(&self) -> &str {
        self.resource_id.rsplit('/').next().unwrap_or("")
    }

    pub fn short_class_name(&self) -> &str {
        self.class_name.rsplit('.').next().unwrap_or("")
    }

    /// Opening half of the markup descriptor, content included.
    pub fn desc_open(&self) -> String {
        let mut out = format!("<{} id='{}'", self.role.tag(), self.id);
        let rid = self.short_resource_id();
        if !rid.is_empty() {
            out.push_str(&format!(" resource_id='{}'", escape_markup(rid)));
        }
        if !self.content_description.is_empty() {
            out.push_str(&format!(" alt='{}'", escape_markup(&self.content_description)));
        }
        if !self.status.is_empty() {
            let status: Vec<String> = self.status.iter().map(|s| escape_markup(s)).collect();
            out.push_str(&format!(" status='{}'", status.join(",")));
        }
        if !self.bound_box.is_empty() {
            out.push_str(&format!(" bound_box={}", self.bound_box));
        }
        out.push('>');
        out.push_str(&escape_markup(&self.text));
        out
    }

    pub fn desc_close(&self) -> String {
        format!("</{}>", self.role.tag())
    }

    /// Full one-line descriptor.
    pub fn descriptor(&self) -> String {
        format!("{}{}", self.desc_open(), self.desc_close())
    }

    /// Substring match over visible text and alt text.
    pub fn is_match(&self, needle: &str) -> bool {
        self.text.contains(needle) || self.content_description.contains(needle)
    }

    /// Attribute map exposed to match criteria and `get_attributes`.
    pub fn attributes(&self) -> BTreeMap<String, serde_json::Value> {
        let mut map = BTreeMap::new();
        map.insert("id".into(), serde_json::json!(self.id));
        map.insert("resource_id".into(), serde_json::json!(self.short_resource_id()));
        map.insert("class".into(), serde_json::json!(self.short_class_name()));
        map.insert("text".into(), serde_json::json!(self.text));
        map.insert("alt".into(), serde_json::json!(self.content_description));
        map.insert("selected".into(), serde_json::json!(self.selected));
        map.insert("checked".into(), serde_json::json!(self.checked));
        map.insert("scrollable".into(), serde_json::json!(self.scrollable));
        map
    }

    /// Attribute lookup used by XPath predicates, as strings.
    pub fn attribute_str(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.to_string()),
            "resource_id" => Some(self.short_resource_id().to_string()),
            "class" => Some(self.short_class_name().to_string()),
            "text" => Some(self.text.clone()),
            "alt" => Some(self.content_description.clone()),
            "selected" => Some(self.selected.to_string()),
            "checked" => Some(self.checked.to_string()),
            "scrollable" => Some(self.scrollable.to_string()),
            _ => None,
        }
    }
}

/// True for views that take part in rendering at all: visible and not a
/// system bar background.
pub fn is_renderable(view: &View) -> bool {
    view.visible && !is_system_bar(view.resource_id.as_deref())
}

use std::collections::HashSet;

use crate::view::view_model::View;

/// Index-based arena over one observation's flat view array.
///
/// Parent/child links stay raw indices; every accessor is bounds-checked so
/// inconsistent records degrade to "not there" instead of panicking.
#[derive(Debug, Clone, Default)]
pub struct ViewArena {
    views: Vec<View>,
}

impl ViewArena {
    pub fn new(views: Vec<View>) -> Self {
        ViewArena { views }
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&View> {
        self.views.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &View> {
        self.views.iter()
    }

    /// The unique view with parent == -1, if any.
    pub fn root(&self) -> Option<&View> {
        self.views.iter().find(|v| v.parent == -1)
    }

    /// Temp ids of the view's ancestors, nearest first.
    pub fn ancestors(&self, id: usize) -> Vec<usize> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(view) = self.views.get(current) {
            let parent = view.parent;
            if parent < 0 || parent as usize >= self.views.len() {
                break;
            }
            let parent = parent as usize;
            // inconsistent records can form cycles
            if result.contains(&parent) || parent == id {
                break;
            }
            result.push(parent);
            current = parent;
        }
        result
    }

    /// Transitive set of the view's descendant temp ids.
    pub fn descendants(&self, id: usize) -> HashSet<usize> {
        let mut result = HashSet::new();
        let mut stack: Vec<usize> = match self.views.get(id) {
            Some(view) => view.children.clone(),
            None => return result,
        };
        while let Some(child_id) = stack.pop() {
            if child_id >= self.views.len() || !result.insert(child_id) {
                continue;
            }
            stack.extend(self.views[child_id].children.iter().copied());
        }
        result
    }

    /// True if the flag holds on the view itself or any ancestor.
    ///
    /// Clickability and checkability propagate down from containers; the
    /// walk stops at the first carrier or the root.
    pub fn inherited_flag(&self, id: usize, flag: fn(&View) -> bool) -> bool {
        match self.views.get(id) {
            Some(view) if flag(view) => return true,
            Some(_) => {}
            None => return false,
        }
        self.ancestors(id)
            .iter()
            .any(|&a| self.views.get(a).map(flag).unwrap_or(false))
    }
}

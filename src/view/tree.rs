use std::collections::HashSet;

use crate::view::arena::ViewArena;
use crate::view::view_model::View;

/// Nested form of the view hierarchy, deep-copied from the arena.
#[derive(Debug, Clone)]
pub struct ViewNode {
    pub view: View,
    pub children: Vec<ViewNode>,
}

/// Assemble the nested tree from the flat array.
///
/// Empty input or a record set with no root yields `None`; downstream
/// consumers treat that as "no content".
pub fn assemble(arena: &ViewArena) -> Option<ViewNode> {
    let root = arena.root()?;
    let mut visited = HashSet::new();
    visited.insert(root.temp_id);
    Some(build_node(arena, root, &mut visited))
}

fn build_node(arena: &ViewArena, view: &View, visited: &mut HashSet<usize>) -> ViewNode {
    let mut children = Vec::new();
    for &child_id in &view.children {
        // child references outside the array or already copied (a cycle in
        // an inconsistent dump) are skipped
        let Some(child) = arena.get(child_id) else {
            continue;
        };
        if !visited.insert(child_id) {
            continue;
        }
        children.push(build_node(arena, child, visited));
    }
    ViewNode {
        view: view.clone(),
        children,
    }
}

impl ViewNode {
    /// Total number of views in this subtree, root included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(ViewNode::size).sum::<usize>()
    }
}

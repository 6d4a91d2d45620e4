use std::collections::{HashMap, HashSet, VecDeque};

use crate::element::attr::{self, EleAttr};
use crate::element::xpath::{Axis, XPath};
use crate::error::UiError;
use crate::state::state_model::DeviceState;

/// The pruned element tree of one observation.
///
/// Spans only views worth describing, and of those only subtrees that reach
/// at least one valid (descriptive/interactable) leaf. Built fresh from each
/// observation; never mutated after construction.
#[derive(Debug, Clone)]
pub struct ElementTree {
    pub state_key: String,
    pub tag: String,
    eles: HashMap<usize, EleAttr>,
    valid: HashSet<usize>,
    root_id: Option<usize>,
    /// Surviving child lists, document order.
    children: HashMap<usize, Vec<usize>>,
    /// Valid-leaf set per surviving node; never empty.
    leaves: HashMap<usize, HashSet<usize>>,
    /// Preorder over surviving nodes, the document order used by lookups.
    order: Vec<usize>,
}

impl ElementTree {
    /// Two-phase build: breadth-first reconstruction over the ids present in
    /// `eles` (child references to anything else are skipped), then a
    /// bottom-up leaf-set pass that intersects with `valid` and detaches any
    /// subtree whose intersection is empty.
    pub fn build(
        state_key: &str,
        tag: &str,
        eles: HashMap<usize, EleAttr>,
        valid: HashSet<usize>,
        root_id: Option<usize>,
    ) -> Self {
        let mut tree = ElementTree {
            state_key: state_key.to_string(),
            tag: tag.to_string(),
            eles,
            valid,
            root_id: None,
            children: HashMap::new(),
            leaves: HashMap::new(),
            order: Vec::new(),
        };

        let Some(root) = root_id.filter(|id| tree.eles.contains_key(id)) else {
            return tree;
        };

        // phase 1: reachable structure
        let mut raw_children: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut queue = VecDeque::from([root]);
        let mut seen = HashSet::from([root]);
        while let Some(id) = queue.pop_front() {
            let kids: Vec<usize> = tree.eles[&id]
                .children
                .iter()
                .copied()
                .filter(|c| tree.eles.contains_key(c) && seen.insert(*c))
                .collect();
            queue.extend(kids.iter().copied());
            raw_children.insert(id, kids);
        }

        // phase 2: leaf sets, intersect with valid, drop dead branches
        let mut leaf_sets: HashMap<usize, HashSet<usize>> = HashMap::new();
        collect_leaves(root, &raw_children, &mut leaf_sets);

        if tree.prune(root, &raw_children, &leaf_sets) {
            tree.root_id = Some(root);
            tree.fill_order(root);
        }
        tree
    }

    /// Returns whether the node survives. A surviving node's recorded leaf
    /// set is its intersection with the valid set, guaranteed non-empty.
    fn prune(
        &mut self,
        id: usize,
        raw_children: &HashMap<usize, Vec<usize>>,
        leaf_sets: &HashMap<usize, HashSet<usize>>,
    ) -> bool {
        let in_set: HashSet<usize> = leaf_sets
            .get(&id)
            .map(|l| l.intersection(&self.valid).copied().collect())
            .unwrap_or_default();
        if in_set.is_empty() {
            return false;
        }

        let mut kept = Vec::new();
        for &child in raw_children.get(&id).into_iter().flatten() {
            if self.prune(child, raw_children, leaf_sets) {
                kept.push(child);
            }
        }
        self.children.insert(id, kept);
        self.leaves.insert(id, in_set);
        true
    }

    fn fill_order(&mut self, id: usize) {
        self.order.push(id);
        let kids = self.children.get(&id).cloned().unwrap_or_default();
        for child in kids {
            self.fill_order(child);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root_id.is_none()
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Ids of all surviving nodes, document order.
    pub fn ids(&self) -> &[usize] {
        &self.order
    }

    pub fn root(&self) -> Option<&EleAttr> {
        self.root_id.and_then(|id| self.eles.get(&id))
    }

    pub fn get(&self, id: usize) -> Option<&EleAttr> {
        if self.leaves.contains_key(&id) {
            self.eles.get(&id)
        } else {
            None
        }
    }

    pub fn contains(&self, id: usize) -> bool {
        self.leaves.contains_key(&id)
    }

    /// Valid-leaf set of a surviving node.
    pub fn leaf_set(&self, id: usize) -> Option<&HashSet<usize>> {
        self.leaves.get(&id)
    }

    /// Surviving children of a node, document order.
    pub fn children_of(&self, id: usize) -> Vec<&EleAttr> {
        self.children
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|c| self.eles.get(c))
            .collect()
    }

    pub fn child_by_index(&self, id: usize, index: usize) -> Option<&EleAttr> {
        self.children
            .get(&id)
            .and_then(|kids| kids.get(index))
            .and_then(|c| self.eles.get(c))
    }

    /// First element matching the expression, in document order. When more
    /// than one matches, the first wins; ambiguity is a documented policy
    /// here, not an error.
    pub fn find(&self, xpath: &XPath) -> Option<&EleAttr> {
        self.find_all(xpath).into_iter().next()
    }

    /// All elements matching the expression, document order.
    pub fn find_all(&self, xpath: &XPath) -> Vec<&EleAttr> {
        let Some(root) = self.root_id else {
            return Vec::new();
        };
        if xpath.steps.is_empty() {
            return Vec::new();
        }

        // context starts as the root; each step maps it to the next set
        let mut context: Vec<usize> = vec![root];
        for (i, step) in xpath.steps.iter().enumerate() {
            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for &ctx in &context {
                let candidates: Vec<usize> = match step.axis {
                    Axis::Descendant => {
                        // descendant-or-self for the leading step, descendants after
                        if i == 0 {
                            self.preorder_from(ctx)
                        } else {
                            let mut d = self.preorder_from(ctx);
                            d.retain(|&n| n != ctx);
                            d
                        }
                    }
                    Axis::Child => self
                        .children
                        .get(&ctx)
                        .cloned()
                        .unwrap_or_default(),
                };
                for cand in candidates {
                    if seen.contains(&cand) {
                        continue;
                    }
                    if let Some(ele) = self.eles.get(&cand) {
                        if step.matches(ele) {
                            seen.insert(cand);
                            next.push(cand);
                        }
                    }
                }
            }
            context = next;
            if context.is_empty() {
                break;
            }
        }

        // re-sort into global document order
        let rank: HashMap<usize, usize> =
            self.order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        context.sort_by_key(|id| rank.get(id).copied().unwrap_or(usize::MAX));
        context.iter().filter_map(|id| self.eles.get(id)).collect()
    }

    /// Parse-and-find convenience used by the resolution engine.
    pub fn find_expr(&self, expr: &str) -> Result<Option<&EleAttr>, UiError> {
        let xpath = XPath::parse(expr)?;
        Ok(self.find(&xpath))
    }

    fn preorder_from(&self, id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            if let Some(kids) = self.children.get(&n) {
                for &k in kids.iter().rev() {
                    stack.push(k);
                }
            }
        }
        out
    }

    /// Visible text of an element: its text, falling back to alt text.
    pub fn text_of(&self, ele: &EleAttr) -> String {
        if !ele.text.is_empty() {
            ele.text.clone()
        } else {
            ele.content_description.clone()
        }
    }

    /// Indented open/close markup over the whole tree.
    pub fn render(&self) -> String {
        let Some(root) = self.root_id else {
            return String::new();
        };
        let mut out = String::new();
        self.render_node(root, 0, &mut out);
        out
    }

    fn render_node(&self, id: usize, depth: usize, out: &mut String) {
        let Some(ele) = self.eles.get(&id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let kids = self.children.get(&id).cloned().unwrap_or_default();
        if kids.is_empty() {
            out.push_str(&format!("{}{}\n", indent, ele.descriptor()));
            return;
        }
        out.push_str(&format!("{}{}\n", indent, ele.desc_open()));
        for child in kids {
            self.render_node(child, depth + 1, out);
        }
        out.push_str(&format!("{}{}\n", indent, ele.desc_close()));
    }
}

fn collect_leaves(
    id: usize,
    raw_children: &HashMap<usize, Vec<usize>>,
    leaf_sets: &mut HashMap<usize, HashSet<usize>>,
) -> HashSet<usize> {
    let kids = raw_children.get(&id).cloned().unwrap_or_default();
    let set: HashSet<usize> = if kids.is_empty() {
        HashSet::from([id])
    } else {
        let mut merged = HashSet::new();
        for child in kids {
            merged.extend(collect_leaves(child, raw_children, leaf_sets));
        }
        merged
    };
    leaf_sets.insert(id, set.clone());
    set
}

/// Text representation of one state: the flat descriptor list handed to a
/// decision-making caller, the temp ids behind each line, and the pruned
/// tree the resolution engine works against.
#[derive(Debug, Clone)]
pub struct Rendering {
    pub description: String,
    pub indexed: Vec<usize>,
    pub tree: ElementTree,
}

impl Rendering {
    pub fn build(state: &DeviceState) -> Self {
        let views = state.views();
        let mut eles: HashMap<usize, EleAttr> = HashMap::new();
        let mut indexed = Vec::new();
        let mut descs = Vec::new();

        for view in views.iter() {
            if !attr::is_renderable(view) {
                continue;
            }
            let mut ele = attr::classify(views, view);
            if ele.descriptive {
                ele.local_id = Some(indexed.len());
                indexed.push(ele.id);
                descs.push(ele.descriptor());
            }
            eles.insert(ele.id, ele);
        }

        let valid: HashSet<usize> = indexed.iter().copied().collect();
        let root_id = views.root().map(|r| r.temp_id);
        let tree = ElementTree::build(state.own_state_str(), &state.tag, eles, valid, root_id);

        Rendering {
            description: descs.join("\n"),
            indexed,
            tree,
        }
    }
}

use droid_probe::element::xpath::XPath;
use droid_probe::state::state_model::DeviceState;

use crate::common::fixtures::{observation, save_and_list_screen, view};

mod common;

// =========================================================================
// Pruning invariants
// =========================================================================

#[test]
fn no_surviving_node_has_an_empty_leaf_set() {
    let state = DeviceState::from_observation(save_and_list_screen());
    let tree = &state.rendering().tree;

    assert!(!tree.is_empty());
    for &id in tree.ids() {
        let leaves = tree.leaf_set(id).expect("surviving node must have a leaf set");
        assert!(!leaves.is_empty(), "node {} has an empty leaf set", id);
    }
}

#[test]
fn leaf_nodes_record_their_own_id() {
    let state = DeviceState::from_observation(save_and_list_screen());
    let tree = &state.rendering().tree;

    for &id in tree.ids() {
        if tree.children_of(id).is_empty() {
            assert_eq!(
                tree.leaf_set(id).map(|l| l.contains(&id)),
                Some(true),
                "leaf {} must carry itself",
                id
            );
        }
    }
}

#[test]
fn branches_without_descriptive_leaves_are_dropped() {
    // view 3 is a bare container chain with nothing describable below it
    let state = DeviceState::from_observation(observation(
        "com.app.Main",
        vec![
            view(0, "android.widget.FrameLayout").parent(-1).children(&[1, 3]).build(),
            view(1, "android.widget.LinearLayout").parent(0).children(&[2]).build(),
            view(2, "android.widget.TextView").parent(1).text("Visible row").build(),
            view(3, "android.widget.LinearLayout").parent(0).children(&[4]).build(),
            view(4, "android.widget.ImageView").parent(3).build(),
        ],
    ));
    let tree = &state.rendering().tree;

    assert!(tree.contains(2), "descriptive leaf survives");
    assert!(tree.contains(1), "container over a descriptive leaf survives");
    assert!(!tree.contains(3), "dead branch is detached");
    assert!(!tree.contains(4), "nothing below a dead branch survives");
}

#[test]
fn children_referencing_missing_views_are_skipped() {
    let state = DeviceState::from_observation(observation(
        "com.app.Main",
        vec![
            view(0, "android.widget.FrameLayout").parent(-1).children(&[1, 99]).build(),
            view(1, "android.widget.TextView").parent(0).text("Only child").build(),
        ],
    ));
    let tree = &state.rendering().tree;

    assert!(tree.contains(1));
    assert_eq!(tree.node_count(), 2, "root plus the one real child");
}

#[test]
fn empty_observation_builds_an_empty_tree() {
    let state = DeviceState::from_observation(observation("com.app.Main", vec![]));
    let tree = &state.rendering().tree;

    assert!(tree.is_empty());
    assert_eq!(tree.render(), "");
}

// =========================================================================
// Rendering
// =========================================================================

#[test]
fn render_nests_children_with_indentation() {
    let state = DeviceState::from_observation(save_and_list_screen());
    let rendered = state.rendering().tree.render();

    assert!(rendered.contains("<scrollbar id='2'"), "rendered={}", rendered);
    assert!(
        rendered.contains("  <scrollbar") || rendered.starts_with("<"),
        "children are indented under their parent"
    );
    assert!(rendered.contains(">Item 2</p>"), "rendered={}", rendered);
    assert!(rendered.contains("</scrollbar>"), "rendered={}", rendered);
}

#[test]
fn flat_description_lists_descriptive_views_in_order() {
    let state = DeviceState::from_observation(save_and_list_screen());
    let rendering = state.rendering();

    assert_eq!(rendering.indexed, vec![1, 2, 3, 4, 5]);
    let lines: Vec<&str> = rendering.description.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].contains("Save"));
    assert!(lines[4].contains("Item 3"));
}

// =========================================================================
// XPath lookup
// =========================================================================

#[test]
fn find_by_resource_id() {
    let state = DeviceState::from_observation(save_and_list_screen());
    let tree = &state.rendering().tree;

    let xpath = XPath::parse("//button[@resource_id='save_btn']").unwrap();
    let ele = tree.find(&xpath).expect("save button should resolve");
    assert_eq!(ele.id, 1);
    assert_eq!(ele.text, "Save");
}

#[test]
fn ambiguous_match_takes_first_in_document_order() {
    let state = DeviceState::from_observation(save_and_list_screen());
    let tree = &state.rendering().tree;

    let xpath = XPath::parse("//scrollbar/p").unwrap();
    let all = tree.find_all(&xpath);
    assert_eq!(all.len(), 3);
    assert_eq!(tree.find(&xpath).map(|e| e.id), Some(3), "first item wins");
}

#[test]
fn child_steps_constrain_the_path() {
    let state = DeviceState::from_observation(save_and_list_screen());
    let tree = &state.rendering().tree;

    let nested = XPath::parse("//scrollbar[@resource_id='item_list']/p[@text='Item 2']").unwrap();
    assert_eq!(tree.find(&nested).map(|e| e.id), Some(4));

    let wrong = XPath::parse("//button/p").unwrap();
    assert!(tree.find(&wrong).is_none(), "the button has no child items");
}

#[test]
fn wildcard_matches_any_role() {
    let state = DeviceState::from_observation(save_and_list_screen());
    let tree = &state.rendering().tree;

    let xpath = XPath::parse("//*[@id='4']").unwrap();
    assert_eq!(tree.find(&xpath).map(|e| e.id), Some(4));
}

#[test]
fn malformed_expressions_are_invalid_selectors() {
    assert!(XPath::parse("").is_err());
    assert!(XPath::parse("button").is_err(), "missing axis");
    assert!(XPath::parse("//button[@id=5]").is_err(), "unquoted value");
    assert!(XPath::parse("//button[@id='5'").is_err(), "unterminated predicate");
}

#[test]
fn children_are_exposed_in_document_order() {
    let state = DeviceState::from_observation(save_and_list_screen());
    let tree = &state.rendering().tree;

    let ids: Vec<usize> = tree.children_of(2).iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![3, 4, 5]);
    assert_eq!(tree.child_by_index(2, 1).map(|e| e.id), Some(4));
    assert!(tree.child_by_index(2, 3).is_none());
}

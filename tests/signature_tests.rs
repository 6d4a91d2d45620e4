use std::sync::Arc;

use droid_probe::state::signature::{content_free_view_signature, view_signature};
use droid_probe::state::state_model::DeviceState;

use crate::common::fixtures::{observation, view};

mod common;

// =========================================================================
// Per-view signatures
// =========================================================================

#[test]
fn view_signature_encodes_true_flags_only() {
    let v = view(0, "android.widget.CheckBox")
        .resource_id("com.app:id/opt")
        .text("Remember me")
        .checked()
        .build();
    let sig = view_signature(&v);

    assert!(sig.contains("[class]android.widget.CheckBox"), "sig={}", sig);
    assert!(sig.contains("[text]Remember me"), "sig={}", sig);
    assert!(sig.ends_with("[enabled,checked,]"), "sig={}", sig);
}

#[test]
fn long_text_is_replaced_by_sentinel() {
    let short = view(0, "android.widget.TextView").text("short").build();
    let long_a = view(0, "android.widget.TextView")
        .text(&"a".repeat(60))
        .build();
    let long_b = view(0, "android.widget.TextView")
        .text(&"b".repeat(80))
        .build();

    assert!(view_signature(&short).contains("[text]short"));
    assert!(view_signature(&long_a).contains("[text]None"), "over-limit text collapses");
    assert_eq!(
        view_signature(&long_a),
        view_signature(&long_b),
        "two different over-limit texts must fingerprint identically"
    );
}

#[test]
fn content_free_signature_omits_text_and_flags() {
    let v = view(0, "android.widget.Button")
        .resource_id("com.app:id/go")
        .text("Go")
        .checked()
        .selected()
        .build();
    let sig = content_free_view_signature(&v);

    assert!(!sig.contains("Go"), "sig={}", sig);
    assert!(!sig.contains("checked"), "sig={}", sig);
    assert!(sig.contains("[class]android.widget.Button"));
    assert!(sig.contains("[visible]true"));
}

// =========================================================================
// Per-state signatures
// =========================================================================

#[test]
fn state_signature_is_order_independent() {
    let views = vec![
        view(0, "android.widget.FrameLayout").parent(-1).children(&[1, 2]).build(),
        view(1, "android.widget.Button").text("Save").clickable().parent(0).build(),
        view(2, "android.widget.TextView").text("Title").parent(0).build(),
    ];
    let mut reversed = views.clone();
    reversed.reverse();

    let a = DeviceState::from_observation(observation("com.app.Main", views));
    let b = DeviceState::from_observation(observation("com.app.Main", reversed));

    assert_eq!(a.own_state_str(), b.own_state_str(), "content signature");
    assert_eq!(a.own_structure_str(), b.own_structure_str(), "content-free signature");
}

#[test]
fn content_free_signature_survives_text_changes() {
    let before = DeviceState::from_observation(observation(
        "com.app.Main",
        vec![
            view(0, "android.widget.FrameLayout").parent(-1).children(&[1]).build(),
            view(1, "android.widget.TextView").text("3 unread messages").parent(0).build(),
        ],
    ));
    let after = DeviceState::from_observation(observation(
        "com.app.Main",
        vec![
            view(0, "android.widget.FrameLayout").parent(-1).children(&[1]).build(),
            view(1, "android.widget.TextView").text("4 unread messages").parent(0).build(),
        ],
    ));

    assert_eq!(
        before.own_structure_str(),
        after.own_structure_str(),
        "text-only change must not move the content-free signature"
    );
    assert_ne!(
        before.own_state_str(),
        after.own_state_str(),
        "text change must move the content signature"
    );
}

#[test]
fn content_free_signature_tracks_structure_changes() {
    let base = |class: &str, rid: &str, visible: bool| {
        let mut b = view(1, class).resource_id(rid).parent(0);
        if !visible {
            b = b.invisible();
        }
        DeviceState::from_observation(observation(
            "com.app.Main",
            vec![
                view(0, "android.widget.FrameLayout").parent(-1).children(&[1]).build(),
                b.build(),
            ],
        ))
    };

    let original = base("android.widget.TextView", "com.app:id/a", true);
    let class_changed = base("android.widget.Button", "com.app:id/a", true);
    let rid_changed = base("android.widget.TextView", "com.app:id/b", true);
    let visibility_changed = base("android.widget.TextView", "com.app:id/a", false);

    assert_ne!(original.own_structure_str(), class_changed.own_structure_str());
    assert_ne!(original.own_structure_str(), rid_changed.own_structure_str());
    assert_ne!(original.own_structure_str(), visibility_changed.own_structure_str());
}

#[test]
fn duplicate_views_do_not_change_the_signature() {
    let one = DeviceState::from_observation(observation(
        "com.app.Main",
        vec![
            view(0, "android.widget.FrameLayout").parent(-1).children(&[1]).build(),
            view(1, "android.widget.TextView").text("Row").parent(0).build(),
        ],
    ));
    let two = DeviceState::from_observation(observation(
        "com.app.Main",
        vec![
            view(0, "android.widget.FrameLayout").parent(-1).children(&[1, 2]).build(),
            view(1, "android.widget.TextView").text("Row").parent(0).build(),
            view(2, "android.widget.TextView").text("Row").parent(0).build(),
        ],
    ));

    // signatures are a set: identical rows collapse
    assert_eq!(one.own_state_str(), two.own_state_str());
}

#[test]
fn activity_is_part_of_the_fingerprint() {
    let views = vec![view(0, "android.widget.FrameLayout").parent(-1).build()];
    let a = DeviceState::from_observation(observation("com.app.Main", views.clone()));
    let b = DeviceState::from_observation(observation("com.app.Settings", views));

    assert_ne!(a.own_state_str(), b.own_state_str());
}

// =========================================================================
// Popup chaining
// =========================================================================

fn popup_views() -> Vec<droid_probe::view::view_model::View> {
    vec![
        view(0, "android.widget.FrameLayout")
            .parent(-1)
            .children(&[1])
            .bounds(100, 600, 980, 1300)
            .build(),
        view(1, "android.widget.Button")
            .text("Confirm")
            .clickable()
            .parent(0)
            .bounds(150, 1100, 500, 1250)
            .build(),
    ]
}

#[test]
fn undersized_root_flags_a_popup() {
    let popup = DeviceState::from_observation(observation("com.app.Main", popup_views()));
    assert!(popup.is_popup, "root smaller than the screen is a popup");

    let full = DeviceState::from_observation(observation(
        "com.app.Main",
        vec![view(0, "android.widget.FrameLayout").parent(-1).build()],
    ));
    assert!(!full.is_popup, "full-screen root is not a popup");
}

#[test]
fn identical_popups_over_different_bases_compare_differently() {
    let base_a = Arc::new(DeviceState::from_observation(observation(
        "com.app.Main",
        vec![
            view(0, "android.widget.FrameLayout").parent(-1).children(&[1]).build(),
            view(1, "android.widget.TextView").text("Inbox").parent(0).build(),
        ],
    )));
    let base_b = Arc::new(DeviceState::from_observation(observation(
        "com.app.Settings",
        vec![
            view(0, "android.widget.FrameLayout").parent(-1).children(&[1]).build(),
            view(1, "android.widget.TextView").text("Settings").parent(0).build(),
        ],
    )));

    let popup_a = DeviceState::from_observation(observation("com.app.Main", popup_views()));
    let popup_b = DeviceState::from_observation(observation("com.app.Main", popup_views()));
    popup_a.set_parent(Arc::clone(&base_a));
    popup_b.set_parent(Arc::clone(&base_b));

    assert_eq!(
        popup_a.own_state_str(),
        popup_b.own_state_str(),
        "own content is identical"
    );
    assert_ne!(
        popup_a.state_str(),
        popup_b.state_str(),
        "chained signatures must differ across different bases"
    );
    assert!(
        popup_a.state_str().starts_with(&base_a.state_str()),
        "chained form is parent/own"
    );
}

#[test]
fn popup_parent_is_set_at_most_once() {
    let base_a = Arc::new(DeviceState::from_observation(observation(
        "com.app.Main",
        vec![view(0, "android.widget.FrameLayout").parent(-1).build()],
    )));
    let base_b = Arc::new(DeviceState::from_observation(observation(
        "com.app.Settings",
        vec![view(0, "android.widget.FrameLayout").parent(-1).build()],
    )));

    let popup = DeviceState::from_observation(observation("com.app.Main", popup_views()));
    popup.set_parent(Arc::clone(&base_a));
    let chained = popup.state_str();
    popup.set_parent(base_b);

    assert_eq!(popup.state_str(), chained, "second set_parent is a no-op");
}

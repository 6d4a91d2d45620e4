use droid_probe::element::attr::{Role, classify, escape_markup};
use droid_probe::view::arena::ViewArena;

use crate::common::fixtures::view;

mod common;

fn arena_of(views: Vec<droid_probe::view::view_model::View>) -> ViewArena {
    ViewArena::new(views)
}

// =========================================================================
// Role priority
// =========================================================================

#[test]
fn editable_beats_clickable() {
    let arena = arena_of(vec![
        view(0, "android.widget.EditText")
            .parent(-1)
            .text("Search")
            .editable()
            .clickable()
            .build(),
    ]);
    let ele = classify(&arena, arena.get(0).unwrap());

    assert_eq!(ele.role, Role::Input, "editable+clickable must classify as input");
    assert!(ele.actions.contains(&"set_text".to_string()));
}

#[test]
fn checkable_beats_clickable_and_scrollable() {
    let arena = arena_of(vec![
        view(0, "android.widget.Switch")
            .parent(-1)
            .text("Dark mode")
            .checkable()
            .clickable()
            .scrollable()
            .build(),
    ]);
    let ele = classify(&arena, arena.get(0).unwrap());

    assert_eq!(ele.role, Role::Checkbox);
    assert!(ele.actions.contains(&"select".to_string()));
    assert!(ele.actions.contains(&"unselect".to_string()));
    assert!(
        !ele.actions.contains(&"touch".to_string()),
        "checkable replaces touch with select/unselect"
    );
}

#[test]
fn clickable_beats_scrollable() {
    let arena = arena_of(vec![
        view(0, "android.widget.Button")
            .parent(-1)
            .text("Load more")
            .clickable()
            .scrollable()
            .build(),
    ]);
    assert_eq!(classify(&arena, arena.get(0).unwrap()).role, Role::Button);
}

#[test]
fn scrollable_without_other_flags_is_a_scrollbar() {
    let arena = arena_of(vec![
        view(0, "android.widget.ListView").parent(-1).scrollable().build(),
    ]);
    let ele = classify(&arena, arena.get(0).unwrap());

    assert_eq!(ele.role, Role::Scrollbar);
    assert!(ele.descriptive, "scrollability alone makes a view descriptive");
    assert!(ele.actions.contains(&"scroll up".to_string()));
    assert!(ele.actions.contains(&"scroll down".to_string()));
    assert!(!ele.actions.contains(&"touch".to_string()));
}

// =========================================================================
// Ancestor-propagated capabilities
// =========================================================================

#[test]
fn clickability_is_inherited_from_the_nearest_ancestor() {
    let arena = arena_of(vec![
        view(0, "android.widget.LinearLayout")
            .parent(-1)
            .children(&[1])
            .clickable()
            .build(),
        view(1, "android.widget.TextView").parent(0).text("Open").build(),
    ]);
    let ele = classify(&arena, arena.get(1).unwrap());

    assert_eq!(ele.role, Role::Button, "label inside a clickable row acts as a button");
    assert!(ele.actions.contains(&"touch".to_string()));
}

#[test]
fn scrollability_is_never_inherited() {
    let arena = arena_of(vec![
        view(0, "android.widget.ScrollView")
            .parent(-1)
            .children(&[1])
            .scrollable()
            .build(),
        view(1, "android.widget.TextView").parent(0).text("Row").build(),
    ]);
    assert_eq!(
        classify(&arena, arena.get(1).unwrap()).role,
        Role::Paragraph,
        "a text row inside a scroll container is plain text"
    );
}

#[test]
fn long_clickable_adds_long_touch() {
    let arena = arena_of(vec![
        view(0, "android.widget.Button")
            .parent(-1)
            .text("Save")
            .clickable()
            .long_clickable()
            .build(),
    ]);
    let actions = classify(&arena, arena.get(0).unwrap()).actions;

    assert!(actions.contains(&"touch".to_string()));
    assert!(actions.contains(&"long_touch".to_string()));
}

// =========================================================================
// Default role touch rules
// =========================================================================

#[test]
fn plain_leaf_keeps_fallback_touch() {
    let arena = arena_of(vec![
        view(0, "android.widget.TextView").parent(-1).text("Hello").build(),
    ]);
    let ele = classify(&arena, arena.get(0).unwrap());

    assert_eq!(ele.role, Role::Paragraph);
    assert_eq!(ele.actions, vec!["touch".to_string()]);
}

#[test]
fn plain_container_over_actionable_content_loses_touch() {
    let arena = arena_of(vec![
        view(0, "android.widget.LinearLayout")
            .parent(-1)
            .children(&[1])
            .text("Section")
            .build(),
        view(1, "android.widget.Button").parent(0).text("Go").clickable().build(),
    ]);
    let ele = classify(&arena, arena.get(0).unwrap());

    assert_eq!(ele.role, Role::Paragraph);
    assert!(
        ele.actions.is_empty(),
        "a text container over a button is not itself tappable, got {:?}",
        ele.actions
    );
}

// =========================================================================
// Descriptor rendering
// =========================================================================

#[test]
fn descriptor_carries_identity_and_status() {
    // temp id 7: the descriptor's id is the view's temp id, not its
    // position in this arena
    let v = view(7, "android.widget.CheckBox")
        .parent(-1)
        .resource_id("com.app:id/remember_me")
        .text("Remember me")
        .content_description("Remember login")
        .checkable()
        .checked()
        .bounds(10, 20, 400, 90)
        .build();
    let arena = arena_of(vec![v.clone()]);
    let desc = classify(&arena, &v).descriptor();

    assert!(desc.starts_with("<checkbox id='7'"), "desc={}", desc);
    assert!(desc.contains("resource_id='remember_me'"), "last path segment only: {}", desc);
    assert!(desc.contains("alt='Remember login'"), "desc={}", desc);
    assert!(desc.contains("status='selected'"), "desc={}", desc);
    assert!(desc.contains("bound_box=10,20,400,90"), "desc={}", desc);
    assert!(desc.contains(">Remember me</checkbox>"), "desc={}", desc);
}

#[test]
fn descriptor_escapes_markup_reserved_characters() {
    let arena = arena_of(vec![
        view(0, "android.widget.TextView")
            .parent(-1)
            .text("a < b & c > d")
            .content_description("say \"hi\" & 'bye'")
            .build(),
    ]);
    let desc = classify(&arena, arena.get(0).unwrap()).descriptor();

    assert!(desc.contains("a &lt; b &amp; c &gt; d"), "desc={}", desc);
    assert!(desc.contains("say &quot;hi&quot; &amp; &apos;bye&apos;"), "desc={}", desc);
    assert!(
        !desc.contains("a < b"),
        "raw reserved characters must never reach the descriptor: {}",
        desc
    );
}

#[test]
fn escape_markup_is_total() {
    assert_eq!(escape_markup("&<>\"'"), "&amp;&lt;&gt;&quot;&apos;");
    assert_eq!(escape_markup("plain"), "plain");
}

#[test]
fn overlong_text_is_truncated_in_the_descriptor() {
    let arena = arena_of(vec![
        view(0, "android.widget.TextView")
            .parent(-1)
            .text(&"x".repeat(80))
            .build(),
    ]);
    let ele = classify(&arena, arena.get(0).unwrap());

    assert_eq!(ele.text.chars().count(), 50);
}

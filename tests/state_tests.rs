use droid_probe::device::RawObservation;
use droid_probe::state::state_model::DeviceState;

use crate::common::fixtures::{observation, save_and_list_screen, view};

mod common;

#[test]
fn search_content_collects_resource_ids_and_texts() {
    let state = DeviceState::from_observation(save_and_list_screen());

    assert!(state.search_content.contains("com.example.notes:id/save_btn"));
    assert!(state.search_content.contains("Item 2"));
    assert!(state.search_content.contains("Save"));
}

#[test]
fn activity_short_name_is_the_last_segment() {
    let state = DeviceState::from_observation(observation(
        "com.example.notes.MainActivity",
        vec![view(0, "android.widget.FrameLayout").parent(-1).build()],
    ));
    assert_eq!(state.activity_short_name(), "MainActivity");
}

#[test]
fn app_activity_depth_searches_the_stack() {
    let mut raw = observation(
        "com.example.notes.MainActivity",
        vec![view(0, "android.widget.FrameLayout").parent(-1).build()],
    );
    raw.activity_stack = vec![
        "com.android.launcher.Home".into(),
        "com.example.notes.MainActivity".into(),
    ];
    let state = DeviceState::from_observation(raw);

    assert_eq!(state.app_activity_depth("com.example.notes"), 1);
    assert_eq!(state.app_activity_depth("com.android.launcher"), 0);
    assert_eq!(state.app_activity_depth("com.other.app"), -1);
}

#[test]
fn states_compare_by_signature() {
    let a = DeviceState::from_observation(save_and_list_screen());
    let b = DeviceState::from_observation(save_and_list_screen());
    let c = DeviceState::from_observation(observation(
        "com.example.notes.MainActivity",
        vec![view(0, "android.widget.FrameLayout").parent(-1).build()],
    ));

    assert!(!a.is_different_from(&b), "same content, same fingerprint");
    assert!(a.is_different_from(&c));
}

#[test]
fn missing_tag_defaults_to_the_fingerprint() {
    let state = DeviceState::from_observation(save_and_list_screen());
    assert_eq!(state.tag, format!("state_{}", state.own_state_str()));

    let tagged = RawObservation {
        tag: Some("2023-06-01_120000".into()),
        ..save_and_list_screen()
    };
    let state = DeviceState::from_observation(tagged);
    assert_eq!(state.tag, "2023-06-01_120000");
}

#[test]
fn signature_key_is_a_short_prefix() {
    let state = DeviceState::from_observation(save_and_list_screen());
    assert_eq!(state.own_state_str().len(), 6);
    assert_eq!(state.own_structure_str().len(), 6);
}

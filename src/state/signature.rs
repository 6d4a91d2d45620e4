use sha1::{Digest, Sha1};

use crate::view::view_model::View;

/// Text longer than this is treated as absent in signatures; long free text
/// is volatile and would make otherwise-identical screens look distinct.
pub const MAX_SIG_TEXT_LEN: usize = 50;

const TEXT_SENTINEL: &str = "None";

/// Content signature of a single view.
///
/// Field order is fixed; the trailing bracket lists capability flags that
/// are appended only when true, so `[enabled,,]` and `[,,]` differ.
pub fn view_signature(view: &View) -> String {
    let text = match &view.text {
        Some(t) if t.len() <= MAX_SIG_TEXT_LEN => t.as_str(),
        _ => TEXT_SENTINEL,
    };
    format!(
        "[class]{}[resource_id]{}[visible]{}[text]{}[{},{},{}]",
        view.class.as_deref().unwrap_or("None"),
        view.resource_id.as_deref().unwrap_or("None"),
        view.visible,
        text,
        key_if_true(view.enabled, "enabled"),
        key_if_true(view.checked, "checked"),
        key_if_true(view.selected, "selected"),
    )
}

/// Content-free signature: structure, class, and visibility only.
pub fn content_free_view_signature(view: &View) -> String {
    format!(
        "[class]{}[resource_id]{}[visible]{}",
        view.class.as_deref().unwrap_or("None"),
        view.resource_id.as_deref().unwrap_or("None"),
        view.visible,
    )
}

fn key_if_true(flag: bool, key: &'static str) -> &'static str {
    if flag { key } else { "" }
}

/// Hash of the whole state from per-view signatures.
///
/// Signatures are de-duplicated and sorted before joining, so the
/// fingerprint is independent of the transport's (non-deterministic) view
/// ordering.
pub fn state_hash(activity: &str, view_signatures: impl IntoIterator<Item = String>) -> String {
    let mut sigs: Vec<String> = view_signatures
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    sigs.sort();
    sigs.dedup();
    let raw = format!("{}{{{}}}", activity, sigs.join(","));
    text_fingerprint(&raw)
}

/// Hex digest of arbitrary text.
pub fn text_fingerprint(text: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Short comparison key. Collisions over a test session are accepted as
/// practically negligible.
pub fn signature_key(hash: &str) -> String {
    hash.chars().take(6).collect()
}

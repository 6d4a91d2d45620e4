use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::device::event::InputEvent;
use crate::device::{Device, RawObservation};
use crate::error::UiError;

/// A device backed by a pre-recorded sequence of observation frames.
///
/// `observe` returns the current frame; every dispatched action advances to
/// the next frame (the last frame repeats once the recording runs out).
/// Dispatched events are kept behind a shared handle so callers can inspect
/// them after a session has taken ownership of the device.
pub struct ReplayDevice {
    frames: Vec<RawObservation>,
    cursor: usize,
    dispatched: Arc<Mutex<Vec<InputEvent>>>,
}

impl ReplayDevice {
    pub fn new(frames: Vec<RawObservation>) -> Self {
        ReplayDevice {
            frames,
            cursor: 0,
            dispatched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Load `*.json` observation frames from a directory, sorted by filename.
    pub fn from_dir(dir: &Path) -> Result<Self, UiError> {
        let entries = std::fs::read_dir(dir).map_err(|e| UiError::Io {
            context: format!("reading frame directory {}", dir.display()),
            source: e,
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
            .collect();
        paths.sort();

        let mut frames = Vec::new();
        for path in paths {
            let content = std::fs::read_to_string(&path).map_err(|e| UiError::Io {
                context: format!("reading frame {}", path.display()),
                source: e,
            })?;
            let frame: RawObservation =
                serde_json::from_str(&content).map_err(|e| UiError::JsonParse {
                    context: format!("frame {}", path.display()),
                    source: e,
                })?;
            frames.push(frame);
        }

        if frames.is_empty() {
            return Err(UiError::Device(format!(
                "no observation frames found in {}",
                dir.display()
            )));
        }
        Ok(ReplayDevice::new(frames))
    }

    /// Shared handle onto the dispatched-event log.
    pub fn action_log(&self) -> Arc<Mutex<Vec<InputEvent>>> {
        Arc::clone(&self.dispatched)
    }

    pub fn frames_remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.cursor + 1)
    }
}

impl Device for ReplayDevice {
    fn observe(&mut self) -> Result<RawObservation, UiError> {
        self.frames
            .get(self.cursor)
            .cloned()
            .ok_or_else(|| UiError::Device("replay device has no frames".into()))
    }

    fn dispatch(&mut self, event: &InputEvent) -> Result<(), UiError> {
        if self.frames.is_empty() {
            return Err(UiError::Device("replay device has no frames".into()));
        }
        if let Ok(mut log) = self.dispatched.lock() {
            log.push(event.clone());
        }
        if self.cursor + 1 < self.frames.len() {
            self.cursor += 1;
        }
        Ok(())
    }
}

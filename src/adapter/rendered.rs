//! Click-to-view wiring for file entries rendered by the widget.
//!
//! The rendering layer reports each entry through [`RenderedFiles::file_rendered`]
//! as soon as it is on screen; no polling or mutation observation is involved.

use std::collections::HashMap;

/// Text the widget shows for one rendered file entry.
#[derive(Debug, Clone, Default)]
pub struct FileChip {
    /// Stable key of the entry within its widget instance.
    pub key: String,
    pub legend: Option<String>,
    pub info_main: Option<String>,
    pub status_main: Option<String>,
    /// Filename the widget holds for the entry, if any.
    pub file_name: Option<String>,
    /// Storage name, once the server has acknowledged the file.
    pub server_id: Option<String>,
}

fn clean(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|s| !s.is_empty())
}

impl FileChip {
    /// Human-readable filename: legend, then main info text, then the status
    /// text when it looks like a filename, then the widget's own filename.
    pub fn display_name(&self) -> Option<String> {
        clean(self.legend.as_deref())
            .or_else(|| clean(self.info_main.as_deref()))
            .or_else(|| clean(self.status_main.as_deref()).filter(|s| s.contains('.')))
            .or_else(|| clean(self.file_name.as_deref()))
            .map(str::to_string)
    }

    /// What the viewer is opened with: the storage name when known, since
    /// the view route resolves files by storage name only.
    pub fn view_target(&self) -> Option<String> {
        clean(self.server_id.as_deref())
            .map(str::to_string)
            .or_else(|| self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// Anywhere on the entry except its controls.
    Body,
    /// Remove/revert/retry buttons; these keep their own behaviour.
    ActionButton,
}

/// Entries wired for click-to-view, keyed by chip key.
#[derive(Debug, Default)]
pub struct RenderedFiles {
    wired: HashMap<String, String>,
}

impl RenderedFiles {
    /// Wires a rendered entry once per key. An entry wired before the server
    /// acknowledged it is retargeted to its storage name when it is reported
    /// again with one. Returns `true` when the wiring was added or changed.
    pub fn file_rendered(&mut self, chip: &FileChip) -> bool {
        let Some(target) = chip.view_target() else {
            return false;
        };
        let acknowledged = clean(chip.server_id.as_deref()).is_some();
        match self.wired.get_mut(&chip.key) {
            Some(current) if acknowledged && *current != target => {
                *current = target;
                true
            }
            Some(_) => false,
            None => {
                self.wired.insert(chip.key.clone(), target);
                true
            }
        }
    }

    /// Storage name to open in the viewer for a click, if the click should open one.
    pub fn click(&self, key: &str, target: ClickTarget) -> Option<&str> {
        if target == ClickTarget::ActionButton {
            return None;
        }
        self.wired.get(key).map(String::as_str)
    }

    pub fn forget(&mut self, key: &str) -> bool {
        self.wired.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.wired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wired.is_empty()
    }
}

use std::collections::{HashMap, HashSet};

use super::client::{PendingFile, WidgetServerClient};
use super::options::{FileRejection, WidgetOptions};
use super::rendered::{ClickTarget, FileChip, RenderedFiles};

/// One upload widget bound to an open modal.
#[derive(Debug)]
pub struct WidgetInstance {
    modal_id: String,
    entity_id: Option<String>,
    options: WidgetOptions,
    /// Keys of every item the widget holds, picked or loaded.
    items: HashSet<String>,
    rendered: RenderedFiles,
}

impl WidgetInstance {
    fn new(modal_id: &str, entity_id: Option<String>, options: WidgetOptions) -> Self {
        Self {
            modal_id: modal_id.to_string(),
            entity_id,
            options,
            items: HashSet::new(),
            rendered: RenderedFiles::default(),
        }
    }

    pub fn modal_id(&self) -> &str {
        &self.modal_id
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    /// Admits a file the user picked under `key`. Re-adding a held key is a no-op.
    pub fn add_file(&mut self, key: &str, file: &PendingFile) -> Result<(), FileRejection> {
        if self.items.contains(key) {
            return Ok(());
        }
        self.options.check(file)?;
        if self.items.len() >= self.options.max_files {
            return Err(FileRejection::TooManyFiles);
        }
        self.items.insert(key.to_string());
        Ok(())
    }

    /// Called by the rendering layer for every entry it draws. Loaded
    /// entries occupy a slot like picked ones.
    pub fn file_rendered(&mut self, chip: &FileChip) -> bool {
        self.items.insert(chip.key.clone());
        self.rendered.file_rendered(chip)
    }

    pub fn file_removed(&mut self, key: &str) -> bool {
        let held = self.items.remove(key);
        self.rendered.forget(key) || held
    }

    pub fn file_count(&self) -> usize {
        self.items.len()
    }

    /// Viewer URL for a click on an entry, to be opened in a new browsing context.
    pub fn click(
        &self,
        key: &str,
        target: ClickTarget,
        client: &WidgetServerClient,
    ) -> Option<String> {
        self.rendered
            .click(key, target)
            .map(|name| client.view_url(name))
    }

    pub fn rendered(&self) -> &RenderedFiles {
        &self.rendered
    }

    fn destroy(self) {
        tracing::debug!(modal_id = %self.modal_id, files = self.rendered.len(), "widget_destroyed");
    }
}

/// Open modals and the widget instance each one owns.
#[derive(Debug, Default)]
pub struct ModalRegistry {
    modals: HashMap<String, WidgetInstance>,
}

impl ModalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `modal_id` with a fresh widget using the default options.
    pub fn open(&mut self, modal_id: &str, entity_id: Option<String>) -> &mut WidgetInstance {
        self.open_with(modal_id, entity_id, WidgetOptions::default())
    }

    /// Opens `modal_id` with a fresh widget. An instance already bound to the
    /// modal is destroyed first.
    pub fn open_with(
        &mut self,
        modal_id: &str,
        entity_id: Option<String>,
        options: WidgetOptions,
    ) -> &mut WidgetInstance {
        if let Some(previous) = self.modals.remove(modal_id) {
            previous.destroy();
        }
        self.modals
            .entry(modal_id.to_string())
            .or_insert_with(|| WidgetInstance::new(modal_id, entity_id, options))
    }

    /// Closes `modal_id` and destroys its widget. Returns `false` if it was not open.
    pub fn close(&mut self, modal_id: &str) -> bool {
        match self.modals.remove(modal_id) {
            Some(instance) => {
                instance.destroy();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, modal_id: &str) -> Option<&WidgetInstance> {
        self.modals.get(modal_id)
    }

    pub fn get_mut(&mut self, modal_id: &str) -> Option<&mut WidgetInstance> {
        self.modals.get_mut(modal_id)
    }

    pub fn is_open(&self, modal_id: &str) -> bool {
        self.modals.contains_key(modal_id)
    }

    pub fn open_count(&self) -> usize {
        self.modals.len()
    }
}

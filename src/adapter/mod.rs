//! Client side of the upload widget protocol: the widget's network
//! callbacks, widget-side admission options, click-to-view wiring of
//! rendered entries and the registry of open modals.

pub mod client;
pub mod options;
pub mod registry;
pub mod rendered;

pub use client::{AdapterError, LoadedFile, PendingFile, WidgetServerClient};
pub use options::{FileRejection, WidgetOptions};
pub use registry::{ModalRegistry, WidgetInstance};
pub use rendered::{ClickTarget, FileChip, RenderedFiles};

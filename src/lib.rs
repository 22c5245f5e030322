// Module layout (Clean Architecture style)
// - bootstrap: configuration, wiring and the HTTP application
// - infrastructure: metadata store and filesystem adapters
// - presentation: HTTP handlers and routing
// - application: ports and file use cases
// - domain: file records and upload admission rules
// - adapter: client side of the upload widget protocol

pub mod adapter;
pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

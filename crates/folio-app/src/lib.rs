// ABOUTME: Application layer for folio: configuration and the persisted editor.
// ABOUTME: Wires folio-core's outline to folio-store's snapshot and blob stores.

pub mod config;
pub mod editor;

pub use config::{ConfigError, FolioConfig};
pub use editor::{DiagramContent, DiagramView, DocumentView, Editor, EditorError, ViewerKind};

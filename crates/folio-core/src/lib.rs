// ABOUTME: Core library for folio, containing the outline data model and its mutations.
// ABOUTME: This crate has no I/O; persistence lives in folio-store and orchestration in folio-app.

pub mod export;
pub mod input;
pub mod model;
pub mod outline;
pub mod payload;
pub mod selection;
pub mod update;

pub use input::{
    DiagramEdit, DiagramInput, DiagramSource, DocumentEdit, DocumentInput, FileInput, ValidationError,
};
pub use model::{Chapter, Diagram, DiagramBody, Document, DocumentFile, Subchapter};
pub use outline::{Outline, OutlineError, Target};
pub use payload::Payload;
pub use selection::Selection;
pub use update::{DiagramUpdate, DocumentUpdate};

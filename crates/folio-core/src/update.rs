// ABOUTME: Defines the explicit partial-update structures for diagrams and documents.
// ABOUTME: Each field is either None (leave unchanged) or Some(new value); nothing is overwritten by accident.

use chrono::NaiveDate;

use crate::model::{DiagramBody, DocumentFile};

/// Changes to apply to an existing diagram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<DiagramBody>,
}

/// Changes to apply to an existing document. Leaving `file` as `None`
/// keeps the existing file. `date: Some(None)` clears the date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<Option<NaiveDate>>,
    pub file: Option<DocumentFile>,
}

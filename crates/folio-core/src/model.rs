// ABOUTME: Defines the outline entities: Chapter, Subchapter, Diagram, and Document.
// ABOUTME: Every entity is addressed by a ULID generated at creation time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::payload::Payload;

/// A root-level entry of the outline. Owns its subchapters and its own
/// diagram and document lists. `expanded` is presentation state only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: Ulid,
    pub title: String,
    pub description: String,
    pub expanded: bool,
    pub subchapters: Vec<Subchapter>,
    pub diagrams: Vec<Diagram>,
    pub documents: Vec<Document>,
}

impl Chapter {
    /// Create an empty chapter with a fresh ULID.
    pub fn new(title: impl Into<String>, description: impl Into<String>, expanded: bool) -> Self {
        Self {
            id: Ulid::new(),
            title: title.into(),
            description: description.into(),
            expanded,
            subchapters: Vec::new(),
            diagrams: Vec::new(),
            documents: Vec::new(),
        }
    }

    pub fn subchapter(&self, id: Ulid) -> Option<&Subchapter> {
        self.subchapters.iter().find(|s| s.id == id)
    }

    pub fn subchapter_mut(&mut self, id: Ulid) -> Option<&mut Subchapter> {
        self.subchapters.iter_mut().find(|s| s.id == id)
    }

    /// Blob keys owned by this chapter and all of its subchapters.
    pub fn file_ids(&self) -> Vec<Ulid> {
        let mut ids = attachment_file_ids(&self.diagrams, &self.documents);
        for sub in &self.subchapters {
            ids.extend(sub.file_ids());
        }
        ids
    }
}

/// A child of exactly one chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subchapter {
    pub id: Ulid,
    pub title: String,
    pub description: String,
    pub diagrams: Vec<Diagram>,
    pub documents: Vec<Document>,
}

impl Subchapter {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Ulid::new(),
            title: title.into(),
            description: description.into(),
            diagrams: Vec::new(),
            documents: Vec::new(),
        }
    }

    pub fn file_ids(&self) -> Vec<Ulid> {
        attachment_file_ids(&self.diagrams, &self.documents)
    }
}

fn attachment_file_ids(diagrams: &[Diagram], documents: &[Document]) -> Vec<Ulid> {
    diagrams
        .iter()
        .filter_map(|d| d.payload().and_then(Payload::file_id))
        .chain(documents.iter().filter_map(|d| d.payload.file_id()))
        .collect()
}

/// A diagram attached to a chapter or subchapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: Ulid,
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub body: DiagramBody,
}

/// What a diagram is made of. Markup diagrams never own a payload; image
/// diagrams always do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DiagramBody {
    Mermaid { source: String },
    Image { payload: Payload },
}

impl Diagram {
    pub fn payload(&self) -> Option<&Payload> {
        match &self.body {
            DiagramBody::Image { payload } => Some(payload),
            DiagramBody::Mermaid { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.body {
            DiagramBody::Mermaid { .. } => "mermaid",
            DiagramBody::Image { .. } => "image",
        }
    }
}

/// An arbitrary file attached to a chapter or subchapter, with metadata.
/// `media_type` is the declared MIME-like type; it is never checked against
/// the bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Ulid,
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub media_type: String,
    pub file_name: String,
    pub payload: Payload,
}

impl Document {
    /// Replace the file fields with a new file.
    pub fn set_file(&mut self, file: DocumentFile) {
        self.media_type = file.media_type;
        self.file_name = file.file_name;
        self.payload = file.payload;
    }
}

/// The file-carrying fields of a Document, replaced together.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFile {
    pub media_type: String,
    pub file_name: String,
    pub payload: Payload,
}

// ABOUTME: Defines Outline, the in-memory state tree of chapters plus the current selection.
// ABOUTME: All tree mutations live here as synchronous methods addressed by ULID.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

use crate::model::{Chapter, Diagram, DiagramBody, Document, Subchapter};
use crate::payload::Payload;
use crate::selection::Selection;
use crate::update::{DiagramUpdate, DocumentUpdate};

pub const NEW_CHAPTER_TITLE: &str = "New Chapter";
pub const NEW_SUBCHAPTER_TITLE: &str = "New Subchapter";

/// Errors raised by outline mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutlineError {
    #[error("select a chapter or subchapter first")]
    NoSelection,

    #[error("chapter not found: {0}")]
    ChapterNotFound(Ulid),

    #[error("subchapter not found in the current chapter: {0}")]
    SubchapterNotFound(Ulid),

    #[error("diagram not found: {0}")]
    DiagramNotFound(Ulid),

    #[error("document not found: {0}")]
    DocumentNotFound(Ulid),
}

/// The whole outline: ordered chapters and which of them is being edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    chapters: Vec<Chapter>,
    selection: Selection,
}

/// Read-only view of the attachment lists of the current target.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub title: &'a str,
    pub diagrams: &'a [Diagram],
    pub documents: &'a [Document],
}

struct TargetMut<'a> {
    diagrams: &'a mut Vec<Diagram>,
    documents: &'a mut Vec<Document>,
}

impl Outline {
    /// Create an empty outline with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default content: two chapters, the first expanded and selected.
    pub fn seeded() -> Self {
        let chapters = vec![
            Chapter::new("Chapter 1: Introduction", "Core concepts", true),
            Chapter::new("Chapter 2: Environment", "Organizational factors", false),
        ];
        let selection = Selection::Chapter {
            chapter_id: chapters[0].id,
        };
        Self {
            chapters,
            selection,
        }
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn chapter(&self, id: Ulid) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    fn chapter_mut(&mut self, id: Ulid) -> Option<&mut Chapter> {
        self.chapters.iter_mut().find(|c| c.id == id)
    }

    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.selection.chapter_id().and_then(|id| self.chapter(id))
    }

    pub fn current_subchapter(&self) -> Option<&Subchapter> {
        let sub_id = self.selection.subchapter_id()?;
        self.current_chapter()?.subchapter(sub_id)
    }

    /// Append a placeholder chapter, expand it, and select it.
    pub fn add_chapter(&mut self) -> Ulid {
        let chapter = Chapter::new(NEW_CHAPTER_TITLE, "", true);
        let id = chapter.id;
        self.chapters.push(chapter);
        self.selection = Selection::Chapter { chapter_id: id };
        tracing::debug!("added chapter {}", id);
        id
    }

    /// Append a placeholder subchapter to the selected chapter, expand the
    /// chapter, and select the new subchapter.
    pub fn add_subchapter(&mut self) -> Result<Ulid, OutlineError> {
        let chapter_id = self.selection.chapter_id().ok_or(OutlineError::NoSelection)?;
        let chapter = self
            .chapter_mut(chapter_id)
            .ok_or(OutlineError::NoSelection)?;

        let sub = Subchapter::new(NEW_SUBCHAPTER_TITLE, "");
        let subchapter_id = sub.id;
        chapter.subchapters.push(sub);
        chapter.expanded = true;

        self.selection = Selection::Subchapter {
            chapter_id,
            subchapter_id,
        };
        tracing::debug!("added subchapter {} to chapter {}", subchapter_id, chapter_id);
        Ok(subchapter_id)
    }

    /// Select a chapter. Unknown ids leave the selection untouched.
    pub fn select_chapter(&mut self, id: Ulid) -> Result<(), OutlineError> {
        if self.chapter(id).is_none() {
            return Err(OutlineError::ChapterNotFound(id));
        }
        self.selection = Selection::Chapter { chapter_id: id };
        Ok(())
    }

    /// Select a subchapter of the currently selected chapter. Subchapters of
    /// other chapters do not resolve.
    pub fn select_subchapter(&mut self, id: Ulid) -> Result<(), OutlineError> {
        let chapter = self.current_chapter().ok_or(OutlineError::NoSelection)?;
        let chapter_id = chapter.id;
        if chapter.subchapter(id).is_none() {
            return Err(OutlineError::SubchapterNotFound(id));
        }
        self.selection = Selection::Subchapter {
            chapter_id,
            subchapter_id: id,
        };
        Ok(())
    }

    /// Set the title and description of the selected subchapter, or of the
    /// selected chapter when no subchapter is selected. Returns false when
    /// nothing is selected.
    pub fn rename_selected(&mut self, title: &str, description: &str) -> bool {
        match self.selection {
            Selection::Empty => false,
            Selection::Chapter { chapter_id } => match self.chapter_mut(chapter_id) {
                Some(chapter) => {
                    chapter.title = title.to_string();
                    chapter.description = description.to_string();
                    true
                }
                None => false,
            },
            Selection::Subchapter {
                chapter_id,
                subchapter_id,
            } => match self
                .chapter_mut(chapter_id)
                .and_then(|c| c.subchapter_mut(subchapter_id))
            {
                Some(sub) => {
                    sub.title = title.to_string();
                    sub.description = description.to_string();
                    true
                }
                None => false,
            },
        }
    }

    /// Flip a chapter's expanded flag and return the new value.
    pub fn toggle_expansion(&mut self, chapter_id: Ulid) -> Option<bool> {
        let chapter = self.chapter_mut(chapter_id)?;
        chapter.expanded = !chapter.expanded;
        Some(chapter.expanded)
    }

    pub fn set_all_expanded(&mut self, expanded: bool) {
        for chapter in &mut self.chapters {
            chapter.expanded = expanded;
        }
    }

    /// Remove a chapter. Clears the selection when it pointed into the
    /// removed chapter. Absent ids are a no-op.
    pub fn delete_chapter(&mut self, id: Ulid) -> Option<Chapter> {
        let index = self.chapters.iter().position(|c| c.id == id)?;
        let removed = self.chapters.remove(index);
        if self.selection.chapter_id() == Some(id) {
            self.selection = Selection::Empty;
        }
        Some(removed)
    }

    /// Remove a subchapter of the currently selected chapter. Clears the
    /// selection when the removed subchapter was selected.
    pub fn delete_subchapter(&mut self, id: Ulid) -> Option<Subchapter> {
        let chapter_id = self.selection.chapter_id()?;
        let chapter = self.chapter_mut(chapter_id)?;
        let index = chapter.subchapters.iter().position(|s| s.id == id)?;
        let removed = chapter.subchapters.remove(index);
        if self.selection.subchapter_id() == Some(id) {
            self.selection = Selection::Empty;
        }
        Some(removed)
    }

    /// The attachment lists diagrams and documents go to: the selected
    /// subchapter if any, else the selected chapter.
    pub fn target(&self) -> Result<Target<'_>, OutlineError> {
        match self.selection {
            Selection::Empty => Err(OutlineError::NoSelection),
            Selection::Chapter { chapter_id } => {
                let chapter = self.chapter(chapter_id).ok_or(OutlineError::NoSelection)?;
                Ok(Target {
                    title: &chapter.title,
                    diagrams: &chapter.diagrams,
                    documents: &chapter.documents,
                })
            }
            Selection::Subchapter {
                chapter_id,
                subchapter_id,
            } => {
                let sub = self
                    .chapter(chapter_id)
                    .and_then(|c| c.subchapter(subchapter_id))
                    .ok_or(OutlineError::NoSelection)?;
                Ok(Target {
                    title: &sub.title,
                    diagrams: &sub.diagrams,
                    documents: &sub.documents,
                })
            }
        }
    }

    fn target_mut(&mut self) -> Result<TargetMut<'_>, OutlineError> {
        match self.selection {
            Selection::Empty => Err(OutlineError::NoSelection),
            Selection::Chapter { chapter_id } => {
                let chapter = self
                    .chapter_mut(chapter_id)
                    .ok_or(OutlineError::NoSelection)?;
                Ok(TargetMut {
                    diagrams: &mut chapter.diagrams,
                    documents: &mut chapter.documents,
                })
            }
            Selection::Subchapter {
                chapter_id,
                subchapter_id,
            } => {
                let sub = self
                    .chapter_mut(chapter_id)
                    .and_then(|c| c.subchapter_mut(subchapter_id))
                    .ok_or(OutlineError::NoSelection)?;
                Ok(TargetMut {
                    diagrams: &mut sub.diagrams,
                    documents: &mut sub.documents,
                })
            }
        }
    }

    pub fn has_target(&self) -> bool {
        self.target().is_ok()
    }

    pub fn find_diagram(&self, id: Ulid) -> Result<&Diagram, OutlineError> {
        self.target()?
            .diagrams
            .iter()
            .find(|d| d.id == id)
            .ok_or(OutlineError::DiagramNotFound(id))
    }

    pub fn find_document(&self, id: Ulid) -> Result<&Document, OutlineError> {
        self.target()?
            .documents
            .iter()
            .find(|d| d.id == id)
            .ok_or(OutlineError::DocumentNotFound(id))
    }

    /// Append a diagram to the current target.
    pub fn insert_diagram(&mut self, diagram: Diagram) -> Result<Ulid, OutlineError> {
        let target = self.target_mut()?;
        let id = diagram.id;
        target.diagrams.push(diagram);
        Ok(id)
    }

    /// Apply an update to a diagram of the current target. Returns the
    /// previous body when the update replaced it.
    pub fn update_diagram(
        &mut self,
        id: Ulid,
        update: DiagramUpdate,
    ) -> Result<Option<DiagramBody>, OutlineError> {
        let target = self.target_mut()?;
        let diagram = target
            .diagrams
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(OutlineError::DiagramNotFound(id))?;

        if let Some(title) = update.title {
            diagram.title = title;
        }
        if let Some(description) = update.description {
            diagram.description = description;
        }
        Ok(update
            .body
            .map(|body| std::mem::replace(&mut diagram.body, body)))
    }

    /// Remove a diagram from the current target. An absent id yields `Ok(None)`.
    pub fn remove_diagram(&mut self, id: Ulid) -> Result<Option<Diagram>, OutlineError> {
        let target = self.target_mut()?;
        Ok(target
            .diagrams
            .iter()
            .position(|d| d.id == id)
            .map(|index| target.diagrams.remove(index)))
    }

    pub fn insert_document(&mut self, document: Document) -> Result<Ulid, OutlineError> {
        let target = self.target_mut()?;
        let id = document.id;
        target.documents.push(document);
        Ok(id)
    }

    /// Apply an update to a document of the current target. Returns the
    /// previous payload when the update replaced the file.
    pub fn update_document(
        &mut self,
        id: Ulid,
        update: DocumentUpdate,
    ) -> Result<Option<Payload>, OutlineError> {
        let target = self.target_mut()?;
        let document = target
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(OutlineError::DocumentNotFound(id))?;

        if let Some(title) = update.title {
            document.title = title;
        }
        if let Some(description) = update.description {
            document.description = description;
        }
        if let Some(date) = update.date {
            document.date = date;
        }
        Ok(update.file.map(|file| {
            let previous = document.payload.clone();
            document.set_file(file);
            previous
        }))
    }

    pub fn remove_document(&mut self, id: Ulid) -> Result<Option<Document>, OutlineError> {
        let target = self.target_mut()?;
        Ok(target
            .documents
            .iter()
            .position(|d| d.id == id)
            .map(|index| target.documents.remove(index)))
    }

    /// Drop selection pointers that no longer resolve. A dangling subchapter
    /// falls back to its chapter; a dangling chapter clears the selection.
    /// Returns true when the selection changed.
    pub fn normalize_selection(&mut self) -> bool {
        let normalized = match self.selection {
            Selection::Empty => Selection::Empty,
            Selection::Chapter { chapter_id } => match self.chapter(chapter_id) {
                Some(_) => self.selection,
                None => Selection::Empty,
            },
            Selection::Subchapter {
                chapter_id,
                subchapter_id,
            } => match self.chapter(chapter_id) {
                Some(chapter) if chapter.subchapter(subchapter_id).is_some() => self.selection,
                Some(_) => Selection::Chapter { chapter_id },
                None => Selection::Empty,
            },
        };
        let changed = normalized != self.selection;
        self.selection = normalized;
        changed
    }

    /// Every blob key referenced anywhere in the outline.
    pub fn file_ids(&self) -> Vec<Ulid> {
        self.chapters.iter().flat_map(Chapter::file_ids).collect()
    }
}

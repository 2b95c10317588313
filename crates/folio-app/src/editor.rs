// ABOUTME: The editor owns the outline plus both stores and persists after every mutation.
// ABOUTME: Binary content goes to the blob store when it works and inline into the outline when it does not.

use std::sync::Arc;

use chrono::NaiveDate;
use folio_core::{
    Diagram, DiagramBody, DiagramEdit, DiagramInput, DiagramSource, DiagramUpdate, Document,
    DocumentEdit, DocumentFile, DocumentInput, DocumentUpdate, Outline, OutlineError, Payload,
    ValidationError,
};
use folio_store::{BlobStore, SnapshotError, SnapshotStore, SqliteBlobStore};
use thiserror::Error;
use ulid::Ulid;

use crate::config::FolioConfig;

/// Errors surfaced to the user. Store failures are recovered inside the
/// editor and only appear here for an explicit save.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Outline(#[from] OutlineError),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Which viewer a document opens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKind {
    Pdf,
    Embedded,
}

/// Renderable content of an opened diagram.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagramContent {
    Mermaid(String),
    /// `None` when the referenced bytes could not be fetched.
    Image(Option<Vec<u8>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagramView {
    pub id: Ulid,
    pub title: String,
    pub description: String,
    pub content: DiagramContent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentView {
    pub id: Ulid,
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub media_type: String,
    pub file_name: String,
    /// `None` when the referenced bytes could not be fetched.
    pub data: Option<Vec<u8>>,
}

impl DocumentView {
    pub fn viewer(&self) -> ViewerKind {
        if self.media_type.to_ascii_lowercase().contains("pdf") {
            ViewerKind::Pdf
        } else {
            ViewerKind::Embedded
        }
    }

    pub fn is_available(&self) -> bool {
        self.data.is_some()
    }
}

/// The application state: one outline, one snapshot slot, and an optional
/// blob store. Without a blob store the editor runs in inline mode.
pub struct Editor {
    outline: Outline,
    snapshots: SnapshotStore,
    blobs: Option<Arc<dyn BlobStore>>,
}

impl Editor {
    /// Open the stores described by `config` and restore the last snapshot.
    /// A blob store that fails to open leaves the editor in inline mode.
    pub async fn bootstrap(config: &FolioConfig) -> Self {
        let blobs: Option<Arc<dyn BlobStore>> = if config.blobs_enabled {
            match SqliteBlobStore::open(&config.blob_path()).await {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    tracing::warn!("blob store unavailable, keeping files inline: {}", e);
                    None
                }
            }
        } else {
            tracing::info!("blob store disabled, keeping files inline");
            None
        };

        let snapshots = SnapshotStore::new(config.snapshot_dir(), config.snapshot_key.clone());
        Self::with_stores(snapshots, blobs)
    }

    pub fn with_stores(snapshots: SnapshotStore, blobs: Option<Arc<dyn BlobStore>>) -> Self {
        let mut editor = Self {
            outline: Outline::new(),
            snapshots,
            blobs,
        };
        editor.restore();
        editor
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// True when binary content is being written inline because no blob
    /// store is available.
    pub fn is_inline_mode(&self) -> bool {
        self.blobs.is_none()
    }

    fn restore(&mut self) {
        match self.snapshots.load() {
            Ok(Some(outline)) if !outline.is_empty() => {
                self.outline = outline;
                if self.outline.normalize_selection() {
                    tracing::info!("restored selection pointed at a missing entry, cleared it");
                }
                tracing::info!("restored outline with {} chapters", self.outline.chapters().len());
            }
            Ok(_) => {
                tracing::info!("no saved outline, seeding default chapters");
                self.seed();
            }
            Err(e) => {
                tracing::warn!("failed to read snapshot, seeding default chapters: {}", e);
                self.seed();
            }
        }
    }

    fn seed(&mut self) {
        self.outline = Outline::seeded();
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.snapshots.save(&self.outline) {
            tracing::error!("failed to save outline: {}", e);
        }
    }

    // -- Chapters and selection --

    pub fn add_chapter(&mut self) -> Ulid {
        let id = self.outline.add_chapter();
        self.persist();
        id
    }

    pub fn add_subchapter(&mut self) -> Result<Ulid, EditorError> {
        let id = self.outline.add_subchapter()?;
        self.persist();
        Ok(id)
    }

    pub fn select_chapter(&mut self, id: Ulid) -> Result<(), EditorError> {
        self.outline.select_chapter(id)?;
        self.persist();
        Ok(())
    }

    pub fn select_subchapter(&mut self, id: Ulid) -> Result<(), EditorError> {
        self.outline.select_subchapter(id)?;
        self.persist();
        Ok(())
    }

    /// Returns false, changing nothing, when no chapter is selected.
    pub fn rename_selected(&mut self, title: &str, description: &str) -> bool {
        let renamed = self.outline.rename_selected(title, description);
        if renamed {
            self.persist();
        }
        renamed
    }

    pub fn toggle_expansion(&mut self, chapter_id: Ulid) -> Option<bool> {
        let expanded = self.outline.toggle_expansion(chapter_id)?;
        self.persist();
        Some(expanded)
    }

    pub fn expand_all(&mut self) {
        self.outline.set_all_expanded(true);
        self.persist();
    }

    pub fn collapse_all(&mut self) {
        self.outline.set_all_expanded(false);
        self.persist();
    }

    /// Remove a chapter with everything under it. Returns false for an
    /// unknown id.
    pub async fn delete_chapter(&mut self, id: Ulid) -> bool {
        let Some(chapter) = self.outline.delete_chapter(id) else {
            return false;
        };
        self.persist();
        self.release(chapter.file_ids()).await;
        tracing::info!("deleted chapter {}", id);
        true
    }

    /// Remove a subchapter of the selected chapter. Returns false when it
    /// does not resolve.
    pub async fn delete_subchapter(&mut self, id: Ulid) -> bool {
        let Some(sub) = self.outline.delete_subchapter(id) else {
            return false;
        };
        self.persist();
        self.release(sub.file_ids()).await;
        tracing::info!("deleted subchapter {}", id);
        true
    }

    // -- Diagrams --

    pub async fn add_diagram(&mut self, input: DiagramInput) -> Result<Ulid, EditorError> {
        let input = input.validate()?;
        if !self.outline.has_target() {
            return Err(OutlineError::NoSelection.into());
        }

        let id = Ulid::new();
        let body = self.store_source(id, input.source).await;
        self.outline.insert_diagram(Diagram {
            id,
            title: input.title,
            description: input.description,
            body,
        })?;
        self.persist();
        Ok(id)
    }

    pub async fn update_diagram(&mut self, id: Ulid, edit: DiagramEdit) -> Result<(), EditorError> {
        let edit = edit.validate()?;
        self.outline.find_diagram(id)?;

        let body = match edit.source {
            Some(source) => Some(self.store_source(id, source).await),
            None => None,
        };
        let new_file = body.as_ref().and_then(body_file_id);

        let replaced = self.outline.update_diagram(
            id,
            DiagramUpdate {
                title: edit.title,
                description: edit.description,
                body,
            },
        )?;
        self.persist();

        if let Some(old_file) = replaced.as_ref().and_then(body_file_id)
            && Some(old_file) != new_file
        {
            self.release(vec![old_file]).await;
        }
        Ok(())
    }

    /// Remove a diagram from the current target. An unknown id is a no-op.
    pub async fn delete_diagram(&mut self, id: Ulid) -> Result<bool, EditorError> {
        let Some(diagram) = self.outline.remove_diagram(id)? else {
            return Ok(false);
        };
        self.persist();
        if let Some(file_id) = diagram.payload().and_then(Payload::file_id) {
            self.release(vec![file_id]).await;
        }
        Ok(true)
    }

    pub async fn open_diagram(&self, id: Ulid) -> Result<DiagramView, EditorError> {
        let diagram = self.outline.find_diagram(id)?;
        let content = match &diagram.body {
            DiagramBody::Mermaid { source } => DiagramContent::Mermaid(source.clone()),
            DiagramBody::Image { payload } => DiagramContent::Image(self.resolve(payload).await),
        };
        Ok(DiagramView {
            id: diagram.id,
            title: diagram.title.clone(),
            description: diagram.description.clone(),
            content,
        })
    }

    // -- Documents --

    pub async fn add_document(&mut self, input: DocumentInput) -> Result<Ulid, EditorError> {
        let input = input.validate()?;
        if !self.outline.has_target() {
            return Err(OutlineError::NoSelection.into());
        }

        let id = Ulid::new();
        let payload = self.store_bytes(id, input.data).await;
        self.outline.insert_document(Document {
            id,
            title: input.title,
            description: input.description,
            date: input.date,
            media_type: input.media_type,
            file_name: input.file_name,
            payload,
        })?;
        self.persist();
        Ok(id)
    }

    pub async fn update_document(&mut self, id: Ulid, edit: DocumentEdit) -> Result<(), EditorError> {
        let edit = edit.validate()?;
        self.outline.find_document(id)?;

        let file = match edit.file {
            Some(file) => Some(DocumentFile {
                media_type: file.media_type,
                file_name: file.file_name,
                payload: self.store_bytes(id, file.data).await,
            }),
            None => None,
        };
        let new_file = file.as_ref().and_then(|f| f.payload.file_id());

        let replaced = self.outline.update_document(
            id,
            DocumentUpdate {
                title: edit.title,
                description: edit.description,
                date: edit.date,
                file,
            },
        )?;
        self.persist();

        if let Some(old_file) = replaced.as_ref().and_then(Payload::file_id)
            && Some(old_file) != new_file
        {
            self.release(vec![old_file]).await;
        }
        Ok(())
    }

    pub async fn delete_document(&mut self, id: Ulid) -> Result<bool, EditorError> {
        let Some(document) = self.outline.remove_document(id)? else {
            return Ok(false);
        };
        self.persist();
        if let Some(file_id) = document.payload.file_id() {
            self.release(vec![file_id]).await;
        }
        Ok(true)
    }

    pub async fn open_document(&self, id: Ulid) -> Result<DocumentView, EditorError> {
        let document = self.outline.find_document(id)?;
        let data = self.resolve(&document.payload).await;
        Ok(DocumentView {
            id: document.id,
            title: document.title.clone(),
            description: document.description.clone(),
            date: document.date,
            media_type: document.media_type.clone(),
            file_name: document.file_name.clone(),
            data,
        })
    }

    // -- Lifecycle --

    pub fn manual_save(&self) -> Result<(), EditorError> {
        self.snapshots.save(&self.outline)?;
        tracing::info!("outline saved to {}", self.snapshots.path().display());
        Ok(())
    }

    /// Discard in-memory state and restore from the snapshot slot.
    pub fn manual_reload(&mut self) {
        self.restore();
    }

    /// Wipe both stores and start over from the default chapters.
    pub async fn reset_all(&mut self) {
        if let Err(e) = self.snapshots.clear() {
            tracing::warn!("failed to clear snapshot: {}", e);
        }
        if let Some(blobs) = &self.blobs
            && let Err(e) = blobs.clear().await
        {
            tracing::warn!("failed to clear blob store: {}", e);
        }

        // The seed comes with its first chapter selected.
        self.outline = Outline::seeded();
        self.persist();
        tracing::info!("reset outline to default chapters");
    }

    // -- Payload plumbing --

    async fn store_source(&self, id: Ulid, source: DiagramSource) -> DiagramBody {
        match source {
            DiagramSource::Mermaid(source) => DiagramBody::Mermaid { source },
            DiagramSource::Image(data) => DiagramBody::Image {
                payload: self.store_bytes(id, data).await,
            },
        }
    }

    /// Write `data` to the blob store under `id`, or keep it inline when
    /// there is no store or the write fails.
    async fn store_bytes(&self, id: Ulid, data: Vec<u8>) -> Payload {
        let Some(blobs) = &self.blobs else {
            return Payload::inline(data);
        };
        match blobs.put(id, &data).await {
            Ok(()) => Payload::referenced(id),
            Err(e) => {
                tracing::warn!("failed to store file {}, keeping it inline: {}", id, e);
                Payload::inline(data)
            }
        }
    }

    /// Fetch the bytes behind a payload. `None` when a referenced file is
    /// missing or the store cannot be read.
    async fn resolve(&self, payload: &Payload) -> Option<Vec<u8>> {
        match payload {
            Payload::Inline { data } => Some(data.clone()),
            Payload::Referenced { file_id } => {
                let Some(blobs) = &self.blobs else {
                    tracing::warn!("file {} is stored externally but no blob store is open", file_id);
                    return None;
                };
                match blobs.get(*file_id).await {
                    Ok(Some(data)) => Some(data),
                    Ok(None) => {
                        tracing::warn!("file {} is missing from the blob store", file_id);
                        None
                    }
                    Err(e) => {
                        tracing::warn!("failed to read file {}: {}", file_id, e);
                        None
                    }
                }
            }
        }
    }

    /// Best-effort removal of blobs no longer referenced by the outline.
    async fn release(&self, file_ids: Vec<Ulid>) {
        let Some(blobs) = &self.blobs else {
            return;
        };
        for file_id in file_ids {
            if let Err(e) = blobs.delete(file_id).await {
                tracing::warn!("failed to delete file {}: {}", file_id, e);
            }
        }
    }
}

fn body_file_id(body: &DiagramBody) -> Option<Ulid> {
    match body {
        DiagramBody::Image { payload } => payload.file_id(),
        DiagramBody::Mermaid { .. } => None,
    }
}

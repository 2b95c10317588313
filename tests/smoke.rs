// ABOUTME: End-to-end smoke test for the full folio lifecycle.
// ABOUTME: Tests seeding, chapter edits, attachments in SQLite, restart, export, reset, and reload.

use std::sync::Arc;

use chrono::NaiveDate;
use folio_app::{DiagramContent, Editor, FolioConfig, ViewerKind};
use folio_core::export::export_markdown;
use folio_core::{DiagramInput, DiagramSource, DocumentInput, Payload, Selection};
use folio_store::{BlobStore, SnapshotStore, SqliteBlobStore};

#[tokio::test]
async fn smoke_test_full_lifecycle() {
    // 1. Bootstrap against an empty home directory
    let dir = tempfile::TempDir::new().unwrap();
    let config = FolioConfig::with_home(dir.path());
    let mut editor = Editor::bootstrap(&config).await;

    assert!(!editor.is_inline_mode(), "sqlite blob store should open");
    assert_eq!(editor.outline().chapters().len(), 2, "defaults should be seeded");
    let first = editor.outline().chapters()[0].id;

    // 2. Add a subchapter to chapter 1 and name it
    let sub = editor.add_subchapter().unwrap();
    assert!(editor.rename_selected("Background", "Why this exists"));

    // 3. Attach an image diagram and a PDF document to the subchapter
    let diagram = editor
        .add_diagram(DiagramInput {
            title: "Architecture".to_string(),
            description: "Big picture".to_string(),
            source: DiagramSource::Image(vec![0x89, b'P', b'N', b'G']),
        })
        .await
        .unwrap();
    let document = editor
        .add_document(DocumentInput {
            title: "Charter".to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 5, 17),
            media_type: "application/pdf".to_string(),
            file_name: "charter.pdf".to_string(),
            data: b"%PDF-1.7 charter".to_vec(),
        })
        .await
        .unwrap();

    let stored = editor.outline().find_diagram(diagram).unwrap();
    assert_eq!(stored.payload(), Some(&Payload::referenced(diagram)));

    // 4. Add a mermaid diagram to chapter 2
    let second = editor.outline().chapters()[1].id;
    editor.select_chapter(second).unwrap();
    let flow = editor
        .add_diagram(DiagramInput {
            title: "Flow".to_string(),
            description: String::new(),
            source: DiagramSource::Mermaid("graph TD; A-->B".to_string()),
        })
        .await
        .unwrap();
    editor.select_chapter(first).unwrap();
    editor.select_subchapter(sub).unwrap();
    let before_restart = editor.outline().clone();
    drop(editor);

    // 5. Restart: a new editor over the same home sees the same outline and files
    let mut editor = Editor::bootstrap(&config).await;
    assert_eq!(editor.outline(), &before_restart);
    assert_eq!(
        editor.outline().selection(),
        Selection::Subchapter {
            chapter_id: first,
            subchapter_id: sub
        }
    );

    let image = editor.open_diagram(diagram).await.unwrap();
    assert_eq!(image.content, DiagramContent::Image(Some(vec![0x89, b'P', b'N', b'G'])));
    let charter = editor.open_document(document).await.unwrap();
    assert_eq!(charter.viewer(), ViewerKind::Pdf);
    assert_eq!(charter.data.as_deref(), Some(&b"%PDF-1.7 charter"[..]));

    // 6. Export mentions every part of the outline
    let markdown = export_markdown(editor.outline());
    assert!(markdown.starts_with("# Outline"));
    assert!(markdown.contains("### Background (selected)"));
    assert!(markdown.contains("Architecture (image)"));
    assert!(markdown.contains("charter.pdf, application/pdf, 2024-05-17"));
    assert!(markdown.contains(&format!("Flow (mermaid) `{}`", flow)));

    // 7. Deleting the diagram removes its blob
    assert!(editor.delete_diagram(diagram).await.unwrap());
    let blobs = SqliteBlobStore::open(&config.blob_path()).await.unwrap();
    assert!(blobs.get(diagram).await.unwrap().is_none());
    assert!(blobs.get(document).await.unwrap().is_some());

    // 8. Reset wipes both stores and reseeds
    editor.reset_all().await;
    assert_eq!(blobs.count().await.unwrap(), 0);
    assert_eq!(editor.outline().chapters().len(), 2);
    assert_eq!(editor.outline().chapters()[0].title, "Chapter 1: Introduction");
    assert!(editor.outline().current_chapter().is_some());
}

#[tokio::test]
async fn smoke_test_reload_and_corruption() {
    let dir = tempfile::TempDir::new().unwrap();
    let snapshots = SnapshotStore::new(dir.path(), "outline");
    let blobs: Arc<dyn BlobStore> = Arc::new(SqliteBlobStore::open_in_memory().await.unwrap());

    let mut editor = Editor::with_stores(snapshots.clone(), Some(blobs));
    let added = editor.add_chapter();
    editor.manual_save().unwrap();

    // Reload restores what was saved, including later auto-saves
    editor.collapse_all();
    let saved = editor.outline().clone();
    editor.manual_reload();
    assert_eq!(editor.outline(), &saved);
    assert!(editor.outline().chapter(added).is_some());
    assert!(editor.outline().chapters().iter().all(|c| !c.expanded));

    // Changes written behind the editor's back are picked up by reload
    let mut edited = saved.clone();
    edited.set_all_expanded(true);
    snapshots.save(&edited).unwrap();
    editor.manual_reload();
    assert_eq!(editor.outline(), &edited);

    // A corrupted slot is discarded on reload
    std::fs::write(snapshots.path(), "{ truncated").unwrap();
    editor.manual_reload();

    // The snapshot was corrupt, so reload falls back to the seed
    assert_eq!(editor.outline().chapters().len(), 2);
    assert!(editor.outline().chapter(added).is_none());
    let first = editor.outline().chapters()[0].id;
    assert_eq!(editor.outline().selection(), Selection::Chapter { chapter_id: first });

    // And the seed was persisted, so another reload is stable
    let seeded = editor.outline().clone();
    editor.manual_reload();
    assert_eq!(editor.outline(), &seeded);
}

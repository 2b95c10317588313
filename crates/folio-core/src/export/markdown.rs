// ABOUTME: Exports an Outline as a deterministic Markdown document.
// ABOUTME: Chapters, subchapters, and their attachments appear in tree order with the selection marked.

use crate::model::{Diagram, Document};
use crate::outline::Outline;

const SELECTED_MARKER: &str = " (selected)";

/// Render an Outline as Markdown.
///
/// Chapters are `##` headings and subchapters `###` headings, in their
/// stored order. Collapsed chapters still list their subchapters; the
/// expanded flag is shown next to the heading. Attachments are listed under
/// the entity that owns them, each with its id so commands can address it.
pub fn export_markdown(outline: &Outline) -> String {
    let mut lines: Vec<String> = vec!["# Outline".to_string()];
    let selection = outline.selection();

    if outline.chapters().is_empty() {
        lines.push(String::new());
        lines.push("_No chapters._".to_string());
    }

    for chapter in outline.chapters() {
        let marker = if selection.chapter_id() == Some(chapter.id) && selection.subchapter_id().is_none() {
            SELECTED_MARKER
        } else {
            ""
        };
        let fold = if chapter.expanded { "[-]" } else { "[+]" };

        lines.push(String::new());
        lines.push(format!("## {} {}{}", fold, chapter.title, marker));
        lines.push(String::new());
        lines.push(format!("id: `{}`", chapter.id));
        push_description(&mut lines, &chapter.description);
        push_attachments(&mut lines, &chapter.diagrams, &chapter.documents);

        for sub in &chapter.subchapters {
            let marker = if selection.subchapter_id() == Some(sub.id) {
                SELECTED_MARKER
            } else {
                ""
            };
            lines.push(String::new());
            lines.push(format!("### {}{}", sub.title, marker));
            lines.push(String::new());
            lines.push(format!("id: `{}`", sub.id));
            push_description(&mut lines, &sub.description);
            push_attachments(&mut lines, &sub.diagrams, &sub.documents);
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn push_description(lines: &mut Vec<String>, description: &str) {
    if !description.is_empty() {
        lines.push(String::new());
        lines.push(description.to_string());
    }
}

fn push_attachments(lines: &mut Vec<String>, diagrams: &[Diagram], documents: &[Document]) {
    if !diagrams.is_empty() {
        lines.push(String::new());
        lines.push("Diagrams:".to_string());
        for d in diagrams {
            lines.push(format!("- {} ({}) `{}`", d.title, d.kind(), d.id));
        }
    }

    if !documents.is_empty() {
        lines.push(String::new());
        lines.push("Documents:".to_string());
        for d in documents {
            let date = d
                .date
                .map(|date| format!(", {}", date.format("%Y-%m-%d")))
                .unwrap_or_default();
            lines.push(format!(
                "- {} [{}, {}{}] `{}`",
                d.title, d.file_name, d.media_type, date, d.id
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiagramBody;
    use crate::payload::Payload;
    use chrono::NaiveDate;
    use ulid::Ulid;

    #[test]
    fn empty_outline_says_so() {
        let md = export_markdown(&Outline::new());
        assert!(md.starts_with("# Outline\n"));
        assert!(md.contains("_No chapters._"));
    }

    #[test]
    fn seeded_outline_marks_first_chapter_selected() {
        let outline = Outline::seeded();
        let md = export_markdown(&outline);

        assert!(md.contains("## [-] Chapter 1: Introduction (selected)"));
        assert!(md.contains("## [+] Chapter 2: Environment\n"));
        assert!(md.contains("Core concepts"));
    }

    #[test]
    fn attachments_are_listed_under_their_owner() {
        let mut outline = Outline::seeded();
        let sub_id = outline.add_subchapter().unwrap();
        outline.rename_selected("Scope", "");

        let diagram_id = Ulid::new();
        outline
            .insert_diagram(Diagram {
                id: diagram_id,
                title: "Flow".to_string(),
                description: String::new(),
                body: DiagramBody::Mermaid {
                    source: "graph TD; A-->B".to_string(),
                },
            })
            .unwrap();
        let doc_id = Ulid::new();
        outline
            .insert_document(Document {
                id: doc_id,
                title: "Charter".to_string(),
                description: String::new(),
                date: NaiveDate::from_ymd_opt(2024, 5, 6),
                media_type: "application/pdf".to_string(),
                file_name: "charter.pdf".to_string(),
                payload: Payload::referenced(doc_id),
            })
            .unwrap();

        let md = export_markdown(&outline);

        assert!(md.contains(&format!("### Scope (selected)\n\nid: `{}`", sub_id)));
        assert!(md.contains(&format!("- Flow (mermaid) `{}`", diagram_id)));
        assert!(md.contains(&format!(
            "- Charter [charter.pdf, application/pdf, 2024-05-06] `{}`",
            doc_id
        )));
        // The chapter itself is no longer the selected entity
        assert!(!md.contains("Chapter 1: Introduction (selected)"));
    }

    #[test]
    fn export_is_deterministic() {
        let outline = Outline::seeded();
        assert_eq!(export_markdown(&outline), export_markdown(&outline));
    }
}

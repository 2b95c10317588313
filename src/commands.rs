// ABOUTME: Implements each folio subcommand against a bootstrapped editor.
// ABOUTME: Reads attachment files from disk, prints results, and gates destructive commands on confirmation.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::Args;
use folio_app::{DiagramContent, Editor, ViewerKind};
use folio_core::export::export_markdown;
use folio_core::{DiagramEdit, DiagramInput, DiagramSource, DocumentEdit, DocumentInput, FileInput, Outline};

use crate::Command;

/// Where a diagram's content comes from. At most one may be given.
#[derive(Args, Debug, Default)]
#[group(multiple = false)]
pub struct SourceArgs {
    /// Mermaid markup
    #[arg(long)]
    mermaid: Option<String>,

    /// File holding Mermaid markup
    #[arg(long)]
    mermaid_file: Option<PathBuf>,

    /// Image file
    #[arg(long)]
    image: Option<PathBuf>,
}

impl SourceArgs {
    fn into_source(self) -> Result<Option<DiagramSource>> {
        if let Some(markup) = self.mermaid {
            return Ok(Some(DiagramSource::Mermaid(markup)));
        }
        if let Some(path) = self.mermaid_file {
            let markup = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            return Ok(Some(DiagramSource::Mermaid(markup)));
        }
        if let Some(path) = self.image {
            return Ok(Some(DiagramSource::Image(read_file(&path)?)));
        }
        Ok(None)
    }
}

pub async fn run(editor: &mut Editor, command: Command) -> Result<()> {
    match command {
        Command::Show => print!("{}", render_tree(editor.outline())),
        Command::Export { out } => {
            let markdown = export_markdown(editor.outline());
            match out {
                Some(path) => {
                    std::fs::write(&path, markdown)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("exported to {}", path.display());
                }
                None => print!("{}", markdown),
            }
        }
        Command::AddChapter => {
            let id = editor.add_chapter();
            println!("added chapter {}", id);
        }
        Command::AddSubchapter => {
            let id = editor.add_subchapter()?;
            println!("added subchapter {}", id);
        }
        Command::Select { id, sub } => {
            if sub {
                editor.select_subchapter(id)?;
            } else {
                editor.select_chapter(id)?;
            }
            println!("selected {}", id);
        }
        Command::Rename { title, description } => {
            if editor.rename_selected(&title, &description) {
                println!("renamed to {:?}", title);
            } else {
                println!("nothing selected, nothing renamed");
            }
        }
        Command::Toggle { id } => match editor.toggle_expansion(id) {
            Some(true) => println!("expanded {}", id),
            Some(false) => println!("collapsed {}", id),
            None => bail!("chapter not found: {}", id),
        },
        Command::ExpandAll => editor.expand_all(),
        Command::CollapseAll => editor.collapse_all(),
        Command::AddDiagram {
            title,
            description,
            source,
        } => {
            let Some(source) = source.into_source()? else {
                bail!("a diagram needs --mermaid, --mermaid-file, or --image");
            };
            let id = editor
                .add_diagram(DiagramInput {
                    title,
                    description,
                    source,
                })
                .await?;
            println!("added diagram {}", id);
        }
        Command::UpdateDiagram {
            id,
            title,
            description,
            source,
        } => {
            let edit = DiagramEdit {
                title,
                description,
                source: source.into_source()?,
            };
            editor.update_diagram(id, edit).await?;
            println!("updated diagram {}", id);
        }
        Command::AddDocument {
            title,
            file,
            description,
            date,
            no_date,
            media_type,
            name,
        } => {
            let data = read_file(&file)?;
            let id = editor
                .add_document(DocumentInput {
                    title,
                    description,
                    date: new_document_date(date, no_date, Local::now().date_naive()),
                    media_type: media_type.unwrap_or_else(|| guess_media_type(&file).to_string()),
                    file_name: name.unwrap_or_else(|| file_name_of(&file)),
                    data,
                })
                .await?;
            println!("added document {}", id);
        }
        Command::UpdateDocument {
            id,
            title,
            description,
            date,
            clear_date,
            file,
            media_type,
            name,
        } => {
            let file = match file {
                Some(path) => Some(FileInput {
                    media_type: media_type.unwrap_or_else(|| guess_media_type(&path).to_string()),
                    file_name: name.unwrap_or_else(|| file_name_of(&path)),
                    data: read_file(&path)?,
                }),
                None => None,
            };
            let date = if clear_date { Some(None) } else { date.map(Some) };
            let edit = DocumentEdit {
                title,
                description,
                date,
                file,
            };
            editor.update_document(id, edit).await?;
            println!("updated document {}", id);
        }
        Command::OpenDiagram { id, out } => {
            let view = editor.open_diagram(id).await?;
            println!("{}", view.title);
            if !view.description.is_empty() {
                println!("{}", view.description);
            }
            match view.content {
                DiagramContent::Mermaid(source) => println!("\n{}", source),
                DiagramContent::Image(Some(data)) => write_or_describe(out.as_deref(), &data, "image")?,
                DiagramContent::Image(None) => bail!("image content for {} is unavailable", id),
            }
        }
        Command::OpenDocument { id, out } => {
            let view = editor.open_document(id).await?;
            let viewer = match view.viewer() {
                ViewerKind::Pdf => "pdf viewer",
                ViewerKind::Embedded => "embedded viewer",
            };
            println!("{} [{}, {}] ({})", view.title, view.file_name, view.media_type, viewer);
            if let Some(date) = view.date {
                println!("date: {}", date.format("%Y-%m-%d"));
            }
            if !view.description.is_empty() {
                println!("{}", view.description);
            }
            match view.data {
                Some(data) => write_or_describe(out.as_deref(), &data, "document")?,
                None => bail!("file content for {} is unavailable", id),
            }
        }
        Command::DeleteChapter { id, yes } => {
            if confirm("Delete chapter and everything in it?", yes)? {
                if editor.delete_chapter(id).await {
                    println!("deleted chapter {}", id);
                } else {
                    println!("no chapter {}", id);
                }
            }
        }
        Command::DeleteSubchapter { id, yes } => {
            if confirm("Delete subchapter?", yes)? {
                if editor.delete_subchapter(id).await {
                    println!("deleted subchapter {}", id);
                } else {
                    println!("no subchapter {} in the selected chapter", id);
                }
            }
        }
        Command::DeleteDiagram { id, yes } => {
            if confirm("Delete diagram?", yes)? {
                if editor.delete_diagram(id).await? {
                    println!("deleted diagram {}", id);
                } else {
                    println!("no diagram {}", id);
                }
            }
        }
        Command::DeleteDocument { id, yes } => {
            if confirm("Delete document?", yes)? {
                if editor.delete_document(id).await? {
                    println!("deleted document {}", id);
                } else {
                    println!("no document {}", id);
                }
            }
        }
        Command::Save => {
            editor.manual_save()?;
            println!("outline saved");
        }
        Command::Reload => {
            editor.manual_reload();
            println!("outline loaded");
        }
        Command::Reset { yes } => {
            if confirm("Really reset everything?", yes)? {
                editor.reset_all().await;
                println!("reset");
            }
        }
    }
    Ok(())
}

/// Ask on stdin unless `yes` was given. Anything but y/yes declines.
fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    eprint!("{} [y/N] ", prompt);
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    let accepted = is_yes(&answer);
    if !accepted {
        println!("cancelled");
    }
    Ok(accepted)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// New documents are dated today unless a date is given or dating is declined.
fn new_document_date(date: Option<NaiveDate>, no_date: bool, today: NaiveDate) -> Option<NaiveDate> {
    if no_date {
        None
    } else {
        Some(date.unwrap_or(today))
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn write_or_describe(out: Option<&Path>, data: &[u8], what: &str) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, data).with_context(|| format!("writing {}", path.display()))?;
            println!("wrote {} bytes to {}", data.len(), path.display());
        }
        None => println!("{} content: {} bytes (use --out to save it)", what, data.len()),
    }
    Ok(())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn guess_media_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Compact tree view: chapters with ids, subchapters when expanded, then the
/// attachments of whatever is selected.
fn render_tree(outline: &Outline) -> String {
    let selection = outline.selection();
    let mut lines = Vec::new();

    if outline.is_empty() {
        lines.push("(no chapters)".to_string());
    }
    for chapter in outline.chapters() {
        let marker = if chapter.expanded { "-" } else { "+" };
        let current = if selection.chapter_id() == Some(chapter.id) && selection.subchapter_id().is_none() {
            " *"
        } else {
            ""
        };
        lines.push(format!("[{}] {}  {}{}", marker, chapter.title, chapter.id, current));
        if chapter.expanded {
            for sub in &chapter.subchapters {
                let current = if selection.subchapter_id() == Some(sub.id) { " *" } else { "" };
                lines.push(format!("      {}  {}{}", sub.title, sub.id, current));
            }
        }
    }

    match outline.target() {
        Ok(target) => {
            lines.push(String::new());
            lines.push(format!("Selected: {}", target.title));
            for diagram in target.diagrams {
                lines.push(format!("  diagram  {}  {} ({})", diagram.id, diagram.title, diagram.kind()));
            }
            for document in target.documents {
                lines.push(format!(
                    "  document {}  {} [{}]",
                    document.id, document.title, document.file_name
                ));
            }
        }
        Err(_) => {
            lines.push(String::new());
            lines.push("Nothing selected.".to_string());
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

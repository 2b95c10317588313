// ABOUTME: Defines user-supplied inputs for new diagrams and documents and their validation.
// ABOUTME: Validation runs before any state is touched, so a rejected input never causes a partial write.

use chrono::NaiveDate;
use thiserror::Error;

/// Reasons a user input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a title is required")]
    EmptyTitle,

    #[error("diagram markup is required")]
    EmptyMarkup,

    #[error("an image file is required")]
    EmptyImage,

    #[error("a file is required")]
    EmptyFile,

    #[error("a file name is required")]
    EmptyFileName,
}

/// The content of a new diagram, before it has an identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagramSource {
    Mermaid(String),
    Image(Vec<u8>),
}

/// A new diagram as entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramInput {
    pub title: String,
    pub description: String,
    pub source: DiagramSource,
}

impl DiagramInput {
    /// Trim the text fields and reject blank titles, blank markup, and empty images.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();

        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        match &mut self.source {
            DiagramSource::Mermaid(source) => {
                *source = source.trim().to_string();
                if source.is_empty() {
                    return Err(ValidationError::EmptyMarkup);
                }
            }
            DiagramSource::Image(data) => {
                if data.is_empty() {
                    return Err(ValidationError::EmptyImage);
                }
            }
        }

        Ok(self)
    }
}

/// A new document as entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInput {
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub media_type: String,
    pub file_name: String,
    pub data: Vec<u8>,
}

impl DocumentInput {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.file_name = self.file_name.trim().to_string();

        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.data.is_empty() {
            return Err(ValidationError::EmptyFile);
        }
        if self.file_name.is_empty() {
            return Err(ValidationError::EmptyFileName);
        }

        Ok(self)
    }
}

/// A replacement file for an existing document.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInput {
    pub media_type: String,
    pub file_name: String,
    pub data: Vec<u8>,
}

/// User edits to an existing diagram. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub source: Option<DiagramSource>,
}

impl DiagramEdit {
    /// Same rules as a new diagram, applied only to the fields being changed.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.title = trimmed_title(self.title)?;
        self.description = self.description.map(|d| d.trim().to_string());

        match &mut self.source {
            Some(DiagramSource::Mermaid(source)) => {
                *source = source.trim().to_string();
                if source.is_empty() {
                    return Err(ValidationError::EmptyMarkup);
                }
            }
            Some(DiagramSource::Image(data)) if data.is_empty() => {
                return Err(ValidationError::EmptyImage);
            }
            _ => {}
        }

        Ok(self)
    }
}

/// User edits to an existing document. Omitting `file` keeps the stored file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<Option<NaiveDate>>,
    pub file: Option<FileInput>,
}

impl DocumentEdit {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.title = trimmed_title(self.title)?;
        self.description = self.description.map(|d| d.trim().to_string());

        if let Some(file) = &mut self.file {
            file.file_name = file.file_name.trim().to_string();
            if file.data.is_empty() {
                return Err(ValidationError::EmptyFile);
            }
            if file.file_name.is_empty() {
                return Err(ValidationError::EmptyFileName);
            }
        }

        Ok(self)
    }
}

fn trimmed_title(title: Option<String>) -> Result<Option<String>, ValidationError> {
    match title.map(|t| t.trim().to_string()) {
        Some(t) if t.is_empty() => Err(ValidationError::EmptyTitle),
        other => Ok(other),
    }
}

// ABOUTME: Defines Selection, the tagged "current selection" state of the outline.
// ABOUTME: Replaces a pair of nullable pointers whose validity depends on each other.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Which part of the outline is being edited.
///
/// A subchapter can only be selected together with the chapter that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Empty,
    Chapter {
        chapter_id: Ulid,
    },
    Subchapter {
        chapter_id: Ulid,
        subchapter_id: Ulid,
    },
}

impl Selection {
    pub fn chapter_id(&self) -> Option<Ulid> {
        match self {
            Self::Empty => None,
            Self::Chapter { chapter_id } | Self::Subchapter { chapter_id, .. } => Some(*chapter_id),
        }
    }

    pub fn subchapter_id(&self) -> Option<Ulid> {
        match self {
            Self::Subchapter { subchapter_id, .. } => Some(*subchapter_id),
            _ => None,
        }
    }
}

// droidport_core/src/domain.rs
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, macros::datetime};

/// One row of the backup's `Files` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogRecord {
    pub file_id: String,
    pub domain: String,
    pub relative_path: String,
    pub flags: i64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Symlink,
    Other,
}

impl CatalogRecord {
    pub fn new(file_id: &str, domain: &str, relative_path: &str, flags: i64) -> Self {
        Self {
            file_id: file_id.to_string(),
            domain: domain.to_string(),
            relative_path: relative_path.to_string(),
            flags,
        }
    }

    pub fn kind(&self) -> FileKind {
        match self.flags {
            1 => FileKind::File,
            2 => FileKind::Directory,
            4 => FileKind::Symlink,
            _ => FileKind::Other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentEntry {
    pub file_id: String,
    pub path: String,
}

/// Ordered display paths plus the fileId -> path pairs they came from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentSet {
    pub entries: Vec<DocumentEntry>,
}

impl DocumentSet {
    pub fn push(&mut self, file_id: &str, path: String) {
        self.entries.push(DocumentEntry {
            file_id: file_id.to_string(),
            path,
        });
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.path.as_str())
    }

    /// Last path recorded for `file_id`.
    pub fn path_for(&self, file_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.file_id == file_id)
            .map(|e| e.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppDocuments {
    pub app_id: String,
    pub documents: DocumentSet,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaFile {
    pub file_id: String,
    pub file_name: String,
}

/// Handle on the notes database inside the backup; not a note itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteSource {
    pub file_id: String,
    pub wal_file_id: Option<String>,
}

/// Output of the domain classifier. Apps keep first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassifiedBackup {
    pub apps: Vec<AppDocuments>,
    pub shared: Option<DocumentSet>,
    pub media: Vec<MediaFile>,
    pub notes_source: Option<NoteSource>,
}

impl ClassifiedBackup {
    pub fn app(&self, app_id: &str) -> Option<&DocumentSet> {
        self.apps
            .iter()
            .find(|a| a.app_id == app_id)
            .map(|a| &a.documents)
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
            && self.shared.is_none()
            && self.media.is_empty()
            && self.notes_source.is_none()
    }
}

/// A decoded note. Field names are the archive's wire names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub snippet: String,
    #[serde(rename = "modifyDate")]
    pub modify_date: f64,
}

const REFERENCE_DATE: OffsetDateTime = datetime!(2001-01-01 0:00 UTC);

impl Note {
    /// Interprets `modify_date` as seconds past 2001-01-01 UTC.
    pub fn modified_at(&self) -> Option<OffsetDateTime> {
        REFERENCE_DATE.checked_add(Duration::checked_seconds_f64(self.modify_date)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_kind() {
        assert_eq!(CatalogRecord::new("a", "d", "p", 1).kind(), FileKind::File);
        assert_eq!(
            CatalogRecord::new("a", "d", "p", 2).kind(),
            FileKind::Directory
        );
        assert_eq!(CatalogRecord::new("a", "d", "p", 4).kind(), FileKind::Symlink);
        assert_eq!(CatalogRecord::new("a", "d", "p", 9).kind(), FileKind::Other);
    }

    #[test]
    fn path_for_prefers_latest_entry() {
        let mut set = DocumentSet::default();
        set.push("f1", "a.txt".into());
        set.push("f1", "b.txt".into());
        assert_eq!(set.path_for("f1"), Some("b.txt"));
        assert_eq!(set.paths().collect::<Vec<_>>(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn note_date_offsets_from_reference() {
        let note = Note {
            id: 1,
            title: "t".into(),
            text: String::new(),
            snippet: String::new(),
            modify_date: 86_400.0,
        };
        assert_eq!(note.modified_at(), Some(datetime!(2001-01-02 0:00 UTC)));
    }

    #[test]
    fn note_serializes_in_stable_order() {
        let note = Note {
            id: 7,
            title: "Shopping".into(),
            text: "milk".into(),
            snippet: "milk".into(),
            modify_date: 1.5,
        };
        let s = serde_json::to_string(&note).unwrap();
        assert_eq!(
            s,
            r#"{"id":7,"title":"Shopping","text":"milk","snippet":"milk","modifyDate":1.5}"#
        );
    }
}

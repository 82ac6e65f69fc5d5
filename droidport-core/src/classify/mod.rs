use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::domain::{
    AppDocuments, CatalogRecord, ClassifiedBackup, DocumentSet, FileKind, MediaFile, NoteSource,
};

pub mod rules;

use rules::NotesFile;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bucket {
    AppDocuments,
    SharedDocuments,
    Media,
    NotesSource,
}

/// Single pass partitioning of catalog records. Rules are tried in the order
/// of [`Bucket`]; the first match wins.
#[derive(Default)]
pub struct Classifier {
    out: ClassifiedBackup,
    app_slots: HashMap<String, usize>,
    media_names: HashSet<String>,
    notes_domain: Option<String>,
    wal_by_domain: HashMap<String, String>,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rec: &CatalogRecord) -> Option<Bucket> {
        if rec.relative_path.is_empty() {
            return None;
        }
        // Folder rows carry no blob; their files create them on the device.
        if rec.kind() == FileKind::Directory {
            debug!(file_id = %rec.file_id, "skipping directory row");
            return None;
        }

        if let Some(app_id) = rules::app_id(&rec.domain) {
            if let Some(path) = rules::app_document_path(&rec.relative_path) {
                self.push_app_document(app_id, &rec.file_id, path);
                return Some(Bucket::AppDocuments);
            }
        }

        if let Some(path) = rules::shared_document_path(&rec.domain, &rec.relative_path) {
            self.out
                .shared
                .get_or_insert_with(DocumentSet::default)
                .push(&rec.file_id, path);
            return Some(Bucket::SharedDocuments);
        }

        if let Some(name) = rules::media_file_name(&rec.domain, &rec.relative_path) {
            if self.media_names.insert(name.to_string()) {
                self.out.media.push(MediaFile {
                    file_id: rec.file_id.clone(),
                    file_name: name.to_string(),
                });
            } else {
                debug!(file_id = %rec.file_id, "dropping duplicate media name {name}");
            }
            return Some(Bucket::Media);
        }

        match rules::notes_file(&rec.relative_path) {
            Some(NotesFile::Store) => {
                if let Some(prev) = &self.out.notes_source {
                    warn!(
                        previous = %prev.file_id,
                        current = %rec.file_id,
                        "more than one notes store in catalog; keeping the last"
                    );
                }
                self.out.notes_source = Some(NoteSource {
                    file_id: rec.file_id.clone(),
                    wal_file_id: None,
                });
                self.notes_domain = Some(rec.domain.clone());
                Some(Bucket::NotesSource)
            }
            Some(NotesFile::Wal) => {
                self.wal_by_domain
                    .insert(rec.domain.clone(), rec.file_id.clone());
                None
            }
            None => None,
        }
    }

    fn push_app_document(&mut self, app_id: &str, file_id: &str, path: String) {
        let slot = match self.app_slots.get(app_id) {
            Some(&slot) => slot,
            None => {
                self.out.apps.push(AppDocuments {
                    app_id: app_id.to_string(),
                    documents: DocumentSet::default(),
                });
                let slot = self.out.apps.len() - 1;
                self.app_slots.insert(app_id.to_string(), slot);
                slot
            }
        };
        self.out.apps[slot].documents.push(file_id, path);
    }

    pub fn finish(mut self) -> ClassifiedBackup {
        if let (Some(source), Some(domain)) = (&mut self.out.notes_source, &self.notes_domain) {
            source.wal_file_id = self.wal_by_domain.remove(domain);
        }
        self.out
    }
}

pub fn classify<'a, I>(records: I) -> ClassifiedBackup
where
    I: IntoIterator<Item = &'a CatalogRecord>,
{
    let mut classifier = Classifier::new();
    for rec in records {
        classifier.push(rec);
    }
    classifier.finish()
}

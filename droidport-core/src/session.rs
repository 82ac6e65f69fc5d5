use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use crate::blob::BackupDir;
use crate::catalog;
use crate::classify;
use crate::domain::{CatalogRecord, ClassifiedBackup, Note};
use crate::error::PortError;
use crate::notes;
use crate::restore::RestoreInputs;

/// Everything read out of one backup directory.
///
/// Store failures do not abort the load; they are kept here so the caller can
/// report them while still restoring whatever was readable.
#[derive(Debug)]
pub struct BackupSession {
    pub backup: BackupDir,
    pub records: Vec<CatalogRecord>,
    pub classified: ClassifiedBackup,
    pub notes: Vec<Note>,
    pub catalog_error: Option<PortError>,
    pub notes_error: Option<PortError>,
}

impl BackupSession {
    pub async fn load(root: impl Into<PathBuf>, key: Option<&str>) -> Self {
        let backup = BackupDir::new(root);
        let (records, catalog_error) =
            catalog::read_catalog_lenient(&backup.manifest_path(), key).await;
        let classified = classify::classify(&records);

        let (notes, notes_error) = match &classified.notes_source {
            Some(source) => match notes::stage(&backup, source).await {
                Ok(staged) => notes::load_notes_lenient(staged.path()).await,
                Err(e) => {
                    error!("failed to stage notes store: {e}");
                    (Vec::new(), Some(e))
                }
            },
            None => (Vec::new(), None),
        };

        info!(
            root = %backup.root().display(),
            records = records.len(),
            apps = classified.apps.len(),
            media = classified.media.len(),
            notes = notes.len(),
            "backup loaded"
        );
        Self {
            backup,
            records,
            classified,
            notes,
            catalog_error,
            notes_error,
        }
    }

    /// Hand the read side over to a restore.
    pub fn into_inputs(self) -> RestoreInputs {
        RestoreInputs {
            backup: self.backup,
            classified: Arc::new(self.classified),
            notes: Arc::new(self.notes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_manifest_is_surfaced_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let session = BackupSession::load(dir.path(), None).await;
        assert!(session.records.is_empty());
        assert!(session.classified.is_empty());
        assert!(matches!(
            session.catalog_error,
            Some(PortError::CatalogUnreadable(_))
        ));
        assert!(session.notes_error.is_none());
    }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use libsql::{Builder, Row, Value};
use tempfile::TempDir;
use tracing::{debug, error, info};

use crate::blob::BackupDir;
use crate::classify::rules::{NOTES_STORE_FILE, NOTES_WAL_FILE};
use crate::codec;
use crate::domain::{Note, NoteSource};
use crate::error::{PortError, Result};

pub mod proto;

const SYNC_QUERY: &str =
    "SELECT ZNOTEDATA, ZTITLE1, ZFOLDERMODIFICATIONDATE, ZSNIPPET FROM ZICCLOUDSYNCINGOBJECT";
const DATA_QUERY: &str = "SELECT Z_PK, ZDATA FROM ZICNOTEDATA";

fn unreadable(e: impl std::fmt::Display) -> PortError {
    PortError::NotesUnreadable(e.to_string())
}

/// A scratch copy of the notes database laid out under its real file names,
/// so SQLite can replay the WAL without touching the backup.
pub struct StagedNotesStore {
    _dir: TempDir,
    path: PathBuf,
}

impl StagedNotesStore {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub async fn stage(backup: &BackupDir, source: &NoteSource) -> Result<StagedNotesStore> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(NOTES_STORE_FILE);
    tokio::fs::copy(backup.blob_path(&source.file_id), &path)
        .await
        .map_err(|e| unreadable(format!("notes blob {}: {e}", source.file_id)))?;
    if let Some(wal) = &source.wal_file_id {
        let wal_src = backup.blob_path(wal);
        if tokio::fs::try_exists(&wal_src).await.unwrap_or(false) {
            tokio::fs::copy(&wal_src, dir.path().join(NOTES_WAL_FILE)).await?;
        }
    }
    Ok(StagedNotesStore { _dir: dir, path })
}

struct SyncRow {
    title: String,
    modify_date: f64,
    snippet: String,
}

fn real(v: Value) -> f64 {
    match v {
        Value::Real(f) => f,
        Value::Integer(i) => i as f64,
        _ => 0.0,
    }
}

fn text(v: Value) -> Option<String> {
    match v {
        Value::Text(s) => Some(s),
        _ => None,
    }
}

fn sync_row(row: &Row) -> Option<(i64, SyncRow)> {
    let key = match row.get_value(0).ok()? {
        Value::Integer(i) => i,
        _ => return None,
    };
    let title = text(row.get_value(1).ok()?).filter(|t| !t.is_empty())?;
    Some((
        key,
        SyncRow {
            title,
            modify_date: row.get_value(2).map(real).unwrap_or(0.0),
            snippet: row.get_value(3).ok().and_then(text).unwrap_or_default(),
        },
    ))
}

/// Inflate and decode one content blob into its plain text.
pub fn decode_blob(blob: &[u8]) -> Result<String> {
    let inflated = codec::inflate(blob)?;
    proto::note_text(&inflated)
}

/// Join sync objects with note data and decode every note that survives.
///
/// Only failing to open or query the store is an error; join misses and
/// undecodable blobs drop that single note.
pub async fn load_notes(store_path: &Path) -> Result<Vec<Note>> {
    if !store_path.is_file() {
        return Err(unreadable(format!("{} not found", store_path.display())));
    }
    let db = Builder::new_local(store_path)
        .build()
        .await
        .map_err(unreadable)?;
    let conn = db.connect().map_err(unreadable)?;

    let mut by_key: HashMap<i64, SyncRow> = HashMap::new();
    let mut rows = conn.query(SYNC_QUERY, ()).await.map_err(unreadable)?;
    while let Some(row) = rows.next().await.map_err(unreadable)? {
        if let Some((key, sync)) = sync_row(&row) {
            by_key.insert(key, sync);
        }
    }

    let mut notes = Vec::new();
    let mut rows = conn.query(DATA_QUERY, ()).await.map_err(unreadable)?;
    while let Some(row) = rows.next().await.map_err(unreadable)? {
        let Ok(Value::Integer(key)) = row.get_value(0) else {
            continue;
        };
        let Some(sync) = by_key.get(&key) else {
            debug!(key, "note data without titled sync object");
            continue;
        };
        let Ok(Value::Blob(blob)) = row.get_value(1) else {
            debug!(key, "note data without content blob");
            continue;
        };
        match decode_blob(&blob) {
            Ok(text) => notes.push(Note {
                id: key,
                title: sync.title.clone(),
                text,
                snippet: sync.snippet.clone(),
                modify_date: sync.modify_date,
            }),
            Err(e) => debug!(key, "skipping note: {e}"),
        }
    }
    info!(notes = notes.len(), "notes decoded");
    Ok(notes)
}

/// Like [`load_notes`], but an unreadable store yields no notes and the error
/// is handed back instead of propagated.
pub async fn load_notes_lenient(store_path: &Path) -> (Vec<Note>, Option<PortError>) {
    match load_notes(store_path).await {
        Ok(notes) => (notes, None),
        Err(e) => {
            error!("failed to load notes from {}: {e}", store_path.display());
            (Vec::new(), Some(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_blob_rejects_uncompressed_protobuf() {
        use prost::Message;
        let raw = proto::NoteStoreProto::with_text("x").encode_to_vec();
        assert!(decode_blob(&raw).is_err());
    }

    #[tokio::test]
    async fn missing_store_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let (notes, err) = load_notes_lenient(&dir.path().join("nope.sqlite")).await;
        assert!(notes.is_empty());
        assert!(matches!(err, Some(PortError::NotesUnreadable(_))));
    }

    #[tokio::test]
    async fn stage_copies_store_and_wal() {
        let dir = tempfile::tempdir().unwrap();
        for (id, body) in [("aa11", "db"), ("bb22", "wal")] {
            std::fs::create_dir_all(dir.path().join(&id[..2])).unwrap();
            std::fs::write(dir.path().join(&id[..2]).join(id), body).unwrap();
        }
        let backup = BackupDir::new(dir.path());
        let staged = stage(
            &backup,
            &NoteSource {
                file_id: "aa11".into(),
                wal_file_id: Some("bb22".into()),
            },
        )
        .await
        .unwrap();
        assert!(staged.path().ends_with(NOTES_STORE_FILE));
        assert_eq!(std::fs::read_to_string(staged.path()).unwrap(), "db");
        let wal = staged.path().with_file_name(NOTES_WAL_FILE);
        assert_eq!(std::fs::read_to_string(wal).unwrap(), "wal");
    }

    #[tokio::test]
    async fn stage_fails_for_missing_blob() {
        let dir = tempfile::tempdir().unwrap();
        let backup = BackupDir::new(dir.path());
        let res = stage(
            &backup,
            &NoteSource {
                file_id: "ffff".into(),
                wal_file_id: None,
            },
        )
        .await;
        assert!(matches!(res, Err(PortError::NotesUnreadable(_))));
    }
}

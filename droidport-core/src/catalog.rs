use std::path::Path;

use libsql::{Builder, Connection, OpenFlags};
use tracing::{debug, error, info};

use crate::domain::CatalogRecord;
use crate::error::{PortError, Result};

const FILES_QUERY: &str = "SELECT fileID, domain, relativePath, flags FROM Files";

fn unreadable(e: impl std::fmt::Display) -> PortError {
    PortError::CatalogUnreadable(e.to_string())
}

/// Apply a SQLCipher-style key before the first read.
pub(crate) async fn apply_key(conn: &Connection, key: &str) -> libsql::Result<()> {
    let stmt = format!("PRAGMA key = '{}';", key.replace('\'', "''"));
    let mut rows = conn.query(&stmt, ()).await?;
    while rows.next().await?.is_some() {}
    Ok(())
}

/// Read every row of the manifest `Files` table in store order.
///
/// Rows without a `fileID` or `domain` are dropped; a NULL `relativePath` is
/// read as empty and left for the classifier to ignore.
pub async fn read_catalog(path: &Path, key: Option<&str>) -> Result<Vec<CatalogRecord>> {
    if !path.is_file() {
        return Err(unreadable(format!("{} not found", path.display())));
    }
    let db = Builder::new_local(path)
        .flags(OpenFlags::SQLITE_OPEN_READ_ONLY)
        .build()
        .await
        .map_err(unreadable)?;
    let conn = db.connect().map_err(unreadable)?;
    if let Some(key) = key {
        apply_key(&conn, key).await.map_err(unreadable)?;
    }

    let mut rows = conn.query(FILES_QUERY, ()).await.map_err(unreadable)?;
    let mut records = Vec::new();
    while let Some(row) = rows.next().await.map_err(unreadable)? {
        let file_id = row.get::<Option<String>>(0).map_err(unreadable)?;
        let domain = row.get::<Option<String>>(1).map_err(unreadable)?;
        let (Some(file_id), Some(domain)) = (file_id, domain) else {
            debug!("skipping catalog row without fileID/domain");
            continue;
        };
        records.push(CatalogRecord {
            file_id,
            domain,
            relative_path: row
                .get::<Option<String>>(2)
                .map_err(unreadable)?
                .unwrap_or_default(),
            flags: row.get::<Option<i64>>(3).map_err(unreadable)?.unwrap_or(0),
        });
    }
    info!(records = records.len(), path = %path.display(), "catalog loaded");
    Ok(records)
}

/// Like [`read_catalog`], but an unreadable store yields no records and the
/// error is handed back instead of propagated.
pub async fn read_catalog_lenient(
    path: &Path,
    key: Option<&str>,
) -> (Vec<CatalogRecord>, Option<PortError>) {
    match read_catalog(path, key).await {
        Ok(records) => (records, None),
        Err(e) => {
            error!("failed to load {}: {e}", path.display());
            (Vec::new(), Some(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libsql::params;

    async fn manifest(dir: &Path, ddl: &str) -> std::path::PathBuf {
        let path = dir.join("Manifest.db");
        let db = Builder::new_local(&path).build().await.unwrap();
        let conn = db.connect().unwrap();
        conn.execute(ddl, ()).await.unwrap();
        path
    }

    #[tokio::test]
    async fn reads_fixed_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = manifest(
            dir.path(),
            "CREATE TABLE Files (fileID TEXT PRIMARY KEY, domain TEXT, relativePath TEXT, flags INTEGER, file BLOB)",
        )
        .await;
        {
            let db = Builder::new_local(&path).build().await.unwrap();
            let conn = db.connect().unwrap();
            conn.execute(
                "INSERT INTO Files (fileID, domain, relativePath, flags) VALUES (?1, ?2, ?3, ?4)",
                params!["abc123", "AppDomain-com.example.app", "Documents/notes.txt", 1],
            )
            .await
            .unwrap();
            conn.execute(
                "INSERT INTO Files (fileID, domain, relativePath, flags) VALUES (?1, ?2, NULL, ?3)",
                params!["dir001", "HomeDomain", 2],
            )
            .await
            .unwrap();
        }

        let records = read_catalog(&path, None).await.unwrap();
        assert_eq!(records.len(), 2);
        let first = records.iter().find(|r| r.file_id == "abc123").unwrap();
        assert_eq!(first.domain, "AppDomain-com.example.app");
        assert_eq!(first.relative_path, "Documents/notes.txt");
        assert_eq!(first.flags, 1);
        let dir_row = records.iter().find(|r| r.file_id == "dir001").unwrap();
        assert_eq!(dir_row.relative_path, "");
    }

    #[tokio::test]
    async fn wrong_schema_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = manifest(dir.path(), "CREATE TABLE Files (id TEXT, name TEXT)").await;
        let err = read_catalog(&path, None).await.unwrap_err();
        assert!(matches!(err, PortError::CatalogUnreadable(_)));
    }

    #[tokio::test]
    async fn missing_store_yields_empty_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let (records, err) = read_catalog_lenient(&dir.path().join("Manifest.db"), None).await;
        assert!(records.is_empty());
        assert!(matches!(err, Some(PortError::CatalogUnreadable(_))));
    }

    #[tokio::test]
    async fn garbage_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Manifest.db");
        std::fs::write(&path, vec![0x5au8; 4096]).unwrap();
        let (records, err) = read_catalog_lenient(&path, Some("secret")).await;
        assert!(records.is_empty());
        assert!(err.is_some());
    }
}

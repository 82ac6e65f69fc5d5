use std::path::{Path, PathBuf};

pub const MANIFEST_DB: &str = "Manifest.db";

/// Read-only view of a backup directory and its two-character blob sharding.
#[derive(Clone, Debug)]
pub struct BackupDir {
    root: PathBuf,
}

impl BackupDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_DB)
    }

    /// `<root>/<file_id[0:2]>/<file_id>`; ids shorter than two chars are not sharded.
    pub fn blob_path(&self, file_id: &str) -> PathBuf {
        match file_id.get(..2) {
            Some(shard) => self.root.join(shard).join(file_id),
            None => self.root.join(file_id),
        }
    }

    pub async fn blob_exists(&self, file_id: &str) -> bool {
        tokio::fs::metadata(self.blob_path(file_id))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shards_by_first_two_chars() {
        let b = BackupDir::new("/backups/x");
        assert_eq!(
            b.blob_path("abc123"),
            PathBuf::from("/backups/x/ab/abc123")
        );
        assert_eq!(b.manifest_path(), PathBuf::from("/backups/x/Manifest.db"));
    }

    #[test]
    fn short_ids_stay_unsharded() {
        let b = BackupDir::new("/r");
        assert_eq!(b.blob_path("a"), PathBuf::from("/r/a"));
    }

    #[tokio::test]
    async fn exists_only_for_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        let b = BackupDir::new(dir.path());
        std::fs::create_dir_all(dir.path().join("de")).unwrap();
        std::fs::write(dir.path().join("de").join("def456"), b"x").unwrap();
        assert!(b.blob_exists("def456").await);
        assert!(!b.blob_exists("dead00").await);
    }
}

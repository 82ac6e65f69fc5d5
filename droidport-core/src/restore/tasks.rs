use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use super::report::{CategoryReport, CategoryStats};
use super::{Category, Job};
use crate::config::{device_parent, join_device, join_device_checked};
use crate::domain::DocumentSet;

const RESERVED_TITLE_CHARS: &[char] = &[
    '\\', '/', '"', '!', '.', '?', '#', '%', '^', '&', '*', '(', ')', '@', '$', '|', '<', '>',
    ':', ';', '\'', '[', ']', '{', '}',
];

/// File-name-safe form of a note title; empty results fall back to the note id.
pub fn sanitize_note_title(title: &str, id: i64) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !RESERVED_TITLE_CHARS.contains(c))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        format!("Note {id}")
    } else {
        cleaned.to_string()
    }
}

/// Accumulates counts for one category and remembers which directories exist.
struct Progress<'a> {
    job: &'a Job,
    category: Category,
    stats: CategoryStats,
    made: HashSet<String>,
}

impl<'a> Progress<'a> {
    fn new(job: &'a Job, category: Category) -> Self {
        Self {
            job,
            category,
            stats: CategoryStats::default(),
            made: HashSet::new(),
        }
    }

    fn cancelled(&self) -> bool {
        self.job.cancel.is_cancelled()
    }

    async fn mkdir(&mut self, dir: &str) {
        if self.made.contains(dir) {
            return;
        }
        let outcome = self.job.channel.mkdir(dir).await;
        if outcome.ok {
            self.made.insert(dir.to_string());
        } else {
            self.stats.mkdir_failed += 1;
            warn!(category = self.category.as_str(), dir, "mkdir failed: {}", outcome.message);
        }
    }

    async fn push(&mut self, src: &Path, dst: &str) {
        let outcome = self.job.channel.push(src, dst).await;
        if outcome.ok {
            self.stats.pushed += 1;
            debug!(category = self.category.as_str(), dst, "{}", outcome.message);
        } else {
            self.stats.failed += 1;
            warn!(category = self.category.as_str(), dst, "push failed: {}", outcome.message);
        }
    }

    /// Push a backup blob if it is on disk; a missing blob is a skip.
    async fn push_blob(&mut self, file_id: &str, dst: &str) {
        let backup = &self.job.inputs.backup;
        if !backup.blob_exists(file_id).await {
            self.stats.skipped += 1;
            warn!(category = self.category.as_str(), file_id, "source blob missing");
            return;
        }
        let src = backup.blob_path(file_id);
        self.push(&src, dst).await;
    }

    /// mkdir each entry's parent then push its blob, all under `root`.
    async fn push_documents(&mut self, root: &str, documents: &DocumentSet) -> bool {
        for entry in &documents.entries {
            if self.cancelled() {
                return false;
            }
            let dst = match join_device_checked(root, &entry.path) {
                Ok(dst) => dst,
                Err(e) => {
                    self.stats.skipped += 1;
                    warn!(category = self.category.as_str(), file_id = %entry.file_id, "{e}");
                    continue;
                }
            };
            if let Some(parent) = device_parent(&dst) {
                self.mkdir(parent).await;
            }
            self.push_blob(&entry.file_id, &dst).await;
        }
        true
    }

    fn finish(self, completed: bool) -> CategoryReport {
        let report = CategoryReport::finish(self.category, self.stats, !completed);
        info!(
            category = self.category.as_str(),
            outcome = ?report.outcome,
            pushed = report.stats.pushed,
            skipped = report.stats.skipped,
            failed = report.stats.failed + report.stats.mkdir_failed,
            "category finished"
        );
        report
    }
}

pub(crate) async fn run_category(job: &Job, category: Category) -> CategoryReport {
    match category {
        Category::Media => media(job).await,
        Category::SharedDocuments => shared_documents(job).await,
        Category::Notes => notes(job).await,
        Category::NotesArchive => notes_archive(job).await,
        Category::AppData => app_data(job).await,
        Category::InstalledApps => {
            CategoryReport::skipped(category, "installing apps is not supported")
        }
    }
}

async fn media(job: &Job) -> CategoryReport {
    let mut p = Progress::new(job, Category::Media);
    let dir = job.layout.media_dir.clone();
    for file in &job.inputs.classified.media {
        if p.cancelled() {
            return p.finish(false);
        }
        p.push_blob(&file.file_id, &join_device(&dir, &file.file_name))
            .await;
    }
    p.finish(true)
}

async fn shared_documents(job: &Job) -> CategoryReport {
    let Some(shared) = job.inputs.classified.shared.as_ref() else {
        return CategoryReport::skipped(Category::SharedDocuments, "no shared documents");
    };
    let mut p = Progress::new(job, Category::SharedDocuments);
    let root = job.layout.documents_root.clone();
    let completed = p.push_documents(&root, shared).await;
    p.finish(completed)
}

async fn notes(job: &Job) -> CategoryReport {
    let notes = &job.inputs.notes;
    if notes.is_empty() {
        return CategoryReport::skipped(Category::Notes, "no notes");
    }
    let scratch = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => return CategoryReport::failed(Category::Notes, format!("scratch dir: {e}")),
    };
    let mut p = Progress::new(job, Category::Notes);
    let dir = job.layout.notes_dir.clone();
    p.mkdir(&dir).await;

    for note in notes.iter() {
        if p.cancelled() {
            return p.finish(false);
        }
        let name = format!("{}.txt", sanitize_note_title(&note.title, note.id));
        let local = scratch.path().join(&name);
        if let Err(e) = tokio::fs::write(&local, note.text.as_bytes()).await {
            p.stats.failed += 1;
            warn!(note = note.id, "writing note text failed: {e}");
            continue;
        }
        p.push(&local, &join_device(&dir, &name)).await;
        if let Err(e) = tokio::fs::remove_file(&local).await {
            debug!(note = note.id, "temp note not removed: {e}");
        }
    }
    p.finish(true)
}

async fn notes_archive(job: &Job) -> CategoryReport {
    let notes = &job.inputs.notes;
    if notes.is_empty() {
        return CategoryReport::skipped(Category::NotesArchive, "no notes");
    }
    let body = match serde_json::to_vec_pretty(notes.as_slice()) {
        Ok(b) => b,
        Err(e) => return CategoryReport::failed(Category::NotesArchive, e.to_string()),
    };
    let scratch = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => {
            return CategoryReport::failed(Category::NotesArchive, format!("scratch dir: {e}"));
        }
    };
    let mut p = Progress::new(job, Category::NotesArchive);
    if p.cancelled() {
        return p.finish(false);
    }
    let dst = job.layout.notes_archive.clone();
    let local = scratch.path().join("notes.json");
    if let Err(e) = tokio::fs::write(&local, &body).await {
        return CategoryReport::failed(Category::NotesArchive, format!("writing archive: {e}"));
    }
    if let Some(parent) = device_parent(&dst) {
        p.mkdir(parent).await;
    }
    p.push(&local, &dst).await;
    p.finish(true)
}

async fn app_data(job: &Job) -> CategoryReport {
    let mut p = Progress::new(job, Category::AppData);
    let mut unmapped = Vec::new();
    for app in &job.inputs.classified.apps {
        if p.cancelled() {
            let mut report = p.finish(false);
            report.unmapped_apps = unmapped;
            return report;
        }
        let Some(package) = job.mapping.resolve(&app.app_id) else {
            info!(
                app = %app.app_id,
                files = app.documents.len(),
                "no target package; skipping app"
            );
            p.stats.skipped += app.documents.len() as u64;
            unmapped.push(app.app_id.clone());
            continue;
        };
        let root = job.layout.app_root(package);
        p.mkdir(&root).await;
        if !p.push_documents(&root, &app.documents).await {
            let mut report = p.finish(false);
            report.unmapped_apps = unmapped;
            return report;
        }
    }
    let mut report = p.finish(true);
    report.unmapped_apps = unmapped;
    report
}

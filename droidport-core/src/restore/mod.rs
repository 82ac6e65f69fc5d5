//! Restore orchestration: one independent task per selected category, all
//! pushing through the same [`TransferChannel`].
//!
//! Within a category files go out one at a time in bucket order. A failing
//! push or mkdir is logged and counted; it never stops the category or its
//! siblings. Cancellation is observed between files.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info};

use crate::blob::BackupDir;
use crate::config::DeviceLayout;
use crate::domain::{ClassifiedBackup, Note};
use crate::error::{PortError, Result};
use crate::mapping::AppIdentifierMapping;
use crate::transfer::TransferChannel;

pub mod report;
mod tasks;

pub use report::{CategoryOutcome, CategoryReport, CategoryStats, RestoreReport};
pub use tasks::sanitize_note_title;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Media,
    Notes,
    /// Every note in one JSON document instead of one text file each.
    NotesArchive,
    SharedDocuments,
    AppData,
    /// Reserved; always reported as skipped.
    InstalledApps,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Media => "media",
            Category::Notes => "notes",
            Category::NotesArchive => "notes-archive",
            Category::SharedDocuments => "shared-documents",
            Category::AppData => "app-data",
            Category::InstalledApps => "installed-apps",
        }
    }
}

/// Deduplicated set of categories; the two notes variants never coexist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestoreSelection {
    categories: Vec<Category>,
}

impl RestoreSelection {
    pub fn new<I: IntoIterator<Item = Category>>(categories: I) -> Result<Self> {
        let mut categories: Vec<Category> = categories.into_iter().collect();
        categories.sort();
        categories.dedup();
        if categories.contains(&Category::Notes) && categories.contains(&Category::NotesArchive) {
            return Err(PortError::Config(
                "notes and notes-archive are mutually exclusive".into(),
            ));
        }
        Ok(Self { categories })
    }

    pub fn contains(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for RestoreSelection {
    fn default() -> Self {
        Self {
            categories: vec![
                Category::Media,
                Category::Notes,
                Category::SharedDocuments,
                Category::AppData,
            ],
        }
    }
}

#[derive(Clone, Debug)]
pub struct RestoreTarget {
    pub device: String,
    pub selection: RestoreSelection,
}

/// Shared flag checked by every category between files.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Read-side products a restore draws from.
#[derive(Clone, Debug)]
pub struct RestoreInputs {
    pub backup: BackupDir,
    pub classified: Arc<ClassifiedBackup>,
    pub notes: Arc<Vec<Note>>,
}

/// Per-task view of the run; cheap to clone.
#[derive(Clone)]
pub(crate) struct Job {
    pub channel: Arc<dyn TransferChannel>,
    pub mapping: Arc<AppIdentifierMapping>,
    pub layout: Arc<DeviceLayout>,
    pub inputs: RestoreInputs,
    pub cancel: CancelToken,
}

pub struct RestoreOrchestrator {
    channel: Arc<dyn TransferChannel>,
    mapping: Arc<AppIdentifierMapping>,
    layout: Arc<DeviceLayout>,
}

impl RestoreOrchestrator {
    pub fn new(
        channel: Arc<dyn TransferChannel>,
        mapping: AppIdentifierMapping,
        layout: DeviceLayout,
    ) -> Self {
        Self {
            channel,
            mapping: Arc::new(mapping),
            layout: Arc::new(layout),
        }
    }

    /// Spawn every selected category and return immediately.
    pub fn start(&self, target: &RestoreTarget, inputs: RestoreInputs) -> RestoreHandle {
        let cancel = CancelToken::new();
        let job = Job {
            channel: Arc::clone(&self.channel),
            mapping: Arc::clone(&self.mapping),
            layout: Arc::clone(&self.layout),
            inputs,
            cancel: cancel.clone(),
        };
        let selected: Vec<Category> = target.selection.iter().collect();
        let device = target.device.clone();
        info!(
            device = %device,
            channel = %self.channel.describe(),
            categories = selected.len(),
            "starting restore"
        );
        let task = tokio::spawn(run_all(job, selected, device));
        RestoreHandle { cancel, task }
    }

    /// Start and wait for every category to finish.
    pub async fn restore(&self, target: &RestoreTarget, inputs: RestoreInputs) -> RestoreReport {
        self.start(target, inputs).wait().await
    }
}

async fn run_all(job: Job, selected: Vec<Category>, device: String) -> RestoreReport {
    let mut set = JoinSet::new();
    for (slot, category) in selected.iter().copied().enumerate() {
        let job = job.clone();
        set.spawn(async move { (slot, tasks::run_category(&job, category).await) });
    }

    let mut table: Vec<Option<CategoryReport>> = vec![None; selected.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((slot, report)) => table[slot] = Some(report),
            Err(e) => error!("restore task aborted: {e}"),
        }
    }

    let categories = table
        .into_iter()
        .zip(selected)
        .map(|(report, category)| {
            report.unwrap_or_else(|| CategoryReport::failed(category, "task aborted"))
        })
        .collect();
    RestoreReport { device, categories }
}

pub struct RestoreHandle {
    cancel: CancelToken,
    task: JoinHandle<RestoreReport>,
}

impl RestoreHandle {
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn wait(self) -> RestoreReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => {
                error!("restore supervisor aborted: {e}");
                RestoreReport::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;

    use super::*;
    use crate::transfer::TransferOutcome;

    struct Exploding;

    #[async_trait]
    impl TransferChannel for Exploding {
        fn describe(&self) -> String {
            "exploding".into()
        }

        async fn push(&self, _src: &Path, _dst: &str) -> TransferOutcome {
            panic!("channel blew up")
        }

        async fn mkdir(&self, _path: &str) -> TransferOutcome {
            panic!("channel blew up")
        }
    }

    #[test]
    fn selection_dedups_and_orders() {
        let s = RestoreSelection::new([
            Category::AppData,
            Category::Media,
            Category::AppData,
        ])
        .unwrap();
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![Category::Media, Category::AppData]);
    }

    #[test]
    fn notes_variants_are_exclusive() {
        let res = RestoreSelection::new([Category::Notes, Category::NotesArchive]);
        assert!(matches!(res, Err(PortError::Config(_))));
    }

    #[test]
    fn default_selection() {
        let s = RestoreSelection::default();
        assert!(s.contains(Category::Media));
        assert!(s.contains(Category::Notes));
        assert!(!s.contains(Category::NotesArchive));
        assert!(!s.contains(Category::InstalledApps));
    }

    #[test]
    fn category_names_agree_between_text_and_json() {
        for c in [
            Category::Media,
            Category::Notes,
            Category::NotesArchive,
            Category::SharedDocuments,
            Category::AppData,
            Category::InstalledApps,
        ] {
            assert_eq!(serde_json::to_value(c).unwrap(), c.as_str());
        }
    }

    #[tokio::test]
    async fn panicking_category_is_failed_and_siblings_finish() {
        let dir = tempfile::tempdir().unwrap();
        let note = Note {
            id: 1,
            title: "a".into(),
            text: "b".into(),
            snippet: String::new(),
            modify_date: 0.0,
        };
        let orchestrator = RestoreOrchestrator::new(
            Arc::new(Exploding),
            AppIdentifierMapping::empty(),
            DeviceLayout::default(),
        );
        let target = RestoreTarget {
            device: "test".into(),
            selection: RestoreSelection::new([Category::Media, Category::Notes]).unwrap(),
        };
        let inputs = RestoreInputs {
            backup: BackupDir::new(dir.path()),
            classified: Arc::new(ClassifiedBackup::default()),
            notes: Arc::new(vec![note]),
        };
        let report = orchestrator.restore(&target, inputs).await;

        let outcomes: Vec<_> = report
            .categories
            .iter()
            .map(|r| (r.category, r.outcome))
            .collect();
        assert_eq!(
            outcomes,
            vec![
                (Category::Media, CategoryOutcome::Skipped),
                (Category::Notes, CategoryOutcome::Failed),
            ]
        );
    }

    #[test]
    fn cancel_token_is_shared() {
        let t = CancelToken::new();
        let t2 = t.clone();
        assert!(!t2.is_cancelled());
        t.cancel();
        assert!(t2.is_cancelled());
    }
}

use serde::Serialize;

use super::Category;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOutcome {
    Succeeded,
    Partial,
    Skipped,
    Cancelled,
    /// The category's task died; its counts are unknown.
    Failed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub pushed: u64,
    /// Missing source blobs and unmapped apps' files.
    pub skipped: u64,
    pub failed: u64,
    pub mkdir_failed: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    pub outcome: CategoryOutcome,
    pub stats: CategoryStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmapped_apps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CategoryReport {
    pub fn finish(category: Category, stats: CategoryStats, cancelled: bool) -> Self {
        let outcome = if cancelled {
            CategoryOutcome::Cancelled
        } else if stats.failed + stats.mkdir_failed > 0 {
            CategoryOutcome::Partial
        } else if stats.pushed == 0 {
            CategoryOutcome::Skipped
        } else if stats.skipped > 0 {
            CategoryOutcome::Partial
        } else {
            CategoryOutcome::Succeeded
        };
        Self {
            category,
            outcome,
            stats,
            unmapped_apps: Vec::new(),
            detail: None,
        }
    }

    pub fn skipped(category: Category, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::finish(category, CategoryStats::default(), false)
        }
    }

    pub fn failed(category: Category, detail: impl Into<String>) -> Self {
        Self {
            category,
            outcome: CategoryOutcome::Failed,
            stats: CategoryStats::default(),
            unmapped_apps: Vec::new(),
            detail: Some(detail.into()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RestoreReport {
    pub device: String,
    pub categories: Vec<CategoryReport>,
}

impl RestoreReport {
    pub fn get(&self, category: Category) -> Option<&CategoryReport> {
        self.categories.iter().find(|r| r.category == category)
    }

    pub fn total_pushed(&self) -> u64 {
        self.categories.iter().map(|r| r.stats.pushed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(pushed: u64, skipped: u64, failed: u64) -> CategoryStats {
        CategoryStats {
            pushed,
            skipped,
            failed,
            mkdir_failed: 0,
        }
    }

    #[test]
    fn outcome_from_counts() {
        let o = |s, c| CategoryReport::finish(Category::Media, s, c).outcome;
        assert_eq!(o(stats(3, 0, 0), false), CategoryOutcome::Succeeded);
        assert_eq!(o(stats(3, 1, 0), false), CategoryOutcome::Partial);
        assert_eq!(o(stats(3, 0, 1), false), CategoryOutcome::Partial);
        assert_eq!(o(stats(0, 0, 2), false), CategoryOutcome::Partial);
        assert_eq!(o(stats(0, 4, 0), false), CategoryOutcome::Skipped);
        assert_eq!(o(stats(0, 0, 0), false), CategoryOutcome::Skipped);
        assert_eq!(o(stats(3, 0, 0), true), CategoryOutcome::Cancelled);
    }

    #[test]
    fn skipped_carries_detail() {
        let r = CategoryReport::skipped(Category::InstalledApps, "not supported");
        assert_eq!(r.outcome, CategoryOutcome::Skipped);
        assert_eq!(r.detail.as_deref(), Some("not supported"));
    }
}

//! Reading activities with progressive page unlocking.

use serde::{Deserialize, Serialize};

/// A paginated reading text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingActivity {
    pub id: i64,
    pub title: String,
}

/// One page of a reading activity. Page numbers start at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingPage {
    pub id: i64,
    pub activity_id: i64,
    pub page_number: u32,
    pub content: String,
}

/// Per-user unlock state for one activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingProgress {
    pub user_id: String,
    pub activity_id: i64,
    /// Unlocked page numbers, kept sorted. Page 1 is always unlocked.
    pub unlocked_pages: Vec<u32>,
}

impl ReadingProgress {
    /// Fresh progress with only the first page unlocked.
    pub fn new(user_id: impl Into<String>, activity_id: i64) -> Self {
        Self {
            user_id: user_id.into(),
            activity_id,
            unlocked_pages: vec![1],
        }
    }

    /// Unlocked pages cleaned against the activity's page count: page 1
    /// forced in, sorted, deduplicated, out-of-range pages dropped.
    pub fn normalized_unlocked(&self, total_pages: u32) -> Vec<u32> {
        if total_pages == 0 {
            return Vec::new();
        }
        let mut pages: Vec<u32> = self
            .unlocked_pages
            .iter()
            .copied()
            .filter(|p| *p >= 1 && *p <= total_pages)
            .collect();
        if !pages.contains(&1) {
            pages.push(1);
        }
        pages.sort_unstable();
        pages.dedup();
        pages
    }

    /// Check whether a page is unlocked.
    pub fn is_unlocked(&self, page_number: u32) -> bool {
        page_number == 1 || self.unlocked_pages.contains(&page_number)
    }

    /// Mark a page unlocked. Returns true if the set changed.
    pub fn unlock(&mut self, page_number: u32) -> bool {
        if self.unlocked_pages.contains(&page_number) {
            return false;
        }
        self.unlocked_pages.push(page_number);
        self.unlocked_pages.sort_unstable();
        true
    }

    /// Summarize progress against the activity's page count.
    pub fn overview(&self, total_pages: u32) -> ActivityOverview {
        let unlocked = self.normalized_unlocked(total_pages);
        let pages_unlocked = unlocked.len() as u32;
        let completion_ratio = if total_pages == 0 {
            100
        } else {
            ((pages_unlocked as f64 / total_pages as f64) * 100.0).round() as u32
        };
        let completed = total_pages > 0 && completion_ratio >= 100;
        let next_page = if completed {
            total_pages
        } else {
            unlocked.last().copied().unwrap_or(1)
        };
        ActivityOverview {
            total_pages,
            pages_unlocked,
            pages_remaining: total_pages.saturating_sub(pages_unlocked),
            completion_ratio,
            completed,
            next_page: next_page.clamp(1, total_pages.max(1)),
        }
    }
}

/// Per-activity progress summary for activity listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityOverview {
    pub total_pages: u32,
    pub pages_unlocked: u32,
    pub pages_remaining: u32,
    /// Whole-number percentage of pages unlocked.
    pub completion_ratio: u32,
    pub completed: bool,
    /// The page a resuming reader should land on.
    pub next_page: u32,
}

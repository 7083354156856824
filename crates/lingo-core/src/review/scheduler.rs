//! Stage/ease review scheduler.
//!
//! Pure state machine over (learning_stage, ease_factor): grading outcomes
//! map to the next stage, ease factor, interval, and due timestamp.

use chrono::{DateTime, Duration, Utc};

use crate::types::VocabularyEntry;

/// Stage at which free-text intervals begin growing exponentially.
const FREE_TEXT_STAGE: u32 = 3;

/// One minute expressed in fractional days.
const RELEARN_INTERVAL_DAYS: f64 = 1.0 / 1440.0;

/// Cap so the chrono conversion stays in range for any stage/ease pair.
const MAX_INTERVAL_DAYS: f64 = 36_500.0;

/// The scheduling fields produced by one grading event.
///
/// All four fields are committed together or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewUpdate {
    pub learning_stage: u32,
    pub ease_factor: f64,
    /// New interval in fractional days.
    pub interval: f64,
    pub next_review: DateTime<Utc>,
}

/// Scheduler for vocabulary review timing.
#[derive(Debug, Clone)]
pub struct ReviewScheduler {
    /// Floor for the ease factor.
    min_ease: f64,
    /// Ease factor assigned to new and relearning words.
    default_ease: f64,
    /// Amount the ease factor shrinks per correct answer.
    ease_step: f64,
}

impl ReviewScheduler {
    /// Create a scheduler with the default parameters.
    pub fn new() -> Self {
        Self {
            min_ease: 1.3,
            default_ease: 2.5,
            ease_step: 0.2,
        }
    }

    /// The review interval in fractional days for a stage/ease pair.
    ///
    /// Early stages repeat after one minute; from stage 3 on the interval
    /// is one day multiplied by `ease^(stage - 3)`.
    pub fn next_interval(&self, stage: u32, ease_factor: f64) -> f64 {
        if stage < FREE_TEXT_STAGE {
            RELEARN_INTERVAL_DAYS
        } else {
            ease_factor
                .powi((stage - FREE_TEXT_STAGE) as i32)
                .min(MAX_INTERVAL_DAYS)
        }
    }

    /// Scheduling update for a correct answer.
    ///
    /// The stage advances and the ease factor shrinks toward its floor,
    /// slowing interval growth for words the user keeps getting right.
    pub fn review_correct(&self, entry: &VocabularyEntry, now: DateTime<Utc>) -> ReviewUpdate {
        let learning_stage = entry.learning_stage + 1;
        let ease_factor = (entry.ease_factor - self.ease_step).max(self.min_ease);
        let interval = self.next_interval(learning_stage, ease_factor);
        ReviewUpdate {
            learning_stage,
            ease_factor,
            interval,
            next_review: now + interval_duration(interval),
        }
    }

    /// Scheduling update for an incorrect answer.
    ///
    /// The word restarts: stage 0, default ease, due again in one minute.
    pub fn review_incorrect(&self, now: DateTime<Utc>) -> ReviewUpdate {
        let interval = self.next_interval(0, self.default_ease);
        ReviewUpdate {
            learning_stage: 0,
            ease_factor: self.default_ease,
            interval,
            next_review: now + interval_duration(interval),
        }
    }

    /// Scheduling update for a grading outcome.
    pub fn apply(
        &self,
        entry: &VocabularyEntry,
        correct: bool,
        now: DateTime<Utc>,
    ) -> ReviewUpdate {
        if correct {
            self.review_correct(entry, now)
        } else {
            self.review_incorrect(now)
        }
    }
}

impl Default for ReviewScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a fractional-day interval to a chrono duration.
fn interval_duration(days: f64) -> Duration {
    Duration::seconds((days * 86_400.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(stage: u32, ease: f64) -> VocabularyEntry {
        VocabularyEntry {
            id: 1,
            user_id: "u1".to_string(),
            word: "chat".to_string(),
            translation: "cat".to_string(),
            pronunciation_url: None,
            next_review: Utc::now(),
            interval: 0.0,
            ease_factor: ease,
            learning_stage: stage,
        }
    }

    #[test]
    fn test_interval_below_free_text_stage_is_one_minute() {
        let scheduler = ReviewScheduler::new();
        assert_eq!(scheduler.next_interval(0, 2.5), 1.0 / 1440.0);
        assert_eq!(scheduler.next_interval(2, 2.5), 1.0 / 1440.0);
    }

    #[test]
    fn test_interval_grows_exponentially_from_stage_three() {
        let scheduler = ReviewScheduler::new();
        assert_eq!(scheduler.next_interval(3, 2.0), 1.0);
        assert_eq!(scheduler.next_interval(4, 2.0), 2.0);
        assert_eq!(scheduler.next_interval(5, 2.0), 4.0);
        assert_eq!(scheduler.next_interval(5, 1.3), 1.3 * 1.3);
    }

    #[test]
    fn test_correct_advances_stage_and_shrinks_ease() {
        let scheduler = ReviewScheduler::new();
        let now = Utc::now();

        let update = scheduler.review_correct(&entry(4, 2.1), now);
        assert_eq!(update.learning_stage, 5);
        assert!((update.ease_factor - 1.9).abs() < 1e-9);
        assert!(update.next_review > now);
    }

    #[test]
    fn test_ease_never_drops_below_floor() {
        let scheduler = ReviewScheduler::new();
        let now = Utc::now();

        let update = scheduler.review_correct(&entry(3, 1.35), now);
        assert_eq!(update.ease_factor, 1.3);

        let again = scheduler.review_correct(&entry(4, update.ease_factor), now);
        assert_eq!(again.ease_factor, 1.3);
    }

    #[test]
    fn test_incorrect_resets_regardless_of_prior_state() {
        let scheduler = ReviewScheduler::new();
        let now = Utc::now();

        for (stage, ease) in [(0, 2.5), (2, 1.3), (9, 1.7)] {
            let update = scheduler.apply(&entry(stage, ease), false, now);
            assert_eq!(update.learning_stage, 0);
            assert_eq!(update.ease_factor, 2.5);
            assert_eq!(update.interval, 1.0 / 1440.0);
        }
    }

    #[test]
    fn test_incorrect_is_due_in_one_minute() {
        let scheduler = ReviewScheduler::new();
        let now = Utc::now();
        let update = scheduler.review_incorrect(now);
        assert_eq!(update.next_review, now + Duration::seconds(60));
    }

    #[test]
    fn test_next_review_is_always_in_the_future() {
        let scheduler = ReviewScheduler::new();
        let now = Utc::now();
        for stage in 0..8 {
            let update = scheduler.apply(&entry(stage, 2.0), true, now);
            assert!(update.next_review > now);
            let update = scheduler.apply(&entry(stage, 2.0), false, now);
            assert!(update.next_review > now);
        }
    }

    #[test]
    fn test_huge_stage_does_not_overflow() {
        let scheduler = ReviewScheduler::new();
        let interval = scheduler.next_interval(10_000, 2.5);
        assert_eq!(interval, 36_500.0);
    }
}

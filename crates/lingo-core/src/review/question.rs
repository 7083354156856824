//! Question construction for review attempts.
//!
//! Maps a word's learning stage to a question format and builds the
//! supporting material (multiple-choice options, scrambled letters). All
//! randomness comes through the caller's rng so tests can seed it.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::review::session::ReviewSession;
use crate::types::VocabularyEntry;

/// Maximum number of wrong options in a multiple-choice question.
const MAX_DISTRACTORS: usize = 3;

/// How a question is answered.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionFormat {
    /// Pick the answer from shuffled options.
    MultipleChoice { options: Vec<String> },
    /// Reassemble the answer from its scrambled letters.
    Unscramble { scrambled: String },
    /// Type the answer.
    FreeText,
}

/// A renderable review question for one due word.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub word_id: i64,
    /// The side of the card shown to the user.
    pub prompt: String,
    pub stage: u32,
    #[serde(flatten)]
    pub format: QuestionFormat,
}

/// Sample up to three unique distractors for a multiple-choice question.
///
/// Candidates equal to the correct answer (and exact duplicates) are
/// excluded; the draw is uniform without replacement. Fewer than three
/// available means all of them are used.
pub fn sample_distractors<R: Rng + ?Sized>(
    correct: &str,
    pool: &[String],
    rng: &mut R,
) -> Vec<String> {
    let mut candidates: Vec<&String> = Vec::new();
    for value in pool {
        if value != correct && !candidates.contains(&value) {
            candidates.push(value);
        }
    }
    candidates
        .choose_multiple(rng, MAX_DISTRACTORS)
        .map(|s| (*s).clone())
        .collect()
}

/// Build the shuffled option list: distractors plus the correct answer,
/// order-randomized so the correct choice has no fixed position.
fn build_options<R: Rng + ?Sized>(correct: &str, pool: &[String], rng: &mut R) -> Vec<String> {
    let mut options = sample_distractors(correct, pool, rng);
    options.push(correct.to_string());
    options.shuffle(rng);
    options
}

/// Produce a random permutation of a word's letters.
pub fn scramble_word<R: Rng + ?Sized>(word: &str, rng: &mut R) -> String {
    let mut letters: Vec<char> = word.chars().collect();
    letters.shuffle(rng);
    letters.into_iter().collect()
}

/// Build the question for a due entry at its current stage.
///
/// `others` is the user's remaining vocabulary, used as the distractor
/// pool. For stage 2 the scrambled letters are taken from the session if
/// this word already has an attempt in flight, otherwise generated fresh
/// and stored there.
pub fn build_question<R: Rng + ?Sized>(
    entry: &VocabularyEntry,
    others: &[VocabularyEntry],
    session: &mut ReviewSession,
    rng: &mut R,
) -> Question {
    let format = match entry.learning_stage {
        0 => {
            let pool: Vec<String> = others.iter().map(|e| e.word.clone()).collect();
            QuestionFormat::MultipleChoice {
                options: build_options(&entry.word, &pool, rng),
            }
        }
        1 => {
            let pool: Vec<String> = others.iter().map(|e| e.translation.clone()).collect();
            QuestionFormat::MultipleChoice {
                options: build_options(&entry.translation, &pool, rng),
            }
        }
        2 => {
            let scrambled = match session.scrambled_for(entry.id) {
                Some(letters) => letters.to_string(),
                None => {
                    let letters = scramble_word(&entry.word, rng);
                    session.set_scrambled(entry.id, letters.clone());
                    letters
                }
            };
            QuestionFormat::Unscramble { scrambled }
        }
        _ => QuestionFormat::FreeText,
    };

    Question {
        word_id: entry.id,
        prompt: entry.prompt().to_string(),
        stage: entry.learning_stage,
        format,
    }
}

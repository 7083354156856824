//! Integration tests for the test grading engine.
//!
//! Exercises the store-render-grade cycle: content is stored once,
//! parsed fresh per request, and graded against normalized answers.

use std::collections::HashMap;

use chrono::Utc;
use lingo_core::grading::{
    grade_standard, grade_tile_order, paragraph_tiles, parse_test_content, sentence_tiles,
    shuffle_tiles,
};
use lingo_core::store::{NewTest, TestStore};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn answers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_store_render_grade_cycle() {
    let store = TestStore::in_memory().unwrap();
    let test = store
        .add_test(&NewTest {
            book_title: "Geography".to_string(),
            name: "Capitals".to_string(),
            content: "The capital of France is #[Paris, London, Berlin] Paris#.\n\
                      The cat sat on the [mat]."
                .to_string(),
            time_limit: Some(10),
            shuffle_sentences: false,
            shuffle_paragraphs: false,
            created_by: "teacher".to_string(),
        })
        .unwrap();

    // Parse fresh, as a render request would
    let fetched = store.require_test(test.id).unwrap();
    let parsed = parse_test_content(&fetched.content).unwrap();
    assert_eq!(parsed.total_questions(), 2);

    // Re-parsing reproduces the same ids and answers
    let reparsed = parse_test_content(&fetched.content).unwrap();
    assert_eq!(parsed.answer_key(), reparsed.answer_key());

    // Case- and accent-insensitive grading
    let grade = grade_standard(&parsed, &answers(&[("q1", "paris"), ("q2", "Mat")]));
    assert_eq!(grade.score, 2);
    assert_eq!(grade.total, 2);

    let grade = grade_standard(&parsed, &answers(&[("q1", "london"), ("q2", "rug")]));
    assert_eq!(grade.score, 0);

    // Record the attempt
    let result = store
        .record_result("student", test.id, grade.score, grade.total, Utc::now())
        .unwrap();
    assert_eq!(result.total_questions, 2);
    assert_eq!(store.results_for_user("student").unwrap().len(), 1);
}

#[test]
fn test_drag_and_drop_scoring() {
    let content = "First sentence. Second sentence. Third sentence.";
    let original = sentence_tiles(content);
    assert_eq!(original.len(), 3);

    // Swapping the first two leaves only the third in place
    let submitted = vec![
        "item_2".to_string(),
        "item_1".to_string(),
        "item_3".to_string(),
    ];
    let grade = grade_tile_order(&original, &submitted).unwrap();
    assert_eq!(grade.score, 1);
    assert_eq!(grade.total, 3);

    // A perfect ordering scores full marks
    let perfect: Vec<String> = original.iter().map(|t| t.id.clone()).collect();
    let grade = grade_tile_order(&original, &perfect).unwrap();
    assert_eq!(grade.score, 3);
}

#[test]
fn test_shuffled_presentation_grades_against_original_order() {
    let content = "Alpha.\n\nBeta.\n\nGamma.\n\nDelta.";
    let original = paragraph_tiles(content);

    let mut presented = original.clone();
    let mut rng = StdRng::seed_from_u64(99);
    shuffle_tiles(&mut presented, &mut rng);

    // Submitting the presented order scores by position against the
    // original order, whatever the shuffle did
    let submitted: Vec<String> = presented.iter().map(|t| t.id.clone()).collect();
    let grade = grade_tile_order(&original, &submitted).unwrap();
    let expected = submitted
        .iter()
        .zip(original.iter())
        .filter(|(submitted_id, original_tile)| **submitted_id == original_tile.id)
        .count() as u32;
    assert_eq!(grade.score, expected);
}

#[test]
fn test_learn_progress_resume_cycle() {
    let store = TestStore::in_memory().unwrap();
    let test = store
        .add_test(&NewTest {
            book_title: "Grammar".to_string(),
            name: "Articles".to_string(),
            content: "[le] chat et [la] vache".to_string(),
            time_limit: None,
            shuffle_sentences: false,
            shuffle_paragraphs: false,
            created_by: "teacher".to_string(),
        })
        .unwrap();
    let parsed = parse_test_content(&test.content).unwrap();
    let now = Utc::now();

    // A half-finished attempt is saved for resuming
    let partial = answers(&[("q1", "le")]);
    let grade = grade_standard(&parsed, &partial);
    assert!(!grade.all_correct());
    store.save_progress("student", test.id, &partial, now).unwrap();

    let resumed = store.get_progress("student", test.id).unwrap().unwrap();
    assert_eq!(resumed.answers, partial);

    // Completing every field records the result and clears the save
    let complete = answers(&[("q1", "Le"), ("q2", "LA")]);
    let grade = grade_standard(&parsed, &complete);
    assert!(grade.all_correct());
    store.record_learn_completion("student", test.id, now).unwrap();
    assert!(store.get_progress("student", test.id).unwrap().is_none());
}

#[test]
fn test_malformed_markup_is_rejected_without_mutation() {
    let content = "#[Paris, London] Berlin#";
    assert!(parse_test_content(content).is_err());
}

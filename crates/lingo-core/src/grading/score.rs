//! Scoring for standard (blank-based) tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::grading::parser::ParsedTest;
use crate::normalize::normalize;

/// Grading outcome for one blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedField {
    pub id: String,
    pub correct_answer: String,
    /// What the user submitted, empty string when the field was left blank.
    pub submitted: String,
    pub is_correct: bool,
}

/// Grading outcome for a whole submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardGrade {
    /// Per-field outcomes in question-id order.
    pub fields: Vec<GradedField>,
    pub score: u32,
    pub total: u32,
}

impl StandardGrade {
    /// True when every field is correct (and there is at least one).
    pub fn all_correct(&self) -> bool {
        self.total > 0 && self.score == self.total
    }
}

/// Grade a submission against parsed content.
///
/// Each question id is graded by normalized equality between the
/// submitted value and the reference answer; missing submissions grade
/// as incorrect (unless the normalized reference is itself empty, which
/// the parser rejects).
pub fn grade_standard(parsed: &ParsedTest, answers: &HashMap<String, String>) -> StandardGrade {
    let mut fields = Vec::new();
    let mut score = 0u32;

    for blank in parsed.blanks() {
        let submitted = answers.get(&blank.id).cloned().unwrap_or_default();
        let is_correct = normalize(&submitted) == normalize(blank.answer());
        if is_correct {
            score += 1;
        }
        fields.push(GradedField {
            id: blank.id.clone(),
            correct_answer: blank.answer().to_string(),
            submitted,
            is_correct,
        });
    }

    StandardGrade {
        total: fields.len() as u32,
        fields,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::parser::parse_test_content;

    fn answers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_free_text_case_insensitive() {
        let parsed = parse_test_content("The cat sat on the [mat].").unwrap();

        let grade = grade_standard(&parsed, &answers(&[("q1", "Mat")]));
        assert_eq!(grade.score, 1);
        assert_eq!(grade.total, 1);
        assert!(grade.fields[0].is_correct);

        let grade = grade_standard(&parsed, &answers(&[("q1", "rug")]));
        assert_eq!(grade.score, 0);
        assert_eq!(grade.total, 1);
        assert!(!grade.fields[0].is_correct);
    }

    #[test]
    fn test_dropdown_accent_insensitive() {
        let parsed = parse_test_content("#[Paris, London] Paris#").unwrap();
        let grade = grade_standard(&parsed, &answers(&[("q1", "paris")]));
        assert_eq!(grade.score, 1);
    }

    #[test]
    fn test_missing_submission_is_incorrect() {
        let parsed = parse_test_content("[a] and [b]").unwrap();
        let grade = grade_standard(&parsed, &answers(&[("q1", "a")]));
        assert_eq!(grade.score, 1);
        assert_eq!(grade.total, 2);
        assert!(!grade.fields[1].is_correct);
        assert_eq!(grade.fields[1].submitted, "");
    }

    #[test]
    fn test_all_correct() {
        let parsed = parse_test_content("[a] and [b]").unwrap();
        let grade = grade_standard(&parsed, &answers(&[("q1", "a"), ("q2", "B")]));
        assert!(grade.all_correct());

        let empty = parse_test_content("no blanks here").unwrap();
        assert!(!grade_standard(&empty, &HashMap::new()).all_correct());
    }

    #[test]
    fn test_fields_in_question_order() {
        let parsed = parse_test_content("[a] #[x, y] x# [b]").unwrap();
        let grade = grade_standard(&parsed, &HashMap::new());
        let ids: Vec<&str> = grade.fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
    }
}

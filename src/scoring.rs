//! Major-recommendation scoring for exam submissions.

use thiserror::Error;

use crate::{
    error::AppError,
    models::{ExamQuestion, FeedbackChoice, MajorPercentage},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("User answers cannot be empty")]
    NoAnswers,
    #[error("The exam has no questions")]
    NoQuestions,
    #[error("Expected {expected} answers but received {received}")]
    LengthMismatch { expected: usize, received: usize },
}

impl From<ScoringError> for AppError {
    fn from(err: ScoringError) -> Self {
        AppError::Validation(err.to_string())
    }
}

struct Tally<'a> {
    major_id: i64,
    major_name: &'a str,
    sum: u32,
    count: u32,
}

/// score_majors
///
/// Pairs each answer with the question at the same position and credits the answer's
/// points (5 for STRONGLY_AGREE down to 1) to every major the question feeds. A major's
/// percentage is `sum / (count * 5) * 100`, rounded to two decimals.
///
/// The result is ordered best first. Majors with equal percentages keep the order in which
/// they first appeared in the question list.
///
/// The answer count must equal the question count exactly; anything else is rejected
/// before any points are tallied.
pub fn score_majors(
    questions: &[ExamQuestion],
    answers: &[FeedbackChoice],
) -> Result<Vec<MajorPercentage>, ScoringError> {
    if answers.is_empty() {
        return Err(ScoringError::NoAnswers);
    }
    if questions.is_empty() {
        return Err(ScoringError::NoQuestions);
    }
    if answers.len() != questions.len() {
        return Err(ScoringError::LengthMismatch {
            expected: questions.len(),
            received: answers.len(),
        });
    }

    let mut tallies: Vec<Tally<'_>> = Vec::new();
    for (question, answer) in questions.iter().zip(answers) {
        for (major_id, major_name) in question.majors() {
            match tallies.iter_mut().find(|t| t.major_id == major_id) {
                Some(tally) => {
                    tally.sum += answer.score();
                    tally.count += 1;
                }
                None => tallies.push(Tally {
                    major_id,
                    major_name,
                    sum: answer.score(),
                    count: 1,
                }),
            }
        }
    }

    let mut percentages: Vec<MajorPercentage> = tallies
        .into_iter()
        .map(|t| MajorPercentage {
            major_id: t.major_id,
            major_name: t.major_name.to_string(),
            percentage: round2(f64::from(t.sum) / f64::from(t.count * 5) * 100.0),
        })
        .collect();

    // `sort_by` is stable, so ties keep first-appearance order.
    percentages.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    Ok(percentages)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use FeedbackChoice::*;

    fn question(id: i64, first: (i64, &str), second: Option<(i64, &str)>) -> ExamQuestion {
        ExamQuestion {
            id,
            question_text: format!("question {id}"),
            exam_id: 1,
            first_major_id: first.0,
            first_major_name: first.1.to_string(),
            second_major_id: second.map(|s| s.0),
            second_major_name: second.map(|s| s.1.to_string()),
            answers: vec![],
        }
    }

    #[test]
    fn all_strongly_agree_on_one_major_is_full_marks() {
        let questions: Vec<_> = (1..=5).map(|id| question(id, (7, "CS"), None)).collect();
        let result = score_majors(&questions, &[StronglyAgree; 5]).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].major_id, 7);
        assert_eq!(result[0].percentage, 100.0);
    }

    #[test]
    fn shared_questions_credit_both_majors() {
        let questions = vec![
            question(1, (1, "CS"), Some((2, "Math"))),
            question(2, (2, "Math"), None),
        ];
        let result = score_majors(&questions, &[Agree, StronglyDisagree]).unwrap();

        // CS: 4 / 5 = 80%. Math: (4 + 1) / 10 = 50%.
        assert_eq!(result[0].major_name, "CS");
        assert_eq!(result[0].percentage, 80.0);
        assert_eq!(result[1].major_name, "Math");
        assert_eq!(result[1].percentage, 50.0);
    }

    #[test]
    fn percentages_are_rounded_to_two_decimals() {
        let questions = vec![
            question(1, (1, "CS"), None),
            question(2, (1, "CS"), None),
            question(3, (1, "CS"), None),
        ];
        let result = score_majors(&questions, &[StronglyAgree, StronglyAgree, Agree]).unwrap();

        // 14 / 15 = 93.333...
        assert_eq!(result[0].percentage, 93.33);
    }

    #[test]
    fn ties_keep_first_appearance_order() {
        let questions = vec![
            question(1, (3, "Design"), None),
            question(2, (1, "CS"), None),
        ];
        let result = score_majors(&questions, &[Neutral, Neutral]).unwrap();

        assert_eq!(result[0].major_id, 3);
        assert_eq!(result[1].major_id, 1);
    }

    #[test]
    fn answer_count_must_match_question_count() {
        let questions = vec![question(1, (1, "CS"), None), question(2, (1, "CS"), None)];

        assert_eq!(
            score_majors(&questions, &[Agree]),
            Err(ScoringError::LengthMismatch { expected: 2, received: 1 })
        );
        assert_eq!(
            score_majors(&questions, &[Agree, Agree, Agree]),
            Err(ScoringError::LengthMismatch { expected: 2, received: 3 })
        );
    }

    #[test]
    fn empty_submissions_are_rejected() {
        let questions = vec![question(1, (1, "CS"), None)];
        assert_eq!(score_majors(&questions, &[]), Err(ScoringError::NoAnswers));
        assert_eq!(score_majors(&[], &[Agree]), Err(ScoringError::NoQuestions));
    }
}

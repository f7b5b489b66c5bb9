use std::collections::HashSet;

/// Aggregate result of scoring one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScoreSummary {
    pub(crate) correct_count: i32,
    pub(crate) total_questions: i32,
    pub(crate) score: i32,
}

/// A question counts as correct only when the selected option set equals
/// the correct option set exactly. No partial credit: one extra or one
/// missing selection fails the whole question.
pub(crate) fn question_is_correct(
    correct_option_ids: &HashSet<String>,
    selected_option_ids: &HashSet<String>,
) -> bool {
    correct_option_ids == selected_option_ids
}

/// Percentage score rounded to the nearest integer; 0 when there are no
/// questions.
pub(crate) fn percentage_score(correct_count: usize, total_questions: usize) -> i32 {
    if total_questions == 0 {
        return 0;
    }
    ((correct_count as f64 / total_questions as f64) * 100.0).round() as i32
}

pub(crate) fn score_attempt(question_outcomes: &[bool]) -> ScoreSummary {
    let correct_count = question_outcomes.iter().filter(|outcome| **outcome).count();
    let total_questions = question_outcomes.len();

    ScoreSummary {
        correct_count: correct_count as i32,
        total_questions: total_questions as i32,
        score: percentage_score(correct_count, total_questions),
    }
}

pub(crate) fn is_passing(score: i32, passing_score: i32) -> bool {
    score >= passing_score
}

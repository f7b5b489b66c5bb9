mod commands;
mod queries;
mod types;

pub(crate) use commands::{
    acquire_start_lock, complete, create, insert_snapshot, set_question_flag, update_selections,
};
pub(crate) use queries::{
    answer_state, count_by_exam, count_questions, find_by_id, find_in_progress, list_answers,
    list_by_exam, list_questions, lock_by_id, question_refs,
};
pub(crate) use types::{
    AnswerStateRow, AttemptSummaryRow, CreateAttempt, QuestionRef, SnapshotAnswer,
    SnapshotQuestion,
};

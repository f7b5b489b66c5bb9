use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::AttemptStatus;
use crate::repositories;
use crate::test_support::{self, ExamFixture};

async fn start_attempt(
    ctx: &test_support::TestContext,
    exam_id: &str,
    user_id: &str,
) -> (StatusCode, serde_json::Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::identity_request(
            Method::POST,
            &format!("/api/v1/exams/{exam_id}/attempts"),
            Some(user_id),
            None,
        ))
        .await
        .expect("start attempt");
    let status = response.status();
    let body = test_support::read_json(response).await;
    (status, body)
}

async fn record_answers(
    ctx: &test_support::TestContext,
    attempt_id: &str,
    user_id: &str,
    answers: serde_json::Value,
) -> StatusCode {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::identity_request(
            Method::PUT,
            &format!("/api/v1/attempts/{attempt_id}/answers"),
            Some(user_id),
            Some(json!({ "answers": answers })),
        ))
        .await
        .expect("record answers");
    response.status()
}

async fn submit_attempt(
    ctx: &test_support::TestContext,
    attempt_id: &str,
    user_id: &str,
) -> (StatusCode, serde_json::Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::identity_request(
            Method::POST,
            &format!("/api/v1/attempts/{attempt_id}/submit"),
            Some(user_id),
            Some(json!({})),
        ))
        .await
        .expect("submit attempt");
    let status = response.status();
    let body = test_support::read_json(response).await;
    (status, body)
}

async fn get_attempt(
    ctx: &test_support::TestContext,
    attempt_id: &str,
    user_id: &str,
) -> (StatusCode, serde_json::Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::identity_request(
            Method::GET,
            &format!("/api/v1/attempts/{attempt_id}"),
            Some(user_id),
            None,
        ))
        .await
        .expect("get attempt");
    let status = response.status();
    let body = test_support::read_json(response).await;
    (status, body)
}

#[tokio::test]
async fn start_is_idempotent_per_user_and_exam() {
    let ctx = test_support::setup_test_context().await;

    let student = test_support::insert_user(ctx.state.db(), "s1@medprep.test", "Student One").await;
    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;
    test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        1,
        "First-line therapy for anaphylaxis?",
        &[("Epinephrine", true), ("Diphenhydramine", false)],
    )
    .await;
    test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        2,
        "Murmur of aortic stenosis radiates to?",
        &[("Carotids", true), ("Axilla", false)],
    )
    .await;

    let (status, first) = start_attempt(&ctx, &exam_id, &student.id).await;
    assert_eq!(status, StatusCode::CREATED, "response: {first}");
    assert_eq!(first["question_count"], 2);
    assert_eq!(first["time_limit_seconds"], 3600);
    assert_eq!(first["resumed"], false);

    let (status, second) = start_attempt(&ctx, &exam_id, &student.id).await;
    assert_eq!(status, StatusCode::OK, "response: {second}");
    assert_eq!(second["attempt_id"], first["attempt_id"]);
    assert_eq!(second["resumed"], true);
    assert_eq!(second["question_count"], 2);

    // Exactly one snapshot exists in storage.
    let attempt_id = first["attempt_id"].as_str().expect("attempt id");
    let question_count = repositories::attempts::count_questions(ctx.state.db(), attempt_id)
        .await
        .expect("count questions");
    assert_eq!(question_count, 2);

    let attempt_count =
        repositories::attempts::count_by_exam(ctx.state.db(), &exam_id, None).await.expect("count");
    assert_eq!(attempt_count, 1);
}

#[tokio::test]
async fn start_rejects_unpublished_and_unknown_exams() {
    let ctx = test_support::setup_test_context().await;

    let student = test_support::insert_user(ctx.state.db(), "s2@medprep.test", "Student Two").await;
    let exam_id = test_support::insert_exam(
        ctx.state.db(),
        ExamFixture { is_published: false, ..ExamFixture::default() },
    )
    .await;

    let (status, body) = start_attempt(&ctx, &exam_id, &student.id).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");

    let (status, body) = start_attempt(&ctx, "missing-exam", &student.id).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "response: {body}");
}

#[tokio::test]
async fn requests_without_known_identity_are_unauthorized() {
    let ctx = test_support::setup_test_context().await;

    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::identity_request(
            Method::POST,
            &format!("/api/v1/exams/{exam_id}/attempts"),
            None,
            None,
        ))
        .await
        .expect("start without identity");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::identity_request(
            Method::POST,
            &format!("/api/v1/exams/{exam_id}/attempts"),
            Some("ghost-user"),
            None,
        ))
        .await
        .expect("start with unknown identity");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn full_attempt_flow_scores_exact_match() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "s3@medprep.test", "Student Three").await;
    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;
    let (q1, q1_options) = test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        1,
        "Drug of choice for status epilepticus?",
        &[("Lorazepam", true), ("Phenytoin", false), ("Propofol", false)],
    )
    .await;
    let (q2, q2_options) = test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        2,
        "Select all features of nephrotic syndrome",
        &[
            ("Proteinuria", true),
            ("Hypoalbuminemia", true),
            ("Hematuria", false),
            ("Red cell casts", false),
        ],
    )
    .await;

    let (_, started) = start_attempt(&ctx, &exam_id, &student.id).await;
    let attempt_id = started["attempt_id"].as_str().expect("attempt id").to_string();

    // Q1 answered correctly, Q2 only partially: exact-match scores it wrong.
    let status = record_answers(
        &ctx,
        &attempt_id,
        &student.id,
        json!({ &q1: q1_options[0], &q2: [q2_options[0]] }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, result) = submit_attempt(&ctx, &attempt_id, &student.id).await;
    assert_eq!(status, StatusCode::OK, "response: {result}");
    assert_eq!(result["total_questions"], 2);
    assert_eq!(result["correct_count"], 1);
    assert_eq!(result["score"], 50);
    assert_eq!(result["passed"], false);
}

#[tokio::test]
async fn full_correct_selection_passes_the_threshold() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "s4@medprep.test", "Student Four").await;
    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;
    let (q1, q1_options) = test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        1,
        "Select all causes of high anion gap acidosis",
        &[("Lactic acidosis", true), ("Ketoacidosis", true), ("Diarrhea", false)],
    )
    .await;

    let (_, started) = start_attempt(&ctx, &exam_id, &student.id).await;
    let attempt_id = started["attempt_id"].as_str().expect("attempt id").to_string();

    let status = record_answers(
        &ctx,
        &attempt_id,
        &student.id,
        json!({ &q1: [q1_options[0], q1_options[1]] }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, result) = submit_attempt(&ctx, &attempt_id, &student.id).await;
    assert_eq!(status, StatusCode::OK, "response: {result}");
    assert_eq!(result["score"], 100);
    assert_eq!(result["passed"], true);
}

#[tokio::test]
async fn record_answers_replaces_previous_selection_idempotently() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "s5@medprep.test", "Student Five").await;
    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;
    let (q1, q1_options) = test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        1,
        "Most common cause of community-acquired pneumonia?",
        &[("S. pneumoniae", true), ("M. pneumoniae", false), ("H. influenzae", false)],
    )
    .await;

    let (_, started) = start_attempt(&ctx, &exam_id, &student.id).await;
    let attempt_id = started["attempt_id"].as_str().expect("attempt id").to_string();

    let status =
        record_answers(&ctx, &attempt_id, &student.id, json!({ &q1: q1_options[1] })).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // A later batch replaces the earlier selection entirely.
    let status =
        record_answers(&ctx, &attempt_id, &student.id, json!({ &q1: q1_options[0] })).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Replaying the same batch changes nothing.
    let status =
        record_answers(&ctx, &attempt_id, &student.id, json!({ &q1: q1_options[0] })).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, detail) = get_attempt(&ctx, &attempt_id, &student.id).await;
    let options = detail["questions"][0]["options"].as_array().expect("options");
    let selected: Vec<&str> = options
        .iter()
        .filter(|option| option["is_selected"] == true)
        .map(|option| option["option_id"].as_str().unwrap())
        .collect();
    assert_eq!(selected, vec![q1_options[0].as_str()]);
}

#[tokio::test]
async fn unknown_question_ids_are_ignored_not_rejected() {
    let ctx = test_support::setup_test_context().await;

    let student = test_support::insert_user(ctx.state.db(), "s6@medprep.test", "Student Six").await;
    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;
    let (q1, q1_options) = test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        1,
        "Reversal agent for heparin?",
        &[("Protamine", true), ("Vitamin K", false)],
    )
    .await;

    let (_, started) = start_attempt(&ctx, &exam_id, &student.id).await;
    let attempt_id = started["attempt_id"].as_str().expect("attempt id").to_string();

    let status = record_answers(
        &ctx,
        &attempt_id,
        &student.id,
        json!({ "not-a-question": "whatever", &q1: q1_options[0] }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, result) = submit_attempt(&ctx, &attempt_id, &student.id).await;
    assert_eq!(status, StatusCode::OK, "response: {result}");
    assert_eq!(result["score"], 100);
}

#[tokio::test]
async fn completed_attempt_is_immutable() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "s7@medprep.test", "Student Seven").await;
    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;
    let (q1, q1_options) = test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        1,
        "Antidote for acetaminophen overdose?",
        &[("N-acetylcysteine", true), ("Naloxone", false)],
    )
    .await;

    let (_, started) = start_attempt(&ctx, &exam_id, &student.id).await;
    let attempt_id = started["attempt_id"].as_str().expect("attempt id").to_string();

    record_answers(&ctx, &attempt_id, &student.id, json!({ &q1: q1_options[0] })).await;
    let (status, _) = submit_attempt(&ctx, &attempt_id, &student.id).await;
    assert_eq!(status, StatusCode::OK);

    let (_, before) = get_attempt(&ctx, &attempt_id, &student.id).await;

    let status =
        record_answers(&ctx, &attempt_id, &student.id, json!({ &q1: q1_options[1] })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = submit_attempt(&ctx, &attempt_id, &student.id).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");

    let (_, after) = get_attempt(&ctx, &attempt_id, &student.id).await;
    assert_eq!(after["score"], before["score"]);
    assert_eq!(after["completed_at"], before["completed_at"]);
    assert_eq!(after["questions"], before["questions"]);
}

#[tokio::test]
async fn concurrent_submits_complete_exactly_once() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "s8@medprep.test", "Student Eight").await;
    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;
    let (q1, q1_options) = test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        1,
        "Target INR for mechanical mitral valve?",
        &[("2.5-3.5", true), ("1.5-2.0", false)],
    )
    .await;

    let (_, started) = start_attempt(&ctx, &exam_id, &student.id).await;
    let attempt_id = started["attempt_id"].as_str().expect("attempt id").to_string();
    record_answers(&ctx, &attempt_id, &student.id, json!({ &q1: q1_options[0] })).await;

    let first = ctx.app.clone().oneshot(test_support::identity_request(
        Method::POST,
        &format!("/api/v1/attempts/{attempt_id}/submit"),
        Some(&student.id),
        Some(json!({})),
    ));
    let second = ctx.app.clone().oneshot(test_support::identity_request(
        Method::POST,
        &format!("/api/v1/attempts/{attempt_id}/submit"),
        Some(&student.id),
        Some(json!({})),
    ));

    let (first, second) = tokio::join!(first, second);
    let mut statuses =
        vec![first.expect("first submit").status(), second.expect("second submit").status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    let attempt = repositories::attempts::find_by_id(ctx.state.db(), &attempt_id)
        .await
        .expect("fetch attempt")
        .expect("attempt exists");
    assert_eq!(attempt.status, AttemptStatus::Completed);
    assert_eq!(attempt.score, Some(100));
}

#[tokio::test]
async fn snapshot_survives_catalog_edits() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "s9@medprep.test", "Student Nine").await;
    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;
    let (q1, q1_options) = test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        1,
        "Classic triad of normal pressure hydrocephalus?",
        &[("Gait, incontinence, dementia", true), ("Headache, fever, stiffness", false)],
    )
    .await;

    let (_, started) = start_attempt(&ctx, &exam_id, &student.id).await;
    let attempt_id = started["attempt_id"].as_str().expect("attempt id").to_string();

    // Catalog tampering after the snapshot was taken: rewrite the text,
    // invert correctness, drop an option.
    sqlx::query("UPDATE questions SET text = 'rewritten' WHERE id = $1")
        .bind(&q1)
        .execute(ctx.state.db())
        .await
        .expect("rewrite question");
    sqlx::query("UPDATE question_options SET is_correct = NOT is_correct WHERE question_id = $1")
        .bind(&q1)
        .execute(ctx.state.db())
        .await
        .expect("invert correctness");
    sqlx::query("DELETE FROM question_options WHERE id = $1")
        .bind(&q1_options[1])
        .execute(ctx.state.db())
        .await
        .expect("drop option");

    let (_, detail) = get_attempt(&ctx, &attempt_id, &student.id).await;
    assert_eq!(
        detail["questions"][0]["text"],
        "Classic triad of normal pressure hydrocephalus?"
    );
    assert_eq!(detail["questions"][0]["options"].as_array().expect("options").len(), 2);

    // Scoring still follows the frozen correctness flags.
    record_answers(&ctx, &attempt_id, &student.id, json!({ &q1: q1_options[0] })).await;
    let (status, result) = submit_attempt(&ctx, &attempt_id, &student.id).await;
    assert_eq!(status, StatusCode::OK, "response: {result}");
    assert_eq!(result["score"], 100);
}

#[tokio::test]
async fn correctness_is_hidden_until_completion() {
    let ctx = test_support::setup_test_context().await;

    let student = test_support::insert_user(ctx.state.db(), "s10@medprep.test", "Student Ten").await;
    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;
    let (q1, q1_options) = test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        1,
        "Vitamin deficiency in Wernicke encephalopathy?",
        &[("Thiamine", true), ("Niacin", false)],
    )
    .await;

    let (_, started) = start_attempt(&ctx, &exam_id, &student.id).await;
    let attempt_id = started["attempt_id"].as_str().expect("attempt id").to_string();

    let (_, in_progress) = get_attempt(&ctx, &attempt_id, &student.id).await;
    let option = &in_progress["questions"][0]["options"][0];
    assert!(option.get("is_correct").is_none(), "correctness leaked: {option}");
    assert!(in_progress["questions"][0].get("answered_correctly").is_none());

    record_answers(&ctx, &attempt_id, &student.id, json!({ &q1: q1_options[0] })).await;
    submit_attempt(&ctx, &attempt_id, &student.id).await;

    let (_, completed) = get_attempt(&ctx, &attempt_id, &student.id).await;
    assert_eq!(completed["questions"][0]["answered_correctly"], true);
    let correct_flags: Vec<bool> = completed["questions"][0]["options"]
        .as_array()
        .expect("options")
        .iter()
        .map(|option| option["is_correct"].as_bool().expect("is_correct"))
        .collect();
    assert_eq!(correct_flags, vec![true, false]);
    assert_eq!(completed["passed"], true);
}

#[tokio::test]
async fn attempt_detail_is_owner_or_admin_scoped() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@medprep.test", "Owner").await;
    let other = test_support::insert_user(ctx.state.db(), "other@medprep.test", "Other").await;
    let admin = test_support::insert_admin(ctx.state.db(), "admin@medprep.test", "Admin").await;
    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;
    test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        1,
        "First-line for uncomplicated UTI?",
        &[("Nitrofurantoin", true), ("Amoxicillin", false)],
    )
    .await;

    let (_, started) = start_attempt(&ctx, &exam_id, &owner.id).await;
    let attempt_id = started["attempt_id"].as_str().expect("attempt id").to_string();

    let (status, _) = get_attempt(&ctx, &attempt_id, &owner.id).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_attempt(&ctx, &attempt_id, &other.id).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "response: {body}");

    let (status, _) = get_attempt(&ctx, &attempt_id, &admin.id).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn question_order_follows_catalog_when_not_randomized() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "s11@medprep.test", "Student Eleven").await;
    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;

    let mut expected = Vec::new();
    for position in 1..=5 {
        let (question_id, _) = test_support::insert_question(
            ctx.state.db(),
            &exam_id,
            position,
            &format!("Question {position}"),
            &[("Right", true), ("Wrong", false)],
        )
        .await;
        expected.push(question_id);
    }

    let (_, started) = start_attempt(&ctx, &exam_id, &student.id).await;
    let attempt_id = started["attempt_id"].as_str().expect("attempt id").to_string();

    let (_, detail) = get_attempt(&ctx, &attempt_id, &student.id).await;
    let questions = detail["questions"].as_array().expect("questions");
    let order: Vec<&str> =
        questions.iter().map(|question| question["question_id"].as_str().unwrap()).collect();
    assert_eq!(order, expected.iter().map(String::as_str).collect::<Vec<_>>());

    let positions: Vec<i64> =
        questions.iter().map(|question| question["position"].as_i64().unwrap()).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn randomized_order_is_a_permutation_of_the_catalog() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "s12@medprep.test", "Student Twelve").await;
    let exam_id = test_support::insert_exam(
        ctx.state.db(),
        ExamFixture { randomize_questions: true, ..ExamFixture::default() },
    )
    .await;

    let mut expected = Vec::new();
    for position in 1..=8 {
        let (question_id, _) = test_support::insert_question(
            ctx.state.db(),
            &exam_id,
            position,
            &format!("Question {position}"),
            &[("Right", true), ("Wrong", false)],
        )
        .await;
        expected.push(question_id);
    }

    let (_, started) = start_attempt(&ctx, &exam_id, &student.id).await;
    let attempt_id = started["attempt_id"].as_str().expect("attempt id").to_string();

    let (_, detail) = get_attempt(&ctx, &attempt_id, &student.id).await;
    let questions = detail["questions"].as_array().expect("questions");

    let positions: Vec<i64> =
        questions.iter().map(|question| question["position"].as_i64().unwrap()).collect();
    assert_eq!(positions, (1..=8).collect::<Vec<i64>>());

    let mut order: Vec<String> = questions
        .iter()
        .map(|question| question["question_id"].as_str().unwrap().to_string())
        .collect();
    order.sort();
    let mut all = expected.clone();
    all.sort();
    assert_eq!(order, all);
}

#[tokio::test]
async fn flagging_bookmarks_a_question_while_in_progress() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "s13@medprep.test", "Student Thirteen").await;
    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;
    let (q1, q1_options) = test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        1,
        "Screening test of choice for AAA?",
        &[("Ultrasound", true), ("CT angiography", false)],
    )
    .await;

    let (_, started) = start_attempt(&ctx, &exam_id, &student.id).await;
    let attempt_id = started["attempt_id"].as_str().expect("attempt id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::identity_request(
            Method::PUT,
            &format!("/api/v1/attempts/{attempt_id}/questions/{q1}/flag"),
            Some(&student.id),
            Some(json!({ "is_flagged": true })),
        ))
        .await
        .expect("flag question");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (_, detail) = get_attempt(&ctx, &attempt_id, &student.id).await;
    assert_eq!(detail["questions"][0]["is_flagged"], true);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::identity_request(
            Method::PUT,
            &format!("/api/v1/attempts/{attempt_id}/questions/unknown/flag"),
            Some(&student.id),
            Some(json!({ "is_flagged": true })),
        ))
        .await
        .expect("flag unknown question");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    record_answers(&ctx, &attempt_id, &student.id, json!({ &q1: q1_options[0] })).await;
    submit_attempt(&ctx, &attempt_id, &student.id).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::identity_request(
            Method::PUT,
            &format!("/api/v1/attempts/{attempt_id}/questions/{q1}/flag"),
            Some(&student.id),
            Some(json!({ "is_flagged": false })),
        ))
        .await
        .expect("flag after completion");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn attempt_listing_is_admin_only_and_paginated() {
    let ctx = test_support::setup_test_context().await;

    let admin = test_support::insert_admin(ctx.state.db(), "admin2@medprep.test", "Admin").await;
    let first =
        test_support::insert_user(ctx.state.db(), "s14@medprep.test", "Student Fourteen").await;
    let second =
        test_support::insert_user(ctx.state.db(), "s15@medprep.test", "Student Fifteen").await;
    let exam_id = test_support::insert_exam(ctx.state.db(), ExamFixture::default()).await;
    let (q1, q1_options) = test_support::insert_question(
        ctx.state.db(),
        &exam_id,
        1,
        "Gold standard for pulmonary embolism diagnosis?",
        &[("CT pulmonary angiography", true), ("D-dimer", false)],
    )
    .await;

    let (_, started) = start_attempt(&ctx, &exam_id, &first.id).await;
    let first_attempt = started["attempt_id"].as_str().expect("attempt id").to_string();
    record_answers(&ctx, &first_attempt, &first.id, json!({ &q1: q1_options[0] })).await;
    submit_attempt(&ctx, &first_attempt, &first.id).await;

    start_attempt(&ctx, &exam_id, &second.id).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::identity_request(
            Method::GET,
            &format!("/api/v1/exams/{exam_id}/attempts"),
            Some(&first.id),
            None,
        ))
        .await
        .expect("list as student");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::identity_request(
            Method::GET,
            &format!("/api/v1/exams/{exam_id}/attempts"),
            Some(&admin.id),
            None,
        ))
        .await
        .expect("list as admin");
    let status = response.status();
    let listing = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {listing}");
    assert_eq!(listing["total_count"], 2);
    assert_eq!(listing["items"].as_array().expect("items").len(), 2);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::identity_request(
            Method::GET,
            &format!("/api/v1/exams/{exam_id}/attempts?status=completed"),
            Some(&admin.id),
            None,
        ))
        .await
        .expect("list completed");
    let status = response.status();
    let listing = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {listing}");
    assert_eq!(listing["total_count"], 1);
    assert_eq!(listing["items"][0]["id"], first_attempt.as_str());
    assert_eq!(listing["items"][0]["user_email"], "s14@medprep.test");
}

#[tokio::test]
async fn empty_exam_submits_to_zero_score() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "s16@medprep.test", "Student Sixteen").await;
    let exam_id = test_support::insert_exam(
        ctx.state.db(),
        ExamFixture { passing_score: 0, ..ExamFixture::default() },
    )
    .await;

    let (status, started) = start_attempt(&ctx, &exam_id, &student.id).await;
    assert_eq!(status, StatusCode::CREATED, "response: {started}");
    assert_eq!(started["question_count"], 0);

    let attempt_id = started["attempt_id"].as_str().expect("attempt id").to_string();
    let (status, result) = submit_attempt(&ctx, &attempt_id, &student.id).await;
    assert_eq!(status, StatusCode::OK, "response: {result}");
    assert_eq!(result["score"], 0);
    assert_eq!(result["total_questions"], 0);
    assert_eq!(result["passed"], true);
}

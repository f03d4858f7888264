use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;
use trivia_api::db::{self, NewQuestion, QuestionStore};
use trivia_api::pagination::Pagination;
use trivia_api::server::app::{build_router, AppState};

async fn seeded_pool(questions: &[(&str, i64)]) -> SqlitePool {
    let pool = db::connect_in_memory().await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    for (question, category) in questions {
        pool.insert_question(NewQuestion {
            question: question.to_string(),
            answer: "answer".to_owned(),
            category: *category,
            difficulty: 1,
        })
        .await
        .unwrap();
    }
    pool
}

fn app(pool: SqlitePool) -> Router {
    build_router(AppState::new(pool, Pagination::default()))
}

async fn numbered_app(count: usize) -> Router {
    let texts: Vec<String> = (1..=count).map(|n| format!("Question number {n}")).collect();
    let questions: Vec<(&str, i64)> = texts
        .iter()
        .enumerate()
        .map(|(n, text)| (text.as_str(), (n % 2 + 1) as i64))
        .collect();
    app(seeded_pool(&questions).await)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn assert_failure(status: StatusCode, body: &Value, code: u16, message: &str) {
    assert_eq!(status.as_u16(), code);
    assert_eq!(
        body,
        &json!({"success": false, "error": code, "message": message})
    );
}

fn ids(body: &Value) -> Vec<i64> {
    body["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn get_categories() {
    let app = numbered_app(0).await;
    let (status, body) = send(&app, "GET", "/categories", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["categories"]["1"], "Science");
    assert_eq!(body["categories"].as_object().unwrap().len(), 6);
}

#[tokio::test]
async fn get_paginated_questions() {
    let app = numbered_app(15).await;

    let (status, body) = send(&app, "GET", "/questions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total_questions"], 15);
    assert_eq!(body["current_category"], Value::Null);
    assert_eq!(body["categories"]["6"], "Sports");
    assert_eq!(ids(&body), (1..=10).collect::<Vec<i64>>());

    let (status, body) = send(&app, "GET", "/questions?page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), (11..=15).collect::<Vec<i64>>());
}

#[tokio::test]
async fn page_past_the_end_is_not_found() {
    let app = numbered_app(15).await;
    let (status, body) = send(&app, "GET", "/questions?page=10000", None).await;
    assert_failure(status, &body, 404, "Resource Not Found");

    let (status, body) = send(&app, "GET", "/questions?page=0", None).await;
    assert_failure(status, &body, 404, "Resource Not Found");
}

#[tokio::test]
async fn unparsable_page_falls_back_to_first() {
    let app = numbered_app(3).await;
    let (status, body) = send(&app, "GET", "/questions?page=abc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2, 3]);
}

#[tokio::test]
async fn empty_store_has_no_first_page() {
    let app = numbered_app(0).await;
    let (status, body) = send(&app, "GET", "/questions", None).await;
    assert_failure(status, &body, 404, "Resource Not Found");
}

#[tokio::test]
async fn post_new_question() {
    let app = numbered_app(2).await;
    let (status, body) = send(
        &app,
        "POST",
        "/questions",
        Some(json!({
            "question": "new question",
            "answer": "new answer",
            "difficulty": 1,
            "category": 1
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["created"], 3);
    assert_eq!(body["total_questions"], 3);
    assert_eq!(ids(&body), vec![1, 2, 3]);
    assert_eq!(body["questions"][2]["answer"], "new answer");
}

#[tokio::test]
async fn post_question_with_string_category() {
    let app = numbered_app(0).await;
    let (status, body) = send(
        &app,
        "POST",
        "/questions",
        Some(json!({
            "question": "Who discovered penicillin?",
            "answer": "Alexander Fleming",
            "difficulty": "3",
            "category": "1"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"][0]["category"], 1);
    assert_eq!(body["questions"][0]["difficulty"], 3);
}

#[tokio::test]
async fn post_new_question_missing_field() {
    let app = numbered_app(2).await;
    let (status, body) = send(
        &app,
        "POST",
        "/questions",
        Some(json!({
            "question": "new question",
            "answer": "new answer",
            "difficulty": 1
        })),
    )
    .await;
    assert_failure(status, &body, 400, "Bad Request");

    let (_, body) = send(&app, "GET", "/questions", None).await;
    assert_eq!(body["total_questions"], 2);
}

#[tokio::test]
async fn post_new_question_with_falsy_fields() {
    let app = numbered_app(0).await;
    for payload in [
        json!({"question": "", "answer": "a", "difficulty": 1, "category": 1}),
        json!({"question": "q", "answer": "a", "difficulty": 0, "category": 1}),
        json!({"question": "q", "answer": "a", "difficulty": 1, "category": ""}),
    ] {
        let (status, body) = send(&app, "POST", "/questions", Some(payload)).await;
        assert_failure(status, &body, 400, "Bad Request");
    }
}

#[tokio::test]
async fn post_question_without_body() {
    let app = numbered_app(0).await;
    let (status, body) = send(&app, "POST", "/questions", None).await;
    assert_failure(status, &body, 400, "Bad Request");
}

#[tokio::test]
async fn delete_question() {
    let app = numbered_app(3).await;
    let (status, body) = send(&app, "DELETE", "/questions/2", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["deleted"], 2);
    assert_eq!(body["total_questions"], 2);
    assert_eq!(ids(&body), vec![1, 3]);

    let (status, body) = send(&app, "DELETE", "/questions/2", None).await;
    assert_failure(status, &body, 404, "Resource Not Found");
}

#[tokio::test]
async fn delete_unknown_targets() {
    let app = numbered_app(1).await;

    let (status, body) = send(&app, "DELETE", "/questions/999", None).await;
    assert_failure(status, &body, 404, "Resource Not Found");

    let (status, body) = send(&app, "DELETE", "/questions/abc", None).await;
    assert_failure(status, &body, 404, "Resource Not Found");

    let (status, body) = send(&app, "DELETE", "/questions1", None).await;
    assert_failure(status, &body, 404, "Resource Not Found");
}

#[tokio::test]
async fn search_questions() {
    let pool = seeded_pool(&[
        ("What is your name?", 1),
        ("Whose NAME is on the trophy?", 6),
        ("Where is Lake Victoria?", 3),
    ])
    .await;
    let app = app(pool);

    let (status, body) = send(&app, "POST", "/search", Some(json!({"searchTerm": "name"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total_matched_questions"], 2);
    assert_eq!(ids(&body), vec![1, 2]);

    let (status, body) = send(&app, "POST", "/search", Some(json!({"searchTerm": "xyz"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_matched_questions"], 0);
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
    let app = app(seeded_pool(&[("Who wrote ÉMILE?", 4), ("Where is Lake Victoria?", 3)]).await);

    let (status, body) = send(&app, "POST", "/search", Some(json!({"searchTerm": "émile"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_matched_questions"], 1);
    assert_eq!(ids(&body), vec![1]);
}

#[tokio::test]
async fn search_without_term_is_unprocessable() {
    let app = numbered_app(3).await;

    let (status, body) = send(&app, "POST", "/search", None).await;
    assert_failure(status, &body, 422, "Unprocessable");

    let (status, body) = send(&app, "POST", "/search", Some(json!({}))).await;
    assert_failure(status, &body, 422, "Unprocessable");

    let (status, body) = send(&app, "POST", "/search", Some(json!({"searchTerm": ""}))).await;
    assert_failure(status, &body, 422, "Unprocessable");
}

#[tokio::test]
async fn questions_by_category() {
    let app = numbered_app(5).await;
    let (status, body) = send(&app, "GET", "/categories/2/questions", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["current_category"], 2);
    assert_eq!(body["total_questions"], 2);
    assert_eq!(ids(&body), vec![2, 4]);

    let (status, body) = send(&app, "GET", "/categories/5/questions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], 0);
}

#[tokio::test]
async fn questions_by_unknown_category() {
    let app = numbered_app(5).await;
    let (status, body) = send(&app, "GET", "/categories/999/questions", None).await;
    assert_failure(status, &body, 404, "Resource Not Found");
}

#[tokio::test]
async fn questions_by_category_when_store_fails() {
    let pool = seeded_pool(&[("What is your name?", 1)]).await;
    let app = app(pool.clone());
    pool.close().await;

    let (status, body) = send(&app, "GET", "/categories/1/questions", None).await;
    assert_failure(status, &body, 404, "Resource Not Found");
}

#[tokio::test]
async fn play_quiz() {
    let app = numbered_app(6).await;
    let (status, body) = send(
        &app,
        "POST",
        "/play",
        Some(json!({
            "previous_questions": [1],
            "quiz_category": {"type": "Science", "id": 1}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let id = body["question"]["id"].as_i64().unwrap();
    assert!(id == 3 || id == 5, "unexpected question {id}");
    assert_eq!(body["question"]["category"], 1);
}

#[tokio::test]
async fn play_quiz_until_exhausted() {
    let app = numbered_app(4).await;
    let mut previous: Vec<i64> = Vec::new();

    loop {
        let (status, body) = send(
            &app,
            "POST",
            "/play",
            Some(json!({
                "previous_questions": previous,
                "quiz_category": {"type": "click", "id": 0}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        match body["question"]["id"].as_i64() {
            Some(id) => {
                assert!(!previous.contains(&id));
                previous.push(id);
            }
            None => {
                assert_eq!(body["question"], Value::Null);
                break;
            }
        }
    }

    previous.sort_unstable();
    assert_eq!(previous, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn play_quiz_with_string_category_id() {
    let app = numbered_app(4).await;
    let (status, body) = send(
        &app,
        "POST",
        "/play",
        Some(json!({
            "previous_questions": [2],
            "quiz_category": {"type": "Art", "id": "2"}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"]["id"], 4);
}

#[tokio::test]
async fn play_quiz_malformed_category() {
    let app = numbered_app(4).await;

    let (status, body) = send(
        &app,
        "POST",
        "/play",
        Some(json!({
            "previous_question": [],
            "quiz_category": {"type": "Science"}
        })),
    )
    .await;
    assert_failure(status, &body, 422, "Unprocessable");

    let (status, body) = send(&app, "POST", "/play", Some(json!({"previous_questions": []}))).await;
    assert_failure(status, &body, 422, "Unprocessable");
}

#[tokio::test]
async fn unknown_route() {
    let app = numbered_app(0).await;
    let (status, body) = send(&app, "GET", "/nope", None).await;
    assert_failure(status, &body, 404, "Resource Not Found");
}

#[tokio::test]
async fn malformed_page_query() {
    let app = numbered_app(3).await;

    let (status, body) = send(&app, "GET", "/questions?page=1&page=2", None).await;
    assert_failure(status, &body, 404, "Resource Not Found");

    let (status, body) = send(&app, "DELETE", "/questions/1?page=1&page=2", None).await;
    assert_failure(status, &body, 404, "Resource Not Found");
    let (_, body) = send(&app, "GET", "/questions", None).await;
    assert_eq!(body["total_questions"], 3);
}

#[tokio::test]
async fn wrong_method_keeps_envelope() {
    let app = numbered_app(1).await;
    let (status, body) = send(&app, "PUT", "/questions", None).await;
    assert_failure(status, &body, 405, "Method Not Allowed");

    let (status, body) = send(&app, "GET", "/play", None).await;
    assert_failure(status, &body, 405, "Method Not Allowed");
}

#[tokio::test]
async fn metrics_are_exposed() {
    let app = numbered_app(1).await;
    send(
        &app,
        "POST",
        "/play",
        Some(json!({"previous_questions": [], "quiz_category": {"id": 0}})),
    )
    .await;

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("trivia_quiz_draws_total"));
}

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::{CategoryStore, NewQuestion, Question, QuestionStore, StoreError},
    pagination::Pagination,
    server::{app::AppState, deserializers::deserialize_lenient_i64, error::ApiError},
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
    validation::{require, ValidationError},
};

use super::{category_labels, ApiResponse, Envelope, PageQuery};

#[derive(Deserialize)]
struct QuestionPayload {
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    difficulty: Option<i64>,
}

impl TryFrom<QuestionPayload> for NewQuestion {
    type Error = ValidationError;

    fn try_from(payload: QuestionPayload) -> Result<Self, Self::Error> {
        Ok(NewQuestion {
            question: require(payload.question, "question")?,
            answer: require(payload.answer, "answer")?,
            category: require(payload.category, "category")?,
            difficulty: require(payload.difficulty, "difficulty")?,
        })
    }
}

#[derive(Deserialize)]
struct SearchPayload {
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
}

#[derive(Serialize)]
struct QuestionsPage {
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
    current_category: Option<i64>,
}

#[derive(Serialize)]
struct Created {
    created: i64,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct Deleted {
    deleted: i64,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct SearchResults {
    questions: Vec<Question>,
    total_matched_questions: usize,
}

async fn list_questions(
    State(questions): State<Arc<dyn QuestionStore>>,
    State(categories): State<Arc<dyn CategoryStore>>,
    State(pagination): State<Pagination>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<QuestionsPage> {
    let Query(query) = query.map_err(ApiError::not_found)?;
    let page = pagination.paginate(questions.all_questions().await?, query.page());
    if page.is_empty() {
        return Err(ApiError::not_found(format!("page {}", query.page())));
    }

    Ok(Envelope::ok(QuestionsPage {
        questions: page,
        total_questions: questions.count_questions().await?,
        categories: category_labels(categories.all_categories().await?),
        current_category: None,
    }))
}

async fn create_question(
    State(questions): State<Arc<dyn QuestionStore>>,
    State(pagination): State<Pagination>,
    query: Result<Query<PageQuery>, QueryRejection>,
    payload: Result<Json<QuestionPayload>, JsonRejection>,
) -> ApiResponse<Created> {
    let Query(query) = query.map_err(ApiError::bad_request)?;
    let Json(payload) = payload.map_err(ApiError::bad_request)?;
    let new_question = NewQuestion::try_from(payload).map_err(ApiError::bad_request)?;

    let created = questions
        .insert_question(new_question)
        .await
        .map_err(|e| match e {
            StoreError::Validation(_) => ApiError::bad_request(e),
            _ => ApiError::internal(e),
        })?;
    QUESTIONS_CREATED.inc();
    tracing::info!(id = created.id, "Question created");

    Ok(Envelope::ok(Created {
        created: created.id,
        questions: pagination.paginate(questions.all_questions().await?, query.page()),
        total_questions: questions.count_questions().await?,
    }))
}

async fn delete_question(
    State(questions): State<Arc<dyn QuestionStore>>,
    State(pagination): State<Pagination>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Deleted> {
    let Path(id) = id.map_err(ApiError::not_found)?;
    let Query(query) = query.map_err(ApiError::not_found)?;
    questions.delete_question(id).await?;
    QUESTIONS_DELETED.inc();
    tracing::info!(id, "Question deleted");

    Ok(Envelope::ok(Deleted {
        deleted: id,
        questions: pagination.paginate(questions.all_questions().await?, query.page()),
        total_questions: questions.count_questions().await?,
    }))
}

async fn search_questions(
    State(questions): State<Arc<dyn QuestionStore>>,
    payload: Result<Json<SearchPayload>, JsonRejection>,
) -> ApiResponse<SearchResults> {
    let Json(payload) = payload.map_err(ApiError::unprocessable)?;
    let term = payload
        .search_term
        .filter(|term| !term.is_empty())
        .ok_or_else(|| ApiError::unprocessable("searchTerm is required"))?;

    let questions = questions
        .search_questions(&term)
        .await
        .map_err(ApiError::unprocessable)?;
    Ok(Envelope::ok(SearchResults {
        total_matched_questions: questions.len(),
        questions,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/search", post(search_questions))
        .with_state(state)
}

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::{
    db::{Question, QuestionStore},
    quiz::{next_question, CategoryFilter},
    server::{app::AppState, deserializers::deserialize_lenient_i64, error::ApiError},
    telemetry::QUIZ_DRAWS,
};

use super::{ApiResponse, Envelope};

// the client also sends the category label as `type`, it is not needed here
#[derive(Deserialize)]
struct QuizCategoryPayload {
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    id: Option<i64>,
}

#[derive(Deserialize)]
struct PlayPayload {
    #[serde(default)]
    previous_questions: Vec<i64>,
    quiz_category: Option<QuizCategoryPayload>,
}

#[derive(Serialize)]
struct QuizTurn {
    question: Option<Question>,
}

async fn play(
    State(questions): State<Arc<dyn QuestionStore>>,
    payload: Result<Json<PlayPayload>, JsonRejection>,
) -> ApiResponse<QuizTurn> {
    let Json(payload) = payload.map_err(ApiError::unprocessable)?;
    let category = payload
        .quiz_category
        .ok_or_else(|| ApiError::unprocessable("quiz_category is required"))?;
    let filter = CategoryFilter::from_id(category.id).map_err(ApiError::unprocessable)?;
    let seen: HashSet<i64> = payload.previous_questions.into_iter().collect();

    let mut rng = StdRng::from_entropy();
    let question = next_question(&*questions, filter, &seen, &mut rng)
        .await
        .map_err(ApiError::unprocessable)?;

    let outcome = if question.is_some() {
        "drawn"
    } else {
        tracing::debug!(?filter, seen = seen.len(), "Quiz pool exhausted");
        "exhausted"
    };
    QUIZ_DRAWS.with_label_values(&[outcome]).inc();

    Ok(Envelope::ok(QuizTurn { question }))
}

pub fn quiz_router(state: AppState) -> Router {
    Router::new()
        .route("/play", post(play))
        .with_state(state)
}

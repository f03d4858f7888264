use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Router,
};
use serde::Serialize;

use crate::{
    db::{CategoryStore, Question, QuestionStore},
    server::{app::AppState, error::ApiError},
};

use super::{category_labels, ApiResponse, Envelope};

#[derive(Serialize)]
struct CategoriesBody {
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestionsBody {
    questions: Vec<Question>,
    total_questions: usize,
    current_category: i64,
}

async fn get_categories(
    State(categories): State<Arc<dyn CategoryStore>>,
) -> ApiResponse<CategoriesBody> {
    let categories = categories.all_categories().await?;
    Ok(Envelope::ok(CategoriesBody {
        categories: category_labels(categories),
    }))
}

async fn get_questions_for_category(
    State(categories): State<Arc<dyn CategoryStore>>,
    State(questions): State<Arc<dyn QuestionStore>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<CategoryQuestionsBody> {
    // every failure on this endpoint, store errors included, is a 404
    let Path(id) = id.map_err(ApiError::not_found)?;
    let category = categories
        .get_category(id)
        .await
        .map_err(ApiError::not_found)?;
    if category.is_none() {
        return Err(ApiError::not_found(format!("category {id}")));
    }

    let questions = questions
        .questions_in_category(id)
        .await
        .map_err(ApiError::not_found)?;
    Ok(Envelope::ok(CategoryQuestionsBody {
        total_questions: questions.len(),
        questions,
        current_category: id,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route(
            "/categories/{id}/questions",
            get(get_questions_for_category),
        )
        .with_state(state)
}

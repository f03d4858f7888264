mod categories;
mod questions;
mod quiz;

use std::collections::BTreeMap;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::Category;
use crate::server::{deserializers::deserialize_page, error::ApiError};

pub use categories::category_router;
pub use questions::questions_router;
pub use quiz::quiz_router;

pub type ApiResponse<T> = Result<Envelope<T>, ApiError>;

/// Success half of the response envelope: `{"success": true, ...body}`.
#[derive(Serialize)]
pub struct Envelope<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

impl<T> Envelope<T> {
    pub fn ok(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default, deserialize_with = "deserialize_page")]
    page: Option<i64>,
}

impl PageQuery {
    fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }
}

// serialized as {"1": "Science", ...}
fn category_labels(categories: Vec<Category>) -> BTreeMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

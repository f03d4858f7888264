pub mod memory;
pub mod queries;
pub mod transfer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Error;
use thiserror::Error;

use crate::validation::{non_empty, non_zero, ValidationError};

pub use memory::MemoryStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

/// A question that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

impl NewQuestion {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty(&self.question, "question")?;
        non_empty(&self.answer, "answer")?;
        non_zero(self.category, "category")?;
        non_zero(self.difficulty, "difficulty")?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: i64 },

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Question records. Every listing is ordered by ascending id.
#[async_trait]
pub trait QuestionStore: Send + Sync + 'static {
    async fn all_questions(&self) -> StoreResult<Vec<Question>>;

    async fn questions_in_category(&self, category_id: i64) -> StoreResult<Vec<Question>>;

    /// Case-insensitive substring match on the question text.
    async fn search_questions(&self, term: &str) -> StoreResult<Vec<Question>>;

    async fn insert_question(&self, question: NewQuestion) -> StoreResult<Question>;

    async fn delete_question(&self, id: i64) -> StoreResult<()>;

    async fn count_questions(&self) -> StoreResult<i64>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync + 'static {
    async fn all_categories(&self) -> StoreResult<Vec<Category>>;

    async fn get_category(&self, id: i64) -> StoreResult<Option<Category>>;
}

pub async fn establish_connection(url: &str) -> Result<SqlitePool, Error> {
    SqlitePool::connect(url).await
}

/// A private in-memory database. The pool is pinned to a single connection
/// that never expires, otherwise every new connection would see an empty
/// database.
pub async fn connect_in_memory() -> Result<SqlitePool, Error> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

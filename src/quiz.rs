//! Random draw of the next unseen question in a quiz round.
//!
//! The server keeps no quiz state: the client sends every id it has already
//! been shown and the draw is made from what is left.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::{Question, QuestionStore, StoreResult};
use crate::validation::{require, ValidationError};

/// Category id the quiz client uses for "all categories".
pub const ALL_CATEGORIES: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Category(i64),
}

impl CategoryFilter {
    /// Builds the filter from the `id` of the client's quiz category, which
    /// must be present.
    pub fn from_id(id: Option<i64>) -> Result<Self, ValidationError> {
        Ok(match require(id, "quiz_category.id")? {
            ALL_CATEGORIES => CategoryFilter::All,
            id => CategoryFilter::Category(id),
        })
    }
}

/// Picks one question uniformly among `candidates` whose id is not in
/// `excluded`.
pub fn draw<R>(candidates: Vec<Question>, excluded: &HashSet<i64>, rng: &mut R) -> Option<Question>
where
    R: Rng + ?Sized,
{
    let pool: Vec<Question> = candidates
        .into_iter()
        .filter(|q| !excluded.contains(&q.id))
        .collect();
    pool.choose(rng).cloned()
}

/// `None` means the pool is exhausted and the round is over.
pub async fn next_question<S, R>(
    store: &S,
    filter: CategoryFilter,
    excluded: &HashSet<i64>,
    rng: &mut R,
) -> StoreResult<Option<Question>>
where
    S: QuestionStore + ?Sized,
    R: Rng + Send + ?Sized,
{
    let candidates = match filter {
        CategoryFilter::All => store.all_questions().await?,
        CategoryFilter::Category(id) => store.questions_in_category(id).await?,
    };
    Ok(draw(candidates, excluded, rng))
}

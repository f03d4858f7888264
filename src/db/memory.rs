use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{
    Category, CategoryStore, NewQuestion, Question, QuestionStore, StoreError, StoreResult,
};

/// Store kept entirely in memory, used in place of SQLite by tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: i64,
    questions: BTreeMap<i64, Question>,
    categories: BTreeMap<i64, Category>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(self, id: i64, kind: &str) -> Self {
        self.inner.write().categories.insert(
            id,
            Category {
                id,
                kind: kind.to_owned(),
            },
        );
        self
    }

    fn filtered(&self, keep: impl Fn(&Question) -> bool) -> Vec<Question> {
        self.inner
            .read()
            .questions
            .values()
            .filter(|&q| keep(q))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn all_questions(&self) -> StoreResult<Vec<Question>> {
        Ok(self.filtered(|_| true))
    }

    async fn questions_in_category(&self, category_id: i64) -> StoreResult<Vec<Question>> {
        Ok(self.filtered(|q| q.category == category_id))
    }

    async fn search_questions(&self, term: &str) -> StoreResult<Vec<Question>> {
        let term = term.to_lowercase();
        Ok(self.filtered(|q| q.question.to_lowercase().contains(&term)))
    }

    async fn insert_question(&self, question: NewQuestion) -> StoreResult<Question> {
        question.validate()?;
        let mut inner = self.inner.write();
        inner.last_id += 1;
        let created = Question {
            id: inner.last_id,
            question: question.question,
            answer: question.answer,
            category: question.category,
            difficulty: question.difficulty,
        };
        inner.questions.insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete_question(&self, id: i64) -> StoreResult<()> {
        self.inner
            .write()
            .questions
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound {
                resource: "question",
                id,
            })
    }

    async fn count_questions(&self) -> StoreResult<i64> {
        Ok(self.inner.read().questions.len() as i64)
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn all_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.inner.read().categories.values().cloned().collect())
    }

    async fn get_category(&self, id: i64) -> StoreResult<Option<Category>> {
        Ok(self.inner.read().categories.get(&id).cloned())
    }
}

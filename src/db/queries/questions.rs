use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::{NewQuestion, Question, QuestionStore, StoreError, StoreResult};

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category_id: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE questions.category = ?1
        ORDER BY id
        "#,
    )
    .bind(category_id)
    .fetch_all(pool)
    .await
}

/// Case folding happens here rather than in SQL, `LIKE` only folds ASCII.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    let term = term.to_lowercase();
    let questions = get_all_questions(pool).await?;
    Ok(questions
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&term))
        .collect())
}

pub async fn create_question(pool: &SqlitePool, question: &NewQuestion) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Returns `false` when there was no question with this id.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    let deleted = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(deleted > 0)
}

pub async fn count_questions(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await
}

/// Inserts questions keeping their exported ids. Ids already present are
/// left untouched, questions are never updated in place.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<u64> {
    let mut imported = 0;
    for question in questions {
        imported += sqlx::query(
            r#"
            INSERT OR IGNORE INTO questions (id, question, answer, category, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(question.id)
        .bind(question.question)
        .bind(question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(pool)
        .await?
        .rows_affected();
    }
    Ok(imported)
}

#[async_trait]
impl QuestionStore for SqlitePool {
    async fn all_questions(&self) -> StoreResult<Vec<Question>> {
        Ok(get_all_questions(self).await?)
    }

    async fn questions_in_category(&self, category_id: i64) -> StoreResult<Vec<Question>> {
        Ok(get_questions_for_category(self, category_id).await?)
    }

    async fn search_questions(&self, term: &str) -> StoreResult<Vec<Question>> {
        Ok(search_questions(self, term).await?)
    }

    async fn insert_question(&self, question: NewQuestion) -> StoreResult<Question> {
        question.validate()?;
        let id = create_question(self, &question).await?;
        Ok(Question {
            id,
            question: question.question,
            answer: question.answer,
            category: question.category,
            difficulty: question.difficulty,
        })
    }

    async fn delete_question(&self, id: i64) -> StoreResult<()> {
        if delete_question(self, id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                resource: "question",
                id,
            })
        }
    }

    async fn count_questions(&self) -> StoreResult<i64> {
        Ok(count_questions(self).await?)
    }
}

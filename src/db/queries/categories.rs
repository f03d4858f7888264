use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::{Category, CategoryStore, StoreResult};

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, "type" FROM categories ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, "type" FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Inserts new categories and relabels existing ones, matching on id.
pub async fn import_categories(pool: &SqlitePool, categories: Vec<Category>) -> sqlx::Result<()> {
    for category in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, "type") VALUES (?1, ?2)
            ON CONFLICT (id) DO UPDATE SET "type" = excluded."type"
            "#,
        )
        .bind(category.id)
        .bind(category.kind)
        .execute(pool)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl CategoryStore for SqlitePool {
    async fn all_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(get_all_categories(self).await?)
    }

    async fn get_category(&self, id: i64) -> StoreResult<Option<Category>> {
        Ok(get_category(self, id).await?)
    }
}

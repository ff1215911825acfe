//! Items repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::item::{CreateItem, Item, UpdateItem},
};

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get item by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            "SELECT id, name, description, available, owner_id, request_id FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// Create a new item
    pub async fn create(&self, owner_id: i32, item: &CreateItem) -> AppResult<Item> {
        let created = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, description, available, owner_id, request_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, available, owner_id, request_id
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.available)
        .bind(owner_id)
        .bind(item.request_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update an item, keeping current values for absent fields
    pub async fn update(&self, id: i32, patch: &UpdateItem) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                available = COALESCE($4, available)
            WHERE id = $1
            RETURNING id, name, description, available, owner_id, request_id
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.available)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// List an owner's items
    pub async fn find_all_by_owner(&self, owner_id: i32) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, available, owner_id, request_id
            FROM items
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Case-insensitive substring search over name and description,
    /// available items only
    pub async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, available, owner_id, request_id
            FROM items
            WHERE available IS TRUE
              AND (name || description) ILIKE '%' || $1 || '%'
            ORDER BY id
            "#,
        )
        .bind(text)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Items listed in answer to any of the given requests
    pub async fn find_by_request_ids(&self, request_ids: &[i32]) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, available, owner_id, request_id
            FROM items
            WHERE request_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(request_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

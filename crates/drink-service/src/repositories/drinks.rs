//! PostgreSQL drink repository.
//!
//! # Security
//!
//! - All queries use parameterized statements
//! - Recipes are stored as JSONB and decoded into typed parts on read

use crate::errors::DrinkError;
use crate::models::{Drink, DrinkUpdate, NewDrink, RecipePart};
use crate::observability::metrics;
use crate::repositories::{duplicate_title, DrinkRepository};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Instant;
use tracing::instrument;

/// Drink repository backed by a `drinks` table.
#[derive(Clone)]
pub struct PgDrinkRepository {
    pool: PgPool,
}

impl PgDrinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Record query metrics and convert the error.
fn observe<T>(
    operation: &'static str,
    start: Instant,
    result: Result<T, sqlx::Error>,
) -> Result<T, DrinkError> {
    let status = if result.is_ok() { "success" } else { "error" };
    metrics::record_db_query(operation, status, start.elapsed());
    result.map_err(DrinkError::from)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn map_row_to_drink(row: &PgRow) -> Result<Drink, DrinkError> {
    let Json(recipe): Json<Vec<RecipePart>> = row.try_get("recipe")?;
    Ok(Drink {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        recipe,
    })
}

#[async_trait::async_trait]
impl DrinkRepository for PgDrinkRepository {
    #[instrument(skip_all, name = "drinks.repo.list")]
    async fn list(&self) -> Result<Vec<Drink>, DrinkError> {
        let start = Instant::now();
        let rows = sqlx::query("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await;
        let rows = observe("list_drinks", start, rows)?;

        rows.iter().map(map_row_to_drink).collect()
    }

    #[instrument(skip(self), name = "drinks.repo.get")]
    async fn get(&self, id: i64) -> Result<Option<Drink>, DrinkError> {
        let start = Instant::now();
        let row = sqlx::query("SELECT id, title, recipe FROM drinks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        let row = observe("get_drink", start, row)?;

        row.as_ref().map(map_row_to_drink).transpose()
    }

    #[instrument(skip_all, name = "drinks.repo.create")]
    async fn create(&self, drink: NewDrink) -> Result<Drink, DrinkError> {
        let start = Instant::now();
        let row = sqlx::query(
            r#"
            INSERT INTO drinks (title, recipe)
            VALUES ($1, $2)
            RETURNING id, title, recipe
            "#,
        )
        .bind(&drink.title) // $1
        .bind(Json(&drink.recipe)) // $2
        .fetch_one(&self.pool)
        .await;

        if let Err(e) = &row {
            if is_unique_violation(e) {
                metrics::record_db_query("create_drink", "conflict", start.elapsed());
                return Err(duplicate_title(&drink.title));
            }
        }
        let row = observe("create_drink", start, row)?;

        let created = map_row_to_drink(&row)?;
        tracing::info!(target: "drinks.repo", drink_id = created.id, "Drink created");
        Ok(created)
    }

    #[instrument(skip(self, update), name = "drinks.repo.update")]
    async fn update(&self, id: i64, update: DrinkUpdate) -> Result<Option<Drink>, DrinkError> {
        let start = Instant::now();
        let row = sqlx::query(
            r#"
            UPDATE drinks
            SET title = COALESCE($2, title),
                recipe = COALESCE($3, recipe)
            WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(id) // $1
        .bind(update.title.as_deref()) // $2
        .bind(update.recipe.as_ref().map(Json)) // $3
        .fetch_optional(&self.pool)
        .await;

        if let Err(e) = &row {
            if is_unique_violation(e) {
                metrics::record_db_query("update_drink", "conflict", start.elapsed());
                return Err(duplicate_title(update.title.as_deref().unwrap_or_default()));
            }
        }
        let row = observe("update_drink", start, row)?;

        row.as_ref().map(map_row_to_drink).transpose()
    }

    #[instrument(skip(self), name = "drinks.repo.delete")]
    async fn delete(&self, id: i64) -> Result<bool, DrinkError> {
        let start = Instant::now();
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        let result = observe("delete_drink", start, result)?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DrinkError> {
        let start = Instant::now();
        let result = sqlx::query("SELECT 1").execute(&self.pool).await;
        observe("ping", start, result).map(|_| ())
    }
}

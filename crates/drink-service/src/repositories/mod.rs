//! Repository layer for the drink service.
//!
//! Handlers depend on the [`DrinkRepository`] trait. PostgreSQL backs the
//! running service; the in-memory implementation backs tests and the test
//! server harness.

pub mod drinks;
pub mod memory;

use crate::errors::DrinkError;
use crate::models::{Drink, DrinkUpdate, NewDrink};

pub use drinks::PgDrinkRepository;
pub use memory::InMemoryDrinkRepository;

/// Storage operations for drinks.
#[async_trait::async_trait]
pub trait DrinkRepository: Send + Sync {
    /// All drinks ordered by id.
    async fn list(&self) -> Result<Vec<Drink>, DrinkError>;

    /// A single drink, or `None` if the id is unknown.
    async fn get(&self, id: i64) -> Result<Option<Drink>, DrinkError>;

    /// Insert a drink. A duplicate title is `Unprocessable`.
    async fn create(&self, drink: NewDrink) -> Result<Drink, DrinkError>;

    /// Apply a partial update. Returns `None` if the id is unknown.
    async fn update(&self, id: i64, update: DrinkUpdate) -> Result<Option<Drink>, DrinkError>;

    /// Delete a drink. Returns `false` if the id is unknown.
    async fn delete(&self, id: i64) -> Result<bool, DrinkError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), DrinkError>;
}

pub(crate) fn duplicate_title(title: &str) -> DrinkError {
    DrinkError::Unprocessable(format!("a drink titled '{title}' already exists"))
}

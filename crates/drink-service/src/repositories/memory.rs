//! In-memory drink repository.
//!
//! Keeps drinks in an ordered map behind a lock. Used by the test server
//! harness and handler tests in place of PostgreSQL.

use crate::errors::DrinkError;
use crate::models::{Drink, DrinkUpdate, NewDrink};
use crate::repositories::{duplicate_title, DrinkRepository};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Store {
    next_id: i64,
    drinks: BTreeMap<i64, Drink>,
}

impl Store {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.drinks
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }
}

/// Drink repository held entirely in memory.
#[derive(Default)]
pub struct InMemoryDrinkRepository {
    store: RwLock<Store>,
}

impl InMemoryDrinkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DrinkRepository for InMemoryDrinkRepository {
    async fn list(&self) -> Result<Vec<Drink>, DrinkError> {
        Ok(self.store.read().await.drinks.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Drink>, DrinkError> {
        Ok(self.store.read().await.drinks.get(&id).cloned())
    }

    async fn create(&self, drink: NewDrink) -> Result<Drink, DrinkError> {
        let mut store = self.store.write().await;

        if store.title_taken(&drink.title, None) {
            return Err(duplicate_title(&drink.title));
        }

        store.next_id += 1;
        let created = Drink {
            id: store.next_id,
            title: drink.title,
            recipe: drink.recipe,
        };
        store.drinks.insert(created.id, created.clone());

        Ok(created)
    }

    async fn update(&self, id: i64, update: DrinkUpdate) -> Result<Option<Drink>, DrinkError> {
        let mut store = self.store.write().await;

        if !store.drinks.contains_key(&id) {
            return Ok(None);
        }

        if let Some(title) = &update.title {
            if store.title_taken(title, Some(id)) {
                return Err(duplicate_title(title));
            }
        }

        let Some(drink) = store.drinks.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = update.title {
            drink.title = title;
        }
        if let Some(recipe) = update.recipe {
            drink.recipe = recipe;
        }

        Ok(Some(drink.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, DrinkError> {
        Ok(self.store.write().await.drinks.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), DrinkError> {
        Ok(())
    }
}

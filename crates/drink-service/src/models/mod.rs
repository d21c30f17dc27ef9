//! Drink service models.
//!
//! Contains the drink resource, its two public representations, and the
//! request/response bodies used by the handlers.

use crate::errors::DrinkError;
use serde::{Deserialize, Serialize};

/// Maximum drink title length.
pub const MAX_TITLE_LENGTH: usize = 80;

/// One ingredient of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipePart {
    /// Ingredient name.
    pub name: String,

    /// Display color of the ingredient.
    pub color: String,

    /// Number of parts of this ingredient.
    pub parts: u32,
}

/// Recipe part without the ingredient name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortRecipePart {
    pub color: String,
    pub parts: u32,
}

/// A stored drink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drink {
    /// Unique drink identifier.
    pub id: i64,

    /// Unique drink title.
    pub title: String,

    /// Ordered recipe parts.
    pub recipe: Vec<RecipePart>,
}

/// Public representation of a drink: recipe colors and proportions only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortDrink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortRecipePart>,
}

impl Drink {
    /// Short representation, safe for unauthenticated callers.
    pub fn short(&self) -> ShortDrink {
        ShortDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|part| ShortRecipePart {
                    color: part.color.clone(),
                    parts: part.parts,
                })
                .collect(),
        }
    }

    /// Long representation with the full recipe.
    pub fn long(&self) -> Drink {
        self.clone()
    }
}

/// Recipe as sent by clients: one part or a list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<RecipePart>),
    One(RecipePart),
}

impl RecipeInput {
    fn into_parts(self) -> Vec<RecipePart> {
        match self {
            RecipeInput::Many(parts) => parts,
            RecipeInput::One(part) => vec![part],
        }
    }
}

/// Request body for `POST /drinks`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDrinkRequest {
    pub title: String,
    pub recipe: RecipeInput,
}

/// Request body for `PATCH /drinks/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchDrinkRequest {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

/// Validated drink ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<RecipePart>,
}

/// Validated partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrinkUpdate {
    pub title: Option<String>,
    pub recipe: Option<Vec<RecipePart>>,
}

impl CreateDrinkRequest {
    /// Validate and normalize the request.
    ///
    /// # Errors
    ///
    /// Returns `Unprocessable` for a blank or overlong title, an empty recipe,
    /// or an invalid recipe part.
    pub fn validate(self) -> Result<NewDrink, DrinkError> {
        Ok(NewDrink {
            title: validate_title(&self.title)?,
            recipe: validate_recipe(self.recipe.into_parts())?,
        })
    }
}

impl PatchDrinkRequest {
    /// Validate and normalize the request.
    ///
    /// # Errors
    ///
    /// Returns `Unprocessable` if neither field is present or a present field
    /// is invalid.
    pub fn validate(self) -> Result<DrinkUpdate, DrinkError> {
        if self.title.is_none() && self.recipe.is_none() {
            return Err(DrinkError::Unprocessable(
                "title or recipe is required".to_string(),
            ));
        }

        let title = self.title.as_deref().map(validate_title).transpose()?;
        let recipe = self
            .recipe
            .map(|recipe| validate_recipe(recipe.into_parts()))
            .transpose()?;

        Ok(DrinkUpdate { title, recipe })
    }
}

fn validate_title(title: &str) -> Result<String, DrinkError> {
    let title = title.trim();

    if title.is_empty() {
        return Err(DrinkError::Unprocessable("title must not be blank".to_string()));
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(DrinkError::Unprocessable(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }

    Ok(title.to_string())
}

fn validate_recipe(recipe: Vec<RecipePart>) -> Result<Vec<RecipePart>, DrinkError> {
    if recipe.is_empty() {
        return Err(DrinkError::Unprocessable(
            "recipe must contain at least one part".to_string(),
        ));
    }

    for part in &recipe {
        if part.name.trim().is_empty() || part.color.trim().is_empty() {
            return Err(DrinkError::Unprocessable(
                "recipe parts need a name and a color".to_string(),
            ));
        }
        if part.parts == 0 {
            return Err(DrinkError::Unprocessable(
                "recipe parts must be at least 1".to_string(),
            ));
        }
    }

    Ok(recipe)
}

// ============================================================================
// Responses
// ============================================================================

/// Response for `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy".
    pub status: &'static str,
}

/// Response carrying a list of drinks in either representation.
#[derive(Debug, Clone, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

/// Response for `DELETE /drinks/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: i64,
}

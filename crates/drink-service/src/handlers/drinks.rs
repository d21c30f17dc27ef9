//! Drink handlers.
//!
//! `GET /drinks` is public and returns the short representation. Every other
//! operation runs behind a permission guard and receives the verified claims.

use crate::auth::Claims;
use crate::errors::DrinkError;
use crate::models::{
    CreateDrinkRequest, DeleteResponse, Drink, DrinksResponse, PatchDrinkRequest, ShortDrink,
};
use crate::routes::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};

/// Handler for GET /drinks
#[instrument(skip_all, name = "drinks.handlers.list")]
pub async fn list_drinks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DrinksResponse<ShortDrink>>, DrinkError> {
    let drinks = state.repo.list().await?;
    Ok(Json(DrinksResponse::new(
        drinks.iter().map(Drink::short).collect(),
    )))
}

/// Handler for GET /drinks-detail
///
/// Requires `get:drinks-detail`.
#[instrument(skip_all, name = "drinks.handlers.detail")]
pub async fn get_drinks_detail(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<DrinksResponse<Drink>>, DrinkError> {
    let drinks = state.repo.list().await?;
    Ok(Json(DrinksResponse::new(
        drinks.iter().map(Drink::long).collect(),
    )))
}

/// Handler for POST /drinks
///
/// Requires `post:drinks`. Responds with the created drink in a one-element
/// list.
///
/// # Errors
///
/// `Unprocessable` for an unreadable body, a blank title, an invalid recipe,
/// or a title that already exists.
#[instrument(skip_all, name = "drinks.handlers.create")]
pub async fn create_drink(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<Claims>,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<Drink>>, DrinkError> {
    let Json(request) = payload.map_err(unprocessable_body)?;
    let new_drink = request.validate()?;

    let drink = state.repo.create(new_drink).await?;

    info!(target: "drinks.handlers.drinks", drink_id = drink.id, "Drink created");

    Ok(Json(DrinksResponse::new(vec![drink])))
}

/// Handler for PATCH /drinks/:id
///
/// Requires `patch:drinks`. Title and recipe are each optional but at least
/// one must be present.
#[instrument(skip_all, name = "drinks.handlers.update")]
pub async fn update_drink(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PatchDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<Drink>>, DrinkError> {
    let Path(id) = id.map_err(unknown_drink_path)?;
    let Json(request) = payload.map_err(unprocessable_body)?;
    let update = request.validate()?;

    let drink = state
        .repo
        .update(id, update)
        .await?
        .ok_or_else(|| DrinkError::NotFound(format!("drink {id}")))?;

    info!(target: "drinks.handlers.drinks", drink_id = id, "Drink updated");

    Ok(Json(DrinksResponse::new(vec![drink])))
}

/// Handler for DELETE /drinks/:id
///
/// Requires `delete:drinks`.
#[instrument(skip_all, name = "drinks.handlers.delete")]
pub async fn delete_drink(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, DrinkError> {
    let Path(id) = id.map_err(unknown_drink_path)?;

    if !state.repo.delete(id).await? {
        return Err(DrinkError::NotFound(format!("drink {id}")));
    }

    info!(target: "drinks.handlers.drinks", drink_id = id, "Drink deleted");

    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}

fn unprocessable_body(rejection: JsonRejection) -> DrinkError {
    tracing::debug!(target: "drinks.handlers.drinks", error = %rejection, "Rejected request body");
    DrinkError::Unprocessable(rejection.body_text())
}

/// Non-numeric ids name no drink.
fn unknown_drink_path(rejection: PathRejection) -> DrinkError {
    DrinkError::NotFound(rejection.body_text())
}

//! Meal validation endpoints
//!
//! Both endpoints apply the caller's role policy before touching the team:
//! volunteers may only mark meals as served.

use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::{info, warn};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::team::{Meal, MealStatus};
use crate::domain::User;

use super::teams::TeamResponse;

#[derive(Debug, Clone, Deserialize)]
pub struct SetMealRequest {
    pub status: MealStatus,
}

/// Scanned QR badge text plus the meal being served
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    pub payload: String,
    pub meal: Meal,
    #[serde(default = "served")]
    pub status: MealStatus,
}

fn served() -> MealStatus {
    MealStatus::Valid
}

fn parse_meal(meal: &str) -> Result<Meal, ApiError> {
    match meal {
        "lunch" => Ok(Meal::Lunch),
        "dinner" => Ok(Meal::Dinner),
        "snacks" => Ok(Meal::Snacks),
        other => Err(ApiError::bad_request(format!(
            "Unknown meal '{}', expected lunch, dinner or snacks",
            other
        ))
        .with_param("meal")),
    }
}

fn authorize(user: &User, status: MealStatus) -> Result<(), ApiError> {
    if user.role().can_set_meal_status(status) {
        return Ok(());
    }

    warn!(username = %user.username(), role = %user.role(), status = %status, "Meal status change denied");
    Err(ApiError::forbidden(format!(
        "Role '{}' may not mark meals as {}",
        user.role(),
        status
    )))
}

/// PUT /api/teams/{team_id}/meals/{meal}
pub async fn set_meal_status(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((team_id, meal)): Path<(String, String)>,
    Json(request): Json<SetMealRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    let meal = parse_meal(&meal)?;
    authorize(&user, request.status)?;

    let team = state
        .team_service
        .set_meal_status(&team_id, meal, request.status)
        .await?;

    info!(team_id = %team_id, meal = %meal, status = %request.status, by = %user.username(), "Meal status set");

    Ok(Json(TeamResponse::from(&team)))
}

/// POST /api/scan
pub async fn scan_badge(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<ScanRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    authorize(&user, request.status)?;

    let team = state
        .team_service
        .scan(&request.payload, request.meal, request.status)
        .await?;

    Ok(Json(TeamResponse::from(&team)))
}

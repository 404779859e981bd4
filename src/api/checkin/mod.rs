//! Check-in API endpoints for teams, meals and staff users

pub mod meals;
pub mod teams;
pub mod users;

use axum::{
    routing::{get, post, put},
    Router,
};

use super::state::AppState;

/// Create the check-in API router
pub fn create_checkin_router() -> Router<AppState> {
    Router::new()
        // Teams
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route("/teams/bulk", post(teams::bulk_create_teams))
        .route("/teams/stats", get(teams::team_stats))
        .route(
            "/teams/{team_id}",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        .route("/teams/{team_id}/badge", get(teams::team_badge))
        // Meals
        .route("/teams/{team_id}/meals/{meal}", put(meals::set_meal_status))
        .route("/scan", post(meals::scan_badge))
        // Staff users
        .route("/users", get(users::list_users).post(users::create_user))
}

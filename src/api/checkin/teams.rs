//! Team registration and lookup endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::middleware::{RequireAdmin, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::team::{
    BadgePayload, FoodStatus, FoodStatusPatch, NewTeam, Team, TeamMember, TeamPatch, TeamStatus,
    WriteOutcome,
};
use crate::infrastructure::team::{BulkFailure, TeamQuery, TeamStats};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemberBody {
    pub name: String,
    #[serde(default)]
    pub college_name: String,
}

impl From<MemberBody> for TeamMember {
    fn from(body: MemberBody) -> Self {
        TeamMember::new(body.name, body.college_name)
    }
}

/// Request to register a team
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamApiRequest {
    pub name: String,
    pub leader: String,
    #[serde(default)]
    pub status: TeamStatus,
    #[serde(default)]
    pub members: Vec<MemberBody>,
    #[serde(default)]
    pub food_status: Option<FoodStatus>,
}

impl From<CreateTeamApiRequest> for NewTeam {
    fn from(request: CreateTeamApiRequest) -> Self {
        let team = NewTeam::new(request.name, request.leader)
            .with_status(request.status)
            .with_members(request.members.into_iter().map(TeamMember::from).collect());

        match request.food_status {
            Some(food_status) => team.with_food_status(food_status),
            None => team,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkCreateRequest {
    pub teams: Vec<CreateTeamApiRequest>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTeamApiRequest {
    pub name: Option<String>,
    pub leader: Option<String>,
    pub status: Option<TeamStatus>,
    /// Replaces the whole member list
    pub members: Option<Vec<MemberBody>>,
    pub food_status: Option<FoodStatusPatch>,
}

impl From<UpdateTeamApiRequest> for TeamPatch {
    fn from(request: UpdateTeamApiRequest) -> Self {
        TeamPatch {
            name: request.name,
            leader: request.leader,
            status: request.status,
            members: request
                .members
                .map(|members| members.into_iter().map(TeamMember::from).collect()),
            food_status: request.food_status,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTeamsQuery {
    pub q: Option<String>,
    pub status: Option<TeamStatus>,
}

/// Team response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamResponse {
    pub id: String,
    pub name: String,
    pub leader: String,
    pub status: TeamStatus,
    pub members: Vec<MemberBody>,
    pub food_status: FoodStatus,
    pub created_at: String,
    /// Dependent records that failed to save alongside the team
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id().as_str().to_string(),
            name: team.name().to_string(),
            leader: team.leader().to_string(),
            status: team.status(),
            members: team
                .members()
                .iter()
                .map(|m| MemberBody {
                    name: m.name.clone(),
                    college_name: m.college_name.clone(),
                })
                .collect(),
            food_status: team.food_status(),
            created_at: team.created_at().to_rfc3339(),
            warnings: Vec::new(),
        }
    }
}

impl From<&WriteOutcome<Team>> for TeamResponse {
    fn from(outcome: &WriteOutcome<Team>) -> Self {
        let mut response = TeamResponse::from(&outcome.value);
        response.warnings = outcome
            .failures()
            .iter()
            .map(|f| format!("Failed to save {}: {}", f.record, f.message))
            .collect();
        response
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTeamsResponse {
    pub teams: Vec<TeamResponse>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkCreateResponse {
    pub created: Vec<TeamResponse>,
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeResponse {
    pub badge: BadgePayload,
    /// Text to encode into the QR image
    pub qr_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTeamResponse {
    pub id: String,
    pub deleted: bool,
}

fn team_not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("Team '{}' not found", id)).with_param("id")
}

/// GET /api/teams
pub async fn list_teams(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Query(query): Query<ListTeamsQuery>,
) -> Result<Json<ListTeamsResponse>, ApiError> {
    let teams = if query.q.is_none() && query.status.is_none() {
        state.team_service.list().await?
    } else {
        debug!(q = ?query.q, status = ?query.status, "Searching teams");
        let search = TeamQuery {
            text: query.q,
            status: query.status,
        };
        state.team_service.search(&search).await?
    };

    let teams: Vec<TeamResponse> = teams.iter().map(TeamResponse::from).collect();
    let total = teams.len();

    Ok(Json(ListTeamsResponse { teams, total }))
}

/// POST /api/teams
pub async fn create_team(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(request): Json<CreateTeamApiRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let outcome = state.team_service.create(request.into()).await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(&outcome))))
}

/// POST /api/teams/bulk
pub async fn bulk_create_teams(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<BulkCreateRequest>,
) -> Result<Json<BulkCreateResponse>, ApiError> {
    if request.teams.is_empty() {
        return Err(ApiError::bad_request("No teams to register").with_param("teams"));
    }

    debug!(count = request.teams.len(), by = %admin.username(), "Bulk registration");

    let inputs = request.teams.into_iter().map(NewTeam::from).collect();
    let result = state.team_service.register_many(inputs).await;

    Ok(Json(BulkCreateResponse {
        created: result.created.iter().map(TeamResponse::from).collect(),
        failed: result.failed,
    }))
}

/// GET /api/teams/stats
pub async fn team_stats(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
) -> Result<Json<TeamStats>, ApiError> {
    Ok(Json(state.team_service.stats().await?))
}

/// GET /api/teams/{team_id}
pub async fn get_team(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(team_id): Path<String>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state
        .team_service
        .get(&team_id)
        .await?
        .ok_or_else(|| team_not_found(&team_id))?;

    Ok(Json(TeamResponse::from(&team)))
}

/// PUT /api/teams/{team_id}
pub async fn update_team(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(team_id): Path<String>,
    Json(request): Json<UpdateTeamApiRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    let outcome = state.team_service.update(&team_id, request.into()).await?;

    if !outcome.is_consistent() {
        warn!(team_id = %team_id, "Team updated with failed dependent writes");
    }

    Ok(Json(TeamResponse::from(&outcome)))
}

/// DELETE /api/teams/{team_id}
pub async fn delete_team(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(team_id): Path<String>,
) -> Result<Json<DeleteTeamResponse>, ApiError> {
    if !state.team_service.delete(&team_id).await? {
        return Err(team_not_found(&team_id));
    }

    Ok(Json(DeleteTeamResponse {
        id: team_id,
        deleted: true,
    }))
}

/// GET /api/teams/{team_id}/badge
pub async fn team_badge(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(team_id): Path<String>,
) -> Result<Json<BadgeResponse>, ApiError> {
    let badge = state.team_service.badge(&team_id).await?;
    let qr_text = badge.to_json()?;

    Ok(Json(BadgeResponse { badge, qr_text }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router::create_router_with_state;
    use crate::api::state::test_support::{test_app, TestApp};
    use crate::domain::team::MealStatus;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use axum::Router;
    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));

        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn parse<T: DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    async fn setup() -> (TestApp, Router) {
        let app = test_app().await;
        let router = create_router_with_state(app.state.clone());
        (app, router)
    }

    async fn create_alpha(router: &Router, token: &str) -> TeamResponse {
        let body = json!({
            "name": "Alpha",
            "leader": "Amy",
            "members": [{"name": "Bob", "college_name": "X"}]
        });
        let (status, json) = send(router, request("POST", "/api/teams", token, Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
        parse(json)
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (app, router) = setup().await;

        let created = create_alpha(&router, &app.admin_token).await;
        assert_eq!(created.id, "2501");
        assert_eq!(created.status, TeamStatus::Inactive);
        assert_eq!(created.food_status, FoodStatus::default());
        assert!(created.warnings.is_empty());

        let (status, json) = send(
            &router,
            request("GET", "/api/teams/2501", &app.volunteer_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let fetched: TeamResponse = parse(json);
        assert_eq!(fetched.name, "Alpha");
        assert_eq!(fetched.members.len(), 1);
        assert_eq!(fetched.members[0].college_name, "X");
    }

    #[tokio::test]
    async fn test_volunteer_cannot_create() {
        let (app, router) = setup().await;

        let body = json!({"name": "Alpha", "leader": "Amy"});
        let (status, json) = send(
            &router,
            request("POST", "/api/teams", &app.volunteer_token, Some(body)),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"]["type"], "permission_error");
    }

    #[tokio::test]
    async fn test_create_validation_error() {
        let (app, router) = setup().await;

        let body = json!({"name": "", "leader": "Amy"});
        let (status, json) = send(
            &router,
            request("POST", "/api/teams", &app.admin_token, Some(body)),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn test_list_and_search() {
        let (app, router) = setup().await;
        create_alpha(&router, &app.admin_token).await;

        let body = json!({"name": "Byte Club", "leader": "Ben", "status": "active"});
        send(&router, request("POST", "/api/teams", &app.admin_token, Some(body))).await;

        let (status, json) = send(
            &router,
            request("GET", "/api/teams", &app.volunteer_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let all: ListTeamsResponse = parse(json);
        assert_eq!(all.total, 2);
        // Newest first
        assert_eq!(all.teams[0].name, "Byte Club");

        let (_, json) = send(
            &router,
            request("GET", "/api/teams?q=amy", &app.volunteer_token, None),
        )
        .await;
        let by_text: ListTeamsResponse = parse(json);
        assert_eq!(by_text.total, 1);
        assert_eq!(by_text.teams[0].name, "Alpha");

        let (_, json) = send(
            &router,
            request("GET", "/api/teams?status=active", &app.volunteer_token, None),
        )
        .await;
        let by_status: ListTeamsResponse = parse(json);
        assert_eq!(by_status.total, 1);
        assert_eq!(by_status.teams[0].name, "Byte Club");
    }

    #[tokio::test]
    async fn test_bulk_create_reports_failures() {
        let (app, router) = setup().await;

        let body = json!({"teams": [
            {"name": "Alpha", "leader": "Amy"},
            {"name": "", "leader": "Nobody"},
            {"name": "Gamma", "leader": "Cara"}
        ]});
        let (status, json) = send(
            &router,
            request("POST", "/api/teams/bulk", &app.admin_token, Some(body)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["created"].as_array().unwrap().len(), 2);
        assert_eq!(json["failed"][0]["index"], 1);
        assert_eq!(json["created"][0]["id"], "2501");
        assert_eq!(json["created"][1]["id"], "2502");
    }

    #[tokio::test]
    async fn test_update_patches_fields() {
        let (app, router) = setup().await;
        create_alpha(&router, &app.admin_token).await;

        let body = json!({
            "leader": "Ann",
            "members": [{"name": "Zed", "college_name": "Y"}],
            "food_status": {"lunch": "valid"}
        });
        let (status, json) = send(
            &router,
            request("PUT", "/api/teams/2501", &app.admin_token, Some(body)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let updated: TeamResponse = parse(json);
        assert_eq!(updated.name, "Alpha");
        assert_eq!(updated.leader, "Ann");
        assert_eq!(updated.members.len(), 1);
        assert_eq!(updated.members[0].name, "Zed");
        assert_eq!(updated.food_status.lunch, MealStatus::Valid);
        assert_eq!(updated.food_status.dinner, MealStatus::Invalid);
    }

    #[tokio::test]
    async fn test_update_missing_team() {
        let (app, router) = setup().await;

        let body = json!({"name": "Ghost"});
        let (status, _) = send(
            &router,
            request("PUT", "/api/teams/9999", &app.admin_token, Some(body)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_team() {
        let (app, router) = setup().await;
        create_alpha(&router, &app.admin_token).await;

        let (status, _) = send(
            &router,
            request("DELETE", "/api/teams/2501", &app.admin_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &router,
            request("GET", "/api/teams/2501", &app.admin_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &router,
            request("DELETE", "/api/teams/2501", &app.admin_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_team_id() {
        let (app, router) = setup().await;

        let (status, json) = send(
            &router,
            request("GET", "/api/teams/bad%20id", &app.admin_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["param"], "id");
    }

    #[tokio::test]
    async fn test_badge_and_stats() {
        let (app, router) = setup().await;
        create_alpha(&router, &app.admin_token).await;

        let (status, json) = send(
            &router,
            request("GET", "/api/teams/2501/badge", &app.volunteer_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let badge: BadgeResponse = parse(json);
        assert_eq!(badge.badge.id, "2501");
        let decoded: Value = serde_json::from_str(&badge.qr_text).unwrap();
        assert_eq!(decoded["foodStatus"]["lunch"], "invalid");

        let (status, json) = send(
            &router,
            request("GET", "/api/teams/stats", &app.volunteer_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 1);
        assert_eq!(json["inactive"], 1);
        assert_eq!(json["lunch_served"], 0);
    }
}

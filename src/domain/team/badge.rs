//! QR badge payload
//!
//! The badge QR code encodes a JSON snapshot of the team. Only `id` is needed
//! to resolve a scan; the rest is informational for whoever prints the badge.

use serde::{Deserialize, Serialize};

use super::entity::{FoodStatus, Team, TeamId, TeamStatus};
use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeMember {
    pub name: String,
    pub college_name: String,
}

/// JSON document encoded into a team's QR badge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgePayload {
    pub id: String,
    pub name: String,
    pub leader: String,
    pub members: Vec<BadgeMember>,
    pub status: TeamStatus,
    pub food_status: FoodStatus,
}

#[derive(Deserialize)]
struct ScannedBadge {
    id: String,
}

impl BadgePayload {
    pub fn from_team(team: &Team) -> Self {
        Self {
            id: team.id().as_str().to_string(),
            name: team.name().to_string(),
            leader: team.leader().to_string(),
            members: team
                .members()
                .iter()
                .map(|m| BadgeMember {
                    name: m.name.clone(),
                    college_name: m.college_name.clone(),
                })
                .collect(),
            status: team.status(),
            food_status: team.food_status(),
        }
    }

    /// Text to encode into the QR image
    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(self)
            .map_err(|e| DomainError::internal(format!("Failed to encode badge: {}", e)))
    }

    /// Extract the team id from scanned QR text.
    ///
    /// Only `id` is read, so badges printed before a team was edited still scan.
    pub fn parse_team_id(text: &str) -> Result<TeamId, DomainError> {
        let scanned: ScannedBadge = serde_json::from_str(text.trim())
            .map_err(|e| DomainError::validation(format!("Invalid QR payload: {}", e)))?;

        TeamId::new(scanned.id)
            .map_err(|e| DomainError::validation(format!("Invalid QR payload: {}", e)))
    }
}

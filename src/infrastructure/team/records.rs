//! Persisted record shapes for the team aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::storage::CollectionRecord;
use crate::domain::team::{FoodStatus, MealStatus, Team, TeamId, TeamMember, TeamStatus};
use crate::infrastructure::storage::timestamp;

pub const TEAM_ID_FIELD: &str = "team_id";
pub const POSITION_FIELD: &str = "position";

/// Base team record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: TeamId,
    pub name: String,
    pub leader: String,
    #[serde(default)]
    pub status: TeamStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl CollectionRecord for TeamRecord {
    const COLLECTION: &'static str = "teams";
}

impl TeamRecord {
    pub fn from_team(team: &Team) -> Self {
        Self {
            id: team.id().clone(),
            name: team.name().to_string(),
            leader: team.leader().to_string(),
            status: team.status(),
            created_at: team.created_at(),
        }
    }

    /// The base team with no members and default food status
    pub fn into_team(self) -> Team {
        Team::new(self.id, self.name, self.leader, self.created_at).with_status(self.status)
    }
}

/// One member row; `position` keeps registration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub team_id: String,
    #[serde(default)]
    pub position: u32,
    pub name: String,
    pub college_name: String,
}

impl CollectionRecord for MemberRecord {
    const COLLECTION: &'static str = "team_members";
}

impl MemberRecord {
    pub fn new(team_id: &TeamId, position: u32, member: &TeamMember) -> Self {
        Self {
            team_id: team_id.as_str().to_string(),
            position,
            name: member.name.clone(),
            college_name: member.college_name.clone(),
        }
    }

    pub fn into_member(self) -> TeamMember {
        TeamMember::new(self.name, self.college_name)
    }
}

/// Food status row, one per team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodStatusRecord {
    pub team_id: String,
    #[serde(default)]
    pub lunch: MealStatus,
    #[serde(default)]
    pub dinner: MealStatus,
    #[serde(default)]
    pub snacks: MealStatus,
}

impl CollectionRecord for FoodStatusRecord {
    const COLLECTION: &'static str = "food_status";
}

impl FoodStatusRecord {
    pub fn new(team_id: &TeamId, food_status: FoodStatus) -> Self {
        Self {
            team_id: team_id.as_str().to_string(),
            lunch: food_status.lunch,
            dinner: food_status.dinner,
            snacks: food_status.snacks,
        }
    }

    pub fn food_status(&self) -> FoodStatus {
        FoodStatus {
            lunch: self.lunch,
            dinner: self.dinner,
            snacks: self.snacks,
        }
    }
}

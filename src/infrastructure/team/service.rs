//! Team service for check-in desk operations

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::team::{
    BadgePayload, Meal, MealStatus, NewTeam, Team, TeamId, TeamPatch, TeamRepository, TeamStatus,
    WriteOutcome,
};
use crate::domain::DomainError;

/// Filter for listing teams
#[derive(Debug, Clone, Default)]
pub struct TeamQuery {
    /// Case-insensitive substring of name, leader or id
    pub text: Option<String>,
    pub status: Option<TeamStatus>,
}

impl TeamQuery {
    pub fn matches(&self, team: &Team) -> bool {
        if let Some(status) = self.status {
            if team.status() != status {
                return false;
            }
        }

        match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                let needle = text.to_lowercase();
                team.name().to_lowercase().contains(&needle)
                    || team.leader().to_lowercase().contains(&needle)
                    || team.id().as_str().contains(&needle)
            }
            _ => true,
        }
    }
}

/// Dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub lunch_served: usize,
    pub dinner_served: usize,
    pub snacks_served: usize,
}

impl TeamStats {
    pub fn from_teams(teams: &[Team]) -> Self {
        let served = |meal: Meal| {
            teams
                .iter()
                .filter(|t| t.food_status().get(meal).is_valid())
                .count()
        };
        let active = teams.iter().filter(|t| t.status().is_active()).count();

        Self {
            total: teams.len(),
            active,
            inactive: teams.len() - active,
            lunch_served: served(Meal::Lunch),
            dinner_served: served(Meal::Dinner),
            snacks_served: served(Meal::Snacks),
        }
    }
}

/// A bulk registration entry that could not be created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkFailure {
    /// Zero-based position in the submitted batch
    pub index: usize,
    pub name: String,
    pub message: String,
}

/// Result of a bulk registration
#[derive(Debug, Clone, Default)]
pub struct BulkRegistration {
    pub created: Vec<WriteOutcome<Team>>,
    pub failed: Vec<BulkFailure>,
}

fn parse_id(id: &str) -> Result<TeamId, DomainError> {
    TeamId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))
}

fn team_not_found(id: &TeamId) -> DomainError {
    DomainError::not_found(format!("Team '{}' not found", id))
}

/// Team service wrapping a team repository
#[derive(Debug)]
pub struct TeamService<R: TeamRepository> {
    repository: Arc<R>,
}

impl<R: TeamRepository> TeamService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Register a team
    pub async fn create(&self, input: NewTeam) -> Result<WriteOutcome<Team>, DomainError> {
        info!(name = %input.name, leader = %input.leader, "Registering team");
        self.repository.create(input).await
    }

    /// Register teams one after another, skipping the ones that fail
    pub async fn register_many(&self, inputs: Vec<NewTeam>) -> BulkRegistration {
        let mut result = BulkRegistration::default();

        for (index, input) in inputs.into_iter().enumerate() {
            let name = input.name.clone();

            match self.repository.create(input).await {
                Ok(outcome) => result.created.push(outcome),
                Err(e) => {
                    warn!(index, name = %name, error = %e, "Bulk registration entry failed");
                    result.failed.push(BulkFailure {
                        index,
                        name,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            created = result.created.len(),
            failed = result.failed.len(),
            "Bulk registration finished"
        );

        result
    }

    /// Get a team by ID
    pub async fn get(&self, id: &str) -> Result<Option<Team>, DomainError> {
        let team_id = parse_id(id)?;
        self.repository.get_one(&team_id).await
    }

    /// All teams, newest first
    pub async fn list(&self) -> Result<Vec<Team>, DomainError> {
        self.repository.get_all().await
    }

    /// Teams matching a query, newest first
    pub async fn search(&self, query: &TeamQuery) -> Result<Vec<Team>, DomainError> {
        let teams = self.repository.get_all().await?;
        Ok(teams.into_iter().filter(|t| query.matches(t)).collect())
    }

    pub async fn stats(&self) -> Result<TeamStats, DomainError> {
        let teams = self.repository.get_all().await?;
        Ok(TeamStats::from_teams(&teams))
    }

    /// Update a team
    pub async fn update(
        &self,
        id: &str,
        patch: TeamPatch,
    ) -> Result<WriteOutcome<Team>, DomainError> {
        info!(id = %id, "Updating team");

        let team_id = parse_id(id)?;

        self.repository
            .update(&team_id, patch)
            .await?
            .ok_or_else(|| team_not_found(&team_id))
    }

    /// Delete a team
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        info!(id = %id, "Deleting team");

        let team_id = parse_id(id)?;
        self.repository.delete(&team_id).await
    }

    /// Set one meal's status
    pub async fn set_meal_status(
        &self,
        id: &str,
        meal: Meal,
        status: MealStatus,
    ) -> Result<Team, DomainError> {
        let team_id = parse_id(id)?;

        self.repository
            .set_meal_status(&team_id, meal, status)
            .await?
            .ok_or_else(|| team_not_found(&team_id))
    }

    /// QR badge payload for a team
    pub async fn badge(&self, id: &str) -> Result<BadgePayload, DomainError> {
        let team_id = parse_id(id)?;

        let team = self
            .repository
            .get_one(&team_id)
            .await?
            .ok_or_else(|| team_not_found(&team_id))?;

        Ok(BadgePayload::from_team(&team))
    }

    /// Resolve scanned QR text to a team and set the meal status
    pub async fn scan(
        &self,
        payload: &str,
        meal: Meal,
        status: MealStatus,
    ) -> Result<Team, DomainError> {
        let team_id = BadgePayload::parse_team_id(payload)?;

        info!(team_id = %team_id, meal = %meal, status = %status, "Badge scanned");

        self.repository
            .set_meal_status(&team_id, meal, status)
            .await?
            .ok_or_else(|| team_not_found(&team_id))
    }
}

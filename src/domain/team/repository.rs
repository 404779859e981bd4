//! Team repository trait and its input/outcome types

use async_trait::async_trait;

use super::entity::{FoodStatus, FoodStatusPatch, Meal, MealStatus, Team, TeamId, TeamMember, TeamStatus};
use super::validation::{validate_leader, validate_members, validate_team_name, TeamValidationError};
use crate::domain::DomainError;

/// Input for registering a new team
#[derive(Debug, Clone, PartialEq)]
pub struct NewTeam {
    pub name: String,
    pub leader: String,
    pub status: TeamStatus,
    pub members: Vec<TeamMember>,
    /// Defaults to all meals invalid when absent
    pub food_status: Option<FoodStatus>,
}

impl NewTeam {
    pub fn new(name: impl Into<String>, leader: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            leader: leader.into(),
            status: TeamStatus::default(),
            members: Vec::new(),
            food_status: None,
        }
    }

    pub fn with_member(mut self, member: TeamMember) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_members(mut self, members: Vec<TeamMember>) -> Self {
        self.members = members;
        self
    }

    pub fn with_status(mut self, status: TeamStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_food_status(mut self, food_status: FoodStatus) -> Self {
        self.food_status = Some(food_status);
        self
    }

    pub fn validate(&self) -> Result<(), TeamValidationError> {
        validate_team_name(&self.name)?;
        validate_leader(&self.leader)?;
        validate_members(&self.members)
    }
}

/// Partial update of a team; only present fields are applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub leader: Option<String>,
    pub status: Option<TeamStatus>,
    /// Replaces the whole member set when present
    pub members: Option<Vec<TeamMember>>,
    /// Patched per meal when present
    pub food_status: Option<FoodStatusPatch>,
}

impl TeamPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_leader(mut self, leader: impl Into<String>) -> Self {
        self.leader = Some(leader.into());
        self
    }

    pub fn with_status(mut self, status: TeamStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_members(mut self, members: Vec<TeamMember>) -> Self {
        self.members = Some(members);
        self
    }

    pub fn with_food_status(mut self, food_status: FoodStatusPatch) -> Self {
        self.food_status = Some(food_status);
        self
    }

    /// Whether the base team record is touched
    pub fn has_base_changes(&self) -> bool {
        self.name.is_some() || self.leader.is_some() || self.status.is_some()
    }

    pub fn validate(&self) -> Result<(), TeamValidationError> {
        if let Some(ref name) = self.name {
            validate_team_name(name)?;
        }

        if let Some(ref leader) = self.leader {
            validate_leader(leader)?;
        }

        if let Some(ref members) = self.members {
            validate_members(members)?;
        }

        Ok(())
    }
}

/// Dependent record group of a team aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependentRecord {
    Members,
    FoodStatus,
}

impl std::fmt::Display for DependentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Members => write!(f, "members"),
            Self::FoodStatus => write!(f, "food status"),
        }
    }
}

/// A dependent write that failed after the base record was committed
#[derive(Debug, Clone, PartialEq)]
pub struct DependentWriteFailure {
    pub record: DependentRecord,
    pub message: String,
}

/// Whether every record of an aggregate write landed
#[derive(Debug, Clone, PartialEq)]
pub enum Consistency {
    Consistent,
    /// Base record committed, some dependent writes failed
    Degraded(Vec<DependentWriteFailure>),
}

/// Result of an aggregate write
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome<T> {
    pub value: T,
    pub consistency: Consistency,
}

impl<T> WriteOutcome<T> {
    pub(crate) fn from_failures(value: T, failures: Vec<DependentWriteFailure>) -> Self {
        let consistency = if failures.is_empty() {
            Consistency::Consistent
        } else {
            Consistency::Degraded(failures)
        };

        Self { value, consistency }
    }

    pub fn is_consistent(&self) -> bool {
        matches!(self.consistency, Consistency::Consistent)
    }

    /// Dependent records that failed to write
    pub fn failures(&self) -> &[DependentWriteFailure] {
        match &self.consistency {
            Consistency::Consistent => &[],
            Consistency::Degraded(failures) => failures,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Repository owning team identity, caching and aggregate consistency
#[async_trait]
pub trait TeamRepository: Send + Sync + std::fmt::Debug {
    /// Every team, hydrated, most recently created first
    async fn get_all(&self) -> Result<Vec<Team>, DomainError>;

    /// A single hydrated team
    async fn get_one(&self, id: &TeamId) -> Result<Option<Team>, DomainError>;

    /// Register a team with a freshly allocated id
    async fn create(&self, input: NewTeam) -> Result<WriteOutcome<Team>, DomainError>;

    /// Apply a partial update; `Ok(None)` when no team matches
    async fn update(
        &self,
        id: &TeamId,
        patch: TeamPatch,
    ) -> Result<Option<WriteOutcome<Team>>, DomainError>;

    /// Delete a team; `true` when a team was removed
    async fn delete(&self, id: &TeamId) -> Result<bool, DomainError>;

    /// Set a single meal's status without touching the other meals
    async fn set_meal_status(
        &self,
        team_id: &TeamId,
        meal: Meal,
        status: MealStatus,
    ) -> Result<Option<Team>, DomainError>;
}

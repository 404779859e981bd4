//! Team aggregate and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_team_id, TeamValidationError};

/// Team identifier - repository-assigned, human readable (e.g. "2501")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TeamId(String);

impl TeamId {
    /// Create a new TeamId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, TeamValidationError> {
        let id = id.into();
        validate_team_id(&id)?;
        Ok(Self(id))
    }

    /// Create a TeamId from an allocated sequence number
    pub fn from_number(number: u64) -> Self {
        Self(number.to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the id, if it is a sequence-allocated id
    pub fn number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl TryFrom<String> for TeamId {
    type Error = TeamValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TeamId> for String {
    fn from(id: TeamId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    /// Team has checked in
    Active,
    /// Team is registered but not checked in
    #[default]
    Inactive,
}

impl TeamStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// Meals tracked per team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Meal {
    Lunch,
    Dinner,
    Snacks,
}

impl Meal {
    pub const ALL: [Meal; 3] = [Meal::Lunch, Meal::Dinner, Meal::Snacks];

    /// Field name used in stored food status records
    pub fn field(&self) -> &'static str {
        match self {
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snacks => "snacks",
        }
    }
}

impl std::fmt::Display for Meal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field())
    }
}

/// Validation state of a single meal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MealStatus {
    Valid,
    #[default]
    Invalid,
}

impl MealStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl std::fmt::Display for MealStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}

/// Per-team meal validation record; every meal is always present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FoodStatus {
    pub lunch: MealStatus,
    pub dinner: MealStatus,
    pub snacks: MealStatus,
}

impl FoodStatus {
    pub fn get(&self, meal: Meal) -> MealStatus {
        match meal {
            Meal::Lunch => self.lunch,
            Meal::Dinner => self.dinner,
            Meal::Snacks => self.snacks,
        }
    }

    pub fn set(&mut self, meal: Meal, status: MealStatus) {
        match meal {
            Meal::Lunch => self.lunch = status,
            Meal::Dinner => self.dinner = status,
            Meal::Snacks => self.snacks = status,
        }
    }

    /// Copy with one meal changed (builder pattern)
    pub fn with(mut self, meal: Meal, status: MealStatus) -> Self {
        self.set(meal, status);
        self
    }
}

/// Partial food status change; `None` fields are left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FoodStatusPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lunch: Option<MealStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dinner: Option<MealStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snacks: Option<MealStatus>,
}

impl FoodStatusPatch {
    /// Patch touching exactly one meal
    pub fn single(meal: Meal, status: MealStatus) -> Self {
        Self::default().with(meal, status)
    }

    /// Patch replacing every meal
    pub fn full(food_status: FoodStatus) -> Self {
        Self {
            lunch: Some(food_status.lunch),
            dinner: Some(food_status.dinner),
            snacks: Some(food_status.snacks),
        }
    }

    pub fn with(mut self, meal: Meal, status: MealStatus) -> Self {
        match meal {
            Meal::Lunch => self.lunch = Some(status),
            Meal::Dinner => self.dinner = Some(status),
            Meal::Snacks => self.snacks = Some(status),
        }
        self
    }

    pub fn get(&self, meal: Meal) -> Option<MealStatus> {
        match meal {
            Meal::Lunch => self.lunch,
            Meal::Dinner => self.dinner,
            Meal::Snacks => self.snacks,
        }
    }

    pub fn is_empty(&self) -> bool {
        Meal::ALL.iter().all(|meal| self.get(*meal).is_none())
    }

    /// The meals this patch sets, in declaration order
    pub fn changes(&self) -> impl Iterator<Item = (Meal, MealStatus)> + '_ {
        Meal::ALL
            .into_iter()
            .filter_map(|meal| self.get(meal).map(|status| (meal, status)))
    }

    /// Apply to an existing food status
    pub fn apply_to(&self, mut food_status: FoodStatus) -> FoodStatus {
        for (meal, status) in self.changes() {
            food_status.set(meal, status);
        }
        food_status
    }
}

/// A member of a team; owned by the team, no identity of its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub college_name: String,
}

impl TeamMember {
    pub fn new(name: impl Into<String>, college_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            college_name: college_name.into(),
        }
    }
}

/// Team aggregate: base record plus its members and food status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: String,
    leader: String,
    status: TeamStatus,
    members: Vec<TeamMember>,
    food_status: FoodStatus,
    created_at: DateTime<Utc>,
}

impl Team {
    /// Create a team with no members, default status and default food status
    pub fn new(
        id: TeamId,
        name: impl Into<String>,
        leader: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            leader: leader.into(),
            status: TeamStatus::default(),
            members: Vec::new(),
            food_status: FoodStatus::default(),
            created_at,
        }
    }

    pub fn with_status(mut self, status: TeamStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_members(mut self, members: Vec<TeamMember>) -> Self {
        self.members = members;
        self
    }

    pub fn with_food_status(mut self, food_status: FoodStatus) -> Self {
        self.food_status = food_status;
        self
    }

    // Getters

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn leader(&self) -> &str {
        &self.leader
    }

    pub fn status(&self) -> TeamStatus {
        self.status
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn food_status(&self) -> FoodStatus {
        self.food_status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

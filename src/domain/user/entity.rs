//! User entity and roles

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_user_id, UserValidationError};
use crate::domain::team::MealStatus;

/// User identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a staff user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full control over teams and users
    Admin,
    /// Scanning desk: can mark meals as served
    #[default]
    Volunteer,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Meal status transitions allowed for this role.
    ///
    /// Admins may move a meal in either direction; volunteers may only mark
    /// a meal as valid. The team repository does not consult this.
    pub fn can_set_meal_status(&self, target: MealStatus) -> bool {
        match self {
            Self::Admin => true,
            Self::Volunteer => target.is_valid(),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Volunteer => write!(f, "volunteer"),
        }
    }
}

/// Staff user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    /// Opaque stored credential - never exposed in serialization
    #[serde(default, skip_serializing)]
    password: String,
    role: UserRole,
    created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        password: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            password: password.into(),
            role,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    /// Restore a user from stored fields
    pub fn from_parts(
        id: UserId,
        username: String,
        password: String,
        role: UserRole,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            password,
            role,
            created_at,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_valid() {
        let id = UserId::generate();
        assert!(UserId::new(id.as_str()).is_ok());
        assert_ne!(UserId::generate(), id);
    }

    #[test]
    fn test_role_meal_policy() {
        assert!(UserRole::Admin.can_set_meal_status(MealStatus::Valid));
        assert!(UserRole::Admin.can_set_meal_status(MealStatus::Invalid));
        assert!(UserRole::Volunteer.can_set_meal_status(MealStatus::Valid));
        assert!(!UserRole::Volunteer.can_set_meal_status(MealStatus::Invalid));
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(
            serde_json::to_string(&UserRole::Volunteer).unwrap(),
            "\"volunteer\""
        );
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert!(role.is_admin());
    }

    #[test]
    fn test_new_user_created_at_has_microsecond_precision() {
        let user = User::new(UserId::generate(), "desk", "hash", UserRole::Volunteer);
        assert_eq!(user.created_at().timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn test_password_not_serialized() {
        let user = User::new(UserId::generate(), "admin", "secret-hash", UserRole::Admin);
        let json = serde_json::to_string(&user).unwrap();

        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password"));

        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back.username(), "admin");
        assert_eq!(back.password(), "");
    }
}

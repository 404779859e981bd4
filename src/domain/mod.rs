//! Domain layer - Core business logic and entities

pub mod error;
pub mod session;
pub mod storage;
pub mod team;
pub mod user;

pub use error::DomainError;
pub use session::SessionStore;
pub use storage::{CollectionRecord, Filter, OrderBy, Record, RecordStore, SortDirection};
pub use team::{
    BadgeMember, BadgePayload, Consistency, DependentRecord, DependentWriteFailure, FoodStatus,
    FoodStatusPatch, Meal, MealStatus, NewTeam, Team, TeamId, TeamIdAllocator, TeamMember,
    TeamPatch, TeamRepository, TeamStatus, TeamValidationError, WriteOutcome,
};
pub use user::{User, UserId, UserRepository, UserRole, UserValidationError};

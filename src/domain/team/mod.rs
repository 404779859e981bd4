//! Team domain module
//!
//! A team is an aggregate of its base record, its members and its per-meal
//! food status. Members and food status have no identity of their own.

mod allocator;
mod badge;
mod entity;
mod repository;
mod validation;

pub use allocator::TeamIdAllocator;
pub use badge::{BadgeMember, BadgePayload};
pub use entity::{
    FoodStatus, FoodStatusPatch, Meal, MealStatus, Team, TeamId, TeamMember, TeamStatus,
};
pub use repository::{
    Consistency, DependentRecord, DependentWriteFailure, NewTeam, TeamPatch, TeamRepository,
    WriteOutcome,
};
pub use validation::{
    validate_leader, validate_members, validate_team_id, validate_team_name, TeamValidationError,
};

//! User domain
//!
//! Staff accounts (admins and volunteers) that operate the check-in desk.

mod entity;
mod repository;
mod validation;

pub use entity::{User, UserId, UserRole};
pub use repository::UserRepository;
pub use validation::{
    validate_password, validate_user_id, validate_username, UserValidationError,
};

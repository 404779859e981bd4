//! User infrastructure module
//!
//! Argon2 credential hashing, the record-store-backed user repository and the
//! user service.

mod password;
mod repository;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use repository::StoreUserRepository;
pub use service::{CreateUserRequest, UserService};

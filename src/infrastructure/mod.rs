//! Infrastructure layer - External service implementations

pub mod auth;
pub mod cache;
pub mod logging;
pub mod session;
pub mod storage;
pub mod team;
pub mod user;

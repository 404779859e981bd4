//! Authentication infrastructure module
//!
//! JWT token management for staff sessions.

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService};

//! Team infrastructure implementations

mod allocator;
mod records;
mod repository;
mod service;

pub use allocator::{MaxScanAllocator, DEFAULT_TEAM_ID_OFFSET};
pub use records::{FoodStatusRecord, MemberRecord, TeamRecord};
pub use repository::StoreTeamRepository;
pub use service::{BulkFailure, BulkRegistration, TeamQuery, TeamService, TeamStats};

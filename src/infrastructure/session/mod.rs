//! Session store implementations

mod current_user;
mod file;
mod in_memory;

pub use current_user::{CurrentUserSession, SessionUser};
pub use file::FileSessionStore;
pub use in_memory::InMemorySessionStore;

//! Authoritative store implementations.

pub mod memory;
pub mod sqlite;

pub use linkhop_core::repository::{ReadRepository, Repository, Result};
pub use linkhop_core::{ClickRepository, StorageError};
pub use memory::InMemoryRepository;
pub use sqlite::{SqliteRepository, SqliteSettings};

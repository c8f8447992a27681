use thiserror::Error;

use crate::security::UserRole;

/// Conditions reported by the simulation engines. None of them are fatal:
/// the caller reports the condition and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("no free block can hold {size} units for {owner}")]
    AllocationFailed { size: usize, owner: String },

    #[error("allocation size must be greater than zero")]
    InvalidSize,

    #[error("no allocated block starts at address {address}")]
    DeallocationFailed { address: usize },

    #[error("no free frame left to back page {page}")]
    FrameExhausted { page: i64 },

    #[error("page fault on page {page}")]
    PageFault { page: i64 },

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("access denied: {required:?} role required")]
    AccessDenied { required: UserRole },

    #[error("user {0} already exists")]
    DuplicateUser(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

//! User domain
//!
//! This module provides domain types and traits for user administration,
//! including the user entity, the update schema, and the repository trait.

mod entity;
mod repository;
mod stats;
mod validation;

pub use entity::{NewUser, User, UserChanges, UserId, UserRole};
pub use repository::UserRepository;
pub use stats::{UserStats, RECENT_USERS_LIMIT};
pub use validation::{
    UpdateUserRequest, UserValidationError, EMAIL_INVALID, EMAIL_TAKEN, NAME_NOT_STRING,
    NAME_TOO_LONG, ROLE_INVALID,
};

#[cfg(test)]
pub use repository::MockUserRepository;

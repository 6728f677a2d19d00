//! Domain layer - Core business logic and entities

pub mod error;
pub mod page;
pub mod user;

pub use error::{DomainError, FieldErrors};
pub use page::{Page, PageRequest, DEFAULT_PER_PAGE};
pub use user::{
    NewUser, UpdateUserRequest, User, UserChanges, UserId, UserRepository, UserRole,
    UserStats,
};

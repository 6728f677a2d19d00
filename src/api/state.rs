//! Application state for shared services

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::{DomainError, Page, PageRequest, User, UserId, UserStats};
use crate::domain::user::UserRepository;
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::user::{CreateUserRequest, PasswordHasher, UserService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    pub fn new(user_service: Arc<dyn UserServiceTrait>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            user_service,
            jwt_service,
        }
    }
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError>;
    async fn find(&self, id: UserId) -> Result<Option<User>, DomainError>;
    async fn list(&self, request: PageRequest) -> Result<Page<User>, DomainError>;
    async fn show(&self, id: &str) -> Result<User, DomainError>;
    async fn update(&self, id: &str, body: Map<String, Value>) -> Result<User, DomainError>;
    async fn destroy(&self, id: &str) -> Result<(), DomainError>;
    async fn stats(&self) -> Result<UserStats, DomainError>;
    async fn ping(&self) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        UserService::create(self, request).await
    }

    async fn find(&self, id: UserId) -> Result<Option<User>, DomainError> {
        UserService::find(self, id).await
    }

    async fn list(&self, request: PageRequest) -> Result<Page<User>, DomainError> {
        UserService::list(self, request).await
    }

    async fn show(&self, id: &str) -> Result<User, DomainError> {
        UserService::show(self, id).await
    }

    async fn update(&self, id: &str, body: Map<String, Value>) -> Result<User, DomainError> {
        UserService::update(self, id, body).await
    }

    async fn destroy(&self, id: &str) -> Result<(), DomainError> {
        UserService::destroy(self, id).await
    }

    async fn stats(&self) -> Result<UserStats, DomainError> {
        UserService::stats(self).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        UserService::ping(self).await
    }
}

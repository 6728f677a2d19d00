//! User service for listing, editing and summarising users

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::domain::user::{
    NewUser, UpdateUserRequest, User, UserId, UserRepository, UserRole, UserStats,
    RECENT_USERS_LIMIT,
};
use crate::domain::{DomainError, Page, PageRequest};

use super::password::PasswordHasher;

/// Request for creating a new user (registration and seeding)
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// User service over a repository
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository, H: PasswordHasher> UserService<R, H> {
    /// Create a new user service
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Create a new user with a hashed password
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        let password_hash = self.hasher.hash(&request.password)?;

        let user = self
            .repository
            .create(NewUser::new(
                request.name,
                request.email,
                request.role,
                password_hash,
            ))
            .await
            .map_err(conflict_to_validation)?;

        info!(user_id = %user.id(), role = %user.role(), "User created");
        Ok(user)
    }

    /// List a page of users ordered by ID
    pub async fn list(&self, request: PageRequest) -> Result<Page<User>, DomainError> {
        self.repository.page(request).await
    }

    /// Get a user by its raw identifier; malformed identifiers are not found
    pub async fn show(&self, id: &str) -> Result<User, DomainError> {
        let user_id = parse_id(id)?;

        self.repository
            .get(user_id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Look up a user by typed identifier
    pub async fn find(&self, id: UserId) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }

    /// Apply a partial update from a raw JSON body. The user must exist before
    /// the body is validated, and nothing is written unless every supplied
    /// field is valid.
    pub async fn update(&self, id: &str, body: Map<String, Value>) -> Result<User, DomainError> {
        let user = self.show(id).await?;

        let changes = UpdateUserRequest::from_json(&body).map_err(DomainError::Validation)?;

        if changes.is_empty() {
            debug!(user_id = %user.id(), "Update with no fields, nothing to change");
            return Ok(user);
        }

        let updated = self
            .repository
            .update(user.id(), &changes)
            .await
            .map_err(conflict_to_validation)?;

        info!(user_id = %updated.id(), "User updated");
        Ok(updated)
    }

    /// Permanently delete a user
    pub async fn destroy(&self, id: &str) -> Result<(), DomainError> {
        let user_id = parse_id(id)?;

        if !self.repository.delete(user_id).await? {
            return Err(not_found(id));
        }

        info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    /// Compute role totals and the newest users
    pub async fn stats(&self) -> Result<UserStats, DomainError> {
        self.repository.stats(RECENT_USERS_LIMIT).await
    }

    /// Check that the store is reachable
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }
}

fn parse_id(id: &str) -> Result<UserId, DomainError> {
    id.parse::<UserId>().map_err(|_| not_found(id))
}

fn not_found(id: &str) -> DomainError {
    DomainError::not_found(format!("User {} not found", id))
}

/// Store-level uniqueness violations surface as field validation errors
fn conflict_to_validation(error: DomainError) -> DomainError {
    match error {
        DomainError::Conflict { field, message } => DomainError::validation(field, message),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{MockUserRepository, EMAIL_TAKEN, ROLE_INVALID};
    use crate::infrastructure::user::password::Argon2Hasher;
    use crate::infrastructure::user::repository::InMemoryUserRepository;

    /// Reversible hasher for tests
    #[derive(Debug)]
    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<String, DomainError> {
            Ok(format!("plain:{}", password))
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            hash == format!("plain:{}", password)
        }
    }

    type Service = UserService<InMemoryUserRepository, PlainHasher>;

    fn create_service() -> Service {
        let repository = Arc::new(InMemoryUserRepository::new());
        UserService::new(repository, Arc::new(PlainHasher))
    }

    fn make_request(name: &str, email: &str, role: UserRole) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: "secure_password123".to_string(),
            role,
        }
    }

    async fn service_with_users(count: usize) -> Service {
        let service = create_service();
        for i in 1..=count {
            let role = if i % 3 == 0 {
                UserRole::Admin
            } else {
                UserRole::Client
            };
            service
                .create(make_request(
                    &format!("User {}", i),
                    &format!("user{}@example.com", i),
                    role,
                ))
                .await
                .unwrap();
        }
        service
    }

    fn update(name: Option<&str>, email: Option<&str>, role: Option<&str>) -> Map<String, Value> {
        let request = UpdateUserRequest {
            name: name.map(String::from),
            email: email.map(String::from),
            role: role.map(String::from),
        };

        match serde_json::to_value(request).unwrap() {
            Value::Object(body) => body,
            other => panic!("expected an object, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let service = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2Hasher::new()),
        );

        let user = service
            .create(make_request("Ada", "ada@example.com", UserRole::Admin))
            .await
            .unwrap();

        assert_ne!(user.password_hash(), "secure_password123");
        assert!(Argon2Hasher::new().verify("secure_password123", user.password_hash()));
    }

    #[tokio::test]
    async fn test_show_returns_matching_user() {
        let service = service_with_users(3).await;

        for id in 1..=3u64 {
            let user = service.show(&id.to_string()).await.unwrap();
            assert_eq!(user.id(), UserId::new(id));
        }
    }

    #[tokio::test]
    async fn test_invalid_ids_are_not_found() {
        let service = service_with_users(2).await;

        for id in ["99", "abc", "", "-1", "1.5", "18446744073709551616"] {
            assert!(matches!(
                service.show(id).await,
                Err(DomainError::NotFound { .. })
            ));
            assert!(matches!(
                service.update(id, update(Some("X"), None, None)).await,
                Err(DomainError::NotFound { .. })
            ));
            assert!(matches!(
                service.destroy(id).await,
                Err(DomainError::NotFound { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let service = service_with_users(1).await;
        let before = service.show("1").await.unwrap();

        let after = service
            .update("1", update(Some("X"), None, None))
            .await
            .unwrap();

        assert_eq!(after.name(), "X");
        assert_eq!(after.email(), before.email());
        assert_eq!(after.role(), before.role());
        assert_eq!(after.created_at(), before.created_at());
    }

    #[tokio::test]
    async fn test_update_email_taken_by_other_user() {
        let service = service_with_users(2).await;

        let result = service
            .update("1", update(None, Some("user2@example.com"), None))
            .await;

        match result {
            Err(DomainError::Validation(errors)) => {
                assert_eq!(errors.get("email"), Some(&[EMAIL_TAKEN.to_string()][..]));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let unchanged = service.show("1").await.unwrap();
        assert_eq!(unchanged.email(), "user1@example.com");
    }

    #[tokio::test]
    async fn test_update_with_own_email_succeeds() {
        let service = service_with_users(2).await;

        let user = service
            .update("1", update(Some("Renamed"), Some("user1@example.com"), None))
            .await
            .unwrap();

        assert_eq!(user.name(), "Renamed");
    }

    #[tokio::test]
    async fn test_update_invalid_role_fails_without_side_effects() {
        let service = service_with_users(1).await;

        let result = service
            .update("1", update(Some("Changed"), None, Some("superuser")))
            .await;

        match result {
            Err(DomainError::Validation(errors)) => {
                assert_eq!(errors.get("role"), Some(&[ROLE_INVALID.to_string()][..]));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        assert_eq!(service.show("1").await.unwrap().name(), "User 1");
    }

    #[tokio::test]
    async fn test_update_role() {
        let service = service_with_users(1).await;

        let user = service
            .update("1", update(None, None, Some("admin")))
            .await
            .unwrap();

        assert_eq!(user.role(), UserRole::Admin);
    }

    #[tokio::test]
    async fn test_destroy_then_show_is_not_found() {
        let service = service_with_users(2).await;

        service.destroy("2").await.unwrap();

        assert!(matches!(
            service.show("2").await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            service.destroy("2").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_twelve_users() {
        let service = service_with_users(12).await;

        let page = service.list(PageRequest::page(1)).await.unwrap();

        assert_eq!(page.data.len(), 10);
        assert_eq!(page.total, 12);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.per_page, 10);
    }

    #[tokio::test]
    async fn test_stats_are_consistent() {
        for count in [0, 1, 4, 5, 9] {
            let service = service_with_users(count).await;

            let stats = service.stats().await.unwrap();

            assert_eq!(stats.total_users, count);
            assert_eq!(stats.total_users, stats.admin_users + stats.client_users);
            assert_eq!(stats.recent_users.len(), count.min(5));
            assert!(stats.is_consistent());
            assert!(stats
                .recent_users
                .windows(2)
                .all(|w| w[0].created_at() >= w[1].created_at()));
        }
    }

    #[tokio::test]
    async fn test_stats_role_counts() {
        let service = service_with_users(6).await;

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.admin_users, 2);
        assert_eq!(stats.client_users, 4);
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_get()
            .returning(|_| Err(DomainError::storage("connection reset")));

        let service = UserService::new(Arc::new(repository), Arc::new(PlainHasher));

        assert!(matches!(
            service.show("1").await,
            Err(DomainError::Storage { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_validation_never_writes() {
        let mut repository = MockUserRepository::new();
        repository.expect_get().returning(|id| {
            Ok(Some(User::from_parts(
                id,
                NewUser::new("Ada", "ada@example.com", UserRole::Client, "hash"),
                chrono::Utc::now(),
            )))
        });
        repository.expect_update().never();

        let service = UserService::new(Arc::new(repository), Arc::new(PlainHasher));

        let result = service.update("1", update(None, Some("nope"), None)).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_wrong_types_are_field_errors() {
        let service = service_with_users(1).await;

        let body = match serde_json::json!({ "name": 123, "role": 5 }) {
            Value::Object(body) => body,
            other => panic!("expected an object, got {}", other),
        };

        match service.update("1", body).await {
            Err(DomainError::Validation(errors)) => {
                assert!(errors.contains("name"));
                assert_eq!(errors.get("role"), Some(&[ROLE_INVALID.to_string()][..]));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        assert_eq!(service.show("1").await.unwrap().name(), "User 1");
    }

    #[tokio::test]
    async fn test_missing_user_wins_over_invalid_body() {
        let service = service_with_users(1).await;

        let body = match serde_json::json!({ "name": 123 }) {
            Value::Object(body) => body,
            other => panic!("expected an object, got {}", other),
        };

        assert!(matches!(
            service.update("99", body).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    /// Yields after every lookup so concurrent updates interleave between
    /// the existence check and the write
    #[derive(Debug)]
    struct InterleavingRepository {
        inner: InMemoryUserRepository,
    }

    #[async_trait::async_trait]
    impl UserRepository for InterleavingRepository {
        async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
            let user = self.inner.get(id).await;
            tokio::task::yield_now().await;
            user
        }

        async fn create(&self, user: NewUser) -> Result<User, DomainError> {
            self.inner.create(user).await
        }

        async fn update(
            &self,
            id: UserId,
            changes: &crate::domain::UserChanges,
        ) -> Result<User, DomainError> {
            self.inner.update(id, changes).await
        }

        async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
            self.inner.delete(id).await
        }

        async fn page(&self, request: PageRequest) -> Result<Page<User>, DomainError> {
            self.inner.page(request).await
        }

        async fn count(&self, role: Option<UserRole>) -> Result<usize, DomainError> {
            self.inner.count(role).await
        }

        async fn stats(&self, recent_limit: usize) -> Result<UserStats, DomainError> {
            self.inner.stats(recent_limit).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_partial_updates_keep_both_fields() {
        let repository = Arc::new(InterleavingRepository {
            inner: InMemoryUserRepository::new(),
        });
        let service = UserService::new(repository, Arc::new(PlainHasher));
        service
            .create(make_request("Old", "old@example.com", UserRole::Client))
            .await
            .unwrap();

        let (renamed, promoted) = tokio::join!(
            service.update("1", update(Some("New"), None, None)),
            service.update("1", update(None, None, Some("admin"))),
        );
        renamed.unwrap();
        promoted.unwrap();

        let user = service.show("1").await.unwrap();
        assert_eq!(user.name(), "New");
        assert_eq!(user.role(), UserRole::Admin);
        assert_eq!(user.email(), "old@example.com");
    }
}

//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{
    NewUser, User, UserChanges, UserId, UserRepository, UserRole, UserStats, EMAIL_TAKEN,
};
use crate::domain::{DomainError, Page, PageRequest};

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<UserId, User>,
    /// Index for email -> user ID lookup
    email_index: HashMap<String, UserId>,
    /// Last identifier handed out; identifiers are never reused
    last_id: u64,
}

/// In-memory implementation of UserRepository
///
/// All records live behind one lock so uniqueness checks and writes happen
/// atomically.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let store = self.store.read().await;
        Ok(store.users.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut store = self.store.write().await;

        if store.email_index.contains_key(&user.email) {
            return Err(DomainError::conflict("email", EMAIL_TAKEN));
        }

        store.last_id += 1;
        let id = UserId::new(store.last_id);
        let updated_at = user.created_at;
        let user = User::from_parts(id, user, updated_at);

        store.email_index.insert(user.email().to_string(), id);
        store.users.insert(id, user.clone());

        Ok(user)
    }

    async fn update(&self, id: UserId, changes: &UserChanges) -> Result<User, DomainError> {
        let mut store = self.store.write().await;

        let old_email = match store.users.get(&id) {
            Some(existing) => existing.email().to_string(),
            None => return Err(not_found(id)),
        };

        if let Some(email) = changes.email.as_deref() {
            if email != old_email {
                if store.email_index.contains_key(email) {
                    return Err(DomainError::conflict("email", EMAIL_TAKEN));
                }

                store.email_index.remove(&old_email);
                store.email_index.insert(email.to_string(), id);
            }
        }

        match store.users.get_mut(&id) {
            Some(user) => {
                user.apply(changes);
                Ok(user.clone())
            }
            None => Err(not_found(id)),
        }
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        let mut store = self.store.write().await;

        if let Some(user) = store.users.remove(&id) {
            store.email_index.remove(user.email());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn page(&self, request: PageRequest) -> Result<Page<User>, DomainError> {
        let store = self.store.read().await;

        let data = store
            .users
            .values()
            .skip(request.offset())
            .take(request.per_page())
            .cloned()
            .collect();

        Ok(Page::new(data, store.users.len(), request))
    }

    async fn count(&self, role: Option<UserRole>) -> Result<usize, DomainError> {
        let store = self.store.read().await;

        let count = store
            .users
            .values()
            .filter(|u| role.is_none_or(|r| u.role() == r))
            .count();

        Ok(count)
    }

    async fn stats(&self, recent_limit: usize) -> Result<UserStats, DomainError> {
        let store = self.store.read().await;

        let admin_users = store
            .users
            .values()
            .filter(|u| u.role() == UserRole::Admin)
            .count();
        let client_users = store.users.len() - admin_users;

        let mut recent: Vec<&User> = store.users.values().collect();
        // Newest first; equal timestamps fall back to the later insertion
        recent.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });

        Ok(UserStats {
            total_users: store.users.len(),
            admin_users,
            client_users,
            recent_users: recent.into_iter().take(recent_limit).cloned().collect(),
        })
    }
}

fn not_found(id: UserId) -> DomainError {
    DomainError::not_found(format!("User {} not found", id))
}

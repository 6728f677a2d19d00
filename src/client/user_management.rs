//! User management view-model: table, inline edit and two-step delete

use std::sync::Arc;

use tracing::{info, warn};

use super::api::UserApi;
use super::dashboard::Route;
use super::format::{render_table, RoleBadge};
use crate::domain::{UpdateUserRequest, User, UserId};

pub const UPDATED_NOTICE: &str = "User updated successfully";
pub const DELETED_NOTICE: &str = "User deleted successfully";

/// Editable fields of the form buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Role,
}

/// Form buffer, prefilled from the selected user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl UserForm {
    fn from_user(user: &User) -> Self {
        Self {
            name: user.name().to_string(),
            email: user.email().to_string(),
            role: user.role().as_str().to_string(),
        }
    }

    /// The whole buffer goes out as a partial update
    pub fn to_request(&self) -> UpdateUserRequest {
        UpdateUserRequest {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub user_id: UserId,
    pub form: UserForm,
}

/// At most one row awaits a second confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteConfirmation {
    #[default]
    Idle,
    ArmedFor(UserId),
}

/// Operator-facing message after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[derive(Debug)]
pub struct UserManagement {
    api: Arc<dyn UserApi>,
    loading: bool,
    users: Vec<User>,
    error: Option<String>,
    editing: Option<EditSession>,
    delete: DeleteConfirmation,
    notice: Option<Notice>,
}

impl UserManagement {
    pub fn new(api: Arc<dyn UserApi>) -> Self {
        Self {
            api,
            loading: true,
            users: Vec::new(),
            error: None,
            editing: None,
            delete: DeleteConfirmation::Idle,
            notice: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn delete_confirmation(&self) -> DeleteConfirmation {
        self.delete
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn back_route() -> Route {
        Route::Dashboard
    }

    /// Load the first page of users
    pub async fn mount(&mut self) {
        self.mount_page(1).await;
    }

    pub async fn mount_page(&mut self, page: usize) {
        self.loading = true;
        self.error = None;

        match self.api.list_users(page).await {
            Ok(page) => self.users = page.data,
            Err(e) => {
                warn!(error = %e, "Failed to fetch users");
                self.error = Some(e.to_string());
            }
        }

        self.loading = false;
    }

    /// Open the edit form for a listed user, replacing any open one
    pub fn begin_edit(&mut self, id: UserId) -> bool {
        match self.users.iter().find(|user| user.id() == id) {
            Some(user) => {
                self.editing = Some(EditSession {
                    user_id: id,
                    form: UserForm::from_user(user),
                });
                true
            }
            None => false,
        }
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        if let Some(session) = self.editing.as_mut() {
            let value = value.into();
            match field {
                FormField::Name => session.form.name = value,
                FormField::Email => session.form.email = value,
                FormField::Role => session.form.role = value,
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Send the form. Failures leave the list and the open form untouched.
    pub async fn submit_edit(&mut self) {
        let Some(session) = self.editing.clone() else {
            return;
        };

        let request = session.form.to_request();

        let changes = match request.check() {
            Ok(changes) => changes,
            Err(fields) => {
                self.notice = Some(Notice::Error(format!("Error updating user: {}", fields)));
                return;
            }
        };

        match self.api.update_user(session.user_id, &request).await {
            Ok(_) => {
                if let Some(user) = self.users.iter_mut().find(|u| u.id() == session.user_id) {
                    user.apply(&changes);
                }
                self.editing = None;
                self.notice = Some(Notice::Success(UPDATED_NOTICE.to_string()));
                info!(user_id = %session.user_id, "User updated");
            }
            Err(e) => {
                self.notice = Some(Notice::Error(format!("Error updating user: {}", e.describe())));
            }
        }
    }

    /// Arm the delete confirmation for one row
    pub fn request_delete(&mut self, id: UserId) {
        self.delete = DeleteConfirmation::ArmedFor(id);
    }

    pub fn cancel_delete(&mut self) {
        self.delete = DeleteConfirmation::Idle;
    }

    /// Delete only when `id` is the armed row; any other id just disarms
    pub async fn confirm_delete(&mut self, id: UserId) {
        if self.delete != DeleteConfirmation::ArmedFor(id) {
            self.delete = DeleteConfirmation::Idle;
            return;
        }

        match self.api.delete_user(id).await {
            Ok(()) => {
                self.users.retain(|user| user.id() != id);
                self.delete = DeleteConfirmation::Idle;
                self.notice = Some(Notice::Success(DELETED_NOTICE.to_string()));
                info!(user_id = %id, "User deleted");
            }
            Err(e) => {
                self.notice = Some(Notice::Error(format!("Error deleting user: {}", e.describe())));
            }
        }
    }

    /// Plain-text rendering for the terminal
    pub fn render(&self) -> String {
        if self.loading {
            return "Loading users...".to_string();
        }

        if let Some(error) = &self.error {
            return format!("Error loading users: {}", error);
        }

        let rows: Vec<Vec<String>> = self
            .users
            .iter()
            .map(|user| {
                let actions = if self.delete == DeleteConfirmation::ArmedFor(user.id()) {
                    "Edit  Confirm  Cancel"
                } else {
                    "Edit  Delete"
                };

                vec![
                    user.id().to_string(),
                    user.name().to_string(),
                    user.email().to_string(),
                    RoleBadge::for_role(user.role()).label.to_string(),
                    actions.to_string(),
                ]
            })
            .collect();

        let mut out = format!(
            "User List  Total: {}\n{}",
            self.users.len(),
            render_table(&["ID", "Name", "Email", "Role", "Actions"], &rows)
        );

        if let Some(session) = &self.editing {
            out.push_str(&format!(
                "\n\nEdit User {}\nName:  {}\nEmail: {}\nRole:  {}",
                session.user_id, session.form.name, session.form.email, session.form.role
            ));
        }

        if let Some(notice) = &self.notice {
            out.push_str(&format!("\n\n{}", notice.message()));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api::MockUserApi;
    use crate::client::error::ClientError;
    use crate::domain::{FieldErrors, NewUser, Page, PageRequest, UserRole};
    use chrono::Utc;
    use mockall::predicate::eq;

    fn user(id: u64, name: &str, role: UserRole) -> User {
        User::from_parts(
            UserId::new(id),
            NewUser::new(name, format!("user{}@example.com", id), role, ""),
            Utc::now(),
        )
    }

    fn listing() -> Vec<User> {
        vec![
            user(7, "Seven", UserRole::Client),
            user(8, "Eight", UserRole::Admin),
            user(9, "Nine", UserRole::Client),
        ]
    }

    fn api_listing(users: Vec<User>) -> MockUserApi {
        let mut api = MockUserApi::new();
        api.expect_list_users()
            .with(eq(1))
            .times(1)
            .returning(move |_| Ok(Page::from_ordered(users.clone(), PageRequest::page(1))));
        api
    }

    async fn mounted(api: MockUserApi) -> UserManagement {
        let mut view = UserManagement::new(Arc::new(api));
        view.mount().await;
        view
    }

    fn ids(view: &UserManagement) -> Vec<u64> {
        view.users().iter().map(|u| u.id().value()).collect()
    }

    #[tokio::test]
    async fn test_mount_loads_users() {
        let view = mounted(api_listing(listing())).await;

        assert!(!view.is_loading());
        assert_eq!(ids(&view), vec![7, 8, 9]);
        assert!(view.render().contains("Total: 3"));
    }

    #[tokio::test]
    async fn test_mount_failure_sets_error() {
        let mut api = MockUserApi::new();
        api.expect_list_users()
            .returning(|_| Err(ClientError::Network("connection refused".to_string())));

        let view = mounted(api).await;

        assert!(view.users().is_empty());
        assert_eq!(view.error(), Some("Network error: connection refused"));
        assert!(view.render().starts_with("Error loading users"));
    }

    #[tokio::test]
    async fn test_mount_with_no_users() {
        let view = mounted(api_listing(vec![])).await;

        assert!(view.users().is_empty());
        assert!(view.error().is_none());
    }

    #[tokio::test]
    async fn test_confirming_other_id_disarms_without_deleting() {
        let mut api = api_listing(listing());
        api.expect_delete_user().never();

        let mut view = mounted(api).await;

        view.request_delete(UserId::new(7));
        assert_eq!(
            view.delete_confirmation(),
            DeleteConfirmation::ArmedFor(UserId::new(7))
        );

        view.confirm_delete(UserId::new(9)).await;

        assert_eq!(view.delete_confirmation(), DeleteConfirmation::Idle);
        assert_eq!(ids(&view), vec![7, 8, 9]);
        assert!(view.notice().is_none());
    }

    #[tokio::test]
    async fn test_rearming_moves_confirmation_to_new_row() {
        let mut api = api_listing(listing());
        api.expect_delete_user()
            .with(eq(UserId::new(9)))
            .times(1)
            .returning(|_| Ok(()));

        let mut view = mounted(api).await;

        view.request_delete(UserId::new(7));
        view.request_delete(UserId::new(9));
        view.confirm_delete(UserId::new(9)).await;

        assert_eq!(ids(&view), vec![7, 8]);
        assert_eq!(view.delete_confirmation(), DeleteConfirmation::Idle);
    }

    #[tokio::test]
    async fn test_confirm_armed_id_deletes() {
        let mut api = api_listing(listing());
        api.expect_delete_user()
            .with(eq(UserId::new(7)))
            .times(1)
            .returning(|_| Ok(()));

        let mut view = mounted(api).await;

        view.request_delete(UserId::new(7));
        view.confirm_delete(UserId::new(7)).await;

        assert_eq!(ids(&view), vec![8, 9]);
        assert_eq!(view.delete_confirmation(), DeleteConfirmation::Idle);
        assert_eq!(
            view.notice(),
            Some(&Notice::Success(DELETED_NOTICE.to_string()))
        );
    }

    #[tokio::test]
    async fn test_request_replaces_armed_row_and_cancel_disarms() {
        let mut view = mounted(api_listing(listing())).await;

        view.request_delete(UserId::new(7));
        view.request_delete(UserId::new(8));
        assert_eq!(
            view.delete_confirmation(),
            DeleteConfirmation::ArmedFor(UserId::new(8))
        );
        assert!(view.render().contains("Edit  Confirm  Cancel"));

        view.cancel_delete();
        assert_eq!(view.delete_confirmation(), DeleteConfirmation::Idle);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_row_and_arm() {
        let mut api = api_listing(listing());
        api.expect_delete_user()
            .returning(|_| Err(ClientError::status(404, "User 7 not found")));

        let mut view = mounted(api).await;

        view.request_delete(UserId::new(7));
        view.confirm_delete(UserId::new(7)).await;

        assert_eq!(ids(&view), vec![7, 8, 9]);
        assert_eq!(
            view.delete_confirmation(),
            DeleteConfirmation::ArmedFor(UserId::new(7))
        );
        assert_eq!(
            view.notice(),
            Some(&Notice::Error("Error deleting user: User 7 not found".to_string()))
        );
    }

    #[tokio::test]
    async fn test_begin_edit_prefills_form() {
        let mut view = mounted(api_listing(listing())).await;

        assert!(view.begin_edit(UserId::new(8)));
        assert_eq!(
            view.editing().unwrap().form,
            UserForm {
                name: "Eight".to_string(),
                email: "user8@example.com".to_string(),
                role: "admin".to_string(),
            }
        );

        assert!(view.begin_edit(UserId::new(9)));
        assert_eq!(view.editing().unwrap().user_id, UserId::new(9));

        assert!(!view.begin_edit(UserId::new(99)));
        assert_eq!(view.editing().unwrap().user_id, UserId::new(9));

        view.cancel_edit();
        assert!(view.editing().is_none());
    }

    #[tokio::test]
    async fn test_rejected_submit_leaves_state_untouched() {
        let mut api = api_listing(listing());
        api.expect_update_user().times(1).returning(|_, _| {
            Err(ClientError::Status {
                status: 422,
                message: "The email has already been taken.".to_string(),
                fields: FieldErrors::single("email", "The email has already been taken."),
            })
        });

        let mut view = mounted(api).await;
        let before = view.users().to_vec();

        view.begin_edit(UserId::new(7));
        view.set_field(FormField::Email, "user9@example.com");
        view.submit_edit().await;

        assert_eq!(view.users(), &before[..]);
        let session = view.editing().unwrap();
        assert_eq!(session.user_id, UserId::new(7));
        assert_eq!(session.form.email, "user9@example.com");

        let notice = view.notice().unwrap();
        assert!(notice.is_error());
        assert!(notice.message().contains("The email has already been taken."));
        assert!(notice.message().contains("email:"));
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        let mut api = api_listing(listing());
        api.expect_update_user().never();

        let mut view = mounted(api).await;

        view.begin_edit(UserId::new(7));
        view.set_field(FormField::Role, "superuser");
        view.submit_edit().await;

        assert!(view.editing().is_some());
        assert!(view.notice().unwrap().message().contains("role"));
    }

    #[tokio::test]
    async fn test_successful_submit_merges_fields() {
        let mut api = api_listing(listing());
        api.expect_update_user()
            .withf(|id, request| {
                *id == UserId::new(7)
                    && request.name.as_deref() == Some("Renamed")
                    && request.email.as_deref() == Some("user7@example.com")
                    && request.role.as_deref() == Some("admin")
            })
            .times(1)
            .returning(|id, _| {
                Ok(User::from_parts(
                    id,
                    NewUser::new("Renamed", "user7@example.com", UserRole::Admin, ""),
                    Utc::now(),
                ))
            });

        let mut view = mounted(api).await;

        view.begin_edit(UserId::new(7));
        view.set_field(FormField::Name, "Renamed");
        view.set_field(FormField::Role, "admin");
        view.submit_edit().await;

        let edited = &view.users()[0];
        assert_eq!(edited.name(), "Renamed");
        assert_eq!(edited.role(), UserRole::Admin);
        assert!(view.editing().is_none());
        assert_eq!(
            view.notice(),
            Some(&Notice::Success(UPDATED_NOTICE.to_string()))
        );
    }

    #[test]
    fn test_back_route() {
        assert_eq!(UserManagement::back_route().path(), "/admin/dashboard");
    }
}

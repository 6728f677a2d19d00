//! Admin client: HTTP access to the user API and the headless views built on it

pub mod api;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod session;
pub mod user_management;

pub use api::{HttpUserApi, UserApi};
pub use dashboard::{AdminDashboard, DashboardState, DashboardView, Route};
pub use error::ClientError;
pub use session::Session;
pub use user_management::{DeleteConfirmation, EditSession, FormField, Notice, UserManagement};

//! Admin dashboard view-model

use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use super::api::UserApi;
use super::error::ClientError;
use super::format::{format_join_date, render_table, RoleBadge};
use super::session::Session;
use crate::domain::UserStats;

/// Screens the admin client can navigate between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    UserManagement,
    LoginRegister,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Dashboard => "/admin/dashboard",
            Self::UserManagement => "/admin/users",
            Self::LoginRegister => "/login-register",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Loading,
    Loaded(UserStats),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub label: &'static str,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsPanel {
    /// Three placeholder cards while loading
    Skeleton,
    Error(String),
    Cards([StatCard; 3]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentUserRow {
    pub name: String,
    pub email: String,
    pub role: RoleBadge,
    pub joined: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub route: Route,
}

/// Everything the dashboard shows for its current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub welcome: String,
    pub stats: StatsPanel,
    /// Empty unless stats are loaded and some users exist
    pub recent_users: Vec<RecentUserRow>,
    pub links: Vec<NavLink>,
}

#[derive(Debug)]
pub struct AdminDashboard {
    api: Arc<dyn UserApi>,
    session: Arc<Session>,
    state: DashboardState,
}

impl AdminDashboard {
    pub fn new(api: Arc<dyn UserApi>, session: Arc<Session>) -> Self {
        Self {
            api,
            session,
            state: DashboardState::Loading,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Fetch the statistics once
    pub async fn mount(&mut self) {
        self.state = match self.api.user_stats().await {
            Ok(stats) => DashboardState::Loaded(stats),
            Err(e) => {
                warn!(error = %e, "Failed to fetch dashboard stats");
                DashboardState::Failed(e.to_string())
            }
        };
    }

    /// End the session on the server, then locally. On failure the session
    /// is left as it was.
    pub async fn logout(&mut self) -> Result<Route, ClientError> {
        self.api.logout().await?;
        self.session.end();

        info!("Logged out");
        Ok(Route::LoginRegister)
    }

    pub fn links() -> Vec<NavLink> {
        vec![NavLink {
            label: "Manage Users",
            route: Route::UserManagement,
        }]
    }

    pub fn view(&self) -> DashboardView {
        let welcome = match self.session.identity() {
            Some(user) => format!("Welcome, {}", user.name()),
            None => "Welcome".to_string(),
        };

        let (stats, recent_users) = match &self.state {
            DashboardState::Loading => (StatsPanel::Skeleton, Vec::new()),
            DashboardState::Failed(message) => (StatsPanel::Error(message.clone()), Vec::new()),
            DashboardState::Loaded(stats) => (
                StatsPanel::Cards([
                    StatCard {
                        label: "Total Users",
                        value: stats.total_users,
                    },
                    StatCard {
                        label: "Admin Users",
                        value: stats.admin_users,
                    },
                    StatCard {
                        label: "Client Users",
                        value: stats.client_users,
                    },
                ]),
                stats
                    .recent_users
                    .iter()
                    .map(|user| RecentUserRow {
                        name: user.name().to_string(),
                        email: user.email().to_string(),
                        role: RoleBadge::for_role(user.role()),
                        joined: format_join_date(user.created_at(), &Local),
                    })
                    .collect(),
            ),
        };

        DashboardView {
            welcome,
            stats,
            recent_users,
            links: Self::links(),
        }
    }

    /// Plain-text rendering for the terminal
    pub fn render(&self) -> String {
        let view = self.view();
        let mut sections = vec![format!("Admin Dashboard  {}", view.welcome)];

        sections.push(match &view.stats {
            StatsPanel::Skeleton => ["...", "...", "..."].join("  "),
            StatsPanel::Error(message) => format!("Error loading stats: {}", message),
            StatsPanel::Cards(cards) => cards
                .iter()
                .map(|card| format!("{}: {}", card.label, card.value))
                .collect::<Vec<_>>()
                .join("  "),
        });

        if !view.recent_users.is_empty() {
            let rows: Vec<Vec<String>> = view
                .recent_users
                .iter()
                .map(|row| {
                    vec![
                        row.name.clone(),
                        row.email.clone(),
                        row.role.label.to_string(),
                        row.joined.clone(),
                    ]
                })
                .collect();

            sections.push(format!(
                "Recent Users\n{}",
                render_table(&["Name", "Email", "Role", "Joined"], &rows)
            ));
        }

        sections.push(
            view.links
                .iter()
                .map(|link| format!("{} -> {}", link.label, link.route.path()))
                .collect::<Vec<_>>()
                .join("\n"),
        );

        sections.join("\n\n")
    }
}

//! Aggregate user statistics

use serde::{Deserialize, Serialize};

use super::entity::User;

/// Number of recently created users included in the statistics
pub const RECENT_USERS_LIMIT: usize = 5;

/// Totals by role plus the newest accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: usize,
    pub admin_users: usize,
    pub client_users: usize,
    pub recent_users: Vec<User>,
}

impl UserStats {
    /// Roles are exhaustive and exclusive, so the per-role counts add up
    pub fn is_consistent(&self) -> bool {
        self.total_users == self.admin_users + self.client_users
            && self.recent_users.len() == self.total_users.min(RECENT_USERS_LIMIT)
    }
}

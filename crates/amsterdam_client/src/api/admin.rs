//! Admin endpoints. The server enforces the admin role; non-admins get a
//! 403 with an error payload.

use crate::api::client::AmsterdamClient;
use crate::api::models::{AdminStats, AdminUsers};
use crate::error::Result;

impl AmsterdamClient {
    /// GET /admin/users
    pub async fn admin_users(&self) -> Result<AdminUsers> {
        self.get_json("/admin/users").await
    }

    /// GET /admin/stats
    pub async fn admin_stats(&self) -> Result<AdminStats> {
        self.get_json("/admin/stats").await
    }
}

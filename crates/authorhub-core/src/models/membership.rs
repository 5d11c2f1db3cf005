//! User to group membership link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A (user, group) link. Both display names are carried so listings
/// can render either side without a second lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub user_id: Uuid,
    pub username: String,
    pub group_id: Uuid,
    pub group_name: String,
    pub created_at: DateTime<Utc>,
}

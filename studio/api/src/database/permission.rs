use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Studio;

/// A per-(user, studio) grant. At most one exists for each pair.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
	pub id: Uuid,
	pub user_id: Uuid,
	pub studio_id: Uuid,
	pub can_view: bool,
	pub can_control: bool,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewPermission {
	pub user_id: Uuid,
	pub studio_id: Uuid,
	pub can_view: bool,
	pub can_control: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PermissionWithStudio {
	#[serde(flatten)]
	pub permission: Permission,
	pub studio: Studio,
}

use uuid::Uuid;

use crate::database::{Database, DatabaseError, Permission, User, UserRole};

/// Effective rights of a user on one studio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
	pub can_view: bool,
	pub can_control: bool,
}

impl Grant {
	pub const FULL: Self = Self {
		can_view: true,
		can_control: true,
	};
	pub const NONE: Self = Self {
		can_view: false,
		can_control: false,
	};
}

/// Admins hold every right regardless of stored grants. Everyone else gets
/// exactly what their permission row says, or nothing without one.
///
/// Control without view is not a usable combination, so `can_control` is
/// only honoured together with `can_view`.
pub fn resolve_grant(role: UserRole, permission: Option<&Permission>) -> Grant {
	match (role, permission) {
		(UserRole::Admin, _) => Grant::FULL,
		(_, Some(p)) => Grant {
			can_view: p.can_view,
			can_control: p.can_view && p.can_control,
		},
		(_, None) => Grant::NONE,
	}
}

/// Looks up the stored grant for `user` on `studio_id` and resolves it.
pub async fn grant_for(db: &dyn Database, user: &User, studio_id: Uuid) -> Result<Grant, DatabaseError> {
	if user.is_admin() {
		return Ok(Grant::FULL);
	}

	let permission = db.permission(user.id, studio_id).await?;
	Ok(resolve_grant(user.role, permission.as_ref()))
}

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
	Database, NewPermission, NewStream, NewStudio, NewUser, Permission, Result, Stream, StreamUpdate, Studio, StudioUpdate,
	User, UserUpdate,
};

const USER_COLUMNS: &str =
	"id, username, email, password_hash, first_name, last_name, role, is_active, created_at, updated_at";
const STUDIO_COLUMNS: &str = "id, name, location, description, color_code, image_url, is_active, created_at";
const STREAM_COLUMNS: &str =
	"id, studio_id, name, description, stream_url, resolution, fps, status, is_active, created_at, updated_at";
const PERMISSION_COLUMNS: &str = "id, user_id, studio_id, can_view, can_control, created_at";

/// [`Database`] backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgDatabase {
	pool: PgPool,
}

impl PgDatabase {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &PgPool {
		&self.pool
	}

	/// Applies the embedded schema migrations.
	pub async fn migrate(&self) -> Result<()> {
		sqlx::migrate!("./migrations").run(&self.pool).await?;
		Ok(())
	}
}

#[async_trait]
impl Database for PgDatabase {
	async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
		Ok(sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
			.bind(id)
			.fetch_optional(&self.pool)
			.await?)
	}

	async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
		Ok(sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
			.bind(username)
			.fetch_optional(&self.pool)
			.await?)
	}

	async fn list_users(&self) -> Result<Vec<User>> {
		Ok(sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username"))
			.fetch_all(&self.pool)
			.await?)
	}

	async fn create_user(&self, user: NewUser) -> Result<User> {
		Ok(sqlx::query_as(&format!(
			"INSERT INTO users (id, username, email, password_hash, first_name, last_name, role, is_active) VALUES ($1, $2, \
			 $3, $4, $5, $6, $7, $8) RETURNING {USER_COLUMNS}"
		))
		.bind(Uuid::new_v4())
		.bind(user.username)
		.bind(user.email)
		.bind(user.password_hash)
		.bind(user.first_name)
		.bind(user.last_name)
		.bind(user.role)
		.bind(user.is_active)
		.fetch_one(&self.pool)
		.await?)
	}

	async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>> {
		let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = NOW()");

		if let Some(username) = update.username {
			qb.push(", username = ").push_bind(username);
		}
		if let Some(email) = update.email {
			qb.push(", email = ").push_bind(email);
		}
		if let Some(password_hash) = update.password_hash {
			qb.push(", password_hash = ").push_bind(password_hash);
		}
		if let Some(first_name) = update.first_name {
			qb.push(", first_name = ").push_bind(first_name);
		}
		if let Some(last_name) = update.last_name {
			qb.push(", last_name = ").push_bind(last_name);
		}
		if let Some(role) = update.role {
			qb.push(", role = ").push_bind(role);
		}
		if let Some(is_active) = update.is_active {
			qb.push(", is_active = ").push_bind(is_active);
		}

		qb.push(" WHERE id = ").push_bind(id);
		qb.push(format!(" RETURNING {USER_COLUMNS}"));

		Ok(qb.build_query_as().fetch_optional(&self.pool).await?)
	}

	async fn studio_by_id(&self, id: Uuid) -> Result<Option<Studio>> {
		Ok(sqlx::query_as(&format!("SELECT {STUDIO_COLUMNS} FROM studios WHERE id = $1"))
			.bind(id)
			.fetch_optional(&self.pool)
			.await?)
	}

	async fn studio_by_name(&self, name: &str) -> Result<Option<Studio>> {
		Ok(sqlx::query_as(&format!(
			"SELECT {STUDIO_COLUMNS} FROM studios WHERE name = $1 ORDER BY created_at LIMIT 1"
		))
		.bind(name)
		.fetch_optional(&self.pool)
		.await?)
	}

	async fn list_studios(&self) -> Result<Vec<Studio>> {
		Ok(sqlx::query_as(&format!("SELECT {STUDIO_COLUMNS} FROM studios ORDER BY name"))
			.fetch_all(&self.pool)
			.await?)
	}

	async fn viewable_studios(&self, user_id: Uuid) -> Result<Vec<Studio>> {
		Ok(sqlx::query_as(
			"SELECT s.id, s.name, s.location, s.description, s.color_code, s.image_url, s.is_active, s.created_at FROM \
			 studios s INNER JOIN user_studio_permissions p ON p.studio_id = s.id WHERE p.user_id = $1 AND p.can_view AND \
			 s.is_active ORDER BY s.name",
		)
		.bind(user_id)
		.fetch_all(&self.pool)
		.await?)
	}

	async fn create_studio(&self, studio: NewStudio) -> Result<Studio> {
		Ok(sqlx::query_as(&format!(
			"INSERT INTO studios (id, name, location, description, color_code, image_url, is_active) VALUES ($1, $2, $3, \
			 $4, $5, $6, $7) RETURNING {STUDIO_COLUMNS}"
		))
		.bind(Uuid::new_v4())
		.bind(studio.name)
		.bind(studio.location)
		.bind(studio.description)
		.bind(studio.color_code)
		.bind(studio.image_url)
		.bind(studio.is_active)
		.fetch_one(&self.pool)
		.await?)
	}

	async fn update_studio(&self, id: Uuid, update: StudioUpdate) -> Result<Option<Studio>> {
		if update.is_empty() {
			return self.studio_by_id(id).await;
		}

		let mut qb = QueryBuilder::<Postgres>::new("UPDATE studios SET ");
		let mut set = qb.separated(", ");

		if let Some(name) = update.name {
			set.push("name = ").push_bind_unseparated(name);
		}
		if let Some(location) = update.location {
			set.push("location = ").push_bind_unseparated(location);
		}
		if let Some(description) = update.description {
			set.push("description = ").push_bind_unseparated(description);
		}
		if let Some(color_code) = update.color_code {
			set.push("color_code = ").push_bind_unseparated(color_code);
		}
		if let Some(image_url) = update.image_url {
			set.push("image_url = ").push_bind_unseparated(image_url);
		}
		if let Some(is_active) = update.is_active {
			set.push("is_active = ").push_bind_unseparated(is_active);
		}

		qb.push(" WHERE id = ").push_bind(id);
		qb.push(format!(" RETURNING {STUDIO_COLUMNS}"));

		Ok(qb.build_query_as().fetch_optional(&self.pool).await?)
	}

	async fn stream_by_id(&self, id: Uuid) -> Result<Option<Stream>> {
		Ok(sqlx::query_as(&format!("SELECT {STREAM_COLUMNS} FROM streams WHERE id = $1"))
			.bind(id)
			.fetch_optional(&self.pool)
			.await?)
	}

	async fn streams_by_studios(&self, studio_ids: &[Uuid], active_only: bool) -> Result<Vec<Stream>> {
		Ok(sqlx::query_as(&format!(
			"SELECT {STREAM_COLUMNS} FROM streams WHERE studio_id = ANY($1) AND (is_active OR NOT $2) ORDER BY name"
		))
		.bind(studio_ids)
		.bind(active_only)
		.fetch_all(&self.pool)
		.await?)
	}

	async fn list_streams(&self) -> Result<Vec<Stream>> {
		Ok(sqlx::query_as(&format!("SELECT {STREAM_COLUMNS} FROM streams ORDER BY name"))
			.fetch_all(&self.pool)
			.await?)
	}

	async fn create_stream(&self, stream: NewStream) -> Result<Stream> {
		Ok(sqlx::query_as(&format!(
			"INSERT INTO streams (id, studio_id, name, description, stream_url, resolution, fps, status, is_active) VALUES \
			 ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {STREAM_COLUMNS}"
		))
		.bind(Uuid::new_v4())
		.bind(stream.studio_id)
		.bind(stream.name)
		.bind(stream.description)
		.bind(stream.stream_url)
		.bind(stream.resolution)
		.bind(stream.fps)
		.bind(stream.status)
		.bind(stream.is_active)
		.fetch_one(&self.pool)
		.await?)
	}

	async fn update_stream(&self, id: Uuid, update: StreamUpdate) -> Result<Option<Stream>> {
		let mut qb = QueryBuilder::<Postgres>::new("UPDATE streams SET updated_at = NOW()");

		if let Some(studio_id) = update.studio_id {
			qb.push(", studio_id = ").push_bind(studio_id);
		}
		if let Some(name) = update.name {
			qb.push(", name = ").push_bind(name);
		}
		if let Some(description) = update.description {
			qb.push(", description = ").push_bind(description);
		}
		if let Some(stream_url) = update.stream_url {
			qb.push(", stream_url = ").push_bind(stream_url);
		}
		if let Some(resolution) = update.resolution {
			qb.push(", resolution = ").push_bind(resolution);
		}
		if let Some(fps) = update.fps {
			qb.push(", fps = ").push_bind(fps);
		}
		if let Some(status) = update.status {
			qb.push(", status = ").push_bind(status);
		}
		if let Some(is_active) = update.is_active {
			qb.push(", is_active = ").push_bind(is_active);
		}

		qb.push(" WHERE id = ").push_bind(id);
		qb.push(format!(" RETURNING {STREAM_COLUMNS}"));

		Ok(qb.build_query_as().fetch_optional(&self.pool).await?)
	}

	async fn permission(&self, user_id: Uuid, studio_id: Uuid) -> Result<Option<Permission>> {
		Ok(sqlx::query_as(&format!(
			"SELECT {PERMISSION_COLUMNS} FROM user_studio_permissions WHERE user_id = $1 AND studio_id = $2"
		))
		.bind(user_id)
		.bind(studio_id)
		.fetch_optional(&self.pool)
		.await?)
	}

	async fn permissions_by_user(&self, user_id: Uuid) -> Result<Vec<Permission>> {
		Ok(sqlx::query_as(&format!(
			"SELECT {PERMISSION_COLUMNS} FROM user_studio_permissions WHERE user_id = $1 ORDER BY created_at"
		))
		.bind(user_id)
		.fetch_all(&self.pool)
		.await?)
	}

	async fn upsert_permission(&self, permission: NewPermission) -> Result<Permission> {
		Ok(sqlx::query_as(&format!(
			"INSERT INTO user_studio_permissions (id, user_id, studio_id, can_view, can_control) VALUES ($1, $2, $3, $4, \
			 $5) ON CONFLICT (user_id, studio_id) DO UPDATE SET can_view = EXCLUDED.can_view, can_control = \
			 EXCLUDED.can_control RETURNING {PERMISSION_COLUMNS}"
		))
		.bind(Uuid::new_v4())
		.bind(permission.user_id)
		.bind(permission.studio_id)
		.bind(permission.can_view)
		.bind(permission.can_control)
		.fetch_one(&self.pool)
		.await?)
	}

	async fn delete_permission(&self, user_id: Uuid, studio_id: Uuid) -> Result<bool> {
		let result = sqlx::query("DELETE FROM user_studio_permissions WHERE user_id = $1 AND studio_id = $2")
			.bind(user_id)
			.bind(studio_id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}
}

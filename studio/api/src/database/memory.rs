use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
	Database, DatabaseError, NewPermission, NewStream, NewStudio, NewUser, Permission, Result, Stream, StreamUpdate, Studio,
	StudioUpdate, User, UserUpdate,
};

#[derive(Default)]
struct Tables {
	users: Vec<User>,
	studios: Vec<Studio>,
	streams: Vec<Stream>,
	permissions: Vec<Permission>,
}

impl Tables {
	fn check_user_unique(&self, id: Option<Uuid>, username: &str, email: Option<&str>) -> Result<()> {
		for user in self.users.iter().filter(|u| Some(u.id) != id) {
			if user.username == username {
				return Err(DatabaseError::UniqueViolation("users_username_key".to_string()));
			}

			if email.is_some() && user.email.as_deref() == email {
				return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
			}
		}

		Ok(())
	}

	fn check_studio_exists(&self, studio_id: Uuid, constraint: &str) -> Result<()> {
		if !self.studios.iter().any(|s| s.id == studio_id) {
			return Err(DatabaseError::ForeignKeyViolation(constraint.to_string()));
		}

		Ok(())
	}
}

/// [`Database`] kept entirely in process memory. Used by tests and local
/// tooling that has no Postgres available.
#[derive(Default)]
pub struct MemoryDatabase {
	tables: RwLock<Tables>,
}

impl MemoryDatabase {
	pub fn new() -> Self {
		Self::default()
	}
}

fn by_name<T>(items: &mut [T], name: impl Fn(&T) -> &str) {
	items.sort_by(|a, b| name(a).cmp(name(b)));
}

#[async_trait]
impl Database for MemoryDatabase {
	async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
		Ok(self.tables.read().await.users.iter().find(|u| u.id == id).cloned())
	}

	async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
		Ok(self.tables.read().await.users.iter().find(|u| u.username == username).cloned())
	}

	async fn list_users(&self) -> Result<Vec<User>> {
		let mut users = self.tables.read().await.users.clone();
		by_name(&mut users, |u| u.username.as_str());
		Ok(users)
	}

	async fn create_user(&self, user: NewUser) -> Result<User> {
		let mut tables = self.tables.write().await;
		tables.check_user_unique(None, &user.username, user.email.as_deref())?;

		let now = Utc::now();
		let user = User {
			id: Uuid::new_v4(),
			username: user.username,
			email: user.email,
			password_hash: user.password_hash,
			first_name: user.first_name,
			last_name: user.last_name,
			role: user.role,
			is_active: user.is_active,
			created_at: now,
			updated_at: now,
		};

		tables.users.push(user.clone());
		Ok(user)
	}

	async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>> {
		let mut tables = self.tables.write().await;

		let Some(current) = tables.users.iter().find(|u| u.id == id) else {
			return Ok(None);
		};

		let username = update.username.clone().unwrap_or_else(|| current.username.clone());
		let email = update.email.clone().unwrap_or_else(|| current.email.clone());
		tables.check_user_unique(Some(id), &username, email.as_deref())?;

		let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
			return Ok(None);
		};

		user.username = username;
		user.email = email;
		if let Some(password_hash) = update.password_hash {
			user.password_hash = password_hash;
		}
		if let Some(first_name) = update.first_name {
			user.first_name = first_name;
		}
		if let Some(last_name) = update.last_name {
			user.last_name = last_name;
		}
		if let Some(role) = update.role {
			user.role = role;
		}
		if let Some(is_active) = update.is_active {
			user.is_active = is_active;
		}
		user.updated_at = Utc::now();

		Ok(Some(user.clone()))
	}

	async fn studio_by_id(&self, id: Uuid) -> Result<Option<Studio>> {
		Ok(self.tables.read().await.studios.iter().find(|s| s.id == id).cloned())
	}

	async fn studio_by_name(&self, name: &str) -> Result<Option<Studio>> {
		Ok(self.tables.read().await.studios.iter().find(|s| s.name == name).cloned())
	}

	async fn list_studios(&self) -> Result<Vec<Studio>> {
		let mut studios = self.tables.read().await.studios.clone();
		by_name(&mut studios, |s| s.name.as_str());
		Ok(studios)
	}

	async fn viewable_studios(&self, user_id: Uuid) -> Result<Vec<Studio>> {
		let tables = self.tables.read().await;

		let mut studios = tables
			.studios
			.iter()
			.filter(|s| {
				s.is_active
					&& tables
						.permissions
						.iter()
						.any(|p| p.user_id == user_id && p.studio_id == s.id && p.can_view)
			})
			.cloned()
			.collect::<Vec<_>>();

		by_name(&mut studios, |s| s.name.as_str());
		Ok(studios)
	}

	async fn create_studio(&self, studio: NewStudio) -> Result<Studio> {
		let studio = Studio {
			id: Uuid::new_v4(),
			name: studio.name,
			location: studio.location,
			description: studio.description,
			color_code: studio.color_code,
			image_url: studio.image_url,
			is_active: studio.is_active,
			created_at: Utc::now(),
		};

		self.tables.write().await.studios.push(studio.clone());
		Ok(studio)
	}

	async fn update_studio(&self, id: Uuid, update: StudioUpdate) -> Result<Option<Studio>> {
		let mut tables = self.tables.write().await;

		let Some(studio) = tables.studios.iter_mut().find(|s| s.id == id) else {
			return Ok(None);
		};

		if let Some(name) = update.name {
			studio.name = name;
		}
		if let Some(location) = update.location {
			studio.location = location;
		}
		if let Some(description) = update.description {
			studio.description = description;
		}
		if let Some(color_code) = update.color_code {
			studio.color_code = color_code;
		}
		if let Some(image_url) = update.image_url {
			studio.image_url = image_url;
		}
		if let Some(is_active) = update.is_active {
			studio.is_active = is_active;
		}

		Ok(Some(studio.clone()))
	}

	async fn stream_by_id(&self, id: Uuid) -> Result<Option<Stream>> {
		Ok(self.tables.read().await.streams.iter().find(|s| s.id == id).cloned())
	}

	async fn streams_by_studios(&self, studio_ids: &[Uuid], active_only: bool) -> Result<Vec<Stream>> {
		let mut streams = self
			.tables
			.read()
			.await
			.streams
			.iter()
			.filter(|s| studio_ids.contains(&s.studio_id) && (s.is_active || !active_only))
			.cloned()
			.collect::<Vec<_>>();

		by_name(&mut streams, |s| s.name.as_str());
		Ok(streams)
	}

	async fn list_streams(&self) -> Result<Vec<Stream>> {
		let mut streams = self.tables.read().await.streams.clone();
		by_name(&mut streams, |s| s.name.as_str());
		Ok(streams)
	}

	async fn create_stream(&self, stream: NewStream) -> Result<Stream> {
		let mut tables = self.tables.write().await;
		tables.check_studio_exists(stream.studio_id, "streams_studio_id_fkey")?;

		let now = Utc::now();
		let stream = Stream {
			id: Uuid::new_v4(),
			studio_id: stream.studio_id,
			name: stream.name,
			description: stream.description,
			stream_url: stream.stream_url,
			resolution: stream.resolution,
			fps: stream.fps,
			status: stream.status,
			is_active: stream.is_active,
			created_at: now,
			updated_at: now,
		};

		tables.streams.push(stream.clone());
		Ok(stream)
	}

	async fn update_stream(&self, id: Uuid, update: StreamUpdate) -> Result<Option<Stream>> {
		let mut tables = self.tables.write().await;

		if let Some(studio_id) = update.studio_id {
			tables.check_studio_exists(studio_id, "streams_studio_id_fkey")?;
		}

		let Some(stream) = tables.streams.iter_mut().find(|s| s.id == id) else {
			return Ok(None);
		};

		if let Some(studio_id) = update.studio_id {
			stream.studio_id = studio_id;
		}
		if let Some(name) = update.name {
			stream.name = name;
		}
		if let Some(description) = update.description {
			stream.description = description;
		}
		if let Some(stream_url) = update.stream_url {
			stream.stream_url = stream_url;
		}
		if let Some(resolution) = update.resolution {
			stream.resolution = resolution;
		}
		if let Some(fps) = update.fps {
			stream.fps = fps;
		}
		if let Some(status) = update.status {
			stream.status = status;
		}
		if let Some(is_active) = update.is_active {
			stream.is_active = is_active;
		}
		stream.updated_at = Utc::now();

		Ok(Some(stream.clone()))
	}

	async fn permission(&self, user_id: Uuid, studio_id: Uuid) -> Result<Option<Permission>> {
		Ok(self
			.tables
			.read()
			.await
			.permissions
			.iter()
			.find(|p| p.user_id == user_id && p.studio_id == studio_id)
			.cloned())
	}

	async fn permissions_by_user(&self, user_id: Uuid) -> Result<Vec<Permission>> {
		Ok(self
			.tables
			.read()
			.await
			.permissions
			.iter()
			.filter(|p| p.user_id == user_id)
			.cloned()
			.collect())
	}

	async fn upsert_permission(&self, permission: NewPermission) -> Result<Permission> {
		let mut tables = self.tables.write().await;

		if !tables.users.iter().any(|u| u.id == permission.user_id) {
			return Err(DatabaseError::ForeignKeyViolation(
				"user_studio_permissions_user_id_fkey".to_string(),
			));
		}
		tables.check_studio_exists(permission.studio_id, "user_studio_permissions_studio_id_fkey")?;

		if let Some(existing) = tables
			.permissions
			.iter_mut()
			.find(|p| p.user_id == permission.user_id && p.studio_id == permission.studio_id)
		{
			existing.can_view = permission.can_view;
			existing.can_control = permission.can_control;
			return Ok(existing.clone());
		}

		let permission = Permission {
			id: Uuid::new_v4(),
			user_id: permission.user_id,
			studio_id: permission.studio_id,
			can_view: permission.can_view,
			can_control: permission.can_control,
			created_at: Utc::now(),
		};

		tables.permissions.push(permission.clone());
		Ok(permission)
	}

	async fn delete_permission(&self, user_id: Uuid, studio_id: Uuid) -> Result<bool> {
		let mut tables = self.tables.write().await;

		let before = tables.permissions.len();
		tables
			.permissions
			.retain(|p| !(p.user_id == user_id && p.studio_id == studio_id));

		Ok(tables.permissions.len() != before)
	}
}

use async_trait::async_trait;
use uuid::Uuid;

mod error;
mod memory;
mod permission;
mod postgres;
mod stream;
mod studio;
mod user;

pub use error::*;
pub use memory::MemoryDatabase;
pub use permission::*;
pub use postgres::PgDatabase;
pub use stream::*;
pub use studio::*;
pub use user::*;

pub type Result<T, E = DatabaseError> = std::result::Result<T, E>;

/// Storage for users, studios, streams and the grants between them.
///
/// Implementations enforce the same constraints as the SQL schema: unique
/// usernames and emails, one permission per (user, studio) pair, and
/// references to existing rows.
#[async_trait]
pub trait Database: Send + Sync + 'static {
	async fn user_by_id(&self, id: Uuid) -> Result<Option<User>>;
	async fn user_by_username(&self, username: &str) -> Result<Option<User>>;
	/// All users, active or not, ordered by username.
	async fn list_users(&self) -> Result<Vec<User>>;
	async fn create_user(&self, user: NewUser) -> Result<User>;
	async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>>;

	async fn studio_by_id(&self, id: Uuid) -> Result<Option<Studio>>;
	async fn studio_by_name(&self, name: &str) -> Result<Option<Studio>>;
	/// All studios, active or not, ordered by name.
	async fn list_studios(&self) -> Result<Vec<Studio>>;
	/// Active studios the user holds a `can_view` grant on, ordered by name.
	async fn viewable_studios(&self, user_id: Uuid) -> Result<Vec<Studio>>;
	async fn create_studio(&self, studio: NewStudio) -> Result<Studio>;
	async fn update_studio(&self, id: Uuid, update: StudioUpdate) -> Result<Option<Studio>>;

	async fn stream_by_id(&self, id: Uuid) -> Result<Option<Stream>>;
	/// Streams of the given studios ordered by name.
	async fn streams_by_studios(&self, studio_ids: &[Uuid], active_only: bool) -> Result<Vec<Stream>>;
	/// All streams, active or not, ordered by name.
	async fn list_streams(&self) -> Result<Vec<Stream>>;
	async fn create_stream(&self, stream: NewStream) -> Result<Stream>;
	async fn update_stream(&self, id: Uuid, update: StreamUpdate) -> Result<Option<Stream>>;

	async fn permission(&self, user_id: Uuid, studio_id: Uuid) -> Result<Option<Permission>>;
	async fn permissions_by_user(&self, user_id: Uuid) -> Result<Vec<Permission>>;
	/// Inserts the grant or overwrites the flags of the existing one.
	async fn upsert_permission(&self, permission: NewPermission) -> Result<Permission>;
	/// Returns whether a grant was removed.
	async fn delete_permission(&self, user_id: Uuid, studio_id: Uuid) -> Result<bool>;
}

/// Groups streams under their studios, keeping the studio order.
pub fn nest_streams(studios: Vec<Studio>, streams: Vec<Stream>) -> Vec<StudioWithStreams> {
	let mut nested = studios
		.into_iter()
		.map(|studio| StudioWithStreams {
			studio,
			streams: Vec::new(),
		})
		.collect::<Vec<_>>();

	for stream in streams {
		if let Some(entry) = nested.iter_mut().find(|s| s.studio.id == stream.studio_id) {
			entry.streams.push(stream);
		}
	}

	nested
}

/// The user's grants, each joined with its studio.
pub async fn permissions_with_studios(db: &dyn Database, user_id: Uuid) -> Result<Vec<PermissionWithStudio>> {
	let permissions = db.permissions_by_user(user_id).await?;

	let mut joined = Vec::with_capacity(permissions.len());
	for permission in permissions {
		if let Some(studio) = db.studio_by_id(permission.studio_id).await? {
			joined.push(PermissionWithStudio { permission, studio });
		}
	}

	Ok(joined)
}

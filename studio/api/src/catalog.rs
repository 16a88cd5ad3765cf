//! Studio and stream reads filtered by the caller's grants.

use uuid::Uuid;

use crate::access::{grant_for, Grant};
use crate::database::{
	nest_streams, Database, DatabaseError, Stream, StreamStatus, StreamUpdate, Studio, StudioWithStreams, User,
};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
	#[error("forbidden: {0}")]
	Forbidden(&'static str),
	#[error("not found: {0}")]
	NotFound(&'static str),
	#[error("database: {0}")]
	Database(#[from] DatabaseError),
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

/// Active studios the user may view, by name, each with its active streams
/// by name.
pub async fn list_user_studios(db: &dyn Database, user: &User) -> Result<Vec<StudioWithStreams>> {
	let studios = if user.is_admin() {
		db.list_studios()
			.await?
			.into_iter()
			.filter(|s| s.is_active)
			.collect::<Vec<_>>()
	} else {
		db.viewable_studios(user.id).await?
	};

	let ids = studios.iter().map(|s| s.id).collect::<Vec<_>>();
	let streams = db.streams_by_studios(&ids, true).await?;

	Ok(nest_streams(studios, streams))
}

/// One active studio with its active streams.
///
/// The grant is checked before the studio is loaded so that an unknown id
/// and an ungranted one are indistinguishable to non-admins.
pub async fn get_studio(db: &dyn Database, user: &User, studio_id: Uuid) -> Result<StudioWithStreams> {
	require(grant_for(db, user, studio_id).await?, |g| g.can_view, "No access to this studio")?;

	let studio = active_studio(db, studio_id).await?;
	let streams = db.streams_by_studios(&[studio.id], true).await?;

	Ok(StudioWithStreams { studio, streams })
}

/// One active stream on an active studio the user may view.
pub async fn get_stream(db: &dyn Database, user: &User, stream_id: Uuid) -> Result<Stream> {
	let stream = active_stream(db, stream_id).await?;

	require(
		grant_for(db, user, stream.studio_id).await?,
		|g| g.can_view,
		"No access to this stream",
	)?;

	Ok(stream)
}

/// Sets the status of a stream. Any status may follow any other.
pub async fn update_stream_status(db: &dyn Database, user: &User, stream_id: Uuid, status: StreamStatus) -> Result<Stream> {
	let stream = active_stream(db, stream_id).await?;

	require(
		grant_for(db, user, stream.studio_id).await?,
		|g| g.can_control,
		"No control access to this stream",
	)?;

	if stream.status == status {
		return Ok(stream);
	}

	let update = StreamUpdate {
		status: Some(status),
		..Default::default()
	};

	let stream = db
		.update_stream(stream_id, update)
		.await?
		.ok_or(CatalogError::NotFound("Stream not found"))?;

	tracing::info!(stream_id = %stream.id, user_id = %user.id, status = ?status, "stream status updated");

	Ok(stream)
}

fn require(grant: Grant, check: impl Fn(&Grant) -> bool, message: &'static str) -> Result<()> {
	if check(&grant) {
		Ok(())
	} else {
		Err(CatalogError::Forbidden(message))
	}
}

async fn active_studio(db: &dyn Database, studio_id: Uuid) -> Result<Studio> {
	db.studio_by_id(studio_id)
		.await?
		.filter(|s| s.is_active)
		.ok_or(CatalogError::NotFound("Studio not found"))
}

/// A stream counts as gone when it or its studio has been deactivated.
async fn active_stream(db: &dyn Database, stream_id: Uuid) -> Result<Stream> {
	let stream = db
		.stream_by_id(stream_id)
		.await?
		.filter(|s| s.is_active)
		.ok_or(CatalogError::NotFound("Stream not found"))?;

	match active_studio(db, stream.studio_id).await {
		Ok(_) => Ok(stream),
		Err(CatalogError::NotFound(_)) => Err(CatalogError::NotFound("Stream not found")),
		Err(err) => Err(err),
	}
}

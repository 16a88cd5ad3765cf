use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, sqlx::Type)]
#[sqlx(type_name = "stream_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
	Online,
	#[default]
	Offline,
	Error,
}

impl std::str::FromStr for StreamStatus {
	type Err = &'static str;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"online" => Ok(Self::Online),
			"offline" => Ok(Self::Offline),
			"error" => Ok(Self::Error),
			_ => Err("Status must be online, offline or error"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
	pub id: Uuid,
	pub studio_id: Uuid,
	pub name: String,
	pub description: Option<String>,
	/// Playback URL handed to the WHEP client.
	pub stream_url: String,
	pub resolution: String,
	pub fps: i32,
	pub status: StreamStatus,
	/// Cleared instead of deleting the row.
	pub is_active: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStream {
	pub studio_id: Uuid,
	pub name: String,
	pub description: Option<String>,
	pub stream_url: String,
	pub resolution: String,
	pub fps: i32,
	pub status: StreamStatus,
	pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamUpdate {
	pub studio_id: Option<Uuid>,
	pub name: Option<String>,
	pub description: Option<Option<String>>,
	pub stream_url: Option<String>,
	pub resolution: Option<String>,
	pub fps: Option<i32>,
	pub status: Option<StreamStatus>,
	pub is_active: Option<bool>,
}

impl StreamUpdate {
	pub fn is_empty(&self) -> bool {
		self == &Self::default()
	}
}

impl Stream {
	pub const DEFAULT_RESOLUTION: &'static str = "1080p";
	pub const DEFAULT_FPS: i32 = 30;

	pub fn validate_name(name: &str) -> Result<(), &'static str> {
		match name.trim().chars().count() {
			0 => Err("Stream name is required"),
			101.. => Err("Stream name must be at most 100 characters long"),
			_ => Ok(()),
		}
	}

	pub fn validate_url(url: &str) -> Result<(), &'static str> {
		if url.trim().is_empty() {
			return Err("Stream URL is required");
		}

		Ok(())
	}

	pub fn validate_resolution(resolution: &str) -> Result<(), &'static str> {
		if resolution.trim().is_empty() {
			return Err("Resolution must not be empty");
		}

		if resolution.chars().count() > 20 {
			return Err("Resolution must be at most 20 characters long");
		}

		Ok(())
	}

	pub fn validate_fps(fps: i32) -> Result<(), &'static str> {
		if !(1..=240).contains(&fps) {
			return Err("FPS must be between 1 and 240");
		}

		Ok(())
	}
}

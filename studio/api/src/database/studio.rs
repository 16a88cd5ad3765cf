use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Stream;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Studio {
	pub id: Uuid,
	pub name: String,
	pub location: Option<String>,
	pub description: Option<String>,
	/// `#RRGGBB`
	pub color_code: Option<String>,
	pub image_url: Option<String>,
	pub is_active: bool,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StudioWithStreams {
	#[serde(flatten)]
	pub studio: Studio,
	pub streams: Vec<Stream>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStudio {
	pub name: String,
	pub location: Option<String>,
	pub description: Option<String>,
	pub color_code: Option<String>,
	pub image_url: Option<String>,
	pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudioUpdate {
	pub name: Option<String>,
	pub location: Option<Option<String>>,
	pub description: Option<Option<String>>,
	pub color_code: Option<Option<String>>,
	pub image_url: Option<Option<String>>,
	pub is_active: Option<bool>,
}

impl StudioUpdate {
	pub fn is_empty(&self) -> bool {
		self == &Self::default()
	}
}

impl Studio {
	pub fn validate_name(name: &str) -> Result<(), &'static str> {
		match name.trim().chars().count() {
			0 => Err("Studio name is required"),
			101.. => Err("Studio name must be at most 100 characters long"),
			_ => Ok(()),
		}
	}

	pub fn validate_location(location: &str) -> Result<(), &'static str> {
		if location.chars().count() > 100 {
			return Err("Location must be at most 100 characters long");
		}

		Ok(())
	}

	pub fn validate_color_code(color: &str) -> Result<(), &'static str> {
		let valid = color.len() == 7
			&& color.starts_with('#')
			&& color[1..].chars().all(|c| c.is_ascii_hexdigit());

		if !valid {
			return Err("Color code must look like #RRGGBB");
		}

		Ok(())
	}

	pub fn validate_image_url(url: &str) -> Result<(), &'static str> {
		if url.chars().count() > 500 {
			return Err("Image URL must be at most 500 characters long");
		}

		Ok(())
	}
}

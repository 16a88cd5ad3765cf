use std::sync::Arc;

use common::http::RouteError;
use hyper::{Body, Request, Response, StatusCode};
use routerify::Router;
use serde::Serialize;

use crate::api::error::{ApiError, Result};
use crate::api::ext::{double_option, json_response, message_response, non_empty, parse_json, require_admin, validate, RequestExt as _};
use crate::database::{Database, NewStudio, Stream, Studio, StudioUpdate};
use crate::global::ApiGlobal;

/// Shown by the dashboard for studios without a colour of their own.
pub const DEFAULT_PRIMARY_COLOR: &str = "#4A5568";

/// A studio as the admin views see it, inactive rows included.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminStudio {
	#[serde(flatten)]
	studio: Studio,
	primary_color: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	streams: Option<Vec<Stream>>,
}

impl AdminStudio {
	fn new(studio: Studio, streams: Option<Vec<Stream>>) -> Self {
		let primary_color = studio
			.color_code
			.clone()
			.unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string());

		Self {
			studio,
			primary_color,
			streams,
		}
	}
}

async fn find(db: &dyn Database, id: uuid::Uuid) -> Result<Studio> {
	Ok(db
		.studio_by_id(id)
		.await?
		.ok_or((StatusCode::NOT_FOUND, "Studio not found"))?)
}

async fn list<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	require_admin(&req).await?;

	let studios = global
		.database()
		.list_studios()
		.await?
		.into_iter()
		.map(|studio| AdminStudio::new(studio, None))
		.collect::<Vec<_>>();

	json_response(StatusCode::OK, &studios)
}

async fn list_with_streams<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	require_admin(&req).await?;

	let db = global.database();
	let studios = db.list_studios().await?;
	let ids = studios.iter().map(|s| s.id).collect::<Vec<_>>();
	let streams = db.streams_by_studios(&ids, false).await?;

	let studios = crate::database::nest_streams(studios, streams)
		.into_iter()
		.map(|nested| AdminStudio::new(nested.studio, Some(nested.streams)))
		.collect::<Vec<_>>();

	json_response(StatusCode::OK, &studios)
}

async fn get<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	require_admin(&req).await?;
	let id = req.uuid_param("id")?;

	let db = global.database().as_ref();
	let studio = find(db, id).await?;
	let streams = db.streams_by_studios(&[id], false).await?;

	json_response(StatusCode::OK, &AdminStudio::new(studio, Some(streams)))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateStudioRequest {
	#[serde(default)]
	name: String,
	location: Option<String>,
	description: Option<String>,
	#[serde(alias = "primaryColor")]
	color_code: Option<String>,
	image_url: Option<String>,
	is_active: Option<bool>,
}

fn validate_optional(
	location: Option<&String>,
	color_code: Option<&String>,
	image_url: Option<&String>,
) -> Result<()> {
	if let Some(location) = location {
		validate(location.as_str(), Studio::validate_location)?;
	}
	if let Some(color_code) = color_code {
		validate(color_code.as_str(), Studio::validate_color_code)?;
	}
	if let Some(image_url) = image_url {
		validate(image_url.as_str(), Studio::validate_image_url)?;
	}

	Ok(())
}

async fn create<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_admin(&req).await?;
	let body: CreateStudioRequest = parse_json(&mut req).await?;

	let name = body.name.trim().to_string();
	validate(name.as_str(), Studio::validate_name)?;

	let location = non_empty(body.location);
	let color_code = non_empty(body.color_code);
	let image_url = non_empty(body.image_url);
	validate_optional(location.as_ref(), color_code.as_ref(), image_url.as_ref())?;

	let studio = global
		.database()
		.create_studio(NewStudio {
			name,
			location,
			description: non_empty(body.description),
			color_code,
			image_url,
			is_active: body.is_active.unwrap_or(true),
		})
		.await?;

	tracing::info!(studio_id = %studio.id, admin_id = %auth.user.id, "studio created");

	json_response(StatusCode::CREATED, &AdminStudio::new(studio, None))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStudioRequest {
	name: Option<String>,
	#[serde(default, deserialize_with = "double_option")]
	location: Option<Option<String>>,
	#[serde(default, deserialize_with = "double_option")]
	description: Option<Option<String>>,
	#[serde(default, deserialize_with = "double_option", alias = "primaryColor")]
	color_code: Option<Option<String>>,
	#[serde(default, deserialize_with = "double_option")]
	image_url: Option<Option<String>>,
	is_active: Option<bool>,
}

async fn update<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_admin(&req).await?;
	let id = req.uuid_param("id")?;
	let body: UpdateStudioRequest = parse_json(&mut req).await?;

	let name = body.name.map(|n| n.trim().to_string());
	if let Some(name) = &name {
		validate(name.as_str(), Studio::validate_name)?;
	}

	let location = body.location.map(non_empty);
	let color_code = body.color_code.map(non_empty);
	let image_url = body.image_url.map(non_empty);
	validate_optional(
		location.as_ref().and_then(Option::as_ref),
		color_code.as_ref().and_then(Option::as_ref),
		image_url.as_ref().and_then(Option::as_ref),
	)?;

	let update = StudioUpdate {
		name,
		location,
		description: body.description.map(non_empty),
		color_code,
		image_url,
		is_active: body.is_active,
	};

	let studio = global
		.database()
		.update_studio(id, update)
		.await?
		.ok_or((StatusCode::NOT_FOUND, "Studio not found"))?;

	tracing::info!(studio_id = %studio.id, admin_id = %auth.user.id, "studio updated");

	json_response(StatusCode::OK, &AdminStudio::new(studio, None))
}

async fn delete<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_admin(&req).await?;
	let id = req.uuid_param("id")?;

	let update = StudioUpdate {
		is_active: Some(false),
		..Default::default()
	};

	global
		.database()
		.update_studio(id, update)
		.await?
		.ok_or((StatusCode::NOT_FOUND, "Studio not found"))?;

	tracing::info!(studio_id = %id, admin_id = %auth.user.id, "studio deactivated");

	Ok(message_response(StatusCode::OK, "Studio deleted successfully"))
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> anyhow::Result<Router<Body, RouteError<ApiError>>> {
	Router::builder()
		.get("/studios", list::<G>)
		.post("/studios", create::<G>)
		.get("/studios-with-streams", list_with_streams::<G>)
		.get("/studios/:id", get::<G>)
		.patch("/studios/:id", update::<G>)
		.delete("/studios/:id", delete::<G>)
		.build()
		.map_err(|err| anyhow::anyhow!("failed to build admin studio routes: {err}"))
}

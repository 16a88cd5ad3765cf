use std::sync::Arc;

use common::http::RouteError;
use hyper::{Body, Request, Response, StatusCode};
use routerify::Router;
use uuid::Uuid;

use super::constraint_error;
use crate::api::error::{ApiError, Result};
use crate::api::ext::{double_option, json_response, message_response, non_empty, parse_json, require_admin, validate, RequestExt as _};
use crate::database::{Database, NewStream, Stream, StreamStatus, StreamUpdate};
use crate::global::ApiGlobal;

const UNKNOWN_STUDIO: &str = "Studio does not exist";

async fn require_studio(db: &dyn Database, studio_id: Uuid) -> Result<()> {
	db.studio_by_id(studio_id)
		.await?
		.ok_or((StatusCode::BAD_REQUEST, UNKNOWN_STUDIO))?;

	Ok(())
}

async fn list<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	require_admin(&req).await?;

	json_response(StatusCode::OK, &global.database().list_streams().await?)
}

async fn get<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	require_admin(&req).await?;
	let id = req.uuid_param("id")?;

	let stream = global
		.database()
		.stream_by_id(id)
		.await?
		.ok_or((StatusCode::NOT_FOUND, "Stream not found"))?;

	json_response(StatusCode::OK, &stream)
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateStreamRequest {
	studio_id: Option<Uuid>,
	#[serde(default)]
	name: String,
	description: Option<String>,
	#[serde(default)]
	stream_url: String,
	resolution: Option<String>,
	fps: Option<i32>,
	status: Option<StreamStatus>,
	is_active: Option<bool>,
}

async fn create<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_admin(&req).await?;
	let body: CreateStreamRequest = parse_json(&mut req).await?;

	let studio_id = body.studio_id.ok_or((StatusCode::BAD_REQUEST, "Studio id is required"))?;

	let name = body.name.trim().to_string();
	validate(name.as_str(), Stream::validate_name)?;

	let stream_url = body.stream_url.trim().to_string();
	validate(stream_url.as_str(), Stream::validate_url)?;

	let resolution = non_empty(body.resolution).unwrap_or_else(|| Stream::DEFAULT_RESOLUTION.to_string());
	validate(resolution.as_str(), Stream::validate_resolution)?;

	let fps = body.fps.unwrap_or(Stream::DEFAULT_FPS);
	validate(&fps, |fps| Stream::validate_fps(*fps))?;

	let db = global.database().as_ref();
	require_studio(db, studio_id).await?;

	let stream = db
		.create_stream(NewStream {
			studio_id,
			name,
			description: non_empty(body.description),
			stream_url,
			resolution,
			fps,
			status: body.status.unwrap_or_default(),
			is_active: body.is_active.unwrap_or(true),
		})
		.await
		.map_err(constraint_error("Stream already exists", UNKNOWN_STUDIO))?;

	tracing::info!(stream_id = %stream.id, studio_id = %studio_id, admin_id = %auth.user.id, "stream created");

	json_response(StatusCode::CREATED, &stream)
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStreamRequest {
	studio_id: Option<Uuid>,
	name: Option<String>,
	#[serde(default, deserialize_with = "double_option")]
	description: Option<Option<String>>,
	stream_url: Option<String>,
	resolution: Option<String>,
	fps: Option<i32>,
	status: Option<StreamStatus>,
	is_active: Option<bool>,
}

async fn update<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_admin(&req).await?;
	let id = req.uuid_param("id")?;
	let body: UpdateStreamRequest = parse_json(&mut req).await?;

	let name = body.name.map(|n| n.trim().to_string());
	if let Some(name) = &name {
		validate(name.as_str(), Stream::validate_name)?;
	}

	let stream_url = body.stream_url.map(|u| u.trim().to_string());
	if let Some(stream_url) = &stream_url {
		validate(stream_url.as_str(), Stream::validate_url)?;
	}

	let resolution = body.resolution.map(|r| r.trim().to_string());
	if let Some(resolution) = &resolution {
		validate(resolution.as_str(), Stream::validate_resolution)?;
	}

	if let Some(fps) = &body.fps {
		validate(fps, |fps| Stream::validate_fps(*fps))?;
	}

	let db = global.database().as_ref();
	if let Some(studio_id) = body.studio_id {
		require_studio(db, studio_id).await?;
	}

	let update = StreamUpdate {
		studio_id: body.studio_id,
		name,
		description: body.description.map(non_empty),
		stream_url,
		resolution,
		fps: body.fps,
		status: body.status,
		is_active: body.is_active,
	};

	let stream = db
		.update_stream(id, update)
		.await
		.map_err(constraint_error("Stream already exists", UNKNOWN_STUDIO))?
		.ok_or((StatusCode::NOT_FOUND, "Stream not found"))?;

	tracing::info!(stream_id = %stream.id, admin_id = %auth.user.id, "stream updated");

	json_response(StatusCode::OK, &stream)
}

async fn delete<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_admin(&req).await?;
	let id = req.uuid_param("id")?;

	let update = StreamUpdate {
		is_active: Some(false),
		..Default::default()
	};

	global
		.database()
		.update_stream(id, update)
		.await?
		.ok_or((StatusCode::NOT_FOUND, "Stream not found"))?;

	tracing::info!(stream_id = %id, admin_id = %auth.user.id, "stream deactivated");

	Ok(message_response(StatusCode::OK, "Stream deleted successfully"))
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> anyhow::Result<Router<Body, RouteError<ApiError>>> {
	Router::builder()
		.get("/streams", list::<G>)
		.post("/streams", create::<G>)
		.get("/streams/:id", get::<G>)
		.patch("/streams/:id", update::<G>)
		.delete("/streams/:id", delete::<G>)
		.build()
		.map_err(|err| anyhow::anyhow!("failed to build admin stream routes: {err}"))
}

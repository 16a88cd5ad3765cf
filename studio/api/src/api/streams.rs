use std::sync::Arc;

use common::http::RouteError;
use hyper::{Body, Request, Response, StatusCode};
use routerify::Router;
use serde_json::json;

use super::error::{ApiError, Result};
use super::ext::{json_response, parse_json, require_auth, RequestExt as _};
use crate::catalog;
use crate::database::StreamStatus;
use crate::global::ApiGlobal;

async fn get<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_auth(&req).await?;
	let id = req.uuid_param("id")?;

	let stream = catalog::get_stream(global.database().as_ref(), &auth.user, id).await?;

	json_response(StatusCode::OK, &stream)
}

#[derive(serde::Deserialize)]
struct StatusRequest {
	status: Option<String>,
}

async fn update_status<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_auth(&req).await?;
	let id = req.uuid_param("id")?;
	let body: StatusRequest = parse_json(&mut req).await?;

	let status = body
		.status
		.ok_or((StatusCode::BAD_REQUEST, "Status is required"))?
		.parse::<StreamStatus>()
		.map_err(|message| RouteError::<ApiError>::from((StatusCode::BAD_REQUEST, message)))?;

	let stream = catalog::update_stream_status(global.database().as_ref(), &auth.user, id, status).await?;

	json_response(
		StatusCode::OK,
		&json!({
			"success": true,
			"message": "Stream status updated",
			"stream": stream,
		}),
	)
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> anyhow::Result<Router<Body, RouteError<ApiError>>> {
	Router::builder()
		.get("/streams/:id", get::<G>)
		.patch("/streams/:id/status", update_status::<G>)
		.build()
		.map_err(|err| anyhow::anyhow!("failed to build stream routes: {err}"))
}

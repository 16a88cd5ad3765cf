use std::sync::Arc;

use chrono::Utc;
use common::http::RouteError;
use common::make_response;
use hyper::{Body, Request, Response, StatusCode};
use routerify::Router;
use serde_json::json;

use super::error::{ApiError, Result};
use super::ext::RequestExt as _;
use crate::global::ApiGlobal;

async fn health<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;

	Ok(make_response!(
		StatusCode::OK,
		json!({
			"status": "OK",
			"timestamp": Utc::now().to_rfc3339(),
			"uptime": global.started_at().elapsed().as_secs_f64(),
		})
	))
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> anyhow::Result<Router<Body, RouteError<ApiError>>> {
	Router::builder()
		.get("/health", health::<G>)
		.build()
		.map_err(|err| anyhow::anyhow!("failed to build health routes: {err}"))
}

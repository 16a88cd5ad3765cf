use std::sync::Arc;

use common::http::RouteError;
use hyper::{Body, Request, Response, StatusCode};
use routerify::Router;

use super::error::{ApiError, Result};
use super::ext::{json_response, require_auth, RequestExt as _};
use crate::catalog;
use crate::global::ApiGlobal;

async fn list<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_auth(&req).await?;

	let studios = catalog::list_user_studios(global.database().as_ref(), &auth.user).await?;

	json_response(StatusCode::OK, &studios)
}

async fn get<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_auth(&req).await?;
	let id = req.uuid_param("id")?;

	let studio = catalog::get_studio(global.database().as_ref(), &auth.user, id).await?;

	json_response(StatusCode::OK, &studio)
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> anyhow::Result<Router<Body, RouteError<ApiError>>> {
	Router::builder()
		.get("/studios", list::<G>)
		.get("/studios/:id", get::<G>)
		.build()
		.map_err(|err| anyhow::anyhow!("failed to build studio routes: {err}"))
}

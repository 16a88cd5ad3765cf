use std::sync::Arc;

use common::http::RouteError;
use hyper::{Body, Request, Response, StatusCode};
use routerify::Router;
use uuid::Uuid;

use super::constraint_error;
use crate::api::error::{ApiError, Result};
use crate::api::ext::{json_response, message_response, parse_json, require_admin, RequestExt as _};
use crate::database::NewPermission;
use crate::global::ApiGlobal;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct GrantRequest {
	user_id: Option<Uuid>,
	studio_id: Option<Uuid>,
	can_view: Option<bool>,
	can_control: Option<bool>,
}

/// Grants are upserts: re-granting the same pair overwrites its flags.
async fn grant<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_admin(&req).await?;
	let body: GrantRequest = parse_json(&mut req).await?;

	let (Some(user_id), Some(studio_id)) = (body.user_id, body.studio_id) else {
		return Err((StatusCode::BAD_REQUEST, "User id and studio id are required").into());
	};

	let db = global.database();
	let existed = db.permission(user_id, studio_id).await?.is_some();

	let permission = db
		.upsert_permission(NewPermission {
			user_id,
			studio_id,
			can_view: body.can_view.unwrap_or(true),
			can_control: body.can_control.unwrap_or(false),
		})
		.await
		.map_err(constraint_error("Permission already exists", "User or studio does not exist"))?;

	tracing::info!(
		user_id = %user_id,
		studio_id = %studio_id,
		can_view = permission.can_view,
		can_control = permission.can_control,
		admin_id = %auth.user.id,
		"permission granted"
	);

	let status = if existed { StatusCode::OK } else { StatusCode::CREATED };

	json_response(status, &permission)
}

/// Drops view and control together. Revoking a missing grant succeeds.
async fn revoke<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_admin(&req).await?;
	let user_id = req.uuid_param("userId")?;
	let studio_id = req.uuid_param("studioId")?;

	if global.database().delete_permission(user_id, studio_id).await? {
		tracing::info!(user_id = %user_id, studio_id = %studio_id, admin_id = %auth.user.id, "permission revoked");
	}

	Ok(message_response(StatusCode::OK, "Permission removed successfully"))
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> anyhow::Result<Router<Body, RouteError<ApiError>>> {
	Router::builder()
		.post("/permissions", grant::<G>)
		.delete("/permissions/:userId/:studioId", revoke::<G>)
		.build()
		.map_err(|err| anyhow::anyhow!("failed to build admin permission routes: {err}"))
}

use std::sync::Arc;

use common::http::ext::ResultExt;
use common::http::RouteError;
use hyper::{Body, Request, Response, StatusCode};
use routerify::Router;
use serde_json::json;

use super::auth::{self, AuthError};
use super::error::{ApiError, Result};
use super::ext::{json_response, message_response, parse_json, require_auth, validate, RequestExt as _};
use crate::config::JwtConfig;
use crate::database::{permissions_with_studios, PermissionWithStudio, PublicUser, User, UserUpdate};
use crate::global::ApiGlobal;

#[derive(serde::Deserialize)]
struct LoginRequest {
	#[serde(default)]
	username: String,
	#[serde(default)]
	password: String,
}

async fn login<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let body: LoginRequest = parse_json(&mut req).await?;

	if body.username.is_empty() || body.password.is_empty() {
		return Err((StatusCode::BAD_REQUEST, "Username and password are required").into());
	}

	let (token, user) = auth::login(
		global.database().as_ref(),
		global.config::<JwtConfig>(),
		&body.username,
		&body.password,
	)
	.await?;

	json_response(
		StatusCode::OK,
		&json!({
			"token": token,
			"user": PublicUser::from(&user),
		}),
	)
}

#[derive(serde::Serialize)]
struct Profile {
	#[serde(flatten)]
	user: User,
	permissions: Vec<PermissionWithStudio>,
}

async fn profile<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_auth(&req).await?;

	let permissions = permissions_with_studios(global.database().as_ref(), auth.user.id).await?;

	json_response(
		StatusCode::OK,
		&Profile {
			user: auth.user,
			permissions,
		},
	)
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest {
	#[serde(default)]
	current_password: String,
	#[serde(default)]
	new_password: String,
}

async fn change_password<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_auth(&req).await?;
	let body: ChangePasswordRequest = parse_json(&mut req).await?;

	if body.current_password.is_empty() || body.new_password.is_empty() {
		return Err((StatusCode::BAD_REQUEST, "Current and new password are required").into());
	}

	validate(body.new_password.as_str(), User::validate_password)?;

	if !auth::check_password(auth.user.password_hash.clone(), body.current_password).await? {
		return Err(AuthError::InvalidCredentials.into());
	}

	let password_hash = auth::hash_password(body.new_password)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"))?;

	let update = UserUpdate {
		password_hash: Some(password_hash),
		..Default::default()
	};

	global
		.database()
		.update_user(auth.user.id, update)
		.await?
		.ok_or(AuthError::InvalidToken)?;

	tracing::info!(user_id = %auth.user.id, "password changed");

	Ok(message_response(StatusCode::OK, "Password changed successfully"))
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> anyhow::Result<Router<Body, RouteError<ApiError>>> {
	Router::builder()
		.post("/auth/login", login::<G>)
		.get("/auth/user", profile::<G>)
		.put("/auth/change-password", change_password::<G>)
		.build()
		.map_err(|err| anyhow::anyhow!("failed to build auth routes: {err}"))
}

use std::sync::Arc;

use common::http::ext::ResultExt;
use common::http::RouteError;
use hyper::{Body, Request, Response, StatusCode};
use routerify::Router;

use super::constraint_error;
use crate::api::auth::hash_password;
use crate::api::error::{ApiError, Result};
use crate::api::ext::{
	double_option, json_response, message_response, non_empty, parse_json, require_admin, validate, RequestExt as _,
};
use crate::database::{permissions_with_studios, NewUser, User, UserRole, UserUpdate};
use crate::global::ApiGlobal;

const DUPLICATE_USER: &str = "Username or email already exists";

async fn list<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	require_admin(&req).await?;

	let users = global.database().list_users().await?;

	json_response(StatusCode::OK, &users)
}

async fn get<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	require_admin(&req).await?;
	let id = req.uuid_param("id")?;

	let user = global
		.database()
		.user_by_id(id)
		.await?
		.ok_or((StatusCode::NOT_FOUND, "User not found"))?;

	json_response(StatusCode::OK, &user)
}

async fn permissions<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	require_admin(&req).await?;
	let id = req.uuid_param("id")?;

	let db = global.database().as_ref();
	db.user_by_id(id).await?.ok_or((StatusCode::NOT_FOUND, "User not found"))?;

	json_response(StatusCode::OK, &permissions_with_studios(db, id).await?)
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
	#[serde(default)]
	username: String,
	#[serde(default)]
	password: String,
	email: Option<String>,
	first_name: Option<String>,
	last_name: Option<String>,
	#[serde(default)]
	role: UserRole,
	is_active: Option<bool>,
}

async fn create<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_admin(&req).await?;
	let body: CreateUserRequest = parse_json(&mut req).await?;

	let username = body.username.trim().to_string();
	validate(username.as_str(), User::validate_username)?;
	validate(body.password.as_str(), User::validate_password)?;

	let email = non_empty(body.email).map(|e| e.trim().to_string());
	if let Some(email) = &email {
		validate(email.as_str(), User::validate_email)?;
	}

	let first_name = non_empty(body.first_name);
	let last_name = non_empty(body.last_name);
	for name in first_name.iter().chain(last_name.iter()) {
		validate(name.as_str(), User::validate_name)?;
	}

	let password_hash = hash_password(body.password)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"))?;

	let user = global
		.database()
		.create_user(NewUser {
			username,
			email,
			password_hash,
			first_name,
			last_name,
			role: body.role,
			is_active: body.is_active.unwrap_or(true),
		})
		.await
		.map_err(constraint_error(DUPLICATE_USER, "Referenced resource does not exist"))?;

	tracing::info!(user_id = %user.id, admin_id = %auth.user.id, role = ?user.role, "user created");

	json_response(StatusCode::CREATED, &user)
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserRequest {
	username: Option<String>,
	password: Option<String>,
	#[serde(default, deserialize_with = "double_option")]
	email: Option<Option<String>>,
	#[serde(default, deserialize_with = "double_option")]
	first_name: Option<Option<String>>,
	#[serde(default, deserialize_with = "double_option")]
	last_name: Option<Option<String>>,
	role: Option<UserRole>,
	is_active: Option<bool>,
}

async fn update<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_admin(&req).await?;
	let id = req.uuid_param("id")?;
	let body: UpdateUserRequest = parse_json(&mut req).await?;

	if id == auth.user.id && (body.is_active == Some(false) || body.role.is_some_and(|r| r != UserRole::Admin)) {
		return Err((StatusCode::BAD_REQUEST, "You cannot deactivate or demote your own account").into());
	}

	let username = body.username.map(|u| u.trim().to_string());
	if let Some(username) = &username {
		validate(username.as_str(), User::validate_username)?;
	}

	let email = body.email.map(|e| non_empty(e).map(|e| e.trim().to_string()));
	if let Some(Some(email)) = &email {
		validate(email.as_str(), User::validate_email)?;
	}

	let first_name = body.first_name.map(non_empty);
	let last_name = body.last_name.map(non_empty);
	for name in [&first_name, &last_name].into_iter().flatten().flatten() {
		validate(name.as_str(), User::validate_name)?;
	}

	let password_hash = match body.password {
		Some(password) => {
			validate(password.as_str(), User::validate_password)?;
			Some(
				hash_password(password)
					.await
					.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"))?,
			)
		}
		None => None,
	};

	let update = UserUpdate {
		username,
		email,
		password_hash,
		first_name,
		last_name,
		role: body.role,
		is_active: body.is_active,
	};

	let user = global
		.database()
		.update_user(id, update)
		.await
		.map_err(constraint_error(DUPLICATE_USER, "Referenced resource does not exist"))?
		.ok_or((StatusCode::NOT_FOUND, "User not found"))?;

	tracing::info!(user_id = %user.id, admin_id = %auth.user.id, "user updated");

	json_response(StatusCode::OK, &user)
}

async fn delete<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.global::<G>()?;
	let auth = require_admin(&req).await?;
	let id = req.uuid_param("id")?;

	if id == auth.user.id {
		return Err((StatusCode::BAD_REQUEST, "You cannot delete your own account").into());
	}

	let update = UserUpdate {
		is_active: Some(false),
		..Default::default()
	};

	global
		.database()
		.update_user(id, update)
		.await?
		.ok_or((StatusCode::NOT_FOUND, "User not found"))?;

	tracing::info!(user_id = %id, admin_id = %auth.user.id, "user deactivated");

	Ok(message_response(StatusCode::OK, "User deleted successfully"))
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> anyhow::Result<Router<Body, RouteError<ApiError>>> {
	Router::builder()
		.get("/users", list::<G>)
		.post("/users", create::<G>)
		.get("/users/:id", get::<G>)
		.patch("/users/:id", update::<G>)
		.delete("/users/:id", delete::<G>)
		.get("/users/:id/permissions", permissions::<G>)
		.build()
		.map_err(|err| anyhow::anyhow!("failed to build admin user routes: {err}"))
}

//! Admin-only CRUD. Every handler checks the admin role itself, after
//! authentication, so anonymous callers see 401 and non-admins 403.

use std::sync::Arc;

use common::http::RouteError;
use hyper::{Body, StatusCode};
use routerify::Router;

use super::error::ApiError;
use crate::database::DatabaseError;
use crate::global::ApiGlobal;

mod permissions;
mod streams;
mod studios;
mod users;

pub fn routes<G: ApiGlobal>(global: &Arc<G>) -> anyhow::Result<Router<Body, RouteError<ApiError>>> {
	Router::builder()
		.scope("/admin", users::routes(global)?)
		.scope("/admin", studios::routes(global)?)
		.scope("/admin", streams::routes(global)?)
		.scope("/admin", permissions::routes(global)?)
		.build()
		.map_err(|err| anyhow::anyhow!("failed to build admin routes: {err}"))
}

/// Maps constraint violations to client errors with the given messages.
fn constraint_error(
	unique: &'static str,
	foreign_key: &'static str,
) -> impl FnOnce(DatabaseError) -> RouteError<ApiError> {
	move |err| match err {
		DatabaseError::UniqueViolation(_) => (StatusCode::CONFLICT, unique, err).into(),
		DatabaseError::ForeignKeyViolation(_) => (StatusCode::BAD_REQUEST, foreign_key, err).into(),
		err => err.into(),
	}
}

use std::sync::Arc;

use common::http::RouteError;
use hyper::http::header;
use hyper::Body;
use routerify::prelude::RequestExt as _;
use routerify::Middleware;

use crate::api::auth::{AuthData, AuthError};
use crate::api::error::ApiError;
use crate::api::ext::RequestExt as _;
use crate::api::request_context::RequestContext;
use crate::global::ApiGlobal;

/// Resolves the bearer token, if any, into the request context. A bad token
/// does not fail the request here; handlers that need a user reject it.
pub fn auth_middleware<G: ApiGlobal>(_: &Arc<G>) -> Middleware<Body, RouteError<ApiError>> {
	Middleware::pre(|req| async move {
		let context = RequestContext::default();
		req.set_context(context.clone());

		let Some(token) = req.headers().get(header::AUTHORIZATION) else {
			// No Authorization header
			return Ok(req);
		};

		let global = req.global::<G>()?;

		let token = match token.to_str() {
			Ok(token) => token.strip_prefix("Bearer ").ok_or(AuthError::NotBearerToken),
			Err(_) => Err(AuthError::HeaderToStr),
		};

		let data = match token {
			Ok(token) => AuthData::from_token(&global, token).await,
			Err(err) => Err(err),
		};

		match data {
			Ok(data) => context.set_auth(data).await,
			Err(err @ AuthError::Fetch(_)) => return Err(err.into()),
			Err(err) => {
				tracing::debug!(path = %req.uri().path(), error = %err, "rejected bearer token");
			}
		}

		Ok(req)
	})
}

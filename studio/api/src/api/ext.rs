use std::sync::Arc;

use common::http::ext::{RequestGlobalExt, ResultExt};
use common::make_response;
use hyper::body::HttpBody;
use hyper::header::CONTENT_LENGTH;
use hyper::{Body, Request, Response, StatusCode};
use routerify::ext::RequestExt as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::auth::AuthData;
use super::error::Result;
use super::request_context::RequestContext;
use crate::global::ApiGlobal;

/// Largest JSON body a handler will read.
pub const MAX_BODY_SIZE: usize = 64 * 1024;

pub trait RequestExt {
	fn global<G: ApiGlobal>(&self) -> Result<Arc<G>>;

	fn request_context(&self) -> RequestContext;

	/// A path parameter parsed as a uuid. Malformed ids are a 400.
	fn uuid_param(&self, name: &str) -> Result<Uuid>;
}

impl RequestExt for Request<Body> {
	fn global<G: ApiGlobal>(&self) -> Result<Arc<G>> {
		self.get_global::<G>()
	}

	fn request_context(&self) -> RequestContext {
		self.context::<RequestContext>().unwrap_or_default()
	}

	fn uuid_param(&self, name: &str) -> Result<Uuid> {
		let raw = self
			.param(name)
			.ok_or((StatusCode::BAD_REQUEST, "Missing id"))?;

		Uuid::parse_str(raw).map_ignore_err_route((StatusCode::BAD_REQUEST, "Invalid id"))
	}
}

pub async fn require_auth(req: &Request<Body>) -> Result<AuthData> {
	Ok(req.request_context().require_auth().await?)
}

pub async fn require_admin(req: &Request<Body>) -> Result<AuthData> {
	Ok(req.request_context().require_admin().await?)
}

/// Reads the body as JSON. Bodies over [`MAX_BODY_SIZE`] are a 413,
/// anything unparsable is a 400.
pub async fn parse_json<T: DeserializeOwned>(req: &mut Request<Body>) -> Result<T> {
	let declared = req
		.headers()
		.get(CONTENT_LENGTH)
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.parse::<usize>().ok());

	if declared.is_some_and(|len| len > MAX_BODY_SIZE) {
		return Err((StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into());
	}

	let mut body = Vec::new();
	while let Some(chunk) = req.body_mut().data().await {
		let chunk = chunk.map_err_route((StatusCode::BAD_REQUEST, "Failed to read request body"))?;

		if body.len() + chunk.len() > MAX_BODY_SIZE {
			return Err((StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into());
		}

		body.extend_from_slice(&chunk);
	}

	serde_json::from_slice::<T>(&body).map_err_route((StatusCode::BAD_REQUEST, "Invalid request body"))
}

pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<Body>> {
	let body = serde_json::to_string(value)
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"))?;

	Ok(make_response!(status, body))
}

pub fn message_response(status: StatusCode, message: &str) -> Response<Body> {
	make_response!(status, json!({ "message": message, "success": true }))
}

/// For nullable fields in partial updates: a missing key stays `None`, an
/// explicit `null` becomes `Some(None)`. Use with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
	T: Deserialize<'de>,
	D: Deserializer<'de>,
{
	Option::<T>::deserialize(deserializer).map(Some)
}

/// Turns a field validator's message into a 400.
pub fn validate<T: ?Sized>(value: &T, check: impl FnOnce(&T) -> std::result::Result<(), &'static str>) -> Result<()> {
	check(value).map_err(|message| (StatusCode::BAD_REQUEST, message).into())
}

/// Blank strings from forms count as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.trim().is_empty())
}

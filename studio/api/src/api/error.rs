use common::http::RouteError;
use hyper::StatusCode;

use super::auth::AuthError;
use crate::catalog::CatalogError;
use crate::database::DatabaseError;

pub type Result<T, E = RouteError<ApiError>> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("failed to read http body: {0}")]
	ReadBody(#[from] hyper::Error),
	#[error("failed to parse json: {0}")]
	Json(#[from] serde_json::Error),
	#[error("auth: {0}")]
	Auth(#[from] AuthError),
	#[error("catalog: {0}")]
	Catalog(#[from] CatalogError),
	#[error("database: {0}")]
	Database(#[from] DatabaseError),
	#[error("password hash: {0}")]
	PasswordHash(argon2::password_hash::Error),
	#[error("blocking task failed: {0}")]
	Join(#[from] tokio::task::JoinError),
}

impl From<argon2::password_hash::Error> for ApiError {
	fn from(err: argon2::password_hash::Error) -> Self {
		Self::PasswordHash(err)
	}
}

impl From<AuthError> for RouteError<ApiError> {
	#[track_caller]
	fn from(err: AuthError) -> Self {
		let (status, message) = match &err {
			AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
			AuthError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden: Admin access required"),
			AuthError::Fetch(_) | AuthError::Blocking(_) | AuthError::Sign => {
				(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
			}
			AuthError::HeaderToStr
			| AuthError::NotBearerToken
			| AuthError::NotLoggedIn
			| AuthError::InvalidToken
			| AuthError::Inactive => (StatusCode::UNAUTHORIZED, "Unauthorized"),
		};

		(status, message, err).into()
	}
}

impl From<CatalogError> for RouteError<ApiError> {
	#[track_caller]
	fn from(err: CatalogError) -> Self {
		match err {
			CatalogError::Forbidden(message) => (StatusCode::FORBIDDEN, message).into(),
			CatalogError::NotFound(message) => (StatusCode::NOT_FOUND, message).into(),
			CatalogError::Database(err) => err.into(),
		}
	}
}

impl From<DatabaseError> for RouteError<ApiError> {
	#[track_caller]
	fn from(err: DatabaseError) -> Self {
		let (status, message) = match &err {
			DatabaseError::UniqueViolation(_) => (StatusCode::CONFLICT, "Resource already exists"),
			DatabaseError::ForeignKeyViolation(_) => (StatusCode::BAD_REQUEST, "Referenced resource does not exist"),
			DatabaseError::Sqlx(_) | DatabaseError::Migrate(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
		};

		(status, message, err).into()
	}
}

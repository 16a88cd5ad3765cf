use std::sync::Arc;

use once_cell::sync::Lazy;

use super::jwt::{AuthJwtPayload, JwtState};
use crate::config::JwtConfig;
use crate::database::{verify_hash, Database, DatabaseError, User};
use crate::global::ApiGlobal;

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
	#[error("token must be ascii only")]
	HeaderToStr,
	#[error("token must be a bearer token")]
	NotBearerToken,
	/// The user is not logged in
	#[error("not logged in")]
	NotLoggedIn,
	#[error("invalid token")]
	InvalidToken,
	#[error("invalid credentials")]
	InvalidCredentials,
	#[error("user is inactive")]
	Inactive,
	#[error("admin role required")]
	Forbidden,
	#[error("failed to fetch user: {0}")]
	Fetch(#[from] DatabaseError),
	#[error("failed to sign token")]
	Sign,
	#[error("password task failed: {0}")]
	Blocking(#[from] tokio::task::JoinError),
}

/// Who is making the request, resolved fresh from the store for every
/// request so deactivation takes effect immediately.
#[derive(Debug, Clone)]
pub struct AuthData {
	pub user: User,
}

impl AuthData {
	pub async fn from_token<G: ApiGlobal>(global: &Arc<G>, token: &str) -> Result<Self, AuthError> {
		let jwt = AuthJwtPayload::verify(global.config::<JwtConfig>(), token).ok_or(AuthError::InvalidToken)?;

		Self::from_user_id(global.database().as_ref(), jwt.user_id).await
	}

	pub async fn from_user_id(db: &dyn Database, user_id: uuid::Uuid) -> Result<Self, AuthError> {
		let user = db.user_by_id(user_id).await?.ok_or(AuthError::InvalidToken)?;

		if !user.is_active {
			return Err(AuthError::Inactive);
		}

		Ok(Self { user })
	}

	pub fn require_admin(&self) -> Result<(), AuthError> {
		if self.user.is_admin() {
			Ok(())
		} else {
			Err(AuthError::Forbidden)
		}
	}
}

/// Verified against when the user is unknown or inactive so every failed
/// login costs one argon2 verification.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
	User::hash_password("studio-dummy-password").unwrap_or_else(|err| {
		tracing::error!(error = %err, "failed to build dummy password hash");
		String::new()
	})
});

/// Builds the dummy hash ahead of the first login so that the first miss
/// costs no more than any other.
pub async fn prepare_login() -> Result<(), AuthError> {
	tokio::task::spawn_blocking(|| {
		Lazy::force(&DUMMY_HASH);
	})
	.await?;

	Ok(())
}

/// Checks the credentials and issues a session token.
pub async fn login(db: &dyn Database, config: &JwtConfig, username: &str, password: &str) -> Result<(String, User), AuthError> {
	let user = db.user_by_username(username).await?.filter(|u| u.is_active);

	let hash = user
		.as_ref()
		.map(|u| u.password_hash.clone())
		.unwrap_or_else(|| DUMMY_HASH.clone());

	let valid = check_password(hash, password.to_owned()).await?;

	let user = match user {
		Some(user) if valid => user,
		_ => return Err(AuthError::InvalidCredentials),
	};

	let token = AuthJwtPayload::new(user.id, config)
		.and_then(|payload| payload.serialize(config))
		.ok_or(AuthError::Sign)?;

	tracing::info!(user_id = %user.id, "user logged in");

	Ok((token, user))
}

/// Runs the argon2 verification off the async workers.
pub async fn check_password(hash: String, password: String) -> Result<bool, AuthError> {
	Ok(tokio::task::spawn_blocking(move || verify_hash(&hash, &password)).await?)
}

/// Hashes a password off the async workers.
pub async fn hash_password(password: String) -> Result<String, super::error::ApiError> {
	Ok(tokio::task::spawn_blocking(move || User::hash_password(&password)).await??)
}

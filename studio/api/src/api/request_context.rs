use std::sync::Arc;

use tokio::sync::RwLock;

use super::auth::{AuthData, AuthError};

#[derive(Default, Clone)]
pub struct ContextData {
	pub auth: Option<AuthData>,
}

/// Per-request state filled in by the middlewares.
#[derive(Default, Clone)]
pub struct RequestContext(Arc<RwLock<ContextData>>);

impl RequestContext {
	pub async fn set_auth(&self, data: AuthData) {
		let mut guard = self.0.write().await;
		guard.auth = Some(data);
	}

	pub async fn auth(&self) -> Option<AuthData> {
		self.0.read().await.auth.clone()
	}

	/// The authenticated caller, or [`AuthError::NotLoggedIn`].
	pub async fn require_auth(&self) -> Result<AuthData, AuthError> {
		self.auth().await.ok_or(AuthError::NotLoggedIn)
	}

	/// The authenticated caller if they are an admin. Authentication is
	/// checked first so anonymous callers get 401, not 403.
	pub async fn require_admin(&self) -> Result<AuthData, AuthError> {
		let auth = self.require_auth().await?;
		auth.require_admin()?;
		Ok(auth)
	}
}

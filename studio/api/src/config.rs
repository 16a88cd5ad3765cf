use std::net::SocketAddr;

use common::config::TlsConfig;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Bind address for the API
	pub bind_address: SocketAddr,

	/// If we should use TLS for the API server
	pub tls: Option<TlsConfig>,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			bind_address: SocketAddr::from(([0u16; 8], 5000)),
			tls: None,
		}
	}
}

/// Upper bound for `jwt.expiry`, ten years in seconds.
pub const MAX_JWT_EXPIRY: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct JwtConfig {
	/// HMAC-SHA256 signing secret, must be set
	pub secret: String,

	/// JWT issuer
	pub issuer: String,

	/// Token lifetime in seconds
	pub expiry: u64,
}

impl Default for JwtConfig {
	fn default() -> Self {
		Self {
			secret: String::new(),
			issuer: "studio".to_string(),
			expiry: 24 * 60 * 60,
		}
	}
}

/// An admin account created at startup when no user of that name exists.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BootstrapAdminConfig {
	pub username: String,
	pub password: String,
	pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExtConfig {
	/// The API configuration
	pub api: ApiConfig,

	/// The JWT configuration
	pub jwt: JwtConfig,

	/// Admin account to ensure at startup
	pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

impl binary_helper::config::ConfigExtention for ExtConfig {
	const APP_NAME: &'static str = "studio-api";

	fn pre_hook(config: &mut AppConfig) -> anyhow::Result<()> {
		if config.extra.jwt.secret.is_empty() {
			anyhow::bail!("jwt.secret must be set");
		}

		if config.extra.jwt.expiry == 0 {
			anyhow::bail!("jwt.expiry must be greater than zero");
		}

		if config.extra.jwt.expiry > MAX_JWT_EXPIRY {
			anyhow::bail!("jwt.expiry must be at most {MAX_JWT_EXPIRY} seconds (10 years)");
		}

		Ok(())
	}
}

pub type AppConfig = binary_helper::config::AppConfig<ExtConfig>;

use std::time::Duration;

use anyhow::Context as _;
use common::config::DatabaseConfig;
use common::context::Context;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

/// Implements [`GlobalCtx`] and [`GlobalConfig`] for a struct with a `ctx` field.
#[macro_export]
macro_rules! impl_global_traits {
	($struct:ty) => {
		impl binary_helper::global::GlobalCtx for $struct {
			#[inline(always)]
			fn ctx(&self) -> &common::context::Context {
				&self.ctx
			}
		}

		impl binary_helper::global::GlobalConfig for $struct {}
	};
}

pub trait GlobalCtx {
	fn ctx(&self) -> &Context;
}

pub trait GlobalConfig {
	#[inline(always)]
	fn config<C>(&self) -> &C
	where
		Self: GlobalConfigProvider<C>,
	{
		GlobalConfigProvider::provide_config(self)
	}
}

pub trait GlobalConfigProvider<C> {
	fn provide_config(&self) -> &C;
}

/// Builds the connect options for `config`, without connecting.
pub fn database_options(config: &DatabaseConfig) -> anyhow::Result<PgConnectOptions> {
	let mut options = config.uri.parse::<PgConnectOptions>().context("invalid database uri")?;

	if let Some(tls) = &config.tls {
		options = options
			.ssl_mode(PgSslMode::VerifyFull)
			.ssl_client_cert(&tls.cert)
			.ssl_client_key(&tls.key);

		if let Some(ca_cert) = &tls.ca_cert {
			options = options.ssl_root_cert(ca_cert);
		}
	}

	Ok(options)
}

pub async fn setup_database(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
	let options = database_options(config)?;

	PgPoolOptions::new()
		.max_connections(config.max_connections)
		.acquire_timeout(Duration::from_secs(5))
		.connect_with(options)
		.await
		.context("failed to connect to database")
}

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use binary_helper::global::setup_database;
use binary_helper::{bootstrap, impl_global_traits};
use common::context::Context;
use studio_api::config::{ApiConfig, AppConfig, JwtConfig};
use studio_api::database::{Database, PgDatabase};

struct GlobalState {
	ctx: Context,
	config: AppConfig,
	database: Arc<dyn Database>,
	started_at: Instant,
}

impl_global_traits!(GlobalState);

impl binary_helper::global::GlobalConfigProvider<ApiConfig> for GlobalState {
	#[inline(always)]
	fn provide_config(&self) -> &ApiConfig {
		&self.config.extra.api
	}
}

impl binary_helper::global::GlobalConfigProvider<JwtConfig> for GlobalState {
	#[inline(always)]
	fn provide_config(&self) -> &JwtConfig {
		&self.config.extra.jwt
	}
}

impl studio_api::global::ApiState for GlobalState {
	#[inline(always)]
	fn database(&self) -> &Arc<dyn Database> {
		&self.database
	}

	#[inline(always)]
	fn started_at(&self) -> Instant {
		self.started_at
	}
}

impl binary_helper::Global<AppConfig> for GlobalState {
	async fn new(ctx: Context, config: AppConfig) -> anyhow::Result<Self> {
		let pool = setup_database(&config.database).await?;

		let database = PgDatabase::new(pool);
		database.migrate().await.context("failed to run migrations")?;

		studio_api::api::auth::prepare_login()
			.await
			.context("failed to prepare login")?;

		if let Some(admin) = &config.extra.bootstrap_admin {
			studio_api::seed::ensure_admin(&database, admin)
				.await
				.context("failed to ensure bootstrap admin")?;
		}

		Ok(Self {
			ctx,
			config,
			database: Arc::new(database),
			started_at: Instant::now(),
		})
	}
}

#[tokio::main]
pub async fn main() {
	if let Err(err) = bootstrap::<AppConfig, GlobalState, _>(|global| async move {
		studio_api::api::run(global).await.context("api server stopped unexpectedly")
	})
	.await
	{
		tracing::error!("{:#}", err);
		std::process::exit(1);
	}
}

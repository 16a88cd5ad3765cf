//! Loads the demo users, studios, streams and grants into the configured
//! database.

use anyhow::Context as _;
use binary_helper::config::{AppConfig, ConfigExtention};
use binary_helper::global::setup_database;
use binary_helper::Config;
use common::logging;
use studio_api::database::PgDatabase;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct SeedConfig {}

impl ConfigExtention for SeedConfig {
	const APP_NAME: &'static str = "studio-seed";
}

async fn seed() -> anyhow::Result<()> {
	let mut config = AppConfig::<SeedConfig>::parse().context("failed to parse config")?;
	config.pre_hook()?;

	logging::init(&config.logging.level, config.logging.mode).context("failed to init logging")?;

	let database = PgDatabase::new(setup_database(&config.database).await?);
	database.migrate().await.context("failed to run migrations")?;

	let report = studio_api::seed::seed_demo(&database).await?;

	tracing::info!(
		users = report.users,
		studios = report.studios,
		streams = report.streams,
		"seeding complete, demo logins are admin/admin123, operator/operator123 and viewer/viewer123"
	);

	Ok(())
}

#[tokio::main]
pub async fn main() {
	if let Err(err) = seed().await {
		// Logging may not be up yet.
		eprintln!("{err:#}");
		std::process::exit(1);
	}
}

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use common::context::Context;
use common::{logging, signal};
use tokio::signal::unix::SignalKind;
use tokio::{select, time};
pub use traits::{Config, Global};

pub mod config;
pub mod global;
pub mod traits;

/// How long running tasks get to finish after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(60);

/// Parses the config, sets up logging and the global state, then runs
/// `process` until it exits or the process receives SIGINT/SIGTERM.
pub async fn bootstrap<C: Config, G: Global<C>, F: Future<Output = anyhow::Result<()>> + Send + 'static>(
	process: impl FnOnce(Arc<G>) -> F,
) -> anyhow::Result<()> {
	let (ctx, handler) = Context::new();

	let config = C::parse()
		.and_then(|mut config| {
			config.pre_hook()?;
			Ok(config)
		})
		.map_err(|err| {
			// Best effort so the failure below is visible.
			let _ = logging::init("info", Default::default());
			err
		})
		.context("failed to parse config")?;

	logging::init(&config.logging().level, config.logging().mode).context("failed to init logging")?;

	tracing::info!(name = config.name(), "starting up");

	let global = Arc::new(G::new(ctx, config).await.context("failed to create global state")?);

	tracing::debug!("global state created, starting process");

	let process_future = tokio::spawn(process(global));

	let mut signal_handler = signal::SignalHandler::new()
		.with_signal(SignalKind::interrupt())
		.and_then(|s| s.with_signal(SignalKind::terminate()))
		.context("failed to install signal handlers")?;

	let result = select! {
		_ = signal_handler.recv() => {
			tracing::info!("shutting down");
			Ok(())
		}
		r = process_future => {
			let r = match r {
				Ok(r) => r,
				Err(err) => Err(anyhow::Error::new(err).context("process panicked")),
			};
			match &r {
				Ok(()) => tracing::warn!("process exited"),
				Err(err) => tracing::error!("process stopped unexpectedly: {:#}", err),
			}
			r
		}
	};

	tracing::info!("waiting for tasks to finish");

	select! {
		_ = time::sleep(SHUTDOWN_GRACE) => tracing::warn!("force shutting down"),
		_ = signal_handler.recv() => tracing::warn!("force shutting down"),
		_ = handler.cancel() => tracing::info!("shutdown complete"),
	}

	result
}

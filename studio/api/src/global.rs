use std::sync::Arc;
use std::time::Instant;

use binary_helper::global::{GlobalConfig, GlobalConfigProvider, GlobalCtx};

use crate::config::{ApiConfig, JwtConfig};
use crate::database::Database;

pub trait ApiState {
	fn database(&self) -> &Arc<dyn Database>;

	/// When the process started serving, reported by the health probe.
	fn started_at(&self) -> Instant;
}

pub trait ApiGlobal:
	GlobalCtx
	+ GlobalConfigProvider<ApiConfig>
	+ GlobalConfigProvider<JwtConfig>
	+ GlobalConfig
	+ ApiState
	+ Send
	+ Sync
	+ 'static
{
}

impl<T> ApiGlobal for T where
	T: GlobalCtx
		+ GlobalConfigProvider<ApiConfig>
		+ GlobalConfigProvider<JwtConfig>
		+ GlobalConfig
		+ ApiState
		+ Send
		+ Sync
		+ 'static
{
}

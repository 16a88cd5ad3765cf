use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tokio::time::Instant;

/// Why a [`Context`] finished.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CancelReason {
	Deadline,
	Cancel,
}

impl std::fmt::Display for CancelReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Deadline => write!(f, "deadline"),
			Self::Cancel => write!(f, "cancel"),
		}
	}
}

struct Inner {
	// Dropped together with the last context clone, which wakes the handler.
	_alive: oneshot::Sender<()>,
	deadline: Option<Instant>,
	cancel: broadcast::Receiver<()>,
}

/// A cloneable shutdown token handed to long running tasks.
#[derive(Clone)]
pub struct Context(Arc<Inner>);

/// The owning side of a [`Context`].
pub struct Handler {
	alive: oneshot::Receiver<()>,
	cancel: broadcast::Sender<()>,
}

impl Context {
	#[must_use]
	pub fn new() -> (Self, Handler) {
		Self::build(None)
	}

	#[must_use]
	pub fn with_timeout(timeout: Duration) -> (Self, Handler) {
		Self::build(Some(Instant::now() + timeout))
	}

	fn build(deadline: Option<Instant>) -> (Self, Handler) {
		let (alive_tx, alive_rx) = oneshot::channel();
		let (cancel_tx, cancel_rx) = broadcast::channel(1);

		(
			Self(Arc::new(Inner {
				_alive: alive_tx,
				deadline,
				cancel: cancel_rx,
			})),
			Handler {
				alive: alive_rx,
				cancel: cancel_tx,
			},
		)
	}

	/// Resolves once the handler cancels or the deadline passes.
	pub async fn done(&self) -> CancelReason {
		let mut cancel = self.0.cancel.resubscribe();

		match self.0.deadline {
			Some(deadline) => {
				tokio::select! {
					_ = tokio::time::sleep_until(deadline) => CancelReason::Deadline,
					_ = cancel.recv() => CancelReason::Cancel,
				}
			}
			None => {
				let _ = cancel.recv().await;
				CancelReason::Cancel
			}
		}
	}
}

impl Handler {
	/// Waits until every context clone has been dropped.
	pub async fn done(&mut self) {
		let _ = (&mut self.alive).await;
	}

	/// Signals all contexts and waits for them to be dropped.
	pub async fn cancel(self) {
		drop(self.cancel);

		let _ = self.alive.await;
	}
}

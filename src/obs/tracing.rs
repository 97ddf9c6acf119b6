// self
use crate::codec::Variant;

/// Lifecycle events worth reporting; hot-path failures are deliberately absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
	/// A codec finished construction.
	CodecBuilt {
		/// Locked-in variant.
		variant: Variant,
		/// Signature length in bytes.
		digest_len: usize,
		/// Free-list bound of the MAC pool.
		pool_capacity: usize,
	},
	/// The clock refresher began ticking.
	ClockStarted {
		/// Expiration window in seconds.
		window_secs: i64,
	},
	/// The clock refresher stopped; cached time is frozen.
	ClockStopped {
		/// Last published epoch second.
		last_tick: i64,
	},
	/// The MAC pool missed and cloned a fresh context.
	PoolGrew,
}

/// Emits a lifecycle event through `tracing` (when enabled).
pub fn record_lifecycle(event: LifecycleEvent) {
	#[cfg(feature = "tracing")]
	{
		match event {
			LifecycleEvent::CodecBuilt { variant, digest_len, pool_capacity } => tracing::debug!(
				variant = variant.as_str(),
				digest_len,
				pool_capacity,
				"token codec built"
			),
			LifecycleEvent::ClockStarted { window_secs } =>
				tracing::debug!(window_secs, "clock refresher started"),
			LifecycleEvent::ClockStopped { last_tick } =>
				tracing::debug!(last_tick, "clock refresher stopped"),
			LifecycleEvent::PoolGrew => tracing::trace!("mac pool miss; cloned keyed context"),
		}
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = event;
	}
}

/// Runs `body` with a thread-scoped subscriber that hands every event to `hook`.
#[cfg(all(test, feature = "tracing"))]
pub(crate) fn with_event_hook<F, R>(hook: F, body: impl FnOnce() -> R) -> R
where
	F: 'static + Send + Sync + Fn(&tracing::Event<'_>),
{
	tracing::subscriber::with_default(EventHook(hook), body)
}

#[cfg(all(test, feature = "tracing"))]
struct EventHook<F>(F);
#[cfg(all(test, feature = "tracing"))]
impl<F> tracing::Subscriber for EventHook<F>
where
	F: 'static + Send + Sync + Fn(&tracing::Event<'_>),
{
	fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
		true
	}

	fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
		tracing::span::Id::from_u64(1)
	}

	fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

	fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

	fn event(&self, event: &tracing::Event<'_>) {
		(self.0)(event);
	}

	fn enter(&self, _: &tracing::span::Id) {}

	fn exit(&self, _: &tracing::span::Id) {}
}

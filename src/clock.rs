//! Background-refreshed wall clock with one-second resolution.
//!
//! Hot-path operations read the cached epoch second (and the expiration deadline derived from it)
//! with a single atomic load instead of asking the OS for the time. A dedicated thread republishes
//! both values once per second until [`ClockCache::stop`] is called or the cache is dropped.

// std
use std::{
	sync::atomic::{AtomicI64, Ordering},
	thread::{self, JoinHandle},
	time::Duration as StdDuration,
};
// crates.io
use parking_lot::Condvar;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	obs::{self, LifecycleEvent},
};

const TICK: StdDuration = StdDuration::from_secs(1);

/// Cached current time plus the absolute deadline for tokens issued "now".
#[derive(Debug)]
pub struct ClockCache {
	state: Arc<ClockState>,
	worker: Mutex<Option<JoinHandle<()>>>,
}
impl ClockCache {
	/// Creates a cache for the given expiration window, publishing the current time once.
	///
	/// The refresher is not running until [`ClockCache::start`] is called. The window must be a
	/// whole number of seconds, at least one.
	pub fn new(window: Duration) -> Result<Self, ConfigError> {
		if window < Duration::SECOND {
			return Err(ConfigError::NonPositiveWindow);
		}
		if window.subsec_nanoseconds() != 0 {
			return Err(ConfigError::FractionalWindow);
		}

		let window_secs = window.whole_seconds();
		let state = Arc::new(ClockState {
			now: AtomicI64::new(0),
			deadline: AtomicI64::new(0),
			window_secs,
			stopped: Mutex::new(false),
			signal: Condvar::new(),
		});

		state.refresh();

		Ok(Self { state, worker: Mutex::new(None) })
	}

	/// Creates a cache and starts its refresher.
	pub fn started(window: Duration) -> Result<Self, ConfigError> {
		let clock = Self::new(window)?;

		clock.start()?;

		Ok(clock)
	}

	/// Publishes the current time and spawns the once-per-second refresher.
	///
	/// Calling `start` on a running cache is a no-op. A stopped cache stays stopped.
	pub fn start(&self) -> Result<(), ConfigError> {
		let mut worker = self.worker.lock();

		if worker.is_some() || *self.state.stopped.lock() {
			return Ok(());
		}

		self.state.refresh();

		let state = self.state.clone();
		let handle = thread::Builder::new()
			.name("fst-clock".into())
			.spawn(move || state.run())
			.map_err(|source| ConfigError::ClockSpawn { source })?;

		*worker = Some(handle);

		obs::record_lifecycle(LifecycleEvent::ClockStarted { window_secs: self.state.window_secs });

		Ok(())
	}

	/// Stops the refresher. Idempotent and callable from any thread.
	///
	/// Afterwards [`ClockCache::now`] keeps returning the last published value.
	pub fn stop(&self) {
		{
			let mut stopped = self.state.stopped.lock();

			if *stopped {
				return;
			}

			*stopped = true;
		}

		self.state.signal.notify_all();

		let Some(handle) = self.worker.lock().take() else {
			return;
		};

		if handle.thread().id() != thread::current().id() {
			let _ = handle.join();
		}

		obs::record_lifecycle(LifecycleEvent::ClockStopped { last_tick: self.now() });
	}

	/// Returns `true` while the refresher thread is alive.
	pub fn is_running(&self) -> bool {
		self.worker.lock().as_ref().is_some_and(|handle| !handle.is_finished())
	}

	/// Most recently cached epoch second.
	pub fn now(&self) -> i64 {
		self.state.now.load(Ordering::Acquire)
	}

	/// Absolute deadline (epoch seconds) for a token issued at [`ClockCache::now`].
	pub fn deadline(&self) -> i64 {
		self.state.deadline.load(Ordering::Acquire)
	}

	/// Expiration window the deadline is derived from.
	pub fn window(&self) -> Duration {
		Duration::seconds(self.state.window_secs)
	}

	#[cfg(test)]
	pub(crate) fn publish(&self, now: i64) {
		self.state.publish(now);
	}
}
impl Drop for ClockCache {
	fn drop(&mut self) {
		self.stop();
	}
}

#[derive(Debug)]
struct ClockState {
	now: AtomicI64,
	deadline: AtomicI64,
	window_secs: i64,
	stopped: Mutex<bool>,
	signal: Condvar,
}
impl ClockState {
	fn run(&self) {
		let mut stopped = self.stopped.lock();

		while !*stopped {
			self.signal.wait_for(&mut stopped, TICK);

			if *stopped {
				break;
			}

			self.refresh();
		}
	}

	fn refresh(&self) {
		self.publish(OffsetDateTime::now_utc().unix_timestamp());
	}

	fn publish(&self, now: i64) {
		// Deadline first: a reader never sees a fresh `now` paired with a stale deadline.
		self.deadline.store(now.saturating_add(self.window_secs), Ordering::Release);
		self.now.store(now, Ordering::Release);
	}
}

//! Bounded pool of keyed MAC contexts.
//!
//! Every context is cloned from a prototype keyed once at construction, so a pool miss costs a
//! copy of the precomputed key state rather than a fresh key schedule. Checkout happens through
//! [`MacGuard`], which resets the context and returns it on drop, including early-return and
//! unwinding paths.

// std
use std::ops::{Deref, DerefMut};
// crates.io
use hmac::{
	Mac,
	digest::{FixedOutputReset, KeyInit},
};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	obs::{self, LifecycleEvent},
};

/// Default free-list bound.
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Keyed-hash algorithms the codec can sign with (for example `Hmac<Sha256>`).
pub trait MacAlgorithm
where
	Self: 'static + Clone + Send + Sync + Mac + KeyInit + FixedOutputReset,
{
}
impl<M> MacAlgorithm for M where M: 'static + Clone + Send + Sync + Mac + KeyInit + FixedOutputReset {}

/// Pool of MAC contexts bound to one key and one algorithm.
pub struct MacPool<M>
where
	M: MacAlgorithm,
{
	prototype: M,
	free: Mutex<Vec<M>>,
	capacity: usize,
}
impl<M> MacPool<M>
where
	M: MacAlgorithm,
{
	/// Keys a prototype context with `key` and prepares an empty free list.
	pub fn new(key: &[u8], capacity: usize) -> Result<Self, ConfigError> {
		if capacity == 0 {
			return Err(ConfigError::ZeroPoolCapacity);
		}

		let prototype = <M as Mac>::new_from_slice(key).map_err(|_| ConfigError::InvalidKey)?;

		Ok(Self { prototype, free: Mutex::new(Vec::with_capacity(capacity)), capacity })
	}

	/// Checks out a reset context, cloning the prototype on a miss.
	pub fn acquire(&self) -> MacGuard<'_, M> {
		// Release the free-list lock before a miss clones or reports anything.
		let cached = self.free.lock().pop();
		let mac = match cached {
			Some(mac) => mac,
			None => {
				obs::record_lifecycle(LifecycleEvent::PoolGrew);

				self.prototype.clone()
			},
		};

		MacGuard { pool: self, mac: Some(mac) }
	}

	/// Resets `mac` and returns it to the free list; drops it if the list is full.
	pub fn release(&self, mut mac: M) {
		Mac::reset(&mut mac);

		let mut free = self.free.lock();

		if free.len() < self.capacity {
			free.push(mac);
		}
	}

	/// Contexts currently idle in the free list.
	pub fn idle(&self) -> usize {
		self.free.lock().len()
	}

	/// Free-list bound.
	pub fn capacity(&self) -> usize {
		self.capacity
	}
}
impl<M> Debug for MacPool<M>
where
	M: MacAlgorithm,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MacPool")
			.field("idle", &self.idle())
			.field("capacity", &self.capacity)
			.finish_non_exhaustive()
	}
}

/// Exclusive checkout of one pooled context.
pub struct MacGuard<'a, M>
where
	M: MacAlgorithm,
{
	pool: &'a MacPool<M>,
	mac: Option<M>,
}
impl<M> Deref for MacGuard<'_, M>
where
	M: MacAlgorithm,
{
	type Target = M;

	fn deref(&self) -> &Self::Target {
		self.mac.as_ref().unwrap_or(&self.pool.prototype)
	}
}
impl<M> DerefMut for MacGuard<'_, M>
where
	M: MacAlgorithm,
{
	fn deref_mut(&mut self) -> &mut Self::Target {
		let pool = self.pool;

		self.mac.get_or_insert_with(|| pool.prototype.clone())
	}
}
impl<M> Drop for MacGuard<'_, M>
where
	M: MacAlgorithm,
{
	fn drop(&mut self) {
		if let Some(mac) = self.mac.take() {
			self.pool.release(mac);
		}
	}
}
impl<M> Debug for MacGuard<'_, M>
where
	M: MacAlgorithm,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("MacGuard(..)")
	}
}

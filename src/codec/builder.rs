//! Builder API for assembling token codecs.

// std
use std::marker::PhantomData;
// crates.io
use hmac::digest::OutputSizeUser;
// self
use crate::{
	_prelude::*,
	clock::ClockCache,
	codec::{HmacSha256, Scheme, TokenCodec},
	config::CodecConfig,
	error::ConfigError,
	key::Secret,
	obs::{self, LifecycleEvent},
	pool::{DEFAULT_POOL_CAPACITY, MacAlgorithm, MacPool},
	varlen,
};

/// Builder for [`TokenCodec`] values.
///
/// The variant is derived from which of [`postfix`](Self::postfix) and
/// [`expiration`](Self::expiration) are set, and cannot change after [`build`](Self::build).
pub struct TokenCodecBuilder<M = HmacSha256> {
	secret_key: Option<Secret>,
	postfix: Option<Secret>,
	expiration: Option<Duration>,
	pool_capacity: usize,
	algorithm: PhantomData<fn() -> M>,
}
impl<M> TokenCodecBuilder<M> {
	/// Creates an empty builder for algorithm `M`.
	pub fn new() -> Self {
		Self {
			secret_key: None,
			postfix: None,
			expiration: None,
			pool_capacity: DEFAULT_POOL_CAPACITY,
			algorithm: PhantomData,
		}
	}

	/// Switches the keyed-hash algorithm, keeping every other setting.
	pub fn algorithm<N>(self) -> TokenCodecBuilder<N> {
		TokenCodecBuilder {
			secret_key: self.secret_key,
			postfix: self.postfix,
			expiration: self.expiration,
			pool_capacity: self.pool_capacity,
			algorithm: PhantomData,
		}
	}

	/// Sets the signing key.
	pub fn secret_key(mut self, key: impl Into<Secret>) -> Self {
		self.secret_key = Some(key.into());

		self
	}

	/// Mixes a postfix secret into every signature.
	///
	/// An empty postfix still selects a postfixed variant.
	pub fn postfix(mut self, postfix: impl Into<Secret>) -> Self {
		self.postfix = Some(postfix.into());

		self
	}

	/// Embeds a deadline `window` after issuance into every token.
	///
	/// The window must be a whole number of seconds (at least one); anything else fails
	/// [`build`](Self::build) instead of being rounded.
	pub fn expiration(mut self, window: Duration) -> Self {
		self.expiration = Some(window);

		self
	}

	/// Overrides the MAC context free-list bound.
	pub fn pool_capacity(mut self, capacity: usize) -> Self {
		self.pool_capacity = capacity;

		self
	}

	/// Applies every option present in `config`.
	pub fn with_config(mut self, config: CodecConfig) -> Result<Self, ConfigError> {
		if let Some(window) = config.expiration()? {
			self.expiration = Some(window);
		}
		if let Some(key) = config.secret_key {
			self.secret_key = Some(key);
		}
		if let Some(postfix) = config.postfix {
			self.postfix = Some(postfix);
		}
		if let Some(capacity) = config.pool_capacity {
			self.pool_capacity = capacity;
		}

		Ok(self)
	}

	/// Validates the settings and produces a codec; starts the clock for expiring variants.
	pub fn build(self) -> Result<TokenCodec<M>, ConfigError>
	where
		M: MacAlgorithm,
	{
		let secret_key =
			self.secret_key.filter(|key| !key.is_empty()).ok_or(ConfigError::MissingSecretKey)?;
		let digest_len = <M as OutputSizeUser>::output_size();
		let prefix = varlen::encode(digest_len)
			.map_err(|_| ConfigError::UnsupportedDigest { len: digest_len })?;
		let pool = MacPool::new(secret_key.expose(), self.pool_capacity)?;
		let clock = self.expiration.map(ClockCache::started).transpose()?;
		let codec = TokenCodec::assemble(secret_key, Scheme::new(clock, self.postfix), pool, prefix);

		obs::record_lifecycle(LifecycleEvent::CodecBuilt {
			variant: codec.variant(),
			digest_len,
			pool_capacity: self.pool_capacity,
		});

		Ok(codec)
	}
}
impl<M> Default for TokenCodecBuilder<M> {
	fn default() -> Self {
		Self::new()
	}
}
impl<M> Debug for TokenCodecBuilder<M> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCodecBuilder")
			.field("secret_key", &self.secret_key)
			.field("postfix", &self.postfix)
			.field("expiration", &self.expiration)
			.field("pool_capacity", &self.pool_capacity)
			.finish()
	}
}

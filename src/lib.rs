//! Fast Signed Tokens: compact HMAC-signed binary tokens that carry any payload, issued and
//! verified with pooled MAC contexts and a cached clock so the hot path stays allocation-light and
//! syscall-free.
//!
//! ```
//! use fast_signed_tokens::codec::TokenCodec;
//!
//! let codec = TokenCodec::builder().secret_key("secret").build()?;
//! let token = codec.encode(b"token");
//!
//! assert_eq!(codec.decode(&token)?, b"token");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod key;
pub mod obs;
pub mod pool;
pub mod text;
pub mod varlen;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// self
	use crate::codec::{TokenCodec, Variant};

	/// Signing key used by fixture codecs.
	pub const SECRET: &[u8] = b"fst-signing-key";
	/// Postfix used by postfixed fixture codecs.
	pub const POSTFIX: &[u8] = b"fst-postfix";
	/// Expiration window used by expiring fixture codecs.
	pub const WINDOW: Duration = Duration::minutes(5);

	/// Builds `len` bytes repeating `TOKEN`.
	pub fn sample_payload(len: usize) -> Vec<u8> {
		b"TOKEN".iter().copied().cycle().take(len).collect()
	}

	/// Builds a default-algorithm codec locked into `variant` using the fixture secrets.
	pub fn codec_for(variant: Variant) -> TokenCodec {
		let mut builder = TokenCodec::builder().secret_key(SECRET);

		if variant.is_postfixed() {
			builder = builder.postfix(POSTFIX);
		}
		if variant.is_expiring() {
			builder = builder.expiration(WINDOW);
		}

		builder.build().expect("Fixture codec should build.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

pub use hmac;
pub use sha2;
#[cfg(test)] use color_eyre as _;

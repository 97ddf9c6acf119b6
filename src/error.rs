//! Codec-level error types shared by token issuance, verification, and configuration.

// self
use crate::{_prelude::*, varlen::LengthError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by public APIs.
///
/// [`Error::MalformedToken`], [`Error::InvalidSignature`], and [`Error::Expired`] are all
/// rejections of the presented token. Callers should answer every one of them the same way so
/// the presenter cannot tell a forged token from a stale one; see [`Error::is_rejection`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token is structurally invalid (too short, or the length prefix overruns the buffer).
	#[error("Token is malformed.")]
	MalformedToken,
	/// Signature does not match the payload under this codec's key and variant.
	#[error("Token signature is invalid.")]
	InvalidSignature,
	/// Embedded deadline lies before the cached current time.
	#[error("Token has expired.")]
	Expired,
	/// Text token could not be decoded from base64.
	#[error("Token text is not valid base64.")]
	Base64Decode(#[from] base64::DecodeError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Returns `true` for the failures that mean "reject this token".
	pub const fn is_rejection(&self) -> bool {
		matches!(self, Self::MalformedToken | Self::InvalidSignature | Self::Expired)
	}
}
impl From<LengthError> for Error {
	fn from(_: LengthError) -> Self {
		Self::MalformedToken
	}
}

/// Configuration and validation failures raised while building a codec.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// No secret key (or an empty one) was supplied.
	#[error("A non-empty secret key is required.")]
	MissingSecretKey,
	/// The keyed-hash algorithm refused the key length.
	#[error("Secret key length is not accepted by the MAC algorithm.")]
	InvalidKey,
	/// Expiration window shorter than the one-second clock resolution.
	#[error("Expiration window must be at least one second.")]
	NonPositiveWindow,
	/// Expiration window with a sub-second remainder.
	#[error("Expiration window must be a whole number of seconds.")]
	FractionalWindow,
	/// Expiration window cannot be expressed in epoch seconds.
	#[error("Expiration window exceeds the supported range.")]
	WindowOutOfRange,
	/// Digest length does not fit the signature-length prefix.
	#[error("Digest length {len} exceeds the signature-length prefix range.")]
	UnsupportedDigest {
		/// Digest length produced by the algorithm.
		len: usize,
	},
	/// MAC pool capacity of zero.
	#[error("MAC pool capacity must be positive.")]
	ZeroPoolCapacity,
	/// Background clock refresher could not be spawned.
	#[error("Clock refresher thread could not be spawned.")]
	ClockSpawn {
		/// Underlying spawn failure.
		#[source]
		source: std::io::Error,
	},
	/// Configuration document could not be parsed.
	#[error("Codec configuration is invalid.")]
	Parse {
		/// Structured parsing failure naming the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

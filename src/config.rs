//! Deserializable codec configuration.
//!
//! ```json
//! { "secret_key": "secret", "postfix": "tenant-a", "expiration_secs": 300, "pool_capacity": 32 }
//! ```

// self
use crate::{_prelude::*, error::ConfigError, key::Secret};

/// Recognized configuration options for a [`TokenCodec`](crate::codec::TokenCodec).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
	/// Signing key; required by the time the codec is built.
	pub secret_key: Option<Secret>,
	/// Optional second secret mixed into every signature.
	pub postfix: Option<Secret>,
	/// Token lifetime in seconds; absent means tokens never expire.
	pub expiration_secs: Option<u64>,
	/// Bound of the MAC context free list.
	pub pool_capacity: Option<usize>,
}
impl CodecConfig {
	/// Parses a JSON document, naming the offending field on failure.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		let deserializer = &mut serde_json::Deserializer::from_str(json);

		serde_path_to_error::deserialize(deserializer).map_err(|source| ConfigError::Parse { source })
	}

	/// Expiration window as a [`Duration`], if configured.
	pub fn expiration(&self) -> Result<Option<Duration>, ConfigError> {
		self.expiration_secs
			.map(|secs| {
				i64::try_from(secs).map(Duration::seconds).map_err(|_| ConfigError::WindowOutOfRange)
			})
			.transpose()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn full_document_parses() {
		let config = CodecConfig::from_json_str(
			r#"{"secret_key":"secret","postfix":"tenant-a","expiration_secs":300,"pool_capacity":8}"#,
		)
		.expect("Full configuration should parse.");

		assert_eq!(config.secret_key.as_ref().map(Secret::expose), Some(b"secret".as_slice()));
		assert_eq!(config.postfix.as_ref().map(Secret::expose), Some(b"tenant-a".as_slice()));
		assert_eq!(config.pool_capacity, Some(8));
		assert_eq!(
			config.expiration().expect("Window should convert."),
			Some(Duration::minutes(5))
		);
	}

	#[test]
	fn optional_fields_default_to_none() {
		let config =
			CodecConfig::from_json_str(r#"{"secret_key":"secret"}"#).expect("Minimal config parses.");

		assert!(config.postfix.is_none());
		assert_eq!(config.expiration().expect("Absent window is fine."), None);
		assert!(config.pool_capacity.is_none());
	}

	#[test]
	fn parse_errors_name_the_field() {
		let err = CodecConfig::from_json_str(r#"{"secret_key":"secret","expiration_secs":"soon"}"#)
			.expect_err("A string window must be rejected.");
		let ConfigError::Parse { source } = &err else {
			panic!("Expected a parse error, got {err:?}.");
		};

		assert_eq!(source.path().to_string(), "expiration_secs");
	}

	#[test]
	fn unknown_fields_are_rejected() {
		assert!(CodecConfig::from_json_str(r#"{"secret_key":"s","hash":"sha1"}"#).is_err());
	}

	#[test]
	fn oversized_window_is_out_of_range() {
		let config = CodecConfig { expiration_secs: Some(u64::MAX), ..Default::default() };

		assert!(matches!(config.expiration(), Err(ConfigError::WindowOutOfRange)));
	}
}

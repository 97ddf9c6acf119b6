//! Redacting wrapper for signing keys and postfix secrets.

// crates.io
use rand::Rng;
// self
use crate::_prelude::*;

/// Secret byte string (signing key or postfix) kept out of logs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct Secret(Box<[u8]>);
impl Secret {
	/// Wraps secret bytes.
	pub fn new(value: impl Into<Vec<u8>>) -> Self {
		Self(value.into().into_boxed_slice())
	}

	/// Generates `len` random bytes suitable for a signing key.
	pub fn generate(len: usize) -> Self {
		let mut bytes = vec![0; len];

		rand::rng().fill(bytes.as_mut_slice());

		Self::new(bytes)
	}

	/// Returns the raw secret. Callers must avoid logging it.
	pub fn expose(&self) -> &[u8] {
		&self.0
	}

	/// Returns `true` if the secret holds no bytes.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<[u8]> for Secret {
	fn as_ref(&self) -> &[u8] {
		self.expose()
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}
impl From<&str> for Secret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<Vec<u8>> for Secret {
	fn from(value: Vec<u8>) -> Self {
		Self::new(value)
	}
}
impl From<&[u8]> for Secret {
	fn from(value: &[u8]) -> Self {
		Self::new(value)
	}
}
impl<const N: usize> From<&[u8; N]> for Secret {
	fn from(value: &[u8; N]) -> Self {
		Self::new(value.as_slice())
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Secret").field(&"<redacted>").finish()
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

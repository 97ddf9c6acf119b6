//! Base64 transport wrapper for text-only channels (headers, cookies, query strings).

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE};
// self
use crate::{
	_prelude::*,
	codec::{HmacSha256, TokenCodec},
	pool::MacAlgorithm,
};

/// [`TokenCodec`] whose tokens travel as URL-safe base64 strings.
///
/// Adds only the transcoding step; the single new failure is [`Error::Base64Decode`].
pub struct TextCodec<M = HmacSha256>
where
	M: MacAlgorithm,
{
	codec: TokenCodec<M>,
}
impl<M> TextCodec<M>
where
	M: MacAlgorithm,
{
	/// Wraps a binary codec.
	pub fn new(codec: TokenCodec<M>) -> Self {
		Self { codec }
	}

	/// Issues a token carrying `payload`, encoded as URL-safe base64.
	pub fn encode(&self, payload: &[u8]) -> String {
		URL_SAFE.encode(self.codec.encode(payload))
	}

	/// Decodes and verifies a text token, returning an owned copy of its payload.
	pub fn decode(&self, token: &str) -> Result<Vec<u8>> {
		let raw = URL_SAFE.decode(token)?;

		self.codec.decode(&raw).map(<[u8]>::to_vec)
	}

	/// Underlying binary codec.
	pub fn codec(&self) -> &TokenCodec<M> {
		&self.codec
	}

	/// Unwraps the binary codec.
	pub fn into_inner(self) -> TokenCodec<M> {
		self.codec
	}
}
impl<M> Debug for TextCodec<M>
where
	M: MacAlgorithm,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TextCodec").field(&self.codec).finish()
	}
}
impl<M> From<TokenCodec<M>> for TextCodec<M>
where
	M: MacAlgorithm,
{
	fn from(codec: TokenCodec<M>) -> Self {
		Self::new(codec)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, codec::Variant};

	#[test]
	fn round_trips_through_text() {
		for variant in Variant::ALL {
			let text = TextCodec::new(codec_for(variant));
			let token = text.encode(b"token");

			assert!(token.bytes().all(|b| b.is_ascii_alphanumeric() || b"-_=".contains(&b)));
			assert_eq!(text.decode(&token).expect("Text token should verify."), b"token");
		}
	}

	#[test]
	fn invalid_base64_is_reported_before_verification() {
		let text = TextCodec::new(codec_for(Variant::Plain));

		assert!(matches!(text.decode("not base64!"), Err(Error::Base64Decode(_))));
	}

	#[test]
	fn verification_errors_pass_through() {
		let text = TextCodec::new(codec_for(Variant::Plain));

		assert!(matches!(text.decode(&URL_SAFE.encode([200_u8, 2, 3])), Err(Error::MalformedToken)));
	}
}

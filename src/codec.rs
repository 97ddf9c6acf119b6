//! Token issuance and verification.
//!
//! A [`TokenCodec`] is locked at construction into one [`Variant`]; every token it issues shares
//! one layout and it only accepts tokens of that layout:
//!
//! ```text
//! [deadline: 8 bytes LE, expiring variants only][signature length: 1/3/6 bytes][signature][payload]
//! ```
//!
//! The signature covers, in order, the payload, the deadline bytes (expiring variants), and the
//! postfix (postfixed variants).

pub mod builder;

pub use builder::*;

// crates.io
use hmac::{Hmac, Mac, digest::OutputSizeUser};
use sha2::Sha256;
// self
use crate::{
	_prelude::*,
	clock::ClockCache,
	config::CodecConfig,
	error::ConfigError,
	key::Secret,
	obs::{self, TokenOp, TokenOutcome},
	pool::{MacAlgorithm, MacPool},
	varlen::{self, LengthPrefix},
};

/// Default keyed-hash algorithm.
pub type HmacSha256 = Hmac<Sha256>;

/// Width of the embedded deadline.
pub const MARKER_LEN: usize = 8;
/// Shortest token a non-expiring codec will look at.
pub const MIN_TOKEN_LEN: usize = 3;
/// Shortest token an expiring codec will look at.
pub const MIN_EXPIRING_TOKEN_LEN: usize = MARKER_LEN + MIN_TOKEN_LEN;

/// The four layouts a codec can be locked into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
	/// Signature over the payload only.
	Plain,
	/// Embedded deadline, signed with the payload.
	Expiring,
	/// Postfix secret mixed into the signature.
	Postfixed,
	/// Both an embedded deadline and a postfix.
	ExpiringPostfixed,
}
impl Variant {
	/// All variants, in declaration order.
	pub const ALL: [Variant; 4] =
		[Variant::Plain, Variant::Expiring, Variant::Postfixed, Variant::ExpiringPostfixed];

	/// Returns a stable label suitable for event or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Variant::Plain => "plain",
			Variant::Expiring => "expiring",
			Variant::Postfixed => "postfixed",
			Variant::ExpiringPostfixed => "expiring_postfixed",
		}
	}

	/// Whether tokens carry a deadline.
	pub const fn is_expiring(self) -> bool {
		matches!(self, Variant::Expiring | Variant::ExpiringPostfixed)
	}

	/// Whether a postfix is mixed into signatures.
	pub const fn is_postfixed(self) -> bool {
		matches!(self, Variant::Postfixed | Variant::ExpiringPostfixed)
	}

	/// Length below which a token is rejected without further inspection.
	pub const fn min_token_len(self) -> usize {
		if self.is_expiring() { MIN_EXPIRING_TOKEN_LEN } else { MIN_TOKEN_LEN }
	}
}
impl Display for Variant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

enum Scheme {
	Plain,
	Expiring(ClockCache),
	Postfixed(Secret),
	ExpiringPostfixed { clock: ClockCache, postfix: Secret },
}
impl Scheme {
	fn new(clock: Option<ClockCache>, postfix: Option<Secret>) -> Self {
		match (clock, postfix) {
			(None, None) => Scheme::Plain,
			(Some(clock), None) => Scheme::Expiring(clock),
			(None, Some(postfix)) => Scheme::Postfixed(postfix),
			(Some(clock), Some(postfix)) => Scheme::ExpiringPostfixed { clock, postfix },
		}
	}

	fn variant(&self) -> Variant {
		match self {
			Scheme::Plain => Variant::Plain,
			Scheme::Expiring(_) => Variant::Expiring,
			Scheme::Postfixed(_) => Variant::Postfixed,
			Scheme::ExpiringPostfixed { .. } => Variant::ExpiringPostfixed,
		}
	}

	fn clock(&self) -> Option<&ClockCache> {
		match self {
			Scheme::Expiring(clock) | Scheme::ExpiringPostfixed { clock, .. } => Some(clock),
			Scheme::Plain | Scheme::Postfixed(_) => None,
		}
	}

	fn postfix(&self) -> Option<&Secret> {
		match self {
			Scheme::Postfixed(postfix) | Scheme::ExpiringPostfixed { postfix, .. } => Some(postfix),
			Scheme::Plain | Scheme::Expiring(_) => None,
		}
	}
}

/// Issues and verifies signed tokens for one key, one algorithm, and one [`Variant`].
///
/// Safe to share across threads; MAC contexts are pooled and the clock is read atomically.
pub struct TokenCodec<M = HmacSha256>
where
	M: MacAlgorithm,
{
	secret_key: Secret,
	scheme: Scheme,
	pool: MacPool<M>,
	prefix: LengthPrefix,
	digest_len: usize,
}
impl TokenCodec {
	/// Starts a builder for the default `Hmac<Sha256>` algorithm.
	pub fn builder() -> TokenCodecBuilder {
		TokenCodecBuilder::new()
	}

	/// Builds a default-algorithm codec from a parsed [`CodecConfig`].
	pub fn from_config(config: CodecConfig) -> Result<Self, ConfigError> {
		Self::builder().with_config(config)?.build()
	}
}
impl<M> TokenCodec<M>
where
	M: MacAlgorithm,
{
	fn assemble(
		secret_key: Secret,
		scheme: Scheme,
		pool: MacPool<M>,
		prefix: LengthPrefix,
	) -> Self {
		Self { secret_key, scheme, pool, prefix, digest_len: <M as OutputSizeUser>::output_size() }
	}

	/// Issues a token carrying `payload`.
	pub fn encode(&self, payload: &[u8]) -> Vec<u8> {
		let mut token = Vec::with_capacity(self.token_len(payload.len()));

		self.encode_into(payload, &mut token);

		token
	}

	/// Appends a token carrying `payload` to `out`.
	pub fn encode_into(&self, payload: &[u8], out: &mut Vec<u8>) {
		match &self.scheme {
			Scheme::Plain => self.seal(payload, None, None, out),
			Scheme::Expiring(clock) => self.seal(payload, Some(clock.deadline()), None, out),
			Scheme::Postfixed(postfix) => self.seal(payload, None, Some(postfix.expose()), out),
			Scheme::ExpiringPostfixed { clock, postfix } =>
				self.seal(payload, Some(clock.deadline()), Some(postfix.expose()), out),
		}

		obs::record_token_outcome(TokenOp::Encode, self.variant(), TokenOutcome::Issued);
	}

	/// Verifies `token` and returns the payload it carries, borrowed from `token`.
	///
	/// Expired tokens are rejected before any MAC work. All errors returned here are
	/// [rejections](Error::is_rejection).
	pub fn decode<'a>(&self, token: &'a [u8]) -> Result<&'a [u8]> {
		let result = match &self.scheme {
			Scheme::Plain => self.open(token, None, None),
			Scheme::Expiring(clock) => self.open(token, Some(clock), None),
			Scheme::Postfixed(postfix) => self.open(token, None, Some(postfix.expose())),
			Scheme::ExpiringPostfixed { clock, postfix } =>
				self.open(token, Some(clock), Some(postfix.expose())),
		};

		obs::record_token_outcome(TokenOp::Decode, self.variant(), TokenOutcome::of(&result));

		result
	}

	/// Size of the token [`TokenCodec::encode`] produces for a payload of `payload_len` bytes.
	pub fn token_len(&self, payload_len: usize) -> usize {
		let marker = if self.variant().is_expiring() { MARKER_LEN } else { 0 };

		marker + self.prefix.width() + self.digest_len + payload_len
	}

	/// Signing key.
	pub fn secret_key(&self) -> &[u8] {
		self.secret_key.expose()
	}

	/// Postfix secret, if this is a postfixed variant.
	pub fn postfix(&self) -> Option<&[u8]> {
		self.scheme.postfix().map(Secret::expose)
	}

	/// Token lifetime, if this is an expiring variant.
	pub fn expiration(&self) -> Option<Duration> {
		self.scheme.clock().map(ClockCache::window)
	}

	/// Clock backing the expiring variants.
	pub fn clock(&self) -> Option<&ClockCache> {
		self.scheme.clock()
	}

	/// Variant this codec is locked into.
	pub fn variant(&self) -> Variant {
		self.scheme.variant()
	}

	/// Signature length in bytes.
	pub fn digest_len(&self) -> usize {
		self.digest_len
	}

	/// Stops the clock refresher, if any. Idempotent.
	///
	/// Expiring codecs must not be used after this; their cached time is frozen.
	pub fn stop(&self) {
		if let Some(clock) = self.scheme.clock() {
			clock.stop();
		}
	}

	fn seal(&self, payload: &[u8], deadline: Option<i64>, postfix: Option<&[u8]>, out: &mut Vec<u8>) {
		let marker = deadline.map(i64::to_le_bytes);

		out.reserve(self.token_len(payload.len()));

		if let Some(marker) = &marker {
			out.extend_from_slice(marker);
		}

		out.extend_from_slice(self.prefix.as_bytes());

		let signature = {
			let mut mac = self.pool.acquire();

			feed(&mut *mac, payload, marker.as_ref(), postfix);

			mac.finalize_reset().into_bytes()
		};

		out.extend_from_slice(&signature);
		out.extend_from_slice(payload);
	}

	fn open<'a>(
		&self,
		token: &'a [u8],
		clock: Option<&ClockCache>,
		postfix: Option<&[u8]>,
	) -> Result<&'a [u8]> {
		let (marker, body) = match clock {
			Some(clock) => {
				if token.len() < MIN_EXPIRING_TOKEN_LEN {
					return Err(Error::MalformedToken);
				}

				let (marker, body) =
					token.split_first_chunk::<MARKER_LEN>().ok_or(Error::MalformedToken)?;

				if clock.now() > i64::from_le_bytes(*marker) {
					return Err(Error::Expired);
				}

				(Some(marker), body)
			},
			None => {
				if token.len() < MIN_TOKEN_LEN {
					return Err(Error::MalformedToken);
				}

				(None, token)
			},
		};
		let (signature_len, consumed) = varlen::decode(body)?;
		let (signature, payload) =
			body[consumed..].split_at_checked(signature_len).ok_or(Error::MalformedToken)?;
		let mut mac = self.pool.acquire();

		feed(&mut *mac, payload, marker, postfix);

		mac.verify_slice_reset(signature).map_err(|_| Error::InvalidSignature)?;

		Ok(payload)
	}
}
impl<M> Debug for TokenCodec<M>
where
	M: MacAlgorithm,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCodec")
			.field("variant", &self.variant())
			.field("secret_key", &self.secret_key)
			.field("expiration", &self.expiration())
			.field("digest_len", &self.digest_len)
			.field("pool", &self.pool)
			.finish()
	}
}

fn feed<M>(mac: &mut M, payload: &[u8], marker: Option<&[u8; MARKER_LEN]>, postfix: Option<&[u8]>)
where
	M: Mac,
{
	mac.update(payload);

	if let Some(marker) = marker {
		mac.update(marker);
	}
	if let Some(postfix) = postfix {
		mac.update(postfix);
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use sha2::Sha512;
	// self
	use super::*;
	use crate::_preludet::*;

	#[test]
	fn example_token_layout() {
		let codec = TokenCodec::builder().secret_key("secret").build().expect("Codec should build.");
		let token = codec.encode(b"token");

		assert_eq!(&token[token.len() - 5..], b"token");
		assert_eq!(varlen::decode(&token), Ok((32, 1)));
		assert_eq!(token.len(), codec.token_len(5));
		assert_eq!(codec.decode(&token).expect("Fresh token should verify."), b"token");
	}

	#[test]
	fn plain_signature_is_hmac_of_payload() {
		let codec = TokenCodec::builder().secret_key("secret").build().expect("Codec should build.");
		let token = codec.encode(b"token");
		let mut mac = <HmacSha256 as Mac>::new_from_slice(b"secret").expect("HMAC accepts any key.");

		mac.update(b"token");

		assert_eq!(&token[1..33], mac.finalize().into_bytes().as_slice());
	}

	#[test]
	fn expiring_signature_covers_deadline_then_postfix() {
		let codec = codec_for(Variant::ExpiringPostfixed);
		let clock = codec.clock().expect("Expiring codec owns a clock.");

		codec.stop();
		clock.publish(1_000);

		let token = codec.encode(b"token");
		let mut mac = <HmacSha256 as Mac>::new_from_slice(SECRET).expect("HMAC accepts any key.");

		mac.update(b"token");
		mac.update(&1_300_i64.to_le_bytes());
		mac.update(POSTFIX);

		assert_eq!(&token[..MARKER_LEN], &1_300_i64.to_le_bytes());
		assert_eq!(token[MARKER_LEN], 32);
		assert_eq!(&token[MARKER_LEN + 1..MARKER_LEN + 33], mac.finalize().into_bytes().as_slice());
	}

	#[test]
	fn every_variant_round_trips() {
		for variant in Variant::ALL {
			let codec = codec_for(variant);

			assert_eq!(codec.variant(), variant);

			for len in [0, 5, 280, 100_000] {
				let payload = sample_payload(len);
				let token = codec.encode(&payload);

				assert_eq!(
					codec.decode(&token).expect("Fresh token should verify."),
					payload.as_slice(),
					"Round trip failed for {variant} with {len} bytes."
				);
			}
		}
	}

	#[test]
	fn short_tokens_are_malformed() {
		for variant in Variant::ALL {
			let codec = codec_for(variant);
			let short = vec![0_u8; variant.min_token_len() - 1];

			assert!(matches!(codec.decode(&short), Err(Error::MalformedToken)));
		}
	}

	#[test]
	fn overrunning_length_prefix_is_malformed() {
		let codec = codec_for(Variant::Plain);

		assert!(matches!(codec.decode(&[200, 1, 2, 3]), Err(Error::MalformedToken)));
		assert!(matches!(codec.decode(&[255, 1, 2]), Err(Error::MalformedToken)));
		assert!(matches!(codec.decode(&[255, 255, 255, 1]), Err(Error::MalformedToken)));
	}

	#[test]
	fn wrong_signature_length_within_bounds_is_invalid() {
		let codec = codec_for(Variant::Plain);
		let mut token = vec![16];

		token.extend_from_slice(&[0; 16]);
		token.extend_from_slice(b"payload");

		assert!(matches!(codec.decode(&token), Err(Error::InvalidSignature)));
	}

	#[test]
	fn expiry_is_checked_before_signature() {
		let codec = codec_for(Variant::Expiring);
		let clock = codec.clock().expect("Expiring codec owns a clock.");

		codec.stop();
		clock.publish(1_000);

		let mut token = codec.encode(b"token");
		let last = token.len() - 1;

		token[last] ^= 1;
		clock.publish(1_301);

		assert!(matches!(codec.decode(&token), Err(Error::Expired)));

		clock.publish(1_300);

		assert!(matches!(codec.decode(&token), Err(Error::InvalidSignature)));
	}

	#[test]
	fn deadline_boundary_is_inclusive() {
		let codec = codec_for(Variant::Expiring);
		let clock = codec.clock().expect("Expiring codec owns a clock.");

		codec.stop();
		clock.publish(1_000);

		let token = codec.encode(b"token");

		clock.publish(1_300);

		assert!(codec.decode(&token).is_ok(), "A token is valid through its deadline second.");

		clock.publish(1_301);

		assert!(matches!(codec.decode(&token), Err(Error::Expired)));
	}

	#[test]
	fn forged_deadline_is_rejected() {
		let codec = codec_for(Variant::Expiring);
		let clock = codec.clock().expect("Expiring codec owns a clock.");

		codec.stop();
		clock.publish(1_000);

		let mut token = codec.encode(b"token");

		token[..MARKER_LEN].copy_from_slice(&i64::MAX.to_le_bytes());
		clock.publish(5_000);

		assert!(matches!(codec.decode(&token), Err(Error::InvalidSignature)));
	}

	#[test]
	fn variants_do_not_accept_each_other() {
		let plain = codec_for(Variant::Plain);
		let postfixed = codec_for(Variant::Postfixed);
		let token = plain.encode(b"token");

		assert!(matches!(postfixed.decode(&token), Err(Error::InvalidSignature)));
		assert!(matches!(plain.decode(&postfixed.encode(b"token")), Err(Error::InvalidSignature)));
	}

	#[test]
	fn accessors_expose_configuration() {
		let codec = codec_for(Variant::ExpiringPostfixed);

		assert_eq!(codec.secret_key(), SECRET);
		assert_eq!(codec.postfix(), Some(POSTFIX));
		assert_eq!(codec.expiration(), Some(WINDOW));
		assert_eq!(codec.digest_len(), 32);

		let plain = codec_for(Variant::Plain);

		assert_eq!(plain.postfix(), None);
		assert_eq!(plain.expiration(), None);
		assert!(plain.clock().is_none());
	}

	#[test]
	fn alternate_algorithm_changes_digest_len() {
		let codec = TokenCodec::builder()
			.algorithm::<Hmac<Sha512>>()
			.secret_key("secret")
			.build()
			.expect("Sha512 codec should build.");
		let token = codec.encode(b"token");

		assert_eq!(codec.digest_len(), 64);
		assert_eq!(token[0], 64);
		assert_eq!(codec.decode(&token).expect("Sha512 token should verify."), b"token");
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let rendered = format!("{:?}", codec_for(Variant::Postfixed));

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains(std::str::from_utf8(SECRET).expect("Fixture key is UTF-8.")));
		assert!(!rendered.contains(std::str::from_utf8(POSTFIX).expect("Fixture postfix is UTF-8.")));
	}

	#[test]
	fn encode_into_appends() {
		let codec = codec_for(Variant::Plain);
		let mut buffer = b"prefix".to_vec();

		codec.encode_into(b"token", &mut buffer);

		assert!(buffer.starts_with(b"prefix"));
		assert_eq!(codec.decode(&buffer[6..]).expect("Appended token should verify."), b"token");
	}
}

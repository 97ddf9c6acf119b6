//! Optional observability helpers for token issuance and verification.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit lifecycle events (codec built, clock refresher started/stopped, MAC
//!   pool growth). Encode/Decode failures are returned, never logged.
//! - Enable `metrics` to increment the `fst_token_total` counter for every encode/decode, labeled
//!   by `op`, `variant`, and `outcome`.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Codec operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenOp {
	/// Token issuance.
	Encode,
	/// Token verification.
	Decode,
}
impl TokenOp {
	/// Returns a stable label suitable for event or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenOp::Encode => "encode",
			TokenOp::Decode => "decode",
		}
	}
}
impl Display for TokenOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenOutcome {
	/// Token was issued.
	Issued,
	/// Token passed verification.
	Accepted,
	/// Token was structurally invalid.
	Malformed,
	/// Token signature did not verify.
	InvalidSignature,
	/// Token deadline had passed.
	Expired,
}
impl TokenOutcome {
	/// Maps a decode result onto its outcome label.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => TokenOutcome::Accepted,
			Err(Error::Expired) => TokenOutcome::Expired,
			Err(Error::InvalidSignature) => TokenOutcome::InvalidSignature,
			Err(_) => TokenOutcome::Malformed,
		}
	}

	/// Returns a stable label suitable for event or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenOutcome::Issued => "issued",
			TokenOutcome::Accepted => "accepted",
			TokenOutcome::Malformed => "malformed",
			TokenOutcome::InvalidSignature => "invalid_signature",
			TokenOutcome::Expired => "expired",
		}
	}
}
impl Display for TokenOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn outcome_follows_decode_result() {
		assert_eq!(TokenOutcome::of(&Ok::<_, Error>(())), TokenOutcome::Accepted);
		assert_eq!(TokenOutcome::of::<()>(&Err(Error::Expired)), TokenOutcome::Expired);
		assert_eq!(
			TokenOutcome::of::<()>(&Err(Error::InvalidSignature)),
			TokenOutcome::InvalidSignature
		);
		assert_eq!(TokenOutcome::of::<()>(&Err(Error::MalformedToken)), TokenOutcome::Malformed);
	}

	#[test]
	fn labels_are_stable() {
		assert_eq!(TokenOp::Decode.to_string(), "decode");
		assert_eq!(TokenOutcome::InvalidSignature.to_string(), "invalid_signature");
	}
}

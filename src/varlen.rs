//! Compact length prefix used for the signature-length field.
//!
//! Lengths below 255 take one byte. Lengths below 65535 take three bytes: a `0xFF` marker followed
//! by the 16-bit little-endian length. Everything else up to `2^24 - 1` takes six bytes: three
//! `0xFF` markers followed by the 24-bit little-endian length.

// self
use crate::_prelude::*;

/// Largest length the prefix can represent.
pub const MAX_LEN: usize = (1 << 24) - 1;

const MARKER: u8 = u8::MAX;
const SHORT_LIMIT: usize = MARKER as usize;
const MEDIUM_LIMIT: usize = u16::MAX as usize;

/// Errors raised while encoding or decoding a length prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum LengthError {
	/// The buffer ends before the header it announces.
	#[error("Length prefix needs {needed} bytes but only {available} are available.")]
	MalformedLength {
		/// Bytes the header requires.
		needed: usize,
		/// Bytes actually present.
		available: usize,
	},
	/// The length does not fit in 24 bits.
	#[error("Length {len} exceeds the 24-bit prefix range.")]
	Unrepresentable {
		/// Length that was rejected.
		len: usize,
	},
}

/// Encoded length prefix kept inline (at most six bytes).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LengthPrefix {
	bytes: [u8; 6],
	len: u8,
}
impl LengthPrefix {
	/// Encoded bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes[..self.len as usize]
	}

	/// Number of encoded bytes (1, 3, or 6).
	pub const fn width(&self) -> usize {
		self.len as usize
	}
}
impl Debug for LengthPrefix {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("LengthPrefix").field(&self.as_bytes()).finish()
	}
}

/// Encodes `n` into the shortest prefix form.
pub fn encode(n: usize) -> Result<LengthPrefix, LengthError> {
	let mut bytes = [0; 6];
	let len = if n < SHORT_LIMIT {
		bytes[0] = n as u8;

		1
	} else if n < MEDIUM_LIMIT {
		bytes[0] = MARKER;
		bytes[1..3].copy_from_slice(&(n as u16).to_le_bytes());

		3
	} else if n <= MAX_LEN {
		bytes[..3].fill(MARKER);
		bytes[3..6].copy_from_slice(&(n as u32).to_le_bytes()[..3]);

		6
	} else {
		return Err(LengthError::Unrepresentable { len: n });
	};

	Ok(LengthPrefix { bytes, len })
}

/// Decodes a prefix from the start of `buf`, returning `(length, consumed)`.
///
/// Never reads past the consumed header.
pub fn decode(buf: &[u8]) -> Result<(usize, usize), LengthError> {
	let first = *buf.first().ok_or(LengthError::MalformedLength { needed: 1, available: 0 })?;

	if first < MARKER {
		return Ok((first as usize, 1));
	}

	let [_, lo, hi] = *take::<3>(buf)?;
	let medium = u16::from_le_bytes([lo, hi]) as usize;

	if medium < MEDIUM_LIMIT {
		return Ok((medium, 3));
	}

	let [.., b0, b1, b2] = *take::<6>(buf)?;

	Ok((u32::from_le_bytes([b0, b1, b2, 0]) as usize, 6))
}

fn take<const N: usize>(buf: &[u8]) -> Result<&[u8; N], LengthError> {
	buf.first_chunk::<N>().ok_or(LengthError::MalformedLength { needed: N, available: buf.len() })
}

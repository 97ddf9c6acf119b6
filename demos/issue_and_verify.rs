//! Issues and verifies one token per variant, then shows an expired and a forged token being
//! rejected.

// std
use std::{thread, time::Duration as StdDuration};
// crates.io
use fast_signed_tokens::{
	codec::{TokenCodec, Variant},
	key::Secret,
	text::TextCodec,
};
use time::Duration;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let key = Secret::generate(32);

	for variant in Variant::ALL {
		let mut builder = TokenCodec::builder().secret_key(key.clone());

		if variant.is_postfixed() {
			builder = builder.postfix("demo-postfix");
		}
		if variant.is_expiring() {
			builder = builder.expiration(Duration::minutes(5));
		}

		let codec = TextCodec::new(builder.build()?);
		let token = codec.encode(b"token");
		let value = codec.decode(&token)?;

		println!("{variant:>18}: {token} -> {}", String::from_utf8_lossy(&value));
	}

	let short_lived =
		TokenCodec::builder().secret_key(key).expiration(Duration::SECOND).build()?;
	let token = short_lived.encode(b"token");

	thread::sleep(StdDuration::from_secs(3));

	match short_lived.decode(&token) {
		Ok(_) => println!("unexpected: token still valid"),
		Err(e) => println!("after 3s: {e} (rejection: {})", e.is_rejection()),
	}

	let mut forged = short_lived.encode(b"token");
	let last = forged.len() - 1;

	forged[last] ^= 1;

	if let Err(e) = short_lived.decode(&forged) {
		println!("forged: {e}");
	}

	Ok(())
}

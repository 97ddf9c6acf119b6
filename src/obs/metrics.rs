// self
use crate::{
	codec::Variant,
	obs::{TokenOp, TokenOutcome},
};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_token_outcome(op: TokenOp, variant: Variant, outcome: TokenOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"fst_token_total",
			"op" => op.as_str(),
			"variant" => variant.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, variant, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_token_outcome_noop_without_metrics() {
		record_token_outcome(TokenOp::Decode, Variant::Expiring, TokenOutcome::Expired);
	}
}

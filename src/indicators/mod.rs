// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free series computations.  Every public function returns
// one `Option<f64>` per input position so results stay aligned with the quote
// dates they came from: `None` marks the warm-up span (or an undefined value),
// never a zero.

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rolling;
pub mod rsi;

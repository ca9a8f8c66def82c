//! The formula library: concrete cash-flow-producing items.
//!
//! Everything here is a collaborator of the orchestration engine — a plain
//! struct implementing the uniform [`ComputableItem`](crate::core::item::ComputableItem)
//! contract. The engine invokes each item once, in dependency order, and
//! routes the results; the arithmetic inside an item never concerns the
//! engine.

pub mod capital;
pub mod expense;
pub mod income;
pub mod lease;
pub mod loss;
pub mod rollover;

use rust_decimal::Decimal;

/// Compound annual growth factor: `(1 + pct)^years`, computed by repeated
/// multiplication so no extra decimal math features are needed.
pub(crate) fn annual_growth_factor(pct: Decimal, years: u32) -> Decimal {
    let mut factor = Decimal::ONE;
    let step = Decimal::ONE + pct;
    for _ in 0..years {
        factor *= step;
    }
    factor
}

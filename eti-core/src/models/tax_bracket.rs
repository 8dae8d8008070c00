use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One bracket of a marginal-rate schedule.
///
/// `upper_bound` is `None` for the top (unbounded) bracket. Income exactly
/// equal to an upper bound belongs to that bracket, not the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn bounded(upper_bound: Decimal, rate: Decimal) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub fn top(rate: Decimal) -> Self {
        Self {
            upper_bound: None,
            rate,
        }
    }
}

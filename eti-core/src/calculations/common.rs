//! Shared input validation for the calculation modules.
//!
//! Invalid inputs fail fast and are never silently clamped; mathematically
//! undefined results are not errors and are signalled as `None` by the
//! individual calculations instead.

use rust_decimal::Decimal;
use thiserror::Error;

/// Domain violations in calculation inputs.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InvalidInput {
    /// Income amounts must be non-negative.
    #[error("income cannot be negative, got {0}")]
    NegativeIncome(Decimal),

    /// Labor units must be non-negative.
    #[error("labor units cannot be negative, got {0}")]
    NegativeLaborUnits(Decimal),

    /// Tax rates are decimals in [0, 1].
    #[error("tax rate must be between 0 and 1, got {0}")]
    RateOutOfRange(Decimal),
}

pub fn check_income(income: Decimal) -> Result<(), InvalidInput> {
    if income < Decimal::ZERO {
        return Err(InvalidInput::NegativeIncome(income));
    }
    Ok(())
}

pub fn check_rate(rate: Decimal) -> Result<(), InvalidInput> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(InvalidInput::RateOutOfRange(rate));
    }
    Ok(())
}

pub fn check_labor_units(units: Decimal) -> Result<(), InvalidInput> {
    if units < Decimal::ZERO {
        return Err(InvalidInput::NegativeLaborUnits(units));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn check_income_accepts_zero() {
        assert_eq!(check_income(dec!(0)), Ok(()));
    }

    #[test]
    fn check_income_rejects_negative() {
        assert_eq!(
            check_income(dec!(-0.01)),
            Err(InvalidInput::NegativeIncome(dec!(-0.01)))
        );
    }

    #[test]
    fn check_rate_accepts_bounds() {
        assert_eq!(check_rate(dec!(0)), Ok(()));
        assert_eq!(check_rate(dec!(1)), Ok(()));
    }

    #[test]
    fn check_rate_rejects_outside_unit_interval() {
        assert_eq!(
            check_rate(dec!(1.01)),
            Err(InvalidInput::RateOutOfRange(dec!(1.01)))
        );
        assert_eq!(
            check_rate(dec!(-0.10)),
            Err(InvalidInput::RateOutOfRange(dec!(-0.10)))
        );
    }

    #[test]
    fn check_labor_units_rejects_negative() {
        assert_eq!(
            check_labor_units(dec!(-1)),
            Err(InvalidInput::NegativeLaborUnits(dec!(-1)))
        );
    }
}

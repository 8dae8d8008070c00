//! Elasticity of taxable income (ETI) from simulated responses.
//!
//! The ETI is the ratio of the percent change in taxable income to the
//! percent change in the net-of-tax rate `1 - marginal_rate`:
//!
//! ```text
//! ETI = (Δincome / income₀) / (((1 - r₁) - (1 - r₀)) / (1 - r₀))
//! ```
//!
//! A positive ETI means income moved in the same direction as the net-of-tax
//! share, so a tax increase that reduces income yields a positive estimate.
//!
//! Mathematically undefined cases — zero initial income, an initial rate of
//! 100%, or no effective rate change — return `Ok(None)` rather than an error
//! or ±infinity. The caller decides whether an undefined observation becomes
//! a dropped row, a zero, or a flagged entry; the calculation never guesses.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use eti_core::eti;
//!
//! // Rate rises 25% -> 30%, income falls 75,000 -> 72,000.
//! let elasticity = eti(dec!(0.25), dec!(0.30), dec!(75000), dec!(72000))
//!     .unwrap()
//!     .unwrap();
//!
//! assert!((elasticity - dec!(0.6)).abs() < dec!(0.0001));
//!
//! // No rate change: the denominator is zero, the estimate undefined.
//! assert_eq!(eti(dec!(0.25), dec!(0.25), dec!(75000), dec!(72000)), Ok(None));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::{InvalidInput, check_income, check_rate};
use crate::models::CategoricalResponse;

/// ETI implied by a continuous income change.
///
/// Returns `Ok(None)` when the estimate is undefined: zero initial income,
/// an initial rate of 1, or no net-of-tax rate change.
///
/// # Errors
///
/// [`InvalidInput`] on negative incomes or rates outside [0, 1].
pub fn eti(
    initial_rate: Decimal,
    new_rate: Decimal,
    initial_income: Decimal,
    new_income: Decimal,
) -> Result<Option<Decimal>, InvalidInput> {
    check_income(initial_income)?;
    check_income(new_income)?;
    check_rate(initial_rate)?;
    check_rate(new_rate)?;

    if initial_income.is_zero() {
        return Ok(None);
    }

    let pct_change_income = (new_income - initial_income) / initial_income;
    eti_from_percent_change(pct_change_income, initial_rate, new_rate)
}

/// ETI implied by a categorical response, using the category's fixed
/// percent-change midpoint as the numerator.
///
/// [`CategoricalResponse::AboutSame`] yields exactly `Some(0)` under any real
/// rate change; the undefined cases are the same as for [`eti`].
pub fn eti_from_category(
    response: CategoricalResponse,
    current_rate: Decimal,
    new_rate: Decimal,
) -> Result<Option<Decimal>, InvalidInput> {
    eti_from_percent_change(response.midpoint(), current_rate, new_rate)
}

/// Shared kernel: divides a percent change in income by the percent change
/// in the net-of-tax rate. Public so study designs with their own midpoint
/// tables can bypass [`eti_from_category`].
pub fn eti_from_percent_change(
    pct_change_income: Decimal,
    current_rate: Decimal,
    new_rate: Decimal,
) -> Result<Option<Decimal>, InvalidInput> {
    check_rate(current_rate)?;
    check_rate(new_rate)?;

    let net_of_tax_base = Decimal::ONE - current_rate;
    if net_of_tax_base.is_zero() {
        return Ok(None);
    }

    let pct_change_net_of_tax = ((Decimal::ONE - new_rate) - net_of_tax_base) / net_of_tax_base;
    if pct_change_net_of_tax.is_zero() {
        return Ok(None);
    }

    Ok(Some(pct_change_income / pct_change_net_of_tax))
}

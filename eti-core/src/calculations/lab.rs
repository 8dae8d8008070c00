//! Two-bracket tax schedules for the lab-experiment replication.
//!
//! The experimental design taxes a round's labor income under either a flat
//! rate or a two-bracket schedule with a low rate up to a threshold and a
//! high rate above it. The published design applies the high rate to the
//! **entire** income once it exceeds the threshold — a notch, not a standard
//! marginal bracket: after-tax income drops discontinuously just past the
//! threshold, which is exactly the bunching incentive the experiment
//! measures. Some replication variants instead tax only the excess (a kink).
//! Both behaviors exist in the experimental literature, so the treatment of
//! the upper bracket is a schedule parameter, not a fixed constant.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use eti_core::NotchSchedule;
//!
//! let notch = NotchSchedule::notch(dec!(400), dec!(0.25), dec!(0.50));
//!
//! // At the threshold: 400 - 100 = 300 after tax.
//! assert_eq!(notch.after_tax_income(dec!(400)).unwrap(), dec!(300));
//! // Just past it the whole income is taxed at 50%: 420 - 210 = 210.
//! // Earning 20 more pre-tax units LOWERS net income by 90.
//! assert_eq!(notch.after_tax_income(dec!(420)).unwrap(), dec!(210));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{InvalidInput, check_income, check_labor_units, check_rate};

/// Gross labor income for a round: units worked times the piece wage.
///
/// # Errors
///
/// [`InvalidInput`] on negative labor units or a negative wage.
pub fn labor_income(labor_units: Decimal, wage_per_unit: Decimal) -> Result<Decimal, InvalidInput> {
    check_labor_units(labor_units)?;
    check_income(wage_per_unit)?;

    Ok(labor_units * wage_per_unit)
}

/// How the high rate applies once income exceeds the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpperBracketTreatment {
    /// The high rate applies to the entire income (the notch design).
    EntireIncome,
    /// The high rate applies only to income above the threshold (a kink,
    /// i.e. ordinary marginal-bracket semantics).
    ExcessOnly,
}

/// A two-bracket schedule: `low_rate` up to `threshold`, `high_rate` above
/// it, with `treatment` selecting notch or kink semantics for the upper
/// bracket.
///
/// Parameters are validated when a tax amount is computed; rates outside
/// [0, 1] or a negative threshold fail with [`InvalidInput`] rather than
/// being clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotchSchedule {
    pub threshold: Decimal,
    pub low_rate: Decimal,
    pub high_rate: Decimal,
    pub treatment: UpperBracketTreatment,
}

impl NotchSchedule {
    /// Schedule with the published notch design: the entire income is taxed
    /// at `high_rate` once it exceeds `threshold`.
    pub fn notch(threshold: Decimal, low_rate: Decimal, high_rate: Decimal) -> Self {
        Self {
            threshold,
            low_rate,
            high_rate,
            treatment: UpperBracketTreatment::EntireIncome,
        }
    }

    /// Schedule with ordinary marginal-bracket semantics above the threshold.
    pub fn kink(threshold: Decimal, low_rate: Decimal, high_rate: Decimal) -> Self {
        Self {
            threshold,
            low_rate,
            high_rate,
            treatment: UpperBracketTreatment::ExcessOnly,
        }
    }

    /// Tax due on `income` under this schedule.
    pub fn tax(&self, income: Decimal) -> Result<Decimal, InvalidInput> {
        self.validate()?;
        check_income(income)?;

        if income <= self.threshold {
            return Ok(income * self.low_rate);
        }

        let tax = match self.treatment {
            UpperBracketTreatment::EntireIncome => income * self.high_rate,
            UpperBracketTreatment::ExcessOnly => {
                self.threshold * self.low_rate + (income - self.threshold) * self.high_rate
            }
        };

        Ok(tax)
    }

    /// Net income after tax.
    pub fn after_tax_income(&self, income: Decimal) -> Result<Decimal, InvalidInput> {
        Ok(income - self.tax(income)?)
    }

    /// Whether after-tax income is non-monotonic at the threshold — true for
    /// the entire-income treatment with a genuinely higher upper rate.
    pub fn is_notched(&self) -> bool {
        self.treatment == UpperBracketTreatment::EntireIncome && self.high_rate > self.low_rate
    }

    fn validate(&self) -> Result<(), InvalidInput> {
        check_income(self.threshold)?;
        check_rate(self.low_rate)?;
        check_rate(self.high_rate)?;
        Ok(())
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{InvalidInput, check_income, check_rate};
use crate::models::FilingStatus;

/// One tax-change scenario presented to a simulated respondent.
///
/// Built by the scenario generator (or directly by a caller) and consumed by
/// prompt construction and elasticity calculation. Immutable once built;
/// construct through [`TaxScenario::new`], which rejects negative incomes and
/// rates outside [0, 1].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxScenario {
    pub persona_description: String,
    pub filing_status: FilingStatus,
    pub wage_income: Decimal,
    pub other_income: Decimal,
    pub current_marginal_rate: Decimal,
    pub new_marginal_rate: Decimal,
}

impl TaxScenario {
    pub fn new(
        persona_description: impl Into<String>,
        filing_status: FilingStatus,
        wage_income: Decimal,
        other_income: Decimal,
        current_marginal_rate: Decimal,
        new_marginal_rate: Decimal,
    ) -> Result<Self, InvalidInput> {
        check_income(wage_income)?;
        check_income(other_income)?;
        check_rate(current_marginal_rate)?;
        check_rate(new_marginal_rate)?;

        Ok(Self {
            persona_description: persona_description.into(),
            filing_status,
            wage_income,
            other_income,
            current_marginal_rate,
            new_marginal_rate,
        })
    }

    pub fn total_income(&self) -> Decimal {
        self.wage_income + self.other_income
    }

    /// Rate change in percentage points (positive = tax increase).
    pub fn rate_change(&self) -> Decimal {
        self.new_marginal_rate - self.current_marginal_rate
    }

    pub fn is_increase(&self) -> bool {
        self.rate_change() > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn scenario(current: Decimal, new: Decimal) -> TaxScenario {
        TaxScenario::new(
            "a 35-year-old employee",
            FilingStatus::Single,
            dec!(75000),
            dec!(5000),
            current,
            new,
        )
        .unwrap()
    }

    #[test]
    fn total_income_sums_wage_and_other() {
        let s = scenario(dec!(0.22), dec!(0.27));

        assert_eq!(s.total_income(), dec!(80000));
    }

    #[test]
    fn rate_change_is_signed() {
        assert_eq!(scenario(dec!(0.22), dec!(0.27)).rate_change(), dec!(0.05));
        assert_eq!(scenario(dec!(0.22), dec!(0.17)).rate_change(), dec!(-0.05));
    }

    #[test]
    fn is_increase_tracks_rate_direction() {
        assert!(scenario(dec!(0.22), dec!(0.27)).is_increase());
        assert!(!scenario(dec!(0.22), dec!(0.17)).is_increase());
        assert!(!scenario(dec!(0.22), dec!(0.22)).is_increase());
    }

    #[test]
    fn new_rejects_negative_income() {
        let result = TaxScenario::new(
            "a taxpayer",
            FilingStatus::Single,
            dec!(-1),
            dec!(0),
            dec!(0.22),
            dec!(0.27),
        );

        assert_eq!(result, Err(InvalidInput::NegativeIncome(dec!(-1))));
    }

    #[test]
    fn new_rejects_rate_above_one() {
        let result = TaxScenario::new(
            "a taxpayer",
            FilingStatus::Single,
            dec!(75000),
            dec!(0),
            dec!(1.10),
            dec!(0.27),
        );

        assert_eq!(result, Err(InvalidInput::RateOutOfRange(dec!(1.10))));
    }
}

//! Marginal-rate bracket lookup and tax liability.
//!
//! A [`BracketTable`] is an ordered sequence of `(upper_bound, rate)` pairs
//! for one filing status, with the final bracket unbounded. The table is
//! validated once at construction and never mutated afterwards; the 2024
//! federal tables ship as process-wide constants behind [`federal_2024`].
//!
//! # Boundary rule
//!
//! Income exactly equal to a bracket's upper bound belongs to that (lower)
//! bracket. For a 2024 single filer, $11,600 is still in the 10% bracket and
//! $11,601 is the first dollar amount in the 12% bracket.
//!
//! # 2024 federal tables
//!
//! Source: IRS Revenue Procedure 2023-34.
//!
//! | Rate | Single    | Married joint | Married separate | Head of household |
//! |------|-----------|---------------|------------------|-------------------|
//! | 10%  | 11,600    | 23,200        | 11,600           | 16,550            |
//! | 12%  | 47,150    | 94,300        | 47,150           | 63,100            |
//! | 22%  | 100,525   | 201,050       | 100,525          | 100,500           |
//! | 24%  | 191,950   | 383,900       | 191,950          | 191,950           |
//! | 32%  | 243,725   | 487,450       | 243,725          | 243,700           |
//! | 35%  | 609,350   | 731,200       | 365,600          | 609,350           |
//! | 37%  | above     | above         | above            | above             |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use eti_core::{FilingStatus, federal_2024};
//!
//! let table = federal_2024(FilingStatus::Single);
//!
//! assert_eq!(table.marginal_rate(dec!(75000)).unwrap(), dec!(0.22));
//! assert_eq!(table.tax_liability(dec!(75000)).unwrap(), dec!(11553.00));
//! ```

use std::sync::OnceLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{InvalidInput, check_income};
use crate::models::{FilingStatus, TaxBracket};

/// Structural problems detected when building a [`BracketTable`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    /// The table has no brackets at all.
    #[error("bracket table is empty")]
    Empty,

    /// Upper bounds must be strictly increasing.
    #[error("bracket upper bounds must be strictly increasing at index {0}")]
    BoundsNotIncreasing(usize),

    /// Rates must be strictly increasing with bracket index.
    #[error("bracket rates must be strictly increasing at index {0}")]
    RatesNotIncreasing(usize),

    /// Every rate must lie in [0, 1].
    #[error("bracket rate must be between 0 and 1, got {0}")]
    RateOutOfRange(Decimal),

    /// Only the final bracket may be unbounded.
    #[error("unbounded bracket before the final position, at index {0}")]
    UnboundedBelowTop(usize),

    /// The final bracket must be unbounded so every income has a rate.
    #[error("the final bracket must be unbounded")]
    BoundedTop,
}

/// Detailed bracket position for a given income, used by prompt construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketInfo {
    pub marginal_rate: Decimal,
    /// Lower bound of the bracket containing the income (0 for the first).
    pub floor: Decimal,
    /// Upper bound of the bracket, `None` in the top bracket.
    pub ceiling: Option<Decimal>,
    /// Rate of the next-higher bracket, `None` in the top bracket.
    pub next_rate: Option<Decimal>,
}

/// A validated marginal-rate schedule for one filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTable {
    filing_status: FilingStatus,
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Builds a table, rejecting malformed bracket sequences.
    pub fn new(
        filing_status: FilingStatus,
        brackets: Vec<TaxBracket>,
    ) -> Result<Self, BracketTableError> {
        if brackets.is_empty() {
            return Err(BracketTableError::Empty);
        }

        let top = brackets.len() - 1;
        let mut prev_bound: Option<Decimal> = None;
        let mut prev_rate: Option<Decimal> = None;

        for (i, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(BracketTableError::RateOutOfRange(bracket.rate));
            }
            if prev_rate.is_some_and(|prev| bracket.rate <= prev) {
                return Err(BracketTableError::RatesNotIncreasing(i));
            }
            prev_rate = Some(bracket.rate);

            match bracket.upper_bound {
                Some(bound) => {
                    if i == top {
                        return Err(BracketTableError::BoundedTop);
                    }
                    if prev_bound.is_some_and(|prev| bound <= prev) {
                        return Err(BracketTableError::BoundsNotIncreasing(i));
                    }
                    prev_bound = Some(bound);
                }
                None => {
                    if i != top {
                        return Err(BracketTableError::UnboundedBelowTop(i));
                    }
                }
            }
        }

        Ok(Self {
            filing_status,
            brackets,
        })
    }

    pub fn filing_status(&self) -> FilingStatus {
        self.filing_status
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Marginal rate applying to the last dollar of `income`.
    pub fn marginal_rate(&self, income: Decimal) -> Result<Decimal, InvalidInput> {
        check_income(income)?;

        Ok(self.containing_bracket(income).1.rate)
    }

    /// Total tax due on `income`: each full bracket below contributes its
    /// whole span at its rate, the containing bracket contributes the
    /// remainder.
    pub fn tax_liability(&self, income: Decimal) -> Result<Decimal, InvalidInput> {
        check_income(income)?;

        let mut tax = Decimal::ZERO;
        let mut prev_ceiling = Decimal::ZERO;

        for bracket in &self.brackets {
            match bracket.upper_bound {
                Some(ceiling) if income > ceiling => {
                    tax += (ceiling - prev_ceiling) * bracket.rate;
                    prev_ceiling = ceiling;
                }
                _ => {
                    tax += (income - prev_ceiling) * bracket.rate;
                    break;
                }
            }
        }

        Ok(tax)
    }

    /// Average rate `liability / income`; defined as 0 at zero income.
    pub fn effective_rate(&self, income: Decimal) -> Result<Decimal, InvalidInput> {
        check_income(income)?;

        if income.is_zero() {
            return Ok(Decimal::ZERO);
        }

        Ok(self.tax_liability(income)? / income)
    }

    /// Bracket position details for `income`.
    pub fn bracket_info(&self, income: Decimal) -> Result<BracketInfo, InvalidInput> {
        check_income(income)?;

        let (index, bracket) = self.containing_bracket(income);
        let floor = if index == 0 {
            Decimal::ZERO
        } else {
            // Bounded by construction: only the final bracket is unbounded.
            self.brackets[index - 1].upper_bound.unwrap_or(Decimal::ZERO)
        };

        Ok(BracketInfo {
            marginal_rate: bracket.rate,
            floor,
            ceiling: bracket.upper_bound,
            next_rate: self.brackets.get(index + 1).map(|b| b.rate),
        })
    }

    fn containing_bracket(&self, income: Decimal) -> (usize, &TaxBracket) {
        for (i, bracket) in self.brackets.iter().enumerate() {
            match bracket.upper_bound {
                Some(bound) if income > bound => continue,
                _ => return (i, bracket),
            }
        }
        // Unreachable: the final bracket is unbounded by construction.
        (self.brackets.len() - 1, &self.brackets[self.brackets.len() - 1])
    }
}

/// The 2024 federal table for `status`, built once per process.
pub fn federal_2024(status: FilingStatus) -> &'static BracketTable {
    static TABLES: OnceLock<[BracketTable; 4]> = OnceLock::new();

    let tables = TABLES.get_or_init(|| {
        [
            federal_2024_table(FilingStatus::Single),
            federal_2024_table(FilingStatus::MarriedFilingJointly),
            federal_2024_table(FilingStatus::MarriedFilingSeparately),
            federal_2024_table(FilingStatus::HeadOfHousehold),
        ]
    });

    match status {
        FilingStatus::Single => &tables[0],
        FilingStatus::MarriedFilingJointly => &tables[1],
        FilingStatus::MarriedFilingSeparately => &tables[2],
        FilingStatus::HeadOfHousehold => &tables[3],
    }
}

fn federal_2024_table(status: FilingStatus) -> BracketTable {
    let bounds: [i64; 6] = match status {
        FilingStatus::Single => [11_600, 47_150, 100_525, 191_950, 243_725, 609_350],
        FilingStatus::MarriedFilingJointly => {
            [23_200, 94_300, 201_050, 383_900, 487_450, 731_200]
        }
        FilingStatus::MarriedFilingSeparately => {
            [11_600, 47_150, 100_525, 191_950, 243_725, 365_600]
        }
        FilingStatus::HeadOfHousehold => [16_550, 63_100, 100_500, 191_950, 243_700, 609_350],
    };
    let rates: [Decimal; 7] = [
        Decimal::new(10, 2),
        Decimal::new(12, 2),
        Decimal::new(22, 2),
        Decimal::new(24, 2),
        Decimal::new(32, 2),
        Decimal::new(35, 2),
        Decimal::new(37, 2),
    ];

    let mut brackets: Vec<TaxBracket> = bounds
        .iter()
        .zip(rates)
        .map(|(&bound, rate)| TaxBracket::bounded(Decimal::from(bound), rate))
        .collect();
    brackets.push(TaxBracket::top(rates[6]));

    BracketTable::new(status, brackets).expect("2024 federal bracket tables are well-formed")
}

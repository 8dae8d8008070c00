//! Bulk continuous simulation over an income × rate grid, in the style of
//! observational ETI studies: each cell reports last year's taxable income
//! and marginal rate, announces this year's rate, and asks for a numeric
//! taxable-income estimate. The elasticity implied by each answer comes
//! from the continuous-change formula.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use eti_core::calculations::common::check_rate;
use eti_core::{InvalidInput, eti};

use crate::parse::parse_income_response;
use crate::respondent::SurveyRespondent;
use crate::survey::bulk_income_prompt;

/// Failures while configuring or running the bulk simulation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("grid step must be positive, got {0}")]
    StepNotPositive(Decimal),

    #[error("grid minimum {min} exceeds maximum {max}")]
    EmptyRange { min: Decimal, max: Decimal },

    #[error(transparent)]
    Input(#[from] InvalidInput),
}

/// Grid and scenario parameters for one bulk run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub min_income: Decimal,
    pub max_income: Decimal,
    pub income_step: Decimal,
    pub min_rate: Decimal,
    pub max_rate: Decimal,
    pub rate_step: Decimal,
    pub responses_per_cell: u32,
    /// Last year's marginal rate, shared by every cell.
    pub prior_rate: Decimal,
    /// Share of broad income that was taxable last year.
    pub taxable_income_ratio: Decimal,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            min_income: Decimal::from(50_000),
            max_income: Decimal::from(200_000),
            income_step: Decimal::from(10_000),
            min_rate: Decimal::new(15, 2),
            max_rate: Decimal::new(35, 2),
            rate_step: Decimal::new(2, 2),
            responses_per_cell: 100,
            prior_rate: Decimal::new(25, 2),
            taxable_income_ratio: Decimal::new(75, 2),
        }
    }
}

impl SimulationParams {
    /// Inclusive income levels from `min_income` to `max_income`.
    pub fn income_grid(&self) -> Result<Vec<Decimal>, SimulationError> {
        grid(self.min_income, self.max_income, self.income_step)
    }

    /// Inclusive new-rate levels from `min_rate` to `max_rate`.
    pub fn rate_grid(&self) -> Result<Vec<Decimal>, SimulationError> {
        grid(self.min_rate, self.max_rate, self.rate_step)
    }
}

fn grid(min: Decimal, max: Decimal, step: Decimal) -> Result<Vec<Decimal>, SimulationError> {
    if step <= Decimal::ZERO {
        return Err(SimulationError::StepNotPositive(step));
    }
    if min > max {
        return Err(SimulationError::EmptyRange { min, max });
    }

    let mut levels = Vec::new();
    let mut level = min;
    while level <= max {
        levels.push(level);
        level += step;
    }
    Ok(levels)
}

/// One numeric answer with its cell context and implied elasticity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkObservation {
    pub timestamp: DateTime<Utc>,
    pub broad_income: Decimal,
    pub prior_taxable_income: Decimal,
    pub prior_rate: Decimal,
    pub new_rate: Decimal,
    pub response_number: u32,
    pub raw_response: String,
    pub parsed_income: Option<Decimal>,
    pub implied_eti: Option<Decimal>,
}

/// Runs the full income × rate grid against the respondent.
pub fn run_bulk_simulation<R: SurveyRespondent>(
    respondent: &mut R,
    params: &SimulationParams,
    timestamp: DateTime<Utc>,
) -> Result<Vec<BulkObservation>, SimulationError> {
    check_rate(params.prior_rate)?;
    check_rate(params.taxable_income_ratio)?;

    let incomes = params.income_grid()?;
    let rates = params.rate_grid()?;
    let mut observations =
        Vec::with_capacity(incomes.len() * rates.len() * params.responses_per_cell as usize);

    for &broad_income in &incomes {
        let prior_taxable_income = broad_income * params.taxable_income_ratio;

        for &new_rate in &rates {
            let prompt =
                bulk_income_prompt(broad_income, prior_taxable_income, params.prior_rate, new_rate);

            for response_number in 1..=params.responses_per_cell {
                let raw_response = respondent.respond(&prompt);
                let parsed_income = parse_income_response(&raw_response);

                let implied_eti = match parsed_income {
                    Some(new_income) => {
                        match eti(params.prior_rate, new_rate, prior_taxable_income, new_income) {
                            Ok(value) => value,
                            Err(err) => {
                                warn!(
                                    %err,
                                    %broad_income,
                                    %new_rate,
                                    raw = %raw_response.trim(),
                                    "answer outside the model domain, dropping the elasticity"
                                );
                                None
                            }
                        }
                    }
                    None => {
                        warn!(
                            %broad_income,
                            %new_rate,
                            raw = %raw_response.trim(),
                            "unparseable income response, dropping the observation"
                        );
                        None
                    }
                };

                observations.push(BulkObservation {
                    timestamp,
                    broad_income,
                    prior_taxable_income,
                    prior_rate: params.prior_rate,
                    new_rate,
                    response_number,
                    raw_response,
                    parsed_income,
                    implied_eti,
                });
            }
        }
        debug!(%broad_income, "completed income level");
    }

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::respondent::FnRespondent;

    use super::*;

    fn small_params() -> SimulationParams {
        SimulationParams {
            min_income: dec!(50000),
            max_income: dec!(70000),
            income_step: dec!(10000),
            min_rate: dec!(0.25),
            max_rate: dec!(0.30),
            rate_step: dec!(0.05),
            responses_per_cell: 2,
            prior_rate: dec!(0.25),
            taxable_income_ratio: dec!(0.75),
        }
    }

    // =========================================================================
    // grid tests
    // =========================================================================

    #[test]
    fn grids_are_inclusive_of_both_ends() {
        let params = small_params();

        assert_eq!(
            params.income_grid().unwrap(),
            vec![dec!(50000), dec!(60000), dec!(70000)]
        );
        assert_eq!(params.rate_grid().unwrap(), vec![dec!(0.25), dec!(0.30)]);
    }

    #[test]
    fn default_grids_match_the_study_design() {
        let params = SimulationParams::default();

        assert_eq!(params.income_grid().unwrap().len(), 16);
        assert_eq!(params.rate_grid().unwrap().len(), 11);
    }

    #[test]
    fn zero_step_is_rejected() {
        let params = SimulationParams {
            income_step: dec!(0),
            ..small_params()
        };

        assert_eq!(
            params.income_grid(),
            Err(SimulationError::StepNotPositive(dec!(0)))
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let params = SimulationParams {
            min_rate: dec!(0.40),
            max_rate: dec!(0.30),
            ..small_params()
        };

        assert_eq!(
            params.rate_grid(),
            Err(SimulationError::EmptyRange {
                min: dec!(0.40),
                max: dec!(0.30),
            })
        );
    }

    // =========================================================================
    // run_bulk_simulation tests
    // =========================================================================

    #[test]
    fn bulk_run_covers_every_cell_and_repetition() {
        let params = small_params();
        let mut respondent = FnRespondent(|_: &str| "$37,500".to_string());

        let rows = run_bulk_simulation(&mut respondent, &params, Utc::now()).unwrap();

        // 3 incomes x 2 rates x 2 responses.
        assert_eq!(rows.len(), 12);
    }

    #[test]
    fn unchanged_income_under_no_rate_change_is_undefined() {
        let params = SimulationParams {
            min_rate: dec!(0.25),
            max_rate: dec!(0.25),
            rate_step: dec!(0.05),
            responses_per_cell: 1,
            ..small_params()
        };
        let mut respondent = FnRespondent(|_: &str| "37500".to_string());

        let rows = run_bulk_simulation(&mut respondent, &params, Utc::now()).unwrap();

        // Rate stays at 25%: the elasticity denominator is zero.
        assert!(rows.iter().all(|row| row.implied_eti.is_none()));
        assert!(rows.iter().all(|row| row.parsed_income == Some(dec!(37500))));
    }

    #[test]
    fn reported_income_drop_under_rate_rise_gives_positive_eti() {
        let params = SimulationParams {
            min_income: dec!(100000),
            max_income: dec!(100000),
            min_rate: dec!(0.30),
            max_rate: dec!(0.30),
            responses_per_cell: 1,
            ..small_params()
        };
        // Prior taxable income is 75,000; answer 72,000 -> ETI ~ 0.6.
        let mut respondent = FnRespondent(|_: &str| "72000".to_string());

        let rows = run_bulk_simulation(&mut respondent, &params, Utc::now()).unwrap();

        let elasticity = rows[0].implied_eti.unwrap();
        assert!((elasticity - dec!(0.6)).abs() < dec!(0.01));
    }

    #[test]
    fn unparseable_answers_are_kept_with_empty_fields() {
        let params = SimulationParams {
            responses_per_cell: 1,
            ..small_params()
        };
        let mut respondent = FnRespondent(|_: &str| "it depends".to_string());

        let rows = run_bulk_simulation(&mut respondent, &params, Utc::now()).unwrap();

        assert!(rows.iter().all(|row| row.parsed_income.is_none()));
        assert!(rows.iter().all(|row| row.implied_eti.is_none()));
    }

    #[test]
    fn negative_reported_income_drops_the_elasticity_not_the_row() {
        let params = SimulationParams {
            responses_per_cell: 1,
            min_rate: dec!(0.30),
            max_rate: dec!(0.30),
            ..small_params()
        };
        let mut respondent = FnRespondent(|_: &str| "-5000".to_string());

        let rows = run_bulk_simulation(&mut respondent, &params, Utc::now()).unwrap();

        assert!(rows.iter().all(|row| row.parsed_income == Some(dec!(-5000))));
        assert!(rows.iter().all(|row| row.implied_eti.is_none()));
    }
}

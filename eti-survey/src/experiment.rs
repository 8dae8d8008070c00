//! Factorial survey experiment: income levels × rate changes × persona
//! kinds, each scenario asked repeatedly.
//!
//! The current marginal rate of every scenario is seeded from the real 2024
//! federal bracket tables at the scenario's income; the new rate applies the
//! configured change, capped into [0%, 50%]. The cap is generator policy for
//! keeping counterfactuals inside plausible US rates — the core calculations
//! themselves never clamp anything.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use eti_core::{
    CategoricalResponse, FilingStatus, InvalidInput, TaxScenario, eti_from_category, federal_2024,
};

use crate::parse::parse_categorical_response;
use crate::respondent::SurveyRespondent;
use crate::survey::{format_dollars, tax_survey_prompt};

/// Stylized persona archetypes used in the factorial design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaKind {
    WageWorker,
    SelfEmployed,
}

impl PersonaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WageWorker => "wage_worker",
            Self::SelfEmployed => "self_employed",
        }
    }

    pub fn description(&self, income: Decimal) -> String {
        match self {
            Self::WageWorker => format!(
                "a 35-year-old employee earning {} annually",
                format_dollars(income)
            ),
            Self::SelfEmployed => format!(
                "a 40-year-old self-employed consultant earning {} annually",
                format_dollars(income)
            ),
        }
    }
}

/// Factorial design parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub income_levels: Vec<Decimal>,
    /// Percentage-point changes applied to the scenario's base rate.
    pub rate_changes: Vec<Decimal>,
    pub persona_kinds: Vec<PersonaKind>,
    pub repetitions: u32,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            income_levels: vec![
                Decimal::from(40_000),
                Decimal::from(95_000),
                Decimal::from(180_000),
                Decimal::from(400_000),
            ],
            rate_changes: vec![Decimal::new(5, 2), Decimal::new(-5, 2)],
            persona_kinds: vec![PersonaKind::WageWorker, PersonaKind::SelfEmployed],
            repetitions: 50,
        }
    }
}

/// Highest counterfactual marginal rate the generator will propose.
const NEW_RATE_CAP: Decimal = Decimal::from_parts(50, 0, 0, false, 2);

/// Builds the full cross product of scenarios for the design.
pub fn generate_scenarios(config: &ExperimentConfig) -> Result<Vec<TaxScenario>, InvalidInput> {
    let mut scenarios = Vec::new();

    for &income in &config.income_levels {
        let base_rate = federal_2024(FilingStatus::Single).marginal_rate(income)?;

        for &change in &config.rate_changes {
            let new_rate = (base_rate + change).clamp(Decimal::ZERO, NEW_RATE_CAP);

            for &kind in &config.persona_kinds {
                let (wage_income, other_income) = match kind {
                    PersonaKind::WageWorker => (income, Decimal::ZERO),
                    PersonaKind::SelfEmployed => (Decimal::ZERO, income),
                };

                scenarios.push(TaxScenario::new(
                    kind.description(income),
                    FilingStatus::Single,
                    wage_income,
                    other_income,
                    base_rate,
                    new_rate,
                )?);
            }
        }
    }

    Ok(scenarios)
}

/// One survey answer with its scenario context and implied elasticity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub persona_description: String,
    pub filing_status: FilingStatus,
    pub wage_income: Decimal,
    pub other_income: Decimal,
    pub total_income: Decimal,
    pub current_rate: Decimal,
    pub new_rate: Decimal,
    pub rate_change: Decimal,
    pub is_increase: bool,
    pub repetition: u32,
    pub raw_response: String,
    pub parsed_response: Option<CategoricalResponse>,
    pub implied_eti: Option<Decimal>,
}

/// Runs every scenario `repetitions` times against the respondent.
///
/// Unparseable answers keep their raw text with `None` in the parsed and
/// elasticity fields; undefined elasticities (e.g. a scenario whose rate
/// change was capped away) are likewise `None`.
pub fn run_survey_experiment<R: SurveyRespondent>(
    respondent: &mut R,
    config: &ExperimentConfig,
    timestamp: DateTime<Utc>,
) -> Result<Vec<Observation>, InvalidInput> {
    let scenarios = generate_scenarios(config)?;
    let mut observations = Vec::with_capacity(scenarios.len() * config.repetitions as usize);

    for scenario in &scenarios {
        let prompt = tax_survey_prompt(scenario);

        for repetition in 1..=config.repetitions {
            let raw_response = respondent.respond(&prompt);
            let parsed_response = parse_categorical_response(&raw_response);

            let implied_eti = match parsed_response {
                Some(response) => eti_from_category(
                    response,
                    scenario.current_marginal_rate,
                    scenario.new_marginal_rate,
                )?,
                None => {
                    warn!(
                        persona = %scenario.persona_description,
                        repetition,
                        raw = %raw_response.trim(),
                        "unparseable survey response, dropping the observation"
                    );
                    None
                }
            };

            observations.push(Observation {
                timestamp,
                persona_description: scenario.persona_description.clone(),
                filing_status: scenario.filing_status,
                wage_income: scenario.wage_income,
                other_income: scenario.other_income,
                total_income: scenario.total_income(),
                current_rate: scenario.current_marginal_rate,
                new_rate: scenario.new_marginal_rate,
                rate_change: scenario.rate_change(),
                is_increase: scenario.is_increase(),
                repetition,
                raw_response,
                parsed_response,
                implied_eti,
            });
        }
    }

    Ok(observations)
}

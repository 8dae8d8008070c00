//! Lab-experiment replication in the style of Pfeil, Kasper, Necker & Feld
//! (2024), "Tax System Design, Tax Reform, and Labor Supply".
//!
//! Subjects choose how many hours to work across 16 rounds; after round 8
//! the tax regime is reformed (a two-bracket schedule replaced by a flat
//! rate, or vice versa). The two-bracket schedule places its high rate on
//! the entire income past the threshold — the notch whose bunching
//! incentive the experiment measures.
//!
//! The published parameterization uses a 50% upper rate and the notch
//! treatment, but replication variants run a 40% upper rate or ordinary
//! excess-only brackets, so both live in [`PknfConfig`] as parameters
//! rather than constants.

use chrono::{DateTime, Utc};
use rand::prelude::*;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use eti_core::calculations::common::{check_income, check_rate};
use eti_core::{InvalidInput, NotchSchedule, UpperBracketTreatment, labor_income};

use crate::parse::parse_labor_response;
use crate::respondent::SurveyRespondent;
use crate::survey::lab_decision_prompt;

/// Failures while configuring or running the lab experiment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PknfError {
    #[error("round must be between 1 and {rounds}, got {round}")]
    RoundOutOfRange { round: u32, rounds: u32 },

    #[error("endowment choice list is empty")]
    NoEndowmentChoices,

    #[error(transparent)]
    Input(#[from] InvalidInput),
}

/// Tax regime in force during one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabRegime {
    /// One rate on all income.
    Flat(Decimal),
    /// Two-bracket schedule, notch or kink per its treatment.
    TwoBracket(NotchSchedule),
}

impl LabRegime {
    /// Short machine name used in observation rows ("flat25", "progressive").
    pub fn name(&self) -> String {
        match self {
            Self::Flat(rate) => format!("flat{}", percent(*rate)),
            Self::TwoBracket(_) => "progressive".to_string(),
        }
    }

    pub fn tax(&self, income: Decimal) -> Result<Decimal, InvalidInput> {
        match self {
            Self::Flat(rate) => {
                check_rate(*rate)?;
                check_income(income)?;
                Ok(income * rate)
            }
            Self::TwoBracket(schedule) => schedule.tax(income),
        }
    }

    pub fn after_tax_income(&self, income: Decimal) -> Result<Decimal, InvalidInput> {
        Ok(income - self.tax(income)?)
    }

    pub fn is_notched(&self) -> bool {
        match self {
            Self::Flat(_) => false,
            Self::TwoBracket(schedule) => schedule.is_notched(),
        }
    }
}

fn percent(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).normalize()
}

/// Parameters of one experiment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PknfConfig {
    pub rounds: u32,
    /// Last pre-reform round; the regime switches starting at the next one.
    pub reform_round: u32,
    pub wage_per_unit: Decimal,
    pub threshold: Decimal,
    pub low_rate: Decimal,
    pub high_rate: Decimal,
    pub upper_treatment: UpperBracketTreatment,
    /// Per-round labor endowments are drawn uniformly from this list.
    pub endowment_choices: Vec<u32>,
}

impl Default for PknfConfig {
    fn default() -> Self {
        Self {
            rounds: 16,
            reform_round: 8,
            wage_per_unit: Decimal::from(20),
            threshold: Decimal::from(400),
            low_rate: Decimal::new(25, 2),
            high_rate: Decimal::new(50, 2),
            upper_treatment: UpperBracketTreatment::EntireIncome,
            endowment_choices: vec![14, 16, 20, 22, 24, 26, 28, 30],
        }
    }
}

impl PknfConfig {
    pub fn progressive(&self) -> LabRegime {
        LabRegime::TwoBracket(NotchSchedule {
            threshold: self.threshold,
            low_rate: self.low_rate,
            high_rate: self.high_rate,
            treatment: self.upper_treatment,
        })
    }

    pub fn flat_low(&self) -> LabRegime {
        LabRegime::Flat(self.low_rate)
    }

    pub fn flat_high(&self) -> LabRegime {
        LabRegime::Flat(self.high_rate)
    }
}

/// One experimental cell: which regime subjects face before and after the
/// reform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Treatment {
    /// Progressive in every round; no reform.
    Control,
    ProgToFlatLow,
    ProgToFlatHigh,
    FlatLowToProg,
    FlatHighToProg,
}

impl Treatment {
    pub const ALL: [Treatment; 5] = [
        Self::Control,
        Self::ProgToFlatLow,
        Self::ProgToFlatHigh,
        Self::FlatLowToProg,
        Self::FlatHighToProg,
    ];

    pub fn pre_reform(&self, config: &PknfConfig) -> LabRegime {
        match self {
            Self::Control | Self::ProgToFlatLow | Self::ProgToFlatHigh => config.progressive(),
            Self::FlatLowToProg => config.flat_low(),
            Self::FlatHighToProg => config.flat_high(),
        }
    }

    pub fn post_reform(&self, config: &PknfConfig) -> LabRegime {
        match self {
            Self::Control | Self::FlatLowToProg | Self::FlatHighToProg => config.progressive(),
            Self::ProgToFlatLow => config.flat_low(),
            Self::ProgToFlatHigh => config.flat_high(),
        }
    }

    /// Label used in result rows, e.g. "Prog,Flat25" under the default
    /// parameterization.
    pub fn label(&self, config: &PknfConfig) -> String {
        format!(
            "{},{}",
            regime_label(&self.pre_reform(config)),
            regime_label(&self.post_reform(config))
        )
    }

    /// Regime in force during `round` (1-based).
    pub fn regime_for_round(&self, round: u32, config: &PknfConfig) -> Result<LabRegime, PknfError> {
        if round == 0 || round > config.rounds {
            return Err(PknfError::RoundOutOfRange {
                round,
                rounds: config.rounds,
            });
        }

        if round <= config.reform_round {
            Ok(self.pre_reform(config))
        } else {
            Ok(self.post_reform(config))
        }
    }

    /// Whether the reform adds a two-bracket schedule where a flat rate was.
    pub fn introduces_notch(&self, config: &PknfConfig) -> bool {
        matches!(self.pre_reform(config), LabRegime::Flat(_))
            && matches!(self.post_reform(config), LabRegime::TwoBracket(_))
    }

    /// Whether the reform replaces the two-bracket schedule with a flat rate.
    pub fn removes_notch(&self, config: &PknfConfig) -> bool {
        matches!(self.pre_reform(config), LabRegime::TwoBracket(_))
            && matches!(self.post_reform(config), LabRegime::Flat(_))
    }
}

fn regime_label(regime: &LabRegime) -> String {
    match regime {
        LabRegime::Flat(rate) => format!("Flat{}", percent(*rate)),
        LabRegime::TwoBracket(_) => "Prog".to_string(),
    }
}

/// One subject-round of the lab experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabObservation {
    pub timestamp: DateTime<Utc>,
    pub treatment: String,
    pub subject_id: u32,
    pub round: u32,
    pub regime: String,
    pub post_reform: bool,
    pub labor_endowment: u32,
    pub raw_response: String,
    /// Hours the subject chose, `None` when the reply could not be parsed.
    pub labor_supply: Option<u32>,
    pub income: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub after_tax_income: Option<Decimal>,
}

/// Runs the full decision stage: every treatment × subject × round, with
/// per-round endowments drawn from `config.endowment_choices`. The draw
/// sequence is deterministic for a fixed `seed`.
pub fn run_lab_experiment<R: SurveyRespondent>(
    respondent: &mut R,
    config: &PknfConfig,
    treatments: &[Treatment],
    subjects_per_treatment: u32,
    seed: u64,
    timestamp: DateTime<Utc>,
) -> Result<Vec<LabObservation>, PknfError> {
    if config.endowment_choices.is_empty() {
        return Err(PknfError::NoEndowmentChoices);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut observations = Vec::new();

    for &treatment in treatments {
        let label = treatment.label(config);
        for subject_id in 0..subjects_per_treatment {
            for round in 1..=config.rounds {
                let regime = treatment.regime_for_round(round, config)?;
                let endowment = config
                    .endowment_choices
                    .choose(&mut rng)
                    .copied()
                    .ok_or(PknfError::NoEndowmentChoices)?;

                let prompt =
                    lab_decision_prompt(round, config.rounds, endowment, config.wage_per_unit, &regime)?;
                let raw_response = respondent.respond(&prompt);
                let labor_supply = parse_labor_response(&raw_response, endowment);

                let (income, tax, after_tax) = match labor_supply {
                    Some(units) => {
                        let income = labor_income(Decimal::from(units), config.wage_per_unit)?;
                        let tax = regime.tax(income)?;
                        (Some(income), Some(tax), Some(income - tax))
                    }
                    None => {
                        warn!(
                            treatment = %label,
                            subject_id,
                            round,
                            raw = %raw_response.trim(),
                            "unparseable labor decision, dropping the round"
                        );
                        (None, None, None)
                    }
                };

                observations.push(LabObservation {
                    timestamp,
                    treatment: label.clone(),
                    subject_id,
                    round,
                    regime: regime.name(),
                    post_reform: round > config.reform_round,
                    labor_endowment: endowment,
                    raw_response,
                    labor_supply,
                    income,
                    tax,
                    after_tax_income: after_tax,
                });
            }
            debug!(treatment = %label, subject_id, "completed subject");
        }
    }

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::respondent::FnRespondent;

    use super::*;

    #[test]
    fn default_config_matches_the_published_design() {
        let config = PknfConfig::default();

        assert_eq!(config.rounds, 16);
        assert_eq!(config.reform_round, 8);
        assert_eq!(config.wage_per_unit, dec!(20));
        assert_eq!(config.threshold, dec!(400));
        assert!(config.progressive().is_notched());
    }

    #[test]
    fn regime_names_follow_their_rates() {
        let config = PknfConfig::default();

        assert_eq!(config.flat_low().name(), "flat25");
        assert_eq!(config.flat_high().name(), "flat50");
        assert_eq!(config.progressive().name(), "progressive");
    }

    #[test]
    fn flat_regime_taxes_all_income_at_one_rate() {
        let regime = LabRegime::Flat(dec!(0.25));

        assert_eq!(regime.tax(dec!(400)), Ok(dec!(100.00)));
        assert_eq!(regime.after_tax_income(dec!(400)), Ok(dec!(300.00)));
    }

    #[test]
    fn treatment_labels_encode_both_regimes() {
        let config = PknfConfig::default();

        assert_eq!(Treatment::Control.label(&config), "Prog,Prog");
        assert_eq!(Treatment::ProgToFlatLow.label(&config), "Prog,Flat25");
        assert_eq!(Treatment::ProgToFlatHigh.label(&config), "Prog,Flat50");
        assert_eq!(Treatment::FlatLowToProg.label(&config), "Flat25,Prog");
        assert_eq!(Treatment::FlatHighToProg.label(&config), "Flat50,Prog");
    }

    #[test]
    fn labels_track_a_40_percent_variant() {
        let config = PknfConfig {
            high_rate: dec!(0.40),
            ..PknfConfig::default()
        };

        assert_eq!(Treatment::ProgToFlatHigh.label(&config), "Prog,Flat40");
    }

    #[test]
    fn regime_switches_exactly_after_the_reform_round() {
        let config = PknfConfig::default();
        let treatment = Treatment::ProgToFlatLow;

        assert_eq!(
            treatment.regime_for_round(8, &config),
            Ok(config.progressive())
        );
        assert_eq!(
            treatment.regime_for_round(9, &config),
            Ok(config.flat_low())
        );
    }

    #[test]
    fn control_never_switches() {
        let config = PknfConfig::default();
        for round in 1..=config.rounds {
            assert_eq!(
                Treatment::Control.regime_for_round(round, &config),
                Ok(config.progressive())
            );
        }
    }

    #[test]
    fn round_zero_and_past_the_end_are_rejected() {
        let config = PknfConfig::default();

        assert_eq!(
            Treatment::Control.regime_for_round(0, &config),
            Err(PknfError::RoundOutOfRange { round: 0, rounds: 16 })
        );
        assert_eq!(
            Treatment::Control.regime_for_round(17, &config),
            Err(PknfError::RoundOutOfRange { round: 17, rounds: 16 })
        );
    }

    #[test]
    fn notch_transitions_are_classified() {
        let config = PknfConfig::default();

        assert!(Treatment::FlatLowToProg.introduces_notch(&config));
        assert!(Treatment::ProgToFlatLow.removes_notch(&config));
        assert!(!Treatment::Control.introduces_notch(&config));
        assert!(!Treatment::Control.removes_notch(&config));
    }

    #[test]
    fn lab_experiment_produces_one_row_per_subject_round() {
        let config = PknfConfig::default();
        let mut respondent = FnRespondent(|_: &str| "20".to_string());

        let rows = run_lab_experiment(
            &mut respondent,
            &config,
            &[Treatment::Control, Treatment::ProgToFlatLow],
            3,
            42,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(rows.len(), 2 * 3 * 16);
    }

    #[test]
    fn lab_experiment_computes_after_tax_income_per_round_regime() {
        // Pin the endowment at 20 so every round allows exactly 20 hours:
        // income 400, right on the threshold.
        let config = PknfConfig {
            endowment_choices: vec![20],
            ..PknfConfig::default()
        };
        let mut respondent = FnRespondent(|_: &str| "I will work 20 hours".to_string());

        let rows = run_lab_experiment(
            &mut respondent,
            &config,
            &[Treatment::ProgToFlatHigh],
            1,
            7,
            Utc::now(),
        )
        .unwrap();

        for row in &rows {
            assert_eq!(row.labor_supply, Some(20));
            assert_eq!(row.income, Some(dec!(400)));
            if row.post_reform {
                // Flat 50%: 400 -> 200.
                assert_eq!(row.after_tax_income, Some(dec!(200.00)));
            } else {
                // Progressive, at the threshold: 400 -> 300.
                assert_eq!(row.after_tax_income, Some(dec!(300.00)));
            }
        }
    }

    #[test]
    fn unparseable_decisions_keep_the_raw_text_but_no_amounts() {
        let config = PknfConfig::default();
        let mut respondent = FnRespondent(|_: &str| "as many as I can!".to_string());

        let rows = run_lab_experiment(
            &mut respondent,
            &config,
            &[Treatment::Control],
            1,
            7,
            Utc::now(),
        )
        .unwrap();

        for row in &rows {
            assert_eq!(row.labor_supply, None);
            assert_eq!(row.income, None);
            assert_eq!(row.after_tax_income, None);
            assert_eq!(row.raw_response, "as many as I can!");
        }
    }

    #[test]
    fn endowment_draws_are_reproducible_for_a_seed() {
        let config = PknfConfig::default();
        let mut respondent = FnRespondent(|_: &str| "10".to_string());

        let a = run_lab_experiment(&mut respondent, &config, &[Treatment::Control], 2, 9, Utc::now());
        let mut respondent = FnRespondent(|_: &str| "10".to_string());
        let b = run_lab_experiment(&mut respondent, &config, &[Treatment::Control], 2, 9, Utc::now());

        let endowments = |rows: &[LabObservation]| {
            rows.iter().map(|r| r.labor_endowment).collect::<Vec<_>>()
        };
        assert_eq!(endowments(&a.unwrap()), endowments(&b.unwrap()));
    }

    #[test]
    fn empty_endowment_list_is_rejected() {
        let config = PknfConfig {
            endowment_choices: vec![],
            ..PknfConfig::default()
        };
        let mut respondent = FnRespondent(|_: &str| "10".to_string());

        let result = run_lab_experiment(
            &mut respondent,
            &config,
            &[Treatment::Control],
            1,
            7,
            Utc::now(),
        );

        assert_eq!(result, Err(PknfError::NoEndowmentChoices));
    }
}

//! Taxpayer persona generation for survey prompts.
//!
//! Personas are sampled from rough CPS/ACS-like demographic distributions:
//! filing statuses weighted to the US mix, working-age ages, and incomes
//! that rise with age and spread out for the self-employed. Sampling is
//! seeded so a run can be reproduced exactly.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use eti_core::FilingStatus;

/// Validation failures when building a [`Persona`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PersonaError {
    #[error("income cannot be negative, got {0}")]
    NegativeIncome(Decimal),

    #[error("age must be between 0 and 120, got {0}")]
    AgeOutOfRange(u32),
}

/// A simulated taxpayer handed to the survey prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub occupation: String,
    pub filing_status: FilingStatus,
    pub wage_income: Decimal,
    pub other_income: Decimal,
    pub num_dependents: u32,
    pub is_self_employed: bool,
    pub age: u32,
}

impl Persona {
    pub fn new(
        name: impl Into<String>,
        occupation: impl Into<String>,
        filing_status: FilingStatus,
        wage_income: Decimal,
        other_income: Decimal,
        num_dependents: u32,
        is_self_employed: bool,
        age: u32,
    ) -> Result<Self, PersonaError> {
        if wage_income < Decimal::ZERO {
            return Err(PersonaError::NegativeIncome(wage_income));
        }
        if other_income < Decimal::ZERO {
            return Err(PersonaError::NegativeIncome(other_income));
        }
        if age > 120 {
            return Err(PersonaError::AgeOutOfRange(age));
        }

        Ok(Self {
            name: name.into(),
            occupation: occupation.into(),
            filing_status,
            wage_income,
            other_income,
            num_dependents,
            is_self_employed,
            age,
        })
    }

    pub fn total_income(&self) -> Decimal {
        self.wage_income + self.other_income
    }

    /// Natural-language blurb used as the survey prompt's opening line.
    pub fn description(&self) -> String {
        let status_desc = match self.filing_status {
            FilingStatus::Single => "single",
            FilingStatus::MarriedFilingJointly => "married",
            FilingStatus::HeadOfHousehold => "single parent",
            FilingStatus::MarriedFilingSeparately => "married, filing separately",
        };

        let dep_desc = match self.num_dependents {
            0 => "no dependents".to_string(),
            1 => "1 dependent".to_string(),
            n => format!("{n} dependents"),
        };

        let occupation = self.occupation.to_lowercase();
        let emp_desc = if self.is_self_employed {
            format!("self-employed {occupation}")
        } else {
            occupation
        };

        format!(
            "{}, a {}-year-old {}, {} with {}",
            self.name, self.age, emp_desc, status_desc, dep_desc
        )
    }
}

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Michael", "Patricia", "Robert", "Jennifer", "David", "Linda", "William",
    "Elizabeth", "Richard", "Barbara", "Joseph", "Susan", "Thomas", "Jessica", "Charles", "Sarah",
    "Christopher", "Karen", "Daniel", "Lisa", "Matthew", "Nancy", "Anthony", "Betty", "Mark",
    "Margaret", "Donald", "Sandra", "Wei", "Priya", "Mohammed", "Fatima", "Carlos", "Maria",
    "Hiroshi", "Yuki", "Ahmed", "Aisha", "Ivan", "Olga",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Chen", "Patel", "Kim",
    "Nguyen", "Singh", "Ali", "Yamamoto", "Ivanov", "Mueller", "Andersson", "Johansson",
];

const OCCUPATIONS: &[&str] = &[
    "Software Engineer",
    "Teacher",
    "Nurse",
    "Accountant",
    "Sales Manager",
    "Marketing Specialist",
    "Financial Analyst",
    "Lawyer",
    "Doctor",
    "Retail Manager",
    "Administrative Assistant",
    "Construction Worker",
    "Electrician",
    "Real Estate Agent",
    "Consultant",
];

/// Draws `n` personas from the demographic distributions, deterministically
/// for a fixed `seed`.
pub fn sample_personas(n: usize, seed: u64) -> Vec<Persona> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| sample_one(&mut rng)).collect()
}

fn sample_one(rng: &mut StdRng) -> Persona {
    let name = format!(
        "{} {}",
        FIRST_NAMES.choose(rng).copied().unwrap_or("James"),
        LAST_NAMES.choose(rng).copied().unwrap_or("Smith"),
    );
    let occupation = OCCUPATIONS.choose(rng).copied().unwrap_or("Consultant");

    // Filing statuses weighted roughly to the US distribution:
    // 40% single, 45% married joint, 10% head of household, 5% separate.
    let status_roll: f64 = rng.gen_range(0.0..1.0);
    let (filing_status, num_dependents) = if status_roll < 0.40 {
        (FilingStatus::Single, 0)
    } else if status_roll < 0.85 {
        (
            FilingStatus::MarriedFilingJointly,
            weighted_choice(rng, &[(0, 0.30), (1, 0.25), (2, 0.30), (3, 0.15)]),
        )
    } else if status_roll < 0.95 {
        (
            FilingStatus::HeadOfHousehold,
            weighted_choice(rng, &[(1, 0.40), (2, 0.40), (3, 0.20)]),
        )
    } else {
        (
            FilingStatus::MarriedFilingSeparately,
            weighted_choice(rng, &[(0, 0.50), (1, 0.30), (2, 0.20)]),
        )
    };

    let is_self_employed = rng.gen_range(0.0..1.0) < 0.10;

    let age_dist = Normal::new(42.0, 12.0).expect("valid normal parameters");
    let age = (age_dist.sample(rng) as i64).clamp(22, 70) as u32;

    let income_dist = Normal::new(75_000.0, 40_000.0).expect("valid normal parameters");
    let mut base_income: f64 = income_dist.sample(rng);
    // Earnings premium peaks around age 50.
    let age_factor = 1.0 + 0.02 * (age.min(50) as f64 - 25.0);
    if is_self_employed {
        base_income *= rng.gen_range(0.5..1.5);
    }
    let wage_income = (base_income * age_factor).max(25_000.0);

    // Investment income picks up with age.
    let other_share = if age > 50 {
        rng.gen_range(0.0..0.20)
    } else {
        rng.gen_range(0.0..0.05)
    };
    let other_income = other_share * wage_income;

    Persona {
        name,
        occupation: occupation.to_string(),
        filing_status,
        wage_income: Decimal::from(wage_income.round() as i64),
        other_income: Decimal::from(other_income.round() as i64),
        num_dependents,
        is_self_employed,
        age,
    }
}

fn weighted_choice(rng: &mut StdRng, choices: &[(u32, f64)]) -> u32 {
    let total: f64 = choices.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0.0..1.0) * total;
    for &(value, weight) in choices {
        if roll < weight {
            return value;
        }
        roll -= weight;
    }
    choices.last().map(|&(value, _)| value).unwrap_or(0)
}

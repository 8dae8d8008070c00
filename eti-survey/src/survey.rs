//! Natural-language prompt rendering for the survey and lab experiments.
//!
//! These functions turn validated scenario data into the exact text put in
//! front of a simulated respondent. They do no parsing and no elasticity
//! math; worked tax examples inside the lab prompt are computed from the
//! round's schedule so prompt and scoring can never disagree.

use rust_decimal::Decimal;

use eti_core::{InvalidInput, TaxScenario, UpperBracketTreatment};

use crate::pknf::LabRegime;

/// Categorical survey prompt for one tax-change scenario.
pub fn tax_survey_prompt(scenario: &TaxScenario) -> String {
    let direction_verb = if scenario.is_increase() {
        "will increase"
    } else {
        "will decrease"
    };

    let current_pct = format_percent(scenario.current_marginal_rate);
    let new_pct = format_percent(scenario.new_marginal_rate);
    let change_pct = format_percent(scenario.rate_change().abs());

    let mut prompt = format!(
        "You are {}.\n\n\
         Your current tax situation:\n\
         - Filing status: {}\n\
         - Annual wage/salary income: {}",
        scenario.persona_description,
        scenario.filing_status.display_name(),
        format_dollars(scenario.wage_income),
    );

    if scenario.other_income > Decimal::ZERO {
        prompt.push_str(&format!(
            "\n- Other income (investments, etc.): {}",
            format_dollars(scenario.other_income)
        ));
    }

    prompt.push_str(&format!(
        "\n- Current federal marginal tax rate: {current_pct}%\n\n\
         A tax law change {direction_verb} your marginal tax rate by {change_pct} percentage \
         points, from {current_pct}% to {new_pct}%.\n\n\
         Consider how this might affect your:\n\
         1. Work effort (overtime, side jobs, career advancement)\n\
         2. Tax planning (timing of income, retirement contributions, deductions)\n\
         3. Other financial decisions\n\n\
         Question: Compared to this year, what would your taxable income be NEXT year after \
         the tax change takes effect?\n\n\
         Please select ONE of the following:\n\
         - MUCH_LOWER: My taxable income would decrease by 10% or more\n\
         - SOMEWHAT_LOWER: My taxable income would decrease by 2-10%\n\
         - ABOUT_SAME: My taxable income would stay about the same (within 2%)\n\
         - SOMEWHAT_HIGHER: My taxable income would increase by 2-10%\n\
         - MUCH_HIGHER: My taxable income would increase by 10% or more\n\n\
         After selecting your response, briefly explain your reasoning.\n\n\
         Your response:"
    ));

    prompt
}

/// Numeric-answer prompt for the bulk (observational-style) simulation.
pub fn bulk_income_prompt(
    broad_income: Decimal,
    taxable_income: Decimal,
    prior_rate: Decimal,
    new_rate: Decimal,
) -> String {
    format!(
        "You are a taxpayer with the following tax profile:\n\
         - Your broad income last year was {}\n\
         - Your taxable income last year was {}\n\
         - Your marginal tax rate last year was {}%\n\n\
         This year, if you had the same broad income, your marginal tax rate will change \
         to {}%.\n\n\
         Given this change, estimate your taxable income for this year.\n\
         Please provide only a numeric value in dollars.",
        format_dollars(broad_income),
        format_dollars(taxable_income),
        format_percent(prior_rate),
        format_percent(new_rate),
    )
}

/// Round prompt for the lab experiment, with a worked tax example computed
/// from the round's regime.
pub fn lab_decision_prompt(
    round: u32,
    rounds: u32,
    labor_endowment: u32,
    wage_per_unit: Decimal,
    regime: &LabRegime,
) -> Result<String, InvalidInput> {
    let (tax_desc, example) = match regime {
        LabRegime::Flat(rate) => {
            let income = Decimal::from(labor_endowment) * wage_per_unit;
            let tax = regime.tax(income)?;
            let desc = format!(
                "All of your income is taxed at a flat rate of {}%.",
                format_percent(*rate)
            );
            let example = format!(
                "If you work all {labor_endowment} hours and earn {}, you pay {} in taxes \
                 and keep {}.",
                format_dollars(income),
                format_dollars(tax),
                format_dollars(income - tax),
            );
            (desc, example)
        }
        LabRegime::TwoBracket(schedule) => {
            let desc = match schedule.treatment {
                UpperBracketTreatment::EntireIncome => format!(
                    "Income up to {} is taxed at {}%.\n\
                     If your income exceeds {}, the {}% rate applies to your ENTIRE income.",
                    format_dollars(schedule.threshold),
                    format_percent(schedule.low_rate),
                    format_dollars(schedule.threshold),
                    format_percent(schedule.high_rate),
                ),
                UpperBracketTreatment::ExcessOnly => format!(
                    "Income up to {} is taxed at {}%.\n\
                     Income above {} is taxed at {}%.",
                    format_dollars(schedule.threshold),
                    format_percent(schedule.low_rate),
                    format_dollars(schedule.threshold),
                    format_percent(schedule.high_rate),
                ),
            };

            let at = schedule.threshold;
            let past = schedule.threshold + wage_per_unit;
            let net_at = schedule.after_tax_income(at)?;
            let net_past = schedule.after_tax_income(past)?;
            let note = if net_past < net_at {
                format!(
                    "Notice: earning {} more pre-tax LOWERS your after-tax income.",
                    format_dollars(wage_per_unit)
                )
            } else {
                format!(
                    "Notice: the extra {} earned only adds {} after taxes.",
                    format_dollars(wage_per_unit),
                    format_dollars(net_past - net_at),
                )
            };
            let example = format!(
                "Earning {} means {} in taxes; you keep {}.\n\
                 Earning {} means {} in taxes; you keep {}.\n\
                 {note}",
                format_dollars(at),
                format_dollars(schedule.tax(at)?),
                format_dollars(net_at),
                format_dollars(past),
                format_dollars(schedule.tax(past)?),
                format_dollars(net_past),
            );
            (desc, example)
        }
    };

    Ok(format!(
        "LABOR DECISION - Round {round} of {rounds}\n\n\
         You have {labor_endowment} hours available to work this round.\n\
         Each hour of work earns {}.\n\n\
         TAX SYSTEM:\n{tax_desc}\n\n\
         EXAMPLE:\n{example}\n\n\
         You can choose to work anywhere from 0 to {labor_endowment} hours.\n\
         Your goal is to maximize your after-tax income considering both earnings and \
         leisure.\n\n\
         How many hours will you work? (Enter a number from 0 to {labor_endowment})\n\n\
         Your decision:",
        format_dollars(wage_per_unit),
    ))
}

/// Whole-dollar rendering with thousands separators: `$85,000`.
pub(crate) fn format_dollars(amount: Decimal) -> String {
    let rounded = amount.round().to_string();
    let sign = if rounded.starts_with('-') { "-" } else { "" };
    let digits = rounded.trim_start_matches('-');

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{sign}${grouped}")
}

/// Rate rendered as a whole percentage: 0.22 -> "22".
pub(crate) fn format_percent(rate: Decimal) -> String {
    (rate * Decimal::ONE_HUNDRED).round().normalize().to_string()
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 4] = [
        Self::Single,
        Self::MarriedFilingJointly,
        Self::MarriedFilingSeparately,
        Self::HeadOfHousehold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::MarriedFilingJointly => "married_filing_jointly",
            Self::MarriedFilingSeparately => "married_filing_separately",
            Self::HeadOfHousehold => "head_of_household",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "single" => Some(Self::Single),
            "married_filing_jointly" => Some(Self::MarriedFilingJointly),
            "married_filing_separately" => Some(Self::MarriedFilingSeparately),
            "head_of_household" => Some(Self::HeadOfHousehold),
            _ => None,
        }
    }

    /// Short label used in survey prompts ("married, filing separately" etc.).
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::MarriedFilingJointly => "married filing jointly",
            Self::MarriedFilingSeparately => "married filing separately",
            Self::HeadOfHousehold => "head of household",
        }
    }
}

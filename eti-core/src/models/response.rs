use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Categorical answer options offered to survey respondents.
///
/// Each category is bound to a fixed percent-change midpoint used when
/// converting a response into an elasticity estimate:
///
/// | Category          | Band            | Midpoint |
/// |-------------------|-----------------|----------|
/// | `MuchLower`       | down 10% or more| -15%     |
/// | `SomewhatLower`   | down 2-10%      | -6%      |
/// | `AboutSame`       | within 2%       | 0%       |
/// | `SomewhatHigher`  | up 2-10%        | +6%      |
/// | `MuchHigher`      | up 10% or more  | +15%     |
///
/// The midpoints are a modeling choice, not a measured quantity. Study
/// designs that need a different mapping should call
/// [`eti_from_percent_change`](crate::eti_from_percent_change) directly
/// instead of going through [`eti_from_category`](crate::eti_from_category).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalResponse {
    MuchLower,
    SomewhatLower,
    AboutSame,
    SomewhatHigher,
    MuchHigher,
}

impl CategoricalResponse {
    pub const ALL: [CategoricalResponse; 5] = [
        Self::MuchLower,
        Self::SomewhatLower,
        Self::AboutSame,
        Self::SomewhatHigher,
        Self::MuchHigher,
    ];

    /// Percent-change-in-income midpoint assigned to this category.
    pub fn midpoint(&self) -> Decimal {
        match self {
            Self::MuchLower => Decimal::new(-15, 2),
            Self::SomewhatLower => Decimal::new(-6, 2),
            Self::AboutSame => Decimal::ZERO,
            Self::SomewhatHigher => Decimal::new(6, 2),
            Self::MuchHigher => Decimal::new(15, 2),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MuchLower => "much_lower",
            Self::SomewhatLower => "somewhat_lower",
            Self::AboutSame => "about_same",
            Self::SomewhatHigher => "somewhat_higher",
            Self::MuchHigher => "much_higher",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "much_lower" => Some(Self::MuchLower),
            "somewhat_lower" => Some(Self::SomewhatLower),
            "about_same" => Some(Self::AboutSame),
            "somewhat_higher" => Some(Self::SomewhatHigher),
            "much_higher" => Some(Self::MuchHigher),
            _ => None,
        }
    }
}

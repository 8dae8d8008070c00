pub mod calculations;
pub mod models;

pub use calculations::brackets::{BracketInfo, BracketTable, BracketTableError, federal_2024};
pub use calculations::common::InvalidInput;
pub use calculations::elasticity::{eti, eti_from_category, eti_from_percent_change};
pub use calculations::lab::{NotchSchedule, UpperBracketTreatment, labor_income};
pub use models::*;

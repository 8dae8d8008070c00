//! Deterministic economic calculations behind the survey toolkit.
//!
//! Everything in here is a pure function over immutable inputs: no I/O, no
//! clocks, no shared state. Identical inputs always produce identical
//! outputs, so calling infrastructure may memoize results keyed by the input
//! tuple.

pub mod brackets;
pub mod common;
pub mod elasticity;
pub mod lab;

pub use brackets::{BracketInfo, BracketTable, BracketTableError, federal_2024};
pub use common::InvalidInput;
pub use elasticity::{eti, eti_from_category, eti_from_percent_change};
pub use lab::{NotchSchedule, UpperBracketTreatment, labor_income};

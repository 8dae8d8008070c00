mod filing_status;
mod response;
mod scenario;
mod tax_bracket;

pub use filing_status::FilingStatus;
pub use response::CategoricalResponse;
pub use scenario::TaxScenario;
pub use tax_bracket::TaxBracket;

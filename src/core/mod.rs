mod engine;
mod location;
mod tax;
mod types;

pub use engine::{calculate_viability, estimate_location};
pub use location::estimate_cost_of_living;
pub use tax::estimate_tax_burden;
pub use types::{
    FinancialLocationEstimate, GROSS_INCOME_FIELD, GROSS_INCOME_MESSAGE, IncomeViabilityInput,
    IncomeViabilityOutput, NOT_VIABLE_ASSESSMENT, POSTAL_CODE_FIELD, POSTAL_CODE_MESSAGE,
    PostalCode, VIABLE_ASSESSMENT, ViabilityFigures, rule_based_assessment,
};

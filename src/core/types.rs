use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const GROSS_INCOME_FIELD: &str = "grossIncome";
pub const POSTAL_CODE_FIELD: &str = "postalCode";

pub const GROSS_INCOME_MESSAGE: &str = "Please enter your annual gross income.";
pub const POSTAL_CODE_MESSAGE: &str = "Please enter a valid 5-digit zip code.";

/// A US-style postal code: exactly five ASCII digits.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.len() == 5 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ValidationError::field(POSTAL_CODE_FIELD, POSTAL_CODE_MESSAGE))
        }
    }

    /// Numeric value of the first three digits.
    pub fn prefix(&self) -> u16 {
        self.0.as_bytes()[..3]
            .iter()
            .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeViabilityInput {
    pub gross_income: f64,
    pub postal_code: PostalCode,
}

impl IncomeViabilityInput {
    /// Validates both fields, reporting every failing field at once.
    pub fn new(gross_income: f64, postal_code: &str) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::default();

        if !gross_income.is_finite() || gross_income <= 0.0 {
            errors.push_field(GROSS_INCOME_FIELD, GROSS_INCOME_MESSAGE);
        }

        let postal_code = match PostalCode::parse(postal_code) {
            Ok(code) => Some(code),
            Err(err) => {
                errors.field_errors.extend(err.field_errors);
                None
            }
        };

        match postal_code {
            Some(postal_code) if errors.is_empty() => Ok(Self {
                gross_income,
                postal_code,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialLocationEstimate {
    pub tax_burden: f64,
    pub cost_of_living: f64,
}

/// The deterministic part of a viability result.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViabilityFigures {
    pub gross_income: f64,
    pub tax_burden: f64,
    pub cost_of_living: f64,
    pub net_income: f64,
    pub disposable_income: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeViabilityOutput {
    pub tax_burden: f64,
    pub cost_of_living: f64,
    pub net_income: f64,
    pub disposable_income: f64,
    pub assessment: String,
}

impl IncomeViabilityOutput {
    pub fn with_assessment(figures: &ViabilityFigures, assessment: String) -> Self {
        Self {
            tax_burden: figures.tax_burden,
            cost_of_living: figures.cost_of_living,
            net_income: figures.net_income,
            disposable_income: figures.disposable_income,
            assessment,
        }
    }

    /// Output carrying the rule-based assessment, no collaborator involved.
    pub fn from_figures(figures: &ViabilityFigures) -> Self {
        Self::with_assessment(figures, rule_based_assessment(figures).to_string())
    }
}

pub const VIABLE_ASSESSMENT: &str = "This income appears viable for the selected location.";
pub const NOT_VIABLE_ASSESSMENT: &str =
    "This income may not be viable without significant budgeting in the selected location.";

pub fn rule_based_assessment(figures: &ViabilityFigures) -> &'static str {
    if figures.disposable_income >= 0.0 {
        VIABLE_ASSESSMENT
    } else {
        NOT_VIABLE_ASSESSMENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postal_code_is_trimmed_and_keeps_leading_zeros() {
        let code = PostalCode::parse(" 00501 ").expect("valid code");
        assert_eq!(code.as_str(), "00501");
        assert_eq!(code.prefix(), 5);
    }

    #[test]
    fn postal_code_rejects_anything_but_five_ascii_digits() {
        for raw in ["", "1234", "123456", "12a45", "+1234", "12345-6789", "١٢٣٤٥"] {
            let err = PostalCode::parse(raw).expect_err(raw);
            assert_eq!(err.messages_for(POSTAL_CODE_FIELD), [POSTAL_CODE_MESSAGE.to_string()]);
        }
    }

    #[test]
    fn prefix_is_first_three_digits() {
        assert_eq!(PostalCode::parse("90210").expect("valid").prefix(), 902);
        assert_eq!(PostalCode::parse("10001").expect("valid").prefix(), 100);
    }
}

use serde::{Deserialize, Serialize};

use super::{Flow, FormFlow, require_text};
use crate::error::ValidationError;
use crate::forms::{FormData, FormReader};
use crate::narrative::prompt::OutputField;

pub const DISCLAIMER: &str = "**Disclaimer:** I am an AI assistant and not a certified tax professional. These are general educational suggestions, not financial advice. Please consult a qualified professional for personalized tax planning.";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum FilingStatus {
    #[serde(rename = "Single")]
    Single,
    #[serde(rename = "Married Filing Jointly")]
    MarriedFilingJointly,
    #[serde(rename = "Married Filing Separately")]
    MarriedFilingSeparately,
    #[serde(rename = "Head of Household")]
    HeadOfHousehold,
    #[serde(rename = "Qualifying Widow(er)")]
    QualifyingWidower,
}

const FILING_STATUSES: [(&str, FilingStatus); 5] = [
    ("Single", FilingStatus::Single),
    ("Married Filing Jointly", FilingStatus::MarriedFilingJointly),
    ("Married Filing Separately", FilingStatus::MarriedFilingSeparately),
    ("Head of Household", FilingStatus::HeadOfHousehold),
    ("Qualifying Widow(er)", FilingStatus::QualifyingWidower),
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxOptimizerInput {
    pub income: f64,
    pub filing_status: FilingStatus,
    pub current_deductions: String,
    pub retirement_contribution: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxOptimizerOutput {
    pub suggestions: String,
}

pub struct TaxOptimizer;

impl Flow for TaxOptimizer {
    const NAME: &'static str = "tax-optimizer";
    const SYSTEM: &'static str =
        "You are an AI financial assistant providing educational tax optimization suggestions.";
    const TEMPLATE: &'static str = "\
IMPORTANT: Start your response with a clear disclaimer: \"**Disclaimer:** I am an AI assistant and not a certified tax professional. These are general educational suggestions, not financial advice. Please consult a qualified professional for personalized tax planning.\"

Based on the user's financial profile, provide a list of common tax-saving strategies they might consider exploring. For each suggestion, provide a brief, easy-to-understand explanation.

User Profile:
- Annual Income: ${{{income}}}
- Filing Status: {{{filingStatus}}}
- Current Known Deductions: {{{currentDeductions}}}
- Annual Retirement Contribution: ${{{retirementContribution}}}

Suggestions should be actionable and relevant to the user's profile. Focus on common areas like retirement accounts (401k, IRA), HSAs, and potential itemized deductions if applicable. Format the suggestions as a markdown list.";
    const OUTPUT_FIELDS: &'static [OutputField] = &[OutputField {
        name: "suggestions",
        kind: "string",
        description: "A markdown-formatted string with actionable tax optimization suggestions.",
    }];

    type Input = TaxOptimizerInput;
    type Output = TaxOptimizerOutput;

    fn finalize(
        _input: &TaxOptimizerInput,
        output: TaxOptimizerOutput,
    ) -> Result<TaxOptimizerOutput, String> {
        require_text("suggestions", &output.suggestions)?;
        let suggestions = output.suggestions.trim();
        let suggestions = if suggestions.starts_with("**Disclaimer:**") {
            suggestions.to_string()
        } else {
            format!("{DISCLAIMER}\n\n{suggestions}")
        };
        Ok(TaxOptimizerOutput { suggestions })
    }
}

impl FormFlow for TaxOptimizer {
    const SUCCESS_MESSAGE: &'static str = "Success! Your suggestions are ready.";
    const FAILURE_MESSAGE: &'static str =
        "The AI could not generate suggestions. Please try again.";

    fn parse_form(form: &FormData) -> Result<TaxOptimizerInput, ValidationError> {
        let mut reader = FormReader::new(form);
        let income =
            reader.number_at_least("income", 1.0, "Please enter your annual gross income.");
        let filing_status = reader.choice(
            "filingStatus",
            &FILING_STATUSES,
            "Please select a valid filing status.",
        );
        let current_deductions = reader.text_at_least(
            "currentDeductions",
            1,
            "Please describe your current deductions.",
        );
        let retirement_contribution = reader.number_at_least(
            "retirementContribution",
            0.0,
            "Please enter your annual retirement contribution.",
        );
        reader.finish()?;

        Ok(TaxOptimizerInput {
            income,
            filing_status: filing_status.unwrap_or(FilingStatus::Single),
            current_deductions,
            retirement_contribution,
        })
    }
}

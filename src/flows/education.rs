use serde::{Deserialize, Serialize};

use super::{Flow, FormFlow, require_text};
use crate::error::ValidationError;
use crate::forms::{FormData, FormReader};
use crate::narrative::prompt::OutputField;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationInput {
    pub income: f64,
    pub debts: String,
    pub expenses: String,
    pub savings: f64,
    pub financial_goals: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationOutput {
    pub suggested_content: String,
}

pub struct FinancialEducation;

impl Flow for FinancialEducation {
    const NAME: &'static str = "financial-education";
    const SYSTEM: &'static str =
        "You are a financial advisor who provides personalized financial education content based on a user's financial situation and goals.";
    const TEMPLATE: &'static str = "\
Analyze the user's income, debts, expenses, savings, and financial goals to identify areas where they could benefit from financial education.

Provide a list of specific financial education topics or resources that would be helpful for the user. Format the list as markdown.

Income: {{{income}}}
Debts: {{{debts}}}
Expenses: {{{expenses}}}
Savings: {{{savings}}}
Financial Goals: {{{financialGoals}}}";
    const OUTPUT_FIELDS: &'static [OutputField] = &[OutputField {
        name: "suggestedContent",
        kind: "string",
        description: "Suggested financial education topics or resources, formatted as a markdown list.",
    }];

    type Input = EducationInput;
    type Output = EducationOutput;

    fn finalize(
        _input: &EducationInput,
        output: EducationOutput,
    ) -> Result<EducationOutput, String> {
        require_text("suggestedContent", &output.suggested_content)?;
        Ok(output)
    }
}

impl FormFlow for FinancialEducation {
    const SUCCESS_MESSAGE: &'static str = "Success! Your content is ready.";
    const FAILURE_MESSAGE: &'static str = "The AI could not generate content. Please try again.";

    fn parse_form(form: &FormData) -> Result<EducationInput, ValidationError> {
        let mut reader = FormReader::new(form);
        let input = EducationInput {
            income: reader.number("income", "Please enter your monthly income."),
            debts: reader.text("debts", "Debts are required."),
            expenses: reader.text("expenses", "Expenses are required."),
            savings: reader.number("savings", "Please enter your current savings."),
            financial_goals: reader.text_at_least(
                "financialGoals",
                10,
                "Please describe your financial goals in a bit more detail.",
            ),
        };
        reader.finish()?;
        Ok(input)
    }
}

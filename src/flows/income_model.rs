use serde::{Deserialize, Serialize};

use super::{Flow, FormFlow, require_amount, require_text};
use crate::error::ValidationError;
use crate::forms::{FormData, FormReader};
use crate::narrative::prompt::OutputField;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeModelInput {
    pub schedule_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeModelOutput {
    pub reasoning: String,
    pub estimated_weekly_income: f64,
    pub estimated_monthly_income: f64,
}

pub struct IncomeModel;

impl Flow for IncomeModel {
    const NAME: &'static str = "income-model";
    const SYSTEM: &'static str = "You are an expert income calculator.";
    const TEMPLATE: &'static str = "\
Calculate the estimated weekly and monthly income based on a natural language description of a work schedule.

User's Schedule:
\"{{{scheduleDescription}}}\"

Instructions:
1. Parse the description to identify all components: base hourly rate, regular hours, overtime rules (e.g., \"time and a half\" over 40 hours), and any shift differentials (e.g., \"15% extra for weekend hours\").
2. Provide a clear, step-by-step 'reasoning' of your calculation. Show the math for regular pay, overtime pay, and differential pay separately.
3. Calculate the 'estimatedWeeklyIncome'.
4. Calculate the 'estimatedMonthlyIncome' by multiplying the weekly income by 4.33.

Example:
- Schedule: \"I make $20/hour for a 40-hour week. I get time and a half for anything over 40 hours. I worked 45 hours last week.\"
- Reasoning: regular 40 * $20 = $800; overtime 5 * $30 = $150; weekly $950; monthly $950 * 4.33 = $4113.50
- Output: {\"reasoning\": \"...\", \"estimatedWeeklyIncome\": 950, \"estimatedMonthlyIncome\": 4113.50}";
    const OUTPUT_FIELDS: &'static [OutputField] = &[
        OutputField {
            name: "reasoning",
            kind: "string",
            description: "A step-by-step breakdown of how the calculation was performed.",
        },
        OutputField {
            name: "estimatedWeeklyIncome",
            kind: "number",
            description: "The estimated total income for one week.",
        },
        OutputField {
            name: "estimatedMonthlyIncome",
            kind: "number",
            description: "The estimated total income for one month (assuming 4.33 weeks).",
        },
    ];

    type Input = IncomeModelInput;
    type Output = IncomeModelOutput;

    fn finalize(
        _input: &IncomeModelInput,
        output: IncomeModelOutput,
    ) -> Result<IncomeModelOutput, String> {
        require_text("reasoning", &output.reasoning)?;
        require_amount("estimatedWeeklyIncome", output.estimated_weekly_income)?;
        require_amount("estimatedMonthlyIncome", output.estimated_monthly_income)?;
        Ok(output)
    }
}

impl FormFlow for IncomeModel {
    const SUCCESS_MESSAGE: &'static str = "Success! Your income model is ready.";
    const FAILURE_MESSAGE: &'static str =
        "The AI could not generate the model. Please try again.";

    fn parse_form(form: &FormData) -> Result<IncomeModelInput, ValidationError> {
        let mut reader = FormReader::new(form);
        let schedule_description = reader.text_at_least(
            "scheduleDescription",
            10,
            "Please provide a more detailed description of your schedule.",
        );
        reader.finish()?;
        Ok(IncomeModelInput {
            schedule_description,
        })
    }
}

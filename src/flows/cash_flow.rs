use serde::{Deserialize, Serialize};

use super::{Flow, FormFlow, require_text};
use crate::error::ValidationError;
use crate::forms::{FormData, FormReader};
use crate::narrative::prompt::OutputField;

const NUMBER_MESSAGE: &str = "Expected a number.";

/// Monthly income and expenses, outstanding debt and savings balance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowInput {
    pub income: f64,
    pub expenses: f64,
    pub debts: f64,
    pub savings: f64,
    pub spending_habits: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowAdvice {
    pub insights: String,
    pub suggestions: String,
}

pub struct CashFlowAdvisor;

impl Flow for CashFlowAdvisor {
    const NAME: &'static str = "cash-flow-advisor";
    const SYSTEM: &'static str = "You are an AI-powered financial advisor.";
    const TEMPLATE: &'static str = "\
Provide insights and suggestions to the user based on their current financial situation.

Current Financial Situation:
- Income: {{income}}
- Expenses: {{expenses}}
- Debts: {{debts}}
- Savings: {{savings}}
- Spending Habits: {{spendingHabits}}

Provide concise insights into the user's financial health and suggest actionable adjustments to improve their cash flow.";
    const OUTPUT_FIELDS: &'static [OutputField] = &[
        OutputField {
            name: "insights",
            kind: "string",
            description: "Insights on the user's current financial situation.",
        },
        OutputField {
            name: "suggestions",
            kind: "string",
            description: "Actionable adjustments to improve the user's cash flow.",
        },
    ];

    type Input = CashFlowInput;
    type Output = CashFlowAdvice;

    fn finalize(_input: &CashFlowInput, output: CashFlowAdvice) -> Result<CashFlowAdvice, String> {
        require_text("insights", &output.insights)?;
        require_text("suggestions", &output.suggestions)?;
        Ok(output)
    }
}

impl FormFlow for CashFlowAdvisor {
    const VALIDATION_MESSAGE: &'static str =
        "Validation failed. Not enough data to provide advice.";
    const SUCCESS_MESSAGE: &'static str = "Success! Your advice is ready.";
    const FAILURE_MESSAGE: &'static str = "The AI could not generate advice. Please try again.";

    fn parse_form(form: &FormData) -> Result<CashFlowInput, ValidationError> {
        let mut reader = FormReader::new(form);
        let input = CashFlowInput {
            income: reader.number("income", NUMBER_MESSAGE),
            expenses: reader.number("expenses", NUMBER_MESSAGE),
            debts: reader.number("debts", NUMBER_MESSAGE),
            savings: reader.number("savings", NUMBER_MESSAGE),
            spending_habits: reader.text("spendingHabits", "Spending habits are required."),
        };
        reader.finish()?;
        Ok(input)
    }
}

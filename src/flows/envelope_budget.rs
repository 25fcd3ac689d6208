use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{Flow, FormFlow, require_amount};
use crate::error::ValidationError;
use crate::forms::{FormData, FormReader};
use crate::narrative::prompt::OutputField;

/// Largest gap tolerated between the allocation total and the income.
pub const ALLOCATION_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeBudgetInput {
    pub income: f64,
    pub expenses: String,
    pub prior_debts: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeBudgetOutput {
    #[serde(deserialize_with = "allocations_from_object_or_string")]
    pub suggested_allocations: BTreeMap<String, f64>,
}

/// Models return the allocations either as an object or as a JSON string
/// holding one.
fn allocations_from_object_or_string<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::String(text) => serde_json::from_str(&text).map_err(D::Error::custom),
        value @ Value::Object(_) => serde_json::from_value(value).map_err(D::Error::custom),
        other => Err(D::Error::custom(format!(
            "expected an object or a JSON string, got {other}"
        ))),
    }
}

pub struct EnvelopeBudget;

impl Flow for EnvelopeBudget {
    const NAME: &'static str = "envelope-budget";
    const SYSTEM: &'static str = "You are a personal finance expert.";
    const TEMPLATE: &'static str = "\
You will be provided with the user's prior debts, expenses, and income. Your task is to suggest a balanced monthly budget allocation.

- Analyze the user's financial situation.
- Create a set of budget categories (e.g., Housing, Food, Transport, Utilities, Debt Repayment, Savings, Discretionary).
- Allocate the user's total income across these categories.
- Ensure the total allocation equals the user's income.

Prior Debts: {{{priorDebts}}}
Expenses: {{{expenses}}}
Income: {{{income}}}

The total of all allocations must sum up exactly to the income. Prioritize debt repayment and savings after essential expenses.";
    const OUTPUT_FIELDS: &'static [OutputField] = &[OutputField {
        name: "suggestedAllocations",
        kind: "object",
        description: "Category names mapped to the amount allocated to each.",
    }];

    type Input = EnvelopeBudgetInput;
    type Output = EnvelopeBudgetOutput;

    fn finalize(
        input: &EnvelopeBudgetInput,
        output: EnvelopeBudgetOutput,
    ) -> Result<EnvelopeBudgetOutput, String> {
        if output.suggested_allocations.is_empty() {
            return Err("suggestedAllocations must not be empty".to_string());
        }
        for (category, amount) in &output.suggested_allocations {
            require_amount(category, *amount)?;
        }

        let total: f64 = output.suggested_allocations.values().sum();
        if (total - input.income).abs() > ALLOCATION_TOLERANCE {
            return Err(format!(
                "allocations total {total} but income is {}",
                input.income
            ));
        }
        Ok(output)
    }
}

impl FormFlow for EnvelopeBudget {
    const SUCCESS_MESSAGE: &'static str = "Success! Your budget suggestions are ready.";
    const FAILURE_MESSAGE: &'static str =
        "The AI could not generate suggestions. Please try again.";

    fn parse_form(form: &FormData) -> Result<EnvelopeBudgetInput, ValidationError> {
        let mut reader = FormReader::new(form);
        let input = EnvelopeBudgetInput {
            income: reader.number("income", "Please enter your monthly income."),
            expenses: reader.text("expenses", "Expenses are required."),
            prior_debts: reader.text("priorDebts", "Prior debts are required."),
        };
        reader.finish()?;
        Ok(input)
    }
}

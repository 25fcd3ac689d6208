//! Prompt-backed advisory flows.
//!
//! A flow is a prompt template with a typed input and a typed, checked
//! output. Form-driven flows also know how to read their input from a
//! submitted form.

pub mod bill_negotiation;
pub mod cash_flow;
pub mod education;
pub mod envelope_budget;
pub mod income_model;
pub mod tax_optimizer;
pub mod viability;

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{FlowError, GenerationError, ValidationError};
use crate::forms::FormData;
use crate::narrative::prompt::{self, OutputField};
use crate::narrative::{NarrativeGenerator, generate_with_timeout, parse};

pub use bill_negotiation::BillNegotiation;
pub use cash_flow::CashFlowAdvisor;
pub use education::FinancialEducation;
pub use envelope_budget::EnvelopeBudget;
pub use income_model::IncomeModel;
pub use tax_optimizer::TaxOptimizer;
pub use viability::{AssessmentSource, ViabilityNarrative, ViabilityReport};

pub trait Flow {
    const NAME: &'static str;
    const SYSTEM: &'static str;
    /// Uses `{{{name}}}` placeholders filled from the serialized input.
    const TEMPLATE: &'static str;
    const OUTPUT_FIELDS: &'static [OutputField];

    type Input: Serialize + Send + Sync;
    type Output: DeserializeOwned + Serialize + Send;

    /// Checks the decoded reply beyond its types and may normalize it.
    fn finalize(_input: &Self::Input, output: Self::Output) -> Result<Self::Output, String> {
        Ok(output)
    }
}

/// A flow fed directly from a submitted form.
pub trait FormFlow: Flow {
    const VALIDATION_MESSAGE: &'static str = "Validation failed. Please check your inputs.";
    const SUCCESS_MESSAGE: &'static str;
    const FAILURE_MESSAGE: &'static str;

    fn parse_form(form: &FormData) -> Result<Self::Input, ValidationError>;
}

pub async fn run<F: Flow>(
    narrator: &dyn NarrativeGenerator,
    timeout: Duration,
    input: &F::Input,
) -> Result<F::Output, FlowError> {
    let variables = serde_json::to_value(input)
        .map_err(|e| FlowError::Internal(format!("{}: serialize input: {e}", F::NAME)))?;
    let prompt = prompt::build(F::TEMPLATE, &variables, F::OUTPUT_FIELDS);
    debug!(flow = F::NAME, prompt_len = prompt.len(), "running flow");

    let raw = generate_with_timeout(narrator, timeout, F::SYSTEM, &prompt).await?;
    let output: F::Output = parse::decode(&raw)?;
    let output = F::finalize(input, output).map_err(GenerationError::Schema)?;

    info!(flow = F::NAME, "flow completed");
    Ok(output)
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

pub(crate) fn require_amount(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be a non-negative number, got {value}"))
    }
}

#[cfg(test)]
pub(crate) fn form(pairs: &[(&str, &str)]) -> FormData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::testing::ScriptedNarrator;
    use serde::Deserialize;

    struct Echo;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct EchoInput {
        monthly_cost: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct EchoOutput {
        text: String,
    }

    fn input(monthly_cost: f64) -> EchoInput {
        EchoInput { monthly_cost }
    }

    impl Flow for Echo {
        const NAME: &'static str = "echo";
        const SYSTEM: &'static str = "system";
        const TEMPLATE: &'static str = "Cost: {{{monthlyCost}}}";
        const OUTPUT_FIELDS: &'static [OutputField] = &[OutputField {
            name: "text",
            kind: "string",
            description: "Anything.",
        }];
        type Input = EchoInput;
        type Output = EchoOutput;

        fn finalize(_input: &EchoInput, output: EchoOutput) -> Result<EchoOutput, String> {
            require_text("text", &output.text)?;
            Ok(output)
        }
    }

    #[tokio::test]
    async fn run_renders_input_and_decodes_reply() {
        let narrator = ScriptedNarrator::ok("```json\n{\"text\": \"hi\"}\n```");
        let output = run::<Echo>(&narrator, Duration::from_secs(1), &input(89.0))
            .await
            .expect("flow output");
        assert_eq!(output.text, "hi");

        let prompt = narrator.last_prompt().expect("prompt sent");
        assert!(prompt.starts_with("Cost: 89\n"));
        assert!(prompt.contains("\"text\" (string)"));
    }

    #[tokio::test]
    async fn run_rejects_reply_failing_finalize() {
        let narrator = ScriptedNarrator::ok("{\"text\": \"   \"}");
        let err = run::<Echo>(&narrator, Duration::from_secs(1), &input(1.0))
            .await
            .expect_err("empty text");
        assert!(matches!(err, FlowError::Generation(GenerationError::Schema(_))));
    }

    #[tokio::test]
    async fn run_surfaces_generation_errors() {
        let narrator = ScriptedNarrator::failing(GenerationError::Provider("down".into()));
        let err = run::<Echo>(&narrator, Duration::from_secs(1), &input(1.0))
            .await
            .expect_err("provider down");
        assert!(matches!(err, FlowError::Generation(GenerationError::Provider(_))));
    }

    #[test]
    fn amounts_must_be_finite_and_non_negative() {
        assert!(require_amount("x", 0.0).is_ok());
        assert!(require_amount("x", -0.01).is_err());
        assert!(require_amount("x", f64::NAN).is_err());
    }
}

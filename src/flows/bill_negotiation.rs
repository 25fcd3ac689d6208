use serde::{Deserialize, Serialize};

use super::{Flow, FormFlow, require_text};
use crate::error::ValidationError;
use crate::forms::{FormData, FormReader};
use crate::narrative::prompt::OutputField;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillNegotiationInput {
    pub bill_type: String,
    pub current_provider: String,
    pub monthly_cost: f64,
    pub services_provided: String,
    pub reason_for_negotiation: String,
    pub desired_outcome: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillNegotiationOutput {
    pub negotiation_script: String,
}

pub struct BillNegotiation;

impl Flow for BillNegotiation {
    const NAME: &'static str = "bill-negotiation";
    const SYSTEM: &'static str =
        "You are an expert negotiator, skilled at helping people lower their bills.";
    const TEMPLATE: &'static str = "\
Based on the information provided, generate a negotiation script the user can read to their service provider.

Bill Type: {{{billType}}}
Current Provider: {{{currentProvider}}}
Monthly Cost: {{{monthlyCost}}}
Services Provided: {{{servicesProvided}}}
Reason for Negotiation: {{{reasonForNegotiation}}}
Desired Outcome: {{{desiredOutcome}}}";
    const OUTPUT_FIELDS: &'static [OutputField] = &[OutputField {
        name: "negotiationScript",
        kind: "string",
        description: "A script to help the user negotiate with the service provider.",
    }];

    type Input = BillNegotiationInput;
    type Output = BillNegotiationOutput;

    fn finalize(
        _input: &BillNegotiationInput,
        output: BillNegotiationOutput,
    ) -> Result<BillNegotiationOutput, String> {
        require_text("negotiationScript", &output.negotiation_script)?;
        Ok(output)
    }
}

impl FormFlow for BillNegotiation {
    const SUCCESS_MESSAGE: &'static str = "Success! Your script is ready.";
    const FAILURE_MESSAGE: &'static str = "The AI could not generate a script. Please try again.";

    fn parse_form(form: &FormData) -> Result<BillNegotiationInput, ValidationError> {
        let mut reader = FormReader::new(form);
        let input = BillNegotiationInput {
            bill_type: reader.text_at_least("billType", 1, "Bill type is required."),
            current_provider: reader.text_at_least("currentProvider", 1, "Provider is required."),
            monthly_cost: reader.number_at_least(
                "monthlyCost",
                0.0,
                "Monthly cost must be a positive number.",
            ),
            services_provided: reader.text_at_least(
                "servicesProvided",
                1,
                "Services description is required.",
            ),
            reason_for_negotiation: reader.text_at_least(
                "reasonForNegotiation",
                1,
                "Reason for negotiation is required.",
            ),
            desired_outcome: reader.text_at_least(
                "desiredOutcome",
                1,
                "Desired outcome is required.",
            ),
        };
        reader.finish()?;
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FlowError, GenerationError};
    use crate::flows::{form, run};
    use crate::narrative::testing::ScriptedNarrator;
    use std::time::Duration;

    fn valid_form() -> FormData {
        form(&[
            ("billType", "Internet"),
            ("currentProvider", "Comcast"),
            ("monthlyCost", "89"),
            ("servicesProvided", "300 Mbps internet"),
            ("reasonForNegotiation", "Competitor offers $50/month"),
            ("desiredOutcome", "Lower monthly cost"),
        ])
    }

    #[tokio::test]
    async fn script_is_generated_from_form() {
        let narrator = ScriptedNarrator::ok(
            r#"{"negotiationScript": "Hi, I've been a loyal Comcast customer..."}"#,
        );
        let input = BillNegotiation::parse_form(&valid_form()).expect("valid");
        let output = run::<BillNegotiation>(&narrator, Duration::from_secs(1), &input)
            .await
            .expect("script");

        assert!(output.negotiation_script.contains("Comcast"));
        let prompt = narrator.last_prompt().expect("prompt");
        assert!(prompt.contains("Monthly Cost: 89\n"));
        assert!(prompt.contains("Reason for Negotiation: Competitor offers $50/month\n"));
    }

    #[test]
    fn negative_cost_is_rejected() {
        let mut data = valid_form();
        data.insert("monthlyCost".into(), "-5".into());
        let err = BillNegotiation::parse_form(&data).expect_err("negative cost");
        assert_eq!(
            err.messages_for("monthlyCost"),
            ["Monthly cost must be a positive number.".to_string()]
        );
    }

    #[test]
    fn zero_cost_is_accepted() {
        let mut data = valid_form();
        data.insert("monthlyCost".into(), "0".into());
        let input = BillNegotiation::parse_form(&data).expect("zero is allowed");
        assert_eq!(input.monthly_cost, 0.0);
    }

    #[test]
    fn every_missing_text_field_is_reported() {
        let err = BillNegotiation::parse_form(&form(&[("monthlyCost", "10")]))
            .expect_err("missing fields");
        assert_eq!(err.field_errors.len(), 5);
        assert_eq!(
            err.messages_for("currentProvider"),
            ["Provider is required.".to_string()]
        );
    }

    #[tokio::test]
    async fn empty_script_is_a_generation_failure() {
        let narrator = ScriptedNarrator::ok(r#"{"negotiationScript": ""}"#);
        let input = BillNegotiation::parse_form(&valid_form()).expect("valid");
        let err = run::<BillNegotiation>(&narrator, Duration::from_secs(1), &input)
            .await
            .expect_err("empty");
        assert!(matches!(err, FlowError::Generation(GenerationError::Schema(_))));
    }
}

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Flow, require_text, run};
use crate::core::{
    GROSS_INCOME_FIELD, IncomeViabilityInput, IncomeViabilityOutput, POSTAL_CODE_FIELD,
    ViabilityFigures, calculate_viability, rule_based_assessment,
};
use crate::error::{FlowError, ValidationError};
use crate::forms::{FormData, FormReader};
use crate::narrative::NarrativeGenerator;
use crate::narrative::prompt::OutputField;

pub const SUCCESS_MESSAGE: &str = "Success! Your income viability analysis is ready.";
pub const FALLBACK_MESSAGE: &str =
    "Your numbers are ready, but the AI could not write an assessment. Please try again.";

/// Variables the assessment prompt is seeded with.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeInput {
    pub gross_income: f64,
    pub postal_code: String,
    pub tax_burden: f64,
    pub cost_of_living: f64,
    pub net_income: f64,
    pub disposable_income: f64,
}

impl NarrativeInput {
    pub fn new(input: &IncomeViabilityInput, figures: &ViabilityFigures) -> Self {
        Self {
            gross_income: figures.gross_income,
            postal_code: input.postal_code.to_string(),
            tax_burden: figures.tax_burden,
            cost_of_living: figures.cost_of_living,
            net_income: figures.net_income,
            disposable_income: figures.disposable_income,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub assessment: String,
}

pub struct ViabilityNarrative;

impl Flow for ViabilityNarrative {
    const NAME: &'static str = "income-viability";
    const SYSTEM: &'static str =
        "You are an AI financial analyst performing 'What If?' scenario analysis.";
    const TEMPLATE: &'static str = "\
The figures below were calculated for a user's gross income and zip code. Do not recalculate them.

User's Gross Income: {{{grossIncome}}}
User's Zip Code: {{{postalCode}}}
Estimated Federal Tax Burden: {{{taxBurden}}}
Estimated Annual Cost of Living: {{{costOfLiving}}}
Net Income: {{{netIncome}}}
Disposable Income: {{{disposableIncome}}}

Provide a brief, one-sentence qualitative assessment of the viability. For example, if disposable income is highly positive, the assessment could be \"This income appears viable for the selected location.\" If it is negative, it could be \"This income may not be viable without significant budgeting in the selected location.\"";
    const OUTPUT_FIELDS: &'static [OutputField] = &[OutputField {
        name: "assessment",
        kind: "string",
        description: "A brief, qualitative assessment of the financial viability.",
    }];

    type Input = NarrativeInput;
    type Output = Assessment;

    fn finalize(_input: &NarrativeInput, output: Assessment) -> Result<Assessment, String> {
        require_text("assessment", &output.assessment)?;
        Ok(Assessment {
            assessment: output.assessment.trim().to_string(),
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentSource {
    Generated,
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViabilityReport {
    pub output: IncomeViabilityOutput,
    pub assessment_source: AssessmentSource,
}

impl ViabilityReport {
    pub fn message(&self) -> &'static str {
        match self.assessment_source {
            AssessmentSource::Generated => SUCCESS_MESSAGE,
            AssessmentSource::Fallback => FALLBACK_MESSAGE,
        }
    }
}

/// Reads `grossIncome` and `postalCode` (or `zipCode`). The field rules
/// live in [`IncomeViabilityInput::new`]; an unreadable income is checked
/// there as NaN so it gets the same message.
pub fn parse_form(form: &FormData) -> Result<IncomeViabilityInput, ValidationError> {
    let reader = FormReader::new(form).with_alias("zipCode", POSTAL_CODE_FIELD);
    let gross_income = reader.raw_number(GROSS_INCOME_FIELD).unwrap_or(f64::NAN);
    IncomeViabilityInput::new(gross_income, reader.raw_text(POSTAL_CODE_FIELD))
}

/// Compute the figures, then ask the collaborator for the assessment. The
/// figures survive any collaborator failure.
pub async fn assess(
    narrator: &dyn NarrativeGenerator,
    timeout: Duration,
    input: &IncomeViabilityInput,
) -> Result<ViabilityReport, FlowError> {
    let figures = calculate_viability(input);
    let narrative_input = NarrativeInput::new(input, &figures);

    match run::<ViabilityNarrative>(narrator, timeout, &narrative_input).await {
        Ok(reply) => Ok(ViabilityReport {
            output: IncomeViabilityOutput::with_assessment(&figures, reply.assessment),
            assessment_source: AssessmentSource::Generated,
        }),
        Err(FlowError::Generation(err)) => {
            warn!(
                error = %err,
                postal_code = %input.postal_code,
                "assessment unavailable, using fallback"
            );
            Ok(ViabilityReport {
                output: IncomeViabilityOutput::with_assessment(
                    &figures,
                    rule_based_assessment(&figures).to_string(),
                ),
                assessment_source: AssessmentSource::Fallback,
            })
        }
        Err(err) => Err(err),
    }
}

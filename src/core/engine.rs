use super::location::estimate_cost_of_living;
use super::tax::estimate_tax_burden;
use super::types::{FinancialLocationEstimate, IncomeViabilityInput, ViabilityFigures};

pub fn estimate_location(input: &IncomeViabilityInput) -> FinancialLocationEstimate {
    FinancialLocationEstimate {
        tax_burden: estimate_tax_burden(input.gross_income),
        cost_of_living: estimate_cost_of_living(&input.postal_code),
    }
}

/// Tax, cost of living, net and disposable income for a validated input.
pub fn calculate_viability(input: &IncomeViabilityInput) -> ViabilityFigures {
    let estimate = estimate_location(input);
    let net_income = input.gross_income - estimate.tax_burden;
    let disposable_income = net_income - estimate.cost_of_living;

    ViabilityFigures {
        gross_income: input.gross_income,
        tax_burden: estimate.tax_burden,
        cost_of_living: estimate.cost_of_living,
        net_income,
        disposable_income,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{IncomeViabilityOutput, NOT_VIABLE_ASSESSMENT, VIABLE_ASSESSMENT};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn input(gross_income: f64, postal_code: &str) -> IncomeViabilityInput {
        IncomeViabilityInput::new(gross_income, postal_code).expect("valid input")
    }

    #[test]
    fn west_coast_middle_income_runs_a_deficit() {
        let figures = calculate_viability(&input(80_000.0, "90210"));
        assert_eq!(figures.tax_burden, 11_000.0);
        assert_eq!(figures.cost_of_living, 75_000.0);
        assert_eq!(figures.net_income, 69_000.0);
        assert_eq!(figures.disposable_income, -6_000.0);
    }

    #[test]
    fn northeast_low_income_runs_a_deficit() {
        let figures = calculate_viability(&input(45_000.0, "10001"));
        assert_eq!(figures.tax_burden, 6_750.0);
        assert_eq!(figures.cost_of_living, 65_000.0);
        assert_eq!(figures.net_income, 38_250.0);
        assert_eq!(figures.disposable_income, -26_750.0);
    }

    #[test]
    fn high_income_elsewhere_has_surplus() {
        let figures = calculate_viability(&input(120_000.0, "30301"));
        assert_eq!(figures.tax_burden, 20_000.0);
        assert_eq!(figures.cost_of_living, 45_000.0);
        assert_eq!(figures.net_income, 100_000.0);
        assert_eq!(figures.disposable_income, 55_000.0);
    }

    #[test]
    fn fifty_thousand_boundary_stays_in_lowest_bracket() {
        let figures = calculate_viability(&input(50_000.0, "00501"));
        assert_eq!(figures.tax_burden, 7_500.0);
        assert_eq!(figures.cost_of_living, 45_000.0);
        assert_eq!(figures.net_income, 42_500.0);
        assert_eq!(figures.disposable_income, -2_500.0);
    }

    #[test]
    fn short_postal_code_is_rejected_before_computation() {
        let err = IncomeViabilityInput::new(80_000.0, "123").expect_err("must reject");
        assert_eq!(
            err.messages_for("postalCode"),
            ["Please enter a valid 5-digit zip code.".to_string()]
        );
        assert!(err.messages_for("grossIncome").is_empty());
    }

    #[test]
    fn non_positive_or_non_finite_income_is_rejected() {
        for gross in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = IncomeViabilityInput::new(gross, "30301").expect_err("must reject");
            assert_eq!(err.messages_for("grossIncome").len(), 1, "gross {gross}");
        }
    }

    #[test]
    fn both_fields_are_reported_together() {
        let err = IncomeViabilityInput::new(0.0, "abc").expect_err("must reject");
        assert_eq!(err.field_errors.len(), 2);
    }

    #[test]
    fn rule_based_assessment_follows_disposable_income_sign() {
        let deficit = IncomeViabilityOutput::from_figures(&calculate_viability(&input(
            80_000.0, "90210",
        )));
        assert_eq!(deficit.assessment, NOT_VIABLE_ASSESSMENT);

        let surplus = IncomeViabilityOutput::from_figures(&calculate_viability(&input(
            120_000.0, "30301",
        )));
        assert_eq!(surplus.assessment, VIABLE_ASSESSMENT);
    }

    #[test]
    fn output_serializes_with_camel_case_keys() {
        let output = IncomeViabilityOutput::from_figures(&calculate_viability(&input(
            120_000.0, "30301",
        )));
        let json = serde_json::to_value(&output).expect("serialize");
        assert_eq!(json["taxBurden"], 20_000.0);
        assert_eq!(json["costOfLiving"], 45_000.0);
        assert_eq!(json["netIncome"], 100_000.0);
        assert_eq!(json["disposableIncome"], 55_000.0);
        assert!(json["assessment"].is_string());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_net_and_disposable_follow_definitions(
            gross_cents in 1u64..100_000_000,
            prefix in 0u16..1000,
            rest in 0u16..100
        ) {
            let gross = gross_cents as f64 / 100.0;
            let code = format!("{prefix:03}{rest:02}");
            let figures = calculate_viability(&input(gross, &code));

            prop_assert_eq!(figures.net_income, gross - figures.tax_burden);
            prop_assert_eq!(figures.disposable_income, figures.net_income - figures.cost_of_living);
            prop_assert!(figures.tax_burden >= 0.0);
            prop_assert!(figures.cost_of_living >= 0.0);
        }

        #[test]
        fn prop_repeat_calls_are_bit_identical(
            gross_cents in 1u64..100_000_000,
            prefix in 0u16..1000
        ) {
            let viability_input = input(gross_cents as f64 / 100.0, &format!("{prefix:03}00"));
            let first = calculate_viability(&viability_input);
            let second = calculate_viability(&viability_input);

            prop_assert_eq!(first.tax_burden.to_bits(), second.tax_burden.to_bits());
            prop_assert_eq!(first.cost_of_living.to_bits(), second.cost_of_living.to_bits());
            prop_assert_eq!(first.net_income.to_bits(), second.net_income.to_bits());
            prop_assert_eq!(first.disposable_income.to_bits(), second.disposable_income.to_bits());
        }
    }
}

use std::ops::Range;

use tracing::debug;

use super::types::PostalCode;

const BASE_COST_OF_LIVING: f64 = 45_000.0;

// Keyed by the numeric value of the first three postal digits. Checked in
// order, so a later bucket overrides an earlier one.
const REGIONAL_COST_OF_LIVING: [(Range<u16>, f64); 2] = [
    // Northeast
    (100..200, 65_000.0),
    // California / West Coast
    (900..970, 75_000.0),
];

/// Estimated annual cost of living for the area a postal code belongs to.
pub fn estimate_cost_of_living(postal_code: &PostalCode) -> f64 {
    let prefix = postal_code.prefix();
    let cost = REGIONAL_COST_OF_LIVING
        .iter()
        .fold(BASE_COST_OF_LIVING, |cost, (prefixes, regional)| {
            if prefixes.contains(&prefix) {
                *regional
            } else {
                cost
            }
        });

    debug!(%postal_code, prefix, cost, "estimated cost of living");
    cost
}

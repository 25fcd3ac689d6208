/// One step of the progressive schedule: income above `floor` is taxed at
/// `rate` on top of the fixed `base` owed below it.
#[derive(Copy, Clone, Debug)]
struct Bracket {
    floor: f64,
    base: f64,
    rate: f64,
}

// Highest floor first; the first bracket whose floor is strictly exceeded applies.
const BRACKETS: [Bracket; 3] = [
    Bracket {
        floor: 100_000.0,
        base: 15_000.0,
        rate: 0.25,
    },
    Bracket {
        floor: 50_000.0,
        base: 5_000.0,
        rate: 0.20,
    },
    Bracket {
        floor: 0.0,
        base: 0.0,
        rate: 0.15,
    },
];

/// Estimated annual federal tax on `gross_income`, rounded to a whole unit.
///
/// Callers validate that income is non-negative before getting here.
pub fn estimate_tax_burden(gross_income: f64) -> f64 {
    debug_assert!(gross_income >= 0.0, "gross income must be validated first");

    let raw = BRACKETS
        .iter()
        .find(|bracket| gross_income > bracket.floor)
        .map(|bracket| bracket.base + (gross_income - bracket.floor) * bracket.rate)
        .unwrap_or(0.0);

    raw.round()
}

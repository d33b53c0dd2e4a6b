//! The fixed family-size ratio table and the recommended split it yields.

use serde::Serialize;

/// One row of the ratio table: the percentage of monthly income recommended
/// for each of the five allocation fields.
///
/// The percentages come from an external financial-planning standard and
/// are preserved literally; they are a business input to this system, not
/// something it derives. Every row sums to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatioRow {
    /// Percent of income for day-to-day living expenses.
    pub living_expense: u8,
    /// Percent of income for savings.
    pub savings: u8,
    /// Percent of income for pension contributions.
    pub pension: u8,
    /// Percent of income for insurance premiums.
    pub insurance: u8,
    /// Percent of income for loan repayments.
    pub loan_payment: u8,
}

/// The ratio rows for family sizes one through five-or-more.
const RATIO_TABLE: [RatioRow; 5] = [
    // 1 person
    RatioRow {
        living_expense: 40,
        savings: 40,
        pension: 10,
        insurance: 5,
        loan_payment: 5,
    },
    // 2 people
    RatioRow {
        living_expense: 30,
        savings: 40,
        pension: 10,
        insurance: 10,
        loan_payment: 10,
    },
    // 3 people
    RatioRow {
        living_expense: 50,
        savings: 20,
        pension: 10,
        insurance: 10,
        loan_payment: 10,
    },
    // 4 people
    RatioRow {
        living_expense: 55,
        savings: 20,
        pension: 10,
        insurance: 10,
        loan_payment: 5,
    },
    // 5 or more people
    RatioRow {
        living_expense: 60,
        savings: 15,
        pension: 10,
        insurance: 10,
        loan_payment: 5,
    },
];

/// Look up the ratio row for a family size.
///
/// Sizes above five share the five-person row; a size of zero is treated as
/// a single-person household.
pub fn ratio_for_family_size(family_size: u8) -> &'static RatioRow {
    let index = family_size.clamp(1, 5) as usize - 1;
    &RATIO_TABLE[index]
}

/// The recommended amounts for each allocation field, in whole won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecommendedAllocation {
    /// Recommended living expenses.
    pub living_expense: i64,
    /// Recommended savings.
    pub savings: i64,
    /// Recommended pension contributions.
    pub pension: i64,
    /// Recommended insurance premiums.
    pub insurance: i64,
    /// Recommended loan repayments.
    pub loan_payment: i64,
}

impl RecommendedAllocation {
    /// The sum of the five recommended amounts.
    ///
    /// Because each field rounds independently, this may differ from the
    /// income by a few won; the difference is absorbed into the surplus and
    /// is never redistributed.
    pub fn total(&self) -> i64 {
        self.living_expense + self.savings + self.pension + self.insurance + self.loan_payment
    }
}

/// Compute the recommended split of a monthly income for a family size.
///
/// Each field is the income times its table percentage, rounded to the
/// nearest won independently of the other fields.
pub fn recommend(income: i64, family_size: u8) -> RecommendedAllocation {
    let row = ratio_for_family_size(family_size);
    let share = |percent: u8| (percent as f64 * income as f64 / 100.0).round() as i64;

    RecommendedAllocation {
        living_expense: share(row.living_expense),
        savings: share(row.savings),
        pension: share(row.pension),
        insurance: share(row.insurance),
        loan_payment: share(row.loan_payment),
    }
}

//! The diagnostic rules for each budget category.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use serde::Serialize;

use crate::allocation::AllocationField;

/// How an actual amount compares to its budget, in the category's own
/// terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisStatus {
    /// Exactly on budget.
    Proper,
    /// On the favorable side for this category.
    Good,
    /// Short of where this category should be.
    Lack,
    /// Beyond where this category should be.
    Excess,
}

/// The classification of one amount plus a human-readable difference
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    /// The classification.
    pub status: DiagnosisStatus,
    /// A formatted description of the difference, e.g.
    /// "₩50,000 under the recommended amount".
    pub label: String,
}

/// Classify an actual amount against its budgeted amount.
///
/// The rules are deliberately asymmetric per category:
/// - living expenses and loan payments: spending less is always better, so
///   under budget is good and over budget is excess;
/// - savings and pension: putting more aside is always better, so over
///   budget is good and under budget is a shortfall;
/// - insurance: the budget is the right amount, so both directions are off
///   (over is excess, under is a shortfall).
///
/// Equality is checked first for every category, so `diagnose(c, x, x)` is
/// always [DiagnosisStatus::Proper].
pub fn diagnose(category: AllocationField, current: i64, budget: i64) -> Diagnosis {
    if current == budget {
        return Diagnosis {
            status: DiagnosisStatus::Proper,
            label: "Right on the recommended amount".to_owned(),
        };
    }

    let over = current > budget;
    let status = match category {
        AllocationField::LivingExpense | AllocationField::LoanPayment => {
            if over {
                DiagnosisStatus::Excess
            } else {
                DiagnosisStatus::Good
            }
        }
        AllocationField::Savings | AllocationField::Pension => {
            if over {
                DiagnosisStatus::Good
            } else {
                DiagnosisStatus::Lack
            }
        }
        AllocationField::Insurance => {
            if over {
                DiagnosisStatus::Excess
            } else {
                DiagnosisStatus::Lack
            }
        }
    };

    let direction = if over { "over" } else { "under" };
    let label = format!(
        "{} {direction} the recommended amount",
        format_won((current - budget).abs())
    );

    Diagnosis { status, label }
}

/// Format a won amount with a currency sign and thousands separators.
fn format_won(amount: i64) -> String {
    static WON_FMT: OnceLock<Formatter> = OnceLock::new();

    let won_fmt = WON_FMT.get_or_init(|| {
        Formatter::currency("₩")
            .unwrap()
            .precision(Precision::Decimals(0))
    });

    if amount == 0 {
        // Zero is hardcoded as "0", so we must specify the prefix ourselves.
        return "₩0".to_owned();
    }

    won_fmt.fmt_string(amount as f64)
}

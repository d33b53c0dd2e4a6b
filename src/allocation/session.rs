//! The interactive budget allocation session.
//!
//! A session is one sitting at the five sliders: the user starts from the
//! recommended split, drags fields, locks each one in, and finally confirms
//! the whole allocation. Sessions live in memory only; the confirmed
//! snapshot is what gets persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    allocation::{
        core::NewAdjustedBudget,
        ratio::{RecommendedAllocation, recommend},
    },
};

/// How close a dragged value must be to the recommendation before it snaps,
/// in won. Roughly five percent of the incomes this app deals in.
pub const DEFAULT_SNAP_TOLERANCE: i64 = 50_000;

/// The granularity dragged values are rounded to, in won.
pub const DEFAULT_DRAG_STEP: i64 = 1;

/// One of the five allocation fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationField {
    /// Day-to-day living expenses.
    LivingExpense,
    /// Savings deposits.
    Savings,
    /// Pension contributions.
    Pension,
    /// Insurance premiums.
    Insurance,
    /// Loan repayments.
    LoanPayment,
}

impl AllocationField {
    /// All five fields in display order.
    pub const ALL: [AllocationField; 5] = [
        AllocationField::LivingExpense,
        AllocationField::Savings,
        AllocationField::Pension,
        AllocationField::Insurance,
        AllocationField::LoanPayment,
    ];

    /// The stable label spoken by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            AllocationField::LivingExpense => "living_expense",
            AllocationField::Savings => "savings",
            AllocationField::Pension => "pension",
            AllocationField::Insurance => "insurance",
            AllocationField::LoanPayment => "loan_payment",
        }
    }

    fn index(self) -> usize {
        match self {
            AllocationField::LivingExpense => 0,
            AllocationField::Savings => 1,
            AllocationField::Pension => 2,
            AllocationField::Insurance => 3,
            AllocationField::LoanPayment => 4,
        }
    }
}

impl fmt::Display for AllocationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of dragging one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DragOutcome {
    /// The field that was dragged.
    pub field: AllocationField,
    /// The stored amount after clamping, stepping, and snapping.
    pub amount: i64,
    /// Whether the amount snapped to the recommendation.
    pub snapped: bool,
    /// Whether the snap cue should fire.
    ///
    /// Fires exactly once per entry into the snap zone; staying in the zone
    /// across consecutive drags does not re-fire it.
    pub snap_cue: bool,
}

/// One field's slider state within a session.
#[derive(Debug, Clone, Copy)]
struct FieldEntry {
    amount: i64,
    recommended: i64,
    locked: bool,
    in_snap_zone: bool,
}

/// A serializable snapshot of the session for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// The monthly income the session allocates.
    pub total_income: i64,
    /// The family size the recommendation was computed for.
    pub family_size: u8,
    /// The five fields in display order.
    pub fields: Vec<FieldView>,
    /// Income minus the sum of the five fields.
    pub surplus: i64,
    /// Whether the session can be finalized right now.
    pub can_confirm: bool,
}

/// One field within a [SessionView].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldView {
    /// Which field this is.
    pub field: AllocationField,
    /// The current slider amount.
    pub amount: i64,
    /// The recommended amount the slider snaps to.
    pub recommended: i64,
    /// Whether the user has confirmed this field.
    pub locked: bool,
}

/// The in-progress allocation for one budgeting sitting.
#[derive(Debug, Clone)]
pub struct AllocationSession {
    total_income: i64,
    family_size: u8,
    step: i64,
    tolerance: i64,
    fields: [FieldEntry; 5],
}

impl AllocationSession {
    /// Start a session seeded with the recommended split.
    ///
    /// Every field begins at its recommendation, unlocked, and inside the
    /// snap zone, so the cue only fires after the user has dragged away and
    /// come back.
    ///
    /// # Errors
    /// Returns [Error::NonPositiveIncome] when `income` is zero or below.
    pub fn start(income: i64, family_size: u8) -> Result<Self, Error> {
        if income <= 0 {
            return Err(Error::NonPositiveIncome(income));
        }

        let recommended = recommend(income, family_size);
        let entry = |amount: i64| FieldEntry {
            amount,
            recommended: amount,
            locked: false,
            in_snap_zone: true,
        };

        Ok(Self {
            total_income: income,
            family_size,
            step: DEFAULT_DRAG_STEP,
            tolerance: DEFAULT_SNAP_TOLERANCE,
            fields: [
                entry(recommended.living_expense),
                entry(recommended.savings),
                entry(recommended.pension),
                entry(recommended.insurance),
                entry(recommended.loan_payment),
            ],
        })
    }

    /// Set the drag step granularity.
    pub fn drag_step(mut self, step: i64) -> Self {
        self.step = step.max(1);
        self
    }

    /// Set the snap tolerance.
    pub fn snap_tolerance(mut self, tolerance: i64) -> Self {
        self.tolerance = tolerance.max(0);
        self
    }

    /// The recommended split the session was seeded with.
    pub fn recommended(&self) -> RecommendedAllocation {
        RecommendedAllocation {
            living_expense: self.fields[0].recommended,
            savings: self.fields[1].recommended,
            pension: self.fields[2].recommended,
            insurance: self.fields[3].recommended,
            loan_payment: self.fields[4].recommended,
        }
    }

    /// Drag one field to a new amount.
    ///
    /// The value is clamped to `[0, income]` and rounded to the drag step.
    /// If the result lands within the snap tolerance of the field's
    /// recommendation, the stored amount becomes exactly the recommendation.
    ///
    /// # Errors
    /// Returns [Error::FieldLocked] when the field has been confirmed.
    pub fn drag(&mut self, field: AllocationField, value: i64) -> Result<DragOutcome, Error> {
        let income = self.total_income;
        let step = self.step;
        let tolerance = self.tolerance;
        let entry = &mut self.fields[field.index()];

        if entry.locked {
            return Err(Error::FieldLocked(field));
        }

        let stepped = round_to_step(value.clamp(0, income), step).clamp(0, income);

        let outcome = if (stepped - entry.recommended).abs() <= tolerance {
            let snap_cue = !entry.in_snap_zone;
            entry.in_snap_zone = true;
            entry.amount = entry.recommended;
            DragOutcome {
                field,
                amount: entry.recommended,
                snapped: true,
                snap_cue,
            }
        } else {
            entry.in_snap_zone = false;
            entry.amount = stepped;
            DragOutcome {
                field,
                amount: stepped,
                snapped: false,
                snap_cue: false,
            }
        };

        Ok(outcome)
    }

    /// Confirm one field, disabling drags on it until unlocked.
    pub fn lock(&mut self, field: AllocationField) {
        self.fields[field.index()].locked = true;
    }

    /// Unlock a previously confirmed field.
    pub fn unlock(&mut self, field: AllocationField) {
        self.fields[field.index()].locked = false;
    }

    /// The sum of the five field amounts.
    pub fn allocated(&self) -> i64 {
        self.fields.iter().map(|entry| entry.amount).sum()
    }

    /// Income minus the sum of the five fields. Negative when the user has
    /// over-allocated.
    pub fn surplus(&self) -> i64 {
        self.total_income - self.allocated()
    }

    /// Whether every field has been confirmed.
    pub fn all_locked(&self) -> bool {
        self.fields.iter().all(|entry| entry.locked)
    }

    /// Whether the session can be finalized: every field confirmed and the
    /// surplus not negative.
    pub fn can_confirm(&self) -> bool {
        self.all_locked() && self.surplus() >= 0
    }

    /// Finalize the session into a budget snapshot ready for storage.
    ///
    /// # Errors
    /// Returns [Error::NegativeSurplus] when the allocation exceeds the
    /// income, or [Error::UnconfirmedFields] when any field is unlocked.
    pub fn confirm(&self) -> Result<NewAdjustedBudget, Error> {
        let surplus = self.surplus();
        if surplus < 0 {
            return Err(Error::NegativeSurplus(-surplus));
        }
        if !self.all_locked() {
            return Err(Error::UnconfirmedFields);
        }

        Ok(NewAdjustedBudget {
            living_expense: self.fields[0].amount,
            savings: self.fields[1].amount,
            pension: self.fields[2].amount,
            insurance: self.fields[3].amount,
            loan_payment: self.fields[4].amount,
            total_income: self.total_income,
        })
    }

    /// A serializable snapshot of the session.
    pub fn view(&self) -> SessionView {
        SessionView {
            total_income: self.total_income,
            family_size: self.family_size,
            fields: AllocationField::ALL
                .iter()
                .map(|&field| {
                    let entry = &self.fields[field.index()];
                    FieldView {
                        field,
                        amount: entry.amount,
                        recommended: entry.recommended,
                        locked: entry.locked,
                    }
                })
                .collect(),
            surplus: self.surplus(),
            can_confirm: self.can_confirm(),
        }
    }
}

fn round_to_step(value: i64, step: i64) -> i64 {
    if step <= 1 {
        return value;
    }

    ((value as f64 / step as f64).round() as i64) * step
}

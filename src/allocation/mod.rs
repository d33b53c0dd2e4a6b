//! The five-way budget allocator.
//!
//! This module contains:
//! - The fixed family-size ratio table and the recommendation it produces
//! - The interactive allocation session (drag, snap-to-recommended, locks)
//! - The `AdjustedBudget` snapshot written when a session is confirmed
//! - Route handlers for the allocation API

mod core;
mod handlers;
mod ratio;
mod session;

pub use self::core::{
    AdjustedBudget, NewAdjustedBudget, create_adjusted_budget_table, latest_adjusted_budget,
    store_adjusted_budget,
};
pub use handlers::{
    confirm_allocation_endpoint, current_allocation_endpoint, drag_allocation_endpoint,
    latest_budget_endpoint, lock_allocation_endpoint, start_allocation_endpoint,
    unlock_allocation_endpoint,
};
pub use ratio::{RatioRow, RecommendedAllocation, ratio_for_family_size, recommend};
pub use session::{AllocationField, AllocationSession, DragOutcome, SessionView};

//! The one-time wealth diagnostic: a closed-form index over age, income,
//! assets, and debt, mapped to a five-tier house level.

mod comparison;
mod core;
mod handlers;

pub use comparison::{age_group, record_comparison_stat, wealth_index_percentile,
    create_comparison_stat_table};
pub use self::core::{
    FinancialResult, NewFinancialResult, WealthTier, compute_wealth_index,
    create_financial_result_table, latest_financial_result, store_financial_result,
    tier_for_index,
};
pub use handlers::{
    compute_wealth_endpoint, latest_wealth_endpoint, wealth_comparison_endpoint,
};

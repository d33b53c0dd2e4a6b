//! The spend ledger: recorded spend/save/invest events and their queries.
//!
//! This module contains everything related to ledger items:
//! - The `SpendItem` model and `SpendItemBuilder` for creating items
//! - Database functions for storing, updating, and deleting items
//! - Day/month queries and the recomputed-on-read daily summary
//! - Route handlers for the ledger API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod query;
mod summary_endpoint;
mod update_endpoint;

pub use self::core::{
    Category, Emotion, InputMethod, SpendItem, SpendItemBuilder, SpendItemUpdate, SpendKind,
    create_spend_item, create_spend_item_table, delete_spend_item, get_spend_item,
    update_spend_item,
};
pub use create_endpoint::create_spend_item_endpoint;
pub use delete_endpoint::delete_spend_item_endpoint;
pub use list_endpoint::{get_spend_item_endpoint, list_spend_items_endpoint};
pub use query::{DailySummary, daily_summary, list_all_items, list_items_for_day,
    list_items_for_month};
pub use summary_endpoint::today_summary_endpoint;
pub use update_endpoint::update_spend_item_endpoint;

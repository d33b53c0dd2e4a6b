//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;

use crate::{
    AppState,
    allocation::{
        confirm_allocation_endpoint, current_allocation_endpoint, drag_allocation_endpoint,
        latest_budget_endpoint, lock_allocation_endpoint, start_allocation_endpoint,
        unlock_allocation_endpoint,
    },
    assistant::{chat_endpoint, health_endpoint, tts_endpoint},
    calendar::{
        month_view_endpoint, select_day_endpoint, statistics_endpoint, step_month_endpoint,
    },
    course::{list_courses_endpoint, update_course_progress_endpoint},
    diagnostics::diagnose_endpoint,
    endpoints,
    ledger::{
        create_spend_item_endpoint, delete_spend_item_endpoint, get_spend_item_endpoint,
        list_spend_items_endpoint, today_summary_endpoint, update_spend_item_endpoint,
    },
    preferences::{get_preferences_endpoint, put_preferences_endpoint},
    wealth::{compute_wealth_endpoint, latest_wealth_endpoint, wealth_comparison_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::LEDGER,
            post(create_spend_item_endpoint).get(list_spend_items_endpoint),
        )
        .route(endpoints::LEDGER_SUMMARY, get(today_summary_endpoint))
        .route(
            endpoints::LEDGER_ITEM,
            get(get_spend_item_endpoint)
                .patch(update_spend_item_endpoint)
                .delete(delete_spend_item_endpoint),
        )
        .route(endpoints::ALLOCATION_START, post(start_allocation_endpoint))
        .route(endpoints::ALLOCATION_DRAG, post(drag_allocation_endpoint))
        .route(endpoints::ALLOCATION_LOCK, post(lock_allocation_endpoint))
        .route(
            endpoints::ALLOCATION_UNLOCK,
            post(unlock_allocation_endpoint),
        )
        .route(
            endpoints::ALLOCATION_CONFIRM,
            post(confirm_allocation_endpoint),
        )
        .route(
            endpoints::ALLOCATION_CURRENT,
            get(current_allocation_endpoint),
        )
        .route(endpoints::BUDGET, get(latest_budget_endpoint))
        .route(endpoints::DIAGNOSIS, post(diagnose_endpoint))
        .route(
            endpoints::WEALTH,
            post(compute_wealth_endpoint).get(latest_wealth_endpoint),
        )
        .route(
            endpoints::WEALTH_COMPARISON,
            get(wealth_comparison_endpoint),
        )
        .route(endpoints::CALENDAR_MONTH, get(month_view_endpoint))
        .route(endpoints::CALENDAR_SELECT, post(select_day_endpoint))
        .route(endpoints::CALENDAR_STEP, post(step_month_endpoint))
        .route(endpoints::STATISTICS, get(statistics_endpoint))
        .route(
            endpoints::PREFERENCES,
            get(get_preferences_endpoint).put(put_preferences_endpoint),
        )
        .route(endpoints::COURSES, get(list_courses_endpoint))
        .route(
            endpoints::COURSE_PROGRESS,
            put(update_course_progress_endpoint),
        )
        .route(endpoints::ASSISTANT_CHAT, post(chat_endpoint))
        .route(endpoints::ASSISTANT_TTS, post(tts_endpoint))
        .route(endpoints::ASSISTANT_HEALTH, get(health_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The fallback handler for unknown routes.
async fn get_404_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "the requested resource could not be found" })),
    )
}

//! The API endpoint URIs.

/// The route to create a ledger item (POST) or list items (GET).
pub const LEDGER: &str = "/api/ledger";
/// The route to fetch (GET), update (PATCH), or delete (DELETE) one ledger
/// item.
pub const LEDGER_ITEM: &str = "/api/ledger/{item_id}";
/// The route for today's spend/save/invest sums.
pub const LEDGER_SUMMARY: &str = "/api/ledger/summary";

/// The route to start a budget allocation session.
pub const ALLOCATION_START: &str = "/api/allocation/start";
/// The route to drag one allocation field to a new amount.
pub const ALLOCATION_DRAG: &str = "/api/allocation/drag";
/// The route to confirm (lock) one allocation field.
pub const ALLOCATION_LOCK: &str = "/api/allocation/lock";
/// The route to unlock a previously confirmed allocation field.
pub const ALLOCATION_UNLOCK: &str = "/api/allocation/unlock";
/// The route to finalize the session into an adjusted budget.
pub const ALLOCATION_CONFIRM: &str = "/api/allocation/confirm";
/// The route to inspect the in-progress allocation session.
pub const ALLOCATION_CURRENT: &str = "/api/allocation/current";
/// The route for the most recently confirmed budget.
pub const BUDGET: &str = "/api/budget";

/// The route to classify an amount against its budget.
pub const DIAGNOSIS: &str = "/api/diagnosis";

/// The route to run (POST) or fetch (GET) the wealth diagnostic.
pub const WEALTH: &str = "/api/wealth";
/// The route for the age-group comparison of the latest wealth result.
pub const WEALTH_COMPARISON: &str = "/api/wealth/comparison";

/// The route for the calendar month view.
pub const CALENDAR_MONTH: &str = "/api/calendar/{year}/{month}";
/// The route to select a day on the displayed month.
pub const CALENDAR_SELECT: &str = "/api/calendar/select";
/// The route to step the displayed month backward or forward.
pub const CALENDAR_STEP: &str = "/api/calendar/step";
/// The route for the statistics view (category breakdown and trend).
pub const STATISTICS: &str = "/api/statistics";

/// The route to fetch (GET) or replace (PUT) the user preferences.
pub const PREFERENCES: &str = "/api/preferences";

/// The route for the course catalog with watch progress.
pub const COURSES: &str = "/api/courses";
/// The route to record watch progress for one course.
pub const COURSE_PROGRESS: &str = "/api/courses/{course_id}/progress";

/// The route to send a chat message to the assistant.
pub const ASSISTANT_CHAT: &str = "/api/assistant/chat";
/// The route to synthesize speech for a reply.
pub const ASSISTANT_TTS: &str = "/api/assistant/tts";
/// The route to probe whether the assistant is warmed up.
pub const ASSISTANT_HEALTH: &str = "/api/assistant/health";

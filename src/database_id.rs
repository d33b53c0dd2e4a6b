//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// The ID of a spend ledger item.
pub type SpendItemId = DatabaseId;

/// The ID of a confirmed budget snapshot.
pub type AdjustedBudgetId = DatabaseId;

/// The ID of a wealth diagnostic result.
pub type FinancialResultId = DatabaseId;

/// The ID of a video course.
pub type CourseId = DatabaseId;

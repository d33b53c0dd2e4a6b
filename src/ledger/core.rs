//! Defines the core data models and database queries for ledger items.

use rusqlite::{
    Connection, Row, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::{Error, database_id::SpendItemId};

// ============================================================================
// MODELS
// ============================================================================

/// What a ledger item did with the money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendKind {
    /// Money left the household.
    Spent,
    /// Money was put aside.
    Saved,
    /// Money was invested.
    Investment,
}

impl SpendKind {
    /// The stable label stored in the database and spoken by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            SpendKind::Spent => "spent",
            SpendKind::Saved => "saved",
            SpendKind::Investment => "investment",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "spent" => Some(SpendKind::Spent),
            "saved" => Some(SpendKind::Saved),
            "investment" => Some(SpendKind::Investment),
            _ => None,
        }
    }
}

impl ToSql for SpendKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for SpendKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|label| {
            SpendKind::from_label(label)
                .ok_or_else(|| FromSqlError::Other(format!("unknown spend kind {label:?}").into()))
        })
    }
}

/// The spending category of a ledger item.
///
/// Categories form a closed vocabulary: the variable categories cover
/// day-to-day spending, while the fixed categories mirror the five budget
/// allocation fields. Labels that are not part of the vocabulary map to
/// [Category::Other] rather than being rejected, so old data with retired
/// labels still loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Meals and groceries.
    Food,
    /// Coffee and snacks.
    Cafe,
    /// Buses, trains, fuel.
    Transport,
    /// Retail purchases.
    Shopping,
    /// Entertainment and hobbies.
    Leisure,
    /// Medical and pharmacy costs.
    Medical,
    /// Phone and internet bills.
    Telecom,
    /// Anything that fits nowhere else; also the fallback for unknown labels.
    Other,
    /// Deposits into savings.
    Savings,
    /// Pension contributions.
    Pension,
    /// Insurance premiums.
    Insurance,
    /// Loan repayments.
    Loan,
}

impl Category {
    /// The stable label stored in the database and spoken by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Cafe => "cafe",
            Category::Transport => "transport",
            Category::Shopping => "shopping",
            Category::Leisure => "leisure",
            Category::Medical => "medical",
            Category::Telecom => "telecom",
            Category::Other => "other",
            Category::Savings => "savings",
            Category::Pension => "pension",
            Category::Insurance => "insurance",
            Category::Loan => "loan",
        }
    }

    /// Parse a stored label, falling back to [Category::Other] for labels
    /// outside the vocabulary.
    pub fn from_label(label: &str) -> Self {
        match label {
            "food" => Category::Food,
            "cafe" => Category::Cafe,
            "transport" => Category::Transport,
            "shopping" => Category::Shopping,
            "leisure" => Category::Leisure,
            "medical" => Category::Medical,
            "telecom" => Category::Telecom,
            "savings" => Category::Savings,
            "pension" => Category::Pension,
            "insurance" => Category::Insurance,
            "loan" => Category::Loan,
            _ => Category::Other,
        }
    }

    /// Whether the category is one of the fixed monthly commitments
    /// (savings, pension, insurance, loan) rather than variable spending.
    pub fn is_fixed(self) -> bool {
        matches!(
            self,
            Category::Savings | Category::Pension | Category::Insurance | Category::Loan
        )
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(Category::from_label)
    }
}

/// The user-assigned motivation behind a spend.
///
/// Only meaningful on items with [SpendKind::Spent].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    /// Bought on impulse.
    Impulse,
    /// A deliberate choice.
    Choice,
    /// Could not be avoided.
    Necessary,
}

impl Emotion {
    /// The stable label stored in the database and spoken by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Impulse => "impulse",
            Emotion::Choice => "choice",
            Emotion::Necessary => "necessary",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "impulse" => Some(Emotion::Impulse),
            "choice" => Some(Emotion::Choice),
            "necessary" => Some(Emotion::Necessary),
            _ => None,
        }
    }
}

impl ToSql for Emotion {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Emotion {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|label| {
            Emotion::from_label(label)
                .ok_or_else(|| FromSqlError::Other(format!("unknown emotion {label:?}").into()))
        })
    }
}

/// How a ledger item was entered. Informational only; no logic branches on
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMethod {
    /// Dictated through the voice assistant.
    Voice,
    /// Typed into the assistant chat.
    Text,
    /// Entered through the regular form.
    Manual,
    /// Scanned from a receipt.
    Ocr,
}

impl Default for InputMethod {
    fn default() -> Self {
        InputMethod::Manual
    }
}

impl InputMethod {
    /// The stable label stored in the database and spoken by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            InputMethod::Voice => "voice",
            InputMethod::Text => "text",
            InputMethod::Manual => "manual",
            InputMethod::Ocr => "ocr",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "voice" => Some(InputMethod::Voice),
            "text" => Some(InputMethod::Text),
            "manual" => Some(InputMethod::Manual),
            "ocr" => Some(InputMethod::Ocr),
            _ => None,
        }
    }
}

impl ToSql for InputMethod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for InputMethod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|label| {
            InputMethod::from_label(label).ok_or_else(|| {
                FromSqlError::Other(format!("unknown input method {label:?}").into())
            })
        })
    }
}

/// One recorded financial event: money spent, saved, or invested.
///
/// To create a new `SpendItem`, use [SpendItem::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendItem {
    /// The ID of the item, assigned at creation and never changed.
    pub id: SpendItemId,
    /// The amount of money in whole won. Never negative; the direction of
    /// the money is carried by `kind`.
    pub amount: i64,
    /// Whether the money was spent, saved, or invested.
    pub kind: SpendKind,
    /// The spending category.
    pub category: Category,
    /// The motivation behind a spend, when the user recorded one.
    pub emotion: Option<Emotion>,
    /// A free-text description of the event.
    pub memo: String,
    /// A free-text annotation, e.g. the reason a spend was avoided.
    pub tag: Option<String>,
    /// How the item was entered.
    pub input_method: InputMethod,
    /// When the event happened. The user may edit this after the fact, and
    /// all day/month bucketing compares against it.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// When the record was created. Stamped once at insert, never mutated.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl SpendItem {
    /// Create a new ledger item.
    ///
    /// Shortcut for [SpendItemBuilder] for discoverability.
    pub fn build(amount: i64, kind: SpendKind, category: Category) -> SpendItemBuilder {
        SpendItemBuilder {
            amount,
            kind,
            category,
            emotion: None,
            memo: String::new(),
            tag: None,
            input_method: InputMethod::Manual,
            timestamp: None,
        }
    }
}

/// A builder for creating [SpendItem] instances.
///
/// Identity and creation time are not part of the builder: both are stamped
/// by [create_spend_item] so they cannot be forged or re-used.
#[derive(Debug, PartialEq, Clone)]
pub struct SpendItemBuilder {
    /// The amount of money in whole won.
    pub amount: i64,
    /// Whether the money was spent, saved, or invested.
    pub kind: SpendKind,
    /// The spending category.
    pub category: Category,
    /// The motivation behind a spend.
    pub emotion: Option<Emotion>,
    /// A free-text description of the event.
    pub memo: String,
    /// A free-text annotation.
    pub tag: Option<String>,
    /// How the item was entered. Defaults to manual entry.
    pub input_method: InputMethod,
    /// When the event happened. Defaults to the creation time.
    pub timestamp: Option<OffsetDateTime>,
}

impl SpendItemBuilder {
    /// Set the motivation behind the spend.
    pub fn emotion(mut self, emotion: Option<Emotion>) -> Self {
        self.emotion = emotion;
        self
    }

    /// Set the free-text description.
    pub fn memo(mut self, memo: &str) -> Self {
        self.memo = memo.to_owned();
        self
    }

    /// Set the free-text annotation.
    pub fn tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    /// Set how the item was entered.
    pub fn input_method(mut self, input_method: InputMethod) -> Self {
        self.input_method = input_method;
        self
    }

    /// Set the event time. When unset, the creation time is used.
    pub fn timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A partial update to a [SpendItem].
///
/// Absent fields keep their stored value. The item's `id` and `created_at`
/// are not represented here at all, so an update can never touch them.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SpendItemUpdate {
    /// Replace the amount.
    pub amount: Option<i64>,
    /// Replace the kind.
    pub kind: Option<SpendKind>,
    /// Replace the category.
    pub category: Option<Category>,
    /// Replace the motivation.
    pub emotion: Option<Emotion>,
    /// Replace the description.
    pub memo: Option<String>,
    /// Replace the annotation.
    pub tag: Option<String>,
    /// Replace the input method.
    pub input_method: Option<InputMethod>,
    /// Move the event to a different time.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new ledger item in the database from a builder.
///
/// Stamps the item's ID and creation time. Timestamps are normalized to UTC
/// before storage so that string ordering in SQL matches chronological
/// ordering.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is below zero,
/// - or [Error::SqlError] if there is an SQL error.
pub fn create_spend_item(
    builder: SpendItemBuilder,
    connection: &Connection,
) -> Result<SpendItem, Error> {
    if builder.amount < 0 {
        return Err(Error::NegativeAmount(builder.amount));
    }

    let created_at = OffsetDateTime::now_utc();
    let timestamp = builder
        .timestamp
        .map(|t| t.to_offset(UtcOffset::UTC))
        .unwrap_or(created_at);

    let item = connection
        .prepare(
            "INSERT INTO spend_item
                (amount, kind, category, emotion, memo, tag, input_method, timestamp, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, amount, kind, category, emotion, memo, tag, input_method,
                timestamp, created_at",
        )?
        .query_row(
            params![
                builder.amount,
                builder.kind,
                builder.category,
                builder.emotion,
                builder.memo,
                builder.tag,
                builder.input_method,
                timestamp,
                created_at,
            ],
            map_spend_item_row,
        )?;

    Ok(item)
}

/// Retrieve a ledger item from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid item,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_spend_item(id: SpendItemId, connection: &Connection) -> Result<SpendItem, Error> {
    let item = connection
        .prepare(
            "SELECT id, amount, kind, category, emotion, memo, tag, input_method,
                timestamp, created_at
             FROM spend_item WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_spend_item_row)?;

    Ok(item)
}

/// Apply a partial update to a ledger item.
///
/// The item's `id` and `created_at` are left untouched regardless of the
/// update's contents.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid item,
/// - [Error::NegativeAmount] if the new amount is below zero,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_spend_item(
    id: SpendItemId,
    update: SpendItemUpdate,
    connection: &Connection,
) -> Result<SpendItem, Error> {
    let mut item = get_spend_item(id, connection)?;

    if let Some(amount) = update.amount {
        if amount < 0 {
            return Err(Error::NegativeAmount(amount));
        }
        item.amount = amount;
    }
    if let Some(kind) = update.kind {
        item.kind = kind;
    }
    if let Some(category) = update.category {
        item.category = category;
    }
    if let Some(emotion) = update.emotion {
        item.emotion = Some(emotion);
    }
    if let Some(memo) = update.memo {
        item.memo = memo;
    }
    if let Some(tag) = update.tag {
        item.tag = Some(tag);
    }
    if let Some(input_method) = update.input_method {
        item.input_method = input_method;
    }
    if let Some(timestamp) = update.timestamp {
        item.timestamp = timestamp.to_offset(UtcOffset::UTC);
    }

    connection.execute(
        "UPDATE spend_item
         SET amount = ?1, kind = ?2, category = ?3, emotion = ?4, memo = ?5, tag = ?6,
             input_method = ?7, timestamp = ?8
         WHERE id = ?9",
        params![
            item.amount,
            item.kind,
            item.category,
            item.emotion,
            item.memo,
            item.tag,
            item.input_method,
            item.timestamp,
            id,
        ],
    )?;

    Ok(item)
}

/// Delete a ledger item by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid item,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_spend_item(id: SpendItemId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM spend_item WHERE id = ?1", params![id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the spend_item table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_spend_item_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS spend_item (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount INTEGER NOT NULL,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                emotion TEXT,
                memo TEXT NOT NULL,
                tag TEXT,
                input_method TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    // Listings and day/month queries scan newest-first.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_spend_item_timestamp ON spend_item(timestamp);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [SpendItem].
pub(super) fn map_spend_item_row(row: &Row) -> Result<SpendItem, rusqlite::Error> {
    Ok(SpendItem {
        id: row.get(0)?,
        amount: row.get(1)?,
        kind: row.get(2)?,
        category: row.get(3)?,
        emotion: row.get(4)?,
        memo: row.get(5)?,
        tag: row.get(6)?,
        input_method: row.get(7)?,
        timestamp: row.get(8)?,
        created_at: row.get(9)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
